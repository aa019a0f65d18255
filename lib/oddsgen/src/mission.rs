use std::collections::BTreeSet;
use tracing::*;

use crate::*;

/// What the vehicle sets out to do.  Departure and arrival are validated against the graph the
/// config was built with.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MissionConfig {
  autonomy: Day,
  departure: Loc,
  arrival: Loc,
}

impl MissionConfig {
  pub fn new(graph: &RouteGraph, autonomy: Day, departure: &str, arrival: &str) -> Result<Self, Error> {
    let lookup = |name: &str| graph.loc(name).ok_or_else(|| Error::UnknownLocation(name.to_string()));
    Ok(MissionConfig {
      autonomy,
      departure: lookup(departure)?,
      arrival: lookup(arrival)?,
    })
  }

  #[inline]
  pub fn autonomy(&self) -> Day { self.autonomy }

  #[inline]
  pub fn departure(&self) -> Loc { self.departure }

  #[inline]
  pub fn arrival(&self) -> Loc { self.arrival }
}


#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Sighting {
  pub location: String,
  pub day: Day,
}

impl Sighting {
  pub fn new(location: impl Into<String>, day: Day) -> Self {
    Sighting { location: location.into(), day }
  }
}

/// Day budget plus the known sightings.  Duplicate sightings collapse.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ThreatModel {
  countdown: Day,
  sightings: BTreeSet<Sighting>,
}

impl ThreatModel {
  pub fn new(countdown: Day, sightings: impl IntoIterator<Item=Sighting>) -> Self {
    ThreatModel { countdown, sightings: sightings.into_iter().collect() }
  }

  #[inline]
  pub fn countdown(&self) -> Day { self.countdown }

  /// Sightings ordered by location, then day.
  pub fn sightings(&self) -> impl Iterator<Item=&Sighting> {
    self.sightings.iter()
  }

  pub fn len(&self) -> usize { self.sightings.len() }

  pub fn is_empty(&self) -> bool { self.sightings.is_empty() }

  /// Resolves sightings against `graph`.  Sightings at locations the graph doesn't know can never
  /// match an event and are left out.
  pub fn index(&self, graph: &RouteGraph) -> SightingIndex {
    let mut index = Set::default();
    for s in &self.sightings {
      match graph.loc(&s.location) {
        Some(loc) => { index.insert((loc, s.day)); },
        None => debug!(location=%s.location, day=s.day, "sighting at unknown location"),
      }
    }
    SightingIndex(index)
  }
}


/// Sightings keyed by interned location, for matching against itinerary events.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SightingIndex(Set<(Loc, Day)>);

impl SightingIndex {
  #[inline]
  pub fn contains(&self, loc: Loc, day: Day) -> bool {
    self.0.contains(&(loc, day))
  }

  #[inline]
  pub fn is_hit(&self, event: &TimedEvent) -> bool {
    self.contains(event.loc, event.day)
  }

  /// Events matching a sighting, each event checked on its own.
  pub fn hits<'a>(&'a self, events: &'a [TimedEvent]) -> impl Iterator<Item=&'a TimedEvent> + 'a {
    events.iter().filter(move |e| self.is_hit(e))
  }

  pub fn count(&self, events: &[TimedEvent]) -> u32 {
    self.hits(events).count() as u32
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
