use std::fmt;
use itertools::Itertools;

use crate::*;

pub mod enumerate;
pub mod memo;

pub use enumerate::{PathEnumerator, SearchStats};
pub use memo::MemoSearch;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Action {
  Start,
  Wait,
  Refuel,
  Travel,
}

impl Action {
  pub fn as_str(self) -> &'static str {
    match self {
      Action::Start => "START",
      Action::Wait => "WAIT",
      Action::Refuel => "REFUEL",
      Action::Travel => "TRAVEL",
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.as_str())
  }
}


#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TimedEvent {
  pub loc: Loc,
  pub day: Day,
  pub action: Action,
}

impl TimedEvent {
  #[inline]
  pub fn new(loc: Loc, day: Day, action: Action) -> Self {
    TimedEvent { loc, day, action }
  }
}


/// A fully time-stamped plan from departure to arrival.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Itinerary(Vec<TimedEvent>);

impl Itinerary {
  pub(crate) fn from_events(events: Vec<TimedEvent>) -> Self {
    debug_assert!(matches!(events.first(), Some(e) if e.action == Action::Start && e.day == 0));
    Itinerary(events)
  }

  /// The itinerary of a mission that is already at its destination.
  pub(crate) fn stay(loc: Loc) -> Self {
    Itinerary(vec![TimedEvent::new(loc, 0, Action::Start)])
  }

  #[inline]
  pub fn events(&self) -> &[TimedEvent] { &self.0 }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn arrival_day(&self) -> Day {
    self.0.last().map_or(0, |e| e.day)
  }

  pub fn refuels(&self) -> usize {
    self.0.iter().filter(|e| e.action == Action::Refuel).count()
  }

  /// Locations the vehicle occupies in turn, starting with the departure.
  pub fn stops(&self) -> impl Iterator<Item=Loc> + '_ {
    self.0.iter()
      .filter(|e| matches!(e.action, Action::Start | Action::Travel))
      .map(|e| e.loc)
  }

  /// Replays the itinerary against the routing and fuel rules.
  pub fn is_consistent(&self, graph: &RouteGraph, mission: &MissionConfig, countdown: Day) -> bool {
    let events = &self.0;
    match events.first() {
      Some(e) if e.action == Action::Start && e.loc == mission.departure() && e.day == 0 => {},
      _ => return false,
    }
    match events.last() {
      Some(e) if e.loc == mission.arrival() && e.day <= countdown => {},
      _ => return false,
    }
    if !events.iter().tuple_windows().all(|(a, b)| a.day <= b.day) {
      return false;
    }

    let (mut loc, mut day, mut fuel) = (mission.departure(), 0, mission.autonomy());
    let mut k = 1;
    while k < events.len() {
      let refuel = events[k].action == Action::Refuel;
      let depart = if refuel {
        let stop = events[k];
        match events.get(k + 1) {
          Some(wait) if wait.action == Action::Wait
            && stop.loc == loc && wait.loc == loc
            && stop.day == day + 1 && wait.day == day + 1 => {},
          _ => return false,
        }
        k += 2;
        day + 1
      } else {
        day
      };

      let travel = match events.get(k) {
        Some(e) if e.action == Action::Travel => e,
        _ => return false,
      };
      let travel_time = match graph.travel_time(loc, travel.loc) {
        Some(t) => t,
        None => return false,
      };
      if refuel {
        // a refuel is only taken when the tank can't cover the leg
        if travel_time <= fuel {
          return false;
        }
        fuel = mission.autonomy();
      } else if travel_time > fuel {
        return false;
      }
      if travel.day != depart + travel_time {
        return false;
      }

      fuel = fuel.saturating_sub(travel_time);
      loc = travel.loc;
      day = travel.day;
      k += 1;
      if loc == mission.arrival() && k < events.len() {
        return false;
      }
    }
    true
  }
}


/// One hop of the search: an optional refuel stop followed by a travel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Leg {
  pub from: Loc,
  pub to: Loc,
  /// Day the vehicle takes off; the refuel and wait events are stamped with it.
  pub depart: Day,
  pub arrive: Day,
  /// Fuel left on landing.
  pub fuel: Day,
  pub refuel: bool,
}

static PIT_STOP: [Action; 2] = [Action::Refuel, Action::Wait];

impl Leg {
  /// Plans the hop `from -> to` for a vehicle at `from` on `day` with `fuel` left.  Travels
  /// directly when the tank allows, otherwise refuels for a day first.  A hop longer than a full
  /// tank is still flown after refuelling and lands with an empty tank.  `None` only on day
  /// overflow.
  #[inline]
  pub fn plan(from: Loc, to: Loc, travel_time: Day, day: Day, fuel: Day, autonomy: Day) -> Option<Leg> {
    if travel_time <= fuel {
      Some(Leg { from, to, depart: day, arrive: day.checked_add(travel_time)?, fuel: fuel - travel_time, refuel: false })
    } else {
      let depart = day.checked_add(1)?;
      Some(Leg {
        from,
        to,
        depart,
        arrive: depart.checked_add(travel_time)?,
        fuel: autonomy.saturating_sub(travel_time),
        refuel: true,
      })
    }
  }

  pub fn events(self) -> impl Iterator<Item=TimedEvent> {
    let pit_stop = if self.refuel { PIT_STOP.len() } else { 0 };
    PIT_STOP.iter()
      .take(pit_stop)
      .map(move |&action| TimedEvent::new(self.from, self.depart, action))
      .chain(std::iter::once(TimedEvent::new(self.to, self.arrive, Action::Travel)))
  }

  pub fn hits(self, sightings: &mission::SightingIndex) -> u32 {
    self.events().filter(|e| sightings.is_hit(e)).count() as u32
  }
}
