use tracing::*;

use crate::*;
use crate::mission::SightingIndex;
use super::Leg;

/// Fewest-encounters search by memoisation over (location, day, fuel) states.
///
/// Finds the same itinerary the enumeration would report first among the best ones: at every
/// state the first neighbour (in graph order) that achieves the optimum is taken.
#[derive(Debug, Clone)]
pub struct MemoSearch<'a> {
  graph: &'a RouteGraph,
  mission: &'a MissionConfig,
  countdown: Day,
  sightings: &'a SightingIndex,
  expansion_limit: Option<u64>,
  expansions: u64,
  /// Fewest encounters on the way from a state to the arrival, not counting the state's own
  /// events.  `None` if the arrival can't be reached in time.
  memo: Map<(Loc, Day, Day), Option<u32>>,
}

impl<'a> MemoSearch<'a> {
  pub fn new(graph: &'a RouteGraph, mission: &'a MissionConfig, countdown: Day, sightings: &'a SightingIndex) -> Self {
    MemoSearch {
      graph,
      mission,
      countdown,
      sightings,
      expansion_limit: None,
      expansions: 0,
      memo: Map::default(),
    }
  }

  pub fn with_expansion_limit(mut self, limit: Option<u64>) -> Self {
    self.expansion_limit = limit;
    self
  }

  /// Number of states evaluated so far.
  pub fn states(&self) -> usize { self.memo.len() }

  #[inline]
  fn leg(&self, from: Loc, to: Loc, travel_time: Day, day: Day, fuel: Day) -> Option<Leg> {
    Leg::plan(from, to, travel_time, day, fuel, self.mission.autonomy())
      .filter(|leg| leg.arrive <= self.countdown)
  }

  fn fewest_encounters(&mut self, loc: Loc, day: Day, fuel: Day) -> Result<Option<u32>, Error> {
    if let Some(&value) = self.memo.get(&(loc, day, fuel)) {
      return Ok(value);
    }
    self.expansions += 1;
    if let Some(limit) = self.expansion_limit {
      if self.expansions > limit {
        return Err(Error::ExpansionLimit { limit });
      }
    }

    let graph = self.graph;
    let mut best: Option<u32> = None;
    for &(next, travel_time) in graph.neighbors(loc) {
      let leg = match self.leg(loc, next, travel_time, day, fuel) {
        Some(leg) => leg,
        None => continue,
      };
      let rest = if next == self.mission.arrival() {
        Some(0)
      } else {
        self.fewest_encounters(next, leg.arrive, leg.fuel)?
      };
      if let Some(rest) = rest {
        let total = leg.hits(self.sightings) + rest;
        best = Some(best.map_or(total, |b| b.min(total)));
        if total == 0 { break; }
      }
    }

    self.memo.insert((loc, day, fuel), best);
    Ok(best)
  }

  /// The best itinerary with its encounter count, or `None` if the arrival can't be reached
  /// within the countdown.
  #[instrument(level = "debug", skip(self), fields(countdown = self.countdown))]
  pub fn best_itinerary(&mut self) -> Result<Option<(u32, Itinerary)>, Error> {
    let departure = self.mission.departure();
    let arrival = self.mission.arrival();
    let start = TimedEvent::new(departure, 0, Action::Start);
    let start_hits = self.sightings.is_hit(&start) as u32;
    if departure == arrival {
      return Ok(Some((start_hits, Itinerary::stay(departure))));
    }

    let (mut loc, mut day, mut fuel) = (departure, 0, self.mission.autonomy());
    let mut remaining = match self.fewest_encounters(loc, day, fuel)? {
      Some(n) => n,
      None => {
        debug!(states = self.states(), "arrival unreachable");
        return Ok(None);
      }
    };
    let total = start_hits + remaining;

    let graph = self.graph;
    let mut events = vec![start];
    while loc != arrival {
      let mut chosen = None;
      for &(next, travel_time) in graph.neighbors(loc) {
        let leg = match self.leg(loc, next, travel_time, day, fuel) {
          Some(leg) => leg,
          None => continue,
        };
        let rest = if next == arrival { Some(0) } else { self.fewest_encounters(next, leg.arrive, leg.fuel)? };
        if let Some(rest) = rest {
          if leg.hits(self.sightings) + rest == remaining {
            chosen = Some((leg, rest));
            break;
          }
        }
      }
      let (leg, rest) = match chosen {
        Some(c) => c,
        None => panic!("bug - no successor of {:?} attains {} encounters", (loc, day, fuel), remaining),
      };
      events.extend(leg.events());
      loc = leg.to;
      day = leg.arrive;
      fuel = leg.fuel;
      remaining = rest;
    }

    debug!(states = self.states(), encounters = total, "best itinerary found");
    Ok(Some((total, Itinerary::from_events(events))))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::fixtures::*;
  use crate::search::PathEnumerator;

  #[test]
  fn falcon_scenarios() {
    let graph = universe();
    let mission = falcon(&graph);
    let threat = hunters(0, &[(HOTH, 6), (HOTH, 7), (HOTH, 8)]);
    let sightings = threat.index(&graph);

    let best = |countdown| MemoSearch::new(&graph, &mission, countdown, &sightings).best_itinerary().unwrap();
    assert_eq!(best(7), None);
    assert_eq!(best(8).map(|(n, _)| n), Some(3));
    assert_eq!(best(9).map(|(n, _)| n), Some(1));
    assert_eq!(best(10).map(|(n, _)| n), Some(1));
    assert_eq!(best(11).map(|(n, _)| n), Some(0));

    let (_, itinerary) = best(10).unwrap();
    assert_eq!(itinerary, PathEnumerator::new(&graph, &mission, 10).enumerate().unwrap()[0]);
    assert!(itinerary.is_consistent(&graph, &mission, 10));
  }

  #[test]
  fn ties_go_to_first_discovered() {
    let graph = universe();
    let mission = falcon(&graph);
    let sightings = hunters(10, &[(ENDOR, 8), (ENDOR, 9), (ENDOR, 10)]).index(&graph);
    let (n, itinerary) = MemoSearch::new(&graph, &mission, 10, &sightings).best_itinerary().unwrap().unwrap();
    assert_eq!(n, 1);
    assert_eq!(itinerary, PathEnumerator::new(&graph, &mission, 10).enumerate().unwrap()[0]);
  }

  #[test]
  fn second_itinerary_avoids_hunters() {
    let graph = universe();
    let mission = falcon(&graph);
    let sightings = hunters(10, &[(HOTH, 8)]).index(&graph);
    let (n, itinerary) = MemoSearch::new(&graph, &mission, 10, &sightings).best_itinerary().unwrap().unwrap();
    assert_eq!(n, 0);
    assert_eq!(itinerary, PathEnumerator::new(&graph, &mission, 10).enumerate().unwrap()[1]);
  }

  #[test]
  fn already_there() {
    let graph = universe();
    let mission = MissionConfig::new(&graph, 6, ENDOR, ENDOR).unwrap();
    let sightings = SightingIndex::default();
    let mut search = MemoSearch::new(&graph, &mission, 0, &sightings);
    let (n, itinerary) = search.best_itinerary().unwrap().unwrap();
    assert_eq!(n, 0);
    assert_eq!(itinerary.len(), 1);
    assert_eq!(search.states(), 0);
  }

  #[test]
  fn expansion_limit() {
    let graph = universe();
    let mission = falcon(&graph);
    let sightings = SightingIndex::default();
    let mut search = MemoSearch::new(&graph, &mission, 10, &sightings).with_expansion_limit(Some(1));
    assert_eq!(search.best_itinerary(), Err(Error::ExpansionLimit { limit: 1 }));
  }
}
