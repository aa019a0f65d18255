use std::ops::ControlFlow;
use tracing::*;

use crate::*;
use super::Leg;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SearchStats {
  /// Number of search nodes expanded.
  pub expansions: u64,
  /// Number of itineraries handed to the visitor.
  pub itineraries: usize,
  /// The visitor asked the search to stop.
  pub stopped_early: bool,
}

/// Depth-first enumeration of every itinerary that reaches the arrival within the countdown.
///
/// Neighbours are tried in graph order (location name order), so the itineraries always come
/// out in the same order.
#[derive(Debug, Copy, Clone)]
pub struct PathEnumerator<'a> {
  graph: &'a RouteGraph,
  mission: &'a MissionConfig,
  countdown: Day,
  expansion_limit: Option<u64>,
}

/// Marks what `SearchState::enter` pushed, so `leave` can undo exactly that.
#[derive(Debug)]
#[must_use]
pub(crate) struct Mark {
  path_len: usize,
  key: (Loc, Day),
}

/// The mutable part of one search: the current partial itinerary and the (location, day) pairs on it.
#[derive(Debug, Clone)]
pub(crate) struct SearchState {
  path: Vec<TimedEvent>,
  visited: Set<(Loc, Day)>,
  expansions: u64,
  itineraries: usize,
}

impl SearchState {
  pub fn new(departure: Loc) -> Self {
    let mut visited = Set::default();
    visited.insert((departure, 0));
    SearchState {
      path: vec![TimedEvent::new(departure, 0, Action::Start)],
      visited,
      expansions: 0,
      itineraries: 0,
    }
  }

  /// Pushes the events of `leg`.  Returns `None` (and pushes nothing) if the landing
  /// (location, day) is already on the current branch.
  pub fn enter(&mut self, leg: &Leg) -> Option<Mark> {
    let key = (leg.to, leg.arrive);
    if !self.visited.insert(key) {
      return None;
    }
    let path_len = self.path.len();
    self.path.extend(leg.events());
    Some(Mark { path_len, key })
  }

  pub fn leave(&mut self, mark: Mark) {
    self.path.truncate(mark.path_len);
    let removed = self.visited.remove(&mark.key);
    debug_assert!(removed);
  }

  /// True when nothing beyond the START event is pushed.
  pub fn is_root(&self) -> bool {
    self.path.len() == 1 && self.visited.len() == 1
  }

  #[inline]
  pub fn path(&self) -> &[TimedEvent] { &self.path }
}


impl<'a> PathEnumerator<'a> {
  pub fn new(graph: &'a RouteGraph, mission: &'a MissionConfig, countdown: Day) -> Self {
    PathEnumerator { graph, mission, countdown, expansion_limit: None }
  }

  /// Caps the number of search nodes expanded; exceeding it fails with `Error::ExpansionLimit`.
  pub fn with_expansion_limit(mut self, limit: Option<u64>) -> Self {
    self.expansion_limit = limit;
    self
  }

  /// All itineraries, in discovery order.
  pub fn enumerate(&self) -> Result<Vec<Itinerary>, Error> {
    let mut itineraries = Vec::new();
    self.for_each(|events| {
      itineraries.push(Itinerary::from_events(events.to_vec()));
      ControlFlow::Continue(())
    })?;
    Ok(itineraries)
  }

  /// Streams each itinerary's events to `visit` as soon as it is found.  Returning
  /// `ControlFlow::Break` from `visit` ends the search.
  #[instrument(level = "debug", skip(self, visit), fields(countdown = self.countdown))]
  pub fn for_each<F>(&self, mut visit: F) -> Result<SearchStats, Error> where
    F: FnMut(&[TimedEvent]) -> ControlFlow<()>
  {
    let mut state = SearchState::new(self.mission.departure());
    let flow = self.search(&mut state, &mut visit)?;
    debug_assert!(state.is_root());
    let stats = SearchStats {
      expansions: state.expansions,
      itineraries: state.itineraries,
      stopped_early: matches!(flow, ControlFlow::Break(())),
    };
    debug!(?stats, "search finished");
    Ok(stats)
  }

  pub(crate) fn search<F>(&self, state: &mut SearchState, visit: &mut F) -> Result<ControlFlow<()>, Error> where
    F: FnMut(&[TimedEvent]) -> ControlFlow<()>
  {
    let departure = self.mission.departure();
    if departure == self.mission.arrival() {
      state.itineraries += 1;
      return Ok(visit(state.path()));
    }
    self.extend(state, departure, 0, self.mission.autonomy(), visit)
  }

  fn extend<F>(&self, state: &mut SearchState, loc: Loc, day: Day, fuel: Day, visit: &mut F) -> Result<ControlFlow<()>, Error> where
    F: FnMut(&[TimedEvent]) -> ControlFlow<()>
  {
    state.expansions += 1;
    if let Some(limit) = self.expansion_limit {
      if state.expansions > limit {
        return Err(Error::ExpansionLimit { limit });
      }
    }

    for &(next, travel_time) in self.graph.neighbors(loc) {
      let leg = match Leg::plan(loc, next, travel_time, day, fuel, self.mission.autonomy()) {
        Some(leg) if leg.arrive <= self.countdown => leg,
        _ => continue,
      };
      let mark = match state.enter(&leg) {
        Some(mark) => mark,
        None => {
          trace!(loc = next, day = leg.arrive, "revisit");
          continue;
        }
      };

      let flow = if next == self.mission.arrival() {
        state.itineraries += 1;
        trace!(path = ?state.path(), "itinerary");
        Ok(visit(state.path()))
      } else {
        self.extend(state, next, leg.arrive, leg.fuel, visit)
      };
      state.leave(mark);

      if let ControlFlow::Break(()) = flow? {
        return Ok(ControlFlow::Break(()));
      }
    }
    Ok(ControlFlow::Continue(()))
  }
}
