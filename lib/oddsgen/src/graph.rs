use itertools::Itertools;
use tracing::*;
use missions::raw::mission::RouteRow;

use crate::*;

/// An undirected route between two locations.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Route {
  pub origin: String,
  pub destination: String,
  pub travel_time: Day,
}

impl Route {
  pub fn new(origin: impl Into<String>, destination: impl Into<String>, travel_time: Day) -> Self {
    Route { origin: origin.into(), destination: destination.into(), travel_time }
  }
}

impl From<RouteRow> for Route {
  fn from(row: RouteRow) -> Self {
    Route { origin: row.origin, destination: row.destination, travel_time: row.travel_time }
  }
}


/// Undirected graph of locations with positive travel times.
///
/// Locations are interned in lexicographic order, so iterating neighbours by index visits them
/// in name order.  The search relies on this for reproducible results.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RouteGraph {
  names: Vec<String>,
  index: Map<String, Loc>,
  adjacency: Vec<Vec<(Loc, Day)>>,
  travel_time: Map<(Loc, Loc), Day>,
}

impl RouteGraph {
  #[instrument(level = "debug", skip(routes), fields(num_routes = routes.len()))]
  pub fn build(routes: &[Route]) -> Result<RouteGraph, Error> {
    let names: Vec<String> = routes.iter()
      .flat_map(|r| std::iter::once(&r.origin).chain(std::iter::once(&r.destination)))
      .sorted()
      .dedup()
      .cloned()
      .collect();

    if names.len() > Loc::MAX as usize + 1 {
      return Err(Error::TooManyLocations(names.len()));
    }

    let index: Map<String, Loc> = names.iter()
      .enumerate()
      .map(|(k, name)| (name.clone(), k as Loc))
      .collect();

    let mut travel_time = Map::with_capacity_and_hasher(routes.len() * 2, Default::default());
    for r in routes {
      if r.travel_time == 0 {
        return Err(Error::ZeroTravelTime { origin: r.origin.clone(), destination: r.destination.clone() });
      }
      let (i, j) = (index[&r.origin], index[&r.destination]);
      match travel_time.get(&(i, j)) {
        Some(&t) if t != r.travel_time => {
          return Err(Error::ConflictingRoute {
            origin: r.origin.clone(),
            destination: r.destination.clone(),
            existing: t,
            conflicting: r.travel_time,
          });
        },
        Some(_) => trace!(origin=%r.origin, destination=%r.destination, "duplicate route"),
        None => {
          travel_time.insert((i, j), r.travel_time);
          travel_time.insert((j, i), r.travel_time);
        }
      }
    }

    let mut adjacency = vec![Vec::new(); names.len()];
    for (&(i, j), &t) in &travel_time {
      adjacency[i as usize].push((j, t));
    }
    for neighbours in &mut adjacency {
      neighbours.sort_unstable();
    }

    debug!(locations = names.len(), arcs = travel_time.len(), "route graph built");
    Ok(RouteGraph { names, index, adjacency, travel_time })
  }

  /// Neighbours of `loc` with their travel times, in location name order.
  #[inline]
  pub fn neighbors(&self, loc: Loc) -> &[(Loc, Day)] {
    &self.adjacency[loc as usize]
  }

  #[inline]
  pub fn loc(&self, name: &str) -> Option<Loc> {
    self.index.get(name).copied()
  }

  #[inline]
  pub fn name(&self, loc: Loc) -> &str {
    &self.names[loc as usize]
  }

  #[inline]
  pub fn travel_time(&self, i: Loc, j: Loc) -> Option<Day> {
    self.travel_time.get(&(i, j)).copied()
  }

  pub fn len(&self) -> usize { self.names.len() }

  pub fn is_empty(&self) -> bool { self.names.is_empty() }

  pub fn locations(&self) -> impl Iterator<Item=(Loc, &str)> {
    self.names.iter().enumerate().map(|(k, name)| (k as Loc, name.as_str()))
  }

  /// Every route once, ordered by origin then destination (origin <= destination).
  pub fn routes(&self) -> impl Iterator<Item=Route> + '_ {
    self.adjacency.iter()
      .enumerate()
      .flat_map(move |(i, neighbours)| {
        let i = i as Loc;
        neighbours.iter()
          .filter(move |&&(j, _)| i <= j)
          .map(move |&(j, t)| Route::new(self.name(i), self.name(j), t))
      })
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::fixtures::*;

  #[test]
  fn lexicographic_interning() {
    let graph = universe();
    let names: Vec<_> = graph.locations().map(|(_, name)| name).collect();
    assert_eq!(names, vec![DAGOBAH, ENDOR, HOTH, TATOOINE]);
    assert_eq!(graph.loc(HOTH), Some(2));
    assert_eq!(graph.loc("Coruscant"), None);
  }

  #[test]
  fn neighbours_are_sorted_and_symmetric() {
    let graph = universe();
    let d = graph.loc(DAGOBAH).unwrap();
    let named: Vec<_> = graph.neighbors(d).iter().map(|&(j, t)| (graph.name(j), t)).collect();
    assert_eq!(named, vec![(ENDOR, 4), (HOTH, 1), (TATOOINE, 6)]);

    for (i, _) in graph.locations() {
      for &(j, t) in graph.neighbors(i) {
        assert_eq!(graph.travel_time(j, i), Some(t));
      }
    }
  }

  #[test]
  fn routes_listed_once() {
    let graph = universe();
    let routes: Vec<_> = graph.routes().collect();
    assert_eq!(routes.len(), 5);
    assert_eq!(routes[0], Route::new(DAGOBAH, ENDOR, 4));
    assert_eq!(RouteGraph::build(&routes).unwrap(), graph);
  }

  #[test]
  fn consistent_duplicates_collapse() {
    let graph = RouteGraph::build(&[
      Route::new("A", "B", 3),
      Route::new("B", "A", 3),
      Route::new("A", "B", 3),
    ]).unwrap();
    assert_eq!(graph.neighbors(0), &[(1, 3)]);
    assert_eq!(graph.routes().count(), 1);
  }

  #[test]
  fn conflicting_duplicates_rejected() {
    let err = RouteGraph::build(&[Route::new("A", "B", 3), Route::new("B", "A", 4)]).unwrap_err();
    assert_eq!(err, Error::ConflictingRoute {
      origin: "B".to_string(),
      destination: "A".to_string(),
      existing: 3,
      conflicting: 4,
    });
  }

  #[test]
  fn zero_travel_time_rejected() {
    let err = RouteGraph::build(&[Route::new("A", "B", 0)]).unwrap_err();
    assert!(matches!(err, Error::ZeroTravelTime { .. }));
  }

  #[test]
  fn empty() {
    let graph = RouteGraph::build(&[]).unwrap();
    assert!(graph.is_empty());
    assert_eq!(graph.routes().count(), 0);
  }
}
