use std::path::PathBuf;

pub type Day = u32;

/// One row of a route table.  Rows are undirected: `origin` and `destination` may be swapped
/// without changing meaning.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RouteRow {
  pub origin: String,
  pub destination: String,
  pub travel_time: Day,
}

impl RouteRow {
  pub fn new(origin: impl Into<String>, destination: impl Into<String>, travel_time: Day) -> Self {
    RouteRow { origin: origin.into(), destination: destination.into(), travel_time }
  }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawMission {
  pub autonomy: Day,
  pub departure: String,
  pub arrival: String,
  /// Route table path, already resolved against the directory of the mission file.
  pub routes_db: PathBuf,
  pub routes: Vec<RouteRow>,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RawSighting {
  pub location: String,
  pub day: Day,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawIntel {
  pub countdown: Day,
  /// In file order, duplicates included.
  pub sightings: Vec<RawSighting>,
}
