use std::borrow::Cow;
use std::path::Path;
use anyhow::{Context, Result};
use tracing::*;
use missions::{ParseInstance, MissionFmt, IntelFmt};
use missions::raw::FromRaw;
use missions::raw::mission::{RawMission, RawIntel};

use crate::{MissionConfig, Route, RouteGraph, Sighting, ThreatModel};

/// A route graph together with the mission flown on it.
#[derive(Debug, Clone)]
pub struct Mission {
  pub graph: RouteGraph,
  pub config: MissionConfig,
}

impl FromRaw<RawMission> for Mission {
  fn from_raw(raw: RawMission, id: Cow<str>) -> Result<Self> {
    let routes_db = raw.routes_db;
    let routes: Vec<Route> = raw.routes.into_iter().map(Route::from).collect();
    let graph = RouteGraph::build(&routes)
      .with_context(|| format!("invalid route table {:?} for mission {}", routes_db, id))?;
    let config = MissionConfig::new(&graph, raw.autonomy, &raw.departure, &raw.arrival)
      .with_context(|| format!("invalid mission {}", id))?;
    Ok(Mission { graph, config })
  }
}

impl FromRaw<RawIntel> for ThreatModel {
  fn from_raw(raw: RawIntel, id: Cow<str>) -> Result<Self> {
    trace!(%id, sightings = raw.sightings.len(), "intel");
    Ok(ThreatModel::new(raw.countdown, raw.sightings.into_iter().map(|s| Sighting::new(s.location, s.day))))
  }
}

fn file_id(path: &Path) -> Cow<str> {
  path.file_stem().map_or_else(|| path.to_string_lossy(), |s| s.to_string_lossy())
}

pub fn load_mission(path: impl AsRef<Path>) -> Result<Mission> {
  let path = path.as_ref();
  let raw = RawMission::parse(MissionFmt(path))?;
  Mission::from_raw(raw, file_id(path))
}

pub fn load_intel(path: impl AsRef<Path>) -> Result<ThreatModel> {
  let path = path.as_ref();
  let raw = RawIntel::parse(IntelFmt(path))?;
  ThreatModel::from_raw(raw, file_id(path))
}
