use std::path::{Path, PathBuf};
use anyhow::Context;
use json::JsonValue;
use crate::{Result, Error};
use crate::raw::mission::*;
use super::{ParseInstance, RouteTableFmt};

/// Mission record: `{"autonomy", "departure", "arrival", "routes_db"}`.  The route table is
/// loaded too, with `routes_db` taken relative to the mission file.
#[derive(Debug, Copy, Clone)]
pub struct MissionFmt<P>(pub P);

/// Intelligence record: `{"countdown", "bounty_hunters": [{"planet", "day"}]}`.
#[derive(Debug, Copy, Clone)]
pub struct IntelFmt<P>(pub P);

impl<P: AsRef<Path>> ParseInstance<MissionFmt<P>> for RawMission {
  fn parse(path: MissionFmt<P>) -> Result<RawMission> {
    let path = path.0.as_ref();
    let contents = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read mission file {:?}", path))?;
    let mut raw = parsers::mission(&contents).context(format!("failed to load {:?}", path))?;
    if let Some(dir) = path.parent() {
      raw.routes_db = dir.join(&raw.routes_db);
    }
    raw.routes = Vec::<RouteRow>::parse(RouteTableFmt(&raw.routes_db))
      .with_context(|| format!("failed to load route table {:?}", raw.routes_db))?;
    Ok(raw)
  }
}

impl<P: AsRef<Path>> ParseInstance<IntelFmt<P>> for RawIntel {
  fn parse(path: IntelFmt<P>) -> Result<RawIntel> {
    let path = path.0.as_ref();
    let contents = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read intelligence file {:?}", path))?;
    parsers::intel(&contents).context(format!("failed to load {:?}", path))
  }
}


pub(crate) mod parsers {
  use super::*;

  fn field<'a>(obj: &'a JsonValue, key: &'static str) -> std::result::Result<&'a JsonValue, Error> {
    if obj.has_key(key) { Ok(&obj[key]) } else { Err(Error::MissingField(key)) }
  }

  fn day_field(obj: &JsonValue, key: &'static str) -> std::result::Result<Day, Error> {
    field(obj, key)?.as_u32().ok_or(Error::InvalidField(key))
  }

  fn str_field(obj: &JsonValue, key: &'static str) -> std::result::Result<String, Error> {
    field(obj, key)?.as_str().map(str::to_string).ok_or(Error::InvalidField(key))
  }

  pub fn mission(input: &str) -> Result<RawMission> {
    let root = json::parse(input)?;
    Ok(RawMission {
      autonomy: day_field(&root, "autonomy")?,
      departure: str_field(&root, "departure")?,
      arrival: str_field(&root, "arrival")?,
      routes_db: PathBuf::from(str_field(&root, "routes_db")?),
      routes: Vec::new(),
    })
  }

  pub fn intel(input: &str) -> Result<RawIntel> {
    let root = json::parse(input)?;
    let countdown = day_field(&root, "countdown")?;

    // `sightings`/`location` is accepted as an alias of `bounty_hunters`/`planet`
    let (list_key, loc_key) = if root.has_key("sightings") && !root.has_key("bounty_hunters") {
      ("sightings", "location")
    } else {
      ("bounty_hunters", "planet")
    };
    let list = field(&root, list_key)?;
    if !list.is_array() {
      return Err(Error::InvalidField(list_key).into());
    }

    let mut sightings = Vec::with_capacity(list.len());
    for s in list.members() {
      sightings.push(RawSighting {
        location: str_field(s, loc_key)?,
        day: day_field(s, "day")?,
      });
    }
    Ok(RawIntel { countdown, sightings })
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use super::parsers::*;

  fn missing_field(r: Result<impl std::fmt::Debug>) -> Error {
    r.unwrap_err().downcast::<Error>().unwrap()
  }

  #[test]
  fn millennium_falcon() -> Result<()> {
    let raw = RawMission::parse(MissionFmt("../../data/millennium-falcon.json"))?;
    assert_eq!(raw.autonomy, 6);
    assert_eq!(raw.departure, "Tatooine");
    assert_eq!(raw.arrival, "Endor");
    assert_eq!(raw.routes_db, Path::new("../../data/universe.routes"));
    assert_eq!(raw.routes.len(), 5);
    Ok(())
  }

  #[test]
  fn mission_fields() {
    let m = mission(r#"{"autonomy": 3, "departure": "A", "arrival": "B", "routes_db": "r.routes"}"#).unwrap();
    assert_eq!(m.autonomy, 3);
    assert_eq!(m.routes_db, PathBuf::from("r.routes"));
    assert!(m.routes.is_empty());

    assert_eq!(
      missing_field(mission(r#"{"departure": "A", "arrival": "B", "routes_db": "r"}"#)),
      Error::MissingField("autonomy")
    );
    assert_eq!(
      missing_field(mission(r#"{"autonomy": -1, "departure": "A", "arrival": "B", "routes_db": "r"}"#)),
      Error::InvalidField("autonomy")
    );
    assert_eq!(
      missing_field(mission(r#"{"autonomy": 1, "departure": 7, "arrival": "B", "routes_db": "r"}"#)),
      Error::InvalidField("departure")
    );
    assert!(mission("{not json").is_err());
  }

  #[test]
  fn intel_fields() {
    let i = intel(r#"{"countdown": 8, "bounty_hunters": [
        {"planet": "Hoth", "day": 6}, {"planet": "Hoth", "day": 6}, {"planet": "Endor", "day": 9}]}"#).unwrap();
    assert_eq!(i.countdown, 8);
    assert_eq!(i.sightings.len(), 3);
    assert_eq!(i.sightings[2], RawSighting { location: "Endor".to_string(), day: 9 });

    let i = intel(r#"{"countdown": 0, "sightings": [{"location": "Hoth", "day": 0}]}"#).unwrap();
    assert_eq!(i.sightings, vec![RawSighting { location: "Hoth".to_string(), day: 0 }]);

    assert_eq!(missing_field(intel(r#"{"countdown": 1}"#)), Error::MissingField("bounty_hunters"));
    assert_eq!(
      missing_field(intel(r#"{"countdown": 1, "bounty_hunters": {}}"#)),
      Error::InvalidField("bounty_hunters")
    );
    assert_eq!(
      missing_field(intel(r#"{"countdown": 1, "bounty_hunters": [{"planet": "Hoth"}]}"#)),
      Error::MissingField("day")
    );
  }

  #[test]
  fn empire_files() -> Result<()> {
    let raw = RawIntel::parse(IntelFmt("../../data/empire/empire042.json"))?;
    assert_eq!(raw.countdown, 8);
    assert_eq!(raw.sightings.len(), 3);
    Ok(())
  }
}
