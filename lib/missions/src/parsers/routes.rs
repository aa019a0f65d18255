use std::path::Path;
use anyhow::Context;
use crate::{Result, Error};
use crate::raw::mission::RouteRow;
use super::{
  ParseInstance,
  nom_prelude::*
};

/// Plain-text route table: one `ORIGIN DESTINATION TRAVEL_TIME` row per line.  Blank lines and
/// lines starting with `#` are skipped.
#[derive(Debug, Copy, Clone)]
pub struct RouteTableFmt<P>(pub P);

impl<P: AsRef<Path>> ParseInstance<RouteTableFmt<P>> for Vec<RouteRow> {
  fn parse(path: RouteTableFmt<P>) -> Result<Vec<RouteRow>> {
    let path = path.0.as_ref();
    let data = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read route table {:?}", path))?;
    Ok(parsers::route_table(&data)?)
  }
}


pub(crate) mod parsers {
  use super::*;
  use crate::parsers::common::*;

  pub fn route_row(input: &str) -> IResult<&str, RouteRow, error::VerboseError<&str>> {
    map(
      all_consuming(tuple((
        preceded(space0, location),
        preceded(space1, location),
        delimited(space1, u32_, space0),
      ))),
      |(origin, destination, travel_time)| RouteRow::new(origin, destination, travel_time),
    )(input)
  }

  pub fn route_table(input: &str) -> std::result::Result<Vec<RouteRow>, Error> {
    let mut rows = Vec::new();
    for (k, line) in input.lines().enumerate() {
      let trimmed = line.trim();
      if trimmed.is_empty() || trimmed.starts_with('#') {
        continue;
      }
      match route_row(trimmed).finish() {
        Ok((_, row)) => rows.push(row),
        Err(_) => return Err(Error::MalformedRouteRow { line: k + 1, content: line.to_string() }),
      }
    }
    Ok(rows)
  }
}
