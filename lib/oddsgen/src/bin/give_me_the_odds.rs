use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::*;
use structopt::StructOpt;
use missions::dataset::{IdxNameMap, IntelDir};

use oddsgen::*;
use oddsgen::data::{load_intel, load_mission, Mission};
use oddsgen::odds::STRATEGY_STRINGS;
use oddsgen::trace::response_json;

mod common;
use common::*;

/// Computes the odds that the vehicle reaches its destination before the countdown runs out.
#[derive(Debug, StructOpt)]
#[structopt(name = "give_me_the_odds")]
struct ClArgs {
  /// Mission file
  #[structopt(parse(from_os_str))]
  mission: PathBuf,
  /// Intelligence file, or a directory of them
  #[structopt(parse(from_os_str))]
  intel: PathBuf,
  /// Include every itinerary considered in the report
  #[structopt(long)]
  debug: bool,
  #[structopt(long, parse(try_from_str), default_value="enumerate", possible_values=&STRATEGY_STRINGS)]
  strategy: Strategy,
  /// Give up after this many search nodes
  #[structopt(long="max-expansions", validator=clap_range_validator(Some(1u64), None))]
  max_expansions: Option<u64>,
  #[structopt(flatten)]
  output: OutputOptions,
}


struct Evaluation {
  scenario: String,
  odds: Result<MissionOdds>,
  trace: Option<MissionTrace>,
}

struct Evaluations {
  items: Vec<Evaluation>,
  /// Results for a directory of scenarios, labelled by scenario name.
  batch: bool,
}

impl Evaluations {
  fn failures(&self) -> usize {
    self.items.iter().filter(|e| e.odds.is_err()).count()
  }
}

impl Report for Evaluations {
  fn write_text(&self, mut buf: impl Write) -> Result<()> {
    for e in &self.items {
      if self.batch {
        write!(buf, "{}: ", e.scenario)?;
      }
      match &e.odds {
        Ok(odds) => writeln!(buf, "{}", odds)?,
        Err(err) => writeln!(buf, "error: {:#}", err)?,
      }
      if let Some(trace) = &e.trace {
        write!(buf, "{}", trace)?;
      }
    }
    Ok(())
  }

  fn write_json(&self, mut buf: impl Write) -> Result<()> {
    let docs: Vec<_> = self.items.iter()
      .map(|e| {
        let mut doc = response_json(e.odds.as_ref().map_err(|err| format!("{:#}", err)), e.trace.as_ref());
        if self.batch {
          doc["scenario"] = e.scenario.as_str().into();
        }
        doc
      })
      .collect();
    let root = if self.batch { json::JsonValue::from(docs) } else { docs.into_iter().next().unwrap_or(json::JsonValue::Null) };
    root.write_pretty(&mut buf, 2)?;
    writeln!(buf)?;
    Ok(())
  }
}


fn evaluate(args: &ClArgs, mission: &Mission, scenario: String, intel: &Path) -> Evaluation {
  let calculator = OddsCalculator::new(args.strategy).with_expansion_limit(args.max_expansions);
  let with_trace = args.debug || args.output.fmt == OutputFormat::Json;
  let span = info_span!("scenario", %scenario);
  let _s = span.enter();

  let result = load_intel(intel).and_then(|threat| {
    if with_trace {
      let (odds, trace) = calculator.calculate_with_trace(&mission.graph, &mission.config, &threat)?;
      Ok((odds, Some(trace)))
    } else {
      Ok((calculator.calculate(&mission.graph, &mission.config, &threat)?, None))
    }
  });

  match result {
    Ok((odds, trace)) => Evaluation { scenario, odds: Ok(odds), trace },
    Err(err) => {
      error!(%scenario, "{:#}", err);
      Evaluation { scenario, odds: Err(err), trace: None }
    }
  }
}


fn main() -> Result<()> {
  let args: ClArgs = StructOpt::from_args();
  let _g = init_logging(args.output.log.as_ref())?;
  debug!(?args);

  let mission = load_mission(&args.mission)
    .with_context(|| format!("failed to load mission {:?}", args.mission))?;

  let report = if args.intel.is_dir() {
    let dset = IntelDir::new(&args.intel)?;
    let mut items = Vec::with_capacity(dset.len());
    for idx in 0..dset.len() {
      let name = dset.index_to_name(idx)?.into_owned();
      items.push(evaluate(&args, &mission, name, dset.path(idx)?));
    }
    Evaluations { items, batch: true }
  } else {
    let name = args.intel.to_string_lossy().into_owned();
    let Evaluation { scenario, odds, trace } = evaluate(&args, &mission, name, &args.intel);
    let odds = odds?;
    Evaluations { items: vec![Evaluation { scenario, odds: Ok(odds), trace }], batch: false }
  };

  output_report(&args.output, &report)?;

  let failures = report.failures();
  if failures > 0 {
    anyhow::bail!("{} of {} scenarios failed", failures, report.items.len());
  }
  Ok(())
}
