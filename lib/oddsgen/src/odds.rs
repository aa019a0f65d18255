use std::ops::ControlFlow;
use std::str::FromStr;
use std::fmt;
use tracing::*;

use crate::*;
use crate::mission::SightingIndex;
use crate::search::{MemoSearch, PathEnumerator};

/// Chance of slipping past a single encounter.
pub const SURVIVAL_PER_ENCOUNTER: f64 = 0.9;

pub const NO_FEASIBLE_ITINERARY: &str = "no feasible itinerary";

/// Success probability, in percent, of an itinerary with `encounters` encounters.
#[inline]
pub fn success_probability(encounters: u32) -> f64 {
  100.0 * SURVIVAL_PER_ENCOUNTER.powi(encounters.min(i32::MAX as u32) as i32)
}

/// Formats a percentage with two decimals, eg `72.90`.
pub fn format_percent(p: f64) -> String {
  format!("{:.2}", p)
}


#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItinerary {
  pub itinerary: Itinerary,
  /// Events of the itinerary that match a sighting.
  pub encounters: Vec<TimedEvent>,
  pub probability: f64,
}

impl ScoredItinerary {
  fn new(events: &[TimedEvent], sightings: &SightingIndex) -> Self {
    let encounters: Vec<_> = sightings.hits(events).copied().collect();
    ScoredItinerary {
      itinerary: Itinerary::from_events(events.to_vec()),
      probability: success_probability(encounters.len() as u32),
      encounters,
    }
  }

  pub fn num_encounters(&self) -> u32 { self.encounters.len() as u32 }
}


/// Outcome of one mission evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionOdds {
  /// Best success probability in percent, `0.0` if no itinerary is feasible.
  pub probability: f64,
  pub best: Option<ScoredItinerary>,
  /// Number of itineraries scored before the search finished or stopped.
  pub considered: usize,
}

impl MissionOdds {
  pub fn is_feasible(&self) -> bool { self.best.is_some() }

  pub fn reason(&self) -> Option<&'static str> {
    if self.is_feasible() { None } else { Some(NO_FEASIBLE_ITINERARY) }
  }

  pub fn percent(&self) -> String { format_percent(self.probability) }
}

impl fmt::Display for MissionOdds {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "The odds of successfully completing the mission are: {}%", self.percent())
  }
}


/// Keeps the best itinerary seen so far.  Ties keep the earlier one.
struct Scorer<'a> {
  sightings: &'a SightingIndex,
  best: Option<ScoredItinerary>,
  considered: usize,
  /// Keep every scored itinerary, not just the best (for traces).
  keep_all: bool,
  scored: Vec<ScoredItinerary>,
}

impl<'a> Scorer<'a> {
  fn new(sightings: &'a SightingIndex, keep_all: bool) -> Self {
    Scorer { sightings, best: None, considered: 0, keep_all, scored: Vec::new() }
  }

  /// Scores one itinerary and returns its encounter count.
  fn take(&mut self, events: &[TimedEvent]) -> u32 {
    self.considered += 1;
    let n = self.sightings.count(events);
    let better = self.best.as_ref().map_or(true, |b| n < b.num_encounters());
    if better || self.keep_all {
      let scored = ScoredItinerary::new(events, self.sightings);
      trace!(considered = self.considered, encounters = n, "scored itinerary");
      if better { self.best = Some(scored.clone()); }
      if self.keep_all { self.scored.push(scored); }
    }
    n
  }

  /// Like `take`, but asks the caller to stop once an itinerary without encounters is seen.
  fn offer(&mut self, events: &[TimedEvent]) -> ControlFlow<()> {
    if self.take(events) == 0 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
  }

  /// Records `itinerary` as a certain success.
  fn settle(&mut self, itinerary: Itinerary) {
    self.considered += 1;
    let scored = ScoredItinerary { itinerary, encounters: Vec::new(), probability: success_probability(0) };
    if self.keep_all { self.scored.push(scored.clone()); }
    self.best = Some(scored);
  }

  fn finish(self) -> (MissionOdds, Vec<ScoredItinerary>) {
    let probability = self.best.as_ref().map_or(0.0, |b| b.probability);
    let odds = MissionOdds { probability, best: self.best, considered: self.considered };
    (odds, self.scored)
  }
}

/// Scores `itineraries` in order, stopping at the first one without encounters.  Returns the
/// overall result and the itineraries that were scored.
pub fn score<'i>(itineraries: impl IntoIterator<Item=&'i Itinerary>, sightings: &SightingIndex) -> (MissionOdds, Vec<ScoredItinerary>) {
  let mut scorer = Scorer::new(sightings, true);
  for it in itineraries {
    if let ControlFlow::Break(()) = scorer.offer(it.events()) {
      break;
    }
  }
  scorer.finish()
}


pub const STRATEGY_STRINGS: [&str; 2] = ["enumerate", "memo"];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Strategy {
  /// Score every itinerary as the depth-first search finds it.
  Enumerate,
  /// Memoised fewest-encounters search.
  Memo,
}

impl FromStr for Strategy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "enumerate" => Ok(Strategy::Enumerate),
      "memo" => Ok(Strategy::Memo),
      _ => Err(format!("invalid string: {}", s)),
    }
  }
}

impl Default for Strategy {
  fn default() -> Self { Strategy::Enumerate }
}


#[derive(Debug, Copy, Clone, Default)]
pub struct OddsCalculator {
  pub strategy: Strategy,
  pub expansion_limit: Option<u64>,
}

impl OddsCalculator {
  pub fn new(strategy: Strategy) -> Self {
    OddsCalculator { strategy, expansion_limit: None }
  }

  pub fn with_expansion_limit(mut self, limit: Option<u64>) -> Self {
    self.expansion_limit = limit;
    self
  }

  pub fn calculate(&self, graph: &RouteGraph, mission: &MissionConfig, threat: &ThreatModel) -> Result<MissionOdds, Error> {
    self.run(graph, mission, threat, false).map(|(odds, _)| odds)
  }

  /// Like `calculate`, also returning a trace of every itinerary scored.
  pub fn calculate_with_trace(&self, graph: &RouteGraph, mission: &MissionConfig, threat: &ThreatModel) -> Result<(MissionOdds, MissionTrace), Error> {
    let (odds, scored) = self.run(graph, mission, threat, true)?;
    let trace = MissionTrace::assemble(graph, threat, &odds, &scored);
    Ok((odds, trace))
  }

  #[instrument(level = "debug", skip(self, graph, mission, threat), fields(strategy = ?self.strategy, countdown = threat.countdown()))]
  fn run(&self, graph: &RouteGraph, mission: &MissionConfig, threat: &ThreatModel, keep_all: bool) -> Result<(MissionOdds, Vec<ScoredItinerary>), Error> {
    let sightings = threat.index(graph);
    let mut scorer = Scorer::new(&sightings, keep_all);

    if mission.departure() == mission.arrival() {
      debug!("departure is the arrival");
      scorer.settle(Itinerary::stay(mission.departure()));
    } else {
      match self.strategy {
        Strategy::Enumerate => {
          PathEnumerator::new(graph, mission, threat.countdown())
            .with_expansion_limit(self.expansion_limit)
            .for_each(|events| scorer.offer(events))?;
        },
        Strategy::Memo => {
          let best = MemoSearch::new(graph, mission, threat.countdown(), &sightings)
            .with_expansion_limit(self.expansion_limit)
            .best_itinerary()?;
          if let Some((_, itinerary)) = best {
            scorer.take(itinerary.events());
          }
        },
      }
    }

    let (odds, scored) = scorer.finish();
    info!(probability = odds.probability, considered = odds.considered, "mission evaluated");
    Ok((odds, scored))
  }
}

/// Evaluates the mission with the default calculator.
pub fn calculate(graph: &RouteGraph, mission: &MissionConfig, threat: &ThreatModel) -> Result<MissionOdds, Error> {
  OddsCalculator::default().calculate(graph, mission, threat)
}

pub fn calculate_with_trace(graph: &RouteGraph, mission: &MissionConfig, threat: &ThreatModel) -> Result<(MissionOdds, MissionTrace), Error> {
  OddsCalculator::default().calculate_with_trace(graph, mission, threat)
}
