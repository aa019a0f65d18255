use std::fmt;
use json::JsonValue;

use crate::*;
use crate::odds::{format_percent, ScoredItinerary};

/// An event with its location resolved back to a name.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EventRecord {
  pub location: String,
  pub day: Day,
  pub action: Action,
}

impl EventRecord {
  fn new(graph: &RouteGraph, event: &TimedEvent) -> Self {
    EventRecord { location: graph.name(event.loc).to_string(), day: event.day, action: event.action }
  }

  fn to_json(&self) -> JsonValue {
    json::object! {
      location: self.location.as_str(),
      day: self.day,
      action: self.action.as_str(),
    }
  }
}

impl fmt::Display for EventRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{} ({})", self.location, self.day, self.action)
  }
}


#[derive(Debug, Clone, PartialEq)]
pub struct PathTrace {
  pub events: Vec<EventRecord>,
  pub encounters: Vec<EventRecord>,
  pub probability: f64,
}

impl PathTrace {
  fn new(graph: &RouteGraph, scored: &ScoredItinerary) -> Self {
    PathTrace {
      events: scored.itinerary.events().iter().map(|e| EventRecord::new(graph, e)).collect(),
      encounters: scored.encounters.iter().map(|e| EventRecord::new(graph, e)).collect(),
      probability: scored.probability,
    }
  }

  fn to_json(&self) -> JsonValue {
    json::object! {
      events: records_json(&self.events),
      encounters: records_json(&self.encounters),
      probability: self.probability,
    }
  }
}

fn records_json(records: &[EventRecord]) -> JsonValue {
  JsonValue::Array(records.iter().map(EventRecord::to_json).collect())
}


/// Everything the calculator looked at while evaluating one mission.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionTrace {
  pub countdown: Day,
  /// All sightings, including those at locations missing from the graph.
  pub sightings: Vec<Sighting>,
  /// Scored itineraries in discovery order.
  pub paths: Vec<PathTrace>,
  pub probability: f64,
  /// Position of the reported itinerary in `paths`.
  pub best: Option<usize>,
  pub reason: Option<String>,
}

impl MissionTrace {
  pub fn assemble(graph: &RouteGraph, threat: &ThreatModel, odds: &MissionOdds, scored: &[ScoredItinerary]) -> Self {
    let best = odds.best.as_ref()
      .and_then(|b| scored.iter().position(|s| s.itinerary == b.itinerary));
    MissionTrace {
      countdown: threat.countdown(),
      sightings: threat.sightings().cloned().collect(),
      paths: scored.iter().map(|s| PathTrace::new(graph, s)).collect(),
      probability: odds.probability,
      best,
      reason: odds.reason().map(String::from),
    }
  }

  pub fn best_path(&self) -> Option<&PathTrace> {
    self.best.map(|k| &self.paths[k])
  }

  pub fn to_json(&self) -> JsonValue {
    let sightings: Vec<JsonValue> = self.sightings.iter()
      .map(|s| json::object! { location: s.location.as_str(), day: s.day })
      .collect();
    json::object! {
      countdown: self.countdown,
      sightings: sightings,
      itineraries: JsonValue::Array(self.paths.iter().map(PathTrace::to_json).collect()),
      probability: self.probability,
      best: self.best,
      reason: self.reason.as_deref(),
    }
  }
}

impl fmt::Display for MissionTrace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "countdown: {}", self.countdown)?;
    write!(f, "sightings:")?;
    for s in &self.sightings {
      write!(f, " {}@{}", s.location, s.day)?;
    }
    writeln!(f)?;

    for (k, path) in self.paths.iter().enumerate() {
      let marker = if self.best == Some(k) { " *" } else { "" };
      writeln!(f, "itinerary #{} ({}%){}", k + 1, format_percent(path.probability), marker)?;
      for e in &path.events {
        writeln!(f, "  day {:>3}  {:<6}  {}", e.day, e.action, e.location)?;
      }
      if !path.encounters.is_empty() {
        write!(f, "  encounters:")?;
        for e in &path.encounters {
          write!(f, " {}", e)?;
        }
        writeln!(f)?;
      }
    }

    match &self.reason {
      Some(reason) => writeln!(f, "{}", reason),
      None => writeln!(f, "best: {}%", format_percent(self.probability)),
    }
  }
}


/// Rounds to two decimals, for the response body.
fn round_percent(p: f64) -> f64 {
  (p * 100.0).round() / 100.0
}

/// The response body an HTTP front end returns for one evaluation: `{success, odds, debugInfo}`
/// on success and `{success: false, error}` otherwise.  `debugInfo` is only present with a trace.
pub fn response_json<E: fmt::Display>(result: Result<&MissionOdds, E>, trace: Option<&MissionTrace>) -> JsonValue {
  match result {
    Ok(odds) => {
      let mut doc = json::object! {
        success: true,
        odds: round_percent(odds.probability),
      };
      if let Some(trace) = trace {
        doc["debugInfo"] = trace.to_json();
      }
      doc
    },
    Err(e) => json::object! {
      success: false,
      error: e.to_string(),
    },
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::fixtures::*;

  fn falcon_trace(threat: &ThreatModel) -> (MissionOdds, MissionTrace) {
    let graph = universe();
    calculate_with_trace(&graph, &falcon(&graph), threat).unwrap()
  }

  #[test]
  fn every_scored_itinerary_is_traced() {
    let threat = hunters(10, &[(HOTH, 6), (HOTH, 7), (HOTH, 8), ("Kashyyyk", 3)]);
    let (odds, trace) = falcon_trace(&threat);
    assert_eq!(trace.paths.len(), odds.considered);
    assert_eq!(trace.paths.len(), 3);
    assert_eq!(trace.best, Some(0));
    assert_eq!(trace.sightings.len(), 4);
    assert_eq!(trace.reason, None);

    let best = trace.best_path().unwrap();
    assert_eq!(best.encounters, vec![EventRecord { location: HOTH.to_string(), day: 8, action: Action::Travel }]);
    assert_eq!(best.events.first().map(|e| e.action), Some(Action::Start));

    let counts: Vec<_> = trace.paths.iter().map(|p| p.encounters.len()).collect();
    assert_eq!(counts, vec![1, 3, 3]);
  }

  #[test]
  fn infeasible_trace() {
    let (_, trace) = falcon_trace(&hunters(7, &[]));
    assert!(trace.paths.is_empty());
    assert_eq!(trace.best, None);
    assert_eq!(trace.reason.as_deref(), Some(odds::NO_FEASIBLE_ITINERARY));
    assert!(trace.to_string().ends_with("no feasible itinerary\n"));
  }

  #[test]
  fn json_rendering() {
    let (_, trace) = falcon_trace(&hunters(8, &[(HOTH, 6), (HOTH, 7), (HOTH, 8)]));
    let doc = trace.to_json();
    assert_eq!(doc["countdown"], 8);
    assert_eq!(doc["itineraries"].len(), 1);
    assert_eq!(doc["itineraries"][0]["encounters"].len(), 3);
    assert_eq!(doc["itineraries"][0]["events"][2]["action"], "REFUEL");
    assert_eq!(doc["best"], 0);
    assert!(doc["reason"].is_null());
  }

  #[test]
  fn text_rendering() {
    let (_, trace) = falcon_trace(&hunters(8, &[(HOTH, 6)]));
    let text = trace.to_string();
    assert!(text.starts_with("countdown: 8\nsightings: Hoth@6\n"));
    assert!(text.contains("itinerary #1 (90.00%) *"));
    assert!(text.contains("encounters: Hoth@6 (TRAVEL)"));
    assert!(text.ends_with("best: 90.00%\n"));
  }

  #[test]
  fn response_body() {
    let (odds, trace) = falcon_trace(&hunters(8, &[(HOTH, 6), (HOTH, 7), (HOTH, 8)]));
    let ok = Ok::<_, Error>(&odds);
    let doc = response_json(ok.clone(), Some(&trace));
    assert_eq!(doc["success"], true);
    assert_eq!(doc["odds"], 72.9);
    assert!(doc["debugInfo"].is_object());
    assert!(!response_json(ok, None).has_key("debugInfo"));

    let err: Result<&MissionOdds, _> = Err(Error::UnknownLocation("Naboo".to_string()));
    let doc = response_json(err, None);
    assert_eq!(doc["success"], false);
    assert_eq!(doc["error"], "unknown location: Naboo");
  }
}
