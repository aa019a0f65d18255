use std::fmt;
use std::path::Path;
use fnv::{FnvHashMap, FnvHashSet};

pub mod graph;
pub mod mission;
pub mod search;
pub mod odds;
pub mod trace;
pub mod data;

pub use missions::raw::mission::Day;
/// Interned location index; index order is the lexicographic order of the location names.
pub type Loc = u16;

pub type Map<K, V> = FnvHashMap<K, V>;
pub type Set<T> = FnvHashSet<T>;

pub use graph::{Route, RouteGraph};
pub use mission::{MissionConfig, Sighting, ThreatModel};
pub use search::{Action, TimedEvent, Itinerary};
pub use odds::{calculate, calculate_with_trace, MissionOdds, OddsCalculator, Strategy};
pub use trace::MissionTrace;


#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    ConflictingRoute { origin: String, destination: String, existing: Day, conflicting: Day },
    ZeroTravelTime { origin: String, destination: String },
    UnknownLocation(String),
    TooManyLocations(usize),
    ExpansionLimit { limit: u64 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConflictingRoute { origin, destination, existing, conflicting } =>
                write!(f, "conflicting travel times for route {} - {}: {} and {}", origin, destination, existing, conflicting),
            Error::ZeroTravelTime { origin, destination } =>
                write!(f, "route {} - {} has a travel time of zero", origin, destination),
            Error::UnknownLocation(name) => write!(f, "unknown location: {}", name),
            Error::TooManyLocations(n) => write!(f, "too many locations: {}", n),
            Error::ExpansionLimit { limit } => write!(f, "search exceeded {} node expansions", limit),
        }
    }
}

impl std::error::Error for Error {}


mod logging_setup {
    use super::*;
    use std::fs::File;
    use tracing_subscriber::{EnvFilter, fmt, registry, prelude::*};
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_appender::{non_blocking, non_blocking::WorkerGuard};

    /// Log files are rewritten on every run.
    fn open_logfile(path: &Path) -> std::io::Result<File> {
        std::fs::OpenOptions::new().create(true).write(true).truncate(true).open(path)
    }

    /// Tests share one process, so only the first test to get here installs a subscriber.
    fn install(subscriber: impl SubscriberInitExt, shared: bool) {
        if shared {
            subscriber.try_init().ok();
        } else {
            subscriber.init();
        }
    }

    fn setup(logfile: Option<&Path>, shared: bool) -> std::io::Result<Option<WorkerGuard>> {
        let console = registry()
            .with(EnvFilter::from_default_env())
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false));

        let path = match logfile {
            Some(path) => path,
            None => {
                install(console, shared);
                return Ok(None);
            }
        };

        let (writer, guard) = non_blocking::NonBlockingBuilder::default()
            .lossy(false)
            .finish(open_logfile(path)?);
        let records = fmt::layer()
            .json()
            .with_span_list(true)
            .with_current_span(false)
            .with_writer(writer);
        install(console.with(records), shared);
        Ok(Some(guard))
    }

    /// Installs the global subscriber: human-readable events on stderr, filtered by `RUST_LOG`,
    /// and one JSON record per event in `logfile` if given.  Keep the guard alive until exit so the
    /// file gets flushed.
    pub fn init_logging(logfile: Option<impl AsRef<Path>>) -> std::io::Result<Option<WorkerGuard>> {
        setup(logfile.as_ref().map(AsRef::as_ref), false)
    }

    #[cfg(test)]
    pub(crate) fn init_test_logging(logfile: Option<impl AsRef<Path>>) -> std::io::Result<Option<WorkerGuard>> {
        setup(logfile.as_ref().map(AsRef::as_ref), true)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn logfile_is_truncated() {
            let path = std::env::temp_dir().join(format!("oddsgen-log-{}.json", std::process::id()));
            std::fs::write(&path, "stale records").unwrap();
            let guard = init_test_logging(Some(&path)).unwrap();
            assert!(guard.is_some());
            drop(guard);
            assert!(!std::fs::read_to_string(&path).unwrap().contains("stale"));
            std::fs::remove_file(&path).ok();

            assert!(init_test_logging(None::<&str>).unwrap().is_none());
        }
    }
}
pub use logging_setup::*;


#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const TATOOINE: &str = "Tatooine";
    pub const DAGOBAH: &str = "Dagobah";
    pub const HOTH: &str = "Hoth";
    pub const ENDOR: &str = "Endor";

    pub fn universe() -> RouteGraph {
        RouteGraph::build(&[
            Route::new(TATOOINE, DAGOBAH, 6),
            Route::new(TATOOINE, HOTH, 6),
            Route::new(DAGOBAH, ENDOR, 4),
            Route::new(DAGOBAH, HOTH, 1),
            Route::new(HOTH, ENDOR, 1),
        ]).unwrap()
    }

    pub fn falcon(graph: &RouteGraph) -> MissionConfig {
        MissionConfig::new(graph, 6, TATOOINE, ENDOR).unwrap()
    }

    pub fn hunters(countdown: Day, sightings: &[(&str, Day)]) -> ThreatModel {
        ThreatModel::new(countdown, sightings.iter().map(|&(loc, day)| Sighting::new(loc, day)))
    }

    /// Builds the events of an itinerary from `(location, day, action)` triples.
    pub fn events(graph: &RouteGraph, triples: &[(&str, Day, Action)]) -> Vec<TimedEvent> {
        triples.iter()
            .map(|&(name, day, action)| TimedEvent::new(graph.loc(name).unwrap(), day, action))
            .collect()
    }
}
