pub use anyhow::Result;

use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    UnknownScenarioName(String),
    IndexOutOfRange(usize),
    MissingField(&'static str),
    InvalidField(&'static str),
    MalformedRouteRow { line: usize, content: String },
}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownScenarioName(name) => write!(f, "unknown scenario name: {}", name),
            Error::IndexOutOfRange(idx) => write!(f, "scenario index {} out of range", idx),
            Error::MissingField(key) => write!(f, "missing required configuration key: {}", key),
            Error::InvalidField(key) => write!(f, "invalid value for configuration key: {}", key),
            Error::MalformedRouteRow { line, content } =>
                write!(f, "malformed route on line {}: {:?}", line, content),
        }
    }
}

impl std::error::Error for Error {}


pub mod dataset;
pub mod raw;

mod parsers;
pub use parsers::{ParseInstance, RouteTableFmt, MissionFmt, IntelFmt};
