mod routes;
pub use routes::RouteTableFmt;

mod json_fmt;
pub use json_fmt::{MissionFmt, IntelFmt};


mod nom_prelude {
  pub use nom::{
    IResult,
    error::{
      self,
      ParseError,
      FromExternalError,
    },
    sequence::*,
    combinator::*,
    character::complete::*,
    bytes::complete::take_while1,
    Finish,
  };
  pub use std::str::FromStr;
  pub use std::num::ParseIntError;
}

mod common;

pub trait ParseInstance<Fmt>: Sized {
  fn parse(inputs: Fmt) -> crate::Result<Self>;
}
