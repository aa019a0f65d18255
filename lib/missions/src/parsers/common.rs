use super::nom_prelude::*;

pub fn u32_<'a, E>(input: &'a str) -> IResult<&'a str, u32, E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  map_res(digit1, u32::from_str)(input)
}

/// A location identifier: any run of non-whitespace characters.
pub fn location<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
  where
    E: ParseError<&'a str>
{
  take_while1(|c: char| !c.is_whitespace())(input)
}
