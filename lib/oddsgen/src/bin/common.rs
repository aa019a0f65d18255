use std::fmt::Display;
use std::str::FromStr;
use std::path::PathBuf;
use std::io;
use anyhow::Result;
use structopt::StructOpt;

#[derive(Clone, Debug, StructOpt)]
pub struct OutputOptions {
  /// Report format
  #[structopt(long="format", short="f", parse(try_from_str), default_value="text", possible_values=&OUTPUT_FORMAT_STRINGS)]
  pub fmt: OutputFormat,
  /// Write the report here instead of stdout
  #[structopt(long="output", short="o")]
  pub file: Option<PathBuf>,
  /// Also write JSON logs to this file
  #[structopt(long)]
  pub log: Option<PathBuf>,
}

pub fn clap_range_validator<T>(minval: Option<T>, maxval: Option<T>) -> impl Fn(String) -> Result<(), String>
  where
    T: FromStr + PartialOrd + Display + Copy,
    T::Err: Display
{
  move |val| {
    let x: T = val.parse().map_err(|e: T::Err| e.to_string())?;
    if let Some(y) = minval {
      if x < y { return Err(format!("must be at least {}", y)); }
    }
    if let Some(y) = maxval {
      if x > y { return Err(format!("must be at most {}", y)); }
    }
    Ok(())
  }
}

pub const OUTPUT_FORMAT_STRINGS: [&str; 2] = ["text", "json"];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutputFormat {
  Text,
  Json,
}

impl FromStr for OutputFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      _ => Err(format!("invalid string: {}", s))
    }
  }
}

impl Default for OutputFormat {
  fn default() -> Self { OutputFormat::Text }
}


pub trait Report {
  fn write_text(&self, buf: impl io::Write) -> Result<()>;
  fn write_json(&self, buf: impl io::Write) -> Result<()>;

  fn write(&self, buf: impl io::Write, output: OutputFormat) -> Result<()> {
    match output {
      OutputFormat::Text => self.write_text(buf)?,
      OutputFormat::Json => self.write_json(buf)?,
    };
    Ok(())
  }
}

pub fn output_report(options: &OutputOptions, report: &impl Report) -> Result<()> {
  match options.file.as_ref() {
    Some(path) => {
      let writer = io::BufWriter::new(std::fs::File::create(path)?);
      report.write(writer, options.fmt)?;
    }
    None => {
      report.write(io::stdout(), options.fmt)?;
    }
  }
  Ok(())
}
