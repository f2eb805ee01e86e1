#![doc = include_str!("../README.md")]

mod bytes;
mod error;
mod output;
mod parser;

pub mod activity;
pub mod parameters;
pub mod record;
pub mod timecode;

use std::path::Path;

pub use error::{Error, Result};
pub use output::{scale_and_round, Activity, COLUMNS, SIGNIFICANT_DIGITS};
pub use parser::Parser;
pub use record::{RecordHeader, RecordType, Summary};

/// Decode the activity samples in the `log.bin` file at `path`.
///
/// Shorthand for configuring a [Parser] and calling [Parser::parse].
///
/// # Errors
/// See [Parser::parse].
pub fn parse<P>(
    path: P,
    max_samples: usize,
    scale_factor: f64,
    sample_rate: u32,
    verbose: bool,
    debug: bool,
) -> Result<Activity>
where
    P: AsRef<Path>,
{
    Parser::builder()
        .max_samples(max_samples)
        .scale_factor(scale_factor)
        .sample_rate(sample_rate)
        .verbose(verbose)
        .debug(debug)
        .build()
        .parse(path)
}
