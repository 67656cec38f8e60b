//! Usage command: render an address usage map from memory listings.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use presid::metrics;
use presid::usage::UsageHistogram;
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Handle the `usage` command.
pub fn cmd_usage(input: Option<&Path>) -> i32 {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                error!(error = %e, path = %path.display(), "failed to open listing");
                return EXIT_FAILURE;
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    let histogram = match UsageHistogram::parse(reader) {
        Ok(histogram) => histogram,
        Err(e) => {
            error!(error = %e, "failed to read listing");
            return EXIT_FAILURE;
        }
    };
    metrics::record_usage_lines(histogram.lines());
    info!(
        lines = histogram.lines(),
        skipped = histogram.skipped(),
        "listing parsed"
    );

    let mut out = BufWriter::new(io::stdout().lock());
    if let Err(e) = histogram.render(&mut out).and_then(|()| out.flush()) {
        error!(error = %e, "failed to write usage map");
        return EXIT_FAILURE;
    }
    EXIT_SUCCESS
}
