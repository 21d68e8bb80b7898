// SPDX-License-Identifier: GPL-3.0-or-later
use structopt::StructOpt;

use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(about = "Overlay a thermal camera on a visible camera and stream the result")]
pub(crate) struct Args {
    /// Path to a configuration file.
    #[structopt(short, long, parse(from_os_str), default_value = "config.toml")]
    pub(crate) config_path: PathBuf,

    /// Increase logging verbosity. Ignored when RUST_LOG is set.
    #[structopt(short, long, parse(from_occurrences))]
    pub(crate) verbose: u8,
}

impl Args {
    /// The default log filter for the requested verbosity.
    pub(crate) fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
