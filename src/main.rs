//! # brn CLI
//!
//! Command-line interface for the bulk renamer.
//!
//! ## Usage
//! ```bash
//! brn *.jpg                          # rename to %H%.%E
//! brn -f '%(-=2)U%.%E' -n a-b.txt    # dry run
//! brn -p 's/ /_/' -L --as-mv - *.txt # print a script
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("brn: {e}");
            ExitCode::FAILURE
        }
    }
}
