use super::{count_arg, file_arg, file_path, open, positive_count, pretty_arg, print_records};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::io::Write;

const DEFAULT_ROWS: u64 = 10;

pub struct Tail;

impl super::Command for Tail {
    fn name(&self) -> &'static str {
        "tail"
    }

    fn definition(&self) -> clap::Command {
        clap::Command::new(self.name())
            .about("Display the last few rows of a Parquet file")
            .arg(file_arg())
            .arg(count_arg("10", "Number of rows to display"))
            .arg(pretty_arg())
    }

    fn run(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
        let path = file_path(matches)?;
        let n = positive_count(matches, DEFAULT_ROWS);

        let mut file = open(&path)?;
        let rows = file.tail(n).context("Failed to read data")?;
        file.close();

        print_records(&rows, matches.get_flag("pretty"), out)
    }
}
