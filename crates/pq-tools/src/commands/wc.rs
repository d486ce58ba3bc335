use super::{file_arg, file_path, open, write_line};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches};
use std::io::Write;

pub struct Wc;

impl super::Command for Wc {
    fn name(&self) -> &'static str {
        "wc"
    }

    fn definition(&self) -> clap::Command {
        clap::Command::new(self.name())
            .about("Count the number of rows in a Parquet file")
            .arg(file_arg())
            .arg(
                Arg::new("lines")
                    .short('l')
                    .help("Display only the row count")
                    .action(ArgAction::SetTrue),
            )
    }

    fn run(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
        let path = file_path(matches)?;
        let count = open(&path)?.count().context("Failed to count rows")?;

        if matches.get_flag("lines") {
            write_line(out, &count.to_string())
        } else {
            write_line(out, &format!("{} {}", count, path.display()))
        }
    }
}
