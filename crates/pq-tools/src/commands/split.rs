use super::{count_arg, file_arg, file_path, positive_count, write_line};
use anyhow::{Context, Result};
use clap::ArgMatches;
use pq_core::{SplitOptions, Splitter};
use std::io::Write;

const DEFAULT_PARTS: u64 = 2;

pub struct Split;

impl super::Command for Split {
    fn name(&self) -> &'static str {
        "split"
    }

    fn definition(&self) -> clap::Command {
        clap::Command::new(self.name())
            .about("Split a Parquet file into multiple smaller files")
            .arg(file_arg())
            .arg(count_arg("2", "Number of files to split into"))
    }

    fn run(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
        let path = file_path(matches)?;
        let parts = positive_count(matches, DEFAULT_PARTS);

        let report = Splitter::new(SplitOptions::default())
            .split(&path, parts)
            .context("Failed to split file")?;

        write_line(
            out,
            &format!(
                "Successfully split file {} into {} files",
                path.display(),
                report.files_written()
            ),
        )
    }
}
