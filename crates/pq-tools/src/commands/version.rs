use super::write_line;
use anyhow::Result;
use clap::ArgMatches;
use parquet::file::properties::DEFAULT_CREATED_BY;
use std::io::Write;

pub struct Version;

impl super::Command for Version {
    fn name(&self) -> &'static str {
        "version"
    }

    fn definition(&self) -> clap::Command {
        clap::Command::new(self.name()).about("Print version information")
    }

    fn run(&self, _matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
        write_line(
            out,
            &format!("pq-tools version: {}", env!("CARGO_PKG_VERSION")),
        )?;
        write_line(out, "Dependencies:")?;
        write_line(out, &format!("- {}", DEFAULT_CREATED_BY))
    }
}
