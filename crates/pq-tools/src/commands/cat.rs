use super::{file_arg, file_path, open, pretty_arg};
use anyhow::{Context, Result};
use clap::ArgMatches;
use pq_core::{JsonPrinter, PqError, RowWindow};
use std::io::Write;

pub struct Cat;

impl super::Command for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn definition(&self) -> clap::Command {
        clap::Command::new(self.name())
            .about("Print all rows in a Parquet file")
            .arg(file_arg())
            .arg(pretty_arg())
    }

    fn run(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
        let path = file_path(matches)?;
        let file = open(&path)?;

        let total = file.count().context("Failed to read data")?;
        if total == 0 {
            return Err(anyhow::Error::new(PqError::empty_file(&path)).context("Failed to read data"));
        }

        // rows are streamed so the whole file is never held in memory
        let rows = file
            .rows(RowWindow::all(total))
            .context("Failed to read data")?;
        let mut printer = JsonPrinter::new(out, matches.get_flag("pretty"));
        for row in rows {
            let row = row.context("Failed to read data")?;
            if !printer.print(&row).context("failed to print rows")? {
                break;
            }
        }
        printer.flush().context("failed to print rows")?;
        Ok(())
    }
}
