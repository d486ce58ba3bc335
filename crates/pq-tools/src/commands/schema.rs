use super::{file_arg, file_path, open, write_line};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};
use pq_core::traits::SchemaInspector;
use pq_core::{describe, describe_field};
use std::io::Write;

pub struct SchemaCmd;

impl super::Command for SchemaCmd {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn definition(&self) -> clap::Command {
        clap::Command::new(self.name())
            .about("Display schema information of a Parquet file")
            .arg(file_arg())
            .arg(
                Arg::new("field")
                    .short('f')
                    .long("field")
                    .value_name("PATH")
                    .help("Only show the field at this dotted path, e.g. address.city"),
            )
    }

    fn run(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
        let path = file_path(matches)?;
        let file = open(&path)?;
        let schema = file.schema().context("Failed to read schema")?;

        if let Some(field_path) = matches.get_one::<String>("field") {
            let field = schema.get_field_by_path(field_path).ok_or_else(|| {
                anyhow!(
                    "no field '{}' in {}; fields are: {}",
                    field_path,
                    path.display(),
                    schema.all_field_paths().join(", ")
                )
            })?;
            return write_line(out, describe_field(field).trim_end());
        }

        let count = file.count().context("Failed to read schema")?;
        write_line(
            out,
            &format!(
                "Schema information for file: {}\n\n{}",
                path.display(),
                describe(schema, count)
            ),
        )
    }
}
