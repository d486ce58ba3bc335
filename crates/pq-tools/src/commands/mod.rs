//! Command registry and the shared pieces of the command handlers

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use pq_core::{JsonPrinter, ParquetFile, Record};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod cat;
mod head;
mod schema;
mod split;
mod tail;
mod version;
mod wc;

/// A subcommand of `pq`
pub trait Command {
    fn name(&self) -> &'static str;

    /// Argument definition; the clap command must be named [`Command::name`]
    fn definition(&self) -> clap::Command;

    fn run(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<()>;
}

/// Commands known to the binary, in registration order
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command
    pub fn with_builtin_commands() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(head::Head));
        registry.register(Box::new(tail::Tail));
        registry.register(Box::new(cat::Cat));
        registry.register(Box::new(wc::Wc));
        registry.register(Box::new(schema::SchemaCmd));
        registry.register(Box::new(split::Split));
        registry.register(Box::new(version::Version));
        registry
    }

    /// Add a command. A command with the same name replaces the earlier one.
    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.retain(|existing| existing.name() != command.name());
        self.commands.push(command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands
            .iter()
            .find(|command| command.name() == name)
            .map(|command| command.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|command| command.name()).collect()
    }

    /// Root clap command with one subcommand per registered command
    pub fn cli(&self) -> clap::Command {
        clap::Command::new("pq")
            .about("pq is a tool for working with Parquet files")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommands(self.commands.iter().map(|command| command.definition()))
    }

    /// Run the subcommand selected in `matches`
    pub fn dispatch(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
        let (name, sub_matches) = matches.subcommand().context("no command given")?;
        let command = self
            .get(name)
            .with_context(|| format!("unknown command '{}', expected one of {:?}", name, self.names()))?;

        log::debug!("running command {}", name);
        command.run(sub_matches, out)
    }
}

pub(crate) fn file_arg() -> Arg {
    Arg::new("file")
        .value_name("FILE")
        .help("Parquet file to read")
        .required(true)
        .value_parser(value_parser!(PathBuf))
}

/// `-n N` taken as text so a malformed value can fall back to the default
pub(crate) fn count_arg(default: &'static str, help: &'static str) -> Arg {
    Arg::new("n")
        .short('n')
        .value_name("N")
        .help(help)
        .default_value(default)
        .allow_negative_numbers(true)
}

pub(crate) fn pretty_arg() -> Arg {
    Arg::new("pretty")
        .short('p')
        .long("pretty")
        .help("Use formatted output (multiple lines per record)")
        .action(ArgAction::SetTrue)
}

pub(crate) fn file_path(matches: &ArgMatches) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>("file")
        .cloned()
        .context("missing FILE argument")
}

/// Value of `-n`; unparseable or non-positive values give `default`
pub(crate) fn positive_count(matches: &ArgMatches, default: u64) -> u64 {
    matches
        .get_one::<String>("n")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map_or(default, |n| n as u64)
}

pub(crate) fn open(path: &Path) -> Result<ParquetFile> {
    ParquetFile::open(path).context("Failed to read file")
}

pub(crate) fn print_records(records: &[Record], pretty: bool, out: &mut dyn Write) -> Result<()> {
    let mut printer = JsonPrinter::new(out, pretty);
    printer
        .print_all(records)
        .context("failed to print rows")?;
    printer.flush().context("failed to print rows")?;
    Ok(())
}

/// Write one line, treating a closed pipe as the end of output
pub(crate) fn write_line(out: &mut dyn Write, line: &str) -> Result<()> {
    match writeln!(out, "{}", line) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("failed to write output"),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use arrow_schema::{DataType, Field, Schema};
    use pq_core::{ParquetValue, Record, WriterBuilder};
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;

    /// Write `rows` records with an `id` and a mixed-case `Label`
    pub fn write_fixture(path: &Path, rows: i64) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("Label", DataType::Utf8, true),
        ]));
        let mut writer = WriterBuilder::new()
            .build(File::create(path).unwrap(), schema)
            .unwrap();
        for i in 0..rows {
            let mut record = Record::new();
            record.insert(Arc::from("id"), ParquetValue::Int64(i));
            record.insert(
                Arc::from("Label"),
                ParquetValue::from(format!("row {}", i).as_str()),
            );
            writer.write_record(record).unwrap();
        }
        writer.close().unwrap();
    }

    /// Run `pq <args>` against the built-in registry, capturing stdout
    pub fn run(args: &[&str]) -> anyhow::Result<String> {
        let registry = super::CommandRegistry::with_builtin_commands();
        let matches = registry
            .cli()
            .try_get_matches_from(std::iter::once("pq").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        registry.dispatch(&matches, &mut out)?;
        Ok(String::from_utf8(out)?)
    }
}
