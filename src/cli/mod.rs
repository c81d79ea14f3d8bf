use std::{io, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use storefront_policy::fixtures::Fixture;
use tabled::{
    Table,
    builder::Builder,
    settings::{Color, Style, object::Rows},
};

mod describe;
mod logging;
mod quote;
mod types;

#[derive(Debug, Parser)]
#[command(
    name = "storefront-policy",
    about = "Store discount and purchase policy tools",
    long_about = None
)]
pub(crate) struct Cli {
    /// Log level used when `RUST_LOG` is not set
    #[arg(long, global = true, env = "STOREFRONT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the policy building blocks a store owner can pick from
    Types(types::TypesArgs),

    /// Describe a store fixture's policies
    Describe(describe::DescribeArgs),

    /// Check and price a store fixture's basket
    Quote(quote::QuoteArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        logging::init_subscriber(&self.log_level)?;

        let mut out = io::stdout().lock();

        match self.command {
            Commands::Types(args) => types::run(&args, &mut out),
            Commands::Describe(args) => describe::run(&args, &mut out),
            Commands::Quote(args) => quote::run(&args, &mut out).await,
        }
    }
}

/// Selects a store fixture by name or path.
#[derive(Debug, Args)]
pub(crate) struct FixtureArgs {
    /// Fixture name under `fixtures/stores`
    #[arg(long, default_value = "corner_shop")]
    store: String,

    /// Fixture file path; overrides `--store`
    #[arg(long)]
    fixture: Option<PathBuf>,
}

impl FixtureArgs {
    pub(crate) fn load(&self) -> Result<Fixture, String> {
        let fixture = match &self.fixture {
            Some(path) => Fixture::from_file(path),
            None => Fixture::load(&self.store),
        };

        fixture.map_err(|error| format!("failed to load fixture: {error}"))
    }
}

pub(crate) fn table<I, R>(header: &[&str], rows: I) -> Table
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();

    builder.push_record(header.iter().map(ToString::to_string));

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    table
}

pub(crate) fn write_out(out: &mut impl io::Write, text: &str) -> Result<(), String> {
    writeln!(out, "{text}").map_err(|error| format!("failed to write output: {error}"))
}
