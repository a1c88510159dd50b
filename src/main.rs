//! CLI for running compiled Datalog programs over fact files.
//!
//! Usage:
//!   datalog-bridge programs                 List compiled programs
//!   datalog-bridge relations <program>      Show a program's relations
//!   datalog-bridge run <program> [options]  Load facts, run, write outputs

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use bridge_api::{BridgeError, Program, Relation};
use bridge_engine::ProgramFactory;
use clap::{ArgAction, Parser, Subcommand};
use datalog_bridge::config::{self, BridgeConfig, ConfigError};
use datalog_bridge::facts::{self, FactsError};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datalog-bridge")]
#[command(version, about = "Run compiled Datalog programs over fact files", long_about = None)]
struct Cli {
    /// Log more; repeat for debug and trace output
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the compiled programs
    Programs,

    /// Show the relations of a program with their role and columns
    Relations {
        program: String,
    },

    /// Load input facts, run to fixpoint and write the output relations
    Run {
        program: String,

        /// Directory holding `<relation>.facts` files
        #[arg(short = 'F', long)]
        fact_dir: Option<PathBuf>,

        /// Directory for `<relation>.csv` files, or `-` for stdout
        #[arg(short = 'D', long)]
        output_dir: Option<PathBuf>,

        /// Field delimiter (`\t` for tab)
        #[arg(short = 'd', long)]
        delimiter: Option<String>,

        /// TOML file with `fact_dir`, `output_dir` and `delimiter`
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("unknown program `{0}` (see `datalog-bridge programs`)")]
    UnknownProgram(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Facts(#[from] FactsError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    bridge_programs::install();

    let result = match cli.command {
        Command::Programs => list_programs(),
        Command::Relations { program } => list_relations(&program),
        Command::Run {
            program,
            fact_dir,
            output_dir,
            delimiter,
            config,
        } => resolve_config(config, fact_dir, output_dir, delimiter)
            .and_then(|config| run_program(&program, &config)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn list_programs() -> Result<(), CliError> {
    for name in ProgramFactory::programs() {
        println!("{name}");
    }
    Ok(())
}

fn open(name: &str) -> Result<Program, CliError> {
    Program::create(name).ok_or_else(|| CliError::UnknownProgram(name.to_string()))
}

fn list_relations(name: &str) -> Result<(), CliError> {
    let program = open(name)?;
    for relation in program.relations() {
        let decl = relation.declaration();
        println!("{:<12} {decl}", decl.role.to_string());
    }
    Ok(())
}

/// Config file first, then command-line flags on top.
fn resolve_config(
    path: Option<PathBuf>,
    fact_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    delimiter: Option<String>,
) -> Result<BridgeConfig, CliError> {
    let mut config = match path {
        Some(path) => BridgeConfig::load(&path)?,
        None => BridgeConfig::default(),
    };
    if let Some(dir) = fact_dir {
        config.fact_dir = dir;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(delimiter) = delimiter {
        config.delimiter = config::parse_delimiter(&delimiter)?;
    }
    debug!(?config, "configuration resolved");
    Ok(config)
}

fn run_program(name: &str, config: &BridgeConfig) -> Result<(), CliError> {
    let mut program = open(name)?;

    for relation in program.relations().filter(|r| r.declaration().role.is_input()) {
        let path = config.fact_file(relation.name());
        if !path.is_file() {
            debug!(relation = relation.name(), path = %path.display(), "no fact file");
            continue;
        }
        let added = facts::load_relation(relation, &path, config.delimiter)?;
        info!(relation = relation.name(), added, "facts loaded");
    }

    program.run()?;

    if !config.writes_to_stdout() {
        fs::create_dir_all(&config.output_dir).map_err(|source| CliError::Output {
            path: config.output_dir.clone(),
            source,
        })?;
    }
    for relation in program.relations().filter(|r| r.declaration().role.is_output()) {
        write_output(relation, config)?;
    }
    Ok(())
}

fn write_output(relation: Relation<'_>, config: &BridgeConfig) -> Result<(), CliError> {
    if config.writes_to_stdout() {
        let mut out = io::stdout().lock();
        let rule = "===============";
        writeln!(out, "---------------\n{}\n{rule}", relation.name()).map_err(FactsError::Write)?;
        facts::write_relation(relation, &mut out, config.delimiter)?;
        writeln!(out, "{rule}").map_err(FactsError::Write)?;
        return Ok(());
    }

    let path = config.output_file(relation.name());
    let file = File::create(&path).map_err(|source| CliError::Output {
        path: path.clone(),
        source,
    })?;
    let written = facts::write_relation(relation, &mut BufWriter::new(file), config.delimiter)?;
    info!(relation = relation.name(), written, path = %path.display(), "output written");
    Ok(())
}
