//! Oxi CLI
//!
//! Main entry point for the `oxi` command.

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use oxi::{Config, Interpreter, SourceFile};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "oxi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "The Oxi scripting language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an Oxi source file
    Run {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Evaluate source given on the command line
    Eval {
        /// Program text
        #[arg(value_name = "SOURCE")]
        source: String,
    },

    /// Print the tokens of a source file
    Tokens {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the AST of a source file as JSON
    Parse {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };

    // Initialize tracing; RUST_LOG wins over the config file
    let default_filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_filter.clone().unwrap_or_else(|| "warn".to_string())
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { input } => {
            let source = read_source(&input)?;
            execute(source, config)
        }
        Commands::Eval { source } => execute(SourceFile::new("<eval>", source), config),
        Commands::Tokens { input } => tokens(&input),
        Commands::Parse { input } => parse(&input),
    }
}

fn read_source(input: &Path) -> Result<SourceFile> {
    let content = std::fs::read_to_string(input)
        .map_err(|e| miette::miette!("Failed to read input file: {}", e))?;
    Ok(SourceFile::new(input.to_string_lossy(), content))
}

fn execute(source: SourceFile, config: Config) -> Result<()> {
    tracing::info!("Running {}", source.name);

    let mut interpreter = Interpreter::with_config(config);
    let value = oxi::run_with(&mut interpreter, &source.content).map_err(|e| source.report(e))?;
    println!("{}", value.to_literal());
    Ok(())
}

fn tokens(input: &Path) -> Result<()> {
    let source = read_source(input)?;
    let tokens = oxi::lexer::lex(&source.content).map_err(|e| source.report(e))?;

    for token in &tokens {
        println!("{:>4}:{:<3} {:<12} {}", token.line, token.column, token.kind.as_str(), token.text);
    }
    Ok(())
}

fn parse(input: &Path) -> Result<()> {
    let source = read_source(input)?;
    let tokens = oxi::lexer::lex(&source.content).map_err(|e| source.report(e))?;
    let program = oxi::parser::parse_program(&tokens).map_err(|e| source.report(e))?;

    let json = serde_json::to_string_pretty(&program)
        .map_err(|e| miette::miette!("Failed to serialize AST: {}", e))?;
    println!("{}", json);
    Ok(())
}
