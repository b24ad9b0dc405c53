use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use minijc::ast::AstPrinter;
use minijc::codegen::class_file_to_text;
use minijc::parser::{parse_minij, Lexer};
use minijc::{Config, Error};

#[derive(Parser)]
#[command(name = "minijc")]
#[command(about = "MiniJ compiler: MiniJ source to Jasmin assembly")]
#[command(version)]
struct Cli {
    /// Log phase progress (repeat for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a MiniJ file to .j files
    Compile {
        /// Input MiniJ file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory for .j files
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Keep declarations that are never read
        #[arg(long)]
        no_optimize: bool,

        /// Print the generated assembly after writing it
        #[arg(long)]
        echo: bool,
    },

    /// Analyze a MiniJ file and report semantic errors
    Check {
        /// Input MiniJ file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Parse a MiniJ file and print it back
    Parse {
        /// Input MiniJ file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the syntax tree instead of source
        #[arg(short, long)]
        tree: bool,
    },

    /// Lexically analyze a MiniJ file
    Lex {
        /// Input MiniJ file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show token locations
        #[arg(short, long)]
        locations: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Compile {
            input,
            output,
            no_optimize,
            echo,
        } => compile_file(input, output.as_deref(), *no_optimize, *echo),
        Commands::Check { input } => check_file(input),
        Commands::Parse { input, tree } => parse_file(input, *tree),
        Commands::Lex { input, locations } => lex_file(input, *locations),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))
}

fn compile_file(input: &Path, output: Option<&Path>, no_optimize: bool, echo: bool) -> Result<()> {
    let source = read_source(input)?;
    let mut config = Config::from_env()?;
    if no_optimize {
        config.optimize = false;
    }

    let class_files = match minijc::compile(&source, &config) {
        Ok(class_files) => class_files,
        Err(Error::Semantic(errors)) => {
            for error in errors.iter() {
                eprintln!("{}", error);
            }
            bail!("{}: {} semantic error(s)", input.display(), errors.len());
        }
        Err(e) => return Err(e.into()),
    };

    let output_dir = output.unwrap_or_else(|| Path::new("."));
    let written = minijc::codegen::write_class_files(&class_files, output_dir, &config)?;

    if echo {
        for class_file in &class_files {
            println!("{}", class_file_to_text(class_file));
        }
    }
    for path in &written {
        log::info!("{}", path.display());
    }
    Ok(())
}

fn check_file(input: &Path) -> Result<()> {
    let source = read_source(input)?;
    let errors = minijc::check(&source)?;
    if errors.is_empty() {
        println!("{}: ok", input.display());
        return Ok(());
    }
    for error in &errors {
        eprintln!("{}", error);
    }
    bail!("{}: {} semantic error(s)", input.display(), errors.len());
}

fn parse_file(input: &Path, tree: bool) -> Result<()> {
    let source = read_source(input)?;
    let program = parse_minij(&source)?;

    if tree {
        print!("{}", AstPrinter::new().print(&program));
    } else {
        println!("{}", program);
    }
    Ok(())
}

fn lex_file(input: &Path, locations: bool) -> Result<()> {
    let source = read_source(input)?;
    let tokens = Lexer::new(&source)
        .tokenize()
        .map_err(|e| anyhow::anyhow!("Lexical error: {}", e))?;

    for token in tokens {
        if locations {
            println!("{:?} at {}", token.token_type(), token.location());
        } else {
            println!("{:?}: '{}'", token.token_type(), token.lexeme());
        }
    }
    Ok(())
}
