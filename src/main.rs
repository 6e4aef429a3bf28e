use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dix::frontend::Lexer;
use dix::frontend::token_dumper::TokenDumper;
use dix::{DumpOptions, interpret_with};

/// sysexits EX_IOERR
const EXIT_IO_ERROR: u8 = 74;

#[derive(Parser, Debug)]
#[command(name = "dix")]
#[command(about = "Compile and run a single dix expression")]
struct Cli {
    /// Source file (must end in .dix)
    #[arg(required_unless_present = "expr", conflicts_with = "expr")]
    file: Option<PathBuf>,

    /// Evaluate an expression given on the command line
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    expr: Option<String>,

    /// Print the token stream and stop
    #[arg(long)]
    tokens: bool,

    /// Disable ANSI colors in the token dump
    #[arg(long)]
    no_color: bool,

    /// Print tokens with their lexeme instead of the Debug form
    #[arg(long)]
    pretty: bool,

    /// Print the typed syntax tree before running
    #[arg(long)]
    ast: bool,

    /// Print the bytecode disassembly before running
    #[arg(long = "bc", alias = "bytecode")]
    bytecode: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("DIX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let source = match load_source(&cli) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(EXIT_IO_ERROR);
        }
    };

    if cli.tokens {
        return dump_tokens(&source, cli.no_color, cli.pretty);
    }

    let options = DumpOptions {
        tokens: false,
        ast: cli.ast,
        bytecode: cli.bytecode,
        color: !cli.no_color,
    };
    let result = interpret_with(&source, options);
    tracing::info!(status = ?result, "done");
    ExitCode::from(result.exit_code())
}

fn load_source(cli: &Cli) -> anyhow::Result<String> {
    if let Some(expr) = &cli.expr {
        return Ok(expr.clone());
    }
    let Some(path) = &cli.file else {
        bail!("no input given");
    };
    ensure_extension(path)?;
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn ensure_extension(path: &Path) -> anyhow::Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some("dix") {
        bail!("expected a .dix file, got {}", path.display());
    }
    Ok(())
}

fn dump_tokens(source: &str, no_color: bool, pretty: bool) -> ExitCode {
    let tokens = Lexer::new(source).tokenize();

    let mut dumper = TokenDumper::new();
    if no_color {
        dumper = dumper.no_color();
    }
    if pretty {
        dumper = dumper.pretty();
    }

    let mut out = io::stdout().lock();
    match dumper.dump(&tokens, &mut out).and_then(|()| out.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("failed to write tokens: {}", e);
            ExitCode::from(EXIT_IO_ERROR)
        }
    }
}
