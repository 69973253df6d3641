use anyhow::Result;
use clap::{Parser, ValueEnum};
use lumen_driver::{Action, CompilerOptions, Driver, InputSource};
use std::path::PathBuf;

/// Command-line surface for the frontend driver: one binary, flag-based
/// (`--emit=` picks the action), rather than a subcommand per action —
/// every action shares the same input/output/search-path plumbing, so a
/// subcommand split would just duplicate the flag set seven times over.
#[derive(Parser)]
#[command(name = "lumenc", version, about = "Lumen compiler frontend driver")]
struct Cli {
    /// Source files to compile
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// What to produce
    #[arg(long, value_enum, default_value = "check")]
    emit: EmitKind,

    /// Output path (only honored for a single-input run)
    #[arg(short = 'o', long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Optimization level
    #[arg(short = 'O', default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=3))]
    opt_level: u8,

    /// Module/package search directory (repeatable)
    #[arg(short = 'I', value_name = "DIR")]
    include: Vec<PathBuf>,

    /// Library search directory (repeatable)
    #[arg(short = 'L', value_name = "DIR")]
    lib_dir: Vec<PathBuf>,

    /// Library to link (repeatable)
    #[arg(short = 'l', value_name = "NAME")]
    link: Vec<String>,

    /// Standard library directory override
    #[arg(long, value_name = "DIR")]
    stdlib: Option<PathBuf>,

    /// Incremental-cache directory
    #[arg(long, value_name = "DIR")]
    cache: Option<PathBuf>,

    /// Verbose operational logging (pass-timing, file loads)
    #[arg(long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EmitKind {
    Tokens,
    Ast,
    Pretty,
    Check,
    Llvm,
    Obj,
    Exe,
}

impl From<EmitKind> for Action {
    fn from(kind: EmitKind) -> Action {
        match kind {
            EmitKind::Tokens => Action::Tokens,
            EmitKind::Ast => Action::Ast,
            EmitKind::Pretty => Action::Pretty,
            EmitKind::Check => Action::Check,
            EmitKind::Llvm => Action::Llvm,
            EmitKind::Obj => Action::Obj,
            EmitKind::Exe => Action::Exe,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let action: Action = cli.emit.into();
    log::info!("opt_level={} inputs={}", cli.opt_level, cli.inputs.len());

    let inputs: Vec<InputSource> = cli.inputs.iter().cloned().map(InputSource::File).collect();

    let mut options = CompilerOptions::new(inputs, action);
    options.output = cli.output;
    options.opt_level = cli.opt_level;
    options.include_dirs = cli.include;
    options.lib_dirs = cli.lib_dir;
    options.link_libs = cli.link;
    options.stdlib_dir = cli.stdlib;
    options.cache_dir = cli.cache;
    options.verbose = cli.verbose;

    println!("📦 compiling {} file(s)...", options.inputs.len());

    let driver = Driver::new(options);
    let result = driver.run();

    if result.is_success() {
        println!("✅ {:?} OK", action);
    } else {
        println!("❌ {:?} failed: {:?}", action, result);
    }

    std::process::exit(result.exit_code());
}
