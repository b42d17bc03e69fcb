use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use seqpatch::job::{DiffJob, PatchJob};
use seqpatch::{CodecKind, ElementKind, Registry};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Diff files into patches and rebuild them from patches", version)]
struct Cli {
    /// Increase logging, can be repeated
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Write the patch that turns <BASE> into <WORK>")]
    Diff(DiffArgs),
    #[command(about = "Rebuild a work file from <BASE> and a patch file")]
    Patch(PatchArgs),
}

#[derive(Args, Debug)]
struct DiffArgs {
    base: PathBuf,
    work: PathBuf,
    output: PathBuf,
    /// Element kind: normal (lines), byte or java (source tokens)
    #[arg(long, default_value = "normal")]
    kind: String,
    /// Patch file codec: text or binary
    #[arg(long, default_value = "text")]
    codec: String,
}

#[derive(Args, Debug)]
struct PatchArgs {
    base: PathBuf,
    patch: PathBuf,
    output: PathBuf,
    /// Patch file codec: text or binary
    #[arg(long, default_value = "text")]
    codec: String,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn kind(registry: &Registry, name: &str) -> ElementKind {
    registry.kind(name).unwrap_or_else(|| {
        let fallback = registry.kind_or_default(name);
        warn!(name, %fallback, "unknown element kind");
        fallback
    })
}

fn codec(registry: &Registry, name: &str) -> CodecKind {
    registry.codec(name).unwrap_or_else(|| {
        let fallback = registry.codec_or_default(name);
        warn!(name, %fallback, "unknown patch file codec");
        fallback
    })
}

fn run(cli: Cli, registry: &Registry) -> seqpatch::Result<()> {
    match cli.command {
        Commands::Diff(args) => {
            let job = DiffJob::new(
                args.base,
                args.work,
                args.output,
                kind(registry, &args.kind),
                codec(registry, &args.codec),
            )?;
            job.run()?;
        }
        Commands::Patch(args) => {
            let job = PatchJob::new(
                args.base,
                args.patch,
                args.output,
                codec(registry, &args.codec),
            )?;
            job.run(registry)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let registry = Registry::standard();

    match run(cli, &registry) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
