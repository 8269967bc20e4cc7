use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use go2rs::{Driver, Preset, Ruleset, WriterSink};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

const USAGE: &str = "usage: go2rs [<path>...]";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RulesetArg {
    Current,
    Legacy,
}

impl From<RulesetArg> for Preset {
    fn from(arg: RulesetArg) -> Self {
        match arg {
            RulesetArg::Current => Preset::Current,
            RulesetArg::Legacy => Preset::Legacy,
        }
    }
}

#[derive(Parser)]
#[command(name = "go2rs", version)]
#[command(about = "Translate Go type declarations into Rust serde types")]
struct Cli {
    /// Go source files, or directories of them
    paths: Vec<PathBuf>,

    /// Built-in ruleset to translate with
    #[arg(long, value_enum, default_value = "current")]
    ruleset: RulesetArg,

    /// JSON ruleset file (overrides --ruleset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the `use` lines the generated types need
    #[arg(long)]
    prelude: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("GO2RS_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if cli.paths.is_empty() {
        println!("{}", USAGE);
        return Ok(());
    }

    let ruleset = match &cli.config {
        Some(path) => Ruleset::from_json_file(path)
            .with_context(|| format!("could not load ruleset {}", path.display()))?,
        None => Ruleset::preset(cli.ruleset.into()),
    };

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("could not create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    if cli.prelude {
        writeln!(out, "use std::collections::HashMap;\n")?;
    }

    let mut sink = WriterSink::new(io::stderr());
    let summary = Driver::new(&ruleset).translate_paths(&cli.paths, &mut out, &mut sink)?;
    out.flush()?;

    tracing::info!(
        "{} files, {} declarations, {} skipped files, {} diagnostics",
        summary.files,
        summary.declarations,
        summary.skipped,
        sink.reported()
    );
    Ok(())
}
