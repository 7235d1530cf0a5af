use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use stagescript_rs::{
    ExternalCodec, PackOptions, Pipeline, ReferenceTable, Report, UnpackOptions, Warning,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stage-script pack/unpack toolchain", long_about = None)]
struct Cli {
    /// Path to the external codec executable
    #[arg(long, value_name = "EXE")]
    tool: PathBuf,
    /// Format version passed through to the codec
    #[arg(long = "target-version", value_name = "VER")]
    version: String,
    /// Instruction catalog (JSON); omitted or unloadable -> numeric placeholders
    #[arg(long, value_name = "JSON")]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a compiled script and translate it to readable text
    Unpack {
        /// Input compiled script
        input: PathBuf,
        /// Output path (default: input with .txt extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Omit the `// description` documentation lines
        #[arg(long)]
        clean: bool,
        /// Keep the intermediate stream next to the output
        #[arg(long)]
        keep_intermediate: bool,
        /// Write a JSON report (output path + warnings) to FILE
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
    /// Resolve labels, reassemble, and encode back to a compiled script
    Pack {
        /// Input readable script
        input: PathBuf,
        /// Output path (default: input with .bin extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Keep the intermediate stream next to the output
        #[arg(long)]
        keep_intermediate: bool,
        /// Write a JSON report (output path + warnings) to FILE
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
}

#[derive(Debug, serde::Serialize)]
struct JsonReport<'a> {
    output: String,
    warnings: &'a [Warning],
}

fn load_table(catalog: Option<&Path>) -> ReferenceTable {
    match catalog {
        None => {
            warn!("no catalog given; instructions will use ins_<id> placeholders");
            ReferenceTable::empty()
        }
        Some(path) => match ReferenceTable::load(path) {
            Ok(table) => table,
            Err(e) => {
                warn!("{e}; falling back to an empty catalog");
                ReferenceTable::empty()
            }
        },
    }
}

fn emit(report: &Report, json_path: Option<&Path>) -> Result<()> {
    for w in &report.warnings {
        warn!("{w}");
    }
    if let Some(path) = json_path {
        let json = serde_json::to_string_pretty(&JsonReport {
            output: report.output.display().to_string(),
            warnings: &report.warnings,
        })?;
        std::fs::write(path, json)?;
    }
    println!("wrote {}", report.output.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let codec = ExternalCodec::new(&cli.tool);
    let table = load_table(cli.catalog.as_deref());
    let pipeline = Pipeline::new(&codec, &table);

    match cli.cmd {
        Command::Unpack {
            input,
            output,
            clean,
            keep_intermediate,
            report,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("txt"));
            let opts = UnpackOptions {
                version: cli.version,
                verbose: !clean,
                keep_intermediate,
            };
            let r = pipeline.unpack(&input, &output, &opts)?;
            emit(&r, report.as_deref())?;
        }
        Command::Pack {
            input,
            output,
            keep_intermediate,
            report,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("bin"));
            let opts = PackOptions {
                version: cli.version,
                keep_intermediate,
            };
            let r = pipeline.pack(&input, &output, &opts)?;
            emit(&r, report.as_deref())?;
        }
    }

    Ok(())
}
