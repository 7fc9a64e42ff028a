//! Convert an osu!mania beatmap into a StepMania chart, or analyze the note stream of a chart.
//!
//! Usage:
//!   cargo run --example osu2sm -- <input.osu> <output.sm> [quantization]
//!   cargo run --example osu2sm -- analyze <chart.sm>
//!
//! Set `RUST_LOG=debug` to see what the converter decides.

use std::{num::NonZeroU32, path::PathBuf, process::ExitCode};

use clap::{Args, CommandFactory, Parser, Subcommand, error::ErrorKind};
use osu2sm_rs::{
    convert::{ConvertOptions, DEFAULT_QUANTIZATION},
    pipeline::{ConvertError, analyze_sm_file, convert_file},
    sm::NoteStreamConfig,
};

/// Command line of the converter
#[derive(Parser, Debug)]
#[command(name = "osu2sm")]
#[command(about = "Converts osu!mania beatmaps into StepMania charts", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    convert: ConvertArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild and summarize the note stream of a `.sm` chart
    Analyze {
        /// Chart file path
        #[arg(value_name = "FILE")]
        chart: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input `.osu` file
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output `.sm` file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Rows per measure
    #[arg(value_name = "QUANTIZATION", default_value_t = DEFAULT_QUANTIZATION)]
    quantization: NonZeroU32,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Analyze { chart }) => analyze(chart),
        None => {
            let (Some(input), Some(output)) = (cli.convert.input, cli.convert.output) else {
                Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "both <INPUT> and <OUTPUT> are required to convert",
                    )
                    .exit();
            };
            run_convert(input, output, cli.convert.quantization)
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("✗ Conversion failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_convert(
    input: PathBuf,
    output: PathBuf,
    quantization: NonZeroU32,
) -> Result<(), ConvertError> {
    let options = ConvertOptions::default().with_quantization(quantization);
    let summary = convert_file(&input, &output, &options)?;
    println!("✓ Conversion successful!");
    println!("  Title: {}", summary.title);
    println!("  Artist: {}", summary.artist);
    println!("  Version: {}", summary.version);
    println!("  Keys: {}", summary.key_count);
    println!("  Objects: {}", summary.hit_objects);
    println!("  Timing points: {}", summary.timing_points);
    if let Some(path) = &summary.output_path {
        println!("  Output: {}", path.display());
    }
    Ok(())
}

fn analyze(chart: PathBuf) -> Result<(), ConvertError> {
    let output = analyze_sm_file(&chart, &NoteStreamConfig::default())?;
    let notes: u32 = output.events.iter().map(|event| event.note_count()).sum();
    println!("{}", chart.display());
    println!("  Rows: {}", output.events.len());
    println!("  Notes: {notes}");
    if let (Some(first), Some(last)) = (output.events.first(), output.events.last()) {
        println!(
            "  Span: {:.3}s .. {:.3}s",
            first.time_seconds, last.time_seconds
        );
    }
    println!("  Stats: {:?}", output.stats);
    for warning in &output.warnings {
        println!("  ⚠️  {warning}");
    }
    Ok(())
}
