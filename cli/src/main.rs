use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jsonschema_fixture_core::{FixtureGenerator, GenerateOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "jsonschema-fixture")]
#[command(about = "Generate random test fixtures that conform to a JSON Schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate fixture values from a JSON Schema
    Generate {
        /// Input JSON Schema file
        input: PathBuf,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of values to generate; more than one prints a JSON array
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Implicit upper bound for maximum, maxLength, maxItems and pattern repetition
        #[arg(long, default_value_t = 10)]
        default_max: u32,

        /// Fail on contradictory schemas instead of generating null
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Print the normalized (canonical) form of a JSON Schema
    Normalize {
        /// Input JSON Schema file
        input: PathBuf,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Implicit upper bound for maximum, maxLength, maxItems and pattern repetition
        #[arg(long, default_value_t = 10)]
        default_max: u32,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            count,
            seed,
            default_max,
            strict,
            format,
        } => {
            let schema = read_schema(&input)?;
            let options = GenerateOptions {
                default_max,
                strict,
            };
            let fixtures = FixtureGenerator::new(&schema, options);

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut values = fixtures
                .generate_many(count, &mut rng)
                .map_err(|e| anyhow::Error::from(e).context("Generation failed"))?;
            tracing::debug!(count = values.len(), "generated fixtures");

            if count == 1 {
                if let Some(value) = values.pop() {
                    write_json(&value, output.as_ref(), format)?;
                }
            } else {
                write_json(&values, output.as_ref(), format)?;
            }
        }
        Commands::Normalize {
            input,
            output,
            default_max,
            format,
        } => {
            let schema = read_schema(&input)?;
            let options = GenerateOptions {
                default_max,
                ..GenerateOptions::default()
            };
            let fixtures = FixtureGenerator::new(&schema, options);
            write_json(fixtures.schema(), output.as_ref(), format)?;
        }
    }

    Ok(())
}

fn read_schema(path: &Path) -> Result<Value> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse schema from: {}", path.display()))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
