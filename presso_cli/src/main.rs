use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use presso_codecs::{default_registry, zstd_available};
use presso_core::{CompressorRegistry, Settings};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "presso",
    about = "Compress, detect, and decompress payloads via the codec registry",
    version
)]
struct Cli {
    /// Settings passed through to the registry, e.g.
    /// -S compress.default.type=zstd -S compress.zstd.level=19
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    set: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file with the default codec (or an explicit one)
    Compress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
        /// Codec to use instead of the configured default: lz4 | zstd | gzip
        #[arg(short, long)]
        codec: Option<String>,
    },
    /// Decompress a file if its codec is recognized, else copy it through
    Decompress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" writes stdout)
        output: PathBuf,
    },
    /// Print which codec produced a file, or "plain" if none matched
    Detect {
        /// File to sniff ("-" reads stdin)
        file: PathBuf,
    },
    /// List registered codecs in detection order, with the current default
    List,
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn settings_from_args(pairs: &[String]) -> anyhow::Result<Settings> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow::anyhow!("invalid setting '{}', expected KEY=VALUE", pair))
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .map(Settings::from_iter)
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    if path.to_str() == Some("-") {
        io::stdin().lock().read_to_end(&mut data)?;
    } else {
        File::open(path)
            .with_context(|| format!("opening input file {:?}", path))?
            .read_to_end(&mut data)?;
    }
    Ok(data)
}

fn write_output(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    if path.to_str() == Some("-") {
        io::stdout().lock().write_all(data)?;
    } else {
        File::create(path)
            .with_context(|| format!("creating output file {:?}", path))?
            .write_all(data)?;
    }
    Ok(())
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(
    registry: &CompressorRegistry,
    input: PathBuf,
    output: PathBuf,
    codec_name: Option<&str>,
) -> anyhow::Result<()> {
    let codec = match codec_name {
        Some(name) => registry
            .by_name(name)
            .ok_or_else(|| {
                anyhow::anyhow!("unknown codec '{}'. Valid options: lz4, zstd, gzip", name)
            })?
            .clone(),
        None => registry.default_codec(),
    };

    let data = read_input(&input)?;
    let t0 = Instant::now();
    let compressed = codec.compress(&data)?;
    let elapsed = t0.elapsed();
    write_output(&output, &compressed)?;

    let ratio = data.len() as f64 / compressed.len().max(1) as f64;
    eprintln!("  codec      : {}", codec.name());
    eprintln!("  raw size   : {}", human_bytes(data.len() as u64));
    eprintln!("  compressed : {}", human_bytes(compressed.len() as u64));
    eprintln!("  ratio      : {:.2}x", ratio);
    eprintln!("  elapsed    : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_decompress(
    registry: &CompressorRegistry,
    input: PathBuf,
    output: PathBuf,
) -> anyhow::Result<()> {
    let data = read_input(&input)?;
    match registry.detect(&data) {
        Some(codec) => eprintln!("  codec      : {}", codec.name()),
        None => eprintln!("  codec      : plain (copied through unchanged)"),
    }
    let raw = registry.uncompress_if_needed(&data)?;
    write_output(&output, &raw)?;
    eprintln!("  output     : {}", human_bytes(raw.len() as u64));
    Ok(())
}

fn run_detect(registry: &CompressorRegistry, file: PathBuf) -> anyhow::Result<()> {
    // Files go through the seekable entry point so only the header bytes
    // are ever read; stdin cannot seek, so it is slurped and sniffed as a
    // byte slice instead.
    let name = if file.to_str() == Some("-") {
        let data = read_input(&file)?;
        registry.detect(&data).map(|c| c.name())
    } else {
        let mut f = File::open(&file).with_context(|| format!("opening file {:?}", file))?;
        registry.detect_seekable(&mut f)?.map(|c| c.name())
    };
    println!("{}", name.unwrap_or("plain"));
    Ok(())
}

fn run_list(registry: &CompressorRegistry) -> anyhow::Result<()> {
    let default = registry.default_codec();
    println!("codecs in detection order:");
    for codec in registry.codecs() {
        let mut notes = Vec::new();
        if codec.name() == default.name() {
            notes.push("default");
        }
        if codec.name() == "zstd" && !zstd_available() {
            notes.push("unavailable");
        }
        if notes.is_empty() {
            println!("  {}", codec.name());
        } else {
            println!("  {} ({})", codec.name(), notes.join(", "));
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = default_registry();
    let settings = settings_from_args(&cli.set)?;
    registry.configure(&settings)?;

    match cli.command {
        Commands::Compress {
            input,
            output,
            codec,
        } => run_compress(&registry, input, output, codec.as_deref()),
        Commands::Decompress { input, output } => run_decompress(&registry, input, output),
        Commands::Detect { file } => run_detect(&registry, file),
        Commands::List => run_list(&registry),
    }
}
