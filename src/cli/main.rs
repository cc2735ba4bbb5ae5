use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

use meta_export::config::{self, Capabilities};
use meta_export::metadata::{self, MetadataInput};
use meta_export::pipeline::{self, ExportOptions, ExportRequest, Exporter, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "meta-export",
    version,
    about = "Export images under collision-free names with embedded source, title and tag metadata"
)]
struct Cli {
    /// Input image files or directories (one batch, in order)
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Filename prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Output format: png, jpg or webp
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Quality 1–100
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Zero-padding width of the sequence number (0–10)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    padding: Option<u8>,

    /// Overwrite existing files instead of skipping them
    #[arg(long)]
    overwrite: bool,

    /// Source URL or reference
    #[arg(long, default_value = "")]
    source: String,

    /// Title
    #[arg(long, default_value = "")]
    title: String,

    /// Primary tag list (comma or space separated)
    #[arg(long, default_value = "")]
    tags: String,

    /// Pixiv tag list
    #[arg(long)]
    pixiv_tags: Option<String>,

    /// Danbooru tag list
    #[arg(long)]
    danbooru_tags: Option<String>,

    /// Character name
    #[arg(long)]
    character: Option<String>,

    /// Print the embedded metadata of the given files and exit
    #[arg(long = "show-metadata")]
    show_metadata: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --show-metadata
    if cli.show_metadata {
        for path in &images {
            print_metadata(path)?;
        }
        return Ok(());
    }

    // Load config, then let flags override it
    let config = config::Config::load(cli.config.as_deref())?;
    let mut options = ExportOptions::from_config(&config.output);
    if let Some(ref dir) = cli.output {
        options.output_dir = dir.clone();
    }
    if let Some(ref prefix) = cli.prefix {
        options.prefix = prefix.clone();
    }
    if let Some(format) = cli.format {
        options.format = format;
    }
    if let Some(quality) = cli.quality {
        options.quality = quality;
    }
    if let Some(padding) = cli.padding {
        options.padding = usize::from(padding);
    }
    if cli.overwrite {
        options.overwrite = true;
    }

    let exporter = Exporter::new(Capabilities::detect());
    if !exporter.capabilities().available_formats().contains(&options.format) {
        anyhow::bail!("Output format {:?} is not available in this build", options.format);
    }

    log::info!("Found {} image(s) to export", images.len());
    let batch = pipeline::load_images(&images)?;

    let request = ExportRequest {
        images: &batch,
        metadata: MetadataInput {
            source: cli.source,
            title: cli.title,
            tags: cli.tags,
            pixiv_tags: cli.pixiv_tags,
            danbooru_tags: cli.danbooru_tags,
            character: cli.character.map(Value::String),
        },
        options,
    };

    let output = exporter.export(&request)?;

    // JSON output
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output.ui_json())?);
    } else {
        for result in &output.results {
            println!("{}", request.options.output_dir.join(&result.filename).display());
        }
    }

    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print the embedded metadata record of one file.
fn print_metadata(path: &std::path::Path) -> Result<()> {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    let record = match OutputFormat::from_path(path) {
        Some(_) => metadata::read_embedded(path)?,
        None => None,
    };

    match record {
        Some(record) => {
            let value = serde_json::to_value(&record)?;
            if let Value::Object(fields) = value {
                for (key, val) in fields {
                    print_row(&key, val.as_str().unwrap_or_default());
                }
            }
        }
        None => println!("  {DIM}(no embedded metadata found){RESET}"),
    }
    println!();

    Ok(())
}

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;
/// Indent for continuation lines (tag column width + " : " = 25 chars + 2 leading spaces).
const INDENT: &str = "                           ";

/// Print a single row in the metadata table.
fn print_row(tag: &str, val: &str) {
    let tag_col = format!("{:<22}", tag);
    let lines = wrap_text(val, VAL_WIDTH);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("  {tag_col} : {line}");
        } else {
            println!("  {INDENT}{line}");
        }
    }
}

/// Wrap text at word boundaries to fit within max_width.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(s.to_string());
    }

    lines
}
