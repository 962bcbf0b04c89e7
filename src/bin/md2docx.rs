//! CLI binary for edgequake-md2docx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig`, reads an mdast JSON tree and writes the result.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_md2docx::{
    convert_to_bytes, convert_to_file, ConversionConfig, DefaultImageResolver, JsonSerializer,
    OutputFormat, ProgressCallback, ResolutionProgressCallback, Root,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the distinct images, one log line
/// per image. Images complete out of order, so each line names its URL.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Reading tree…");

        Arc::new(Self { bar })
    }
}

/// Long data URLs would flood the terminal.
fn display_url(url: &str) -> String {
    if url.chars().count() > 60 {
        let head: String = url.chars().take(59).collect();
        format!("{head}\u{2026}")
    } else {
        url.to_string()
    }
}

impl ResolutionProgressCallback for CliProgressCallback {
    fn on_resolution_start(&self, total_images: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} images  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(total_images as u64);
        self.bar.set_prefix("Resolving");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_image_start(&self, url: &str) {
        self.bar.set_message(display_url(url));
    }

    fn on_image_complete(&self, url: &str, bytes: usize) {
        self.bar.println(format!(
            "  {} {:<60}  {}",
            green("✓"),
            display_url(url),
            dim(&format!("{bytes:>8} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_image_error(&self, url: &str, error: &str) {
        self.bar.println(format!(
            "  {} {:<60}  {}",
            red("✗"),
            display_url(url),
            red(error.lines().next().unwrap_or(error)),
        ));
        self.bar.inc(1);
    }

    fn on_resolution_complete(&self, total_images: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} images resolved",
            green("✔"),
            bold(&total_images.to_string())
        );
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a remark-produced tree, JSON model to stdout
  md2docx exam.mdast.json

  # Write to a file, with document properties
  md2docx exam.mdast.json -o exam.json --title "Biology exam" --creator scanner

  # Read the tree from stdin
  remark-cli --tree-out exam.md | md2docx - -o exam.json

  # Resolve relative image paths against a directory
  md2docx tree.json --base-dir ./scans -o out.json

IMAGES:
  data:image/...;base64,...   decoded in place
  http:// and https://        downloaded (--image-timeout)
  anything else               a local path, relative to --base-dir
                              (defaults to the input file's directory)

ENVIRONMENT VARIABLES:
  RUST_LOG                    Overrides --verbose / --quiet log filtering
  MD2DOCX_*                   Every flag has an env fallback (see --help)
"#;

/// Convert an mdast JSON tree into a word-processor document model.
#[derive(Parser, Debug)]
#[command(
    name = "md2docx",
    version,
    about = "Convert a Markdown tree (mdast JSON) into a DOCX document model",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to an mdast JSON file, or `-` for stdin.
    input: String,

    /// Write the document to this file instead of stdout.
    #[arg(short, long, env = "MD2DOCX_OUTPUT")]
    output: Option<PathBuf>,

    /// Document title.
    #[arg(long, env = "MD2DOCX_TITLE")]
    title: Option<String>,

    /// Document subject.
    #[arg(long, env = "MD2DOCX_SUBJECT")]
    subject: Option<String>,

    /// Document author.
    #[arg(long, env = "MD2DOCX_CREATOR")]
    creator: Option<String>,

    /// Document keywords.
    #[arg(long, env = "MD2DOCX_KEYWORDS")]
    keywords: Option<String>,

    /// Document description.
    #[arg(long, env = "MD2DOCX_DESCRIPTION")]
    description: Option<String>,

    /// Output representation: buffer or blob.
    #[arg(long, env = "MD2DOCX_OUTPUT_FORMAT", value_enum, default_value = "buffer")]
    output_format: FormatArg,

    /// Pretty-print the JSON model.
    #[arg(long, env = "MD2DOCX_PRETTY")]
    pretty: bool,

    /// Directory relative image paths are resolved against.
    #[arg(long, env = "MD2DOCX_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Per-image resolution timeout in seconds.
    #[arg(long, env = "MD2DOCX_IMAGE_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    image_timeout: u64,

    /// Maximum concurrent image fetches (default: all at once).
    #[arg(short, long, env = "MD2DOCX_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Disable progress bar.
    #[arg(long, env = "MD2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2DOCX_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Buffer,
    Blob,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Buffer => OutputFormat::Buffer,
            FormatArg::Blob => OutputFormat::Blob,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Read tree ────────────────────────────────────────────────────────
    let root = read_tree(&cli.input)?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ResolutionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let serializer = JsonSerializer { pretty: cli.pretty };

    // ── Run conversion ───────────────────────────────────────────────────
    let stats = if let Some(ref output_path) = cli.output {
        convert_to_file(&root, output_path, &config, &serializer)
            .await
            .context("Conversion failed")?
    } else {
        let (serialized, stats) = convert_to_bytes(&root, &config, &serializer)
            .await
            .context("Conversion failed")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(serialized.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
        stats
    };

    if !cli.quiet {
        eprintln!(
            "{}  {} blocks  {} footnotes  {} images  {}ms{}",
            green("✔"),
            stats.blocks,
            stats.footnotes,
            stats.images,
            stats.total_duration_ms,
            cli.output
                .as_ref()
                .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                .unwrap_or_default(),
        );
    }

    Ok(())
}

/// Decode the input tree from a file or stdin.
fn read_tree(input: &str) -> Result<Root> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read tree from stdin")?;
        return Root::from_json(&buf).context("Failed to decode mdast tree from stdin");
    }

    let file = std::fs::File::open(input).with_context(|| format!("Failed to open {input}"))?;
    Root::from_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to decode mdast tree from {input}"))
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let base_dir = cli.base_dir.clone().or_else(|| default_base_dir(&cli.input));
    let resolver = DefaultImageResolver::new(base_dir, cli.image_timeout);

    let mut builder = ConversionConfig::builder()
        .image_resolver(Arc::new(resolver))
        .image_timeout_secs(cli.image_timeout)
        .output_format(cli.output_format.into());

    if let Some(ref title) = cli.title {
        builder = builder.title(title);
    }
    if let Some(ref subject) = cli.subject {
        builder = builder.subject(subject);
    }
    if let Some(ref creator) = cli.creator {
        builder = builder.creator(creator);
    }
    if let Some(ref keywords) = cli.keywords {
        builder = builder.keywords(keywords);
    }
    if let Some(ref description) = cli.description {
        builder = builder.description(description);
    }
    if let Some(n) = cli.concurrency {
        builder = builder.image_concurrency(n);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Relative image paths in a file's tree are relative to that file.
fn default_base_dir(input: &str) -> Option<PathBuf> {
    if input == "-" {
        return None;
    }
    Path::new(input)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
