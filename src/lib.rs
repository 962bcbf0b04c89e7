//! # edgequake-md2docx
//!
//! Convert a parsed Markdown tree (mdast) into a word-processor document model
//! ready to be packaged as DOCX.
//!
//! ## Why this crate?
//!
//! OCR and VLM pipelines produce Markdown, but the people reading the result
//! want an office document. Parsing Markdown and writing OOXML are both solved
//! problems; the part in between is not. This crate is that middle pass: a
//! pure, context-threaded walk over the mdast tree that composes inline
//! decoration, numbers nested lists, collects footnotes and embeds images and
//! math, producing a model a serializer can package without further decisions.
//!
//! ## Pipeline Overview
//!
//! ```text
//! mdast JSON
//!  │
//!  ├─ 1. Decode     closed Node enum (unknown tags rejected here)
//!  ├─ 2. Images     concurrent resolution, one call per distinct URL
//!  ├─ 3. Transform  recursive walk under an immutable Context
//!  ├─ 4. Assemble   body + footnotes + 6-level numbering table
//!  └─ 5. Serialize  pluggable DocumentSerializer (JSON built in)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_md2docx::{convert, ConversionConfig, DefaultImageResolver, Root};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = Root::from_reader(std::fs::File::open("exam.mdast.json")?)?;
//!     let config = ConversionConfig::builder()
//!         .title("Biology exam")
//!         .image_resolver(Arc::new(DefaultImageResolver::default()))
//!         .build()?;
//!     let output = convert(&root, &config).await?;
//!     eprintln!("{} blocks, {} footnotes",
//!         output.stats.blocks,
//!         output.stats.footnotes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2docx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-md2docx = { version = "0.1", default-features = false }
//! ```
//!
//! ## Known simplifications
//!
//! | Construct | Output |
//! |-----------|--------|
//! | any list | numbered, whatever its `ordered` flag |
//! | table | a bold `[TABLE]` placeholder |
//! | code block, raw HTML | one plain run, no highlighting |
//! | link/image references, definitions, front matter | dropped |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod latex;
pub mod mdast;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod serialize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync, convert_to_bytes, convert_to_file, convert_with_images};
pub use error::{ErrorClass, Md2DocxError};
pub use latex::{LatexParser, PlainLatexParser};
pub use mdast::{Node, Root};
pub use model::{Document, DocumentMetadata, DocumentStyles, ImageData, ImageMap};
pub use output::{ConversionOutput, ConversionStats};
pub use progress::{NoopProgressCallback, ProgressCallback, ResolutionProgressCallback};
pub use resolver::{DefaultImageResolver, ImageResolver};
pub use serialize::{DocumentSerializer, JsonSerializer, OutputFormat, SerializedDocument};
