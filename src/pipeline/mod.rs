//! Pipeline stages for Markdown-tree-to-document conversion.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! images ──▶ transform ──▶ assemble
//! (async)    (pure, sync)   (numbering + footnotes)
//! ```
//!
//! 1. [`images`]: collect image URLs and resolve them concurrently into an
//!    `ImageMap`; the only stage with I/O
//! 2. [`transform`]: context-threaded recursive walk turning nodes into
//!    paragraphs and runs; [`math`] embeds LaTeX through the configured parser
//! 3. [`assemble`]: wrap stray runs, attach the fixed numbering table and the
//!    footnote map

pub mod assemble;
pub mod images;
pub mod math;
pub mod transform;
