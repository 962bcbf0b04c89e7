//! Conversion entry points.
//!
//! [`convert`] is the primary API: resolve images, transform, assemble.
//! [`convert_with_images`] is the synchronous core for callers that already
//! hold an [`ImageMap`]; everything else wraps one of the two.

use crate::config::ConversionConfig;
use crate::error::Md2DocxError;
use crate::mdast::Root;
use crate::model::{Document, ImageMap};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::assemble::assemble;
use crate::pipeline::images::resolve_images;
use crate::pipeline::transform::{Context, Converted, Transformer};
use crate::serialize::{DocumentSerializer, SerializedDocument};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert an mdast tree into a document model.
///
/// # Arguments
/// * `root`: the decoded Markdown tree
/// * `config`: conversion configuration; must carry an image resolver if
///   the tree contains images
///
/// # Errors
/// Any failure is fatal and no partial document is produced:
/// - an image could not be resolved, or there is no resolver for it
/// - a footnote identifier is not a non-negative integer
/// - the tree is structurally invalid (`tableRow` outside a table, heading
///   depth out of range, …)
///
/// # Example
/// ```rust
/// use edgequake_md2docx::{convert, ConversionConfig, Root};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = Root::from_json(r#"{"type":"root","children":[
///     {"type":"paragraph","children":[{"type":"text","value":"Hello"}]}
/// ]}"#)?;
/// let output = convert(&root, &ConversionConfig::default()).await?;
/// assert_eq!(output.document.body[0].plain_text(), "Hello");
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    root: &Root,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2DocxError> {
    let total_start = Instant::now();
    info!("Starting conversion: {} top-level node(s)", root.children.len());

    // ── Step 1: Resolve images ───────────────────────────────────────────
    let resolve_start = Instant::now();
    let images = resolve_images(&root.children, config).await?;
    let resolve_duration_ms = resolve_start.elapsed().as_millis() as u64;
    debug!(
        "Resolved {} image(s) in {}ms",
        images.len(),
        resolve_duration_ms
    );

    // ── Step 2: Transform + assemble ─────────────────────────────────────
    let transform_start = Instant::now();
    let document = convert_with_images(root, &images, config)?;
    let transform_duration_ms = transform_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        blocks: document.body.len(),
        footnotes: document.footnotes.len(),
        images: images.len(),
        resolve_duration_ms,
        transform_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} block(s), {} footnote(s), {}ms total",
        stats.blocks, stats.footnotes, stats.total_duration_ms
    );

    Ok(ConversionOutput { document, stats })
}

/// Transform and assemble against an already resolved image map.
///
/// Pure and synchronous: no I/O, no resolver calls.
pub fn convert_with_images(
    root: &Root,
    images: &ImageMap,
    config: &ConversionConfig,
) -> Result<Document, Md2DocxError> {
    let transformer = Transformer::new(config.latex_parser.as_ref());
    let Converted { content, footnotes } =
        transformer.convert(&root.children, &Context::root(images))?;

    Ok(assemble(
        content,
        footnotes,
        config.metadata.clone(),
        config.styles.clone(),
    ))
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(root: &Root, config: &ConversionConfig) -> Result<ConversionOutput, Md2DocxError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2DocxError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(root, config))
}

/// Convert and serialize in the configured [`crate::OutputFormat`].
pub async fn convert_to_bytes(
    root: &Root,
    config: &ConversionConfig,
    serializer: &dyn DocumentSerializer,
) -> Result<(SerializedDocument, ConversionStats), Md2DocxError> {
    let output = convert(root, config).await?;
    let serialized = serializer.serialize(&output.document, config.output_format)?;
    debug!("Serialized document: {} bytes", serialized.as_bytes().len());
    Ok((serialized, output.stats))
}

/// Convert, serialize and write the result to `output_path`.
///
/// Uses atomic write (temp file in the target directory + rename) so a
/// failed run never leaves a partial file behind.
pub async fn convert_to_file(
    root: &Root,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
    serializer: &dyn DocumentSerializer,
) -> Result<ConversionStats, Md2DocxError> {
    let (serialized, stats) = convert_to_bytes(root, config, serializer).await?;
    let path = output_path.as_ref();
    let write_err = |source: std::io::Error| Md2DocxError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
            parent.to_path_buf()
        }
        _ => std::env::current_dir().map_err(write_err)?,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(serialized.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Wrote {}", path.display());
    Ok(stats)
}
