//! Error types for the edgequake-md2docx library.
//!
//! Every failure is fatal: a conversion either produces a whole document or
//! nothing. There is no partial output and no retry inside the library; the
//! caller decides whether to run the conversion again (for example with a
//! different image resolver).
//!
//! The variants still fall into distinct classes, exposed through
//! [`Md2DocxError::class`]:
//!
//! * [`ErrorClass::MalformedInput`]: a condition a caller can trigger with a
//!   conformant tree: images present but no resolver, an image that could not
//!   be fetched, a footnote reference that is not a number.
//!
//! * [`ErrorClass::LogicViolation`]: the tree itself breaks the mdast
//!   contract: an unknown node tag, a `tableRow` outside a `table`, a heading
//!   of depth 7. These indicate a bug in whatever produced the tree.
//!
//! * [`ErrorClass::Environment`]: I/O, serialisation and configuration
//!   failures around the conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`Md2DocxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller supplied input that cannot be converted.
    MalformedInput,
    /// The input tree violates the node contract.
    LogicViolation,
    /// The surrounding environment failed (disk, serializer, config).
    Environment,
}

/// All fatal errors returned by the edgequake-md2docx library.
#[derive(Debug, Error)]
pub enum Md2DocxError {
    // ── Malformed input ───────────────────────────────────────────────────
    /// The tree contains image nodes but no resolver was configured.
    #[error("Document contains {count} image(s) but no image resolver is configured.\nSet one with ConversionConfig::builder().image_resolver(...).")]
    MissingImageResolver { count: usize },

    /// An image node's URL has no entry in the resolved image map.
    #[error("Image was not resolved: '{url}'")]
    ImageNotResolved { url: String },

    /// A footnote reference identifier is not a base-10 integer.
    #[error("Footnote reference '{identifier}' is not a numeric identifier")]
    InvalidFootnoteIdentifier { identifier: String },

    /// The resolver failed to produce image data for a URL.
    #[error("Failed to resolve image '{url}': {reason}")]
    ImageResolveFailed { url: String, reason: String },

    /// The resolver did not finish within the configured timeout.
    #[error("Image resolution timed out after {secs}s for '{url}'\nIncrease --image-timeout.")]
    ImageTimeout { url: String, secs: u64 },

    // ── Logic violations ──────────────────────────────────────────────────
    /// The input could not be decoded as an mdast tree (unknown tag, wrong shape).
    #[error("Input is not a valid mdast tree: {detail}")]
    InvalidTree { detail: String },

    /// A node appeared somewhere the node contract forbids.
    #[error("Unexpected '{node}' node {position}")]
    UnexpectedNode {
        node: &'static str,
        position: &'static str,
    },

    /// Heading depth outside 1–6.
    #[error("Heading depth must be 1–6, got {depth}")]
    InvalidHeadingDepth { depth: u8 },

    // ── Environment ───────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document serializer rejected the model.
    #[error("Failed to serialise document: {0}")]
    SerializationFailed(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Md2DocxError {
    /// Classify this error. All classes abort the conversion identically.
    pub fn class(&self) -> ErrorClass {
        match self {
            Md2DocxError::MissingImageResolver { .. }
            | Md2DocxError::ImageNotResolved { .. }
            | Md2DocxError::InvalidFootnoteIdentifier { .. }
            | Md2DocxError::ImageResolveFailed { .. }
            | Md2DocxError::ImageTimeout { .. } => ErrorClass::MalformedInput,
            Md2DocxError::InvalidTree { .. }
            | Md2DocxError::UnexpectedNode { .. }
            | Md2DocxError::InvalidHeadingDepth { .. } => ErrorClass::LogicViolation,
            Md2DocxError::OutputWriteFailed { .. }
            | Md2DocxError::SerializationFailed(_)
            | Md2DocxError::InvalidConfig(_)
            | Md2DocxError::Internal(_) => ErrorClass::Environment,
        }
    }

    /// Shorthand for `self.class() == ErrorClass::LogicViolation`.
    pub fn is_logic_violation(&self) -> bool {
        self.class() == ErrorClass::LogicViolation
    }
}
