//! Serializer boundary: document model → bytes.
//!
//! Packaging the model as an OOXML zip is done by an external
//! [`DocumentSerializer`]. This module fixes the contract and ships one
//! implementation, [`JsonSerializer`], which writes the model itself as JSON
//! for inspection, golden tests and hand-off to non-Rust packagers.

use crate::error::Md2DocxError;
use crate::model::Document;
use serde::{Deserialize, Serialize};

/// How serialized bytes are handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A raw byte buffer. (default)
    #[default]
    Buffer,
    /// A binary large object tagged with its MIME type.
    Blob,
}

/// A binary large object: bytes plus their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// The serializer's output in the requested [`OutputFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedDocument {
    Buffer(Vec<u8>),
    Blob(Blob),
}

impl SerializedDocument {
    /// Wrap `data` according to `format`.
    pub fn new(format: OutputFormat, mime_type: &str, data: Vec<u8>) -> Self {
        match format {
            OutputFormat::Buffer => SerializedDocument::Buffer(data),
            OutputFormat::Blob => SerializedDocument::Blob(Blob {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }

    /// The serialized bytes, regardless of representation.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            SerializedDocument::Buffer(data) => data,
            SerializedDocument::Blob(blob) => &blob.data,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Buffer(data) => data,
            SerializedDocument::Blob(blob) => blob.data,
        }
    }
}

/// Turns a finished [`Document`] into bytes.
pub trait DocumentSerializer: Send + Sync {
    fn serialize(
        &self,
        document: &Document,
        format: OutputFormat,
    ) -> Result<SerializedDocument, Md2DocxError>;
}

/// Writes the document model as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer {
    pub pretty: bool,
}

impl JsonSerializer {
    pub const MIME_TYPE: &'static str = "application/json";

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl DocumentSerializer for JsonSerializer {
    fn serialize(
        &self,
        document: &Document,
        format: OutputFormat,
    ) -> Result<SerializedDocument, Md2DocxError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        }
        .map_err(|e| Md2DocxError::SerializationFailed(e.to_string()))?;

        Ok(SerializedDocument::new(format, Self::MIME_TYPE, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Inline, Paragraph, TextRun};

    fn sample() -> Document {
        Document {
            body: vec![Paragraph::new(vec![Inline::Text(TextRun::plain("hello"))])],
            ..Document::default()
        }
    }

    #[test]
    fn buffer_output() {
        let out = JsonSerializer::default()
            .serialize(&sample(), OutputFormat::Buffer)
            .unwrap();
        assert!(matches!(out, SerializedDocument::Buffer(_)));
        let back: Document = serde_json::from_slice(out.as_bytes()).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn blob_output_carries_mime_type() {
        let out = JsonSerializer::pretty()
            .serialize(&sample(), OutputFormat::Blob)
            .unwrap();
        match &out {
            SerializedDocument::Blob(blob) => assert_eq!(blob.mime_type, "application/json"),
            other => panic!("expected blob, got {other:?}"),
        }
        assert!(String::from_utf8(out.into_bytes()).unwrap().contains('\n'));
    }
}
