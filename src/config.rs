//! Configuration types for Markdown-tree-to-document conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The config carries the pluggable
//! collaborators (image resolver, LaTeX parser, progress callback) next to
//! the plain settings, so one value describes a whole run and can be shared
//! across concurrent conversions.

use crate::error::Md2DocxError;
use crate::latex::{LatexParser, PlainLatexParser};
use crate::model::{DocumentMetadata, DocumentStyles};
use crate::progress::ProgressCallback;
use crate::resolver::ImageResolver;
use crate::serialize::OutputFormat;
use std::fmt;
use std::sync::Arc;

/// Configuration for a conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_md2docx::{ConversionConfig, DefaultImageResolver};
/// use std::sync::Arc;
///
/// let config = ConversionConfig::builder()
///     .title("Biology exam")
///     .creator("scanner")
///     .image_resolver(Arc::new(DefaultImageResolver::default()))
///     .image_timeout_secs(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Core properties copied into the document. Never interpreted.
    pub metadata: DocumentMetadata,

    /// Default run font and size.
    pub styles: DocumentStyles,

    /// Representation requested from the serializer. Default: `Buffer`.
    pub output_format: OutputFormat,

    /// Resolves image URLs. Required only when the tree contains images.
    pub image_resolver: Option<Arc<dyn ImageResolver>>,

    /// Turns LaTeX into math atoms. Default: [`PlainLatexParser`].
    pub latex_parser: Arc<dyn LatexParser>,

    /// Maximum in-flight resolver calls. `None` (default) issues all at once.
    pub image_concurrency: Option<usize>,

    /// Per-image resolver timeout in seconds. Default: 30.
    pub image_timeout_secs: u64,

    /// Receives resolution progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            metadata: DocumentMetadata::default(),
            styles: DocumentStyles::default(),
            output_format: OutputFormat::default(),
            image_resolver: None,
            latex_parser: Arc::new(PlainLatexParser),
            image_concurrency: None,
            image_timeout_secs: 30,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("metadata", &self.metadata)
            .field("styles", &self.styles)
            .field("output_format", &self.output_format)
            .field(
                "image_resolver",
                &self.image_resolver.as_ref().map(|_| "<dyn ImageResolver>"),
            )
            .field("latex_parser", &"<dyn LatexParser>")
            .field("image_concurrency", &self.image_concurrency)
            .field("image_timeout_secs", &self.image_timeout_secs)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.config.metadata = metadata;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.metadata.title = Some(title.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.config.metadata.subject = Some(subject.into());
        self
    }

    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.config.metadata.creator = Some(creator.into());
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.config.metadata.keywords = Some(keywords.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.metadata.description = Some(description.into());
        self
    }

    pub fn last_modified_by(mut self, name: impl Into<String>) -> Self {
        self.config.metadata.last_modified_by = Some(name.into());
        self
    }

    pub fn revision(mut self, revision: u32) -> Self {
        self.config.metadata.revision = Some(revision);
        self
    }

    pub fn styles(mut self, styles: DocumentStyles) -> Self {
        self.config.styles = styles;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    pub fn image_resolver(mut self, resolver: Arc<dyn ImageResolver>) -> Self {
        self.config.image_resolver = Some(resolver);
        self
    }

    pub fn latex_parser(mut self, parser: Arc<dyn LatexParser>) -> Self {
        self.config.latex_parser = parser;
        self
    }

    pub fn image_concurrency(mut self, n: usize) -> Self {
        self.config.image_concurrency = Some(n);
        self
    }

    pub fn image_timeout_secs(mut self, secs: u64) -> Self {
        self.config.image_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2DocxError> {
        let c = &self.config;
        if c.image_concurrency == Some(0) {
            return Err(Md2DocxError::InvalidConfig(
                "Image concurrency must be ≥ 1".into(),
            ));
        }
        if c.image_timeout_secs == 0 {
            return Err(Md2DocxError::InvalidConfig(
                "Image timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
