//! Image resolvers: turn an image URL from the tree into bytes + dimensions.
//!
//! The converter never fetches anything itself. Callers supply an
//! [`ImageResolver`] (a struct or a plain async closure) and the resolution
//! pass in [`crate::pipeline::images`] calls it once per distinct URL.
//!
//! [`DefaultImageResolver`] covers the three URL shapes OCR pipelines
//! typically produce:
//!
//! * `data:image/png;base64,…`: inline payloads from camera capture
//! * `http://` / `https://`: remote images, downloaded with a timeout
//! * anything else: a local path, optionally relative to a base directory
//!
//! In every case the natural pixel size is read from the image header with
//! the `image` crate; no scaling is applied.

use crate::error::Md2DocxError;
use crate::model::ImageData;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Resolves an image URL to its binary payload and natural dimensions.
///
/// Implementations must be `Send + Sync`: the resolution pass issues all
/// calls concurrently.
pub trait ImageResolver: Send + Sync {
    fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ImageData, Md2DocxError>>;
}

impl<F, Fut> ImageResolver for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ImageData, Md2DocxError>> + Send + 'static,
{
    fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ImageData, Md2DocxError>> {
        Box::pin(self(url.to_string()))
    }
}

/// Check if the URL is an HTTP(S) URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

static DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/[\w.+-]+;base64,").expect("static regex is valid")
});

/// Resolver for data URLs, HTTP(S) URLs and local files.
#[derive(Debug, Clone)]
pub struct DefaultImageResolver {
    client: reqwest::Client,
    base_dir: Option<PathBuf>,
    timeout_secs: u64,
}

impl Default for DefaultImageResolver {
    fn default() -> Self {
        Self::new(None, 30)
    }
}

impl DefaultImageResolver {
    /// Create a resolver. Relative paths are joined onto `base_dir` when set.
    pub fn new(base_dir: Option<PathBuf>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_dir,
            timeout_secs,
        }
    }

    async fn resolve_url(&self, url: &str) -> Result<ImageData, Md2DocxError> {
        let bytes = if let Some(m) = DATA_URL.find(url) {
            decode_data_url(url, &url[m.end()..])?
        } else if is_url(url) {
            self.download(url).await?
        } else {
            self.read_local(url).await?
        };

        let (width, height) = image_dimensions(url, &bytes)?;
        debug!("Resolved image {} → {} bytes, {}x{}", short(url), bytes.len(), width, height);
        Ok(ImageData::new(bytes, width, height))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, Md2DocxError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Md2DocxError::ImageTimeout {
                    url: url.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                resolve_failed(url, e)
            }
        })?;

        if !response.status().is_success() {
            return Err(Md2DocxError::ImageResolveFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| resolve_failed(url, e))?;
        Ok(bytes.to_vec())
    }

    async fn read_local(&self, url: &str) -> Result<Vec<u8>, Md2DocxError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let path = match &self.base_dir {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        };
        tokio::fs::read(&path)
            .await
            .map_err(|e| resolve_failed(url, format!("{}: {e}", path.display())))
    }
}

impl ImageResolver for DefaultImageResolver {
    fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ImageData, Md2DocxError>> {
        Box::pin(self.resolve_url(url))
    }
}

fn decode_data_url(url: &str, payload: &str) -> Result<Vec<u8>, Md2DocxError> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| resolve_failed(url, format!("invalid base64 payload: {e}")))
}

/// Read the natural dimensions from the image header without decoding pixels.
fn image_dimensions(url: &str, bytes: &[u8]) -> Result<(u32, u32), Md2DocxError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| resolve_failed(url, e))?
        .into_dimensions()
        .map_err(|e| resolve_failed(url, format!("unsupported image: {e}")))
}

fn resolve_failed(url: &str, reason: impl std::fmt::Display) -> Md2DocxError {
    Md2DocxError::ImageResolveFailed {
        url: short(url).to_string(),
        reason: reason.to_string(),
    }
}

/// Data URLs can be megabytes long; keep log lines and errors readable.
fn short(url: &str) -> &str {
    match url.char_indices().nth(64) {
        Some((idx, _)) if url.starts_with("data:") => &url[..idx],
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([0, 0, 255, 255]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/a.png"));
        assert!(is_url("http://example.com/a.png"));
        assert!(!is_url("/tmp/a.png"));
        assert!(!is_url("data:image/png;base64,AAAA"));
        assert!(!is_url(""));
    }

    #[tokio::test]
    async fn resolves_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(7, 3)));
        let data = DefaultImageResolver::default()
            .resolve(&url)
            .await
            .expect("data url resolves");
        assert_eq!((data.width, data.height), (7, 3));
    }

    #[tokio::test]
    async fn resolves_local_file_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scan.png"), png_bytes(12, 5)).unwrap();

        let resolver = DefaultImageResolver::new(Some(dir.path().to_path_buf()), 5);
        let data = resolver.resolve("scan.png").await.expect("file resolves");
        assert_eq!((data.width, data.height), (12, 5));
        assert_eq!(data.data, png_bytes(12, 5));
    }

    #[tokio::test]
    async fn missing_file_fails_with_url() {
        let err = DefaultImageResolver::default()
            .resolve("/definitely/not/here.png")
            .await
            .expect_err("missing file");
        assert!(err.to_string().contains("/definitely/not/here.png"), "got: {err}");
    }

    #[tokio::test]
    async fn garbage_bytes_are_rejected() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(b"not an image"));
        let err = DefaultImageResolver::default()
            .resolve(&url)
            .await
            .expect_err("not an image");
        assert!(matches!(err, Md2DocxError::ImageResolveFailed { .. }));
    }

    #[tokio::test]
    async fn closures_are_resolvers() {
        let resolver = |url: String| async move {
            Ok::<_, Md2DocxError>(ImageData::new(url.into_bytes(), 1, 2))
        };
        let data = resolver.resolve("abc").await.unwrap();
        assert_eq!(data.data, b"abc".to_vec());
    }

    #[test]
    fn short_truncates_data_urls_only() {
        let long = format!("data:image/png;base64,{}", "A".repeat(200));
        assert_eq!(short(&long).len(), 64);
        let remote = format!("https://example.com/{}", "a".repeat(200));
        assert_eq!(short(&remote), remote);
    }
}
