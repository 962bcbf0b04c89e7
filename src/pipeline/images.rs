//! Image resolution pass: collect image URLs, resolve them concurrently.
//!
//! Runs before the transformer so the transformer itself can stay
//! synchronous. The resulting [`ImageMap`] is built once and only read
//! afterwards.
//!
//! ## Fan-out / fan-in
//!
//! Every distinct URL gets one resolver call. Calls run concurrently through
//! `buffer_unordered` and are joined with `try_collect`: the first failure
//! ends the pass and drops the calls still in flight. Completion order is
//! irrelevant because results are keyed by URL.

use crate::config::ConversionConfig;
use crate::error::Md2DocxError;
use crate::mdast::Node;
use crate::model::{ImageData, ImageMap};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Collect every image URL in depth-first document order, duplicates kept.
pub fn collect_image_urls(nodes: &[Node]) -> Vec<&str> {
    let mut urls = Vec::new();
    collect_into(nodes, &mut urls);
    urls
}

fn collect_into<'a>(nodes: &'a [Node], urls: &mut Vec<&'a str>) {
    for node in nodes {
        if let Node::Image(image) = node {
            urls.push(image.url.as_str());
        }
        collect_into(node.children(), urls);
    }
}

/// First occurrence of each URL, in document order.
fn distinct<'a>(urls: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    urls.iter().copied().filter(|url| seen.insert(*url)).collect()
}

/// Resolve all images in `nodes` into an [`ImageMap`].
///
/// Returns an empty map without touching the resolver when the tree holds no
/// images. Fails before any resolver call when images exist but no resolver
/// is configured.
pub async fn resolve_images(
    nodes: &[Node],
    config: &ConversionConfig,
) -> Result<ImageMap, Md2DocxError> {
    let urls = collect_image_urls(nodes);
    if urls.is_empty() {
        debug!("No image nodes; skipping resolution pass");
        return Ok(ImageMap::new());
    }

    let resolver = config
        .image_resolver
        .as_ref()
        .ok_or(Md2DocxError::MissingImageResolver { count: urls.len() })?;

    let unique = distinct(&urls);
    let total = unique.len();
    info!("Resolving {} distinct image(s) ({} references)", total, urls.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_resolution_start(total);
    }

    let limit = config.image_concurrency.unwrap_or(total).max(1);
    let timeout = Duration::from_secs(config.image_timeout_secs);

    let resolved: Vec<(String, ImageData)> = stream::iter(unique.into_iter().map(|url| async move {
        if let Some(ref cb) = config.progress_callback {
            cb.on_image_start(url);
        }

        let result = match tokio::time::timeout(timeout, resolver.resolve(url)).await {
            Ok(result) => result,
            Err(_) => Err(Md2DocxError::ImageTimeout {
                url: url.to_string(),
                secs: config.image_timeout_secs,
            }),
        };

        match result {
            Ok(data) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_complete(url, data.data.len());
                }
                Ok((url.to_string(), data))
            }
            Err(e) => {
                warn!("Image resolution failed: {}", e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_image_error(url, &e.to_string());
                }
                Err(e)
            }
        }
    }))
    .buffer_unordered(limit)
    .try_collect()
    .await?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_resolution_complete(total);
    }

    Ok(resolved.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdast::Root;
    use crate::progress::ResolutionProgressCallback;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tree_with_images() -> Root {
        Root::from_value(json!({
            "children": [
                { "type": "paragraph", "children": [
                    { "type": "image", "url": "a.png" },
                    { "type": "strong", "children": [{ "type": "image", "url": "b.png" }] }
                ]},
                { "type": "blockquote", "children": [
                    { "type": "paragraph", "children": [{ "type": "image", "url": "a.png" }] }
                ]}
            ]
        }))
        .unwrap()
    }

    fn counting_resolver(calls: Arc<AtomicUsize>) -> Arc<dyn crate::resolver::ImageResolver> {
        Arc::new(move |url: String| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Md2DocxError>(ImageData::new(url.into_bytes(), 10, 20))
            }
        })
    }

    #[test]
    fn collects_in_document_order_with_duplicates() {
        let root = tree_with_images();
        assert_eq!(collect_image_urls(&root.children), vec!["a.png", "b.png", "a.png"]);
    }

    #[tokio::test]
    async fn no_images_needs_no_resolver() {
        let root = Root::new(vec![Node::paragraph(vec![Node::text("hi")])]);
        let map = resolve_images(&root.children, &ConversionConfig::default())
            .await
            .unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn missing_resolver_fails_before_resolution() {
        let root = tree_with_images();
        let err = resolve_images(&root.children, &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Md2DocxError::MissingImageResolver { count: 3 }));
    }

    #[tokio::test]
    async fn one_call_per_distinct_url() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = ConversionConfig::builder()
            .image_resolver(counting_resolver(Arc::clone(&calls)))
            .build()
            .unwrap();

        let map = resolve_images(&tree_with_images().children, &config)
            .await
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(map["b.png"].data, b"b.png".to_vec());
    }

    #[tokio::test]
    async fn single_failure_aborts_pass() {
        let resolver = |url: String| async move {
            if url == "b.png" {
                Err(Md2DocxError::ImageResolveFailed {
                    url,
                    reason: "HTTP 404".into(),
                })
            } else {
                Ok(ImageData::new(vec![1], 1, 1))
            }
        };
        let config = ConversionConfig::builder()
            .image_resolver(Arc::new(resolver))
            .build()
            .unwrap();

        let err = resolve_images(&tree_with_images().children, &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("b.png"));
    }

    #[tokio::test]
    async fn slow_resolver_times_out() {
        let resolver = |_url: String| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, Md2DocxError>(ImageData::new(vec![], 1, 1))
        };
        let config = ConversionConfig::builder()
            .image_resolver(Arc::new(resolver))
            .image_timeout_secs(1)
            .build()
            .unwrap();

        let root = Root::new(vec![Node::image("slow.png")]);
        let err = resolve_images(&root.children, &config).await.unwrap_err();
        assert!(matches!(err, Md2DocxError::ImageTimeout { secs: 1, .. }));
    }

    #[tokio::test]
    async fn progress_events_fire() {
        #[derive(Default)]
        struct Counter {
            total: AtomicUsize,
            done: AtomicUsize,
        }
        impl ResolutionProgressCallback for Counter {
            fn on_resolution_start(&self, total_images: usize) {
                self.total.store(total_images, Ordering::SeqCst);
            }
            fn on_image_complete(&self, _url: &str, _bytes: usize) {
                self.done.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counter::default());
        let config = ConversionConfig::builder()
            .image_resolver(counting_resolver(Arc::new(AtomicUsize::new(0))))
            .progress_callback(Arc::clone(&counter) as Arc<dyn ResolutionProgressCallback>)
            .build()
            .unwrap();

        resolve_images(&tree_with_images().children, &config)
            .await
            .unwrap();
        assert_eq!(counter.total.load(Ordering::SeqCst), 2);
        assert_eq!(counter.done.load(Ordering::SeqCst), 2);
    }
}
