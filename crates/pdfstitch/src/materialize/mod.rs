//! Page materialization.
//!
//! Turns each registered input into page-shaped units ready for assembly:
//! - PDF inputs contribute every page, untouched, in original order
//! - Image inputs contribute one synthesized page sized by [`PageSpec`]
//!
//! Parsing and decoding are CPU-bound and run on tokio's blocking pool.
//! [`Materializer::materialize_all`] keeps several inputs in flight but always
//! yields results in registry order.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::config::{Limits, PageSpec};
//! use pdfstitch::materialize::Materializer;
//! use pdfstitch::registry::Registry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//! registry.add("scan.png")?;
//!
//! let materializer = Materializer::new(PageSpec::default(), Limits::default());
//! let sources = materializer.materialize_all(registry.items(), 4).await?;
//! assert_eq!(sources[0].page_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod image;
pub mod pdf;
pub mod placement;

pub use self::image::{ColorSpace, EncodedImage, ImageFilter, ImagePage};
pub use placement::Placement;

use futures::stream::{self, StreamExt, TryStreamExt};
use lopdf::{Document, ObjectId};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::config::{Limits, PageSpec};
use crate::io::SourceReader;
use crate::registry::{SourceItem, SourceKind};
use crate::{Result, StitchError};

/// One page ready for inclusion in the output.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedPage {
    /// A page dictionary inside the source's [`MaterializedSource::document`].
    Imported(ObjectId),
    /// A page synthesized around a single image.
    Image(ImagePage),
}

/// The pages produced from one registry item.
#[derive(Debug)]
pub struct MaterializedSource {
    /// The item these pages came from.
    pub item: SourceItem,

    /// Parsed document backing [`RenderedPage::Imported`] pages.
    pub document: Option<Document>,

    /// Pages in output order.
    pub pages: Vec<RenderedPage>,

    /// Input size in bytes.
    pub file_size: u64,

    /// Time spent reading and converting the input.
    pub elapsed: Duration,
}

impl MaterializedSource {
    /// Number of pages this source contributes.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Converts registry items into pages.
#[derive(Debug, Clone, Default)]
pub struct Materializer {
    spec: PageSpec,
    reader: SourceReader,
}

impl Materializer {
    /// Create a materializer for the given page settings and limits.
    pub fn new(spec: PageSpec, limits: Limits) -> Self {
        Self {
            spec,
            reader: SourceReader::with_limits(limits),
        }
    }

    /// Page settings applied to image inputs.
    pub fn page_spec(&self) -> &PageSpec {
        &self.spec
    }

    /// Materialize one item on the current thread.
    ///
    /// # Errors
    ///
    /// Any input error for `item`, carrying its path: missing file, size or
    /// pixel limit, corrupt or encrypted PDF, undecodable image.
    pub fn materialize_blocking(&self, item: &SourceItem) -> Result<MaterializedSource> {
        let start = Instant::now();
        let path = item.path();

        let (document, pages, file_size) = match item.kind() {
            SourceKind::Pdf => {
                let loaded = self.reader.load_blocking(path)?;
                let mut document = loaded.document;
                let pages = pdf::flatten_pages(path, &mut document)?
                    .into_iter()
                    .map(RenderedPage::Imported)
                    .collect();
                (Some(document), pages, loaded.file_size)
            }
            SourceKind::Image(format) => {
                let bytes = self.reader.read_bytes(path)?;
                let file_size = bytes.len() as u64;
                let page = image::render_page(path, bytes, format, &self.spec, self.reader.limits())?;
                (None, vec![RenderedPage::Image(page)], file_size)
            }
        };

        let elapsed = start.elapsed();
        debug!(
            path = %path.display(),
            kind = %item.kind(),
            pages = pages.len(),
            ?elapsed,
            "materialized input"
        );

        Ok(MaterializedSource {
            item: item.clone(),
            document,
            pages,
            file_size,
            elapsed,
        })
    }

    /// Materialize one item on the blocking pool, bounded by the item timeout.
    pub async fn materialize(&self, item: &SourceItem) -> Result<MaterializedSource> {
        let materializer = self.clone();
        let owned = item.clone();
        let handle = task::spawn_blocking(move || materializer.materialize_blocking(&owned));

        let joined = match self.reader.limits().item_timeout {
            Some(limit) => tokio::time::timeout(limit, handle).await.map_err(|_| {
                StitchError::TimedOut {
                    path: item.path().to_path_buf(),
                    seconds: limit.as_secs(),
                }
            })?,
            None => handle.await,
        };

        joined.map_err(|e| StitchError::other(format!("Materialize task failed: {e}")))?
    }

    /// Materialize every item with at most `jobs` in flight.
    ///
    /// Results come back in the order of `items`. The first failure in that
    /// order is returned and the remaining work is dropped.
    pub async fn materialize_all(
        &self,
        items: &[SourceItem],
        jobs: usize,
    ) -> Result<Vec<MaterializedSource>> {
        stream::iter(items)
            .map(|item| self.materialize(item))
            .buffered(jobs.max(1))
            .try_collect()
            .await
    }
}
