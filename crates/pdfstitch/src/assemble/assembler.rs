//! Core document assembly.
//!
//! Materializes every registry item, then grafts the resulting pages in
//! registry order into one fresh document.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::assemble::metadata::MetadataManager;
use crate::assemble::pages::{graft_pages, insert_image_page};
use crate::config::{CompressionLevel, Config, Limits, Metadata, PageSpec};
use crate::error::{Result, StitchError};
use crate::io::PdfWriter;
use crate::materialize::{MaterializedSource, Materializer, RenderedPage};
use crate::registry::{Registry, SourceKind};
use crate::utils::format_file_size;

/// Statistics about a stitch operation.
#[derive(Debug, Clone, Default)]
pub struct StitchStatistics {
    /// Number of inputs stitched.
    pub files_stitched: usize,

    /// How many of them were PDFs.
    pub pdf_files: usize,

    /// How many of them were images.
    pub image_files: usize,

    /// Total number of pages in the output.
    pub total_pages: usize,

    /// Total size of input files.
    pub input_size: u64,

    /// Time spent reading, parsing and encoding inputs.
    pub materialize_time: Duration,

    /// Total time from first read to finished document.
    pub assemble_time: Duration,

    /// Size of the written file, once saved.
    pub output_size: Option<u64>,

    /// Time taken to write the output, once saved.
    pub write_time: Option<Duration>,
}

impl StitchStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> Option<String> {
        self.output_size.map(format_file_size)
    }
}

/// Result of an assemble operation.
#[derive(Debug)]
pub struct AssembleResult {
    /// The stitched document.
    pub document: Document,

    /// Statistics about the operation.
    pub statistics: StitchStatistics,

    /// Inputs in the order their pages appear.
    pub sources: Vec<PathBuf>,
}

/// Combines registry items into one document.
#[derive(Debug, Clone)]
pub struct Assembler {
    materializer: Materializer,
    jobs: usize,
    metadata: Metadata,
    metadata_manager: MetadataManager,
    writer: PdfWriter,
}

impl Assembler {
    /// Create an assembler with the given page settings and limits.
    ///
    /// Inputs are materialized one at a time; see [`Assembler::with_jobs`].
    pub fn new(spec: PageSpec, limits: Limits) -> Self {
        Self {
            materializer: Materializer::new(spec, limits),
            jobs: 1,
            metadata: Metadata::default(),
            metadata_manager: MetadataManager::new(),
            writer: PdfWriter::new(),
        }
    }

    /// Create an assembler from a validated configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.page_spec, config.limits)
            .with_jobs(config.effective_jobs())
            .with_metadata(config.metadata.clone())
            .with_compression(config.compression)
    }

    /// Materialize up to `jobs` inputs concurrently.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Metadata for the output's Info dictionary.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Compression applied when saving.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.writer = PdfWriter::with_compression(compression);
        self
    }

    /// Build the stitched document in memory.
    ///
    /// # Errors
    ///
    /// - [`StitchError::EmptyInput`] if the registry is empty
    /// - the first input error in registry order, naming its file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstitch::assemble::Assembler;
    /// # use pdfstitch::registry::Registry;
    /// # async fn example(registry: Registry) -> Result<(), Box<dyn std::error::Error>> {
    /// let result = Assembler::default().assemble(&registry).await?;
    /// println!("{} pages from {} files",
    ///          result.statistics.total_pages,
    ///          result.statistics.files_stitched);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn assemble(&self, registry: &Registry) -> Result<AssembleResult> {
        if registry.is_empty() {
            return Err(StitchError::EmptyInput);
        }

        let start = Instant::now();
        let sources = self
            .materializer
            .materialize_all(registry.items(), self.jobs)
            .await?;
        let materialize_time = start.elapsed();

        let mut statistics = StitchStatistics {
            files_stitched: sources.len(),
            materialize_time,
            ..Default::default()
        };
        for source in &sources {
            statistics.input_size += source.file_size;
            match source.item.kind() {
                SourceKind::Pdf => statistics.pdf_files += 1,
                SourceKind::Image(_) => statistics.image_files += 1,
            }
        }

        let paths = sources.iter().map(|s| s.item.path().to_path_buf()).collect();
        let mut document = self.build_document(&sources)?;
        self.metadata_manager
            .set_metadata(&mut document, &self.metadata);

        statistics.total_pages = document.get_pages().len();
        statistics.assemble_time = start.elapsed();

        info!(
            files = statistics.files_stitched,
            pages = statistics.total_pages,
            elapsed = ?statistics.assemble_time,
            "assembled document"
        );

        Ok(AssembleResult {
            document,
            statistics,
            sources: paths,
        })
    }

    /// Assemble and write the document to `output` atomically.
    ///
    /// Nothing is written unless every input materialized successfully.
    pub async fn save(&self, registry: &Registry, output: &Path) -> Result<StitchStatistics> {
        let AssembleResult {
            document,
            mut statistics,
            ..
        } = self.assemble(registry).await?;

        let written = self.writer.save_with_stats(document, output).await?;
        statistics.output_size = Some(written.file_size);
        statistics.write_time = Some(written.write_time);

        Ok(statistics)
    }

    fn build_document(&self, sources: &[MaterializedSource]) -> Result<Document> {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let mut kids: Vec<Object> = Vec::new();

        for source in sources {
            let first = kids.len() + 1;
            let mut imported: Vec<ObjectId> = Vec::new();

            for page in &source.pages {
                match page {
                    RenderedPage::Imported(id) => imported.push(*id),
                    RenderedPage::Image(image) => {
                        flush_imported(&mut document, source, &mut imported, pages_id, &mut kids);
                        let id = insert_image_page(&mut document, image, pages_id)?;
                        kids.push(id.into());
                    }
                }
            }
            flush_imported(&mut document, source, &mut imported, pages_id, &mut kids);

            debug!(
                path = %source.item.path().display(),
                pages = %format!("{first}-{}", kids.len()),
                "grafted pages"
            );
        }

        let count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }
            .into(),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Ok(document)
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(PageSpec::default(), Limits::default())
    }
}

/// Graft the pending run of imported pages, keeping their order.
fn flush_imported(
    document: &mut Document,
    source: &MaterializedSource,
    imported: &mut Vec<ObjectId>,
    parent: ObjectId,
    kids: &mut Vec<Object>,
) {
    if imported.is_empty() {
        return;
    }
    if let Some(source_document) = &source.document {
        let grafted = graft_pages(document, source_document, imported, parent);
        kids.extend(grafted.into_iter().map(Object::from));
    }
    imported.clear();
}
