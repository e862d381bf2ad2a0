//! Batch transformation of a documentation source tree.
//!
//! Every `.md`/`.mdx` file under the source directory is expanded in parallel
//! with the global rayon pool and written to the same relative path under
//! the output directory. Files and directories whose name starts with `_`
//! (partials, changelog fragments) are inputs to directives, not pages, and
//! are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use rayon::prelude::*;
use tagdown_directives::{
    Diagnostic, DirectiveProcessor, DirectiveProcessorConfig, DirectiveRegistry, Level,
};

/// Error that prevents the build from starting.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BuildError {
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Outcome of transforming one document.
#[derive(Debug)]
pub(crate) struct DocumentReport {
    /// Path relative to the source directory.
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the document could not be read or written.
    pub failure: Option<String>,
}

impl DocumentReport {
    fn failed(path: &Path, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            diagnostics: Vec::new(),
            failure: Some(message),
        }
    }
}

/// Per-document results of a build, in source path order.
#[derive(Debug, Default)]
pub(crate) struct BuildReport {
    pub documents: Vec<DocumentReport>,
}

impl BuildReport {
    /// Error diagnostics plus failed documents.
    pub(crate) fn error_count(&self) -> usize {
        self.documents
            .iter()
            .map(|doc| {
                usize::from(doc.failure.is_some())
                    + doc
                        .diagnostics
                        .iter()
                        .filter(|d| d.level == Level::Error)
                        .count()
            })
            .sum()
    }

    pub(crate) fn warning_count(&self) -> usize {
        self.documents
            .iter()
            .flat_map(|doc| &doc.diagnostics)
            .filter(|d| d.level == Level::Warning)
            .count()
    }
}

/// Expands every document of a source tree into an output tree.
pub(crate) struct SiteBuilder<'r> {
    registry: &'r DirectiveRegistry,
    source_dir: PathBuf,
    output_dir: PathBuf,
}

impl<'r> SiteBuilder<'r> {
    pub(crate) fn new(
        registry: &'r DirectiveRegistry,
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Transform all documents. Per-document failures are reported, not
    /// returned.
    pub(crate) fn build(&self) -> Result<BuildReport, BuildError> {
        let Sources { pages, unreadable } = self.collect_sources()?;
        tracing::info!(
            documents = pages.len(),
            source = %self.source_dir.display(),
            "Processing documents"
        );

        let mut documents: Vec<DocumentReport> = pages
            .par_iter()
            .map(|relative| self.build_one(relative))
            .collect();
        documents.extend(
            unreadable
                .into_iter()
                .map(|(path, message)| DocumentReport::failed(&path, message)),
        );
        documents.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(BuildReport { documents })
    }

    fn build_one(&self, relative: &Path) -> DocumentReport {
        let source = self.source_dir.join(relative);
        let content = match fs::read_to_string(&source) {
            Ok(content) => content,
            Err(e) => {
                return DocumentReport::failed(
                    relative,
                    format!("Failed to read {}: {e}", source.display()),
                );
            }
        };

        let base_dir = source.parent().unwrap_or(&self.source_dir).to_path_buf();
        let config = DirectiveProcessorConfig::new()
            .with_base_dir(base_dir)
            .with_source_path(&source);
        let processed = DirectiveProcessor::with_config(self.registry, config).process(&content);

        let target = self.output_dir.join(relative);
        let written = target
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&target, &processed.text));
        if let Err(e) = written {
            return DocumentReport::failed(
                relative,
                format!("Failed to write {}: {e}", target.display()),
            );
        }

        tracing::debug!(
            path = %relative.display(),
            diagnostics = processed.diagnostics.len(),
            "Processed document"
        );
        DocumentReport {
            path: relative.to_path_buf(),
            diagnostics: processed.diagnostics,
            failure: None,
        }
    }

    /// Relative paths of all pages, sorted, plus entries that could not be
    /// read while walking the tree.
    fn collect_sources(&self) -> Result<Sources, BuildError> {
        if !self.source_dir.is_dir() {
            return Err(BuildError::SourceNotFound(self.source_dir.clone()));
        }

        let root = Pattern::escape(&self.source_dir.to_string_lossy());
        let mut sources = Sources::default();
        for ext in ["md", "mdx"] {
            for entry in glob::glob(&format!("{root}/**/*.{ext}"))? {
                let (path, error) = match entry {
                    Ok(path) => (path, None),
                    Err(e) => (e.path().to_path_buf(), Some(e)),
                };
                let Ok(relative) = path.strip_prefix(&self.source_dir) else {
                    continue;
                };
                if !is_page(relative) {
                    continue;
                }
                match error {
                    None => sources.pages.push(relative.to_path_buf()),
                    Some(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e.error(),
                            "Unreadable source entry"
                        );
                        sources.unreadable.insert(
                            relative.to_path_buf(),
                            format!("Failed to read {}: {}", path.display(), e.error()),
                        );
                    }
                }
            }
        }
        sources.pages.sort();
        Ok(sources)
    }
}

/// Result of walking the source tree.
#[derive(Default)]
struct Sources {
    pages: Vec<PathBuf>,
    /// Each directory is walked once per extension; keyed to report it once.
    unreadable: BTreeMap<PathBuf, String>,
}

fn is_page(relative: &Path) -> bool {
    !relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('_'))
}
