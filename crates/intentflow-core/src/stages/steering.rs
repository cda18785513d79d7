//! Steering-file writer
//!
//! Writes each generated document as a markdown file with YAML front-matter
//! that tells the consuming assistant when to load it.

use crate::collaborators::SteeringWriter;
use crate::error::StageError;
use crate::model::{GeneratedDocument, SteeringFile};
use crate::types::{SteeringInclusion, SteeringOptions};
use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Default output directory, relative to the working directory
pub const DEFAULT_STEERING_DIR: &str = ".intentflow/steering";

/// Writes steering files to the local filesystem
#[derive(Debug, Clone)]
pub struct FsSteeringWriter {
    base_dir: PathBuf,
}

impl FsSteeringWriter {
    /// Create writer rooted at `base_dir`
    #[inline]
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Render one steering file
    #[must_use]
    pub fn render(document: &GeneratedDocument, options: &SteeringOptions) -> String {
        let mut out = String::from("---\n");
        let inclusion = match options.inclusion {
            SteeringInclusion::Always => "always",
            SteeringInclusion::FileMatch => "fileMatch",
            SteeringInclusion::Manual => "manual",
        };
        let _ = writeln!(out, "inclusion: {inclusion}");
        if options.inclusion == SteeringInclusion::FileMatch {
            let pattern = options.file_match_pattern.as_deref().unwrap_or("**/*");
            let _ = writeln!(out, "fileMatchPattern: \"{pattern}\"");
        }
        let _ = writeln!(out, "document: {}", document.kind.slug());
        let _ = writeln!(out, "generatedAt: {}", document.generated_at.to_rfc3339());
        out.push_str("---\n\n");
        out.push_str(&document.content);
        out
    }

    fn file_name(document: &GeneratedDocument, options: &SteeringOptions) -> String {
        match options.feature_name.as_deref().filter(|n| !n.is_empty()) {
            Some(feature) => format!("{}-{}.md", super::kebab_case(feature, 8), document.kind.slug()),
            None => format!("{}.md", document.kind.slug()),
        }
    }
}

impl Default for FsSteeringWriter {
    fn default() -> Self {
        Self::new(DEFAULT_STEERING_DIR)
    }
}

#[async_trait]
impl SteeringWriter for FsSteeringWriter {
    async fn write(
        &self,
        documents: &[GeneratedDocument],
        options: &SteeringOptions,
    ) -> Result<Vec<SteeringFile>, StageError> {
        let dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.clone());

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StageError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;

        let mut written = Vec::with_capacity(documents.len());
        for document in documents {
            let path = dir.join(Self::file_name(document, options));
            let content = Self::render(document, options);
            tokio::fs::write(&path, content.as_bytes())
                .await
                .map_err(|e| StageError::Unavailable(format!("cannot write {}: {e}", path.display())))?;

            tracing::debug!(path = %path.display(), bytes = content.len(), "steering file written");
            written.push(SteeringFile {
                path,
                document: document.kind,
                bytes: content.len(),
            });
        }

        Ok(written)
    }
}
