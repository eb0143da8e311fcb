//! Template source loading
//!
//! Resolves identifiers to files under the configured root and performs
//! the non-blocking metadata/content reads. Exactly one metadata lookup
//! happens per load, and the content read only follows a successful stat.
//! No caching lives here; reuse decisions belong to the executor.

use std::path::Path;

use tokio::fs;

use crate::core::{SourceMetadata, TemplateResult, TemplateUnit};

/// Reads template sources from the filesystem.
#[derive(Default)]
pub struct SourceLoader;

impl SourceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Look up file metadata for a resolved template path.
    pub async fn stat(&self, path: &Path) -> TemplateResult<SourceMetadata> {
        let meta = fs::metadata(path).await?;
        Ok(SourceMetadata::from(&meta))
    }

    /// Read a template file as UTF-8 text.
    pub async fn read(&self, path: &Path) -> TemplateResult<String> {
        Ok(fs::read_to_string(path).await?)
    }

    /// Populate a unit's metadata and raw source from its resolved path.
    pub async fn load(&self, unit: &mut TemplateUnit) -> TemplateResult<()> {
        let path = unit.resolved_path();
        let metadata = self.stat(&path).await?;
        unit.set_metadata(metadata);
        let source = self.read(&path).await?;
        unit.set_raw_source(source);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;
    use crate::config::TemplateSettings;
    use crate::sink::BufferSink;

    fn unit_for(root: &Path, identifier: &str) -> TemplateUnit {
        let settings = Arc::new(TemplateSettings {
            root: root.to_path_buf(),
            default_document: "index.html".to_string(),
        });
        TemplateUnit::for_identifier(identifier, settings, Arc::new(BufferSink::new()))
    }

    #[tokio::test]
    async fn test_load_populates_metadata_then_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("index.html")).unwrap();
        file.write_all(b"<h1>hello</h1>").unwrap();

        let mut unit = unit_for(dir.path(), "/index.html");
        SourceLoader::new().load(&mut unit).await.unwrap();

        assert_eq!(unit.metadata().unwrap().len, 14);
        assert!(unit.metadata().unwrap().modified.is_some());
        assert_eq!(unit.raw_source(), Some("<h1>hello</h1>"));
    }

    #[tokio::test]
    async fn test_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = unit_for(dir.path(), "/absent.html");

        let err = SourceLoader::new().load(&mut unit).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(unit.metadata().is_none());
        assert!(unit.raw_source().is_none());
    }

    #[tokio::test]
    async fn test_stat_succeeds_before_failed_read() {
        let dir = tempfile::tempdir().unwrap();
        // A directory stats fine but cannot be read as text: populated
        // metadata with no source pins the stat-then-read order.
        std::fs::create_dir(dir.path().join("section.html")).unwrap();

        let mut unit = unit_for(dir.path(), "/section.html");
        let err = SourceLoader::new().load(&mut unit).await.unwrap_err();

        assert!(!err.is_not_found());
        assert!(unit.metadata().is_some());
        assert!(unit.raw_source().is_none());
    }

    #[tokio::test]
    async fn test_traversal_identifier_stays_in_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("etc"), b"contained").unwrap();

        // "../../etc" collapses to "././etc" and resolves under the root.
        let mut unit = unit_for(dir.path(), "../../etc");
        SourceLoader::new().load(&mut unit).await.unwrap();
        assert_eq!(unit.raw_source(), Some("contained"));
    }
}
