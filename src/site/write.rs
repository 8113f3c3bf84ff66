//! Output file writing.
//!
//! Rendering happens before anything is written; this module only handles
//! file I/O.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{PipelineError, PipelineResult};
use crate::resource::Resource;

use super::StaticFile;

/// Write a resource's output to `destination + relative_url`.
///
/// Resources without output are skipped and return `None`. The resource is
/// frozen once its file exists.
pub fn write_resource(
    resource: &mut Resource,
    destination: &Path,
) -> PipelineResult<Option<PathBuf>> {
    let Some(output) = resource.output() else {
        return Ok(None);
    };
    let path = resource.relative_url().output_file(destination)?;
    write_file(&path, output.as_bytes())?;
    resource.mark_written();
    Ok(Some(path))
}

/// Copy a static file to `destination + url`.
pub fn copy_static(
    file: &StaticFile,
    destination: &Path,
    base_path: &str,
) -> PipelineResult<PathBuf> {
    let path = file.url(base_path).output_file(destination)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    fs::copy(&file.source, &path).map_err(|e| PipelineError::io(&file.source, e))?;
    Ok(path)
}

fn write_file(path: &Path, content: &[u8]) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| PipelineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UrlPath;
    use crate::locale::Locale;
    use crate::resource::{JsonMap, SourceDocument};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn resource(url: &str) -> Resource {
        let doc = SourceDocument::page("about.md", JsonMap::new(), "# About").unwrap();
        Resource::new(Arc::new(doc), Locale::new("en", true))
            .unwrap()
            .with_relative_url(UrlPath::from_permalink(url))
    }

    #[test]
    fn test_write_directory_url() {
        let dir = TempDir::new().unwrap();
        let mut page = resource("/docs/about/");
        page.set_output("<h1>About</h1>".into()).unwrap();

        let path = write_resource(&mut page, dir.path()).unwrap().unwrap();
        assert_eq!(path, dir.path().join("docs/about/index.html"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<h1>About</h1>");

        assert!(page.is_written());
        assert!(matches!(
            page.set_output("again".into()),
            Err(PipelineError::FrozenResource(_))
        ));
    }

    #[test]
    fn test_write_file_url() {
        let dir = TempDir::new().unwrap();
        let mut page = resource("/about.html");
        page.set_output("x".into()).unwrap();
        let path = write_resource(&mut page, dir.path()).unwrap().unwrap();
        assert_eq!(path, dir.path().join("about.html"));
    }

    #[test]
    fn test_unrendered_resource_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut page = resource("/about/");
        assert_eq!(write_resource(&mut page, dir.path()).unwrap(), None);
        assert!(!page.is_written());
    }

    #[test]
    fn test_copy_static_under_base_path() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("logo.png");
        fs::write(&source, b"png").unwrap();
        let file = StaticFile {
            source,
            relative_path: "img/logo.png".into(),
        };

        let out = dir.path().join("out");
        let path = copy_static(&file, &out, "/docs").unwrap();
        assert_eq!(path, out.join("docs/img/logo.png"));
        assert_eq!(fs::read(path).unwrap(), b"png");
    }
}
