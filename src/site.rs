use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing::{debug, warn};

/// A file produced during the build that must be copied verbatim into the
/// output directory during the final copy pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    source: PathBuf,
    dir: String,
    name: String,
}

impl StaticFile {
    pub fn new(source_root: &Path, dir: &str, name: &str) -> Self {
        Self {
            source: source_root.to_path_buf(),
            dir: dir.to_string(),
            name: name.to_string(),
        }
    }

    /// Path relative to the site source root.
    pub fn relative_path(&self) -> PathBuf {
        if self.dir.is_empty() {
            PathBuf::from(&self.name)
        } else {
            Path::new(&self.dir).join(&self.name)
        }
    }

    pub fn absolute_path(&self) -> PathBuf {
        self.source.join(self.relative_path())
    }

    pub fn copy_to(&self, dest_root: &Path) -> Result<()> {
        let src = self.absolute_path();
        let dest = dest_root.join(self.relative_path());
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&src, &dest)?;
        Ok(())
    }
}

/// Build-wide state handed to the template layer: the site source root and
/// the mutable static-file registry. Shared as `Arc<SiteContext>` because
/// Handlebars helpers must be `Send + Sync`.
#[derive(Debug)]
pub struct SiteContext {
    pub source: PathBuf,
    static_files: Mutex<Vec<StaticFile>>,
}

impl SiteContext {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            static_files: Mutex::new(Vec::new()),
        }
    }

    /// Appends without deduplication; two registrations of the same name are
    /// kept as two entries.
    pub fn register_static_file(&self, file: StaticFile) {
        debug!("Registering static file: {}", file.relative_path().display());
        // a panicked holder cannot leave the Vec half-updated, so a
        // poisoned lock is still usable
        self.static_files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(file);
    }

    pub fn static_files(&self) -> Vec<StaticFile> {
        self.static_files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Final copy pass. Entries whose source file never appeared (a failed
    /// tool run) are logged and skipped rather than failing the build.
    pub fn copy_static_files(&self, dest_root: &Path) -> Result<()> {
        for file in self.static_files() {
            if !file.absolute_path().exists() {
                warn!(
                    "Static file missing, skipping copy: {}",
                    file.absolute_path().display()
                );
                continue;
            }
            debug!("Copying static file: {}", file.relative_path().display());
            file.copy_to(dest_root)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_with_empty_dir_is_just_the_name() {
        let file = StaticFile::new(Path::new("/site"), "", "wire1.png");
        assert_eq!(file.relative_path(), PathBuf::from("wire1.png"));
        assert_eq!(file.absolute_path(), PathBuf::from("/site/wire1.png"));
    }

    #[test]
    fn relative_path_includes_dir() {
        let file = StaticFile::new(Path::new("/site"), "img", "wire1.png");
        assert_eq!(file.relative_path(), PathBuf::from("img/wire1.png"));
    }

    #[test]
    fn registry_keeps_duplicate_entries() {
        let site = SiteContext::new("/site");
        site.register_static_file(StaticFile::new(Path::new("/site"), "", "wire1.png"));
        site.register_static_file(StaticFile::new(Path::new("/site"), "", "wire1.png"));

        let files = site.static_files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0], files[1]);
    }

    #[test]
    fn copy_skips_missing_sources() {
        let src = tempfile::tempdir().expect("tempdir");
        let dest = tempfile::tempdir().expect("tempdir");

        std::fs::write(src.path().join("present.png"), b"png").expect("write");
        let site = SiteContext::new(src.path());
        site.register_static_file(StaticFile::new(src.path(), "", "present.png"));
        site.register_static_file(StaticFile::new(src.path(), "", "absent.png"));

        site.copy_static_files(dest.path()).expect("copy to succeed");
        assert!(dest.path().join("present.png").exists());
        assert!(!dest.path().join("absent.png").exists());
    }
}
