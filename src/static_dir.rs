//! Mirroring `<content>/<static_dir>` into `<output>/<static_dir>`.

use crate::{content::FileEvent, log};
use anyhow::{Context, Result};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Source and target of the static mirror.
#[derive(Debug, Clone)]
pub struct StaticDir {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl StaticDir {
    pub fn new(content_root: &Path, output_root: &Path, dir: &Path) -> Self {
        Self {
            source: content_root.join(dir),
            target: output_root.join(dir),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.source)
    }

    fn target_of(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.source)
            .ok()
            .map(|rel| self.target.join(rel))
    }

    /// Replace the target with a fresh copy. A missing source is not an error.
    pub fn init(&self) -> Result<usize> {
        match fs::remove_dir_all(&self.target) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => {
                return Err(err)
                    .with_context(|| format!("cannot clear `{}`", self.target.display()));
            }
            _ => {}
        }
        if !self.source.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(&self.source) {
            let entry = entry?;
            let Some(target) = self.target_of(entry.path()) else {
                continue;
            };
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .with_context(|| format!("cannot create `{}`", target.display()))?;
            } else {
                copy(entry.path(), &target)?;
                copied += 1;
            }
        }
        log!("static"; "{copied} file(s) copied");
        Ok(copied)
    }

    /// Mirror one watched change. Returns `false` for paths outside the static dir.
    pub fn handle(&self, event: &FileEvent) -> Result<bool> {
        let path = event.path();
        let Some(target) = self.target_of(path) else {
            return Ok(false);
        };

        match event {
            FileEvent::Added(_) | FileEvent::Changed(_) => {
                if path.is_file() {
                    copy(path, &target)?;
                    log!("static"; "copied {}", path.display());
                }
            }
            FileEvent::Removed(_) => {
                match fs::remove_file(&target) {
                    Err(err) if err.kind() != io::ErrorKind::NotFound => {
                        return Err(err)
                            .with_context(|| format!("cannot remove `{}`", target.display()));
                    }
                    _ => {}
                }
                log!("static"; "removed {}", target.display());
            }
        }
        Ok(true)
    }
}

fn copy(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create `{}`", parent.display()))?;
    }
    fs::copy(source, target)
        .with_context(|| format!("cannot copy `{}` to `{}`", source.display(), target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::write;
    use tempfile::TempDir;

    fn setup() -> (TempDir, StaticDir) {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("content");
        let output = dir.path().join("build");
        let mirror = StaticDir::new(&content, &output, Path::new("static"));
        (dir, mirror)
    }

    #[test]
    fn test_init_replaces_target() {
        let (dir, mirror) = setup();
        write(&mirror.source, "css/style.css", "body {}");
        write(&mirror.source, "logo.png", "png");
        write(&mirror.target, "stale.txt", "old");

        assert_eq!(mirror.init().unwrap(), 2);
        assert!(mirror.target.join("css/style.css").exists());
        assert!(!mirror.target.join("stale.txt").exists());
        drop(dir);
    }

    #[test]
    fn test_init_without_source() {
        let (_dir, mirror) = setup();
        assert_eq!(mirror.init().unwrap(), 0);
    }

    #[test]
    fn test_handle_events() {
        let (_dir, mirror) = setup();
        let file = write(&mirror.source, "js/app.js", "1");

        assert!(mirror.handle(&FileEvent::Added(file.clone())).unwrap());
        assert_eq!(fs::read_to_string(mirror.target.join("js/app.js")).unwrap(), "1");

        fs::write(&file, "2").unwrap();
        assert!(mirror.handle(&FileEvent::Changed(file.clone())).unwrap());
        assert_eq!(fs::read_to_string(mirror.target.join("js/app.js")).unwrap(), "2");

        fs::remove_file(&file).unwrap();
        assert!(mirror.handle(&FileEvent::Removed(file)).unwrap());
        assert!(!mirror.target.join("js/app.js").exists());
    }

    #[test]
    fn test_handle_ignores_other_paths() {
        let (dir, mirror) = setup();
        let other = dir.path().join("content/turku.en.poi.md");
        assert!(!mirror.handle(&FileEvent::Changed(other)).unwrap());
    }
}
