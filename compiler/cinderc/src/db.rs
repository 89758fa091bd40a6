//! Salsa database for included files.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cinder_ir::{SharedInterner, StringInterner};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use salsa::Setter;

use crate::input::SourceFile;

/// Database trait the queries are written against.
#[salsa::db]
pub trait Db: salsa::Database {
    /// Interner shared by every phase of the session.
    fn interner(&self) -> &StringInterner;

    /// Input for `path`, read from disk on first use.
    ///
    /// Returns `None` if the file cannot be read.
    fn load_file(&self, path: &Path) -> Option<SourceFile>;
}

/// Concrete database owned by a session's compiler.
#[salsa::db]
#[derive(Clone)]
pub struct CinderDb {
    storage: salsa::Storage<Self>,
    interner: SharedInterner,
    /// Inputs by canonical path.
    file_cache: Arc<Mutex<FxHashMap<PathBuf, SourceFile>>>,
    /// Executed queries, when logging is enabled.
    logs: Arc<Mutex<Option<Vec<String>>>>,
}

impl Default for CinderDb {
    fn default() -> Self {
        Self {
            storage: salsa::Storage::default(),
            interner: SharedInterner::new(),
            file_cache: Arc::default(),
            logs: Arc::default(),
        }
    }
}

impl CinderDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` again and update its input if the text changed.
    ///
    /// Unchanged files keep their input revision, so cached queries stay valid.
    pub fn refresh_file(&mut self, path: &Path) -> io::Result<SourceFile> {
        let canonical = path.canonicalize()?;
        let content = std::fs::read_to_string(&canonical)?;
        let cached = self.file_cache.lock().get(&canonical).copied();
        match cached {
            Some(file) => {
                if *file.text(self) != content {
                    tracing::debug!(path = %canonical.display(), "included file changed on disk");
                    file.set_text(self).to(content);
                }
                Ok(file)
            }
            None => {
                let file = SourceFile::new(self, canonical.clone(), content);
                self.file_cache.lock().insert(canonical, file);
                Ok(file)
            }
        }
    }

    /// Every file loaded so far.
    pub fn files(&self) -> Vec<SourceFile> {
        self.file_cache.lock().values().copied().collect()
    }

    /// Record executed queries from now on.
    pub fn enable_logging(&self) {
        let mut logs = self.logs.lock();
        if logs.is_none() {
            *logs = Some(vec![]);
        }
    }

    /// Take the queries executed since the last call.
    pub fn take_logs(&self) -> Vec<String> {
        self.logs.lock().as_mut().map(std::mem::take).unwrap_or_default()
    }
}

#[salsa::db]
impl Db for CinderDb {
    fn interner(&self) -> &StringInterner {
        &self.interner
    }

    fn load_file(&self, path: &Path) -> Option<SourceFile> {
        let canonical = path.canonicalize().ok()?;
        if let Some(&file) = self.file_cache.lock().get(&canonical) {
            return Some(file);
        }
        let content = std::fs::read_to_string(&canonical).ok()?;
        let file = SourceFile::new(self, canonical.clone(), content);
        self.file_cache.lock().insert(canonical, file);
        Some(file)
    }
}

#[salsa::db]
impl salsa::Database for CinderDb {
    fn salsa_event(&self, event: &dyn Fn() -> salsa::Event) {
        if let Some(logs) = &mut *self.logs.lock() {
            let event = event();
            if let salsa::EventKind::WillExecute { .. } = event.kind {
                logs.push(format!("{event:?}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_db_clone_shares_interner() {
        let db = CinderDb::new();
        let name = db.interner().intern("shared");
        let copy = db.clone();
        assert_eq!(copy.interner().lookup(name), "shared");
    }

    #[test]
    fn test_refresh_updates_changed_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.h");
        std::fs::write(&path, "int a;").unwrap();

        let mut db = CinderDb::new();
        let file = db.refresh_file(&path).unwrap();
        assert_eq!(db.load_file(&path), Some(file));

        std::fs::write(&path, "int a = 2;").unwrap();
        let again = db.refresh_file(&path).unwrap();
        assert_eq!(again, file);
        assert_eq!(file.text(&db), "int a = 2;");
        assert_eq!(db.files(), vec![file]);
    }

    #[test]
    fn test_missing_file() {
        let mut db = CinderDb::new();
        assert!(db.refresh_file(Path::new("/no/such/file.h")).is_err());
        assert!(db.load_file(Path::new("/no/such/file.h")).is_none());
    }
}
