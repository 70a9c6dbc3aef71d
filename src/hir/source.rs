//! File set — stable ids and current contents for source files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::FileId;
use crate::syntax::Language;

/// Maps paths to [`FileId`]s and keeps the latest text of each file.
///
/// Ids are assigned on first sight and never reused, so they stay valid
/// while a file is edited. Safe to share across loader threads.
#[derive(Debug, Default)]
pub struct FileSet {
    inner: RwLock<FileSetInner>,
}

#[derive(Debug, Default)]
struct FileSetInner {
    path_to_id: IndexMap<PathBuf, FileId>,
    id_to_path: IndexMap<FileId, PathBuf>,
    contents: IndexMap<FileId, Arc<str>>,
    next_id: u32,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or assign the id for a path.
    pub fn file_id(&self, path: &Path) -> FileId {
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.path_to_id.get(path) {
                return id;
            }
        }

        let mut inner = self.inner.write();
        // another thread may have won the race
        if let Some(&id) = inner.path_to_id.get(path) {
            return id;
        }

        let id = FileId::new(inner.next_id);
        inner.next_id += 1;
        inner.path_to_id.insert(path.to_owned(), id);
        inner.id_to_path.insert(id, path.to_owned());
        id
    }

    /// Id of a path that is already known.
    pub fn find(&self, path: &Path) -> Option<FileId> {
        self.inner.read().path_to_id.get(path).copied()
    }

    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.inner.read().id_to_path.get(&file).cloned()
    }

    /// Language implied by the file's extension.
    pub fn language(&self, file: FileId) -> Option<Language> {
        let inner = self.inner.read();
        let path = inner.id_to_path.get(&file)?;
        Language::from_path(path)
    }

    pub fn set_contents(&self, file: FileId, contents: impl Into<Arc<str>>) {
        self.inner.write().contents.insert(file, contents.into());
    }

    pub fn contents(&self, file: FileId) -> Option<Arc<str>> {
        self.inner.read().contents.get(&file).cloned()
    }

    /// Forget a file. Its id is not handed out again.
    pub fn remove(&self, file: FileId) {
        let mut inner = self.inner.write();
        if let Some(path) = inner.id_to_path.shift_remove(&file) {
            inner.path_to_id.shift_remove(&path);
        }
        inner.contents.shift_remove(&file);
    }

    pub fn len(&self) -> usize {
        self.inner.read().path_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All file ids in assignment order.
    pub fn files(&self) -> Vec<FileId> {
        self.inner.read().id_to_path.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_is_stable() {
        let files = FileSet::new();
        let a = files.file_id(Path::new("src/a/Foo.hx"));
        let b = files.file_id(Path::new("src/a/Bar.as"));

        assert_ne!(a, b);
        assert_eq!(files.file_id(Path::new("src/a/Foo.hx")), a);
        assert_eq!(files.find(Path::new("src/a/Bar.as")), Some(b));
        assert_eq!(files.find(Path::new("src/Missing.hx")), None);
    }

    #[test]
    fn test_language_from_extension() {
        let files = FileSet::new();
        let hx = files.file_id(Path::new("Main.hx"));
        let as3 = files.file_id(Path::new("Main.as"));
        let other = files.file_id(Path::new("notes.txt"));

        assert_eq!(files.language(hx), Some(Language::Haxe));
        assert_eq!(files.language(as3), Some(Language::ActionScript));
        assert_eq!(files.language(other), None);
    }

    #[test]
    fn test_remove_does_not_reuse_ids() {
        let files = FileSet::new();
        let first = files.file_id(Path::new("A.hx"));
        files.set_contents(first, "class A {}");
        files.remove(first);

        assert!(files.contents(first).is_none());
        assert!(files.path(first).is_none());
        let second = files.file_id(Path::new("A.hx"));
        assert_ne!(first, second);
        assert_eq!(files.len(), 1);
    }
}
