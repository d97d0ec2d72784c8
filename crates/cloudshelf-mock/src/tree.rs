//! In-memory namespace backing the mock provider
//!
//! Entries are keyed by their full path. A folder's children are exactly the
//! entries whose parent path equals the folder's path; the root folder is
//! implicit.

use std::collections::BTreeMap;

use cloudshelf_core::domain::{CloudError, CloudFile, CloudPath};

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub file: CloudFile,
    /// Stored bytes; `None` for seeded files and folders
    pub content: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
pub(crate) struct MockTree {
    entries: BTreeMap<CloudPath, Entry>,
}

impl MockTree {
    /// Inserts an entry without any checks
    pub fn seed(&mut self, file: CloudFile) {
        self.entries.insert(
            file.path().clone(),
            Entry {
                file,
                content: None,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Direct children of `path`, in path order
    pub fn children(&self, path: &CloudPath) -> Result<Vec<CloudFile>, CloudError> {
        self.ensure_folder(path)?;
        Ok(self
            .entries
            .values()
            .filter(|e| e.file.parent_path() == *path)
            .map(|e| e.file.clone())
            .collect())
    }

    /// The live entry matching `file` by path and id
    pub fn lookup(&self, file: &CloudFile) -> Result<&Entry, CloudError> {
        self.entries
            .get(file.path())
            .filter(|e| e.file.id() == file.id())
            .ok_or(CloudError::FileNotFound)
    }

    /// Adds a new entry below an existing folder
    pub fn add(&mut self, file: CloudFile, content: Option<Vec<u8>>) -> Result<CloudFile, CloudError> {
        self.ensure_folder(&file.parent_path())?;
        self.ensure_vacant(file.path())?;
        self.entries
            .insert(file.path().clone(), Entry { file: file.clone(), content });
        Ok(file)
    }

    /// Removes `file` and everything below it; returns the bytes freed
    pub fn remove(&mut self, file: &CloudFile) -> Result<u64, CloudError> {
        self.lookup(file)?;
        let freed = self
            .take_subtree(file.path())
            .iter()
            .map(|e| e.file.size())
            .sum();
        Ok(freed)
    }

    pub fn rename(&mut self, file: &CloudFile, new_name: &str) -> Result<CloudFile, CloudError> {
        let renamed = self.lookup(file)?.file.renamed(new_name)?;
        if renamed.path() == file.path() {
            return Ok(renamed);
        }
        self.ensure_vacant(renamed.path())?;
        self.relocate(file.path(), renamed.clone());
        Ok(renamed)
    }

    pub fn move_to(&mut self, file: &CloudFile, destination: &CloudPath) -> Result<CloudFile, CloudError> {
        let current = self.lookup(file)?.file.clone();
        self.ensure_folder(destination)?;
        Self::ensure_not_into_itself(&current, destination)?;

        let moved = current.moved_to(destination)?;
        if moved.path() == current.path() {
            return Ok(current);
        }
        self.ensure_vacant(moved.path())?;
        self.relocate(current.path(), moved.clone());
        Ok(moved)
    }

    /// Duplicates `file` (and its descendants) under `destination`
    ///
    /// `next_id` supplies a fresh id for every created entry. Fails with
    /// `QuotaExceeded` if the duplicated bytes exceed `budget`.
    pub fn copy_to(
        &mut self,
        file: &CloudFile,
        destination: &CloudPath,
        budget: u64,
        mut next_id: impl FnMut() -> String,
    ) -> Result<(CloudFile, u64), CloudError> {
        let current = self.lookup(file)?.file.clone();
        self.ensure_folder(destination)?;
        Self::ensure_not_into_itself(&current, destination)?;

        let copy = current.copied_to(destination, next_id())?;
        self.ensure_vacant(copy.path())?;

        let from = current.path();
        let to = copy.path();
        let mut created = Vec::new();
        for (path, entry) in self.subtree(from) {
            let file = if path == from {
                copy.clone()
            } else {
                match entry.file.rebased(from, to) {
                    Some(rebased) => rebased.with_id(next_id()),
                    None => continue,
                }
            };
            created.push(Entry {
                file,
                content: entry.content.clone(),
            });
        }

        let bytes: u64 = created.iter().map(|e| e.file.size()).sum();
        if bytes > budget {
            return Err(CloudError::QuotaExceeded);
        }
        for entry in created {
            self.entries.insert(entry.file.path().clone(), entry);
        }
        Ok((copy, bytes))
    }

    /// Entries whose name contains `needle` (already lowercased), in path order
    pub fn find(&self, needle: &str) -> impl Iterator<Item = &CloudFile> {
        let needle = needle.to_string();
        self.entries
            .values()
            .map(|e| &e.file)
            .filter(move |f| f.name().to_lowercase().contains(&needle))
    }

    // --- Internals ---

    fn ensure_folder(&self, path: &CloudPath) -> Result<(), CloudError> {
        if path.is_root() {
            return Ok(());
        }
        match self.entries.get(path) {
            Some(e) if e.file.is_folder() => Ok(()),
            Some(_) => Err(CloudError::InvalidPath),
            None => Err(CloudError::FileNotFound),
        }
    }

    fn ensure_vacant(&self, path: &CloudPath) -> Result<(), CloudError> {
        if self.entries.contains_key(path) {
            let name = path.file_name().unwrap_or_default();
            return Err(CloudError::OperationFailed(format!(
                "An item named \"{name}\" already exists"
            )));
        }
        Ok(())
    }

    fn ensure_not_into_itself(file: &CloudFile, destination: &CloudPath) -> Result<(), CloudError> {
        if file.is_folder() && (destination == file.path() || file.path().is_ancestor_of(destination)) {
            return Err(CloudError::InvalidPath);
        }
        Ok(())
    }

    fn subtree<'a>(&'a self, root: &'a CloudPath) -> impl Iterator<Item = (&'a CloudPath, &'a Entry)> {
        self.entries
            .iter()
            .filter(move |(path, _)| *path == root || root.is_ancestor_of(path))
    }

    fn take_subtree(&mut self, root: &CloudPath) -> Vec<Entry> {
        let keys: Vec<CloudPath> = self.subtree(root).map(|(p, _)| p.clone()).collect();
        keys.iter().filter_map(|k| self.entries.remove(k)).collect()
    }

    /// Moves the subtree at `from` so its root becomes `moved`
    fn relocate(&mut self, from: &CloudPath, moved: CloudFile) {
        let to = moved.path().clone();
        for mut entry in self.take_subtree(from) {
            if entry.file.path() == from {
                entry.file = moved.clone();
            } else if let Some(rebased) = entry.file.rebased(from, &to) {
                entry.file = rebased;
            }
            self.entries.insert(entry.file.path().clone(), entry);
        }
    }
}
