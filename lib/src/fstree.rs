use std::sync::Arc;
use std::path::Path;
use std::{fs, fmt};

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result, Chainable};

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

/// An in-memory snapshot of a directory tree, parents before children.
#[derive(Debug)]
pub struct FsTree {
    entries: Vec<Entry>,
    map: FxHashMap<Arc<Path>, EntryId>,
}

#[derive(Debug)]
pub struct Entry {
    pub id: EntryId,
    pub path: Arc<Path>,
    pub metadata: fs::Metadata,
    pub file_name: String,
    pub file_type: fs::FileType,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
    pub depth: usize,
}

#[derive(Default, Debug)]
struct FsMetadata(Option<fs::Metadata>);

impl FsTree {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            entries: vec![],
        }
    }

    pub fn build<P: AsRef<Path>>(root: P) -> Result<Self> {
        use jwalk::WalkDirGeneric;

        let root = root.as_ref();
        let walker = WalkDirGeneric::<FsMetadata>::new(root)
            .follow_links(true)
            .sort(true)
            .process_read_dir(|_, _, _, entries| {
                entries.iter_mut()
                    .filter_map(|e| e.as_mut().ok())
                    .for_each(|e| e.client_state = FsMetadata(e.metadata().ok()))
            });

        let mut tree: FsTree = FsTree::new();
        for entry in walker {
            let mut entry = entry.map_err(Error::from_std).chain_with(|| error! {
                "file system tree discovery failed",
                "search root" => root.display(),
            })?;

            let metadata = match entry.client_state.0.take() {
                Some(metadata) => metadata,
                None => fs::metadata(entry.path()).chain_with(|| error! {
                    "failed to read file metadata",
                    "path" => entry.path().display(),
                })?,
            };

            tree.insert(entry, metadata);
        }

        if tree.len() == 0 {
            return err! {
                "file system tree discovery yielded zero files",
                "search root" => root.display(),
            }
        }

        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn root(&self) -> &Entry {
        &self[self.root_id()]
    }

    pub fn root_id(&self) -> EntryId {
        EntryId(0)
    }

    #[inline]
    pub fn get<R, P>(&self, root: R, path: P) -> Option<&Entry>
        where R: Into<Option<EntryId>>, P: AsRef<Path>
    {
        self.get_id(root.into(), path.as_ref()).map(|id| &self[id])
    }

    pub fn get_file_id<R, P>(&self, root: R, path: P) -> Option<EntryId>
        where R: Into<Option<EntryId>>, P: AsRef<Path>
    {
        let id = self.get_id(root.into(), path.as_ref())?;
        self[id].file_type.is_file().then_some(id)
    }

    pub fn get_id<R, P>(&self, root: R, path: P) -> Option<EntryId>
        where R: Into<Option<EntryId>>, P: AsRef<Path>
    {
        let root = root.into().unwrap_or(self.root_id());
        let full_path = self[root].path.join(path.as_ref());
        self.map.get(&*full_path).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn children(&self, id: EntryId) -> impl Iterator<Item = &Entry> {
        self[id].children.iter().map(move |&child| &self[child])
    }

    /// Recreates the tree under `to`, which must not exist. Directories are
    /// created in tree order; files are then copied in parallel. Returns the
    /// number of files copied.
    pub fn copy_into<P: AsRef<Path>>(&self, to: P) -> Result<usize> {
        let to = to.as_ref();
        let (dirs, files): (Vec<&Entry>, Vec<&Entry>) = self.iter()
            .filter(|e| e.file_type.is_dir() || e.file_type.is_file())
            .partition(|e| e.file_type.is_dir());

        for dir in dirs {
            let target = to.join(dir.relative_path());
            fs::create_dir_all(&target).chain_with(|| error! {
                "failed to create directory",
                "path" => target.display(),
            })?;
        }

        files.par_iter()
            .map(|file| {
                let target = to.join(file.relative_path());
                fs::copy(&file.path, &target).map(|_| ()).chain_with(|| error! {
                    "failed to copy file",
                    "source path" => file.path.display(),
                    "destination path" => target.display(),
                })
            })
            .collect::<Result<Vec<()>>>()
            .map(|copied| copied.len())
    }

    fn insert(&mut self, entry: jwalk::DirEntry<FsMetadata>, metadata: fs::Metadata) -> EntryId {
        let entry = Entry {
            id: EntryId(self.entries.len()),
            path: Arc::from(entry.path().into_boxed_path()),
            metadata,
            file_type: entry.file_type,
            file_name: entry.file_name.to_string_lossy().into_owned(),
            parent: self.map.get(&entry.parent_path).cloned(),
            children: vec![],
            depth: entry.depth,
        };

        self.map.insert(entry.path.clone(), entry.id);
        if let Some(parent) = entry.parent {
            self.entries[parent.0].children.push(entry.id);
        }

        let id = entry.id;
        self.entries.push(entry);
        id
    }
}

impl Entry {
    /// Path relative to the root tree of `self`.
    pub fn relative_path(&self) -> &Path {
        let mut components = self.path.components();
        for _ in 0..(self.path.components().count() - self.depth) {
            components.next();
        }

        components.as_path()
    }
}

impl jwalk::ClientState for FsMetadata {
    type ReadDirState = ();
    type DirEntryState = Self;
}

impl std::ops::Index<EntryId> for FsTree {
    type Output = Entry;

    fn index(&self, index: EntryId) -> &Self::Output {
        &self.entries[index.0]
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
