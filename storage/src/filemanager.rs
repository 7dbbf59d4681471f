use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use common::FsError;
use tokio::fs::{self, DirBuilder, File, OpenOptions};

use crate::resolver;

/// Thin wrapper over the native filesystem calls, rooted at `root`.
///
/// Everything here reports raw `io::Error`s; deciding what a failure means is
/// left to the engine.
#[derive(Clone, Debug)]
pub struct FileManager {
    root: PathBuf,
}

impl FileManager {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a virtual path.
    pub fn full(&self, virtual_path: &str) -> Result<PathBuf, FsError> {
        resolver::resolve(&self.root, virtual_path)
    }

    pub async fn stat(&self, path: &Path) -> io::Result<Option<Metadata>> {
        match fs::metadata(path).await {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn is_exist(&self, path: &Path) -> io::Result<bool> {
        Ok(self.stat(path).await?.is_some())
    }

    pub async fn is_dir_exist(&self, path: &Path) -> io::Result<bool> {
        Ok(self.stat(path).await?.is_some_and(|m| m.is_dir()))
    }

    pub async fn is_file_exist(&self, path: &Path) -> io::Result<bool> {
        Ok(self.stat(path).await?.is_some_and(|m| !m.is_dir()))
    }

    /// Entry names split into `(files, dirs)`, in directory scan order.
    pub async fn read_dir(&self, path: &Path) -> io::Result<(Vec<String>, Vec<String>)> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        let mut entries = fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry
                .file_name()
                .into_string()
                .unwrap_or_else(|raw| raw.to_string_lossy().into_owned());
            if entry.file_type().await?.is_dir() {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }
        Ok((files, dirs))
    }

    pub async fn is_empty_dir(&self, path: &Path) -> io::Result<bool> {
        let mut entries = fs::read_dir(path).await?;
        Ok(entries.next_entry().await?.is_none())
    }

    pub async fn mkdir(&self, path: &Path) -> io::Result<()> {
        let mut builder = DirBuilder::new();
        #[cfg(unix)]
        builder.mode(0o770);
        builder.create(path).await
    }

    pub async fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path).await
    }

    /// Creates a new file; fails if anything appeared at `path` meanwhile.
    pub async fn create(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
    }

    pub async fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }

    pub async fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path).await
    }

    pub async fn remove_all(&self, path: &Path) -> io::Result<()> {
        match fs::symlink_metadata(path).await?.is_dir() {
            true => fs::remove_dir_all(path).await,
            false => fs::remove_file(path).await,
        }
    }
}
