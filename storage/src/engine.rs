//! Storage engine operations.
//!
//! Each operation resolves its virtual path, runs the explicit existence
//! checks that decide `NotFound`/`AlreadyExists`/`NotEmpty`, then performs the
//! native call. Checks and calls are not atomic: a concurrent writer on the
//! same path can make the native call fail, which is reported as `Internal`.

use std::io;
use std::path::{Path, PathBuf};

use common::stream::DEFAULT_CHUNK_SIZE;
use common::{FsError, TransferHeader};
use tokio::fs::File;
use tracing::error;

use crate::filemanager::FileManager;
use crate::resolver;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Listing {
    pub files: Vec<Entry>,
    pub dirs: Vec<Entry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

pub struct Engine {
    fm: FileManager,
    chunk_size: usize,
}

/// Logs the cause and hands back the opaque internal error.
fn internal(op: &str, path: &str, err: io::Error) -> FsError {
    error!(op, path, error = %err, "filesystem call failed");
    FsError::Internal("internal storage error".to_string())
}

fn parent(canonical: &str) -> Option<&str> {
    if canonical == "/" {
        return None;
    }
    match canonical.rfind('/') {
        Some(0) => Some("/"),
        Some(i) => Some(&canonical[..i]),
        None => None,
    }
}

fn base_name(canonical: &str) -> &str {
    canonical.rsplit('/').next().unwrap_or(canonical)
}

impl Engine {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            fm: FileManager::new(root),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        self.fm.root()
    }

    /// Size of the chunks a download is split into.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn locate(&self, path: &str) -> Result<(String, PathBuf), FsError> {
        Ok((resolver::normalize(path)?, self.fm.full(path)?))
    }

    async fn ensure_parent_dir(&self, canonical: &str) -> Result<(), FsError> {
        let Some(parent) = parent(canonical) else {
            return Ok(());
        };
        if !self.is_dir_exist(parent).await? {
            return Err(FsError::NotFound(parent.to_string()));
        }
        Ok(())
    }

    pub async fn is_exist(&self, path: &str) -> Result<bool, FsError> {
        let (canonical, full) = self.locate(path)?;
        self.fm
            .is_exist(&full)
            .await
            .map_err(|e| internal("is_exist", &canonical, e))
    }

    pub async fn is_dir_exist(&self, path: &str) -> Result<bool, FsError> {
        let (canonical, full) = self.locate(path)?;
        self.fm
            .is_dir_exist(&full)
            .await
            .map_err(|e| internal("is_dir_exist", &canonical, e))
    }

    pub async fn is_file_exist(&self, path: &str) -> Result<bool, FsError> {
        let (canonical, full) = self.locate(path)?;
        self.fm
            .is_file_exist(&full)
            .await
            .map_err(|e| internal("is_file_exist", &canonical, e))
    }

    pub async fn stat(&self, path: &str) -> Result<Option<Stat>, FsError> {
        let (canonical, full) = self.locate(path)?;
        let meta = self
            .fm
            .stat(&full)
            .await
            .map_err(|e| internal("stat", &canonical, e))?;
        Ok(meta.map(|m| Stat {
            name: base_name(&canonical).to_string(),
            size: m.len(),
            is_dir: m.is_dir(),
        }))
    }

    pub async fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let (canonical, full) = self.locate(path)?;
        if self.is_exist(&canonical).await? {
            return Err(FsError::AlreadyExists(canonical));
        }
        self.ensure_parent_dir(&canonical).await?;
        self.fm
            .mkdir(&full)
            .await
            .map_err(|e| internal("mkdir", &canonical, e))
    }

    pub async fn read_dir(&self, path: &str) -> Result<Listing, FsError> {
        let (canonical, full) = self.locate(path)?;
        if !self.is_dir_exist(&canonical).await? {
            return Err(FsError::NotFound(canonical));
        }
        let (files, dirs) = self
            .fm
            .read_dir(&full)
            .await
            .map_err(|e| internal("read_dir", &canonical, e))?;

        let entry = |name: String| Entry {
            path: resolver::child(&canonical, &name),
            name,
        };
        Ok(Listing {
            files: files.into_iter().map(entry).collect(),
            dirs: dirs.into_iter().map(entry).collect(),
        })
    }

    /// Removes a file, or a directory only when it is empty.
    pub async fn remove(&self, path: &str) -> Result<(), FsError> {
        let (canonical, full) = self.locate(path)?;
        if canonical == "/" {
            return Err(FsError::InvalidArgument(
                "cannot remove root directory".to_string(),
            ));
        }
        match self.stat(&canonical).await? {
            Some(stat) if !stat.is_dir => self
                .fm
                .remove_file(&full)
                .await
                .map_err(|e| internal("remove", &canonical, e)),
            Some(_) => {
                let empty = self
                    .fm
                    .is_empty_dir(&full)
                    .await
                    .map_err(|e| internal("remove", &canonical, e))?;
                if !empty {
                    return Err(FsError::NotEmpty(canonical));
                }
                self.fm
                    .remove_dir(&full)
                    .await
                    .map_err(|e| internal("remove", &canonical, e))
            }
            None => Err(FsError::NotFound(canonical)),
        }
    }

    /// Removes a file or a whole directory tree. A failure half way leaves
    /// the tree partially deleted.
    pub async fn remove_all(&self, path: &str) -> Result<(), FsError> {
        let (canonical, full) = self.locate(path)?;
        if canonical == "/" {
            return Err(FsError::InvalidArgument(
                "cannot remove root directory".to_string(),
            ));
        }
        if !self.is_exist(&canonical).await? {
            return Err(FsError::NotFound(canonical));
        }
        self.fm
            .remove_all(&full)
            .await
            .map_err(|e| internal("remove_all", &canonical, e))
    }

    /// Opens a regular file for download. The transfer header is the file's
    /// stat taken right before opening it.
    pub async fn open_download(&self, path: &str) -> Result<(TransferHeader, File), FsError> {
        let (canonical, full) = self.locate(path)?;
        let stat = match self.stat(&canonical).await? {
            Some(stat) if !stat.is_dir => stat,
            _ => return Err(FsError::NotFound(canonical)),
        };
        let file = self
            .fm
            .open(&full)
            .await
            .map_err(|e| internal("download", &canonical, e))?;
        let header = TransferHeader {
            name: stat.name,
            size: stat.size,
        };
        Ok((header, file))
    }

    /// Creates the destination of an upload. Nothing may exist at the path
    /// yet and its parent must be a directory.
    pub async fn create_upload(&self, path: &str) -> Result<File, FsError> {
        let (canonical, full) = self.locate(path)?;
        if self.is_exist(&canonical).await? {
            return Err(FsError::AlreadyExists(canonical));
        }
        self.ensure_parent_dir(&canonical).await?;
        self.fm
            .create(&full)
            .await
            .map_err(|e| internal("upload", &canonical, e))
    }
}
