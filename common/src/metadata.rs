//! Call-scoped metadata carried next to streaming calls.
//!
//! Upload and Download have no structured field for the target path, so the
//! caller attaches it to the call metadata and the receiver reads it before
//! the first stream message. Download answers with a `name`/`size` header.
//!
//! gRPC ASCII metadata only holds visible ASCII and trims surrounding
//! whitespace, so any other value travels as raw UTF-8 under the `-bin` twin
//! of its key.

use tonic::Request;
use tonic::metadata::{MetadataMap, MetadataValue};

use crate::status::FsError;

pub const PATH_KEY: &str = "path";
pub const PATH_BIN_KEY: &str = "path-bin";
pub const NAME_KEY: &str = "name";
pub const NAME_BIN_KEY: &str = "name-bin";
pub const SIZE_KEY: &str = "size";

fn is_ascii_safe(value: &str) -> bool {
    value.bytes().all(|b| (0x20..0x7f).contains(&b)) && value.trim() == value
}

fn put_text(md: &mut MetadataMap, key: &'static str, bin_key: &'static str, value: &str) {
    if is_ascii_safe(value) {
        if let Ok(v) = MetadataValue::try_from(value) {
            md.insert(key, v);
            return;
        }
    }
    md.insert_bin(bin_key, MetadataValue::from_bytes(value.as_bytes()));
}

fn get_text(md: &MetadataMap, key: &str, bin_key: &str) -> Option<String> {
    if let Some(value) = md.get(key).and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }
    md.get_bin(bin_key)
        .and_then(|v| v.to_bytes().ok())
        .and_then(|raw| String::from_utf8(raw.to_vec()).ok())
}

/// Per-call parameters of a streaming transfer, kept apart from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    path: String,
}

impl CallContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn attach(&self, md: &mut MetadataMap) {
        put_text(md, PATH_KEY, PATH_BIN_KEY, &self.path);
    }

    /// Wraps `message` (a single message or a request stream) into a request
    /// carrying this context.
    pub fn into_request<T>(self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        self.attach(request.metadata_mut());
        request
    }

    /// Reads the context on the receiving side. An absent or empty path is an
    /// invalid argument.
    pub fn from_metadata(md: &MetadataMap) -> Result<Self, FsError> {
        match get_text(md, PATH_KEY, PATH_BIN_KEY) {
            Some(path) if !path.is_empty() => Ok(Self { path }),
            _ => Err(FsError::InvalidArgument("missing path".to_string())),
        }
    }
}

/// Download response header, sent before the first chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferHeader {
    pub name: String,
    pub size: u64,
}

impl TransferHeader {
    pub fn attach(&self, md: &mut MetadataMap) {
        put_text(md, NAME_KEY, NAME_BIN_KEY, &self.name);
        md.insert(SIZE_KEY, MetadataValue::from(self.size));
    }

    pub fn name_from(md: &MetadataMap) -> Option<String> {
        get_text(md, NAME_KEY, NAME_BIN_KEY)
    }

    pub fn size_from(md: &MetadataMap) -> Option<u64> {
        md.get(SIZE_KEY)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    /// Both fields present and well formed.
    pub fn from_metadata(md: &MetadataMap) -> Option<Self> {
        Some(Self {
            name: Self::name_from(md)?,
            size: Self::size_from(md)?,
        })
    }
}
