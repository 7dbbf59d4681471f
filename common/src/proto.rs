//! Wire messages of the `storage.StorageService` contract.
//!
//! These mirror `proto/storage.proto` field for field; the service client and
//! server stubs are generated into `OUT_DIR` by the build script.

use bytes::Bytes;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MkdirRequest {
    #[prost(string, tag = "1")]
    pub path: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct MkdirResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadDirRequest {
    #[prost(string, tag = "1")]
    pub path: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DirEntry {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub path: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadDirResponse {
    #[prost(message, repeated, tag = "1")]
    pub files: Vec<DirEntry>,
    #[prost(message, repeated, tag = "2")]
    pub dirs: Vec<DirEntry>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveRequest {
    #[prost(string, tag = "1")]
    pub path: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct RemoveResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveAllRequest {
    #[prost(string, tag = "1")]
    pub path: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct RemoveAllResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UploadRequest {
    #[prost(bytes = "bytes", tag = "1")]
    pub chunk: Bytes,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UploadResponse {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct DownloadRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownloadResponse {
    #[prost(bytes = "bytes", tag = "1")]
    pub chunk: Bytes,
}

// Chunk-carrying messages convert to and from their payload so the stream
// adapters can stay generic over which call they wrap.
impl From<Bytes> for UploadRequest {
    fn from(chunk: Bytes) -> Self {
        Self { chunk }
    }
}

impl From<UploadRequest> for Bytes {
    fn from(message: UploadRequest) -> Self {
        message.chunk
    }
}

impl From<Bytes> for DownloadResponse {
    fn from(chunk: Bytes) -> Self {
        Self { chunk }
    }
}

impl From<DownloadResponse> for Bytes {
    fn from(message: DownloadResponse) -> Self {
        message.chunk
    }
}

include!(concat!(env!("OUT_DIR"), "/storage.StorageService.rs"));
