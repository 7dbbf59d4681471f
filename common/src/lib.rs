//! Shared pieces of the ns file service: the `StorageService` RPC contract,
//! the metadata side-channel for streaming calls, the chunked transfer
//! adapters and the outcome taxonomy both daemons translate from.

pub mod metadata;
pub mod proto;
pub mod signal;
pub mod status;
pub mod stream;

pub use metadata::{CallContext, TransferHeader};
pub use status::{ErrorKind, FsError};
pub use stream::{SequentialReader, SequentialWriter, TransferError, copy};
