//! Outcome taxonomy shared by the storage engine and the gateway.
//!
//! `FsError` is the failure half of every operation's outcome. The RPC
//! encoding of the taxonomy lives here; the gateway keeps its own HTTP table
//! keyed by the same [`ErrorKind`].

use thiserror::Error;
use tonic::{Code, Status};

/// Classification every operation failure falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    NotEmpty,
    InvalidArgument,
    Internal,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::NotFound,
        ErrorKind::AlreadyExists,
        ErrorKind::NotEmpty,
        ErrorKind::InvalidArgument,
        ErrorKind::Internal,
    ];

    /// RPC status code the engine reports for this kind.
    pub fn rpc_code(self) -> Code {
        match self {
            ErrorKind::NotFound => Code::NotFound,
            ErrorKind::AlreadyExists => Code::AlreadyExists,
            ErrorKind::NotEmpty => Code::FailedPrecondition,
            ErrorKind::InvalidArgument => Code::InvalidArgument,
            ErrorKind::Internal => Code::Internal,
        }
    }

    /// Decodes a status code received from the engine. Codes the engine never
    /// produces yield `None`; transport failures such as `Unavailable` land
    /// there.
    pub fn from_rpc_code(code: Code) -> Option<ErrorKind> {
        match code {
            Code::NotFound => Some(ErrorKind::NotFound),
            Code::AlreadyExists => Some(ErrorKind::AlreadyExists),
            Code::FailedPrecondition => Some(ErrorKind::NotEmpty),
            Code::InvalidArgument => Some(ErrorKind::InvalidArgument),
            Code::Internal => Some(ErrorKind::Internal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("file or directory {0} not found")]
    NotFound(String),

    #[error("file or directory {0} already exists")]
    AlreadyExists(String),

    #[error("directory {0} is not empty")]
    NotEmpty(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Internal(String),
}

impl FsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::NotFound(_) => ErrorKind::NotFound,
            FsError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            FsError::NotEmpty(_) => ErrorKind::NotEmpty,
            FsError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            FsError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<FsError> for Status {
    fn from(err: FsError) -> Self {
        Status::new(err.kind().rpc_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_table_decodes_what_it_encodes() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_rpc_code(kind.rpc_code()), Some(kind));
        }
    }

    #[test]
    fn test_not_empty_is_failed_precondition() {
        assert_eq!(ErrorKind::NotEmpty.rpc_code(), Code::FailedPrecondition);
    }

    #[test]
    fn test_foreign_codes_are_unrecognized() {
        for code in [
            Code::Unavailable,
            Code::DeadlineExceeded,
            Code::Cancelled,
            Code::Unknown,
            Code::PermissionDenied,
        ] {
            assert_eq!(ErrorKind::from_rpc_code(code), None, "{code:?}");
        }
    }

    #[test]
    fn test_fs_error_into_status() {
        let status = Status::from(FsError::NotFound("/a.txt".to_string()));
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "file or directory /a.txt not found");

        let status = Status::from(FsError::NotEmpty("/dir".to_string()));
        assert_eq!(status.code(), Code::FailedPrecondition);
    }
}
