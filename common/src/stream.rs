//! Chunked transfer over streaming calls.
//!
//! Every transfer is a sequence of chunks pulled from a [`SequentialReader`]
//! and pushed into a [`SequentialWriter`] by [`copy`], one chunk in flight at a
//! time. The same loop drives uploads and downloads on both services; only the
//! adapters at either end change.

use std::io;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tonic::Status;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("stream terminated: {0}")]
    Rpc(#[from] Status),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("the receiving side closed the stream")]
    Closed,
}

#[async_trait]
pub trait SequentialReader: Send {
    /// Next chunk in order. `None` is the single graceful end of input; every
    /// other termination is an error.
    async fn read_chunk(&mut self) -> Result<Option<Bytes>, TransferError>;
}

#[async_trait]
pub trait SequentialWriter: Send {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), TransferError>;

    /// Signals end of input. Not called when the copy fails.
    async fn finish(&mut self) -> Result<(), TransferError>;
}

/// Copies every chunk from `reader` into `writer`, then finishes the writer.
/// Returns the number of bytes moved.
pub async fn copy<R, W>(reader: &mut R, writer: &mut W) -> Result<u64, TransferError>
where
    R: SequentialReader + ?Sized,
    W: SequentialWriter + ?Sized,
{
    let mut copied = 0u64;
    while let Some(chunk) = reader.read_chunk().await? {
        copied += chunk.len() as u64;
        writer.write_chunk(chunk).await?;
    }
    writer.finish().await?;
    Ok(copied)
}

/// Reads chunks off an incoming message stream, e.g. `tonic::Streaming<_>`.
pub struct StreamReader<S> {
    inner: S,
}

impl<S> StreamReader<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S, T, E> SequentialReader for StreamReader<S>
where
    S: Stream<Item = Result<T, E>> + Unpin + Send,
    T: Into<Bytes> + Send,
    E: Into<TransferError> + Send,
{
    async fn read_chunk(&mut self) -> Result<Option<Bytes>, TransferError> {
        match self.inner.next().await {
            Some(Ok(message)) => Ok(Some(message.into())),
            Some(Err(err)) => Err(err.into()),
            None => Ok(None),
        }
    }
}

/// Caps the chunks of another reader at `max_chunk` bytes, splitting larger
/// ones without copying. Lets a relay forward input of arbitrary framing as
/// messages the receiver accepts.
pub struct BoundedReader<R> {
    inner: R,
    max_chunk: usize,
    pending: Bytes,
}

impl<R> BoundedReader<R> {
    pub fn new(inner: R, max_chunk: usize) -> Self {
        Self {
            inner,
            max_chunk: max_chunk.max(1),
            pending: Bytes::new(),
        }
    }
}

#[async_trait]
impl<R: SequentialReader> SequentialReader for BoundedReader<R> {
    async fn read_chunk(&mut self) -> Result<Option<Bytes>, TransferError> {
        if self.pending.is_empty() {
            match self.inner.read_chunk().await? {
                Some(chunk) => self.pending = chunk,
                None => return Ok(None),
            }
        }
        let n = self.pending.len().min(self.max_chunk);
        Ok(Some(self.pending.split_to(n)))
    }
}

/// Pushes chunks into a bounded channel whose receiver backs an outgoing
/// stream. `finish` drops the sender, which ends that stream.
pub struct StreamWriter<T> {
    tx: Option<mpsc::Sender<T>>,
    wrap: fn(Bytes) -> T,
}

impl<T> StreamWriter<T> {
    pub fn with(tx: mpsc::Sender<T>, wrap: fn(Bytes) -> T) -> Self {
        Self { tx: Some(tx), wrap }
    }
}

impl<T: From<Bytes>> StreamWriter<T> {
    /// Writer for streams of bare messages, as a client request stream.
    pub fn new(tx: mpsc::Sender<T>) -> Self {
        Self::with(tx, T::from)
    }
}

impl<M: From<Bytes>> StreamWriter<Result<M, Status>> {
    /// Writer for streams of results, as a server response stream.
    pub fn fallible(tx: mpsc::Sender<Result<M, Status>>) -> Self {
        Self::with(tx, |chunk| Ok(M::from(chunk)))
    }
}

#[async_trait]
impl<T: Send> SequentialWriter for StreamWriter<T> {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), TransferError> {
        let tx = self.tx.as_ref().ok_or(TransferError::Closed)?;
        tx.send((self.wrap)(chunk))
            .await
            .map_err(|_| TransferError::Closed)
    }

    async fn finish(&mut self) -> Result<(), TransferError> {
        self.tx.take();
        Ok(())
    }
}

/// Splits an `AsyncRead` (usually a file) into chunks of at most
/// `chunk_size` bytes.
pub struct IoReader<R> {
    inner: R,
    chunk_size: usize,
}

impl<R> IoReader<R> {
    pub fn new(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> SequentialReader for IoReader<R> {
    async fn read_chunk(&mut self) -> Result<Option<Bytes>, TransferError> {
        let mut buf = BytesMut::with_capacity(self.chunk_size);
        let n = (&mut self.inner)
            .take(self.chunk_size as u64)
            .read_buf(&mut buf)
            .await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.freeze()))
    }
}

/// Appends chunks to an `AsyncWrite` in arrival order.
pub struct IoWriter<W> {
    inner: W,
}

impl<W> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> SequentialWriter for IoWriter<W> {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), TransferError> {
        self.inner.write_all(&chunk).await?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), TransferError> {
        self.inner.flush().await?;
        Ok(())
    }
}
