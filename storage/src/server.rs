use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use common::proto::storage_service_server::{StorageService, StorageServiceServer};
use common::proto::{
    DirEntry, DownloadRequest, DownloadResponse, MkdirRequest, MkdirResponse, ReadDirRequest,
    ReadDirResponse, RemoveAllRequest, RemoveAllResponse, RemoveRequest, RemoveResponse,
    UploadRequest, UploadResponse,
};
use common::stream::{IoReader, IoWriter, StreamReader, StreamWriter};
use common::{CallContext, FsError, TransferError, copy};
use tokio::io::BufWriter;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::{ReceiverStream, TcpListenerStream};
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::engine::{Engine, Entry};

/// gRPC front of the storage engine.
pub struct StorageServer {
    engine: Arc<Engine>,
}

impl StorageServer {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    pub fn into_service(self) -> StorageServiceServer<Self> {
        StorageServiceServer::new(self)
    }
}

fn rejected(method: &str, path: &str, err: FsError) -> Status {
    warn!(method, path, error = %err, "failed");
    Status::from(err)
}

/// Logs the outcome of a unary call and converts engine failures into
/// statuses.
fn report<T>(method: &str, path: &str, result: Result<T, FsError>) -> Result<T, Status> {
    if result.is_ok() {
        info!(method, path, "success");
    }
    result.map_err(|e| rejected(method, path, e))
}

fn to_entries(entries: Vec<Entry>) -> Vec<DirEntry> {
    entries
        .into_iter()
        .map(|e| DirEntry {
            name: e.name,
            path: e.path,
        })
        .collect()
}

#[tonic::async_trait]
impl StorageService for StorageServer {
    async fn mkdir(
        &self,
        request: Request<MkdirRequest>,
    ) -> Result<Response<MkdirResponse>, Status> {
        let path = request.into_inner().path;
        report("Mkdir", &path, self.engine.mkdir(&path).await)?;
        Ok(Response::new(MkdirResponse {}))
    }

    async fn read_dir(
        &self,
        request: Request<ReadDirRequest>,
    ) -> Result<Response<ReadDirResponse>, Status> {
        let path = request.into_inner().path;
        let listing = report("ReadDir", &path, self.engine.read_dir(&path).await)?;
        Ok(Response::new(ReadDirResponse {
            files: to_entries(listing.files),
            dirs: to_entries(listing.dirs),
        }))
    }

    async fn remove(
        &self,
        request: Request<RemoveRequest>,
    ) -> Result<Response<RemoveResponse>, Status> {
        let path = request.into_inner().path;
        report("Remove", &path, self.engine.remove(&path).await)?;
        Ok(Response::new(RemoveResponse {}))
    }

    async fn remove_all(
        &self,
        request: Request<RemoveAllRequest>,
    ) -> Result<Response<RemoveAllResponse>, Status> {
        let path = request.into_inner().path;
        report("RemoveAll", &path, self.engine.remove_all(&path).await)?;
        Ok(Response::new(RemoveAllResponse {}))
    }

    async fn upload(
        &self,
        request: Request<Streaming<UploadRequest>>,
    ) -> Result<Response<UploadResponse>, Status> {
        let ctx = CallContext::from_metadata(request.metadata())
            .map_err(|e| rejected("Upload", "", e))?;
        let path = ctx.path();
        let file = self
            .engine
            .create_upload(path)
            .await
            .map_err(|e| rejected("Upload", path, e))?;

        let mut reader = StreamReader::new(request.into_inner());
        let mut writer = IoWriter::new(BufWriter::new(file));
        match copy(&mut reader, &mut writer).await {
            Ok(copied) => {
                info!(method = "Upload", path, bytes = copied, "success");
                Ok(Response::new(UploadResponse {}))
            }
            // the partial file stays where it is
            Err(TransferError::Rpc(status)) => {
                warn!(method = "Upload", path, %status, "stream interrupted");
                Err(status)
            }
            Err(e) => {
                warn!(method = "Upload", path, error = %e, "failed");
                Err(Status::internal("internal storage error"))
            }
        }
    }

    type DownloadStream = ReceiverStream<Result<DownloadResponse, Status>>;

    async fn download(
        &self,
        request: Request<DownloadRequest>,
    ) -> Result<Response<Self::DownloadStream>, Status> {
        let ctx = CallContext::from_metadata(request.metadata())
            .map_err(|e| rejected("Download", "", e))?;
        let path = ctx.path().to_string();
        let (header, file) = self
            .engine
            .open_download(&path)
            .await
            .map_err(|e| rejected("Download", &path, e))?;

        // one chunk in flight; the transport's flow control does the rest
        let (tx, rx) = mpsc::channel(1);
        let chunk_size = self.engine.chunk_size();
        tokio::spawn(async move {
            let mut reader = IoReader::new(file, chunk_size);
            let mut writer = StreamWriter::fallible(tx.clone());
            match copy(&mut reader, &mut writer).await {
                Ok(copied) => info!(method = "Download", path = %path, bytes = copied, "success"),
                Err(TransferError::Closed) => {
                    debug!(method = "Download", path = %path, "receiver went away")
                }
                Err(e) => {
                    warn!(method = "Download", path = %path, error = %e, "failed");
                    let _ = tx.send(Err(Status::internal("internal storage error"))).await;
                }
            }
        });

        let mut response = Response::new(ReceiverStream::new(rx));
        header.attach(response.metadata_mut());
        Ok(response)
    }
}

/// Serves the engine on `addr` until `signal` resolves.
pub async fn serve<F>(addr: SocketAddr, engine: Arc<Engine>, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    info!("storage listening on {addr}");
    Server::builder()
        .layer(TraceLayer::new_for_grpc())
        .add_service(StorageServer::new(engine).into_service())
        .serve_with_shutdown(addr, signal)
        .await?;
    Ok(())
}

/// Serves the engine on an already bound listener, e.g. an ephemeral port.
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    engine: Arc<Engine>,
    signal: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    Server::builder()
        .layer(TraceLayer::new_for_grpc())
        .add_service(StorageServer::new(engine).into_service())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
        .await?;
    Ok(())
}
