use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderValue, Response, StatusCode, header};
use bytes::Bytes;
use common::proto::{DownloadRequest, UploadRequest};
use common::stream::{BoundedReader, DEFAULT_CHUNK_SIZE, StreamReader, StreamWriter};
use common::{CallContext, TransferError, TransferHeader, copy};
use futures::TryStreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Status;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

fn required_path(params: &HashMap<String, String>) -> Result<String, GatewayError> {
    params
        .get("path")
        .filter(|p| !p.is_empty())
        .cloned()
        .ok_or(GatewayError::BadRequest("path missing"))
}

fn content_disposition(name: Option<&str>) -> HeaderValue {
    name.and_then(|n| HeaderValue::from_str(&format!("attachment; filename={n}")).ok())
        .unwrap_or_else(|| HeaderValue::from_static("attachment; filename=unknown"))
}

/// POST /upload/?path=<path>
///
/// Relays the `file` field of a multipart body into the client-streaming
/// Upload call one chunk at a time.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, GatewayError> {
    let path = required_path(&params)?;
    let mut multipart = multipart.map_err(|_| GatewayError::BadRequest("can't parse form"))?;

    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => break field,
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => return Err(GatewayError::BadRequest("can't parse form")),
        }
    };

    let (tx, rx) = mpsc::channel::<UploadRequest>(1);
    let mut client = state.client();
    let rpc = client.upload(CallContext::new(path.as_str()).into_request(ReceiverStream::new(rx)));
    tokio::pin!(rpc);

    // multipart frames can be of any size; the engine only accepts bounded
    // messages
    let mut reader = BoundedReader::new(
        StreamReader::new(Box::pin(field.map_err(io::Error::other))),
        DEFAULT_CHUNK_SIZE,
    );
    let mut writer = StreamWriter::new(tx);
    let relay = copy(&mut reader, &mut writer);
    tokio::pin!(relay);

    tokio::select! {
        // the engine answered before the body was fully relayed
        result = &mut rpc => {
            result?;
            Ok(StatusCode::OK)
        }
        result = &mut relay => match result {
            // dropping the call cancels it on the engine
            Err(TransferError::Io(e)) => {
                warn!(path = %path, error = %e, "reading upload body failed");
                Err(GatewayError::BadRequest("can't parse form"))
            }
            relayed => {
                let answer = rpc.await.map(|_| ());
                settle_upload(&path, relayed, answer)
            }
        },
    }
}

/// Outcome of an upload whose body relay ended first. The engine's answer
/// decides; a relay cut short by the engine closing the stream is only
/// logged.
fn settle_upload(
    path: &str,
    relayed: Result<u64, TransferError>,
    answer: Result<(), Status>,
) -> Result<StatusCode, GatewayError> {
    answer?;
    match relayed {
        Ok(copied) => debug!(path, bytes = copied, "upload body relayed"),
        Err(e) => warn!(path, error = %e, "engine accepted an upload it stopped reading"),
    }
    Ok(StatusCode::OK)
}

/// GET /download/?path=<path>
///
/// The engine's header decides the download headers; the chunks are relayed
/// into the response body as they arrive.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response<Body>, GatewayError> {
    let path = required_path(&params)?;
    let response = state
        .client()
        .download(CallContext::new(path.as_str()).into_request(DownloadRequest {}))
        .await?;

    let name = TransferHeader::name_from(response.metadata());
    let size = TransferHeader::size_from(response.metadata());
    let stream = response.into_inner();

    let (tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(1);
    tokio::spawn(async move {
        let mut reader = StreamReader::new(stream);
        let mut writer = StreamWriter::with(tx.clone(), Ok);
        match copy(&mut reader, &mut writer).await {
            Ok(copied) => debug!(path = %path, bytes = copied, "download relayed"),
            Err(TransferError::Closed) => debug!(path = %path, "http client went away"),
            Err(e) => {
                warn!(path = %path, error = %e, "download interrupted");
                // aborts the response body
                let _ = tx.send(Err(io::Error::other(e))).await;
            }
        }
    });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_DISPOSITION, content_disposition(name.as_deref()));
    if let Some(size) = size {
        builder = builder
            .header(header::CONTENT_LENGTH, size)
            .header("Accept-Length", size);
    }
    builder
        .body(Body::from_stream(ReceiverStream::new(rx)))
        .map_err(|e| GatewayError::Internal(e.to_string()))
}
