use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use common::proto::{DirEntry, MkdirRequest, ReadDirRequest, RemoveAllRequest, RemoveRequest};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PathBody {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryBody {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingBody {
    pub files: Vec<EntryBody>,
    pub dirs: Vec<EntryBody>,
}

impl From<DirEntry> for EntryBody {
    fn from(entry: DirEntry) -> Self {
        Self {
            name: entry.name,
            path: entry.path,
        }
    }
}

fn path_of(body: Result<Json<PathBody>, JsonRejection>) -> Result<String, GatewayError> {
    body.map(|Json(body)| body.path)
        .map_err(|_| GatewayError::BadRequest("can't parse json"))
}

/// POST /mkdir/
pub async fn mkdir(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PathBody>, JsonRejection>,
) -> Result<StatusCode, GatewayError> {
    let path = path_of(body)?;
    state.client().mkdir(MkdirRequest { path }).await?;
    Ok(StatusCode::OK)
}

/// POST /readdir/
pub async fn read_dir(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PathBody>, JsonRejection>,
) -> Result<Json<ListingBody>, GatewayError> {
    let path = path_of(body)?;
    let listing = state
        .client()
        .read_dir(ReadDirRequest { path })
        .await?
        .into_inner();
    Ok(Json(ListingBody {
        files: listing.files.into_iter().map(EntryBody::from).collect(),
        dirs: listing.dirs.into_iter().map(EntryBody::from).collect(),
    }))
}

/// POST /remove/
pub async fn remove(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PathBody>, JsonRejection>,
) -> Result<StatusCode, GatewayError> {
    let path = path_of(body)?;
    state.client().remove(RemoveRequest { path }).await?;
    Ok(StatusCode::OK)
}

/// POST /removeall/
pub async fn remove_all(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PathBody>, JsonRejection>,
) -> Result<StatusCode, GatewayError> {
    let path = path_of(body)?;
    state.client().remove_all(RemoveAllRequest { path }).await?;
    Ok(StatusCode::OK)
}
