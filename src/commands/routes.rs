use std::sync::Arc;

use http::StatusCode;
use serde_json::json;
use tracing::error;

use super::model::{Command, CommandRequest, Data};
use super::store::CommandStore;
use crate::error::Error;
use crate::response::{IntoResponse, Json, Response};
use crate::{Request, Router};

/// Mounts the commands endpoints on `router`:
///
/// | Method | Path | Result |
/// |---|---|---|
/// | `GET` | `/commands/` | every command |
/// | `POST` | `/commands/` | the created command |
/// | `DELETE` | `/commands/{id}` | the commands that remain |
pub fn mount(router: Router, store: Arc<CommandStore>) -> Router {
    let list_store = Arc::clone(&store);
    let create_store = Arc::clone(&store);
    let delete_store = store;

    router
        .get("/commands/", move |req: Request| list(Arc::clone(&list_store), req))
        .post("/commands/", move |req: Request| create(Arc::clone(&create_store), req))
        .delete("/commands/{id}", move |req: Request| delete(Arc::clone(&delete_store), req))
}

async fn list(store: Arc<CommandStore>, _req: Request) -> Result<Json<Data<Vec<Command>>>, ApiError> {
    let data = blocking(move || store.list()).await?;
    Ok(Json(Data { data }))
}

async fn create(store: Arc<CommandStore>, req: Request) -> Result<Json<Data<Command>>, ApiError> {
    let payload: CommandRequest = serde_json::from_slice(req.body())
        .map_err(|e| ApiError::Invalid(e.to_string()))?;
    let data = blocking(move || store.create(payload)).await?;
    Ok(Json(Data { data }))
}

async fn delete(store: Arc<CommandStore>, req: Request) -> Result<Json<Data<Vec<Command>>>, ApiError> {
    let raw = req.param("id").unwrap_or_default();
    let id: i64 = raw
        .parse()
        .map_err(|_| ApiError::Invalid(format!("id `{raw}` is not an integer")))?;

    let data = blocking(move || {
        if store.delete(id)? {
            store.list().map(Some)
        } else {
            Ok(None)
        }
    })
    .await?
    .ok_or(ApiError::NotFound(id))?;

    Ok(Json(Data { data }))
}

/// Runs a store call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Failures a commands endpoint answers with, rendered as `{"detail": …}`.
#[derive(Debug)]
enum ApiError {
    NotFound(i64),
    Invalid(String),
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::NotFound(id) => (StatusCode::NOT_FOUND, format!("Command with id {id} not found.")),
            Self::Invalid(reason) => (StatusCode::UNPROCESSABLE_ENTITY, reason),
            Self::Internal(e) => {
                error!(error = %e, "command store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_owned())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
