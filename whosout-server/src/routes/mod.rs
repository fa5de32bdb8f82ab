pub mod today;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use whosout_core::WhosOutError;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().merge(today::router())
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// A request that could not be answered; always rendered as a 500.
pub struct AppError(anyhow::Error);

impl From<WhosOutError> for AppError {
    fn from(err: WhosOutError) -> Self {
        AppError(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = self.0.to_string();
        tracing::error!(%error, "absence report failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error })).into_response()
    }
}
