//! Error responses for the form shell

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Handler error mapped onto an HTTP response
#[derive(Debug)]
pub struct WebError {
    status: StatusCode,
    message: String,
}

impl WebError {
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        error!("Request failed: {:#}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "The search could not be run. Check the server log for details.".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}

impl From<handlebars::RenderError> for WebError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::internal(err)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Error shown as a plain HTML page
pub struct HtmlError(pub WebError);

impl From<WebError> for HtmlError {
    fn from(err: WebError) -> Self {
        Self(err)
    }
}

impl From<handlebars::RenderError> for HtmlError {
    fn from(err: handlebars::RenderError) -> Self {
        Self(WebError::from(err))
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let body = format!(
            "<!DOCTYPE html><html><body><p>{}</p><p><a href=\"/\">Back to search</a></p></body></html>",
            handlebars::html_escape(self.0.message())
        );
        (self.0.status(), Html(body)).into_response()
    }
}
