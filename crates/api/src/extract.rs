//! Extractor wrappers whose rejections become [`AppError`] JSON bodies.
//!
//! Axum's stock `Json`, `Path` and `Query` reject malformed input with
//! plain-text responses (and 422 for JSON bodies). These wrappers route the
//! rejection through `AppError` so clients always get `{message, code}`
//! with a 400 status.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
