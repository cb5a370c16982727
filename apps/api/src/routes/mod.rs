//! # HTTP Routes
//!
//! One module per resource, each exposing `router()`; [`build_router`]
//! merges them and [`crate::build_app`] adds the tower layers.
//!
//! ```text
//! /health                        health::router
//! /config, /config/pricing       config::router
//! /orders/...                    orders::router
//! /tables/...                    tables::router
//! /support/sessions/...          support::router
//! /reports/daily                 reports::router
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::{Json, Router};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::state::AppState;

pub mod config;
pub mod health;
pub mod orders;
pub mod reports;
pub mod support;
pub mod tables;

/// Builds a router with every route registered (no layers).
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(config::router())
        .merge(orders::router())
        .merge(tables::router())
        .merge(support::router())
        .merge(reports::router())
}

// =============================================================================
// Extractors
// =============================================================================

/// `Json` whose rejection is an [`ApiError`] body instead of plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::validation(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// `Query` whose rejection is an [`ApiError`] body instead of plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ApiError::validation(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}
