//! Request extractors: schema-validated JSON bodies and per-request store sessions.

use std::ops::{Deref, DerefMut};

use axum::body::Bytes;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde_json::{json, Value};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool};

use super::error::ApiError;
use super::schemas::{FieldError, LocItem, Schema};

/// JSON body validated against a [`Schema`] before the handler runs.
///
/// Every failure is reported as a `422` with a `detail` array naming the
/// offending location.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Schema,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        let value = parse_body(&bytes).map_err(|e| ApiError::Validation(vec![e]))?;
        T::from_value(value).map(Self).map_err(ApiError::Validation)
    }
}

fn parse_body(bytes: &[u8]) -> Result<Value, FieldError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(FieldError::missing([LocItem::from("body")], None));
    }
    serde_json::from_slice(bytes).map_err(|e| {
        let offset = byte_offset(bytes, e.line(), e.column());
        FieldError::new(
            "json_invalid",
            [LocItem::from("body"), LocItem::from(offset)],
            "JSON decode error",
            Some(json!({ "error": e.to_string() })),
        )
    })
}

/// Converts serde_json's 1-based line/column into a 0-based byte offset.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = bytes
        .split(|&b| b == b'\n')
        .take(line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column.saturating_sub(1)).min(bytes.len())
}

/// A store connection owned by one request.
///
/// Acquired from the pool when the request needs it and returned to the
/// pool when dropped, on every exit path.
#[derive(Debug)]
pub struct DbSession(pub PoolConnection<Sqlite>);

impl DbSession {
    pub async fn acquire(pool: &SqlitePool) -> Result<Self, ApiError> {
        Ok(Self(pool.acquire().await?))
    }
}

impl Deref for DbSession {
    type Target = PoolConnection<Sqlite>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<S> FromRequestParts<S> for DbSession
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = SqlitePool::from_ref(state);
        Self::acquire(&pool).await
    }
}
