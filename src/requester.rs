// requester.rs

use crate::error::SwimlaneError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, SwimlaneError>;

/// Transport used by [`crate::Swimlane`] to reach the REST API.
///
/// `endpoint` is relative to the API root (`/api/`). Implementations attach the
/// session auth headers to every request and, when `fail_on_error` is set, turn
/// 4xx/5xx responses into errors (400 as [`SwimlaneError::BadRequest`]).
#[async_trait]
pub trait Requester: Send + Sync {
    /// Execute an HTTP request
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&[u8]>,
        query: Option<HashMap<String, String>>,
        fail_on_error: bool,
    ) -> Result<http::Response<Bytes>>;

    /// Replace the auth headers sent with every request (called after login)
    fn set_auth_headers(&self, headers: HashMap<String, String>);
}
