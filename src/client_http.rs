// client_http.rs

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

use crate::app::AppAdapter;
use crate::constants::*;
use crate::error::SwimlaneError;
use crate::helper::HelperAdapter;
use crate::requester::Requester;
use crate::response_ext::ResponseExt;
use crate::usergroup::{GroupAdapter, User, UserAdapter};
use crate::version::{compare_version_sections, VersionRange};

type Result<T> = std::result::Result<T, SwimlaneError>;

/// Normalize a user supplied host: default scheme `https`, no path, query or fragment
pub fn normalize_host(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(SwimlaneError::ConfigurationError("Host must not be empty".to_string()));
    }

    let with_scheme = if host.contains("://") { host.to_string() } else { format!("{}://{}", DEFAULT_SCHEME, host) };

    let mut url = Url::parse(&with_scheme)?;
    if url.host_str().is_none() {
        return Err(SwimlaneError::InvalidUrl(format!("'{}' has no host", host)));
    }
    url.set_path("");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// HTTP-based requester implementation
pub struct RequesterHttp {
    api_url: String,
    client: ReqwestClient,
    auth_headers: Mutex<HashMap<String, String>>,
}

impl RequesterHttp {
    pub fn new(host: &Url, verify_ssl: bool, ssl_ca_cert: Option<String>, timeout: Duration) -> Result<Self> {
        let api_url = format!("{}{}", host.as_str().trim_end_matches('/'), API_ROOT);

        let mut client_builder =
            ReqwestClient::builder().timeout(timeout).danger_accept_invalid_certs(!verify_ssl);

        // SSL setup
        if let Some(ca_path) = &ssl_ca_cert {
            let cert_bytes = std::fs::read(ca_path)?;
            client_builder = client_builder.add_root_certificate(reqwest::Certificate::from_pem(&cert_bytes)?);
        }

        Ok(Self { api_url, client: client_builder.build()?, auth_headers: Mutex::new(HashMap::new()) })
    }

    async fn to_http_response(resp: reqwest::Response) -> Result<http::Response<Bytes>> {
        let (status, headers, body) = (resp.status(), resp.headers().clone(), resp.bytes().await?);

        let mut builder = http::Response::builder().status(status);
        if let Some(h) = builder.headers_mut() {
            *h = headers;
        }

        builder.body(body).map_err(|e| SwimlaneError::Other(format!("Invalid HTTP response: {}", e)))
    }

    fn add_common_headers(&self, headers: &mut HashMap<String, String>) {
        headers.entry(HTTP_HEADER_KEY_USER_AGENT.to_string()).or_insert_with(|| HTTP_USER_AGENT.to_string());
        headers.entry(HTTP_HEADER_CONTENT_TYPE.to_string()).or_insert_with(|| HTTP_CONTENT_TYPE_JSON.to_string());

        let auth = self.auth_headers.lock().unwrap_or_else(|e| e.into_inner());
        for (k, v) in auth.iter() {
            headers.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl Requester for RequesterHttp {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&[u8]>,
        query: Option<HashMap<String, String>>,
        fail_on_error: bool,
    ) -> Result<http::Response<Bytes>> {
        let url = format!("{}{}", self.api_url, endpoint.trim_start_matches('/'));
        debug!("{} {} {}", method, endpoint, url);

        let mut req = self.client.request(method, &url);

        let mut headers = HashMap::new();
        self.add_common_headers(&mut headers);
        for (k, v) in headers {
            req = req.header(k, v);
        }

        if let Some(body) = body {
            req = req.body(body.to_vec());
        }

        if let Some(query) = query {
            req = req.query(&query);
        }

        let resp = req.send().await?;

        if fail_on_error && !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await?;
            error!("HTTP {} error: {}", status, String::from_utf8_lossy(&body));
            if status == StatusCode::BAD_REQUEST {
                return Err(SwimlaneError::bad_request(&body));
            }
            return Err(SwimlaneError::RequestFailed {
                status,
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Self::to_http_response(resp).await
    }

    fn set_auth_headers(&self, headers: HashMap<String, String>) {
        *self.auth_headers.lock().unwrap_or_else(|e| e.into_inner()) = headers;
    }
}

/// Swimlane API client
///
/// Holds the authenticated session and caches server settings and the current
/// user. Shared as `Arc<Swimlane>` so models can call back into it to persist
/// changes.
pub struct Swimlane {
    pub(crate) requester: Box<dyn Requester>,
    host: Url,
    username: String,
    settings: OnceCell<Value>,
    user: OnceCell<User>,
}

impl fmt::Debug for Swimlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Swimlane")
            .field("host", &self.host.as_str())
            .field("username", &self.username)
            .field("requester", &"<dyn Requester>")
            .finish()
    }
}

impl fmt::Display for Swimlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Swimlane: {} @ {}>", self.username, self.host.as_str().trim_end_matches('/'))
    }
}

impl Swimlane {
    //
    // Session/Client initialization
    //

    /// Connect and log in with default settings
    ///
    /// See [`crate::ClientBuilder`] for timeouts and CA certificates.
    pub async fn connect(host: &str, username: &str, password: &str, verify_ssl: bool) -> Result<Arc<Self>> {
        crate::ClientBuilder::new().host(host).credentials(username, password).verify_ssl(verify_ssl).connect().await
    }

    /// Create a client over a custom requester that already carries its auth
    pub fn with_requester(requester: Box<dyn Requester>, host: &str, username: &str) -> Result<Arc<Self>> {
        Ok(Arc::new(Self {
            requester,
            host: normalize_host(host)?,
            username: username.to_string(),
            settings: OnceCell::new(),
            user: OnceCell::new(),
        }))
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Send a request to `/api/{endpoint}`
    ///
    /// Leading slashes on `endpoint` are ignored. A 400 response fails with
    /// [`SwimlaneError::BadRequest`], any other 4xx/5xx with
    /// [`SwimlaneError::RequestFailed`].
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        query: Option<HashMap<String, String>>,
    ) -> Result<http::Response<Bytes>> {
        let endpoint = endpoint.trim_start_matches('/');
        let body_bytes = body.map(serde_json::to_vec).transpose()?;
        self.requester.request(method, endpoint, body_bytes.as_deref(), query, true).await
    }

    /// `request` and decode the body as JSON
    pub(crate) async fn request_json(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        query: Option<HashMap<String, String>>,
    ) -> Result<Value> {
        self.request(method, endpoint, body, query).await?.json()
    }

    //
    // Server information
    //

    /// Server settings, fetched on first use
    pub async fn settings(&self) -> Result<&Value> {
        self.settings.get_or_try_init(|| async { self.request_json(Method::GET, "settings", None, None).await }).await
    }

    /// Server API version, e.g. `2.15.0+20180301`
    pub async fn version(&self) -> Result<String> {
        self.settings().await?[JSON_KEY_API_VERSION]
            .as_str()
            .map(String::from)
            .ok_or_else(|| SwimlaneError::SerializationError("settings has no apiVersion".to_string()))
    }

    /// Version without the build number
    pub async fn build_version(&self) -> Result<String> {
        let version = self.version().await?;
        Ok(version.split('+').next().unwrap_or_default().to_string())
    }

    /// Build number after `+`, if the server reports one
    pub async fn build_number(&self) -> Result<Option<String>> {
        let version = self.version().await?;
        Ok(version.split_once('+').map(|(_, build)| build.to_string()))
    }

    /// Direction of the server version relative to `sections`
    ///
    /// Only as many leading sections as given are compared: with server version
    /// `2.13.2-173414`, `&[2, 13]` is `Equal` and `&[2, 14]` is `Less`.
    pub async fn compare_version(&self, sections: &[u64]) -> Result<Ordering> {
        Ok(compare_version_sections(&self.version().await?, sections))
    }

    /// Fail with [`SwimlaneError::InvalidVersion`] unless the server build is in `range`
    pub async fn require_build_version(&self, range: &VersionRange) -> Result<()> {
        range.check(&self.build_version().await?)
    }

    /// The authenticated user, fetched on first use
    pub async fn user(self: &Arc<Self>) -> Result<&User> {
        self.user.get_or_try_init(|| async { self.users().get_by_username(&self.username).await }).await
    }

    //
    // Adapters
    //

    pub fn apps(self: &Arc<Self>) -> AppAdapter {
        AppAdapter::new(Arc::clone(self))
    }

    pub fn users(self: &Arc<Self>) -> UserAdapter {
        UserAdapter::new(Arc::clone(self))
    }

    pub fn groups(self: &Arc<Self>) -> GroupAdapter {
        GroupAdapter::new(Arc::clone(self))
    }

    pub fn helpers(self: &Arc<Self>) -> HelperAdapter {
        HelperAdapter::new(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host_defaults_to_https() {
        let url = normalize_host("swimlane.example.com").unwrap();
        assert_eq!(url.as_str(), "https://swimlane.example.com/");
    }

    #[test]
    fn test_normalize_host_drops_path_and_query() {
        let url = normalize_host("http://10.0.0.5:8080/some/path?x=1#frag").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.5:8080/");
    }

    #[test]
    fn test_normalize_host_rejects_empty() {
        assert!(matches!(normalize_host("  "), Err(SwimlaneError::ConfigurationError(_))));
    }

    #[test]
    fn test_requester_api_url() {
        let host = normalize_host("https://swimlane.example.com/app").unwrap();
        let requester = RequesterHttp::new(&host, true, None, Duration::from_secs(5)).unwrap();
        assert_eq!(requester.api_url, "https://swimlane.example.com/api/");
    }

    #[test]
    fn test_auth_headers_survive_poisoned_lock() {
        let host = normalize_host("swimlane.example.com").unwrap();
        let requester = RequesterHttp::new(&host, true, None, Duration::from_secs(5)).unwrap();
        requester.set_auth_headers(HashMap::from([("Authorization".to_string(), "Bearer t1".to_string())]));

        std::thread::scope(|s| {
            let poisoned = s
                .spawn(|| {
                    let _guard = requester.auth_headers.lock().unwrap();
                    panic!("panic while holding the auth header lock");
                })
                .join();
            assert!(poisoned.is_err());
        });
        assert!(requester.auth_headers.is_poisoned());

        let mut headers = HashMap::new();
        requester.add_common_headers(&mut headers);
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer t1"));

        requester.set_auth_headers(HashMap::from([("Cookie".to_string(), "SessionId=s1".to_string())]));
        let mut headers = HashMap::new();
        requester.add_common_headers(&mut headers);
        assert_eq!(headers.get("Cookie").map(String::as_str), Some("SessionId=s1"));
        assert!(!headers.contains_key("Authorization"));
    }
}
