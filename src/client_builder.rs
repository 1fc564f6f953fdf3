// client_builder.rs
//! Builder pattern for constructing Swimlane clients with better ergonomics and validation

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth;
use crate::client_http::{normalize_host, RequesterHttp, Swimlane};
use crate::constants::*;
use crate::error::SwimlaneError;

type Result<T> = std::result::Result<T, SwimlaneError>;

/// Builder for creating authenticated Swimlane clients
///
/// # Examples
///
/// ```no_run
/// # async fn run() -> Result<(), swimlane::SwimlaneError> {
/// use swimlane::ClientBuilder;
///
/// let swimlane = ClientBuilder::new()
///     .host("swimlane.example.com")
///     .credentials("admin", "secret")
///     .ssl_ca_cert("/path/to/ca.pem")
///     .timeout_secs(30)
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
    verify_ssl: Option<bool>,
    ssl_ca_cert: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Swimlane host; `https` is assumed when no scheme is given
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the login credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Verify the server TLS certificate
    ///
    /// Default: `true`
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = Some(verify);
        self
    }

    /// Trust an additional CA certificate (PEM) for server verification
    pub fn ssl_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_ca_cert = Some(path.into());
        self
    }

    /// Set request timeout in seconds
    ///
    /// Default: 60 seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Set request timeout
    ///
    /// Default: 60 seconds
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Validate the configuration before connecting
    fn validate(&self) -> Result<()> {
        let host = self.host.as_deref().ok_or_else(|| SwimlaneError::ConfigurationError("Host is required".to_string()))?;
        normalize_host(host)
            .map_err(|e| SwimlaneError::ConfigurationError(format!("Invalid host '{}': {}", host, e)))?;

        match (&self.username, &self.password) {
            (Some(user), Some(_)) if !user.trim().is_empty() => {}
            _ => return Err(SwimlaneError::ConfigurationError("Username and password are required".to_string())),
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(SwimlaneError::ConfigurationError("Timeout must be greater than zero".to_string()));
        }

        if let Some(ca) = &self.ssl_ca_cert {
            if !ca.is_file() {
                return Err(SwimlaneError::ConfigurationError(format!(
                    "CA certificate not found: {}",
                    ca.display()
                )));
            }
        }

        Ok(())
    }

    /// Build the HTTP session and log in
    pub async fn connect(self) -> Result<Arc<Swimlane>> {
        self.validate()?;

        let (host, username, password) = match (self.host, self.username, self.password) {
            (Some(h), Some(u), Some(p)) => (h, u, p),
            _ => return Err(SwimlaneError::ConfigurationError("Incomplete client configuration".to_string())),
        };

        let url = normalize_host(&host)?;
        let requester = RequesterHttp::new(
            &url,
            self.verify_ssl.unwrap_or(true),
            self.ssl_ca_cert.map(|p| p.to_string_lossy().to_string()),
            self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        )?;

        auth::authenticate(&requester, &url, &username, &password).await?;

        Swimlane::with_requester(Box::new(requester), url.as_str(), &username)
    }
}
