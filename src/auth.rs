// auth.rs
//! Session login and auth header negotiation

use bytes::Bytes;
use log::debug;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use url::Url;

use crate::constants::*;
use crate::error::SwimlaneError;
use crate::requester::Requester;

type Result<T> = std::result::Result<T, SwimlaneError>;

/// The part of the login body that selects the auth mode
#[derive(Debug, Default, Deserialize)]
struct LoginBody {
    token: Option<String>,
}

/// How the session proves itself on each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// JWT from the login body (server 2.14 and newer)
    Bearer(String),
    /// Session cookies from the login response (2.13 and older)
    Cookie(String),
}

impl AuthMode {
    /// Pick the auth mode from a login response: the bearer token when the body
    /// carries one, otherwise the live cookies the response set for `host`.
    pub fn from_login_response(response: &http::Response<Bytes>, host: &Url) -> Self {
        // Legacy servers may answer with an empty or non-JSON body
        let body: LoginBody = serde_json::from_slice(response.body()).unwrap_or_default();

        if let Some(token) = body.token {
            debug!("Login returned a token, using bearer auth");
            return Self::Bearer(token);
        }

        debug!("Login returned no token, using legacy cookie auth");
        let jar = Jar::default();
        jar.set_cookies(&mut response.headers().get_all(http::header::SET_COOKIE).iter(), host);

        let cookie = jar.cookies(host).and_then(|v| v.to_str().ok().map(str::to_string)).unwrap_or_default();
        Self::Cookie(cookie)
    }

    /// Headers to attach to every request of the session
    pub fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        match self {
            Self::Bearer(token) => {
                headers.insert(HTTP_HEADER_AUTHORIZATION.to_string(), format!("{}{}", HTTP_HEADER_AUTH_BEARER, token));
            }
            Self::Cookie(cookie) => {
                headers.insert(HTTP_HEADER_COOKIE.to_string(), cookie.clone());
            }
        }
        headers
    }
}

/// Log in and install the resulting auth headers on the requester
pub async fn authenticate(requester: &dyn Requester, host: &Url, username: &str, password: &str) -> Result<AuthMode> {
    let body = json!({
        HTTP_BODY_KEY_USERNAME: username,
        HTTP_BODY_KEY_PASSWORD: password,
        HTTP_BODY_KEY_DOMAIN: ""
    });
    let body_bytes = serde_json::to_vec(&body)?;

    let response = requester
        .request(Method::POST, "user/login", Some(body_bytes.as_slice()), None, true)
        .await
        .map_err(|e| match e.status() {
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN) => {
                SwimlaneError::AuthenticationFailed(format!("login rejected for user '{}': {}", username, e))
            }
            _ => e,
        })?;

    let mode = AuthMode::from_login_response(&response, host);
    requester.set_auth_headers(mode.headers());
    Ok(mode)
}
