// testing.rs
//! In-memory requester for unit tests

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::client_http::Swimlane;
use crate::error::SwimlaneError;
use crate::requester::Requester;

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub query: Option<HashMap<String, String>>,
}

/// Replays queued `(status, body)` responses in order and records every call
#[derive(Clone, Default)]
pub(crate) struct ScriptedRequester {
    responses: Arc<Mutex<VecDeque<(u16, Value)>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedRequester {
    pub fn new(responses: Vec<(u16, Value)>) -> Self {
        Self { responses: Arc::new(Mutex::new(responses.into())), calls: Arc::default() }
    }

    /// Client over 200 responses with the given bodies
    pub fn client(bodies: Vec<Value>) -> (Arc<Swimlane>, Self) {
        Self::client_with_statuses(bodies.into_iter().map(|b| (200, b)).collect())
    }

    pub fn client_with_statuses(responses: Vec<(u16, Value)>) -> (Arc<Swimlane>, Self) {
        let requester = Self::new(responses);
        let swimlane = Swimlane::with_requester(Box::new(requester.clone()), "https://swimlane.test", "admin")
            .expect("static host is valid");
        (swimlane, requester)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Requester for ScriptedRequester {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&[u8]>,
        query: Option<HashMap<String, String>>,
        fail_on_error: bool,
    ) -> Result<http::Response<Bytes>, SwimlaneError> {
        self.calls.lock().unwrap().push(Call {
            method,
            endpoint: endpoint.to_string(),
            body: body.map(|b| serde_json::from_slice(b).unwrap()),
            query,
        });

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SwimlaneError::Other(format!("no scripted response for {}", endpoint)))?;
        let bytes = Bytes::from(serde_json::to_vec(&body).unwrap());
        let status = StatusCode::from_u16(status).unwrap();

        if fail_on_error && status == StatusCode::BAD_REQUEST {
            return Err(SwimlaneError::bad_request(&bytes));
        }
        if fail_on_error && !status.is_success() {
            return Err(SwimlaneError::RequestFailed { status, message: body.to_string() });
        }

        Ok(http::Response::builder().status(status).body(bytes).unwrap())
    }

    fn set_auth_headers(&self, _headers: HashMap<String, String>) {}
}
