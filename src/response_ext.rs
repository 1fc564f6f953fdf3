// response_ext.rs

use crate::error::SwimlaneError;
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Extension trait for working with `http::Response<Bytes>`.
pub trait ResponseExt {
    /// Reads the response body as UTF-8 text, replacing invalid sequences.
    fn text(self) -> String;

    /// Deserializes the response body as JSON.
    fn json<T: DeserializeOwned>(self) -> Result<T, SwimlaneError>;
}

impl ResponseExt for http::Response<Bytes> {
    fn text(self) -> String {
        let body = self.into_body();
        String::from_utf8(body.to_vec()).unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned())
    }

    fn json<T: DeserializeOwned>(self) -> Result<T, SwimlaneError> {
        let body = self.into_body();

        if body.is_empty() {
            return Err(SwimlaneError::SerializationError("Empty response body".to_string()));
        }

        serde_json::from_slice::<T>(&body).map_err(|e| {
            let preview_len = body.len().min(100);
            let preview = String::from_utf8_lossy(&body[..preview_len]);
            SwimlaneError::SerializationError(format!("Failed to deserialize JSON: {}. Body preview: {}", e, preview))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_ext_text_invalid_utf8() {
        // Invalid UTF-8 sequence - should fall back to lossy conversion
        let body = Bytes::from(vec![0xFF, 0xFE, 0xFD]);
        let response = http::Response::builder().status(200).body(body).unwrap();

        assert!(response.text().contains('\u{FFFD}'));
    }

    #[test]
    fn test_response_ext_json() {
        let body = Bytes::from(r#"{"apiVersion": "2.15.0+1234"}"#);
        let response = http::Response::builder()
            .status(200)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();

        let parsed: serde_json::Value = response.json().unwrap();
        assert_eq!(parsed["apiVersion"], "2.15.0+1234");
    }

    #[test]
    fn test_response_ext_json_empty() {
        let response = http::Response::builder().status(200).body(Bytes::new()).unwrap();

        let parsed: Result<serde_json::Value, _> = response.json();
        if let Err(SwimlaneError::SerializationError(msg)) = parsed {
            assert!(msg.contains("Empty response body"));
        } else {
            panic!("Expected SerializationError for empty body");
        }
    }
}
