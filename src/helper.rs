// helper.rs

use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client_http::Swimlane;
use crate::error::SwimlaneError;
use crate::validation::{validate_id, validate_str, validate_str_list};
use crate::version::VersionRange;

type Result<T> = std::result::Result<T, SwimlaneError>;

/// Direct API calls that skip loading the app or record first
///
/// None of these check that the referenced app, record or field exists.
pub struct HelperAdapter {
    swimlane: Arc<Swimlane>,
}

impl HelperAdapter {
    pub(crate) fn new(swimlane: Arc<Swimlane>) -> Self {
        Self { swimlane }
    }

    /// Add references from a record's reference field to other records
    ///
    /// Requires server build 2.15 or newer.
    pub async fn add_record_references<S: AsRef<str>>(
        &self,
        app_id: &str,
        record_id: &str,
        field_id: &str,
        target_record_ids: &[S],
    ) -> Result<()> {
        validate_id(app_id, "app_id")?;
        validate_id(record_id, "record_id")?;
        validate_str(field_id, "field_id")?;
        validate_str_list(target_record_ids, "target_record_ids")?;

        self.swimlane.require_build_version(&VersionRange::at_least("2.15")).await?;

        let targets: Vec<&str> = target_record_ids.iter().map(AsRef::as_ref).collect();
        let body = json!({
            "fieldId": field_id,
            "targetRecordIds": targets
        });
        self.swimlane
            .request(Method::POST, &format!("app/{}/record/{}/add-references", app_id, record_id), Some(&body), None)
            .await?;
        Ok(())
    }

    /// Add a comment to a record's comments field
    pub async fn add_comment(
        &self,
        app_id: &str,
        record_id: &str,
        field_id: &str,
        message: &str,
        rich_text: bool,
    ) -> Result<()> {
        validate_id(app_id, "app_id")?;
        validate_id(record_id, "record_id")?;
        validate_id(field_id, "field_id")?;
        validate_str(message, "message")?;

        let body = json!({
            "message": message,
            "isRichText": rich_text,
            "createdDate": chrono::Utc::now().to_rfc3339()
        });
        self.swimlane
            .request(Method::POST, &format!("app/{}/record/{}/{}/comment", app_id, record_id, field_id), Some(&body), None)
            .await?;
        Ok(())
    }

    /// History entries of a bulk delete/modify job
    pub async fn check_bulk_job_status(&self, job_id: &str) -> Result<Vec<Value>> {
        validate_id(job_id, "job_id")?;

        match self.swimlane.request_json(Method::GET, &format!("logging/job/{}", job_id), None, None).await? {
            Value::Array(entries) => Ok(entries),
            other => Err(SwimlaneError::SerializationError(format!("Expected job history list, got: {}", other))),
        }
    }
}
