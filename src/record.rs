// record.rs

use reqwest::Method;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::app::App;
use crate::constants::*;
use crate::error::SwimlaneError;
use crate::report::Report;
use crate::response_ext::ResponseExt;
use crate::validation::{validate_id, validate_str_list};

type Result<T> = std::result::Result<T, SwimlaneError>;

/// A single instance of an [`App`]
///
/// Values are stored by field id under `values`; the accessors here work by
/// field name and resolve ids through the app schema.
#[derive(Debug, Clone)]
pub struct Record {
    app: Arc<App>,
    raw: Value,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tracking_id().or_else(|| self.id()) {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "{} - New", self.app.name()),
        }
    }
}

impl Record {
    pub fn new(app: Arc<App>, raw: Value) -> Self {
        Self { app, raw }
    }

    /// Unsaved record with no values
    pub fn new_for_app(app: Arc<App>) -> Self {
        let raw = json!({
            JSON_KEY_TYPE: TYPE_RECORD,
            JSON_KEY_IS_NEW: true,
            JSON_KEY_APPLICATION_ID: app.id(),
            JSON_KEY_VALUES: {}
        });
        Self { app, raw }
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn id(&self) -> Option<&str> {
        self.raw[JSON_KEY_ID].as_str().filter(|s| !s.is_empty())
    }

    /// Human readable id, e.g. `SI-42`
    pub fn tracking_id(&self) -> Option<&str> {
        self.raw[JSON_KEY_TRACKING_FULL].as_str().filter(|s| !s.is_empty())
    }

    pub fn is_new(&self) -> bool {
        self.raw[JSON_KEY_IS_NEW].as_bool().unwrap_or(false) || self.id().is_none()
    }

    /// Value of a field, `None` when unset
    pub fn get(&self, field_name: &str) -> Result<Option<&Value>> {
        let field_id = self.field_id(field_name)?;
        Ok(self.raw[JSON_KEY_VALUES].get(field_id).filter(|v| !v.is_null()))
    }

    /// Set a field value locally; call [`Record::save`] to persist
    pub fn set(&mut self, field_name: &str, value: Value) -> Result<()> {
        let definition = self.app.get_field_definition_by_name(field_name)?;
        if is_read_only(definition) {
            return Err(SwimlaneError::Validation(format!("Field '{}' is read-only", field_name)));
        }
        let field_id = self.field_id(field_name)?.to_string();

        if !self.raw[JSON_KEY_VALUES].is_object() {
            self.raw[JSON_KEY_VALUES] = Value::Object(Map::new());
        }
        self.raw[JSON_KEY_VALUES][field_id] = value;
        Ok(())
    }

    /// All set values keyed by field name
    pub fn values(&self) -> HashMap<&str, &Value> {
        let Some(values) = self.raw[JSON_KEY_VALUES].as_object() else {
            return HashMap::new();
        };

        values
            .iter()
            .filter(|(_, v)| !v.is_null())
            .filter_map(|(id, v)| {
                let name = self.app.get_field_definition_by_id(id).ok()?[JSON_KEY_NAME].as_str()?;
                Some((name, v))
            })
            .collect()
    }

    /// Create or update the record on the server; the server's copy replaces the local one
    pub async fn save(&mut self) -> Result<()> {
        let method = if self.is_new() { Method::POST } else { Method::PUT };
        let endpoint = format!("app/{}/record", self.app.id());

        let saved = self.app.swimlane().request_json(method, &endpoint, Some(&self.raw), None).await?;
        if saved.is_object() {
            self.raw = saved;
        }
        Ok(())
    }

    /// Delete the record from the server
    pub async fn delete(self) -> Result<()> {
        let id = self
            .id()
            .filter(|_| !self.is_new())
            .ok_or_else(|| SwimlaneError::Validation("Cannot delete a record that was never saved".to_string()))?;

        self.app
            .swimlane()
            .request(Method::DELETE, &format!("app/{}/record/{}", self.app.id(), id), None, None)
            .await?;
        Ok(())
    }

    fn field_id(&self, field_name: &str) -> Result<&str> {
        self.app.get_field_definition_by_name(field_name)?[JSON_KEY_ID]
            .as_str()
            .ok_or_else(|| SwimlaneError::SerializationError(format!("Field '{}' has no id", field_name)))
    }
}

fn is_read_only(definition: &Value) -> bool {
    definition[JSON_KEY_FIELD_TYPE].as_str() == Some(FIELD_TYPE_TRACKING)
        || definition[JSON_KEY_IS_CALCULATED].as_bool().unwrap_or(false)
}

/// Record operations scoped to one app
pub struct RecordAdapter {
    app: Arc<App>,
}

impl RecordAdapter {
    pub(crate) fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    /// Get a record by id
    pub async fn get(&self, id: &str) -> Result<Record> {
        validate_id(id, "id")?;
        let endpoint = format!("app/{}/record/{}", self.app.id(), id);
        let raw = self.app.swimlane().request_json(Method::GET, &endpoint, None, None).await?;
        Ok(Record::new(Arc::clone(&self.app), raw))
    }

    /// Unsaved record with the given field values set
    pub fn build<I, K>(&self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut record = Record::new_for_app(Arc::clone(&self.app));
        for (name, value) in values {
            record.set(name.as_ref(), value)?;
        }
        Ok(record)
    }

    /// Build and save a new record
    pub async fn create<I, K>(&self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut record = self.build(values)?;
        record.save().await?;
        Ok(record)
    }

    /// Records matching every `(field name, operand, value)` filter
    pub async fn search(&self, filters: &[(&str, &str, Value)]) -> Result<Vec<Record>> {
        let mut report = Report::new_for_app(Arc::clone(&self.app), "search", None)?;
        for (field, operand, value) in filters {
            report.filter(field, operand, value.clone())?;
        }
        report.fetch_all().await
    }

    /// Queue deletion of many records; returns the bulk job id
    pub async fn bulk_delete<S: AsRef<str>>(&self, ids: &[S]) -> Result<String> {
        validate_str_list(ids, "ids")?;

        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        let body = json!({
            "$type": "Core.Models.Record.BatchDelete, Core",
            "recordIds": ids
        });
        let endpoint = format!("app/{}/record/batch", self.app.id());
        let text = self.app.swimlane().request(Method::DELETE, &endpoint, Some(&body), None).await?.text();

        // The job id comes back as a bare JSON string
        Ok(match serde_json::from_str::<Value>(&text) {
            Ok(Value::String(job_id)) => job_id,
            _ => text.trim().to_string(),
        })
    }
}
