// app.rs

use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::client_http::Swimlane;
use crate::constants::*;
use crate::error::SwimlaneError;
use crate::record::RecordAdapter;
use crate::report::ReportAdapter;
use crate::validation::{validate_id, validate_str};

type Result<T> = std::result::Result<T, SwimlaneError>;

/// A Swimlane application: the schema records are instances of
pub struct App {
    swimlane: Arc<Swimlane>,
    raw: Value,
    field_ids: Vec<String>,
    fields_by_id: HashMap<String, Value>,
    field_ids_by_name: HashMap<String, String>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App").field("id", &self.id()).field("name", &self.name()).finish()
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.acronym() {
            "" => write!(f, "{}", self.name()),
            acronym => write!(f, "{} ({})", self.name(), acronym),
        }
    }
}

impl App {
    /// Wrap raw app JSON; the field caches are built once here
    pub fn new(swimlane: Arc<Swimlane>, raw: Value) -> Result<Self> {
        if raw[JSON_KEY_ID].as_str().map_or(true, str::is_empty) {
            return Err(SwimlaneError::SerializationError("App JSON has no id".to_string()));
        }

        let mut field_ids = Vec::new();
        let mut fields_by_id = HashMap::new();
        let mut field_ids_by_name = HashMap::new();

        for field in raw[JSON_KEY_FIELDS].as_array().into_iter().flatten() {
            let Some(id) = field[JSON_KEY_ID].as_str() else {
                continue;
            };
            if let Some(name) = field[JSON_KEY_NAME].as_str() {
                field_ids_by_name.insert(name.to_string(), id.to_string());
            }
            field_ids.push(id.to_string());
            fields_by_id.insert(id.to_string(), field.clone());
        }

        Ok(Self { swimlane, raw, field_ids, fields_by_id, field_ids_by_name })
    }

    pub fn swimlane(&self) -> &Arc<Swimlane> {
        &self.swimlane
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn id(&self) -> &str {
        self.raw[JSON_KEY_ID].as_str().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.raw[JSON_KEY_NAME].as_str().unwrap_or_default()
    }

    pub fn acronym(&self) -> &str {
        self.raw["acronym"].as_str().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.raw["description"].as_str().unwrap_or_default()
    }

    /// Field ids in schema order
    pub fn field_ids(&self) -> &[String] {
        &self.field_ids
    }

    /// Field definitions in schema order
    pub fn fields(&self) -> impl Iterator<Item = &Value> {
        self.field_ids.iter().filter_map(|id| self.fields_by_id.get(id))
    }

    pub fn get_field_definition_by_id(&self, field_id: &str) -> Result<&Value> {
        self.fields_by_id
            .get(field_id)
            .ok_or_else(|| SwimlaneError::NotFound(format!("App '{}' has no field with id '{}'", self.name(), field_id)))
    }

    pub fn get_field_definition_by_name(&self, field_name: &str) -> Result<&Value> {
        self.field_ids_by_name
            .get(field_name)
            .and_then(|id| self.fields_by_id.get(id))
            .ok_or_else(|| SwimlaneError::NotFound(format!("App '{}' has no field '{}'", self.name(), field_name)))
    }

    pub fn records(self: &Arc<Self>) -> RecordAdapter {
        RecordAdapter::new(Arc::clone(self))
    }

    pub fn reports(self: &Arc<Self>) -> ReportAdapter {
        ReportAdapter::new(Arc::clone(self))
    }
}

/// App lookups
pub struct AppAdapter {
    swimlane: Arc<Swimlane>,
}

impl AppAdapter {
    pub(crate) fn new(swimlane: Arc<Swimlane>) -> Self {
        Self { swimlane }
    }

    /// List all apps visible to the current user
    pub async fn list(&self) -> Result<Vec<Arc<App>>> {
        let json = self.swimlane.request_json(Method::GET, "app", None, None).await?;
        let raw_apps = match json {
            Value::Array(items) => items,
            other => {
                return Err(SwimlaneError::SerializationError(format!("Expected app list, got: {}", other)))
            }
        };

        raw_apps.into_iter().map(|raw| App::new(Arc::clone(&self.swimlane), raw).map(Arc::new)).collect()
    }

    /// Get an app by id
    pub async fn get(&self, id: &str) -> Result<Arc<App>> {
        validate_id(id, "id")?;
        let json = self.swimlane.request_json(Method::GET, &format!("app/{}", id), None, None).await?;
        Ok(Arc::new(App::new(Arc::clone(&self.swimlane), json)?))
    }

    /// Get an app by exact name
    pub async fn get_by_name(&self, name: &str) -> Result<Arc<App>> {
        validate_str(name, "name")?;
        self.list()
            .await?
            .into_iter()
            .find(|app| app.name() == name)
            .ok_or_else(|| SwimlaneError::NotFound(format!("App with name '{}'", name)))
    }

    /// Get an app by exact acronym
    pub async fn get_by_acronym(&self, acronym: &str) -> Result<Arc<App>> {
        validate_str(acronym, "acronym")?;
        self.list()
            .await?
            .into_iter()
            .find(|app| app.acronym() == acronym)
            .ok_or_else(|| SwimlaneError::NotFound(format!("App with acronym '{}'", acronym)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::ScriptedRequester;
    use serde_json::json;

    pub(crate) fn sample_app_json() -> Value {
        json!({
            "id": "aApp01",
            "name": "Security Incidents",
            "acronym": "SI",
            "description": "Incident tracking",
            "fields": [
                {"id": "fTrack", "name": "Tracking Id", "fieldType": "tracking"},
                {"id": "fTitle", "name": "Title", "fieldType": "text"},
                {"id": "fSev", "name": "Severity", "fieldType": "valuesList"},
                {"id": "fScore", "name": "Score", "fieldType": "numeric", "isCalculated": true}
            ]
        })
    }

    #[test]
    fn test_field_caches() {
        let (swimlane, _) = ScriptedRequester::client(vec![]);
        let app = App::new(swimlane, sample_app_json()).unwrap();

        assert_eq!(app.id(), "aApp01");
        assert_eq!(app.to_string(), "Security Incidents (SI)");
        assert_eq!(app.field_ids(), ["fTrack", "fTitle", "fSev", "fScore"]);
        assert_eq!(app.fields().count(), 4);
        assert_eq!(app.get_field_definition_by_name("Title").unwrap()["id"], "fTitle");
        assert_eq!(app.get_field_definition_by_id("fSev").unwrap()["name"], "Severity");
        assert!(matches!(app.get_field_definition_by_name("Nope"), Err(SwimlaneError::NotFound(_))));
    }

    #[test]
    fn test_app_requires_id() {
        let (swimlane, _) = ScriptedRequester::client(vec![]);
        assert!(App::new(swimlane, json!({"name": "no id"})).is_err());
    }

    #[tokio::test]
    async fn test_get_by_acronym() {
        let listing = json!([{"id": "a1", "name": "Phishing", "acronym": "PH"}, sample_app_json()]);
        let (swimlane, requester) = ScriptedRequester::client(vec![listing.clone(), listing]);

        let app = swimlane.apps().get_by_acronym("SI").await.unwrap();
        assert_eq!(app.name(), "Security Incidents");
        assert_eq!(requester.calls()[0].endpoint, "app");

        let missing = swimlane.apps().get_by_name("Nope").await;
        assert!(matches!(missing, Err(SwimlaneError::NotFound(_))));
    }
}
