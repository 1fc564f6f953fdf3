// report.rs

use log::{debug, warn};
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::app::App;
use crate::constants::*;
use crate::error::SwimlaneError;
use crate::record::Record;
use crate::validation::{validate_id, validate_str};

type Result<T> = std::result::Result<T, SwimlaneError>;

/// Comparison a report filter applies to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperand {
    Equals,
    NotEquals,
    Contains,
    Excludes,
}

impl FilterOperand {
    pub const ALL: [FilterOperand; 4] = [Self::Equals, Self::NotEquals, Self::Contains, Self::Excludes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "doesNotEqual",
            Self::Contains => "contains",
            Self::Excludes => "excludes",
        }
    }
}

impl fmt::Display for FilterOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperand {
    type Err = SwimlaneError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(FilterOperand::as_str).collect();
            SwimlaneError::Validation(format!("Operand must be one of {}", names.join(", ")))
        })
    }
}

/// Saved search over one app's records
///
/// Results are fetched lazily in pages of 50 through [`Report::records`] and
/// kept once every page has been read, so iterating again does not hit the
/// server until [`Report::clear_results`] is called.
#[derive(Debug, Clone)]
pub struct Report {
    app: Arc<App>,
    raw: Value,
    cache: Option<Vec<Record>>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Report {
    /// Wrap raw report JSON; stats reports and unnamed entries are rejected
    pub fn new(app: Arc<App>, raw: Value) -> Result<Self> {
        if let Some(kind) = raw[JSON_KEY_TYPE].as_str() {
            if kind != TYPE_REPORT {
                return Err(SwimlaneError::SerializationError(format!("Not a record report: {}", kind)));
            }
        }
        if !raw[JSON_KEY_NAME].is_string() {
            return Err(SwimlaneError::SerializationError("Report JSON has no name".to_string()));
        }
        Ok(Self { app, raw, cache: None })
    }

    /// Unsaved report over every field of `app`
    pub fn new_for_app(app: Arc<App>, name: &str, creator: Option<Value>) -> Result<Self> {
        validate_str(name, "name")?;

        let created = chrono::Utc::now().to_rfc3339();
        let creator = creator.unwrap_or(Value::Null);
        let raw = json!({
            JSON_KEY_TYPE: TYPE_REPORT,
            "groupBys": [],
            "aggregates": [],
            "applicationIds": [app.id()],
            "columns": app.field_ids(),
            "sorts": {
                JSON_KEY_TYPE: TYPE_REPORT_SORTS
            },
            JSON_KEY_FILTERS: [],
            JSON_KEY_PAGE_SIZE: REPORT_PAGE_SIZE,
            JSON_KEY_OFFSET: 0,
            "defaultSearchReport": false,
            "allowed": [],
            "permissions": {
                JSON_KEY_TYPE: TYPE_PERMISSION_MATRIX
            },
            "createdDate": created,
            "modifiedDate": created,
            "createdByUser": creator.clone(),
            "modifiedByUser": creator,
            JSON_KEY_ID: null,
            JSON_KEY_NAME: name,
            "disabled": false,
            "keywords": ""
        });
        Self::new(app, raw)
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn name(&self) -> &str {
        self.raw[JSON_KEY_NAME].as_str().unwrap_or_default()
    }

    pub fn id(&self) -> Option<&str> {
        self.raw[JSON_KEY_ID].as_str().filter(|s| !s.is_empty())
    }

    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Add a filter by field name, comparison operand and value
    ///
    /// `operand` must be one of `equals`, `doesNotEqual`, `contains` or `excludes`.
    pub fn filter(&mut self, field: &str, operand: &str, value: Value) -> Result<()> {
        let operand = FilterOperand::from_str(operand)?;
        let field_id = self.app.get_field_definition_by_name(field)?[JSON_KEY_ID].clone();

        if !self.raw[JSON_KEY_FILTERS].is_array() {
            self.raw[JSON_KEY_FILTERS] = json!([]);
        }
        if let Some(filters) = self.raw[JSON_KEY_FILTERS].as_array_mut() {
            filters.push(json!({
                "fieldId": field_id,
                "filterType": operand.as_str(),
                "value": value
            }));
        }
        Ok(())
    }

    /// Cursor over the report results
    pub fn records(&mut self) -> ReportRecords<'_> {
        let state = if self.cache.is_some() {
            CursorState::Replay { index: 0 }
        } else {
            CursorState::Fetch(FetchState::default())
        };
        ReportRecords { report: self, state }
    }

    /// Every result of the report
    pub async fn fetch_all(&mut self) -> Result<Vec<Record>> {
        let mut cursor = self.records();
        let mut records = Vec::new();
        while let Some(record) = cursor.next().await {
            records.push(record?);
        }
        Ok(records)
    }

    /// Clear cached results, allowing the report to be rerun
    pub fn clear_results(&mut self) {
        self.cache = None;
    }

    /// Create or update the report on the server
    pub async fn save(&mut self) -> Result<()> {
        let (method, endpoint) = match self.id() {
            None => (Method::POST, "reports".to_string()),
            Some(id) => (Method::PUT, format!("reports/{}", id)),
        };

        let saved = self.app.swimlane().request_json(method, &endpoint, Some(&self.raw), None).await?;
        if saved.is_object() {
            self.raw = saved;
        }
        Ok(())
    }

    /// Delete the report from the server
    pub async fn delete(self) -> Result<()> {
        let id = self
            .id()
            .ok_or_else(|| SwimlaneError::Validation("Cannot delete a report that was never saved".to_string()))?;
        self.app.swimlane().request(Method::DELETE, &format!("reports/{}", id), None, None).await?;
        Ok(())
    }

    /// Report body for one page of results
    ///
    /// The server reads `offset` as a page index, not a record index.
    fn paginated_body(&self, page: usize) -> Value {
        let mut body = self.raw.clone();
        body[JSON_KEY_PAGE_SIZE] = json!(REPORT_PAGE_SIZE);
        body[JSON_KEY_OFFSET] = json!(page);
        body
    }

    /// Total result count and the records of one page
    async fn retrieve_page(&self, page: usize) -> Result<(usize, Vec<Record>)> {
        let body = self.paginated_body(page);
        let data = self.app.swimlane().request_json(Method::POST, "search", Some(&body), None).await?;

        let count = data[JSON_KEY_COUNT]
            .as_u64()
            .ok_or_else(|| SwimlaneError::SerializationError("search response has no count".to_string()))?;
        let records: Vec<Record> = data[JSON_KEY_RESULTS][self.app.id()]
            .as_array()
            .map(|raws| raws.iter().map(|raw| Record::new(Arc::clone(&self.app), raw.clone())).collect())
            .unwrap_or_default();

        debug!("Report '{}' page {}: count {}", self.name(), page, count);
        Ok((count as usize, records))
    }
}

#[derive(Default)]
struct FetchState {
    page: usize,
    buffer: VecDeque<Record>,
    drained: Vec<Record>,
    exhausted: bool,
}

enum CursorState {
    Replay { index: usize },
    Fetch(FetchState),
    Done,
}

/// Async cursor over a report's records
///
/// ```no_run
/// # async fn run(report: &mut swimlane::Report) -> Result<(), swimlane::SwimlaneError> {
/// let mut records = report.records();
/// while let Some(record) = records.next().await {
///     println!("{}", record?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ReportRecords<'a> {
    report: &'a mut Report,
    state: CursorState,
}

impl ReportRecords<'_> {
    /// Next record, fetching another page when the current one is used up
    ///
    /// Stops after a page with no records or once `count` records have been
    /// yielded. Only a cursor that runs to the end fills the report cache.
    pub async fn next(&mut self) -> Option<Result<Record>> {
        loop {
            match &mut self.state {
                CursorState::Done => return None,
                CursorState::Replay { index } => {
                    let record = self.report.cache.as_ref().and_then(|cache| cache.get(*index)).cloned();
                    *index += 1;
                    return record.map(Ok);
                }
                CursorState::Fetch(fetch) => {
                    if let Some(record) = fetch.buffer.pop_front() {
                        fetch.drained.push(record.clone());
                        return Some(Ok(record));
                    }

                    if fetch.exhausted {
                        self.report.cache = Some(std::mem::take(&mut fetch.drained));
                        self.state = CursorState::Done;
                        return None;
                    }

                    match self.report.retrieve_page(fetch.page).await {
                        Ok((count, records)) => {
                            fetch.page += 1;
                            if records.is_empty() || fetch.drained.len() + records.len() >= count {
                                fetch.exhausted = true;
                            }
                            fetch.buffer.extend(records);
                        }
                        Err(e) => {
                            self.state = CursorState::Done;
                            return Some(Err(e));
                        }
                    }
                }
            }
        }
    }
}

/// Report lookups scoped to one app
pub struct ReportAdapter {
    app: Arc<App>,
}

impl ReportAdapter {
    pub(crate) fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    /// All record reports of the app; stats reports are skipped
    pub async fn list(&self) -> Result<Vec<Report>> {
        let mut query = HashMap::new();
        query.insert(HTTP_QUERY_KEY_APP_ID.to_string(), self.app.id().to_string());
        let json = self.app.swimlane().request_json(Method::GET, "reports", None, Some(query)).await?;

        let raws = match json {
            Value::Array(items) => items,
            other => return Err(SwimlaneError::SerializationError(format!("Expected report list, got: {}", other))),
        };

        Ok(raws
            .into_iter()
            .filter_map(|raw| match Report::new(Arc::clone(&self.app), raw) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!("Skipping report: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Get a report by id
    pub async fn get(&self, id: &str) -> Result<Report> {
        validate_id(id, "id")?;
        let raw = self.app.swimlane().request_json(Method::GET, &format!("reports/{}", id), None, None).await?;
        Report::new(Arc::clone(&self.app), raw)
    }

    /// New unsaved report owned by the current user
    pub async fn build(&self, name: &str) -> Result<Report> {
        validate_str(name, "name")?;
        let creator = self.app.swimlane().user().await?.selection();
        Report::new_for_app(Arc::clone(&self.app), name, Some(creator))
    }
}
