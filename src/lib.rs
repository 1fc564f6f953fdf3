// lib.rs
//! Swimlane SDK for Rust
//!
//! ```no_run
//! # async fn run() -> Result<(), swimlane::SwimlaneError> {
//! use serde_json::json;
//! use swimlane::Swimlane;
//!
//! let swimlane = Swimlane::connect("swimlane.example.com", "admin", "secret", true).await?;
//! let app = swimlane.apps().get_by_acronym("SI").await?;
//!
//! let mut report = app.reports().build("Open high severity").await?;
//! report.filter("Severity", "equals", json!("High"))?;
//! for record in report.fetch_all().await? {
//!     println!("{}", record);
//! }
//! # Ok(())
//! # }
//! ```

mod app;
mod auth;
mod client_builder;
mod client_http;
mod constants;
mod error;
mod helper;
mod record;
mod report;
mod requester;
mod response_ext;
mod usergroup;
mod validation;
mod version;

#[cfg(test)]
mod testing;

pub use app::{App, AppAdapter};
pub use auth::AuthMode;
pub use client_builder::ClientBuilder;
pub use client_http::{normalize_host, RequesterHttp, Swimlane};
pub use error::SwimlaneError;
pub use helper::HelperAdapter;
pub use record::{Record, RecordAdapter};
pub use report::{FilterOperand, Report, ReportAdapter, ReportRecords};
pub use requester::Requester;
pub use response_ext::ResponseExt;
pub use usergroup::{Group, GroupAdapter, User, UserAdapter};
pub use validation::{validate_id, validate_str, validate_str_list};
pub use version::{compare_version_sections, compare_versions, package_version, version_sections, VersionRange};
