// constants.rs

// REST
pub const API_ROOT: &str = "/api/";
pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// HTTP headers
pub const HTTP_HEADER_AUTHORIZATION: &str = "Authorization";
pub const HTTP_HEADER_COOKIE: &str = "Cookie";
pub const HTTP_HEADER_AUTH_BEARER: &str = "Bearer ";
pub const HTTP_HEADER_KEY_USER_AGENT: &str = "User-Agent";
pub const HTTP_HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HTTP_CONTENT_TYPE_JSON: &str = "application/json";
pub const HTTP_USER_AGENT: &str = concat!("swimlane-rust/", env!("CARGO_PKG_VERSION"));

// Login body keys
pub const HTTP_BODY_KEY_USERNAME: &str = "userName";
pub const HTTP_BODY_KEY_PASSWORD: &str = "password";
pub const HTTP_BODY_KEY_DOMAIN: &str = "domain";

// 400 error body keys
pub const JSON_KEY_ERROR_CODE: &str = "ErrorCode";
pub const JSON_KEY_ERROR_ARGUMENT: &str = "Argument";

// Query parameters
pub const HTTP_QUERY_KEY_APP_ID: &str = "appId";
pub const HTTP_QUERY_KEY_QUERY: &str = "query";
pub const HTTP_QUERY_KEY_NAME: &str = "name";

// JSON keys
pub const JSON_KEY_TYPE: &str = "$type";
pub const JSON_KEY_ID: &str = "id";
pub const JSON_KEY_NAME: &str = "name";
pub const JSON_KEY_API_VERSION: &str = "apiVersion";
pub const JSON_KEY_FIELDS: &str = "fields";
pub const JSON_KEY_FIELD_TYPE: &str = "fieldType";
pub const JSON_KEY_IS_CALCULATED: &str = "isCalculated";
pub const JSON_KEY_VALUES: &str = "values";
pub const JSON_KEY_IS_NEW: &str = "isNew";
pub const JSON_KEY_TRACKING_FULL: &str = "trackingFull";
pub const JSON_KEY_APPLICATION_ID: &str = "applicationId";
pub const JSON_KEY_FILTERS: &str = "filters";
pub const JSON_KEY_PAGE_SIZE: &str = "pageSize";
pub const JSON_KEY_OFFSET: &str = "offset";
pub const JSON_KEY_COUNT: &str = "count";
pub const JSON_KEY_RESULTS: &str = "results";
pub const JSON_KEY_USER_NAME: &str = "userName";
pub const JSON_KEY_DISPLAY_NAME: &str = "displayName";

// Server model type names
pub const TYPE_REPORT: &str = "Core.Models.Search.Report, Core";
pub const TYPE_RECORD: &str = "Core.Models.Record.Record, Core";
pub const TYPE_USER_GROUP_SELECTION: &str = "Core.Models.Utilities.UserGroupSelection, Core";
pub const TYPE_REPORT_SORTS: &str =
    "System.Collections.Generic.Dictionary`2[[System.String, mscorlib],[Core.Models.Search.SortTypes, Core]], mscorlib";
pub const TYPE_PERMISSION_MATRIX: &str = "Core.Models.Security.PermissionMatrix, Core";

// Field types that the server computes and never accepts from clients
pub const FIELD_TYPE_TRACKING: &str = "tracking";

// Reports
pub const REPORT_PAGE_SIZE: usize = 50;
