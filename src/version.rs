// version.rs
//! Server version parsing and comparison

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::error::SwimlaneError;

type Result<T> = std::result::Result<T, SwimlaneError>;

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("static regex is valid"))
}

/// Every run of ASCII digits in `version`, in order.
///
/// `"2.13.2-173414"` yields `[2, 13, 2, 173414]`.
pub fn version_sections(version: &str) -> Vec<u64> {
    // Runs too long for u64 saturate rather than fail
    digits().find_iter(version).map(|m| m.as_str().parse().unwrap_or(u64::MAX)).collect()
}

/// Compare two version strings section by section.
///
/// With `zerofill`, the shorter version is padded with zeros so `2.13.2` is
/// greater than `2.13`. Without it, sections present in only one version are
/// ignored so `2.13.2` equals `2.13`.
///
/// ```
/// use std::cmp::Ordering;
/// use swimlane::compare_versions;
///
/// assert_eq!(compare_versions("2.13.2", "2.13", false), Ordering::Equal);
/// assert_eq!(compare_versions("2.13.2", "2.13", true), Ordering::Greater);
/// assert_eq!(compare_versions("2.13.2-1234", "3", false), Ordering::Less);
/// ```
pub fn compare_versions(a: &str, b: &str, zerofill: bool) -> Ordering {
    let mut a = version_sections(a);
    let mut b = version_sections(b);

    if zerofill {
        let len = a.len().max(b.len());
        a.resize(len, 0);
        b.resize(len, 0);
    } else {
        let len = a.len().min(b.len());
        a.truncate(len);
        b.truncate(len);
    }

    a.cmp(&b)
}

/// Compare the leading sections of `version` against `sections`.
///
/// Only as many sections as provided are compared, so with version
/// `2.13.2-173414`, `[2]` and `[2, 13]` are equal while `[2, 13, 3]` is greater.
pub fn compare_version_sections(version: &str, sections: &[u64]) -> Ordering {
    let mut parsed = version_sections(version);
    parsed.truncate(sections.len());
    parsed.as_slice().cmp(sections)
}

/// Inclusive range of server build versions an operation supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    min: Option<String>,
    max: Option<String>,
}

impl VersionRange {
    pub fn new(min: Option<&str>, max: Option<&str>) -> Result<Self> {
        match (min, max) {
            (None, None) => Err(SwimlaneError::Validation(
                "Must provide either min_version, max_version, or both".to_string(),
            )),
            (Some(lo), Some(hi)) if compare_versions(lo, hi, false) == Ordering::Greater => Err(
                SwimlaneError::Validation(format!("min_version must be <= max_version ({}, {})", lo, hi)),
            ),
            _ => Ok(Self { min: min.map(String::from), max: max.map(String::from) }),
        }
    }

    pub fn at_least(min: &str) -> Self {
        Self { min: Some(min.to_string()), max: None }
    }

    pub fn min(&self) -> Option<&str> {
        self.min.as_deref()
    }

    pub fn max(&self) -> Option<&str> {
        self.max.as_deref()
    }

    /// Whether `version` lies within the range, missing sections counting as zero
    pub fn contains(&self, version: &str) -> bool {
        let above_min = self.min.as_deref().map_or(true, |min| compare_versions(version, min, true) != Ordering::Less);
        let below_max =
            self.max.as_deref().map_or(true, |max| compare_versions(version, max, true) != Ordering::Greater);
        above_min && below_max
    }

    /// `Ok` when `version` is in range, otherwise [`SwimlaneError::InvalidVersion`]
    pub fn check(&self, version: &str) -> Result<()> {
        if self.contains(version) {
            Ok(())
        } else {
            Err(SwimlaneError::InvalidVersion {
                version: version.to_string(),
                min: self.min.clone(),
                max: self.max.clone(),
            })
        }
    }
}

/// Version of this SDK
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
