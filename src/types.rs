use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HermesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for IssueState {
    type Err = HermesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            _ => Err(HermesError::InvalidArgument(format!(
                "invalid state '{s}', expected 'open' or 'closed'"
            ))),
        }
    }
}

pub const VALID_STATES: &[&str] = &["open", "closed"];

/// Local mirror of one remote issue, stored as one detail file per id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedIssue {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub state: IssueState,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub updated_at: String,
}

impl CachedIssue {
    /// Summary record kept in the cache index.
    pub fn summary(&self) -> IssueSummary {
        IssueSummary {
            id: self.id,
            title: self.title.clone(),
            state: self.state,
            labels: self.labels.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    /// Apply the fields present in `changes`, leaving the rest untouched.
    pub fn apply(&mut self, changes: &FieldChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(body) = &changes.body {
            self.body = body.clone();
        }
        if let Some(state) = changes.state {
            self.state = state;
        }
        if let Some(labels) = &changes.labels {
            self.labels = labels.clone();
        }
    }
}

/// Index entry: everything but the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub state: IssueState,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub updated_at: String,
}

impl From<IssueSummary> for CachedIssue {
    fn from(summary: IssueSummary) -> Self {
        CachedIssue {
            id: summary.id,
            title: summary.title,
            body: String::new(),
            state: summary.state,
            labels: summary.labels,
            updated_at: summary.updated_at,
        }
    }
}

/// Partial set of issue fields. Absent fields are neither serialized nor applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl FieldChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.state.is_none() && self.labels.is_none()
    }

    /// Names of the present fields, in a fixed order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.title.is_some() {
            names.push("title");
        }
        if self.body.is_some() {
            names.push("body");
        }
        if self.state.is_some() {
            names.push("state");
        }
        if self.labels.is_some() {
            names.push("labels");
        }
        names
    }
}

/// Split a comma-separated label list, trimming items and dropping empty ones.
pub fn parse_label_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Current time as an RFC 3339 string.
pub fn now_timestamp() -> String {
    jiff::Timestamp::now().to_string()
}
