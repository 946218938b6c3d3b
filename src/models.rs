use crate::jira_client::RequestError;
use crate::projection::Row;
use serde::{Deserialize, Deserializer, Serialize};

/// Result of a paginated fetch. `Aborted` keeps whatever pages arrived before
/// the request that failed.
#[derive(Debug)]
pub enum Fetched<T> {
    Complete(Vec<T>),
    Aborted { partial: Vec<T>, cause: RequestError },
}

impl<T> Fetched<T> {
    pub fn records(&self) -> &[T] {
        match self {
            Fetched::Complete(records) => records,
            Fetched::Aborted { partial, .. } => partial,
        }
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            Fetched::Complete(records) => records,
            Fetched::Aborted { partial, .. } => partial,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Fetched::Complete(_))
    }

    pub fn cause(&self) -> Option<&RequestError> {
        match self {
            Fetched::Complete(_) => None,
            Fetched::Aborted { cause, .. } => Some(cause),
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Fetched<U>, E> {
        Ok(match self {
            Fetched::Complete(records) => {
                Fetched::Complete(records.into_iter().map(f).collect::<Result<_, _>>()?)
            }
            Fetched::Aborted { partial, cause } => Fetched::Aborted {
                partial: partial.into_iter().map(f).collect::<Result<_, _>>()?,
                cause,
            },
        })
    }
}

/// Jira sends ids as strings in the platform API and as numbers in the agile
/// API; both end up as strings here.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

fn opt_id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }
    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    }))
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Issue {
    #[serde(deserialize_with = "id_string")]
    pub issue_id: String,
    pub issue_key: String,
    #[serde(deserialize_with = "opt_id_string")]
    pub project_id: Option<String>,
    pub project_key: Option<String>,
    pub project_name: Option<String>,
    pub issue_type: Option<String>,
    pub is_subtask: Option<bool>,
    pub summary: Option<String>,
    pub description: Option<serde_json::Value>,
    pub status: Option<String>,
    pub status_category: Option<String>,
    pub status_category_color: Option<String>,
    pub priority: Option<String>,
    pub resolution: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolved: Option<String>,
    pub due_date: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub story_points: Option<f64>,
    pub epic_name: Option<String>,
    pub epic_color: Option<String>,
    /// Filled in by epic backfill.
    pub epic_display_color: Option<String>,
    pub epic_link: Option<String>,
    #[serde(deserialize_with = "opt_id_string")]
    pub parent_id: Option<String>,
    pub parent_key: Option<String>,
    pub parent_summary: Option<String>,
    pub parent_type: Option<String>,
    pub time_original_estimate: Option<u64>,
    pub time_estimate: Option<u64>,
    pub time_spent: Option<u64>,
    pub progress: Option<u64>,
    pub progress_total: Option<u64>,
    // Sprint columns, attached by sprint issue assembly.
    pub sprint_id: Option<u64>,
    pub sprint_name: Option<String>,
    pub sprint_state: Option<String>,
    pub sprint_start: Option<String>,
    pub sprint_end: Option<String>,
    pub sprint_complete: Option<String>,
    pub board_id: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Board {
    pub board_id: u64,
    pub board_name: String,
    pub board_type: Option<String>,
    #[serde(deserialize_with = "opt_id_string")]
    pub project_id: Option<String>,
    pub project_key: Option<String>,
    pub project_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Sprint {
    pub sprint_id: u64,
    pub sprint_name: String,
    /// future, active or closed
    pub sprint_state: Option<String>,
    pub sprint_goal: Option<String>,
    pub sprint_start: Option<String>,
    pub sprint_end: Option<String>,
    pub sprint_complete: Option<String>,
    pub board_id: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Project {
    #[serde(deserialize_with = "id_string")]
    pub project_id: String,
    pub project_key: String,
    pub project_name: String,
    pub project_type: Option<String>,
    pub style: Option<String>,
    pub simplified: Option<bool>,
    pub is_private: Option<bool>,
    #[serde(skip)] // Attached after the project detail request
    pub versions: Vec<Version>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Version {
    #[serde(deserialize_with = "id_string")]
    pub version_id: String,
    pub version_name: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_id_string")]
    pub project_id: Option<String>,
    pub start_date: Option<String>,
    pub release_date: Option<String>,
    pub archived: Option<bool>,
    pub released: Option<bool>,
    pub overdue: Option<bool>,
}

/// Deserializes a projected row into one of the records above.
pub fn from_row<T: serde::de::DeserializeOwned>(row: Row) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::Object(row.into_iter().collect()))
}
