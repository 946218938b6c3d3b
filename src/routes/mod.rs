pub mod chart;
pub mod issue;
pub mod root;

use crate::collector::Snapshot;
use crate::models::Issue;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    #[default]
    Search,
    Sprint,
    Backlog,
}

impl IssueSource {
    pub fn issues(self, snapshot: &Snapshot) -> &[Issue] {
        match self {
            IssueSource::Search => &snapshot.issues,
            IssueSource::Sprint => &snapshot.sprint_issues,
            IssueSource::Backlog => &snapshot.backlog,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IssueSource::Search => "search",
            IssueSource::Sprint => "sprint",
            IssueSource::Backlog => "backlog",
        }
    }
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
