use crate::models::Issue;
use itertools::Itertools;
use serde::Serialize;

pub const MISSING: &str = "None";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    IssueType,
    Status,
    StatusCategory,
    Priority,
    EpicName,
    ProjectName,
    SprintName,
    SprintStart,
    SprintEnd,
    Assignee,
}

impl Dimension {
    pub const ALL: [Dimension; 10] = [
        Dimension::IssueType,
        Dimension::Status,
        Dimension::StatusCategory,
        Dimension::Priority,
        Dimension::EpicName,
        Dimension::ProjectName,
        Dimension::SprintName,
        Dimension::SprintStart,
        Dimension::SprintEnd,
        Dimension::Assignee,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Dimension::IssueType => "issue_type",
            Dimension::Status => "status",
            Dimension::StatusCategory => "status_category",
            Dimension::Priority => "priority",
            Dimension::EpicName => "epic_name",
            Dimension::ProjectName => "project_name",
            Dimension::SprintName => "sprint_name",
            Dimension::SprintStart => "sprint_start",
            Dimension::SprintEnd => "sprint_end",
            Dimension::Assignee => "assignee",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dimension| dimension.slug() == slug)
    }

    pub fn title(self) -> &'static str {
        match self {
            Dimension::IssueType => "Issue type",
            Dimension::Status => "Status",
            Dimension::StatusCategory => "Status category",
            Dimension::Priority => "Priority",
            Dimension::EpicName => "Epic",
            Dimension::ProjectName => "Project",
            Dimension::SprintName => "Sprint",
            Dimension::SprintStart => "Sprint start",
            Dimension::SprintEnd => "Sprint end",
            Dimension::Assignee => "Assignee",
        }
    }

    pub fn value(self, issue: &Issue) -> String {
        let value = match self {
            Dimension::IssueType => issue.issue_type.clone(),
            Dimension::Status => issue.status.clone(),
            Dimension::StatusCategory => issue.status_category.clone(),
            Dimension::Priority => issue.priority.clone(),
            Dimension::EpicName => issue.epic_name.clone(),
            Dimension::ProjectName => issue.project_name.clone(),
            Dimension::SprintName => issue.sprint_name.clone(),
            Dimension::SprintStart => issue.sprint_start.as_deref().map(calendar_date),
            Dimension::SprintEnd => issue.sprint_end.as_deref().map(calendar_date),
            Dimension::Assignee => issue.assignee.clone(),
        };
        value.unwrap_or_else(|| MISSING.to_string())
    }
}

/// Reduces a Jira timestamp to `YYYY-MM-DD`; unparsable input is kept as is.
fn calendar_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|date| date.date_naive().to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: Vec<String>,
    pub story_points: f64,
    pub issue_count: usize,
}

/// Groups issues by the given dimensions, leaving epics out. Missing story
/// points add nothing to the sum but the issue is still counted.
pub fn aggregate(issues: &[Issue], dimensions: &[Dimension]) -> Vec<GroupSummary> {
    issues
        .iter()
        .filter(|issue| issue.issue_type.as_deref() != Some("Epic"))
        .into_group_map_by(|issue| {
            dimensions
                .iter()
                .map(|dimension| dimension.value(issue))
                .collect::<Vec<_>>()
        })
        .into_iter()
        .map(|(key, group)| GroupSummary {
            key,
            story_points: group.iter().filter_map(|issue| issue.story_points).sum(),
            issue_count: group.len(),
        })
        .sorted_by(|a, b| a.key.cmp(&b.key))
        .collect()
}

pub fn totals(groups: &[GroupSummary]) -> (f64, usize) {
    groups.iter().fold((0.0, 0), |(points, count), group| {
        (points + group.story_points, count + group.issue_count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(issue_type: &str, status: &str, points: Option<f64>) -> Issue {
        Issue {
            issue_id: format!("{issue_type}-{status}"),
            issue_key: "ABC-1".to_string(),
            issue_type: Some(issue_type.to_string()),
            status: Some(status.to_string()),
            story_points: points,
            ..Default::default()
        }
    }

    #[test]
    fn groups_by_type_and_status() {
        let issues = vec![
            issue("Task", "Done", Some(3.0)),
            issue("Task", "Done", Some(2.0)),
            issue("Bug", "Done", Some(1.0)),
        ];
        let groups = aggregate(&issues, &[Dimension::IssueType, Dimension::Status]);
        assert_eq!(
            groups,
            vec![
                GroupSummary {
                    key: vec!["Bug".into(), "Done".into()],
                    story_points: 1.0,
                    issue_count: 1,
                },
                GroupSummary {
                    key: vec!["Task".into(), "Done".into()],
                    story_points: 5.0,
                    issue_count: 2,
                },
            ]
        );
    }

    #[test]
    fn epics_are_excluded_and_missing_points_still_count() {
        let issues = vec![
            issue("Epic", "Done", Some(40.0)),
            issue("Story", "To Do", None),
            issue("Story", "To Do", Some(8.0)),
        ];
        let groups = aggregate(&issues, &[Dimension::IssueType]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, vec!["Story".to_string()]);
        assert_eq!(groups[0].story_points, 8.0);
        assert_eq!(groups[0].issue_count, 2);
        assert_eq!(totals(&groups), (8.0, 2));
    }

    #[test]
    fn missing_dimension_values_group_under_none() {
        let issues = vec![issue("Task", "Done", Some(1.0))];
        let groups = aggregate(&issues, &[Dimension::Priority, Dimension::SprintName]);
        assert_eq!(groups[0].key, vec![MISSING.to_string(), MISSING.to_string()]);
    }

    #[test]
    fn sprint_dates_are_reduced_to_days() {
        let mut task = issue("Task", "Done", Some(2.0));
        task.sprint_start = Some("2024-03-04T09:00:00.000Z".to_string());
        task.sprint_end = Some("not a date".to_string());
        assert_eq!(Dimension::SprintStart.value(&task), "2024-03-04");
        assert_eq!(Dimension::SprintEnd.value(&task), "not a date");
    }

    #[test]
    fn slugs_round_trip() {
        for dimension in Dimension::ALL {
            assert_eq!(Dimension::from_slug(dimension.slug()), Some(dimension));
        }
        assert_eq!(Dimension::from_slug("colour"), None);
    }
}
