use crate::models::{Issue, Sprint};
use std::collections::HashMap;

pub const NO_EPIC: &str = "No Epic";
pub const DEFAULT_DISPLAY_COLOR: &str = "white";

/// Maps a Jira epic color keyword to the color used when drawing charts.
pub fn display_color(keyword: Option<&str>) -> &'static str {
    match keyword {
        Some("purple") => "mediumpurple",
        Some("dark_blue") => "darkblue",
        Some("yellow") => "gold",
        Some("grey") => "grey",
        Some("dark_purple") => "rebeccapurple",
        Some("blue") => "dodgerblue",
        Some("dark_orange") => "darkorange",
        Some("dark_yellow") => "goldenrod",
        Some("blue-gray") => "lightslategray",
        Some("green") => "green",
        _ => DEFAULT_DISPLAY_COLOR,
    }
}

/// Gives every issue an epic name and display color. An issue keeps its own
/// epic fields; missing ones come from its parent, looked up by id. Parents
/// are read as fetched, so only one level is followed.
pub fn backfill_epics(issues: &[Issue]) -> Vec<Issue> {
    let epics_by_id: HashMap<&str, (Option<&str>, Option<&str>)> = issues
        .iter()
        .map(|issue| {
            (
                issue.issue_id.as_str(),
                (issue.epic_name.as_deref(), issue.epic_color.as_deref()),
            )
        })
        .collect();

    issues
        .iter()
        .map(|issue| {
            let (parent_name, parent_color) = issue
                .parent_id
                .as_deref()
                .and_then(|parent_id| epics_by_id.get(parent_id).copied())
                .unwrap_or((None, None));

            let epic_name = issue
                .epic_name
                .as_deref()
                .or(parent_name)
                .unwrap_or(NO_EPIC)
                .to_string();
            let epic_color = issue.epic_color.as_deref().or(parent_color);

            Issue {
                epic_display_color: Some(display_color(epic_color).to_string()),
                epic_color: epic_color.map(str::to_string),
                epic_name: Some(epic_name),
                ..issue.clone()
            }
        })
        .collect()
}

/// Left-joins sprint issues onto sprint metadata. Each issue batch is tagged
/// with the sprint it was fetched for; a sprint id with no metadata leaves the
/// sprint columns empty but keeps the issue.
pub fn assemble_sprint_issues(sprints: &[Sprint], tagged: Vec<(u64, Vec<Issue>)>) -> Vec<Issue> {
    let sprints_by_id: HashMap<u64, &Sprint> = sprints
        .iter()
        .map(|sprint| (sprint.sprint_id, sprint))
        .collect();

    tagged
        .into_iter()
        .flat_map(|(sprint_id, issues)| {
            let sprint = sprints_by_id.get(&sprint_id).copied();
            issues.into_iter().map(move |issue| Issue {
                sprint_id: Some(sprint_id),
                sprint_name: sprint.map(|s| s.sprint_name.clone()),
                sprint_state: sprint.and_then(|s| s.sprint_state.clone()),
                sprint_start: sprint.and_then(|s| s.sprint_start.clone()),
                sprint_end: sprint.and_then(|s| s.sprint_end.clone()),
                sprint_complete: sprint.and_then(|s| s.sprint_complete.clone()),
                board_id: sprint.and_then(|s| s.board_id),
                ..issue
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: &str, parent: Option<&str>, epic: Option<&str>, color: Option<&str>) -> Issue {
        Issue {
            issue_id: id.to_string(),
            issue_key: format!("ABC-{id}"),
            parent_id: parent.map(str::to_string),
            epic_name: epic.map(str::to_string),
            epic_color: color.map(str::to_string),
            ..Default::default()
        }
    }

    fn sprint(id: u64, name: &str) -> Sprint {
        Sprint {
            sprint_id: id,
            sprint_name: name.to_string(),
            sprint_state: Some("active".to_string()),
            sprint_start: Some("2024-03-04T09:00:00.000Z".to_string()),
            board_id: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn display_color_covers_every_keyword() {
        let expected = [
            ("purple", "mediumpurple"),
            ("dark_blue", "darkblue"),
            ("yellow", "gold"),
            ("grey", "grey"),
            ("dark_purple", "rebeccapurple"),
            ("blue", "dodgerblue"),
            ("dark_orange", "darkorange"),
            ("dark_yellow", "goldenrod"),
            ("blue-gray", "lightslategray"),
            ("green", "green"),
        ];
        for (keyword, color) in expected {
            assert_eq!(display_color(Some(keyword)), color);
        }
        for other in [Some(""), Some("ghx-label-4"), Some("Purple"), None] {
            assert_eq!(display_color(other), "white");
        }
    }

    #[test]
    fn own_epic_name_is_kept() {
        let issues = vec![
            issue("1", None, Some("Feature X"), Some("green")),
            issue("2", Some("1"), Some("Feature Y"), None),
        ];
        let enriched = backfill_epics(&issues);
        assert_eq!(enriched[1].epic_name.as_deref(), Some("Feature Y"));
        // Color is still missing on the child, so it comes from the parent.
        assert_eq!(enriched[1].epic_color.as_deref(), Some("green"));
        assert_eq!(enriched[1].epic_display_color.as_deref(), Some("green"));
    }

    #[test]
    fn child_inherits_parent_epic() {
        let issues = vec![
            issue("1", None, Some("Feature X"), Some("purple")),
            issue("2", Some("1"), None, None),
        ];
        let enriched = backfill_epics(&issues);
        assert_eq!(enriched[1].epic_name.as_deref(), Some("Feature X"));
        assert_eq!(enriched[1].epic_color.as_deref(), Some("purple"));
        assert_eq!(enriched[1].epic_display_color.as_deref(), Some("mediumpurple"));
        // The input is left untouched.
        assert_eq!(issues[1].epic_name, None);
    }

    #[test]
    fn orphan_gets_no_epic_and_no_color() {
        let issues = vec![
            issue("1", None, None, None),
            issue("2", Some("999"), None, None),
        ];
        for enriched in backfill_epics(&issues) {
            assert_eq!(enriched.epic_name.as_deref(), Some(NO_EPIC));
            assert_eq!(enriched.epic_color, None);
            assert_eq!(enriched.epic_display_color.as_deref(), Some("white"));
        }
    }

    #[test]
    fn backfill_follows_one_level_only() {
        let issues = vec![
            issue("1", None, Some("Feature X"), None),
            issue("2", Some("1"), None, None),
            issue("3", Some("2"), None, None),
        ];
        let enriched = backfill_epics(&issues);
        assert_eq!(enriched[2].epic_name.as_deref(), Some(NO_EPIC));
    }

    #[test]
    fn sprint_columns_are_joined() {
        let sprints = vec![sprint(7, "Sprint 7"), sprint(8, "Sprint 8")];
        let tagged = vec![
            (7, vec![issue("1", None, None, None), issue("2", None, None, None)]),
            (8, vec![issue("3", None, None, None)]),
        ];
        let joined = assemble_sprint_issues(&sprints, tagged);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0].sprint_name.as_deref(), Some("Sprint 7"));
        assert_eq!(joined[1].sprint_id, Some(7));
        assert_eq!(joined[2].sprint_name.as_deref(), Some("Sprint 8"));
        assert_eq!(joined[2].board_id, Some(3));
        assert_eq!(joined[2].sprint_state.as_deref(), Some("active"));
    }

    #[test]
    fn unknown_sprint_keeps_issue_with_empty_sprint_columns() {
        let sprints = vec![sprint(7, "Sprint 7")];
        let tagged = vec![(42, vec![issue("1", None, None, None)])];
        let joined = assemble_sprint_issues(&sprints, tagged);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].sprint_id, Some(42));
        assert_eq!(joined[0].sprint_name, None);
        assert_eq!(joined[0].sprint_start, None);
        assert_eq!(joined[0].board_id, None);
    }
}
