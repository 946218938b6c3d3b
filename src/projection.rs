use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One entity as a flat column -> value mapping.
pub type Row = BTreeMap<String, Value>;

/// (dotted source path, output column)
pub type FieldMap = &'static [(&'static str, &'static str)];

pub const STORY_POINTS_FIELD: &str = "fields.customfield_10016";
pub const EPIC_NAME_FIELD: &str = "fields.customfield_10011";
pub const EPIC_COLOR_FIELD: &str = "fields.customfield_10013";
pub const EPIC_LINK_FIELD: &str = "fields.customfield_10014";

// `fields.resolution` (the whole object, or null) is deliberately absent:
// `resolution` always comes from `fields.resolution.name`.
pub const ISSUE_FIELDS: FieldMap = &[
    ("id", "issue_id"),
    ("key", "issue_key"),
    ("fields.project.id", "project_id"),
    ("fields.project.key", "project_key"),
    ("fields.project.name", "project_name"),
    ("fields.project.projectTypeKey", "project_type"),
    ("fields.issuetype.id", "issue_type_id"),
    ("fields.issuetype.name", "issue_type"),
    ("fields.issuetype.subtask", "is_subtask"),
    ("fields.summary", "summary"),
    ("fields.description", "description"),
    ("fields.status.id", "status_id"),
    ("fields.status.name", "status"),
    ("fields.status.statusCategory.key", "status_category_key"),
    ("fields.status.statusCategory.name", "status_category"),
    ("fields.status.statusCategory.colorName", "status_category_color"),
    ("fields.statuscategorychangedate", "status_category_changed"),
    ("fields.priority.id", "priority_id"),
    ("fields.priority.name", "priority"),
    ("fields.resolution.name", "resolution"),
    ("fields.resolutiondate", "resolved"),
    ("fields.created", "created"),
    ("fields.updated", "updated"),
    ("fields.duedate", "due_date"),
    ("fields.lastViewed", "last_viewed"),
    ("fields.labels", "labels"),
    ("fields.assignee.accountId", "assignee_id"),
    ("fields.assignee.displayName", "assignee"),
    ("fields.reporter.displayName", "reporter"),
    ("fields.creator.displayName", "creator"),
    (STORY_POINTS_FIELD, "story_points"),
    (EPIC_NAME_FIELD, "epic_name"),
    (EPIC_COLOR_FIELD, "epic_color"),
    (EPIC_LINK_FIELD, "epic_link"),
    ("fields.parent.id", "parent_id"),
    ("fields.parent.key", "parent_key"),
    ("fields.parent.fields.summary", "parent_summary"),
    ("fields.parent.fields.issuetype.name", "parent_type"),
    ("fields.parent.fields.status.name", "parent_status"),
    ("fields.parent.fields.priority.name", "parent_priority"),
    ("fields.timetracking.originalEstimateSeconds", "original_estimate_seconds"),
    ("fields.timetracking.remainingEstimateSeconds", "remaining_estimate_seconds"),
    ("fields.timetracking.timeSpentSeconds", "time_spent_seconds"),
    ("fields.timeoriginalestimate", "time_original_estimate"),
    ("fields.timeestimate", "time_estimate"),
    ("fields.timespent", "time_spent"),
    ("fields.aggregatetimeoriginalestimate", "aggregate_original_estimate"),
    ("fields.aggregatetimeestimate", "aggregate_time_estimate"),
    ("fields.aggregatetimespent", "aggregate_time_spent"),
    ("fields.progress.progress", "progress"),
    ("fields.progress.total", "progress_total"),
    ("fields.votes.votes", "votes"),
    ("fields.watches.watchCount", "watchers"),
];

pub const BOARD_FIELDS: FieldMap = &[
    ("id", "board_id"),
    ("name", "board_name"),
    ("type", "board_type"),
    ("location.projectId", "project_id"),
    ("location.projectKey", "project_key"),
    ("location.projectName", "project_name"),
    ("location.projectTypeKey", "project_type"),
];

pub const SPRINT_FIELDS: FieldMap = &[
    ("id", "sprint_id"),
    ("name", "sprint_name"),
    ("state", "sprint_state"),
    ("goal", "sprint_goal"),
    ("startDate", "sprint_start"),
    ("endDate", "sprint_end"),
    ("completeDate", "sprint_complete"),
    ("originBoardId", "board_id"),
];

pub const PROJECT_FIELDS: FieldMap = &[
    ("id", "project_id"),
    ("key", "project_key"),
    ("name", "project_name"),
    ("projectTypeKey", "project_type"),
    ("style", "style"),
    ("simplified", "simplified"),
    ("isPrivate", "is_private"),
];

pub const VERSION_FIELDS: FieldMap = &[
    ("id", "version_id"),
    ("name", "version_name"),
    ("description", "description"),
    ("projectId", "project_id"),
    ("startDate", "start_date"),
    ("releaseDate", "release_date"),
    ("archived", "archived"),
    ("released", "released"),
    ("overdue", "overdue"),
];

/// Flattens nested objects into dotted keys. Arrays, scalars and nulls are
/// kept as leaf values.
pub fn flatten(value: &Value) -> Row {
    let mut row = Row::new();
    match value {
        Value::Object(map) => flatten_into(&mut row, None, map),
        other => {
            row.insert(String::new(), other.clone());
        }
    }
    row
}

fn flatten_into(row: &mut Row, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                flatten_into(row, Some(&path), nested)
            }
            _ => {
                row.insert(path, value.clone());
            }
        }
    }
}

/// Keeps whitelisted columns under their short names. A column that already
/// carries its short name is kept as is, so projecting twice is a no-op.
pub fn project(row: &Row, fields: FieldMap) -> Row {
    let mut projected = Row::new();
    for (source, column) in fields {
        if let Some(value) = row.get(*source).or_else(|| row.get(*column)) {
            projected.insert(column.to_string(), value.clone());
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_issue() -> Value {
        json!({
            "id": "10001",
            "key": "ABC-1",
            "self": "https://example.atlassian.net/rest/api/2/issue/10001",
            "fields": {
                "summary": "Fix login",
                "issuetype": { "name": "Bug", "subtask": false },
                "status": {
                    "name": "In Progress",
                    "statusCategory": { "name": "In Progress", "colorName": "yellow" }
                },
                "resolution": null,
                "labels": ["auth", "web"],
                "customfield_10016": 3.0,
                "parent": { "id": "10000", "key": "ABC-0", "fields": { "summary": "Login epic" } }
            }
        })
    }

    #[test]
    fn flatten_uses_dotted_paths() {
        let row = flatten(&raw_issue());
        assert_eq!(row["fields.status.statusCategory.name"], json!("In Progress"));
        assert_eq!(row["fields.parent.fields.summary"], json!("Login epic"));
        assert_eq!(row["fields.labels"], json!(["auth", "web"]));
        assert_eq!(row["fields.resolution"], Value::Null);
        assert!(!row.contains_key("fields"));
    }

    #[test]
    fn project_renames_whitelisted_fields() {
        let row = project(&flatten(&raw_issue()), ISSUE_FIELDS);
        assert_eq!(row["issue_id"], json!("10001"));
        assert_eq!(row["issue_key"], json!("ABC-1"));
        assert_eq!(row["issue_type"], json!("Bug"));
        assert_eq!(row["status_category"], json!("In Progress"));
        assert_eq!(row["story_points"], json!(3.0));
        assert_eq!(row["parent_id"], json!("10000"));
        assert_eq!(row["parent_summary"], json!("Login epic"));
        assert!(!row.contains_key("self"));
        assert!(!row.contains_key("priority"));
    }

    #[test]
    fn null_resolution_object_is_not_projected() {
        let row = project(&flatten(&raw_issue()), ISSUE_FIELDS);
        assert!(!row.contains_key("resolution"));

        let mut resolved = raw_issue();
        resolved["fields"]["resolution"] = json!({ "name": "Done" });
        let row = project(&flatten(&resolved), ISSUE_FIELDS);
        assert_eq!(row["resolution"], json!("Done"));
    }

    #[test]
    fn projection_is_idempotent() {
        for fields in [ISSUE_FIELDS, BOARD_FIELDS, SPRINT_FIELDS, PROJECT_FIELDS, VERSION_FIELDS] {
            let once = project(&flatten(&raw_issue()), fields);
            assert_eq!(project(&once, fields), once);
        }

        let sprint = flatten(&json!({
            "id": 7, "name": "Sprint 7", "state": "active", "originBoardId": 3
        }));
        let once = project(&sprint, SPRINT_FIELDS);
        assert_eq!(once["board_id"], json!(3));
        assert_eq!(project(&once, SPRINT_FIELDS), once);
    }

    #[test]
    fn short_names_do_not_collide_with_source_paths() {
        for fields in [ISSUE_FIELDS, BOARD_FIELDS, SPRINT_FIELDS, PROJECT_FIELDS, VERSION_FIELDS] {
            for (_, column) in fields {
                assert!(
                    fields
                        .iter()
                        .filter(|(source, _)| source == column)
                        .all(|(_, renamed)| renamed == column),
                    "{column}"
                );
                assert_eq!(fields.iter().filter(|(_, c)| c == column).count(), 1, "{column}");
            }
        }
    }
}
