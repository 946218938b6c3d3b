use super::escape;
use crate::enrich::backfill_epics;
use crate::AppState;

/// Live lookup of one issue. Its epic is filled in from the parent when the
/// parent is part of the snapshot.
pub async fn issue_details(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(issue_key): axum::extract::Path<String>,
) -> Result<axum::response::Html<String>, (axum::http::StatusCode, String)> {
    let issue = state.jira_client.get_issue(&issue_key).await.map_err(|e| {
        tracing::warn!("Could not get issue {issue_key}: {e}");
        (axum::http::StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let parent = issue.parent_id.as_deref().and_then(|parent_id| {
        state
            .snapshot
            .issues
            .iter()
            .chain(&state.snapshot.sprint_issues)
            .chain(&state.snapshot.backlog)
            .find(|candidate| candidate.issue_id == parent_id)
    });
    let mut issues = parent.into_iter().cloned().collect::<Vec<_>>();
    issues.push(issue);
    let enriched = backfill_epics(&issues);
    let issue = enriched.last().ok_or((
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        "Issue lost during enrichment".to_string(),
    ))?;

    let columns = match serde_json::to_value(issue) {
        Ok(serde_json::Value::Object(columns)) => columns,
        _ => serde_json::Map::new(),
    };
    let rows = columns
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(column, value)| {
            let value = match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            format!("<tr><th>{}</th><td>{}</td></tr>", escape(column), escape(&value))
        })
        .collect::<Vec<_>>()
        .join("");

    Ok(axum::response::Html(format!(
        r#"
        <!DOCTYPE html>
        <html>
            <body>
                <h1>{}</h1>
                <table>{}</table>
                <a href="/">Back</a>
            </body>
        </html>
        "#,
        escape(&issue.issue_key),
        rows
    )))
}
