use super::{escape, IssueSource};
use crate::collector::Snapshot;
use crate::report::{aggregate, totals, Dimension};
use crate::AppState;
use itertools::Itertools;

fn summary_table(snapshot: &Snapshot, source: IssueSource, dimensions: &[Dimension]) -> String {
    let groups = aggregate(source.issues(snapshot), dimensions);
    let (points, count) = totals(&groups);

    let header = dimensions
        .iter()
        .map(|dimension| format!("<th>{}</th>", dimension.title()))
        .join("");
    let rows = groups
        .iter()
        .map(|group| {
            format!(
                "<tr>{}<td>{}</td><td>{}</td></tr>",
                group.key.iter().map(|value| format!("<td>{}</td>", escape(value))).join(""),
                group.story_points,
                group.issue_count
            )
        })
        .join("");
    let charts = match dimensions {
        [dimension] => format!(
            r#"<div><img src="/chart/{slug}/bar.svg?source={source}"> <img src="/chart/{slug}/pie.svg?source={source}&measure=count"></div>"#,
            slug = dimension.slug(),
            source = source.name()
        ),
        _ => String::new(),
    };

    format!(
        r#"<h3>{}</h3>
        <table>
            <tr>{header}<th>Story points</th><th>Issues</th></tr>
            {rows}
            <tr><td colspan="{span}"><b>Total</b></td><td>{points}</td><td>{count}</td></tr>
        </table>
        {charts}"#,
        dimensions.iter().map(|dimension| dimension.title()).join(" / "),
        span = dimensions.len(),
    )
}

fn sprint_list(snapshot: &Snapshot) -> String {
    if snapshot.sprints.is_empty() {
        return String::new();
    }
    let rows = snapshot
        .sprints
        .iter()
        .map(|sprint| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&sprint.sprint_name),
                escape(sprint.sprint_state.as_deref().unwrap_or("")),
                escape(sprint.sprint_goal.as_deref().unwrap_or("")),
                escape(sprint.sprint_start.as_deref().unwrap_or("")),
                escape(sprint.sprint_end.as_deref().unwrap_or("")),
                escape(sprint.sprint_complete.as_deref().unwrap_or("")),
            )
        })
        .join("");
    format!(
        "<h2>Sprint list</h2><table><tr><th>Sprint</th><th>State</th><th>Goal</th><th>Start</th><th>End</th><th>Completed</th></tr>{rows}</table>"
    )
}

pub async fn root(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::response::Html<String> {
    let snapshot = &state.snapshot;

    let warnings = snapshot
        .incomplete
        .iter()
        .map(|line| format!("<li>{}</li>", escape(line)))
        .join("");
    let banner = if warnings.is_empty() {
        format!("<p>Fetched at {}</p>", snapshot.fetched_at)
    } else {
        format!(
            "<p>Fetched at {}. Some fetches stopped early, figures are partial:</p><ul>{}</ul>",
            snapshot.fetched_at, warnings
        )
    };

    let mut sections = Vec::new();
    if !snapshot.issues.is_empty() {
        sections.push("<h2>Issue search</h2>".to_string());
        for dimensions in [
            &[Dimension::IssueType, Dimension::StatusCategory][..],
            &[Dimension::Priority][..],
            &[Dimension::EpicName][..],
            &[Dimension::ProjectName][..],
        ] {
            sections.push(summary_table(snapshot, IssueSource::Search, dimensions));
        }
    }
    if !snapshot.sprint_issues.is_empty() {
        sections.push("<h2>Sprints</h2>".to_string());
        for dimensions in [
            &[Dimension::SprintName, Dimension::SprintStart, Dimension::SprintEnd][..],
            &[Dimension::SprintName, Dimension::StatusCategory][..],
            &[Dimension::EpicName][..],
            &[Dimension::Assignee][..],
        ] {
            sections.push(summary_table(snapshot, IssueSource::Sprint, dimensions));
        }
    }
    if !snapshot.backlog.is_empty() {
        sections.push("<h2>Backlog</h2>".to_string());
        sections.push(summary_table(snapshot, IssueSource::Backlog, &[Dimension::IssueType]));
    }

    let sprints = sprint_list(snapshot);

    let boards = snapshot
        .boards
        .iter()
        .map(|board| {
            format!(
                "<li>{}: {} ({})</li>",
                board.board_id,
                escape(&board.board_name),
                escape(board.project_name.as_deref().unwrap_or("no project"))
            )
        })
        .join("");
    let projects = snapshot
        .projects
        .iter()
        .map(|project| {
            let versions = project
                .versions
                .iter()
                .map(|version| {
                    format!(
                        "{} ({})",
                        escape(&version.version_name),
                        version.release_date.as_deref().unwrap_or("unscheduled")
                    )
                })
                .join(", ");
            format!(
                "<li>{}: {} {}</li>",
                escape(&project.project_key),
                escape(&project.project_name),
                versions
            )
        })
        .join("");

    axum::response::Html(format!(
        r#"
        <!DOCTYPE html>
        <html>
            <body>
                <h1>Jira report</h1>
                {banner}
                {}
                {sprints}
                <h2>Boards</h2>
                <ul>{boards}</ul>
                <h2>Projects</h2>
                <ul>{projects}</ul>
            </body>
        </html>
        "#,
        sections.join("\n")
    ))
}
