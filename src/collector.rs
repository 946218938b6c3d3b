use crate::config::ReportSettings;
use crate::enrich::*;
use crate::jira_client::*;
use crate::models::*;

/// Everything the dashboard shows, fetched once.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub boards: Vec<Board>,
    pub issues: Vec<Issue>,
    pub sprints: Vec<Sprint>,
    pub sprint_issues: Vec<Issue>,
    pub backlog: Vec<Issue>,
    /// One line per fetch that stopped early.
    pub incomplete: Vec<String>,
    pub fetched_at: String,
}

impl Snapshot {
    fn keep<T>(&mut self, what: &str, fetched: Fetched<T>) -> Vec<T> {
        if let Some(cause) = fetched.cause() {
            tracing::warn!("{what} incomplete after {} records: {cause}", fetched.records().len());
            self.incomplete.push(format!("{what}: {cause}"));
        }
        fetched.into_records()
    }
}

pub struct BoardIssues {
    pub sprints: Vec<Sprint>,
    pub issues: Fetched<Issue>,
}

/// Fetches every sprint of a board and then each sprint's issues, one sprint
/// at a time, and joins sprint columns onto the issues. If any fetch stops
/// early the result is `Aborted` with the first cause, but every record that
/// did arrive is kept.
pub async fn collect_board_issues(
    jira_client: &JiraClient,
    board_id: u64,
) -> Result<BoardIssues, JiraError> {
    let mut first_cause = None;

    let sprints = match jira_client.get_sprints(board_id).await? {
        Fetched::Complete(sprints) => sprints,
        Fetched::Aborted { partial, cause } => {
            first_cause = Some(cause);
            partial
        }
    };
    tracing::info!("Board {board_id}: {} sprints", sprints.len());

    let mut tagged = Vec::with_capacity(sprints.len());
    for sprint in &sprints {
        let issues = match jira_client.get_sprint_issues(sprint.sprint_id).await? {
            Fetched::Complete(issues) => issues,
            Fetched::Aborted { partial, cause } => {
                first_cause.get_or_insert(cause);
                partial
            }
        };
        tracing::info!("Sprint {} ({}): {} issues", sprint.sprint_id, sprint.sprint_name, issues.len());
        tagged.push((sprint.sprint_id, issues));
    }

    let joined = assemble_sprint_issues(&sprints, tagged);
    let issues = match first_cause {
        None => Fetched::Complete(joined),
        Some(cause) => Fetched::Aborted {
            partial: joined,
            cause,
        },
    };
    Ok(BoardIssues { sprints, issues })
}

pub async fn collect_snapshot(
    jira_client: &JiraClient,
    settings: &ReportSettings,
) -> Result<Snapshot, JiraError> {
    tracing::info!("Collecting data...");
    let mut snapshot = Snapshot {
        fetched_at: chrono::Utc::now().to_rfc3339(),
        ..Default::default()
    };

    let projects = jira_client.get_projects().await?;
    snapshot.projects = snapshot.keep("projects", projects);

    let boards = jira_client.get_boards().await?;
    snapshot.boards = snapshot.keep("boards", boards);

    if let Some(jql) = &settings.jql {
        let issues = jira_client.search_issues(jql).await?;
        let issues = snapshot.keep("issue search", issues);
        snapshot.issues = backfill_epics(&issues);
    }

    if let Some(board_id) = settings.board_id {
        let board = collect_board_issues(jira_client, board_id).await?;
        snapshot.sprints = board.sprints;
        let sprint_issues = snapshot.keep("sprint issues", board.issues);
        snapshot.sprint_issues = backfill_epics(&sprint_issues);

        let backlog = jira_client.get_backlog(board_id).await?;
        let backlog = snapshot.keep("backlog", backlog);
        snapshot.backlog = backfill_epics(&backlog);

        let project_key = snapshot
            .boards
            .iter()
            .find(|board| board.board_id == board_id)
            .and_then(|board| board.project_key.clone());
        if let Some(project_key) = project_key {
            match jira_client.get_project(&project_key).await {
                Ok(details) => match snapshot
                    .projects
                    .iter_mut()
                    .find(|project| project.project_key == project_key)
                {
                    Some(project) => project.versions = details.versions,
                    None => snapshot.projects.push(details),
                },
                Err(JiraError::Request(cause)) => {
                    tracing::warn!("Project {project_key} details unavailable: {cause}");
                    snapshot.incomplete.push(format!("project {project_key}: {cause}"));
                }
                Err(e) => return Err(e),
            }
        }
    }

    tracing::info!(
        "Data collected: {} issues, {} sprint issues, {} backlog issues",
        snapshot.issues.len(),
        snapshot.sprint_issues.len(),
        snapshot.backlog.len()
    );
    Ok(snapshot)
}
