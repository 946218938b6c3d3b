use crate::config::JiraConfig;
use crate::models::*;
use crate::projection::*;
use serde_json::Value;
use thiserror::Error;

pub const PAGE_SIZE: usize = 100;

/// A failed request. Captured at the client boundary and handed back as a
/// value; pagination turns it into `Fetched::Aborted`.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Request to Jira failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Jira answered {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
}

#[derive(Error, Debug)]
pub enum JiraError {
    #[error("Could not build HTTP client: {0}")]
    Client(String),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("Response from {path} is not valid JSON: {source}")]
    Decode {
        path: String,
        source: reqwest::Error,
    },
    #[error("Response from {path} has no array under {key:?}")]
    MissingKey { key: String, path: String },
    #[error("Record does not match the expected columns: {0}")]
    Record(#[from] serde_json::Error),
}

pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self, JiraError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::AUTHORIZATION,
            config
                .basic_auth_header()
                .parse::<reqwest::header::HeaderValue>()
                .map_err(|e| JiraError::Client(e.to_string()))?,
        );

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .build()
                .map_err(|e| JiraError::Client(e.to_string()))?,
            base_url: config.base_url.clone(),
            page_size: PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Authenticated GET. Logs one line per request and never panics on
    /// transport or status failures.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response, RequestError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = match request.send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => Err(RequestError::Status {
                status: response.status(),
                url: response.url().to_string(),
            }),
            Err(e) => Err(RequestError::Transport(e)),
        };

        match &result {
            Ok(response) => tracing::info!("GET {} -> {}", response.url(), response.status()),
            Err(e) => tracing::warn!("GET {url} failed: {e}"),
        }
        result
    }

    async fn get_json(&self, path: &str) -> Result<Value, JiraError> {
        self.get(path, &[], None)
            .await?
            .json::<Value>()
            .await
            .map_err(|source| JiraError::Decode {
                path: path.to_string(),
                source,
            })
    }

    /// Walks `startAt` forward one page at a time until a page comes back
    /// empty. A short page does not end the walk. A failed request ends it
    /// with `Fetched::Aborted` and the rows gathered so far; an unexpected
    /// body shape is an error.
    pub async fn get_paginated(
        &self,
        path: &str,
        result_key: &str,
        extra: &[(&str, String)],
    ) -> Result<Fetched<Row>, JiraError> {
        let mut rows: Vec<Row> = Vec::new();
        let mut start_at = 0;

        loop {
            let mut query = vec![
                ("startAt", start_at.to_string()),
                ("maxResults", self.page_size.to_string()),
            ];
            query.extend(extra.iter().cloned());

            let response = match self.get(path, &query, None).await {
                Ok(response) => response,
                Err(cause) => {
                    return Ok(Fetched::Aborted {
                        partial: rows,
                        cause,
                    })
                }
            };

            let mut body = response
                .json::<Value>()
                .await
                .map_err(|source| JiraError::Decode {
                    path: path.to_string(),
                    source,
                })?;
            let page = match body.get_mut(result_key).map(Value::take) {
                Some(Value::Array(page)) => page,
                _ => {
                    return Err(JiraError::MissingKey {
                        key: result_key.to_string(),
                        path: path.to_string(),
                    })
                }
            };

            if page.is_empty() {
                break;
            }
            rows.extend(page.iter().map(flatten));
            start_at += self.page_size;
        }

        tracing::debug!("{path}: {} {result_key} fetched", rows.len());
        Ok(Fetched::Complete(rows))
    }

    async fn get_records<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        result_key: &str,
        extra: &[(&str, String)],
        fields: FieldMap,
    ) -> Result<Fetched<T>, JiraError> {
        let fetched = self.get_paginated(path, result_key, extra).await?;
        Ok(fetched.try_map(|row| from_row(project(&row, fields)))?)
    }

    pub async fn search_issues(&self, jql: &str) -> Result<Fetched<Issue>, JiraError> {
        self.get_records(
            "/rest/api/latest/search",
            "issues",
            &[("jql", jql.to_string())],
            ISSUE_FIELDS,
        )
        .await
    }

    pub async fn get_projects(&self) -> Result<Fetched<Project>, JiraError> {
        self.get_records("/rest/api/latest/project/search", "values", &[], PROJECT_FIELDS)
            .await
    }

    /// Single project including its versions.
    pub async fn get_project(&self, key: &str) -> Result<Project, JiraError> {
        let body = self
            .get_json(&format!("/rest/api/latest/project/{key}"))
            .await?;
        let mut details: Project = from_row(project_row(&body, PROJECT_FIELDS))?;
        if let Some(Value::Array(versions)) = body.get("versions") {
            details.versions = versions
                .iter()
                .map(|version| from_row(project_row(version, VERSION_FIELDS)))
                .collect::<Result<_, _>>()?;
        }
        Ok(details)
    }

    pub async fn get_boards(&self) -> Result<Fetched<Board>, JiraError> {
        self.get_records("/rest/agile/1.0/board", "values", &[], BOARD_FIELDS)
            .await
    }

    pub async fn get_sprints(&self, board_id: u64) -> Result<Fetched<Sprint>, JiraError> {
        self.get_records(
            &format!("/rest/agile/1.0/board/{board_id}/sprint"),
            "values",
            &[],
            SPRINT_FIELDS,
        )
        .await
    }

    pub async fn get_backlog(&self, board_id: u64) -> Result<Fetched<Issue>, JiraError> {
        self.get_records(
            &format!("/rest/agile/1.0/board/{board_id}/backlog"),
            "issues",
            &[],
            ISSUE_FIELDS,
        )
        .await
    }

    pub async fn get_sprint_issues(&self, sprint_id: u64) -> Result<Fetched<Issue>, JiraError> {
        self.get_records(
            &format!("/rest/agile/1.0/sprint/{sprint_id}/issue"),
            "issues",
            &[],
            ISSUE_FIELDS,
        )
        .await
    }

    pub async fn get_issue(&self, key: &str) -> Result<Issue, JiraError> {
        let body = self
            .get_json(&format!("/rest/agile/1.0/issue/{key}"))
            .await?;
        Ok(from_row(project_row(&body, ISSUE_FIELDS))?)
    }
}

fn project_row(value: &Value, fields: FieldMap) -> Row {
    project(&flatten(value), fields)
}
