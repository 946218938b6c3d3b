mod collector;
mod config;
mod enrich;
mod jira_client;
mod models;
mod projection;
mod renderer;
mod report;
mod routes;

use collector::*;
use config::*;
use jira_client::*;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<Snapshot>,
    jira_client: Arc<JiraClient>,
}

// Requests are issued one at a time, so a single thread is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jira_sprint_reporter_rust=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ReportSettings::from_env().expect("Invalid report settings");
    let jira_client =
        JiraClient::new(&JiraConfig::from_env()).expect("Could not create Jira client");

    let snapshot = collect_snapshot(&jira_client, &settings)
        .await
        .expect("Could not collect data");

    let state = AppState {
        snapshot: Arc::new(snapshot),
        jira_client: Arc::new(jira_client),
    };

    let app = axum::Router::new()
        .route("/", axum::routing::get(routes::root::root))
        .route(
            "/chart/{dimension}/{kind}",
            axum::routing::get(routes::chart::chart_svg),
        )
        .route(
            "/issue/{issue_key}",
            axum::routing::get(routes::issue::issue_details),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(settings.bind_address.as_str())
        .await
        .unwrap_or_else(|e| panic!("Could not bind to {}: {e}", settings.bind_address));
    tracing::info!("Serving report on {}", settings.bind_address);
    axum::serve(listener, app)
        .await
        .expect("Could not start server");
}
