use super::IssueSource;
use crate::enrich::DEFAULT_DISPLAY_COLOR;
use crate::models::Issue;
use crate::renderer::{Renderer, Slice};
use crate::report::{aggregate, Dimension};
use crate::AppState;
use serde::Deserialize;
use std::collections::HashMap;

const PALETTE: [&str; 8] = [
    "#4A90E2", "#E74C3C", "#2ECC71", "#F1C40F", "#9B59B6", "#1ABC9C", "#E67E22", "#95A5A6",
];

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    #[default]
    Points,
    Count,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub source: IssueSource,
    #[serde(default)]
    pub measure: Measure,
}

/// Chart slices for one dimension. Epic groups use their epic's display
/// color, everything else cycles through the palette.
pub fn slices(issues: &[Issue], dimension: Dimension, measure: Measure) -> Vec<Slice> {
    let epic_colors: HashMap<&str, &str> = issues
        .iter()
        .filter_map(|issue| {
            Some((
                issue.epic_name.as_deref()?,
                issue.epic_display_color.as_deref()?,
            ))
        })
        .collect();

    aggregate(issues, &[dimension])
        .into_iter()
        .enumerate()
        .map(|(index, group)| {
            let label = group.key.join(" / ");
            let color = match dimension {
                Dimension::EpicName => epic_colors
                    .get(label.as_str())
                    .copied()
                    .unwrap_or(DEFAULT_DISPLAY_COLOR),
                _ => PALETTE[index % PALETTE.len()],
            };
            Slice {
                value: match measure {
                    Measure::Points => group.story_points,
                    Measure::Count => group.issue_count as f64,
                },
                color: color.to_string(),
                label,
            }
        })
        .collect()
}

pub async fn chart_svg(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path((dimension, kind)): axum::extract::Path<(String, String)>,
    axum::extract::Query(query): axum::extract::Query<ChartQuery>,
) -> impl axum::response::IntoResponse {
    let Some(dimension) = Dimension::from_slug(&dimension) else {
        return Err((axum::http::StatusCode::NOT_FOUND, format!("Unknown dimension {dimension}")));
    };

    let slices = slices(query.source.issues(&state.snapshot), dimension, query.measure);
    let renderer = Renderer::new(400, 200, 10);
    let svg_content = match kind.as_str() {
        "bar.svg" => renderer.render_bar_chart(&slices),
        "pie.svg" => renderer.render_pie_chart(&slices),
        _ => return Err((axum::http::StatusCode::NOT_FOUND, format!("Unknown chart {kind}"))),
    };

    Ok((
        [(axum::http::header::CONTENT_TYPE, "image/svg+xml")],
        svg_content,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(epic: &str, color: &str, points: f64) -> Issue {
        Issue {
            issue_id: format!("{epic}-{points}"),
            issue_key: "ABC-1".to_string(),
            issue_type: Some("Story".to_string()),
            epic_name: Some(epic.to_string()),
            epic_display_color: Some(color.to_string()),
            story_points: Some(points),
            ..Default::default()
        }
    }

    #[test]
    fn epic_slices_use_epic_colors() {
        let issues = vec![
            issue("Checkout", "darkorange", 3.0),
            issue("Checkout", "darkorange", 2.0),
            issue("No Epic", "white", 1.0),
        ];
        let slices = slices(&issues, Dimension::EpicName, Measure::Points);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "Checkout");
        assert_eq!(slices[0].color, "darkorange");
        assert_eq!(slices[0].value, 5.0);
        assert_eq!(slices[1].color, "white");
    }

    #[test]
    fn count_measure_counts_issues() {
        let issues = vec![issue("A", "green", 3.0), issue("A", "green", 0.5)];
        let slices = slices(&issues, Dimension::IssueType, Measure::Count);
        assert_eq!(slices[0].label, "Story");
        assert_eq!(slices[0].value, 2.0);
        assert_eq!(slices[0].color, PALETTE[0]);
    }
}
