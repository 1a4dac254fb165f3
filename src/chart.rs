//! Chart specification builder
//!
//! Produces a renderer-agnostic chart description from an assembled
//! payload. Building never fails: a payload with nothing to plot yields an
//! empty line chart.

use crate::assembler::{InsightPayload, TrendPoint};
use crate::store::{NumericField, PhysiologicalRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Query words that ask for a time-based view
const TREND_KEYWORDS: [&str; 3] = ["trend", "over time", "timeline"];

/// Kind of chart
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    MirrorTrend,
    Scatter,
    Line,
}

impl ChartType {
    fn color(&self) -> &'static str {
        match self {
            ChartType::MirrorTrend | ChartType::Line => "rgb(59, 130, 246)",
            ChartType::Scatter => "rgb(236, 72, 153)",
        }
    }
}

/// X coordinate of a point
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AxisValue {
    Date(NaiveDate),
    Time(DateTime<Utc>),
    Number(f64),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ChartPoint {
    pub x: AxisValue,
    pub y: f64,
}

/// One plotted series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Series {
    pub name: String,
    /// Source field key, e.g. "hrv" or "focus"
    pub field: String,
    pub color: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Axis {
    pub title: String,
    pub show_grid: bool,
}

impl Axis {
    fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            show_grid: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Layout {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub hovermode: String,
    pub template: String,
    pub show_legend: bool,
}

impl Layout {
    fn new(title: impl Into<String>, x: impl Into<String>, y: impl Into<String>, legend: bool) -> Self {
        Self {
            title: title.into(),
            x_axis: Axis::titled(x),
            y_axis: Axis::titled(y),
            hovermode: "closest".to_string(),
            template: "plotly_white".to_string(),
            show_legend: legend,
        }
    }
}

/// Complete chart description
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub series: Vec<Series>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// Stateless chart stage
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartSpecBuilder;

impl ChartSpecBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Pick and build the chart for a payload
    pub fn build(&self, payload: &InsightPayload) -> ChartSpec {
        let trend = payload.trend();
        let records = &payload.stats().records;

        let spec = if !trend.is_empty() {
            mirror_trend_chart(trend)
        } else if records.is_empty() {
            empty_chart()
        } else if wants_trend(payload.query()) {
            timeline_chart(records)
        } else {
            scatter_chart(records, NumericField::StressScore, NumericField::Hrv)
        };

        tracing::debug!(
            chart_type = ?spec.chart_type,
            series = spec.series.len(),
            "Built chart spec"
        );
        spec
    }
}

/// Whether the query asks for a time-based view
pub fn wants_trend(query: &str) -> bool {
    let lower = query.to_lowercase();
    TREND_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn mirror_trend_chart(trend: &[TrendPoint]) -> ChartSpec {
    let color = ChartType::MirrorTrend.color();
    let series_for = |name: &str, field: &str, value: fn(&TrendPoint) -> f64, color: &str| Series {
        name: name.to_string(),
        field: field.to_string(),
        color: color.to_string(),
        points: trend
            .iter()
            .map(|p| ChartPoint {
                x: AxisValue::Date(p.date),
                y: value(p),
            })
            .collect(),
    };

    let series = vec![
        series_for("HRV", "hrv", |p| p.hrv, color),
        series_for("Stress", "stress", |p| p.stress, "rgb(249, 115, 22)"),
        series_for("Focus", "focus", |p| p.focus, "rgb(34, 197, 94)"),
    ];
    let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
    let layout = Layout::new(
        format!("Daily {}", join_labels(&names)),
        "Date",
        names.join(" / "),
        true,
    );

    ChartSpec {
        chart_type: ChartType::MirrorTrend,
        series,
        layout,
    }
}

fn timeline_chart(records: &[PhysiologicalRecord]) -> ChartSpec {
    let fields = [NumericField::Hrv, NumericField::StressScore];
    let colors = [ChartType::Line.color(), "rgb(249, 115, 22)"];
    let labels: Vec<&str> = fields.iter().map(|f| f.label()).collect();

    let series = fields
        .iter()
        .zip(colors)
        .map(|(&field, color)| Series {
            name: field.label().to_string(),
            field: field.name().to_string(),
            color: color.to_string(),
            points: records
                .iter()
                .filter_map(|r| {
                    r.value(field).map(|y| ChartPoint {
                        x: AxisValue::Time(r.timestamp),
                        y,
                    })
                })
                .collect(),
        })
        .collect();

    ChartSpec {
        chart_type: ChartType::Line,
        series,
        layout: Layout::new(
            format!("{} over time", join_labels(&labels)),
            "Time",
            labels.join(" / "),
            true,
        ),
    }
}

fn scatter_chart(records: &[PhysiologicalRecord], x: NumericField, y: NumericField) -> ChartSpec {
    let points = records
        .iter()
        .filter_map(|r| match (r.value(x), r.value(y)) {
            (Some(xv), Some(yv)) => Some(ChartPoint {
                x: AxisValue::Number(xv),
                y: yv,
            }),
            _ => None,
        })
        .collect();

    ChartSpec {
        chart_type: ChartType::Scatter,
        series: vec![Series {
            name: format!("{} vs {}", y.label(), x.label()),
            field: y.name().to_string(),
            color: ChartType::Scatter.color().to_string(),
            points,
        }],
        layout: Layout::new(
            format!("{} vs {}", y.label(), x.label()),
            axis_title(x),
            axis_title(y),
            false,
        ),
    }
}

fn empty_chart() -> ChartSpec {
    ChartSpec {
        chart_type: ChartType::Line,
        series: Vec::new(),
        layout: Layout::new("No data in the selected window", "Time", "Value", false),
    }
}

/// "A", "A and B", "A, B and C"
fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn axis_title(field: NumericField) -> String {
    match field.unit() {
        "" => field.label().to_string(),
        unit => format!("{} ({})", field.label(), unit),
    }
}
