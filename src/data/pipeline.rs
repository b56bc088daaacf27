use super::aggregate::{chart_data, describe, summary_metrics, ChartData, Describe, SummaryMetrics};
use super::filter::{
    age_bounds, apply_ranges, categorical_indices, height_bounds, FilterState, RangeControl,
};
use super::model::{format_number, StudentTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A user-facing message produced while evaluating the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: String) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message,
        }
    }
}

pub const NO_DATA_MESSAGE: &str = "No students remain after applying the filters.";

/// Outcome of one pass over the filters.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Categorical/group filters left nothing; downstream work was skipped.
    NoData,
    Ready(Box<DashboardView>),
}

/// Everything the rendering layer needs for one interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Rows passing the categorical and group filters.
    pub categorical: Vec<usize>,
    /// Rows passing every filter, ranges included.
    pub indices: Vec<usize>,
    pub age: RangeControl,
    pub height: RangeControl,
    pub age_applied: (i64, i64),
    pub height_applied: (i64, i64),
    pub metrics: SummaryMetrics,
    pub charts: ChartData,
    pub height_stats: Describe,
    pub weight_stats: Describe,
    pub bmi_stats: Describe,
    pub notices: Vec<Notice>,
}

/// Age and height bounds for the rows passing the categorical filters.
pub fn range_controls(table: &StudentTable, filters: &FilterState) -> (RangeControl, RangeControl) {
    let categorical = categorical_indices(table, filters);
    (age_bounds(table, &categorical), height_bounds(table, &categorical))
}

/// Run the filter & aggregate stage against an immutable prepared table.
pub fn evaluate(table: &StudentTable, filters: &FilterState) -> Evaluation {
    let categorical = categorical_indices(table, filters);
    if categorical.is_empty() {
        log::debug!("Filters left no rows");
        return Evaluation::NoData;
    }

    let mut notices = Vec::new();

    let age = age_bounds(table, &categorical);
    if !age.valid {
        log::warn!("No valid ages in the filtered subset; using [0, 1]");
        notices.push(Notice::warning(
            "No valid ages with the current filters.".to_string(),
        ));
    }
    if let Some(single) = age.single {
        notices.push(Notice::info(format!(
            "All students are {} years old.",
            format_number(single)
        )));
    }

    let height = height_bounds(table, &categorical);
    if !height.valid {
        log::warn!("No valid heights in the filtered subset; using [0, 1]");
        notices.push(Notice::warning(
            "No valid heights with the current filters.".to_string(),
        ));
    }
    if let Some(single) = height.single {
        notices.push(Notice::info(format!(
            "All students are {} cm tall.",
            format_number(single)
        )));
    }

    let age_applied = age.resolve(filters.age_range);
    let height_applied = height.resolve(filters.height_range);
    let indices = apply_ranges(table, &categorical, age_applied, height_applied);

    let rows = || indices.iter().map(move |&i| &table.records[i]);
    Evaluation::Ready(Box::new(DashboardView {
        metrics: summary_metrics(table, &indices),
        charts: chart_data(table, &indices),
        height_stats: describe(rows().map(|r| r.height_cm)),
        weight_stats: describe(rows().map(|r| r.weight)),
        bmi_stats: describe(rows().map(|r| r.bmi)),
        categorical,
        indices,
        age,
        height,
        age_applied,
        height_applied,
        notices,
    }))
}
