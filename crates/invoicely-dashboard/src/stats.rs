//! Stat cards and chart points.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Direction of a stat compared with the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    /// Trend from the sign of a change. NaN counts as stable.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Stable
        }
    }
}

/// How the UI should render a stat value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatFormat {
    #[default]
    Count,
    Currency,
    Percent,
}

/// One stat card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub title: String,
    pub value: f64,
    pub change: f64,
    pub change_percent: f64,
    pub trend: Trend,
    pub format: StatFormat,
}

impl DashboardStats {
    /// Build a stat by comparing the current period with the previous one.
    ///
    /// `change_percent` is relative to `previous` and rounded to one decimal.
    /// Growth from zero reports 100, and zero to zero reports 0.
    pub fn compare(
        title: impl Into<String>,
        current: f64,
        previous: f64,
        format: StatFormat,
    ) -> Self {
        let current = finite_or_zero(current);
        let previous = finite_or_zero(previous);
        let change = current - previous;

        let change_percent = if previous == 0.0 {
            if current > 0.0 {
                100.0
            } else if current < 0.0 {
                -100.0
            } else {
                0.0
            }
        } else {
            round1(change / previous.abs() * 100.0)
        };

        Self {
            title: title.into(),
            value: current,
            change,
            change_percent,
            trend: Trend::from_change(change),
            format,
        }
    }
}

/// One point in a chart series. `value` is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChartData {
    /// Negative and non-finite values are clamped to 0.
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: clamp_non_negative(value),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Build a series from `(label, value)` pairs.
    pub fn series<I, S>(points: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        points
            .into_iter()
            .map(|(label, value)| Self::new(label, value))
            .collect()
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn clamp_non_negative(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
