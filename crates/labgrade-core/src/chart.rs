//! Explicit figure descriptions.
//!
//! Each exercise returns the charts it wants drawn as plain data; rendering
//! happens in `labgrade-report`.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    Scatter(ScatterPlot),
    Bars(BarChart),
}

/// Measured points with an optional fitted curve and reference lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterPlot {
    pub points: Vec<(f64, f64)>,
    #[serde(default)]
    pub curve: Option<Curve>,
    #[serde(default)]
    pub markers: Vec<ReferenceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub label: String,
    pub axis: Axis,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// A vertical line at `x = value`.
    X,
    /// A horizontal line at `y = value`.
    Y,
}

/// Grouped bars: one group per category, one bar per series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub label: String,
    /// NaN marks a missing entry; it is written to JSON as `null`.
    #[serde(deserialize_with = "null_as_nan")]
    pub values: Vec<f64>,
}

fn null_as_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let values: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

impl Chart {
    pub fn scatter(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        points: Vec<(f64, f64)>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            kind: ChartKind::Scatter(ScatterPlot {
                points,
                ..Default::default()
            }),
        }
    }

    pub fn bars(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        categories: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            kind: ChartKind::Bars(BarChart {
                categories,
                series: Vec::new(),
            }),
        }
    }

    /// Attach a curve sampled from `f` at `samples` evenly spaced x values
    /// spanning the measured points. No-op for bar charts.
    pub fn with_curve(mut self, label: impl Into<String>, samples: usize, f: impl Fn(f64) -> f64) -> Self {
        if let ChartKind::Scatter(plot) = &mut self.kind {
            let (lo, hi) = x_extent(&plot.points);
            let samples = samples.max(2);
            let step = (hi - lo) / (samples - 1) as f64;
            let points = (0..samples)
                .map(|i| {
                    let x = lo + step * i as f64;
                    (x, f(x))
                })
                .filter(|(_, y)| y.is_finite())
                .collect();
            plot.curve = Some(Curve {
                label: label.into(),
                points,
            });
        }
        self
    }

    /// Add a reference line. No-op for bar charts.
    pub fn with_marker(mut self, label: impl Into<String>, axis: Axis, value: f64) -> Self {
        if let ChartKind::Scatter(plot) = &mut self.kind {
            plot.markers.push(ReferenceLine {
                label: label.into(),
                axis,
                value,
            });
        }
        self
    }

    /// Add a bar series. No-op for scatter plots.
    pub fn with_series(mut self, label: impl Into<String>, values: Vec<f64>) -> Self {
        if let ChartKind::Bars(bars) = &mut self.kind {
            bars.series.push(BarSeries {
                label: label.into(),
                values,
            });
        }
        self
    }
}

fn x_extent(points: &[(f64, f64)]) -> (f64, f64) {
    let lo = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_spans_the_measured_points() {
        let chart = Chart::scatter("t", "x", "y", vec![(-2.0, 1.0), (0.0, 3.0)])
            .with_curve("fit", 5, |x| 2.0 * x)
            .with_marker("x0", Axis::X, -1.0);
        let ChartKind::Scatter(plot) = chart.kind else {
            panic!("expected a scatter plot");
        };
        let curve = plot.curve.unwrap();
        assert_eq!(curve.points.len(), 5);
        assert_eq!(curve.points[0], (-2.0, -4.0));
        assert_eq!(curve.points[4], (0.0, 0.0));
        assert_eq!(plot.markers.len(), 1);
    }

    #[test]
    fn series_only_apply_to_bars() {
        let bars = Chart::bars("t", "x", "y", vec!["a".into(), "b".into()]).with_series("s", vec![1.0, 2.0]);
        let scatter = Chart::scatter("t", "x", "y", vec![]).with_series("s", vec![1.0]);
        assert!(matches!(bars.kind, ChartKind::Bars(ref b) if b.series.len() == 1));
        assert!(matches!(scatter.kind, ChartKind::Scatter(ref s) if s.curve.is_none()));
    }

    #[test]
    fn missing_bar_survives_json() {
        let bars = Chart::bars("t", "x", "y", vec!["a".into(), "b".into()])
            .with_series("s", vec![1.5, f64::NAN]);
        let json = serde_json::to_string(&bars).unwrap();
        assert!(json.contains("[1.5,null]"), "{json}");
        let back: Chart = serde_json::from_str(&json).unwrap();
        let ChartKind::Bars(b) = back.kind else {
            panic!("expected bars");
        };
        assert_eq!(b.series[0].values[0], 1.5);
        assert!(b.series[0].values[1].is_nan());
    }
}
