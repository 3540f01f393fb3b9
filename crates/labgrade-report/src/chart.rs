//! Chart rendering with plotters' SVG backend.

use std::ops::Range;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use labgrade_core::chart::{Axis, BarChart, Chart, ChartKind, ScatterPlot};

const SIZE: (u32, u32) = (720, 440);

const PALETTE: [RGBColor; 5] = [
    RGBColor(37, 99, 235),
    RGBColor(220, 38, 38),
    RGBColor(22, 163, 74),
    RGBColor(202, 138, 4),
    RGBColor(147, 51, 234),
];

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Render a chart to a standalone SVG document.
pub fn render_svg(chart: &Chart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        match &chart.kind {
            ChartKind::Scatter(plot) => draw_scatter(&root, chart, plot)?,
            ChartKind::Bars(bars) => draw_bars(&root, chart, bars)?,
        }
        root.present()?;
    }
    Ok(svg)
}

fn draw_scatter(root: &Area<'_>, chart: &Chart, plot: &ScatterPlot) -> Result<()> {
    let finite = |&(x, y): &(f64, f64)| x.is_finite() && y.is_finite();
    let points: Vec<(f64, f64)> = plot.points.iter().copied().filter(finite).collect();
    let curve: Vec<(f64, f64)> = plot
        .curve
        .iter()
        .flat_map(|c| c.points.iter().copied())
        .filter(finite)
        .collect();

    let mut xs: Vec<f64> = points.iter().chain(&curve).map(|p| p.0).collect();
    let mut ys: Vec<f64> = points.iter().chain(&curve).map(|p| p.1).collect();
    for marker in plot.markers.iter().filter(|m| m.value.is_finite()) {
        match marker.axis {
            Axis::X => xs.push(marker.value),
            Axis::Y => ys.push(marker.value),
        }
    }
    let x_range = padded(&xs);
    let y_range = padded(&ys);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let point_color = PALETTE[0];
    ctx.draw_series(points.iter().map(|&p| Circle::new(p, 4, point_color.filled())))?
        .label("Measured")
        .legend(move |(x, y)| Circle::new((x, y), 4, point_color.filled()));

    if let Some(fitted) = &plot.curve {
        let curve_color = PALETTE[1];
        ctx.draw_series(LineSeries::new(curve.iter().copied(), curve_color.stroke_width(2)))?
            .label(fitted.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], curve_color));
    }

    for (i, marker) in plot.markers.iter().filter(|m| m.value.is_finite()).enumerate() {
        let color = PALETTE[(i + 2) % PALETTE.len()];
        let line = match marker.axis {
            Axis::X => vec![(marker.value, y_range.start), (marker.value, y_range.end)],
            Axis::Y => vec![(x_range.start, marker.value), (x_range.end, marker.value)],
        };
        ctx.draw_series(std::iter::once(PathElement::new(line, color.mix(0.8))))?
            .label(marker.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_bars(root: &Area<'_>, chart: &Chart, bars: &BarChart) -> Result<()> {
    let groups = bars.categories.len().max(1);
    let values: Vec<f64> = bars
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .filter(|v| v.is_finite())
        .collect();
    let low = values.iter().copied().fold(0.0_f64, f64::min);
    let mut high = values.iter().copied().fold(0.0_f64, f64::max);
    if high <= low {
        high = low + 1.0;
    }
    let span = high - low;
    let y_range = if low < 0.0 { low - span * 0.1 } else { 0.0 }..high + span * 0.1;

    let categories = &bars.categories;
    let label_category = |x: &f64| {
        let nearest = x.round();
        if (x - nearest).abs() < 1e-6 && nearest >= 0.0 {
            categories.get(nearest as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(groups as f64 - 0.5), y_range)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(groups)
        .x_label_formatter(&label_category)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let width = 0.8 / bars.series.len().max(1) as f64;
    for (j, series) in bars.series.iter().enumerate() {
        let color = PALETTE[j % PALETTE.len()];
        let rects = series
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(move |(i, &v)| {
                let x0 = i as f64 - 0.4 + j as f64 * width;
                Rectangle::new([(x0, 0.0), (x0 + width, v)], color.filled())
            });
        ctx.draw_series(rects)?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 14, y + 5)], color.filled()));
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

/// Data extent plus a 5 % margin; never empty.
fn padded(values: &[f64]) -> Range<f64> {
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !low.is_finite() || !high.is_finite() {
        return 0.0..1.0;
    }
    let span = if high > low { high - low } else { low.abs().max(1.0) };
    (low - span * 0.05)..(high + span * 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_with_curve_and_marker() {
        let chart = Chart::scatter(
            "Onion plasmolysis",
            "Ψπ (MPa)",
            "Plasmolysis (%)",
            vec![(-1.72, 100.0), (-0.98, 45.0), (-0.25, 0.0)],
        )
        .with_curve("Sigmoid fit", 50, |x| 100.0 / (1.0 + (-(x + 1.0) / -0.1).exp()))
        .with_marker("50 %", Axis::Y, 50.0);
        let svg = render_svg(&chart).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Onion plasmolysis"));
        assert!(svg.contains("Sigmoid fit"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn grouped_bars_name_their_series() {
        let chart = Chart::bars(
            "Coleoptile growth",
            "Treatment",
            "Variation (%)",
            vec!["Control".into(), "AIA 10^-6 M".into()],
        )
        .with_series("Student", vec![21.0, 45.0])
        .with_series("Expected", vec![21.0, 45.0]);
        let svg = render_svg(&chart).unwrap();
        assert!(svg.contains("Student"));
        assert!(svg.contains("Expected"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn empty_scatter_still_renders() {
        let chart = Chart::scatter("Nothing", "x", "y", vec![]);
        assert!(render_svg(&chart).is_ok());
    }

    #[test]
    fn padding_handles_a_single_value() {
        let range = padded(&[2.0]);
        assert!(range.start < 2.0 && range.end > 2.0);
        assert_eq!(padded(&[]), 0.0..1.0);
    }
}
