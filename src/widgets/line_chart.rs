//! Line chart drawn on a ratatui canvas.
//!
//! Records are grouped by a series field; each series is scaled on its own
//! from zero to its maximum x/y and drawn as a smoothed polyline. Scaling is
//! computed in pixel space (origin top-left) and flipped back when painted.

use crate::error::{Axis, ChartError};
use crate::model::{Record, Scalar};
use crate::widgets::chrome::panel_block;
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};

pub const PALETTE: [(&str, Color); 7] = [
    ("red", Color::Red),
    ("orange", Color::Rgb(255, 165, 0)),
    ("yellow", Color::Yellow),
    ("green", Color::Green),
    ("blue", Color::Blue),
    ("purple", Color::Rgb(128, 0, 128)),
    ("violet", Color::Rgb(238, 130, 238)),
];

pub const LEGEND_ORIGIN: (f64, f64) = (10.0, 10.0);
pub const LEGEND_ROW_HEIGHT: f64 = 20.0;
pub const SMOOTH_STEPS: usize = 8;
const MARGIN_FRACTION: f64 = 0.06;

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesPlot {
    pub key: Scalar,
    pub color: Color,
    pub color_name: &'static str,
    /// Pixel coordinates, origin top-left.
    pub points: Vec<(i64, i64)>,
    pub error: Option<ChartError>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinePlot {
    pub width: f64,
    pub height: f64,
    pub series: Vec<SeriesPlot>,
    pub unassigned: Vec<ChartError>,
}

impl LinePlot {
    pub fn errors(&self) -> impl Iterator<Item = &ChartError> {
        self.series
            .iter()
            .filter_map(|s| s.error.as_ref())
            .chain(self.unassigned.iter())
    }
}

/// Distinct values of `field`, sorted.
pub fn series_keys(records: &[Record], field: &str) -> Vec<Scalar> {
    let mut keys: Vec<Scalar> = Vec::new();
    for r in records {
        if let Some(k) = r.get(field) {
            if !keys.contains(k) {
                keys.push(k.clone());
            }
        }
    }
    keys.sort_by(|a, b| a.sort_cmp(b));
    keys
}

/// Map data points onto a `width`×`height` pixel grid scaled to the series maxima.
pub fn scale_points(
    series: &str,
    data: &[(f64, f64)],
    width: f64,
    height: f64,
) -> Result<Vec<(i64, i64)>, ChartError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let max_x = data.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let max_y = data.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    for (axis, max) in [(Axis::X, max_x), (Axis::Y, max_y)] {
        if max == 0.0 || !max.is_finite() {
            return Err(ChartError::DivisionByZeroInScale {
                series: series.to_string(),
                axis,
            });
        }
    }
    let x_scale = width / max_x;
    let y_scale = height / max_y;
    Ok(data
        .iter()
        .map(|(x, y)| {
            (
                (x * x_scale).round_ties_even() as i64,
                height as i64 - (y * y_scale).round_ties_even() as i64,
            )
        })
        .collect())
}

fn project(
    records: &[Record],
    key: &Scalar,
    x_field: &str,
    y_field: &str,
    series_field: &str,
) -> Result<Vec<(f64, f64)>, ChartError> {
    let mut out = Vec::new();
    for r in records.iter().filter(|r| r.get(series_field) == Some(key)) {
        let pick = |field: &str| {
            r.get(field)
                .and_then(Scalar::as_f64)
                .ok_or_else(|| ChartError::NonNumericValue {
                    series: key.to_string(),
                    field: field.to_string(),
                })
        };
        out.push((pick(x_field)?, pick(y_field)?));
    }
    Ok(out)
}

/// Group, colour and scale every series. Failures stay attached to their series.
pub fn layout_lines(
    records: &[Record],
    size: (u16, u16),
    x_field: &str,
    y_field: &str,
    series_field: &str,
) -> LinePlot {
    let width = f64::from(size.0);
    let height = f64::from(size.1);
    let keys = series_keys(records, series_field);
    let mut plot = LinePlot {
        width,
        height,
        ..Default::default()
    };
    for (i, key) in keys.into_iter().enumerate() {
        let Some((color_name, color)) = PALETTE.get(i).copied() else {
            plot.unassigned.push(ChartError::UnassignedSeriesColor {
                series: key.to_string(),
            });
            continue;
        };
        let name = key.to_string();
        let (points, error) = match project(records, &key, x_field, y_field, series_field)
            .and_then(|data| scale_points(&name, &data, width, height))
        {
            Ok(points) => (points, None),
            Err(e) => (Vec::new(), Some(e)),
        };
        plot.series.push(SeriesPlot {
            key,
            color,
            color_name,
            points,
            error,
        });
    }
    plot
}

/// Quadratic B-spline through segment midpoints; keeps both endpoints.
pub fn smooth_polyline(points: &[(f64, f64)], steps: usize) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 3 || steps == 0 {
        return points.to_vec();
    }
    let mid = |a: (f64, f64), b: (f64, f64)| ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    let mut out = vec![points[0]];
    for i in 1..n - 1 {
        let start = if i == 1 {
            points[0]
        } else {
            mid(points[i - 1], points[i])
        };
        let end = if i == n - 2 {
            points[n - 1]
        } else {
            mid(points[i], points[i + 1])
        };
        let ctrl = points[i];
        for s in 1..=steps {
            let t = s as f64 / steps as f64;
            let u = 1.0 - t;
            out.push((
                u * u * start.0 + 2.0 * u * t * ctrl.0 + t * t * end.0,
                u * u * start.1 + 2.0 * u * t * ctrl.1 + t * t * end.1,
            ));
        }
    }
    out
}

pub struct LineChartView {
    pub x_field: String,
    pub y_field: String,
    pub plot: LinePlot,
}

impl LineChartView {
    pub fn new(
        records: &[Record],
        plot_size: (u16, u16),
        x_field: &str,
        y_field: &str,
        series_field: &str,
    ) -> Self {
        let plot = layout_lines(records, plot_size, x_field, y_field, series_field);
        for e in plot.errors() {
            tracing::warn!(error = %e, "line chart series skipped");
        }
        Self {
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            plot,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, focused: bool) {
        let block = panel_block(title, focused);
        let inner = block.inner(area);
        let (w, h) = (self.plot.width, self.plot.height);
        let mx = w * MARGIN_FRACTION;
        let my = h * MARGIN_FRACTION;
        let x_bounds = [-mx, w + mx];
        let y_bounds = [-my, h + my];
        let row_h = (y_bounds[1] - y_bounds[0]) / f64::from(inner.height.max(1));
        let col_w = (x_bounds[1] - x_bounds[0]) / f64::from(inner.width.max(1));
        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                ctx.draw(&CanvasLine::new(0.0, 0.0, w, 0.0, Color::Gray));
                ctx.draw(&CanvasLine::new(0.0, 0.0, 0.0, h, Color::White));
                for s in &self.plot.series {
                    // back to data orientation: canvas y grows upwards
                    let pts: Vec<(f64, f64)> = s
                        .points
                        .iter()
                        .map(|(px, py)| (*px as f64, h - *py as f64))
                        .collect();
                    for seg in smooth_polyline(&pts, SMOOTH_STEPS).windows(2) {
                        ctx.draw(&CanvasLine::new(seg[0].0, seg[0].1, seg[1].0, seg[1].1, s.color));
                    }
                }
                let label_x = (w - self.x_field.chars().count() as f64 * col_w).max(0.0) / 2.0;
                ctx.print(label_x, -my * 0.9, self.x_field.clone());
                let y_chars: Vec<char> = self.y_field.chars().collect();
                let top = h / 2.0 + row_h * y_chars.len() as f64 / 2.0;
                for (i, ch) in y_chars.iter().enumerate() {
                    ctx.print(-mx * 0.9, top - row_h * i as f64, ch.to_string());
                }
                for (i, s) in self.plot.series.iter().enumerate() {
                    let y = h - (LEGEND_ORIGIN.1 + i as f64 * LEGEND_ROW_HEIGHT.max(row_h));
                    ctx.print(
                        LEGEND_ORIGIN.0,
                        y,
                        Span::styled(s.key.to_string(), Style::default().fg(s.color)),
                    );
                }
            });
        f.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn sample() -> Vec<Record> {
        vec![
            record([("Day", Scalar::from(0)), ("Group", "A".into()), ("H", 1.0.into())]),
            record([("Day", Scalar::from(1)), ("Group", "A".into()), ("H", 2.0.into())]),
            record([("Day", Scalar::from(0)), ("Group", "B".into()), ("H", 3.0.into())]),
            record([("Day", Scalar::from(1)), ("Group", "B".into()), ("H", 1.5.into())]),
        ]
    }

    #[test]
    fn two_series_sorted_and_scaled_per_series() {
        let plot = layout_lines(&sample(), (100, 100), "Day", "H", "Group");
        assert_eq!(plot.series.len(), 2);
        assert_eq!(plot.series[0].key, Scalar::from("A"));
        assert_eq!(plot.series[1].key, Scalar::from("B"));
        assert_eq!(plot.series[0].color_name, "red");
        assert_eq!(plot.series[1].color_name, "orange");
        assert_eq!(plot.series[0].points, vec![(0, 50), (100, 0)]);
        assert_eq!(plot.series[1].points, vec![(0, 0), (100, 50)]);
        assert!(plot.errors().next().is_none());
    }

    #[test]
    fn zero_max_fails_only_that_series() {
        let mut rows = sample();
        rows.push(record([("Day", Scalar::from(0)), ("Group", "C".into()), ("H", 0.0.into())]));
        rows.push(record([("Day", Scalar::from(1)), ("Group", "C".into()), ("H", 0.0.into())]));
        let plot = layout_lines(&rows, (100, 100), "Day", "H", "Group");
        assert_eq!(plot.series.len(), 3);
        assert_eq!(plot.series[0].points.len(), 2);
        assert_eq!(plot.series[1].points.len(), 2);
        let c = &plot.series[2];
        assert!(c.points.is_empty());
        assert_eq!(
            c.error,
            Some(ChartError::DivisionByZeroInScale {
                series: "C".into(),
                axis: Axis::Y
            })
        );
    }

    #[test]
    fn zero_max_x_is_reported_on_x_axis() {
        let err = scale_points("s", &[(0.0, 1.0)], 10.0, 10.0).unwrap_err();
        assert_eq!(
            err,
            ChartError::DivisionByZeroInScale {
                series: "s".into(),
                axis: Axis::X
            }
        );
    }

    #[test]
    fn series_beyond_palette_are_left_unassigned() {
        let rows: Vec<Record> = (0..9)
            .map(|i| record([("x", Scalar::from(1)), ("y", Scalar::from(1)), ("s", Scalar::from(i))]))
            .collect();
        let plot = layout_lines(&rows, (10, 10), "x", "y", "s");
        assert_eq!(plot.series.len(), PALETTE.len());
        assert_eq!(plot.unassigned.len(), 2);
        assert!(matches!(
            &plot.unassigned[0],
            ChartError::UnassignedSeriesColor { series } if series == "7"
        ));
    }

    #[test]
    fn non_numeric_selector_is_isolated() {
        let mut rows = sample();
        rows.push(record([("Day", Scalar::from("late")), ("Group", "Z".into()), ("H", 1.0.into())]));
        let plot = layout_lines(&rows, (100, 100), "Day", "H", "Group");
        assert_eq!(plot.series.len(), 3);
        assert!(matches!(
            plot.series[2].error,
            Some(ChartError::NonNumericValue { ref field, .. }) if field == "Day"
        ));
        assert!(plot.series[0].error.is_none());
    }

    #[test]
    fn rounding_matches_half_to_even() {
        let pts = scale_points("s", &[(1.0, 1.0), (5.0, 5.0)], 10.0, 10.0).unwrap();
        // 1 * 10/5 = 2; 5 -> 10
        assert_eq!(pts, vec![(2, 8), (10, 0)]);
        let pts = scale_points("s", &[(1.0, 1.0), (4.0, 4.0)], 10.0, 10.0).unwrap();
        // 2.5 rounds to 2
        assert_eq!(pts, vec![(2, 8), (10, 0)]);
    }

    #[test]
    fn smoothing_keeps_endpoints_and_short_lines() {
        let line = [(0.0, 0.0), (10.0, 10.0)];
        assert_eq!(smooth_polyline(&line, 4), line.to_vec());
        let pts = [(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)];
        let smooth = smooth_polyline(&pts, 4);
        assert_eq!(smooth.first(), Some(&(0.0, 0.0)));
        assert_eq!(smooth.last(), Some(&(20.0, 0.0)));
        assert_eq!(smooth.len(), 1 + 4);
        // peak is pulled below the control point
        let peak = smooth.iter().map(|p| p.1).fold(f64::MIN, f64::max);
        assert!(peak < 10.0 && peak > 0.0);
    }

    #[test]
    fn renders_legend_and_axis_label() {
        let view = LineChartView::new(&crate::model::nodes(), (800, 400), "Day", "Average Height (cm)", "lab_id");
        assert_eq!(view.plot.series.len(), 3);
        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                view.render(f, area, "Heights", false);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut screen = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                screen.push_str(buf[(x, y)].symbol());
            }
            screen.push('\n');
        }
        assert!(screen.contains("Heights"));
        assert!(screen.contains("Day"));
        for lab in ["A", "B", "C"] {
            assert!(screen.contains(lab));
        }
    }
}
