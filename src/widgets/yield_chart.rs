use crate::widgets::chrome::panel_block;
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis as ChartAxis, Chart, Dataset, GraphType, LegendPosition};

/// One scatter series as handed to the axes.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterLayer {
    pub label: String,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
    pub sizes: Vec<f64>,
}

/// The figure surface a yield chart draws onto.
pub trait Axes {
    fn set_labels(&mut self, x_label: &str, y_label: &str, title: &str);
    /// Add a scatter layer; returns its handle.
    fn scatter(&mut self, layer: ScatterLayer) -> usize;
    /// Replace the legend with the given layers and labels, in order.
    fn legend(&mut self, handles: &[usize], labels: &[String]);
}

/// Marker area from a raw size value: `size² / 2`, floored.
pub fn marker_area(size: f64) -> f64 {
    (size * size / 2.0).floor()
}

/// Accumulates scatter series on one set of axes and keeps a combined legend.
pub struct YieldChartView<A: Axes = TerminalAxes> {
    axes: A,
    scatters: Vec<usize>,
    scatter_labels: Vec<String>,
}

impl<A: Axes> YieldChartView<A> {
    pub fn with_axes(mut axes: A, x_axis: &str, y_axis: &str, title: &str) -> Self {
        axes.set_labels(x_axis, y_axis, title);
        Self {
            axes,
            scatters: Vec::new(),
            scatter_labels: Vec::new(),
        }
    }

    pub fn draw_scatter(&mut self, data: &[(f64, f64, f64)], color: Color, label: &str) {
        let layer = ScatterLayer {
            label: label.to_string(),
            color,
            points: data.iter().map(|(x, y, _)| (*x, *y)).collect(),
            sizes: data.iter().map(|(_, _, s)| marker_area(*s)).collect(),
        };
        let handle = self.axes.scatter(layer);
        self.scatters.push(handle);
        self.scatter_labels.push(label.to_string());
        self.axes.legend(&self.scatters, &self.scatter_labels);
    }

    pub fn legend(&self) -> &[String] {
        &self.scatter_labels
    }

    pub fn axes(&self) -> &A {
        &self.axes
    }
}

impl YieldChartView<TerminalAxes> {
    pub fn new(x_axis: &str, y_axis: &str, title: &str) -> Self {
        Self::with_axes(TerminalAxes::default(), x_axis, y_axis, title)
    }

    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool) {
        self.axes.render(f, area, focused);
    }
}

// Marker area thresholds; bigger yields get heavier glyphs.
const SIZE_BUCKETS: [(f64, Marker); 3] = [
    (200.0, Marker::Braille),
    (800.0, Marker::Dot),
    (f64::INFINITY, Marker::Block),
];

/// `Axes` backed by a ratatui `Chart`.
#[derive(Clone, Debug, Default)]
pub struct TerminalAxes {
    pub x_label: String,
    pub y_label: String,
    pub title: String,
    pub layers: Vec<ScatterLayer>,
    pub legend: Vec<(usize, String)>,
}

impl Axes for TerminalAxes {
    fn set_labels(&mut self, x_label: &str, y_label: &str, title: &str) {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self.title = title.to_string();
    }

    fn scatter(&mut self, layer: ScatterLayer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    fn legend(&mut self, handles: &[usize], labels: &[String]) {
        self.legend = handles.iter().copied().zip(labels.iter().cloned()).collect();
    }
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    [lo - pad, hi + pad]
}

impl TerminalAxes {
    /// Points of one layer grouped by marker bucket.
    fn bucketed(layer: &ScatterLayer) -> Vec<(Marker, Vec<(f64, f64)>)> {
        let mut out: Vec<(Marker, Vec<(f64, f64)>)> =
            SIZE_BUCKETS.iter().map(|(_, m)| (*m, Vec::new())).collect();
        for (p, s) in layer.points.iter().zip(layer.sizes.iter()) {
            let idx = SIZE_BUCKETS
                .iter()
                .position(|(limit, _)| *s < *limit)
                .unwrap_or(SIZE_BUCKETS.len() - 1);
            out[idx].1.push(*p);
        }
        out
    }

    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool) {
        let buckets: Vec<(usize, Vec<(Marker, Vec<(f64, f64)>)>)> = self
            .layers
            .iter()
            .enumerate()
            .map(|(i, l)| (i, Self::bucketed(l)))
            .collect();
        let mut datasets: Vec<Dataset> = Vec::new();
        for (i, groups) in &buckets {
            let layer = &self.layers[*i];
            let name = self
                .legend
                .iter()
                .find(|(h, _)| h == i)
                .map(|(_, l)| l.clone());
            let mut named = false;
            for (marker, pts) in groups {
                if pts.is_empty() {
                    continue;
                }
                let mut ds = Dataset::default()
                    .marker(*marker)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(layer.color))
                    .data(pts);
                // one legend entry per layer
                if !named {
                    if let Some(n) = &name {
                        ds = ds.name(n.clone());
                        named = true;
                    }
                }
                datasets.push(ds);
            }
        }
        let xb = padded_bounds(self.layers.iter().flat_map(|l| l.points.iter().map(|p| p.0)));
        let yb = padded_bounds(self.layers.iter().flat_map(|l| l.points.iter().map(|p| p.1)));
        let labels = |b: [f64; 2]| {
            vec![
                Span::raw(format!("{:.1}", b[0])),
                Span::raw(format!("{:.1}", (b[0] + b[1]) / 2.0)),
                Span::raw(format!("{:.1}", b[1])),
            ]
        };
        let chart = Chart::new(datasets)
            .block(panel_block(&self.title, focused))
            .x_axis(
                ChartAxis::default()
                    .title(self.x_label.clone())
                    .style(crate::theme::text_muted())
                    .bounds(xb)
                    .labels(labels(xb)),
            )
            .y_axis(
                ChartAxis::default()
                    .title(self.y_label.clone())
                    .style(crate::theme::text_muted())
                    .bounds(yb)
                    .labels(labels(yb)),
            )
            .legend_position(Some(LegendPosition::TopRight))
            .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));
        f.render_widget(chart, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[derive(Default)]
    struct RecordingAxes {
        labels: Option<(String, String, String)>,
        layers: Vec<ScatterLayer>,
        legend_calls: Vec<Vec<String>>,
    }

    impl Axes for RecordingAxes {
        fn set_labels(&mut self, x: &str, y: &str, title: &str) {
            self.labels = Some((x.into(), y.into(), title.into()));
        }
        fn scatter(&mut self, layer: ScatterLayer) -> usize {
            self.layers.push(layer);
            self.layers.len() - 1
        }
        fn legend(&mut self, _handles: &[usize], labels: &[String]) {
            self.legend_calls.push(labels.to_vec());
        }
    }

    #[test]
    fn legend_lists_every_series_in_call_order() {
        let mut chart = YieldChartView::with_axes(RecordingAxes::default(), "h", "t", "yield");
        chart.draw_scatter(&[(1.0, 2.0, 3.0)], Color::Red, "X");
        chart.draw_scatter(&[(1.0, 2.0, 3.0)], Color::Green, "Y");
        chart.draw_scatter(&[(1.0, 2.0, 3.0)], Color::Blue, "Z");
        assert_eq!(chart.legend(), ["X", "Y", "Z"]);
        let axes = chart.axes();
        assert_eq!(
            axes.labels,
            Some(("h".into(), "t".into(), "yield".into()))
        );
        assert_eq!(axes.legend_calls.len(), 3);
        assert_eq!(axes.legend_calls[2], vec!["X", "Y", "Z"]);
        assert_eq!(axes.legend_calls[0], vec!["X"]);
    }

    #[test]
    fn sizes_are_squared_and_halved() {
        let mut chart = YieldChartView::with_axes(RecordingAxes::default(), "", "", "");
        chart.draw_scatter(&[(0.0, 0.0, 11.0), (1.0, 1.0, 20.0)], Color::Red, "AXM480");
        let layer = &chart.axes().layers[0];
        assert_eq!(layer.points, vec![(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(layer.sizes, vec![60.0, 200.0]);
        assert_eq!(marker_area(3.0), 4.0);
    }

    #[test]
    fn terminal_axes_keep_legend_handles() {
        let mut chart = YieldChartView::new("Humidity", "Temperature", "Yield");
        chart.draw_scatter(&[(27.0, 23.7, 39.0)], Color::Red, "AXM477");
        chart.draw_scatter(&[(26.0, 23.8, 9.0)], Color::Yellow, "AXM478");
        assert_eq!(
            chart.axes().legend,
            vec![(0, "AXM477".to_string()), (1, "AXM478".to_string())]
        );
        let buckets = TerminalAxes::bucketed(&chart.axes().layers[0]);
        // 39² / 2 = 760 -> Dot bucket
        assert_eq!(buckets[1].1.len(), 1);
    }

    #[test]
    fn renders_title_and_legend() {
        let mut chart = YieldChartView::new("Humidity", "Temperature", "Yield");
        chart.draw_scatter(&[(27.0, 23.7, 39.0), (27.5, 23.7, 22.0)], Color::Red, "AXM477");
        chart.draw_scatter(&[(26.0, 23.8, 9.0)], Color::Yellow, "AXM478");
        let backend = TestBackend::new(70, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                chart.render(f, area, false);
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
        assert!(screen.contains("Yield"));
        assert!(screen.contains("AXM477"));
        assert!(screen.contains("AXM478"));
    }
}
