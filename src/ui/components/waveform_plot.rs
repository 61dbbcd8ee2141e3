use egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints};

/// Fixed-viewport line plot for the scrolling tone preview. The vertical
/// bounds stay pinned to ±max_amplitude so loudness changes read as
/// amplitude changes, not rescaling.
pub struct WaveformPlot {
    points: Vec<[f64; 2]>,
    width: f32,
    height: f32,
    max_amplitude: f64,
    color: Color32,
}

impl WaveformPlot {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self {
            points,
            width: 300.0,
            height: 100.0,
            max_amplitude: 50.0,
            color: Color32::from_rgb(0, 255, 0),
        }
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn max_amplitude(mut self, max_amplitude: f64) -> Self {
        self.max_amplitude = max_amplitude;
        self
    }

    pub fn color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    pub fn show(self, ui: &mut Ui, id_source: impl std::hash::Hash) {
        let plot = Plot::new(id_source)
            .width(self.width)
            .height(self.height)
            .include_y(self.max_amplitude)
            .include_y(-self.max_amplitude)
            .show_axes(false)
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false);

        plot.show(ui, |plot_ui| {
            let line = Line::new(PlotPoints::from(self.points)).color(self.color);
            plot_ui.line(line);
        });
    }
}
