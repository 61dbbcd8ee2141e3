use crossbeam_channel::Receiver;
use eframe::egui;
use egui::{Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Vec2};

use crate::audio::{CpalBackend, StreamEvent};
use crate::core::field::{InteractionField, FIELD_SIZE, MARKER_RADIUS};
use crate::core::loudness;
use crate::core::pitch::{self, Entry, Note, NoteName};
use crate::core::readout::{self, SplTier};
use crate::core::tone::ToneController;
use crate::core::wave::{self, WavePreview, Waveform};
use crate::core::{audible, MAX_FREQUENCY, MIN_FREQUENCY};
use crate::ui::components::WaveformPlot;

/// Gutter left of the field for the octave band labels.
const LABEL_GUTTER: f32 = 30.0;
const FRAME_COLOR: Color32 = Color32::from_gray(102);

const NOTE_KEYS: [(egui::Key, NoteName); 7] = [
    (egui::Key::C, NoteName::C),
    (egui::Key::D, NoteName::D),
    (egui::Key::E, NoteName::E),
    (egui::Key::F, NoteName::F),
    (egui::Key::G, NoteName::G),
    (egui::Key::A, NoteName::A),
    (egui::Key::B, NoteName::B),
];

const OCTAVE_KEYS: [(egui::Key, i32); 10] = [
    (egui::Key::Num1, 1),
    (egui::Key::Num2, 2),
    (egui::Key::Num3, 3),
    (egui::Key::Num4, 4),
    (egui::Key::Num5, 5),
    (egui::Key::Num6, 6),
    (egui::Key::Num7, 7),
    (egui::Key::Num8, 8),
    (egui::Key::Num9, 9),
    (egui::Key::Num0, 10),
];

pub struct ExplorerApp {
    controller: ToneController,
    stream_events: Receiver<StreamEvent>,
    field: InteractionField,
    preview: WavePreview,
    /// Marker position in the field's local coordinates.
    marker: (f32, f32),
    /// The note the marker currently sits on.
    note: Note,
    /// Text buffer of the typed entry overlay while it is open.
    entry: Option<String>,
}

impl ExplorerApp {
    pub fn new() -> Self {
        let (backend, stream_events) = CpalBackend::new();
        let controller = ToneController::new(Box::new(backend));

        let field = InteractionField::new(0.0, 0.0);
        let note = pitch::closest_note(controller.state().frequency);
        let marker = (
            field.center_x(),
            field.y_for_frequency(controller.state().frequency),
        );

        ExplorerApp {
            controller,
            stream_events,
            field,
            preview: WavePreview::new(),
            marker,
            note,
            entry: None,
        }
    }

    fn drain_stream_events(&mut self) {
        while let Ok(event) = self.stream_events.try_recv() {
            match event {
                StreamEvent::Error(message) => {
                    log::error!("audio stream failed: {message}");
                    self.controller.stop();
                }
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.controller.toggle();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)) {
            self.change_octave(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Minus)) {
            self.change_octave(-1);
        }
        for (key, name) in NOTE_KEYS {
            if ctx.input(|i| i.key_pressed(key)) {
                self.move_to_note(Note::new(name, self.note.octave));
            }
        }
        for (key, octave) in OCTAVE_KEYS {
            if ctx.input(|i| i.key_pressed(key)) {
                self.move_to_note(Note::new(self.note.name, octave));
            }
        }
    }

    fn change_octave(&mut self, direction: i32) {
        if let Some(frequency) = self.controller.change_octave(direction) {
            self.marker.1 = self.field.y_for_frequency(frequency);
            self.note = pitch::closest_note(frequency);
        }
    }

    /// Jump the marker to a note: horizontally centered, pan reset.
    fn move_to_note(&mut self, note: Note) {
        let Some(position) = self.field.position_for_note(note) else {
            log::debug!("ignoring jump to {note}: outside the audible range");
            return;
        };
        if let Err(err) = self.controller.retune(note.frequency(), 0.0) {
            log::debug!("ignoring jump to {note}: {err}");
            return;
        }
        self.marker = position;
        self.note = note;
    }

    fn drag_to(&mut self, x: f32, y: f32) {
        let Some(sample) = self.field.map_position(x, y) else {
            return; // quantized below the audible floor, keep prior state
        };
        if let Err(err) = self.controller.retune(sample.frequency, sample.pan) {
            log::debug!("ignoring drag: {err}");
            return;
        }
        self.marker = sample.marker;
        self.note = sample.note;
    }

    fn entry_overlay(&mut self, ctx: &egui::Context) {
        let Some(buffer) = self.entry.as_mut() else {
            return;
        };

        let mut commit = false;
        let mut cancel = false;
        egui::Window::new("Note or frequency")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let response = ui.text_edit_singleline(buffer);
                response.request_focus();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    commit = true;
                }
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    cancel = true;
                }
            });

        if !(commit || cancel) {
            return;
        }
        if let Some(buffer) = self.entry.take() {
            if commit {
                // Invalid input is silently discarded on commit.
                match pitch::parse_entry(&buffer) {
                    Some(Entry::Frequency(hz)) => self.move_to_note(pitch::closest_note(hz)),
                    Some(Entry::Note(note)) => self.move_to_note(note),
                    None => {}
                }
            }
        }
    }

    fn show_preview(&mut self, ui: &mut egui::Ui) {
        let state = self.controller.state();
        let width = FIELD_SIZE as usize;
        let points = if self.controller.is_playing() {
            let amplitude = wave::amplitude_for_spl(state.spl, wave::PREVIEW_MAX_AMPLITUDE);
            self.preview
                .trace(self.controller.waveform(), state.frequency, amplitude, width)
        } else {
            wave::baseline(width)
        };

        ui.horizontal(|ui| {
            ui.add_space(LABEL_GUTTER);
            WaveformPlot::new(points)
                .size(FIELD_SIZE, 100.0)
                .max_amplitude(wave::PREVIEW_MAX_AMPLITUDE as f64)
                .show(ui, "tone_preview");
        });
    }

    fn show_field(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(
            Vec2::new(LABEL_GUTTER + FIELD_SIZE, FIELD_SIZE),
            Sense::click_and_drag(),
        );
        let field_rect = Rect::from_min_size(
            response.rect.min + Vec2::new(LABEL_GUTTER, 0.0),
            Vec2::splat(FIELD_SIZE),
        );

        // Alternating octave bands, low frequencies at the bottom.
        let band_height = FIELD_SIZE / 10.0;
        for i in 0..10 {
            let y = field_rect.top() + FIELD_SIZE - (i + 1) as f32 * band_height;
            let alpha = if i % 2 == 0 { 50 } else { 25 };
            painter.rect_filled(
                Rect::from_min_size(
                    Pos2::new(field_rect.left(), y),
                    Vec2::new(FIELD_SIZE, band_height),
                ),
                CornerRadius::ZERO,
                Color32::from_rgba_unmultiplied(51, 51, 51, alpha),
            );
            painter.text(
                Pos2::new(field_rect.left() - 14.0, y + band_height / 2.0),
                Align2::CENTER_CENTER,
                format!("{}", i + 1),
                FontId::proportional(12.0),
                FRAME_COLOR,
            );
        }
        painter.rect_stroke(
            field_rect,
            CornerRadius::ZERO,
            Stroke::new(2.0, FRAME_COLOR),
            StrokeKind::Middle,
        );

        let marker_pos = field_rect.min + Vec2::new(self.marker.0, self.marker.1);

        if response.dragged() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let local = pointer - field_rect.min;
                self.drag_to(local.x, local.y);
            }
        }
        if response.double_clicked() {
            let near_marker = response
                .interact_pointer_pos()
                .is_some_and(|p| p.distance(marker_pos) <= MARKER_RADIUS * 2.0);
            if near_marker {
                self.entry = Some(String::new());
            }
        }

        // Marker with its note label, drawn last so it sits on top.
        let marker_pos = field_rect.min + Vec2::new(self.marker.0, self.marker.1);
        painter.circle_filled(marker_pos, MARKER_RADIUS, Color32::GREEN);
        painter.text(
            marker_pos,
            Align2::CENTER_CENTER,
            self.note.to_string(),
            FontId::proportional(12.0),
            Color32::BLACK,
        );
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("SPL:");
            let mut spl = self.controller.state().spl;
            if ui
                .add(
                    egui::Slider::new(&mut spl, loudness::MIN_SPL..=loudness::MAX_SPL)
                        .suffix(" dB"),
                )
                .changed()
            {
                self.controller.set_spl(spl);
            }
        });

        ui.horizontal(|ui| {
            ui.label("Waveform:");
            let mut waveform = self.controller.waveform();
            let mut changed = false;
            for candidate in Waveform::ALL {
                changed |= ui
                    .selectable_value(
                        &mut waveform,
                        candidate,
                        format!("{} {}", candidate.symbol(), candidate.label()),
                    )
                    .changed();
            }
            if changed {
                self.controller.set_waveform(waveform);
            }
        });
    }

    fn show_readouts(&self, ui: &mut egui::Ui) {
        let state = self.controller.state();

        ui.label(readout::frequency_label(state.frequency));
        ui.label(readout::panning_label(state.pan));

        let tint = match SplTier::for_spl(state.spl) {
            SplTier::Quiet => Color32::GREEN,
            SplTier::Moderate => Color32::YELLOW,
            SplTier::Loud => Color32::RED,
        };
        ui.colored_label(tint, readout::spl_label(state.spl));
        ui.label(readout::pressure_label(state.spl));
        ui.label(format!("Note: {}", self.note));
        ui.label(if self.controller.is_playing() {
            "Playing (space stops)"
        } else {
            "Idle (space plays)"
        });
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_stream_events();

        // The overlay owns the keyboard while it is open.
        if self.entry.is_some() {
            self.entry_overlay(ctx);
        } else {
            self.handle_keys(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("wavefreq");
            ui.add_space(4.0);

            self.show_preview(ui);
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.vertical(|ui| self.show_field(ui));
                ui.add_space(16.0);
                ui.vertical(|ui| {
                    self.show_readouts(ui);
                    ui.add_space(8.0);
                    ui.label(format!(
                        "Drag inside the frame: height picks a note \
                         ({MIN_FREQUENCY}-{MAX_FREQUENCY} Hz, log scale), \
                         width pans. Double-click the marker to type a note."
                    ));
                });
            });

            ui.add_space(8.0);
            self.show_controls(ui);
        });

        // Scroll the preview once per redraw tick while audible.
        let state = self.controller.state();
        if self.controller.is_playing() && audible(state.frequency) {
            self.preview.advance(state.frequency);
        }

        // Keep the preview scrolling and the readouts live.
        ctx.request_repaint();
    }
}
