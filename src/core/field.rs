use crate::core::pitch::{self, Note};
use crate::core::audible;

/// Logical side length of the square interaction field.
pub const FIELD_SIZE: f32 = 300.0;
/// Radius of the draggable marker; also the interior margin of the field.
pub const MARKER_RADIUS: f32 = 15.0;

/// Everything a pointer position maps to: the quantized frequency, the pan
/// value, the note it snapped to, and the corrected marker position (the
/// snap moves the visual marker, not just the reported value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcousticSample {
    pub frequency: f32,
    pub pan: f32,
    pub note: Note,
    pub marker: (f32, f32),
}

/// The square interaction region. Coordinates are in the field's own
/// logical space; the UI translates pointer positions into it.
#[derive(Debug, Clone, Copy)]
pub struct InteractionField {
    left: f32,
    top: f32,
}

impl InteractionField {
    pub fn new(left: f32, top: f32) -> Self {
        InteractionField { left, top }
    }

    pub fn center_x(&self) -> f32 {
        self.left + FIELD_SIZE / 2.0
    }

    fn inner_left(&self) -> f32 {
        self.left + MARKER_RADIUS
    }

    fn inner_right(&self) -> f32 {
        self.left + FIELD_SIZE - MARKER_RADIUS
    }

    fn inner_top(&self) -> f32 {
        self.top + MARKER_RADIUS
    }

    fn inner_bottom(&self) -> f32 {
        self.top + FIELD_SIZE - MARKER_RADIUS
    }

    /// Clamp a raw pointer position to the margin-adjusted inner rectangle.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(self.inner_left(), self.inner_right()),
            y.clamp(self.inner_top(), self.inner_bottom()),
        )
    }

    /// Map a pointer position to acoustic quantities. Returns `None` when
    /// the quantized frequency leaves the audible range (the bottom sliver
    /// of the field snaps to a note under 20 Hz); the caller keeps its
    /// prior state.
    pub fn map_position(&self, x: f32, y: f32) -> Option<AcousticSample> {
        let (x, y) = self.clamp(x, y);

        let pan = (x - self.center_x()) / (FIELD_SIZE / 2.0 - MARKER_RADIUS);

        let normalized_y = (self.inner_bottom() - y) / (self.inner_bottom() - self.inner_top());
        let raw_frequency = pitch::y_to_frequency(normalized_y);
        let note = pitch::closest_note(raw_frequency);
        let frequency = note.frequency();
        if !audible(frequency) {
            return None;
        }

        Some(AcousticSample {
            frequency,
            pan,
            note,
            marker: (x, self.y_for_frequency(frequency)),
        })
    }

    /// Vertical marker position for an exact frequency (the inverse of the
    /// y-to-frequency mapping over the inner rectangle).
    pub fn y_for_frequency(&self, frequency: f32) -> f32 {
        let height = self.inner_bottom() - self.inner_top();
        self.inner_bottom() - pitch::frequency_to_y(frequency) * height
    }

    /// Marker position for a note jump: horizontally centered (pan 0), at
    /// the note's exact height. `None` when the note falls outside the
    /// audible range.
    pub fn position_for_note(&self, note: Note) -> Option<(f32, f32)> {
        let frequency = note.frequency();
        if !audible(frequency) {
            return None;
        }
        Some((self.center_x(), self.y_for_frequency(frequency)))
    }
}
