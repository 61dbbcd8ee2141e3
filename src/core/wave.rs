use std::f32::consts::PI;

use crate::core::loudness::REFERENCE_SPL;

/// Speed of sound in m/s, used to give the preview a physical wavelength.
pub const SPEED_OF_SOUND: f32 = 343.0;
pub const PIXELS_PER_METER: f32 = 100.0;
/// How far the preview scrolls per redraw tick, in pixels.
pub const SCROLL_STEP: f32 = 2.0;
/// Half the preview strip height; the loudest amplitude the trace reaches.
pub const PREVIEW_MAX_AMPLITUDE: f32 = 50.0;

/// Tone shapes, selectable by the 4-point control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Sawtooth,
        Waveform::Square,
    ];

    /// Unit-amplitude sample for a normalized phase in [0, 1).
    pub fn sample(self, phase: f32) -> f32 {
        let p = phase.rem_euclid(1.0);
        match self {
            Waveform::Sine => (2.0 * PI * p).sin(),
            Waveform::Triangle => (2.0 * (p - 0.5).abs() - 0.5) * 2.0,
            Waveform::Sawtooth => 1.0 - (2.0 * p) % 2.0,
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Triangle => "Triangle",
            Waveform::Sawtooth => "Sawtooth",
            Waveform::Square => "Square",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Waveform::Sine => "∿",
            Waveform::Triangle => "△",
            Waveform::Sawtooth => "↗",
            Waveform::Square => "⊓",
        }
    }
}

/// On-screen wavelength of a frequency.
pub fn wavelength_px(frequency: f32) -> f32 {
    SPEED_OF_SOUND / frequency * PIXELS_PER_METER
}

/// Visual amplitude for an SPL setting. Deliberately scaled differently
/// from the audible gain: same reference, extra 0.5 factor, capped at the
/// strip height.
pub fn amplitude_for_spl(spl: f32, max_amplitude: f32) -> f32 {
    (max_amplitude * 10.0f32.powf((spl - REFERENCE_SPL) / 20.0) * 0.5).min(max_amplitude)
}

/// A flat centerline for when no tone is active.
pub fn baseline(width_px: usize) -> Vec<[f64; 2]> {
    (0..=width_px).map(|x| [x as f64, 0.0]).collect()
}

/// Scrolling preview state. The phase offset advances a fixed step per
/// tick modulo the wavelength, so the trace scrolls continuously and the
/// offset never grows unbounded.
#[derive(Debug, Default)]
pub struct WavePreview {
    offset: f32,
}

impl WavePreview {
    pub fn new() -> Self {
        WavePreview { offset: 0.0 }
    }

    /// Advance one redraw tick at the given frequency.
    pub fn advance(&mut self, frequency: f32) {
        let wavelength = wavelength_px(frequency);
        self.offset = (self.offset + SCROLL_STEP) % wavelength;
    }

    /// Infinite lazy sequence of (x, y) sample points; callers take the
    /// visible prefix.
    pub fn samples(
        &self,
        waveform: Waveform,
        frequency: f32,
        amplitude: f32,
    ) -> impl Iterator<Item = [f64; 2]> {
        let wavelength = wavelength_px(frequency);
        let offset = self.offset;
        (0u32..).map(move |x| {
            let phase = ((x as f32 + offset) % wavelength) / wavelength;
            [x as f64, (waveform.sample(phase) * amplitude) as f64]
        })
    }

    /// The visible prefix of the sample sequence, one point per pixel.
    pub fn trace(
        &self,
        waveform: Waveform,
        frequency: f32,
        amplitude: f32,
        width_px: usize,
    ) -> Vec<[f64; 2]> {
        self.samples(waveform, frequency, amplitude)
            .take(width_px + 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_extremes() {
        assert!((Waveform::Sine.sample(0.25) - 1.0).abs() < 1e-6);
        assert!((Waveform::Sine.sample(0.75) + 1.0).abs() < 1e-6);
        assert!((Waveform::Triangle.sample(0.0) - 1.0).abs() < 1e-6);
        assert!((Waveform::Triangle.sample(0.5) + 1.0).abs() < 1e-6);
        assert!((Waveform::Sawtooth.sample(0.0) - 1.0).abs() < 1e-6);
        assert!((Waveform::Sawtooth.sample(0.75) + 0.5).abs() < 1e-6);
        assert_eq!(Waveform::Square.sample(0.1), 1.0);
        assert_eq!(Waveform::Square.sample(0.9), -1.0);
    }

    #[test]
    fn square_trace_is_strictly_two_valued() {
        let preview = WavePreview::new();
        for frequency in [55.0f32, 440.0, 3520.0] {
            for [_, y] in preview.trace(Waveform::Square, frequency, 40.0, 300) {
                assert!(
                    y == 40.0 || y == -40.0,
                    "square sample {y} at {frequency} Hz is not ±amplitude"
                );
            }
        }
    }

    #[test]
    fn offset_wraps_within_one_wavelength() {
        let mut preview = WavePreview::new();
        let wavelength = wavelength_px(440.0);
        for _ in 0..10_000 {
            preview.advance(440.0);
            assert!(preview.offset >= 0.0 && preview.offset < wavelength);
        }
    }

    #[test]
    fn scrolling_shifts_the_trace() {
        let mut preview = WavePreview::new();
        let before = preview.trace(Waveform::Sine, 440.0, 1.0, 300);
        preview.advance(440.0);
        let after = preview.trace(Waveform::Sine, 440.0, 1.0, 300);
        // One tick moves the pattern SCROLL_STEP pixels to the left.
        let step = SCROLL_STEP as usize;
        for x in 0..(300 - step) {
            assert!(
                (before[x + step][1] - after[x][1]).abs() < 1e-4,
                "trace did not shift by {step} px at x={x}"
            );
        }
    }

    #[test]
    fn preview_amplitude_scaling() {
        // Reference SPL shows at half the strip height.
        assert!((amplitude_for_spl(60.0, 50.0) - 25.0).abs() < 1e-4);
        // Loud settings cap at the strip height.
        assert_eq!(amplitude_for_spl(100.0, 50.0), 50.0);
        assert!(amplitude_for_spl(30.0, 50.0) < 1.0);
    }

    #[test]
    fn baseline_is_flat() {
        let points = baseline(300);
        assert_eq!(points.len(), 301);
        assert!(points.iter().all(|[_, y]| *y == 0.0));
    }

    #[test]
    fn wavelength_of_concert_pitch() {
        // 343/440 m * 100 px/m ≈ 78 px.
        assert!((wavelength_px(440.0) - 77.95).abs() < 0.01);
    }
}
