//! Display formatting for the UI readouts: pan percentages, SPL color
//! tiers, and the text labels shown in the corner of the window.

use crate::core::loudness;

/// Color tier for the SPL readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplTier {
    /// Up to 60 dB (green).
    Quiet,
    /// 61-80 dB (yellow).
    Moderate,
    /// Above 80 dB (red).
    Loud,
}

impl SplTier {
    pub fn for_spl(spl: f32) -> Self {
        if spl > 80.0 {
            SplTier::Loud
        } else if spl > 60.0 {
            SplTier::Moderate
        } else {
            SplTier::Quiet
        }
    }
}

/// Left/right percentages for a pan value, complementary except for a
/// ±10% boost within 10% of either extreme. Display-only; the boost has
/// no acoustic effect.
pub fn pan_percentages(pan: f32) -> (u8, u8) {
    let mut right = (((pan + 1.0) / 2.0) * 100.0).round() as i32;
    let mut left = 100 - right;

    if (pan - 1.0).abs() < 0.1 {
        right = (right + 10).min(100);
        left = (left - 10).max(0);
    }
    if (pan + 1.0).abs() < 0.1 {
        left = (left + 10).min(100);
        right = (right - 10).max(0);
    }

    (left as u8, right as u8)
}

pub fn frequency_label(frequency: f32) -> String {
    format!("Frequency: {} (Hz)", frequency.round() as i32)
}

pub fn panning_label(pan: f32) -> String {
    let (left, right) = pan_percentages(pan);
    format!("L: {left}% | R: {right}%")
}

pub fn spl_label(spl: f32) -> String {
    format!("SPL: {spl:.2} (dB)")
}

pub fn pressure_label(spl: f32) -> String {
    format!("Pascal: {:.4} (Pa)", loudness::pressure(spl))
}
