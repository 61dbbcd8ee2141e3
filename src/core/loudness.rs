/// SPL-driven loudness model. SPL is user-chosen in [30, 100] dB; the
/// vertical marker position scales the synthesizer gain on top of it.

pub const MIN_SPL: f32 = 30.0;
pub const MAX_SPL: f32 = 100.0;
pub const REFERENCE_SPL: f32 = 60.0;
/// Reference pressure, 20 µPa.
pub const REFERENCE_PRESSURE: f32 = 0.00002;

pub const MIN_GAIN: f32 = 0.0001;
pub const MAX_GAIN: f32 = 3.0;
/// Live gain changes ramp exponentially to the target over roughly this
/// long, to avoid audible clicks.
pub const GAIN_RAMP_SECONDS: f32 = 0.01;

/// Synthesizer gain for an SPL setting, unity at the 60 dB reference.
pub fn gain_for_spl(spl: f32) -> f32 {
    10.0f32
        .powf((spl - REFERENCE_SPL) / 20.0)
        .clamp(MIN_GAIN, MAX_GAIN)
}

/// Vertical scaling of the gain: 0.1 at the top of the field, 1.0 at the
/// bottom. `normalized_from_top` is the fraction of travel down from the
/// top of the inner rectangle.
pub fn height_influence(normalized_from_top: f32) -> f32 {
    0.1 + normalized_from_top.clamp(0.0, 1.0) * 0.9
}

/// The gain actually applied to a live tone.
pub fn live_gain(spl: f32, normalized_from_top: f32) -> f32 {
    (height_influence(normalized_from_top) * gain_for_spl(spl)).clamp(MIN_GAIN, MAX_GAIN)
}

/// Physical sound pressure in Pa, for display only.
pub fn pressure(spl: f32) -> f32 {
    REFERENCE_PRESSURE * 10.0f32.powf(spl / 20.0)
}
