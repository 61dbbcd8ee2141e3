use anyhow::Result;

use crate::core::wave::Waveform;
use crate::core::{audible, loudness, pitch, ExplorerError};

/// Capability interface for a live tone. A generator is created running
/// and is released by consuming it with `stop`. Gain changes are expected
/// to ramp smoothly (~10 ms) inside the backend.
pub trait ToneGenerator {
    fn set_waveform(&mut self, waveform: Waveform);
    fn set_frequency(&mut self, frequency: f32);
    fn set_pan(&mut self, pan: f32);
    fn set_gain(&mut self, gain: f32);
    fn stop(self: Box<Self>) -> Result<()>;
}

/// Source of tone generators; the audio device behind a seam so the
/// controller never touches a concrete device API.
pub trait ToneBackend {
    fn start_tone(&mut self) -> Result<Box<dyn ToneGenerator>>;
}

/// The acoustic quantities the user controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcousticState {
    pub frequency: f32,
    pub pan: f32,
    pub spl: f32,
}

impl Default for AcousticState {
    fn default() -> Self {
        AcousticState {
            frequency: 440.0,
            pan: 0.0,
            spl: loudness::REFERENCE_SPL,
        }
    }
}

/// Owns the lifecycle of the single continuous tone: Idle ⇄ Playing with
/// nothing in between, and never two generators alive at once. Device
/// failures are contained here: they are logged and the state machine
/// carries on.
pub struct ToneController {
    backend: Box<dyn ToneBackend>,
    state: AcousticState,
    waveform: Waveform,
    tone: Option<Box<dyn ToneGenerator>>,
}

impl ToneController {
    pub fn new(backend: Box<dyn ToneBackend>) -> Self {
        ToneController {
            backend,
            state: AcousticState::default(),
            waveform: Waveform::Sine,
            tone: None,
        }
    }

    pub fn state(&self) -> AcousticState {
        self.state
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn is_playing(&self) -> bool {
        self.tone.is_some()
    }

    /// The gain for the current SPL and marker height. The vertical
    /// position is recovered from the frequency, which the quantized
    /// marker y is in one-to-one correspondence with.
    fn current_gain(&self) -> f32 {
        let from_top = 1.0 - pitch::frequency_to_y(self.state.frequency);
        loudness::live_gain(self.state.spl, from_top)
    }

    /// Begin audible output with the current state. An already playing
    /// tone is stopped first, so exactly one generator is live afterward.
    /// If the device is unavailable the failure is logged and we stay
    /// idle.
    pub fn start(&mut self) {
        self.stop();

        let mut tone = match self.backend.start_tone() {
            Ok(tone) => tone,
            Err(err) => {
                log::warn!("audio device unavailable, tone not started: {err:#}");
                return;
            }
        };
        tone.set_waveform(self.waveform);
        tone.set_frequency(self.state.frequency);
        tone.set_pan(self.state.pan);
        tone.set_gain(self.current_gain());
        self.tone = Some(tone);
    }

    /// Release the generator. Idempotent; a teardown error is logged and
    /// the transition to idle still happens.
    pub fn stop(&mut self) {
        if let Some(tone) = self.tone.take() {
            if let Err(err) = tone.stop() {
                log::warn!("tone teardown failed: {err:#}");
            }
        }
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Update frequency and pan, typically per drag event. Stored always;
    /// applied to the live generator when playing (pan and frequency set
    /// instantly, gain re-ramped for the new height). An out-of-range
    /// frequency is rejected and prior state kept.
    pub fn retune(&mut self, frequency: f32, pan: f32) -> Result<(), ExplorerError> {
        if !audible(frequency) {
            return Err(ExplorerError::OutOfRange(frequency));
        }
        self.state.frequency = frequency;
        self.state.pan = pan.clamp(-1.0, 1.0);

        let gain = self.current_gain();
        if let Some(tone) = self.tone.as_mut() {
            tone.set_frequency(self.state.frequency);
            tone.set_pan(self.state.pan);
            tone.set_gain(gain);
        }
        Ok(())
    }

    /// Update the SPL setting; a live tone re-ramps its gain immediately.
    pub fn set_spl(&mut self, spl: f32) {
        self.state.spl = spl.clamp(loudness::MIN_SPL, loudness::MAX_SPL);
        let gain = self.current_gain();
        if let Some(tone) = self.tone.as_mut() {
            tone.set_gain(gain);
        }
    }

    /// Change the tone shape; applied to a live generator without a
    /// restart.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        if let Some(tone) = self.tone.as_mut() {
            tone.set_waveform(waveform);
        }
    }

    /// Double or halve the frequency. A result outside the audible range
    /// leaves everything unchanged; otherwise returns the new frequency.
    pub fn change_octave(&mut self, direction: i32) -> Option<f32> {
        let next = self.state.frequency * 2.0f32.powi(direction);
        if !audible(next) {
            return None;
        }
        let pan = self.state.pan;
        self.retune(next, pan).ok()?;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Started,
        Waveform(Waveform),
        Frequency(f32),
        Pan(f32),
        Gain(f32),
        Stopped,
    }

    #[derive(Default)]
    struct Shared {
        events: Vec<Event>,
        live: i32,
        fail_start: bool,
        fail_stop: bool,
    }

    struct MockGenerator {
        shared: Rc<RefCell<Shared>>,
    }

    impl ToneGenerator for MockGenerator {
        fn set_waveform(&mut self, waveform: Waveform) {
            self.shared.borrow_mut().events.push(Event::Waveform(waveform));
        }
        fn set_frequency(&mut self, frequency: f32) {
            self.shared.borrow_mut().events.push(Event::Frequency(frequency));
        }
        fn set_pan(&mut self, pan: f32) {
            self.shared.borrow_mut().events.push(Event::Pan(pan));
        }
        fn set_gain(&mut self, gain: f32) {
            self.shared.borrow_mut().events.push(Event::Gain(gain));
        }
        fn stop(self: Box<Self>) -> Result<()> {
            let mut shared = self.shared.borrow_mut();
            shared.events.push(Event::Stopped);
            shared.live -= 1;
            if shared.fail_stop {
                Err(anyhow!("device refused to disconnect"))
            } else {
                Ok(())
            }
        }
    }

    struct MockBackend {
        shared: Rc<RefCell<Shared>>,
    }

    impl ToneBackend for MockBackend {
        fn start_tone(&mut self) -> Result<Box<dyn ToneGenerator>> {
            let mut shared = self.shared.borrow_mut();
            if shared.fail_start {
                return Err(anyhow!("no output device"));
            }
            shared.events.push(Event::Started);
            shared.live += 1;
            drop(shared);
            Ok(Box::new(MockGenerator {
                shared: Rc::clone(&self.shared),
            }))
        }
    }

    fn controller() -> (ToneController, Rc<RefCell<Shared>>) {
        let shared = Rc::new(RefCell::new(Shared::default()));
        let backend = MockBackend {
            shared: Rc::clone(&shared),
        };
        (ToneController::new(Box::new(backend)), shared)
    }

    #[test]
    fn start_applies_initial_parameters() {
        let (mut ctl, shared) = controller();
        ctl.set_waveform(Waveform::Square);
        ctl.start();

        assert!(ctl.is_playing());
        let events = shared.borrow().events.clone();
        assert_eq!(
            events,
            vec![
                Event::Started,
                Event::Waveform(Waveform::Square),
                Event::Frequency(440.0),
                Event::Pan(0.0),
                Event::Gain(loudness::live_gain(
                    60.0,
                    1.0 - pitch::frequency_to_y(440.0)
                )),
            ]
        );
    }

    #[test]
    fn restart_leaves_exactly_one_live_generator() {
        let (mut ctl, shared) = controller();
        ctl.start();
        ctl.start();
        assert!(ctl.is_playing());
        assert_eq!(shared.borrow().live, 1, "restart leaked a generator");
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut ctl, shared) = controller();
        ctl.stop();
        ctl.start();
        ctl.stop();
        ctl.stop();
        assert!(!ctl.is_playing());
        assert_eq!(shared.borrow().live, 0);
    }

    #[test]
    fn teardown_failure_still_reaches_idle() {
        let (mut ctl, shared) = controller();
        ctl.start();
        shared.borrow_mut().fail_stop = true;
        ctl.stop();
        assert!(!ctl.is_playing());
        assert_eq!(shared.borrow().live, 0);
    }

    #[test]
    fn device_failure_stays_idle() {
        let (mut ctl, shared) = controller();
        shared.borrow_mut().fail_start = true;
        ctl.start();
        assert!(!ctl.is_playing());
        // Parameter changes while idle are stored but not rendered.
        ctl.set_spl(80.0);
        assert_eq!(ctl.state().spl, 80.0);
        assert!(shared.borrow().events.is_empty());
    }

    #[test]
    fn retune_rejects_out_of_range_and_keeps_state() {
        let (mut ctl, _) = controller();
        assert!(ctl.retune(25000.0, 0.5).is_err());
        assert!(ctl.retune(10.0, 0.5).is_err());
        assert_eq!(ctl.state().frequency, 440.0);
        assert_eq!(ctl.state().pan, 0.0);

        ctl.retune(880.0, 0.25).unwrap();
        assert_eq!(ctl.state().frequency, 880.0);
        assert_eq!(ctl.state().pan, 0.25);
    }

    #[test]
    fn retune_while_playing_updates_the_generator() {
        let (mut ctl, shared) = controller();
        ctl.start();
        shared.borrow_mut().events.clear();

        ctl.retune(880.0, -1.0).unwrap();
        let events = shared.borrow().events.clone();
        assert_eq!(events[0], Event::Frequency(880.0));
        assert_eq!(events[1], Event::Pan(-1.0));
        assert!(matches!(events[2], Event::Gain(_)));
    }

    #[test]
    fn waveform_change_applies_live_without_restart() {
        let (mut ctl, shared) = controller();
        ctl.start();
        shared.borrow_mut().events.clear();

        ctl.set_waveform(Waveform::Sawtooth);
        let events = shared.borrow().events.clone();
        assert_eq!(events, vec![Event::Waveform(Waveform::Sawtooth)]);
        assert_eq!(shared.borrow().live, 1);
    }

    #[test]
    fn octave_change_doubles_or_rejects() {
        let (mut ctl, _) = controller();
        assert_eq!(ctl.change_octave(1), Some(880.0));
        assert_eq!(ctl.state().frequency, 880.0);
        assert_eq!(ctl.change_octave(-1), Some(440.0));

        // Push to the top of the range, then one more octave is a no-op.
        ctl.retune(10240.0, 0.0).unwrap();
        assert_eq!(ctl.change_octave(1), None);
        assert_eq!(ctl.state().frequency, 10240.0);
    }

    #[test]
    fn toggle_flips_between_idle_and_playing() {
        let (mut ctl, shared) = controller();
        ctl.toggle();
        assert!(ctl.is_playing());
        ctl.toggle();
        assert!(!ctl.is_playing());
        assert_eq!(shared.borrow().live, 0);
    }
}
