use std::sync::{Arc, RwLock};

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, Stream};
use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;

use crate::core::loudness::{GAIN_RAMP_SECONDS, MIN_GAIN};
use crate::core::tone::{ToneBackend, ToneGenerator};
use crate::core::wave::Waveform;

/// Device-boundary failures. All of them are contained at the tone
/// controller: logged, never fatal.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    DeviceUnavailable,
    #[error("unsupported output sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),
    #[error("failed to query stream config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream: {0}")]
    Start(#[from] cpal::PlayStreamError),
    #[error("failed to stop output stream: {0}")]
    Teardown(#[from] cpal::PauseStreamError),
}

/// Events the audio thread sends back to the UI thread.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Error(String),
}

/// Parameters shared between the UI thread and the audio callback.
struct ToneParams {
    waveform: Waveform,
    frequency: f32,
    pan: f32,
    gain_target: f32,
}

/// cpal-backed tone source. Creating a tone opens the default output
/// device and starts a stream; stream errors are forwarded over the
/// event channel since the callback runs on the audio thread.
pub struct CpalBackend {
    events: Sender<StreamEvent>,
}

impl CpalBackend {
    pub fn new() -> (Self, Receiver<StreamEvent>) {
        let (events, receiver) = unbounded();
        (CpalBackend { events }, receiver)
    }
}

impl ToneBackend for CpalBackend {
    fn start_tone(&mut self) -> Result<Box<dyn ToneGenerator>> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceUnavailable)?;

        let config = device.default_output_config().map_err(AudioError::from)?;
        let sample_format = config.sample_format();
        let config = cpal::StreamConfig::from(config);

        let params = Arc::new(RwLock::new(ToneParams {
            waveform: Waveform::Sine,
            frequency: 440.0,
            pan: 0.0,
            gain_target: MIN_GAIN,
        }));

        let stream = match sample_format {
            SampleFormat::F32 => {
                create_stream::<f32>(&device, &config, Arc::clone(&params), self.events.clone())
            }
            SampleFormat::I16 => {
                create_stream::<i16>(&device, &config, Arc::clone(&params), self.events.clone())
            }
            SampleFormat::U16 => {
                create_stream::<u16>(&device, &config, Arc::clone(&params), self.events.clone())
            }
            other => return Err(AudioError::UnsupportedFormat(other).into()),
        }?;
        stream.play().map_err(AudioError::from)?;

        log::info!(
            "tone started on {}",
            device.name().unwrap_or_else(|_| "<unnamed device>".into())
        );
        Ok(Box::new(CpalTone { params, stream }))
    }
}

/// A live tone: the running stream plus the shared parameter snapshot.
struct CpalTone {
    params: Arc<RwLock<ToneParams>>,
    stream: Stream,
}

impl ToneGenerator for CpalTone {
    fn set_waveform(&mut self, waveform: Waveform) {
        if let Ok(mut params) = self.params.write() {
            params.waveform = waveform;
        }
    }

    fn set_frequency(&mut self, frequency: f32) {
        if let Ok(mut params) = self.params.write() {
            params.frequency = frequency;
        }
    }

    fn set_pan(&mut self, pan: f32) {
        if let Ok(mut params) = self.params.write() {
            params.pan = pan;
        }
    }

    fn set_gain(&mut self, gain: f32) {
        if let Ok(mut params) = self.params.write() {
            params.gain_target = gain;
        }
    }

    fn stop(self: Box<Self>) -> Result<()> {
        // The stream drops with self either way, so the device resource is
        // released even when pausing reports an error.
        self.stream.pause().map_err(AudioError::from)?;
        Ok(())
    }
}

/// Single-oscillator voice evaluated in the audio callback. Gain follows
/// its target through a one-pole ramp (~10 ms), so SPL and height changes
/// never click.
struct Voice {
    phase: f32,
    gain: f32,
    ramp_coeff: f32,
    sample_rate: f32,
}

impl Voice {
    fn new(sample_rate: f32) -> Self {
        Voice {
            phase: 0.0,
            gain: MIN_GAIN,
            ramp_coeff: 1.0 - (-1.0 / (GAIN_RAMP_SECONDS * sample_rate)).exp(),
            sample_rate,
        }
    }

    fn next_frame(&mut self, params: &ToneParams) -> (f32, f32) {
        self.gain += (params.gain_target - self.gain) * self.ramp_coeff;
        self.phase = (self.phase + params.frequency / self.sample_rate) % 1.0;

        let value = params.waveform.sample(self.phase) * self.gain;

        // Equal-power pan law.
        let left = ((1.0 - params.pan) * 0.5).sqrt();
        let right = ((1.0 + params.pan) * 0.5).sqrt();
        (value * left, value * right)
    }
}

fn create_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    params: Arc<RwLock<ToneParams>>,
    events: Sender<StreamEvent>,
) -> Result<Stream, AudioError>
where
    T: Sample + Send + 'static + cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let sample_rate = config.sample_rate.0 as f32;
    let mut voice = Voice::new(sample_rate);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let (left, right) = match params.read() {
                    Ok(params) => voice.next_frame(&params),
                    Err(_) => (0.0, 0.0),
                };

                if channels >= 2 {
                    frame[0] = T::from_sample(left);
                    frame[1] = T::from_sample(right);
                    for sample in frame.iter_mut().skip(2) {
                        *sample = T::from_sample(0.0);
                    }
                } else {
                    frame[0] = T::from_sample(0.5 * (left + right));
                }
            }
        },
        move |err| {
            let _ = events.send(StreamEvent::Error(err.to_string()));
        },
        None,
    )?;

    Ok(stream)
}
