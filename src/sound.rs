use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use log::{debug, error, warn};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("unsupported sample format {0}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error(transparent)]
    QueryConfigs(#[from] cpal::SupportedStreamConfigsError),
    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error(transparent)]
    Build(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
}

/// Square wave with a fixed frequency, silent while the gate is closed.
pub struct SquareWave {
    half_period: f32,
    position: f32,
    amplitude: f32,
    gate: Arc<AtomicBool>,
}

impl SquareWave {
    pub fn new(tone_hz: u32, sample_rate: u32, amplitude: i16, gate: Arc<AtomicBool>) -> Self {
        Self {
            half_period: sample_rate as f32 / tone_hz.max(1) as f32 / 2.0,
            position: 0.0,
            amplitude: amplitude.max(0) as f32 / i16::MAX as f32,
            gate,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        if !self.gate.load(Ordering::Relaxed) {
            self.position = 0.0;
            return 0.0;
        }
        let high = self.position < self.half_period;
        self.position += 1.0;
        if self.position >= self.half_period * 2.0 {
            self.position -= self.half_period * 2.0;
        }
        if high {
            self.amplitude
        } else {
            -self.amplitude
        }
    }
}

/// The buzzer. The output stream runs for the lifetime of the value and
/// plays the tone whenever `set_active(true)` was the last call.
pub struct Tone {
    gate: Arc<AtomicBool>,
    _stream: cpal::Stream,
}

impl Tone {
    pub fn new(config: &Config) -> Result<Self, SoundError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(SoundError::NoDevice)?;

        let wanted = cpal::SampleRate(config.sample_rate);
        let supported = device
            .supported_output_configs()?
            .find(|c| c.min_sample_rate() <= wanted && wanted <= c.max_sample_rate())
            .map(|c| c.with_sample_rate(wanted));
        let supported = match supported {
            Some(c) => c,
            None => {
                let fallback = device.default_output_config()?;
                warn!(
                    "output device cannot play at {} Hz, using {} Hz",
                    config.sample_rate,
                    fallback.sample_rate().0
                );
                fallback
            }
        };
        let format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();
        debug!("audio stream {:?} as {}", stream_config, format);

        let gate = Arc::new(AtomicBool::new(false));
        let wave = SquareWave::new(
            config.tone_hz,
            stream_config.sample_rate.0,
            config.amplitude,
            Arc::clone(&gate),
        );

        let stream = match format {
            cpal::SampleFormat::I8 => build::<i8>(&device, &stream_config, wave),
            cpal::SampleFormat::I16 => build::<i16>(&device, &stream_config, wave),
            cpal::SampleFormat::I32 => build::<i32>(&device, &stream_config, wave),
            cpal::SampleFormat::I64 => build::<i64>(&device, &stream_config, wave),
            cpal::SampleFormat::U8 => build::<u8>(&device, &stream_config, wave),
            cpal::SampleFormat::U16 => build::<u16>(&device, &stream_config, wave),
            cpal::SampleFormat::U32 => build::<u32>(&device, &stream_config, wave),
            cpal::SampleFormat::U64 => build::<u64>(&device, &stream_config, wave),
            cpal::SampleFormat::F32 => build::<f32>(&device, &stream_config, wave),
            cpal::SampleFormat::F64 => build::<f64>(&device, &stream_config, wave),
            sample_format => return Err(SoundError::UnsupportedFormat(sample_format)),
        }?;
        stream.play()?;

        Ok(Self {
            gate,
            _stream: stream,
        })
    }

    pub fn set_active(&self, active: bool) {
        self.gate.store(active, Ordering::Relaxed);
    }
}

fn build<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut wave: SquareWave,
) -> Result<cpal::Stream, SoundError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let err_fn = |err| error!("an error occurred on the audio stream: {}", err);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            write_data(data, channels, &mut || wave.next_sample())
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}

fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
where
    T: Sample + FromSample<f32>,
{
    for frame in output.chunks_mut(channels) {
        let value: T = T::from_sample(next_sample());
        for sample in frame.iter_mut() {
            *sample = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(gate_open: bool) -> SquareWave {
        // 4 samples per half cycle
        SquareWave::new(
            1_000,
            8_000,
            i16::MAX,
            Arc::new(AtomicBool::new(gate_open)),
        )
    }

    #[test]
    fn closed_gate_is_silent() {
        let mut w = wave(false);
        assert!((0..64).all(|_| w.next_sample() == 0.0));
    }

    #[test]
    fn open_gate_alternates_half_cycles() {
        let mut w = wave(true);
        let samples: Vec<f32> = (0..16).map(|_| w.next_sample()).collect();
        assert_eq!(&samples[0..4], &[1.0; 4]);
        assert_eq!(&samples[4..8], &[-1.0; 4]);
        assert_eq!(&samples[8..12], &[1.0; 4]);
        assert_eq!(&samples[12..16], &[-1.0; 4]);
    }

    #[test]
    fn amplitude_scales_output() {
        let mut w = SquareWave::new(
            1_000,
            8_000,
            i16::MAX / 2,
            Arc::new(AtomicBool::new(true)),
        );
        let s = w.next_sample();
        assert!((s - 0.5).abs() < 0.001);
    }

    #[test]
    fn gate_can_be_toggled_while_playing() {
        let gate = Arc::new(AtomicBool::new(true));
        let mut w = SquareWave::new(1_000, 8_000, i16::MAX, Arc::clone(&gate));
        assert_ne!(w.next_sample(), 0.0);
        gate.store(false, Ordering::Relaxed);
        assert_eq!(w.next_sample(), 0.0);
        gate.store(true, Ordering::Relaxed);
        // restarts at the top of a cycle
        assert_eq!(w.next_sample(), 1.0);
    }

    #[test]
    fn write_data_fills_every_channel() {
        let mut n = 0.0;
        let mut next = || {
            n += 0.25;
            n
        };
        let mut out = [0.0f32; 6];
        write_data(&mut out, 2, &mut next);
        assert_eq!(out, [0.25, 0.25, 0.5, 0.5, 0.75, 0.75]);
    }
}
