//! # Tone Playback Module
//!
//! Fire-and-forget tone synthesis using CPAL (Cross-Platform Audio Library).
//! The GUI pushes [`PlayCommand`]s down a channel; the output-stream callback
//! drains the channel and mixes one enveloped sine voice per command. Nothing
//! here blocks the caller.
//!
//! ## Features
//! - Automatic output device selection
//! - Plucked-string style attack/decay envelope
//! - Polyphonic mixing with a fixed voice cap

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Receiver;

use crate::pitch::PitchClass;

/// Upper bound on simultaneously sounding voices; the oldest voice is
/// dropped first when a click storm exceeds it.
const MAX_VOICES: usize = 16;

/// Amplitude envelope of a played tone, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack_s: f32,
    pub decay_s: f32,
    pub gain: f32,
}

impl Default for Envelope {
    /// A short pluck: near-instant attack, just over a second of decay.
    fn default() -> Envelope {
        Envelope {
            attack_s: 0.005,
            decay_s: 1.2,
            gain: 0.2,
        }
    }
}

/// One tone request. A dyad click sends two of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayCommand {
    pub pitch: PitchClass,
    /// Scientific octave number (A in octave 4 is 440 Hz).
    pub octave: i32,
    pub envelope: Envelope,
}

/// Equal-tempered frequency of a pitch class in a given octave, A4 = 440 Hz.
pub fn note_frequency(pitch: PitchClass, octave: i32) -> f32 {
    let midi = 12 * (octave + 1) + pitch.semitone() as i32;
    440.0 * 2.0_f32.powf((midi as f32 - 69.0) / 12.0)
}

/// A single sounding sine tone.
struct Voice {
    phase: f32,
    step: f32,
    age: usize,
    attack: usize,
    decay: usize,
    gain: f32,
}

impl Voice {
    fn new(freq: f32, sample_rate: f32, envelope: &Envelope) -> Voice {
        Voice {
            phase: 0.0,
            step: freq / sample_rate,
            age: 0,
            attack: (envelope.attack_s * sample_rate) as usize,
            decay: (envelope.decay_s * sample_rate) as usize,
            gain: envelope.gain,
        }
    }

    /// Next sample, or `None` once the envelope has run out.
    fn next_sample(&mut self) -> Option<f32> {
        if self.age >= self.attack + self.decay {
            return None;
        }
        let amp = if self.age < self.attack {
            self.age as f32 / self.attack.max(1) as f32
        } else {
            let t = (self.age - self.attack) as f32 / self.decay.max(1) as f32;
            // Quadratic decay reads as a pluck rather than an organ stop.
            (1.0 - t) * (1.0 - t)
        };

        let sample = (self.phase * std::f32::consts::TAU).sin() * amp * self.gain;
        self.phase = (self.phase + self.step).fract();
        self.age += 1;
        Some(sample)
    }
}

/// Starts tone playback on the default output device.
///
/// This function:
/// 1. Selects the default audio output device
/// 2. Picks an f32 output configuration near 44.1 kHz
/// 3. Sets up a callback that drains `commands` and mixes active voices
///
/// # Arguments
/// * `commands` - Channel of tone requests from the UI thread
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Audio stream handle and sample rate
/// * `Err(e)` - Error if audio setup fails
///
/// The returned stream must be kept alive for playback to continue; dropping
/// it stops the audio thread.
pub fn start_tone_player(commands: Receiver<PlayCommand>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;

    println!("Using audio output device: {}", device.name()?);

    let configs = device.supported_output_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, 44100)
        .ok_or_else(|| anyhow!("No suitable f32 output format found"))?;

    // The closest range may not contain 44.1 kHz exactly; clamp into it.
    let rate = 44100.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));

    let sample_rate_val = config.sample_rate().0;
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    println!("Selected sample rate: {} Hz", sample_rate_val);

    let err_fn = |err| eprintln!("An error occurred on the audio stream: {}", err);

    let sample_rate = sample_rate_val as f32;
    let mut voices: Vec<Voice> = Vec::new();

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Pick up whatever arrived since the last callback.
            while let Ok(cmd) = commands.try_recv() {
                if voices.len() >= MAX_VOICES {
                    voices.remove(0);
                }
                let freq = note_frequency(cmd.pitch, cmd.octave);
                voices.push(Voice::new(freq, sample_rate, &cmd.envelope));
            }

            for frame in data.chunks_mut(channels) {
                let mut mixed = 0.0;
                voices.retain_mut(|voice| match voice.next_sample() {
                    Some(sample) => {
                        mixed += sample;
                        true
                    }
                    None => false,
                });
                for sample in frame {
                    *sample = mixed;
                }
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate_val))
}

/// Finds the best supported output configuration for the target sample rate.
///
/// Keeps only 32-bit float formats, then picks the range whose bounds sit
/// closest to the target, preferring fewer channels on ties.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i32 - target_rate as i32).abs();
            let max_diff = (c.max_sample_rate().0 as i32 - target_rate as i32).abs();
            (min_diff.min(max_diff), c.channels())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequencies_follow_equal_temperament() {
        assert!((note_frequency(PitchClass::A, 4) - 440.0).abs() < 1e-3);
        assert!((note_frequency(PitchClass::A, 3) - 220.0).abs() < 1e-3);
        assert!((note_frequency(PitchClass::C, 4) - 261.6256).abs() < 0.01);
        assert!((note_frequency(PitchClass::E, 2) - 82.4069).abs() < 0.01);
    }

    #[test]
    fn voices_decay_to_silence() {
        let envelope = Envelope::default();
        let mut voice = Voice::new(440.0, 44_100.0, &envelope);
        let mut produced = 0usize;
        while let Some(sample) = voice.next_sample() {
            assert!(sample.abs() <= envelope.gain + 1e-6);
            produced += 1;
            assert!(produced < 44_100 * 10, "voice never ended");
        }
        // Roughly attack plus decay worth of samples.
        let expected = ((envelope.attack_s + envelope.decay_s) * 44_100.0) as usize;
        assert!(produced.abs_diff(expected) <= 2);
    }
}
