//! The precomputed sample table the visualizer loops over.
//!
//! Tables come from three places: a decoded audio file cut down to a short
//! normalized segment, a synthetic tone, or silence. Whatever the origin, the
//! scheduler only ever sees a non-empty slice plus its sample rate.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use super::decode::DecodedAudio;
use crate::error::ConfigError;

/// Which part of a decoded file becomes the sample table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start_secs: f32,
    pub duration_secs: f32,
}

impl Default for Segment {
    fn default() -> Self {
        Self {
            start_secs: 10.0,
            duration_secs: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SampleTable {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleTable {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, ConfigError> {
        if samples.is_empty() {
            return Err(ConfigError::EmptySource);
        }
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// `len` samples of a full-scale sine at `freq` Hz.
    pub fn tone(freq: f32, sample_rate: u32, len: usize) -> Result<Self, ConfigError> {
        let step = 2.0 * std::f64::consts::PI * freq as f64 / sample_rate.max(1) as f64;
        // phase in f64 keeps long tables on-pitch
        let samples = (0..len).map(|i| (step * i as f64).sin() as f32).collect();
        Self::new(samples, sample_rate)
    }

    pub fn silence(sample_rate: u32, len: usize) -> Result<Self, ConfigError> {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Cuts `segment` out of `audio` and normalizes its peak to 1.0.
    ///
    /// A start past the end of the file falls back to the beginning, and the
    /// segment is clamped to what the file holds.
    pub fn from_audio(audio: &DecodedAudio, segment: Segment) -> Result<Self, ConfigError> {
        let sr = audio.sample_rate as f32;
        let total = audio.samples.len();

        let mut start = (segment.start_secs.max(0.0) * sr).round() as usize;
        if start >= total {
            log::warn!(
                "Segment start {:.2}s is past the end of the audio ({:.2}s), using the beginning",
                segment.start_secs,
                total as f32 / sr
            );
            start = 0;
        }
        let len = ((segment.duration_secs.max(0.0) * sr).round() as usize).min(total - start);

        let mut samples = audio.samples[start..start + len].to_vec();
        let peak = normalize_peak(&mut samples);
        log::info!(
            "Sample table: {} samples from {:.2}s, source peak {:.4}",
            samples.len(),
            start as f32 / sr,
            peak
        );

        Self::new(samples, audio.sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[allow(dead_code)]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Fills `out` with consecutive samples from `start`, wrapping around the
    /// end of the table as many times as needed.
    pub fn read_wrapped(&self, start: usize, out: &mut [f32]) {
        let len = self.samples.len();
        let mut pos = start % len;
        for slot in out.iter_mut() {
            *slot = self.samples[pos];
            pos += 1;
            if pos == len {
                pos = 0;
            }
        }
    }

    /// Renders the table as a C array for flashing onto a target.
    pub fn to_c_array(&self, name: &str) -> String {
        let mut out = String::with_capacity(self.samples.len() * 12 + 64);
        // String writes cannot fail
        let _ = writeln!(out, "const float {}[{}] = {{", name, self.samples.len());
        for s in &self.samples {
            let _ = writeln!(out, "{:.6}f,", s);
        }
        out.push_str("};\n");
        out
    }

    pub fn export_c_array(&self, path: &Path, name: &str) -> Result<()> {
        std::fs::write(path, self.to_c_array(name))
            .with_context(|| format!("Failed to write sample table to {}", path.display()))?;
        log::info!("Exported {} samples to {}", self.samples.len(), path.display());
        Ok(())
    }
}

/// Scales `samples` so the largest magnitude is 1.0 and returns the peak
/// before scaling. An all-zero slice is left untouched.
pub fn normalize_peak(samples: &mut [f32]) -> f32 {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if peak > 0.0 {
        for s in samples.iter_mut() {
            *s /= peak;
        }
    }
    peak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_audio(len: usize, sample_rate: u32) -> DecodedAudio {
        DecodedAudio {
            samples: (0..len).map(|i| i as f32 / len as f32 * 0.5).collect(),
            sample_rate,
        }
    }

    #[test]
    fn rejects_empty_and_zero_rate() {
        assert_eq!(SampleTable::new(vec![], 44100).err(), Some(ConfigError::EmptySource));
        assert_eq!(
            SampleTable::new(vec![0.0], 0).err(),
            Some(ConfigError::ZeroSampleRate)
        );
        assert!(SampleTable::silence(44100, 0).is_err());
    }

    #[test]
    fn tone_has_expected_shape() {
        let t = SampleTable::tone(1000.0, 44100, 44100).unwrap();
        assert_eq!(t.len(), 44100);
        assert_eq!(t.sample_rate(), 44100);
        assert_eq!(t.samples()[0], 0.0);
        let peak = t.samples().iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!((peak - 1.0).abs() < 1e-3);
        // a quarter period of 1 kHz at 44.1 kHz is 11.025 samples
        assert!(t.samples()[11] > 0.99);
    }

    #[test]
    fn read_wraps_around_end() {
        let t = SampleTable::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], 8000).unwrap();
        let mut out = [0.0f32; 4];
        t.read_wrapped(3, &mut out);
        assert_eq!(out, [3.0, 4.0, 0.0, 1.0]);

        t.read_wrapped(7, &mut out);
        assert_eq!(out, [2.0, 3.0, 4.0, 0.0]);
    }

    #[test]
    fn short_table_wraps_repeatedly() {
        let t = SampleTable::new(vec![1.0, -1.0, 0.5], 8000).unwrap();
        let mut out = [0.0f32; 8];
        t.read_wrapped(0, &mut out);
        assert_eq!(out, [1.0, -1.0, 0.5, 1.0, -1.0, 0.5, 1.0, -1.0]);
    }

    #[test]
    fn normalize_scales_to_unit_peak() {
        let mut s = vec![0.25, -0.5, 0.1];
        let peak = normalize_peak(&mut s);
        assert_eq!(peak, 0.5);
        assert_eq!(s, vec![0.5, -1.0, 0.2]);

        let mut silent = vec![0.0; 4];
        assert_eq!(normalize_peak(&mut silent), 0.0);
        assert!(silent.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn from_audio_cuts_and_normalizes_segment() {
        let audio = ramp_audio(8000, 1000);
        let table = SampleTable::from_audio(
            &audio,
            Segment {
                start_secs: 2.0,
                duration_secs: 1.5,
            },
        )
        .unwrap();
        assert_eq!(table.len(), 1500);
        assert_eq!(table.sample_rate(), 1000);
        let last = *table.samples().last().unwrap();
        assert!((last - 1.0).abs() < 1e-6);
        assert!(table.samples()[0] > 0.0 && table.samples()[0] < 1.0);
    }

    #[test]
    fn from_audio_clamps_and_falls_back() {
        let audio = ramp_audio(3000, 1000);
        // default segment starts at 10 s, beyond this 3 s file
        let table = SampleTable::from_audio(&audio, Segment::default()).unwrap();
        assert_eq!(table.len(), 1000);

        let tail = SampleTable::from_audio(
            &audio,
            Segment {
                start_secs: 2.5,
                duration_secs: 5.0,
            },
        )
        .unwrap();
        assert_eq!(tail.len(), 500);
    }

    #[test]
    fn zero_duration_segment_is_empty_source() {
        let audio = ramp_audio(3000, 1000);
        let err = SampleTable::from_audio(
            &audio,
            Segment {
                start_secs: 0.0,
                duration_secs: 0.0,
            },
        )
        .err();
        assert_eq!(err, Some(ConfigError::EmptySource));
    }

    #[test]
    fn c_array_layout() {
        let t = SampleTable::new(vec![0.5, -1.0], 44100).unwrap();
        assert_eq!(
            t.to_c_array("sound_samples"),
            "const float sound_samples[2] = {\n0.500000f,\n-1.000000f,\n};\n"
        );
    }
}
