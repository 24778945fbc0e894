use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Mid,
    High,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Low, Band::Mid, Band::High];

    /// Output line driven for this band: 0 = low, 1 = mid, 2 = high.
    pub fn index(self) -> usize {
        match self {
            Band::Low => 0,
            Band::Mid => 1,
            Band::High => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Low => "low",
            Band::Mid => "mid",
            Band::High => "high",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Band edges in Hz. A frequency equal to an edge belongs to the upper band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub low_mid_hz: f32,
    pub mid_high_hz: f32,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            low_mid_hz: 500.0,
            mid_high_hz: 2000.0,
        }
    }
}

impl BandThresholds {
    pub fn band_for(&self, freq: f32) -> Band {
        if freq < self.low_mid_hz {
            Band::Low
        } else if freq < self.mid_high_hz {
            Band::Mid
        } else {
            Band::High
        }
    }

    /// Checks that every band owns at least one bin in `0..frame_size/2`.
    ///
    /// Low always owns bin 0. Mid and High must each own the first bin at or
    /// above their lower edge, and that bin must sit below the next edge (or
    /// below N/2 for High).
    pub fn validate(&self, sample_rate: u32, frame_size: usize) -> Result<(), ConfigError> {
        if !(self.low_mid_hz > 0.0 && self.low_mid_hz < self.mid_high_hz) {
            return Err(ConfigError::InvalidThresholds {
                low_mid: self.low_mid_hz,
                mid_high: self.mid_high_hz,
            });
        }
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }

        let half = frame_size / 2;
        let first_bin_at =
            |hz: f32| (0..half).find(|&k| bin_frequency(k, sample_rate, frame_size) >= hz);
        let degenerate = |band: &'static str| ConfigError::DegenerateBand {
            band,
            sample_rate,
            frame_size,
        };

        match first_bin_at(self.low_mid_hz) {
            Some(k) if bin_frequency(k, sample_rate, frame_size) < self.mid_high_hz => {}
            _ => return Err(degenerate("mid")),
        }
        if first_bin_at(self.mid_high_hz).is_none() {
            return Err(degenerate("high"));
        }
        Ok(())
    }
}

/// Centre frequency of bin `k`: `k · sample_rate / N`.
pub fn bin_frequency(k: usize, sample_rate: u32, frame_size: usize) -> f32 {
    k as f32 * sample_rate as f32 / frame_size as f32
}

/// Index of the largest magnitude in the lower half of `spectrum`.
///
/// Ties go to the lowest bin; an all-zero spectrum yields bin 0.
pub fn dominant_bin(spectrum: &[Complex<f32>]) -> usize {
    let mut max_mag = 0.0f32;
    let mut max_index = 0;
    for (k, c) in spectrum[..spectrum.len() / 2].iter().enumerate() {
        let mag = (c.re * c.re + c.im * c.im).sqrt();
        if mag > max_mag {
            max_mag = mag;
            max_index = k;
        }
    }
    max_index
}

/// Classifies one spectrum of `spectrum.len()` bins by its dominant frequency.
pub fn classify(spectrum: &[Complex<f32>], sample_rate: u32, thresholds: &BandThresholds) -> Band {
    let k = dominant_bin(spectrum);
    thresholds.band_for(bin_frequency(k, sample_rate, spectrum.len()))
}
