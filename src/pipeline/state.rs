use rustfft::num_complex::Complex;

use crate::audio::source::SampleTable;
use crate::dsp::classify::{classify, Band, BandThresholds};
use crate::dsp::transform::{check_frame_size, ForwardTransform, COMPLEX_ZERO};
use crate::dsp::window::Window;
use crate::error::ConfigError;

/// Every buffer the per-cycle analysis touches, allocated once.
pub struct Pipeline<T> {
    window: Window,
    frame: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    transform: T,
    sample_rate: u32,
    thresholds: BandThresholds,
}

impl<T: ForwardTransform> Pipeline<T> {
    /// Validates the whole configuration before any buffer is handed out.
    pub fn new(
        frame_size: usize,
        transform: T,
        sample_rate: u32,
        thresholds: BandThresholds,
    ) -> Result<Self, ConfigError> {
        check_frame_size(frame_size)?;
        if transform.len() != frame_size {
            return Err(ConfigError::TransformMismatch {
                frame_size,
                transform: transform.len(),
            });
        }
        thresholds.validate(sample_rate, frame_size)?;

        Ok(Self {
            window: Window::hamming(frame_size),
            frame: vec![0.0; frame_size],
            spectrum: vec![COMPLEX_ZERO; frame_size],
            transform,
            sample_rate,
            thresholds,
        })
    }

    /// Window, transform and classify the frame starting at `start`.
    pub fn process(&mut self, source: &SampleTable, start: usize) -> Band {
        source.read_wrapped(start, &mut self.frame);
        self.window.apply(&mut self.frame);
        self.transform.forward(&self.frame, &mut self.spectrum);
        classify(&self.spectrum, self.sample_rate, &self.thresholds)
    }
}
