use std::f32::consts::PI;

/// Precomputed Hamming analysis window, shared read-only by every frame.
pub struct Window {
    coeffs: Vec<f32>,
}

impl Window {
    pub fn hamming(size: usize) -> Self {
        let coeffs = match size {
            0 => Vec::new(),
            1 => vec![1.0],
            _ => (0..size)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / (size - 1) as f32).cos())
                .collect(),
        };
        Self { coeffs }
    }

    #[allow(dead_code)]
    pub fn coeffs(&self) -> &[f32] {
        &self.coeffs
    }

    /// `frame[i] *= window[i]`
    pub fn apply(&self, frame: &mut [f32]) {
        debug_assert_eq!(frame.len(), self.coeffs.len());
        for (sample, &w) in frame.iter_mut().zip(self.coeffs.iter()) {
            *sample *= w;
        }
    }
}
