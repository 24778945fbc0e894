use thiserror::Error;

/// Startup-time configuration errors.
///
/// Every variant is fatal: the scheduler is never constructed, so no
/// indicator line is ever asserted with an inconsistent configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("frame size {0} is not a power of two (minimum 2)")]
    NotPowerOfTwo(usize),

    #[error("twiddle table holds {actual} coefficients, frame size {frame_size} needs {expected}")]
    TwiddleMismatch {
        frame_size: usize,
        expected: usize,
        actual: usize,
    },

    #[error("transform length {transform} does not match frame size {frame_size}")]
    TransformMismatch { frame_size: usize, transform: usize },

    #[error("sample rate must be non-zero")]
    ZeroSampleRate,

    #[error("sample source is empty")]
    EmptySource,

    #[error("band thresholds must satisfy 0 < low/mid ({low_mid} Hz) < mid/high ({mid_high} Hz)")]
    InvalidThresholds { low_mid: f32, mid_high: f32 },

    #[error("{band} band owns no bin at {sample_rate} Hz with frame size {frame_size}")]
    DegenerateBand {
        band: &'static str,
        sample_rate: u32,
        frame_size: usize,
    },
}
