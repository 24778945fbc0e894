//! Fixed-size forward transforms from a real frame into a complex spectrum.
//!
//! The pipeline only depends on [`ForwardTransform`]. `RustFftTransform` is the
//! production path; `Radix2Transform` is a small reference FFT driven by an
//! explicit twiddle table, used to cross-check the production path and
//! selectable from the command line.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::ConfigError;

pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// A forward real-to-complex DFT of fixed power-of-two length.
///
/// `input` holds exactly `len()` real samples and is left untouched;
/// `output` receives `len()` complex bins. Implementations must not allocate.
pub trait ForwardTransform {
    fn len(&self) -> usize;

    fn forward(&mut self, input: &[f32], output: &mut [Complex<f32>]);
}

impl<T: ForwardTransform + ?Sized> ForwardTransform for Box<T> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn forward(&mut self, input: &[f32], output: &mut [Complex<f32>]) {
        (**self).forward(input, output)
    }
}

/// Rejects frame sizes the transforms cannot run.
pub fn check_frame_size(size: usize) -> Result<(), ConfigError> {
    if size < 2 || !size.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo(size));
    }
    Ok(())
}

pub struct RustFftTransform {
    fft: Arc<dyn Fft<f32>>,
    input: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl RustFftTransform {
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        check_frame_size(size)?;

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![COMPLEX_ZERO; fft.get_outofplace_scratch_len()];

        Ok(Self {
            fft,
            input: vec![COMPLEX_ZERO; size],
            scratch,
        })
    }
}

impl ForwardTransform for RustFftTransform {
    fn len(&self) -> usize {
        self.input.len()
    }

    fn forward(&mut self, input: &[f32], output: &mut [Complex<f32>]) {
        debug_assert_eq!(input.len(), self.input.len());
        for (c, &s) in self.input.iter_mut().zip(input.iter()) {
            *c = Complex::new(s, 0.0);
        }
        // rustfft may use `self.input` as scratch; it is refilled every call
        self.fft
            .process_outofplace_with_scratch(&mut self.input, output, &mut self.scratch);
    }
}

/// Twiddle factors `e^{-2πik/N}` for `k in 0..N/2`.
#[derive(Clone, Debug)]
pub struct TwiddleTable {
    coeffs: Vec<Complex<f32>>,
}

impl TwiddleTable {
    pub fn generate(size: usize) -> Self {
        let coeffs = (0..size / 2)
            .map(|k| {
                let theta = -2.0 * std::f64::consts::PI * k as f64 / size as f64;
                Complex::new(theta.cos() as f32, theta.sin() as f32)
            })
            .collect();
        Self { coeffs }
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }
}

/// Iterative radix-2 decimation-in-time FFT.
pub struct Radix2Transform {
    twiddles: TwiddleTable,
    bit_reversed: Vec<usize>,
}

impl Radix2Transform {
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        Self::with_table(size, TwiddleTable::generate(size))
    }

    pub fn with_table(size: usize, twiddles: TwiddleTable) -> Result<Self, ConfigError> {
        check_frame_size(size)?;
        if twiddles.len() != size / 2 {
            return Err(ConfigError::TwiddleMismatch {
                frame_size: size,
                expected: size / 2,
                actual: twiddles.len(),
            });
        }

        let bits = size.trailing_zeros();
        let bit_reversed = (0..size)
            .map(|i| i.reverse_bits() >> (usize::BITS - bits))
            .collect();

        Ok(Self {
            twiddles,
            bit_reversed,
        })
    }
}

impl ForwardTransform for Radix2Transform {
    fn len(&self) -> usize {
        self.bit_reversed.len()
    }

    fn forward(&mut self, input: &[f32], output: &mut [Complex<f32>]) {
        let n = self.bit_reversed.len();
        debug_assert_eq!(input.len(), n);
        debug_assert_eq!(output.len(), n);

        for (i, &j) in self.bit_reversed.iter().enumerate() {
            output[j] = Complex::new(input[i], 0.0);
        }

        let tw = &self.twiddles.coeffs;
        let mut span = 2;
        while span <= n {
            let half = span / 2;
            let stride = n / span;
            for start in (0..n).step_by(span) {
                for k in 0..half {
                    let a = output[start + k];
                    let b = output[start + k + half] * tw[k * stride];
                    output[start + k] = a + b;
                    output[start + k + half] = a - b;
                }
            }
            span <<= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signal(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                0.6 * (2.0 * std::f32::consts::PI * 5.0 * t).sin()
                    + 0.3 * (2.0 * std::f32::consts::PI * 37.0 * t).cos()
                    + if i % 7 == 0 { 0.1 } else { -0.05 }
            })
            .collect()
    }

    #[test]
    fn rejects_non_power_of_two() {
        for size in [0, 1, 3, 1000, 1023, 44100] {
            assert_eq!(
                RustFftTransform::new(size).err(),
                Some(ConfigError::NotPowerOfTwo(size))
            );
            assert!(Radix2Transform::new(size).is_err());
        }
        assert!(RustFftTransform::new(1024).is_ok());
        assert!(Radix2Transform::new(2).is_ok());
    }

    #[test]
    fn rejects_mismatched_twiddle_table() {
        let table = TwiddleTable::generate(512);
        let err = Radix2Transform::with_table(1024, table).err();
        assert_eq!(
            err,
            Some(ConfigError::TwiddleMismatch {
                frame_size: 1024,
                expected: 512,
                actual: 256,
            })
        );

        let empty = TwiddleTable { coeffs: Vec::new() };
        assert!(Radix2Transform::with_table(8, empty).is_err());
    }

    #[test]
    fn twiddles_lie_on_unit_circle() {
        let table = TwiddleTable::generate(64);
        assert_eq!(table.len(), 32);
        assert!((table.coeffs[0] - Complex::new(1.0, 0.0)).norm() < 1e-6);
        // k = N/4 is -i
        assert!((table.coeffs[16] - Complex::new(0.0, -1.0)).norm() < 1e-6);
        for c in &table.coeffs {
            assert!((c.norm() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn reference_matches_rustfft() {
        for n in [2, 8, 64, 1024] {
            let input = test_signal(n);
            let mut fast = RustFftTransform::new(n).unwrap();
            let mut reference = Radix2Transform::new(n).unwrap();
            assert_eq!(fast.len(), n);
            assert_eq!(reference.len(), n);

            let mut a = vec![COMPLEX_ZERO; n];
            let mut b = vec![COMPLEX_ZERO; n];
            fast.forward(&input, &mut a);
            reference.forward(&input, &mut b);

            for k in 0..n {
                assert!(
                    (a[k] - b[k]).norm() < 1e-4 * n as f32,
                    "n={} bin {}: {} vs {}",
                    n,
                    k,
                    a[k],
                    b[k]
                );
            }
        }
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        let n = 16;
        let mut input = vec![0.0f32; n];
        input[0] = 1.0;
        let mut out = vec![COMPLEX_ZERO; n];
        Radix2Transform::new(n).unwrap().forward(&input, &mut out);
        for c in &out {
            assert!((c - Complex::new(1.0, 0.0)).norm() < 1e-6);
        }
    }

    #[test]
    fn cosine_lands_in_its_bin() {
        let n = 256;
        let bin = 20;
        let input: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / n as f32).cos())
            .collect();
        let mut out = vec![COMPLEX_ZERO; n];
        RustFftTransform::new(n).unwrap().forward(&input, &mut out);

        assert!((out[bin].norm() - n as f32 / 2.0).abs() < 1e-2);
        assert!((out[n - bin].norm() - n as f32 / 2.0).abs() < 1e-2);
        assert!(out[bin + 1].norm() < 1e-2);
    }

    #[test]
    fn input_is_left_untouched() {
        let n = 32;
        let input = test_signal(n);
        let copy = input.clone();
        let mut out = vec![COMPLEX_ZERO; n];
        let mut fft = RustFftTransform::new(n).unwrap();
        fft.forward(&input, &mut out);
        fft.forward(&input, &mut out);
        assert_eq!(input, copy);
    }
}
