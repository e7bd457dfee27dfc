/*
 * // Copyright (c) Radzivon Bartoshyk. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::gaussian::gaussian_util::{fixed_scale_for, round_half_up, window_size, MAX_FIXED_SCALE};
use crate::SmoothError;
use num_traits::{Float, FromPrimitive};

/// Multiplier applied after the vertical pass before narrowing to 16 bits.
pub const BOOST: u16 = 90;

/// Largest boost for which `255 * boost` still fits the signed 16 bit output.
pub const MAX_BOOST: u16 = 128;

/// Builds a normalized gaussian kernel of `1 + 2 * ceil(2.5 * sigma)` taps.
///
/// Taps are `exp(-0.5 * (i - center)^2 / sigma^2) / (sigma * sqrt(2 * PI))`,
/// afterwards divided by their sum so the truncated window sums to exactly one.
pub fn gaussian_kernel_1d<F: Float + FromPrimitive>(sigma: f32) -> Result<Vec<F>, SmoothError> {
    let width = window_size(sigma)?;
    let sigma_f = F::from_f32(sigma).ok_or(SmoothError::NegativeOrZeroSigma)?;
    let two_pi = F::from_f64(2. * std::f64::consts::PI).unwrap_or_else(F::one);
    let half = F::from_f32(0.5).unwrap_or_else(F::one);

    let mut kernel: Vec<F> = vec![F::zero(); width];
    let scale = F::one() / (two_pi.sqrt() * sigma_f);
    let mean = width / 2;

    let mut sum_norm = F::zero();
    for (x, item) in kernel.iter_mut().enumerate() {
        let dx = F::from_usize(x.abs_diff(mean)).unwrap_or_else(F::zero) / sigma_f;
        let new_weight = (-half * dx * dx).exp() * scale;
        *item = new_weight;
        sum_norm = sum_norm + new_weight;
    }

    if sum_norm != F::zero() {
        let sum_scale = F::one() / sum_norm;
        for item in kernel.iter_mut() {
            *item = *item * sum_scale;
        }
    }

    Ok(kernel)
}

/// Normalized, symmetric, odd length gaussian kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    taps: Vec<f32>,
    sigma: f32,
}

impl Kernel {
    /// Builds a kernel for `sigma`, fails with [SmoothError::NegativeOrZeroSigma] if `sigma <= 0`.
    pub fn new(sigma: f32) -> Result<Kernel, SmoothError> {
        Ok(Kernel {
            taps: gaussian_kernel_1d::<f32>(sigma)?,
            sigma,
        })
    }

    #[inline]
    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    #[inline]
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Half width, `len / 2`.
    #[inline]
    pub fn center(&self) -> usize {
        self.taps.len() / 2
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

/// Integer rendition of a [Kernel] for integer-only arithmetic.
///
/// Each tap is `round(tap * 2^scale)`, so the taps sum to `2^scale` within rounding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedKernel {
    taps: Vec<u16>,
    scale: u32,
}

impl FixedKernel {
    /// Derives the kernel using the largest scale that keeps every tap inside `u16`.
    pub fn from_kernel(kernel: &Kernel) -> Result<FixedKernel, SmoothError> {
        let max_tap = kernel.taps().iter().fold(0f32, |acc, &x| acc.max(x));
        FixedKernel::with_scale(kernel, fixed_scale_for(max_tap as f64))
    }

    /// Derives the kernel with an explicit power of two scale.
    pub fn with_scale(kernel: &Kernel, scale: u32) -> Result<FixedKernel, SmoothError> {
        if scale > MAX_FIXED_SCALE {
            return Err(SmoothError::KernelTooLarge(kernel.len()));
        }
        let multiplier = (1u64 << scale) as f64;
        let mut taps = Vec::with_capacity(kernel.len());
        for &tap in kernel.taps() {
            let v = round_half_up(tap as f64 * multiplier);
            if v > u16::MAX as f64 {
                return Err(SmoothError::KernelTooLarge(kernel.len()));
            }
            taps.push(v as u16);
        }
        Ok(FixedKernel { taps, scale })
    }

    /// Constant 15 tap kernel for sigma = 2.5 with 16 bit scale used by the DSP task.
    pub fn reference() -> FixedKernel {
        FixedKernel {
            taps: vec![
                208, 588, 1418, 2915, 5103, 7613, 9678, 10484, 9678, 7613, 5103, 2915, 1418, 588,
                208,
            ],
            scale: 16,
        }
    }

    #[inline]
    pub fn taps(&self) -> &[u16] {
        &self.taps
    }

    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    #[inline]
    pub fn center(&self) -> usize {
        self.taps.len() / 2
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn sum(&self) -> u64 {
        self.taps.iter().map(|&x| x as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_sums_to_one() {
        for sigma in [0.3f32, 0.8, 1.0, 1.7, 2.5, 3.2, 5.0, 11.3] {
            let kernel = Kernel::new(sigma).unwrap();
            let sum: f32 = kernel.taps().iter().sum();
            assert!(
                (sum - 1.0).abs() <= 1e-5,
                "Kernel for sigma {sigma} sums to {sum}"
            );
            let sum_f64: f64 = gaussian_kernel_1d::<f64>(sigma).unwrap().iter().sum();
            assert!((sum_f64 - 1.0).abs() <= 1e-12);
        }
    }

    #[test]
    fn test_kernel_sigma_one() {
        let kernel = Kernel::new(1.0).unwrap();
        assert_eq!(kernel.len(), 7);
        assert_eq!(kernel.center(), 3);
        let taps = kernel.taps();
        for i in 0..3 {
            assert_eq!(taps[i], taps[6 - i]);
            assert!(taps[i] < taps[i + 1]);
        }
    }

    #[test]
    fn test_kernel_rejects_bad_sigma() {
        assert_eq!(Kernel::new(0.), Err(SmoothError::NegativeOrZeroSigma));
        assert_eq!(Kernel::new(-2.5), Err(SmoothError::NegativeOrZeroSigma));
        assert_eq!(Kernel::new(f32::INFINITY), Err(SmoothError::NegativeOrZeroSigma));
    }

    #[test]
    fn test_fixed_kernel_matches_reference_constants() {
        let kernel = Kernel::new(2.5).unwrap();
        let fixed = FixedKernel::with_scale(&kernel, 16).unwrap();
        let reference = FixedKernel::reference();
        assert_eq!(fixed.len(), reference.len());
        for (i, (&a, &b)) in fixed.taps().iter().zip(reference.taps().iter()).enumerate() {
            let diff = (a as i32 - b as i32).abs();
            assert!(diff <= 1, "Tap {i} differs by {diff}: {a} vs {b}");
        }
    }

    #[test]
    fn test_fixed_kernel_scale() {
        let kernel = Kernel::new(2.5).unwrap();
        let fixed = FixedKernel::from_kernel(&kernel).unwrap();
        assert_eq!(fixed.scale(), 18);
        let expected = 1u64 << fixed.scale();
        let diff = fixed.sum().abs_diff(expected);
        assert!(diff <= fixed.len() as u64, "Fixed sum {} far from {expected}", fixed.sum());
        assert!(FixedKernel::with_scale(&kernel, 20).is_err());
        assert!(FixedKernel::with_scale(&kernel, MAX_FIXED_SCALE + 1).is_err());
    }
}
