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
use crate::SmoothError;

/// Largest window accepted by the kernel builder.
pub(crate) const MAX_WINDOW_SIZE: usize = u16::MAX as usize;

/// Upper bound for the power of two used to scale fixed point taps.
pub const MAX_FIXED_SCALE: u32 = 24;

/// Computes kernel window from sigma, `1 + 2 * ceil(2.5 * sigma)`.
pub fn window_size(sigma: f32) -> Result<usize, SmoothError> {
    if !sigma.is_finite() || sigma <= 0. {
        return Err(SmoothError::NegativeOrZeroSigma);
    }
    let half = (2.5f64 * sigma as f64).ceil();
    if half > ((MAX_WINDOW_SIZE - 1) / 2) as f64 {
        return Err(SmoothError::KernelTooLarge(usize::MAX));
    }
    Ok(1 + 2 * half as usize)
}

/// Finds the largest scale so that `max_tap * 2^scale` still fits into `u16`.
pub(crate) fn fixed_scale_for(max_tap: f64) -> u32 {
    let mut scale = MAX_FIXED_SCALE;
    while scale > 0 && round_half_up(max_tap * (1u64 << scale) as f64) > u16::MAX as f64 {
        scale -= 1;
    }
    scale
}

#[inline]
pub(crate) fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size() {
        assert_eq!(window_size(1.0), Ok(7));
        assert_eq!(window_size(2.5), Ok(15));
        assert_eq!(window_size(0.1), Ok(3));
        assert_eq!(window_size(0.), Err(SmoothError::NegativeOrZeroSigma));
        assert_eq!(window_size(-1.), Err(SmoothError::NegativeOrZeroSigma));
        assert_eq!(window_size(f32::NAN), Err(SmoothError::NegativeOrZeroSigma));
        assert!(window_size(1e9).is_err());
    }

    #[test]
    fn test_fixed_scale() {
        assert_eq!(fixed_scale_for(0.15998), 18);
        assert_eq!(fixed_scale_for(0.7866), 16);
        assert_eq!(fixed_scale_for(1.0), 15);
        assert_eq!(fixed_scale_for(0.0001), MAX_FIXED_SCALE);
    }
}
