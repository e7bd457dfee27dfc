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
use crate::util::try_vec;
use crate::SmoothError;

/// Running sums of kernel taps, `prefix[k] = kernel[0] + .. + kernel[k - 1]`.
pub(crate) struct KernelPrefix {
    prefix: Vec<f64>,
    center: usize,
}

impl KernelPrefix {
    pub(crate) fn new(kernel: &[f32]) -> KernelPrefix {
        let mut prefix = Vec::with_capacity(kernel.len() + 1);
        let mut acc = 0f64;
        prefix.push(acc);
        for &tap in kernel {
            acc += tap as f64;
            prefix.push(acc);
        }
        KernelPrefix {
            prefix,
            center: kernel.len() / 2,
        }
    }

    /// Sum of the taps that land inside `[0, size)` when the kernel is centered at `position`.
    ///
    /// Taps falling onto zero padding are exactly the first `center - position` and
    /// the last `center - (size - 1 - position)` ones, so the in-bounds sum is a
    /// difference of two prefix entries.
    #[inline]
    pub(crate) fn edge_sum(&self, position: usize, size: usize) -> f32 {
        let len = self.prefix.len() - 1;
        let missing_left = self.center.saturating_sub(position);
        let missing_right = self.center.saturating_sub(size - 1 - position);
        (self.prefix[len - missing_right] - self.prefix[missing_left]) as f32
    }

    /// Per column sums for a row of `cols` pixels.
    pub(crate) fn row_sums(&self, cols: usize) -> Result<Vec<f32>, SmoothError> {
        let mut sums = try_vec(cols, 0f32)?;
        for (x, dst) in sums.iter_mut().enumerate() {
            *dst = self.edge_sum(x, cols);
        }
        Ok(sums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kernel;

    fn brute_force(kernel: &[f32], position: usize, size: usize) -> f32 {
        let center = kernel.len() / 2;
        let mut sum = 0f64;
        for (i, &tap) in kernel.iter().enumerate() {
            let p = position as isize + i as isize - center as isize;
            if p >= 0 && p < size as isize {
                sum += tap as f64;
            }
        }
        sum as f32
    }

    #[test]
    fn test_edge_sums_match_bounds_checked_sums() {
        let kernel = Kernel::new(2.5).unwrap();
        let prefix = KernelPrefix::new(kernel.taps());
        for size in [1usize, 2, 5, 14, 15, 16, 40] {
            for position in 0..size {
                let analytic = prefix.edge_sum(position, size);
                let expected = brute_force(kernel.taps(), position, size);
                assert!(
                    (analytic - expected).abs() <= 1e-6,
                    "Size {size} position {position}: {analytic} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn test_interior_sum_is_one() {
        let kernel = Kernel::new(1.0).unwrap();
        let prefix = KernelPrefix::new(kernel.taps());
        let sums = prefix.row_sums(32).unwrap();
        for &s in &sums[3..29] {
            assert!((s - 1.0).abs() <= 1e-6);
        }
        assert!(sums[0] < sums[1] && sums[1] < sums[2]);
        assert!((sums[0] - sums[31]).abs() <= 1e-6);
    }
}
