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
use crate::filter1d::{
    check_boost, smooth_region_fixed, smooth_region_reference, smooth_region_simd, FilterRegion,
};
use crate::safe_math::SafeMul;
use crate::util::try_vec;
use crate::{FixedKernel, Image, Kernel, SmoothError, SmoothedImage, ThreadingPolicy};
use log::debug;
use novtb::{ParallelZonedIterator, TbSliceMut};
use std::sync::Mutex;

/// Arithmetic used by [gaussian_smooth].
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
pub enum SmoothingPath {
    /// Zero padded, vectorized `f32` path, the one the local side of an offload runs.
    #[default]
    Simd,
    /// Integer only path, identical to what the accelerator computes.
    FixedPoint,
    /// Scalar `f32` path with per tap bounds checks.
    Reference,
}

/// Performs gaussian smoothing of the whole image with a single compute path.
///
/// Output samples are `floor(smoothed * boost + 0.5)` where `smoothed` is the
/// edge renormalized, separable gaussian of the source intensity.
///
/// # Arguments
///
/// * `sigma` - Gaussian sigma, kernel is `1 + 2 * ceil(2.5 * sigma)` taps wide
/// * `boost` - Post multiplier in `1..=128`, see [crate::BOOST]
/// * `path` - See [SmoothingPath] for more info
/// * `threading_policy` - Rows are split in bands, one per thread, see [ThreadingPolicy]
///
/// # Examples
///
/// ```
/// use splitblur::{gaussian_smooth, Image, SmoothingPath, ThreadingPolicy, BOOST};
///
/// let image = Image::new(vec![128u8; 64 * 48], 48, 64);
/// let smoothed = gaussian_smooth(&image, 2.5, BOOST, SmoothingPath::Simd, ThreadingPolicy::Single)
///     .unwrap();
/// assert_eq!(smoothed.data.len(), 64 * 48);
/// assert!(smoothed.data.iter().all(|&x| x == 128 * 90));
/// ```
pub fn gaussian_smooth(
    image: &Image,
    sigma: f32,
    boost: u16,
    path: SmoothingPath,
    threading_policy: ThreadingPolicy,
) -> Result<SmoothedImage, SmoothError> {
    image.check_layout()?;
    check_boost(boost)?;

    let rows = image.rows as usize;
    let cols = image.cols as usize;

    let kernel = Kernel::new(sigma)?;
    let fixed_kernel = match path {
        SmoothingPath::FixedPoint => Some(FixedKernel::from_kernel(&kernel)?),
        _ => None,
    };

    let mut dst = try_vec(rows.safe_mul(cols)?, 0i16)?;

    let execute = |region: FilterRegion, target: &mut [i16]| -> Result<(), SmoothError> {
        match (path, &fixed_kernel) {
            (SmoothingPath::FixedPoint, Some(fixed_kernel)) => {
                smooth_region_fixed(image, fixed_kernel, boost, region, target)
            }
            (SmoothingPath::Reference, _) => {
                smooth_region_reference(image, kernel.taps(), boost, region, target)
            }
            _ => smooth_region_simd(image, &kernel, boost, region, target),
        }
    };

    let thread_count = threading_policy.thread_count(rows, cols);
    debug!(
        "Smoothing {rows}x{cols} with sigma {sigma} on {path:?} path, {thread_count} threads"
    );

    if thread_count == 1 {
        execute(FilterRegion::new(0, rows), &mut dst)?;
    } else {
        let band_rows = threading_policy.band_rows(rows, cols);
        let pool = novtb::ThreadPool::new(thread_count);
        let failure: Mutex<Option<SmoothError>> = Mutex::new(None);

        dst.tb_par_chunks_mut(cols * band_rows)
            .for_each_enumerated(&pool, |band, target| {
                let start = band * band_rows;
                let region = FilterRegion::new(start, start + target.len() / cols);
                if let Err(err) = execute(region, target) {
                    if let Ok(mut slot) = failure.lock() {
                        slot.get_or_insert(err);
                    }
                }
            });

        if let Some(err) = failure.into_inner().ok().flatten() {
            return Err(err);
        }
    }

    Ok(SmoothedImage {
        data: dst,
        rows: image.rows,
        cols: image.cols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BOOST;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::num::NonZeroUsize;

    fn random_image(rows: u32, cols: u32, seed: u64) -> Image<'static> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..rows * cols).map(|_| rng.gen::<u8>()).collect();
        Image::new(data, rows, cols)
    }

    #[test]
    fn test_banded_matches_single_thread() {
        let image = random_image(97, 53, 13);
        let policy = ThreadingPolicy::Fixed(NonZeroUsize::new(4).unwrap());
        for path in [
            SmoothingPath::Simd,
            SmoothingPath::FixedPoint,
            SmoothingPath::Reference,
        ] {
            let single =
                gaussian_smooth(&image, 2.5, BOOST, path, ThreadingPolicy::Single).unwrap();
            let banded = gaussian_smooth(&image, 2.5, BOOST, path, policy).unwrap();
            assert_eq!(single, banded, "Banding changed {path:?} output");
        }
    }

    #[test]
    fn test_paths_agree() {
        let image = random_image(128, 128, 2024);
        let simd =
            gaussian_smooth(&image, 2.5, BOOST, SmoothingPath::Simd, ThreadingPolicy::Single)
                .unwrap();
        let fixed = gaussian_smooth(
            &image,
            2.5,
            BOOST,
            SmoothingPath::FixedPoint,
            ThreadingPolicy::Single,
        )
        .unwrap();
        let reference = gaussian_smooth(
            &image,
            2.5,
            BOOST,
            SmoothingPath::Reference,
            ThreadingPolicy::Single,
        )
        .unwrap();
        assert!(simd.max_abs_diff(&reference).unwrap() <= 1);
        assert!(fixed.max_abs_diff(&reference).unwrap() <= 1);
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        let image = random_image(4, 4, 1);
        assert_eq!(
            gaussian_smooth(&image, -1., BOOST, SmoothingPath::Simd, ThreadingPolicy::Single),
            Err(SmoothError::NegativeOrZeroSigma)
        );
        assert_eq!(
            gaussian_smooth(&image, 1., 129, SmoothingPath::Simd, ThreadingPolicy::Single),
            Err(SmoothError::InvalidBoost(129))
        );
        let empty = Image::new(Vec::new(), 0, 4);
        assert_eq!(
            gaussian_smooth(&empty, 1., BOOST, SmoothingPath::Simd, ThreadingPolicy::Single),
            Err(SmoothError::ZeroBaseSize)
        );
    }
}
