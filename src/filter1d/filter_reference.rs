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
use crate::filter1d::check_request;
use crate::filter1d::region::FilterRegion;
use crate::gaussian::gaussian_kernel_1d;
use crate::partition::RowRange;
use crate::safe_math::SafeMul;
use crate::stitch::PartialResult;
use crate::util::try_vec;
use crate::{Image, SmoothError};
use num_traits::{AsPrimitive, Float, FromPrimitive};

/// Scalar two pass smoothing with per tap bounds checks.
///
/// `dst` receives `region.len()` rows of `image.cols` samples.
pub(crate) fn smooth_region_reference<F>(
    image: &Image,
    kernel: &[F],
    boost: u16,
    region: FilterRegion,
    dst: &mut [i16],
) -> Result<(), SmoothError>
where
    F: Float + AsPrimitive<i32>,
    u8: AsPrimitive<F>,
    u16: AsPrimitive<F>,
{
    let rows = image.rows as usize;
    let cols = image.cols as usize;
    let center = kernel.len() / 2;
    let source = region.source_rows(center, rows);

    let mut transient = try_vec(source.len().safe_mul(cols)?, F::zero())?;

    for (y, dst_row) in source.clone().zip(transient.chunks_exact_mut(cols)) {
        let src_row = image.row(y);
        for (x, dst) in dst_row.iter_mut().enumerate() {
            let mut dot = F::zero();
            let mut sum = F::zero();
            for (i, &tap) in kernel.iter().enumerate() {
                let Some(px) = (x + i).checked_sub(center) else {
                    continue;
                };
                if px >= cols {
                    break;
                }
                let p: F = src_row[px].as_();
                dot = dot + p * tap;
                sum = sum + tap;
            }
            *dst = dot / sum;
        }
    }

    let boost: F = boost.as_();
    let half = F::one() / (F::one() + F::one());

    for (y, dst_row) in region.rows().zip(dst.chunks_exact_mut(cols)) {
        for (x, dst) in dst_row.iter_mut().enumerate() {
            let mut dot = F::zero();
            let mut sum = F::zero();
            for (j, &tap) in kernel.iter().enumerate() {
                let Some(sy) = (y + j).checked_sub(center) else {
                    continue;
                };
                if sy >= rows {
                    break;
                }
                dot = dot + transient[(sy - source.start) * cols + x] * tap;
                sum = sum + tap;
            }
            let v: i32 = (dot * boost / sum + half).as_();
            *dst = v.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }
    }

    Ok(())
}

/// Smooths rows `range` of `image` in scalar floating point of type `F`.
///
/// The horizontal pass covers the range widened by the kernel half width on
/// both sides, so every row of the result is exact regardless of where the range
/// starts. Taps outside the image are skipped and excluded from the pixel's
/// kernel sum.
///
/// # Arguments
///
/// * `sigma` - Gaussian sigma, must be positive and finite
/// * `boost` - Multiplier applied after the vertical pass, see [crate::BOOST]
/// * `range` - Rows to produce, halo rows included
pub fn smooth_rows_reference<F>(
    image: &Image,
    sigma: f32,
    boost: u16,
    range: RowRange,
) -> Result<PartialResult, SmoothError>
where
    F: Float + FromPrimitive + AsPrimitive<i32>,
    u8: AsPrimitive<F>,
    u16: AsPrimitive<F>,
{
    let kernel = gaussian_kernel_1d::<F>(sigma)?;
    let region = range.region();
    check_request(image, boost, region)?;
    let mut data = try_vec(region.len().safe_mul(image.cols as usize)?, 0i16)?;
    smooth_region_reference(image, &kernel, boost, region, &mut data)?;
    Ok(PartialResult::new(range, image.cols, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BOOST;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_image(rows: u32, cols: u32, seed: u64) -> Image<'static> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..rows * cols).map(|_| rng.gen::<u8>()).collect();
        Image::new(data, rows, cols)
    }

    #[test]
    fn test_constant_image_is_preserved() {
        let image = Image::new(vec![100u8; 20 * 9], 20, 9);
        let result = smooth_rows_reference::<f32>(&image, 2.5, BOOST, RowRange::new(0, 20)).unwrap();
        assert!(result.data.iter().all(|&x| x == 9000), "{:?}", result.data);
    }

    #[test]
    fn test_sub_range_matches_full_run() {
        let image = random_image(40, 23, 7);
        let full = smooth_rows_reference::<f64>(&image, 1.7, BOOST, RowRange::new(0, 40)).unwrap();
        let part =
            smooth_rows_reference::<f64>(&image, 1.7, BOOST, RowRange::with_halo(11, 29, 4)).unwrap();
        assert_eq!(part.data.len(), 18 * 23);
        assert_eq!(&full.data[11 * 23..29 * 23], part.data.as_slice());
    }

    #[test]
    fn test_f32_close_to_f64() {
        let image = random_image(33, 31, 42);
        let range = RowRange::new(0, 33);
        let a = smooth_rows_reference::<f32>(&image, 2.5, BOOST, range).unwrap();
        let b = smooth_rows_reference::<f64>(&image, 2.5, BOOST, range).unwrap();
        for (i, (&x, &y)) in a.data.iter().zip(b.data.iter()).enumerate() {
            let diff = (x as i32 - y as i32).abs();
            assert!(diff <= 1, "Index {i}: f32 {x} vs f64 {y}");
        }
    }

    #[test]
    fn test_rejects_bad_requests() {
        let image = random_image(8, 8, 1);
        assert_eq!(
            smooth_rows_reference::<f32>(&image, 1.0, 0, RowRange::new(0, 8)).err(),
            Some(SmoothError::InvalidBoost(0))
        );
        assert_eq!(
            smooth_rows_reference::<f32>(&image, 1.0, BOOST, RowRange::new(0, 9)).err(),
            Some(SmoothError::RowRangeOutOfBounds {
                start: 0,
                end: 9,
                rows: 8
            })
        );
        assert_eq!(
            smooth_rows_reference::<f32>(&image, 0., BOOST, RowRange::new(0, 8)).err(),
            Some(SmoothError::NegativeOrZeroSigma)
        );
    }
}
