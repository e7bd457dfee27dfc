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
use crate::partition::RowRange;
use crate::safe_math::SafeMul;
use crate::stitch::PartialResult;
use crate::util::try_vec;
use crate::{FixedKernel, Image, SmoothError};

/// Integer only two pass smoothing, the accelerator's arithmetic.
///
/// The horizontal pass stores each pixel as a rounded Q16 quotient
/// `dot * 2^16 / sum`, the vertical pass produces
/// `floor(dot * boost / (sum * 2^16) + 1/2)` where both sums only include taps
/// that land inside the image.
pub(crate) fn smooth_region_fixed(
    image: &Image,
    kernel: &FixedKernel,
    boost: u16,
    region: FilterRegion,
    dst: &mut [i16],
) -> Result<(), SmoothError> {
    let rows = image.rows as usize;
    let cols = image.cols as usize;
    let taps = kernel.taps();
    let center = kernel.center();
    let source = region.source_rows(center, rows);

    let mut transient = try_vec(source.len().safe_mul(cols)?, 0u32)?;

    for (y, dst_row) in source.clone().zip(transient.chunks_exact_mut(cols)) {
        let src_row = image.row(y);
        for (x, dst) in dst_row.iter_mut().enumerate() {
            let mut dot = 0u64;
            let mut sum = 0u64;
            for (i, &tap) in taps.iter().enumerate() {
                let Some(px) = (x + i).checked_sub(center) else {
                    continue;
                };
                if px >= cols {
                    break;
                }
                dot += tap as u64 * src_row[px] as u64;
                sum += tap as u64;
            }
            *dst = (((dot << 17) + sum) / (sum << 1)) as u32;
        }
    }

    let boost = boost as u64;

    for (y, dst_row) in region.rows().zip(dst.chunks_exact_mut(cols)) {
        for (x, dst) in dst_row.iter_mut().enumerate() {
            let mut dot = 0u64;
            let mut sum = 0u64;
            for (j, &tap) in taps.iter().enumerate() {
                let Some(sy) = (y + j).checked_sub(center) else {
                    continue;
                };
                if sy >= rows {
                    break;
                }
                dot += tap as u64 * transient[(sy - source.start) * cols + x] as u64;
                sum += tap as u64;
            }
            let denominator = sum << 16;
            let v = (2 * dot * boost + denominator) / (2 * denominator);
            *dst = v.min(i16::MAX as u64) as i16;
        }
    }

    Ok(())
}

/// Smooths rows `range` of `image` with integer arithmetic only.
///
/// Produces what the accelerator produces for the same rows, see [FixedKernel]
/// for how taps are derived.
pub fn smooth_rows_fixed(
    image: &Image,
    kernel: &FixedKernel,
    boost: u16,
    range: RowRange,
) -> Result<PartialResult, SmoothError> {
    let region = range.region();
    check_request(image, boost, region)?;
    let mut data = try_vec(region.len().safe_mul(image.cols as usize)?, 0i16)?;
    smooth_region_fixed(image, kernel, boost, region, &mut data)?;
    Ok(PartialResult::new(range, image.cols, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter1d::smooth_rows_reference;
    use crate::{Kernel, BOOST};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_image(rows: u32, cols: u32, seed: u64) -> Image<'static> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..rows * cols).map(|_| rng.gen::<u8>()).collect();
        Image::new(data, rows, cols)
    }

    #[test]
    fn test_constant_image_is_preserved() {
        let image = Image::new(vec![255u8; 17 * 12], 17, 12);
        let kernel = FixedKernel::from_kernel(&Kernel::new(2.5).unwrap()).unwrap();
        let result = smooth_rows_fixed(&image, &kernel, BOOST, RowRange::new(0, 17)).unwrap();
        assert!(result.data.iter().all(|&x| x == 255 * 90));
    }

    #[test]
    fn test_fixed_close_to_float() {
        for (sigma, seed) in [(2.5f32, 3u64), (1.0, 11), (0.6, 5), (4.2, 9)] {
            let image = random_image(47, 38, seed);
            let kernel = FixedKernel::from_kernel(&Kernel::new(sigma).unwrap()).unwrap();
            let range = RowRange::new(0, 47);
            let fixed = smooth_rows_fixed(&image, &kernel, BOOST, range).unwrap();
            let float = smooth_rows_reference::<f64>(&image, sigma, BOOST, range).unwrap();
            for (i, (&a, &b)) in fixed.data.iter().zip(float.data.iter()).enumerate() {
                let diff = (a as i32 - b as i32).abs();
                assert!(
                    diff <= 1,
                    "Sigma {sigma} index {i}: fixed {a} vs float {b}"
                );
            }
        }
    }

    #[test]
    fn test_reference_taps_close_to_float() {
        let image = random_image(30, 30, 77);
        let range = RowRange::new(0, 30);
        let fixed = smooth_rows_fixed(&image, &FixedKernel::reference(), BOOST, range).unwrap();
        let float = smooth_rows_reference::<f64>(&image, 2.5, BOOST, range).unwrap();
        assert!(fixed
            .data
            .iter()
            .zip(float.data.iter())
            .all(|(&a, &b)| (a as i32 - b as i32).abs() <= 1));
    }

    #[test]
    fn test_sub_range_matches_full_run() {
        let image = random_image(64, 19, 21);
        let kernel = FixedKernel::from_kernel(&Kernel::new(2.5).unwrap()).unwrap();
        let full = smooth_rows_fixed(&image, &kernel, BOOST, RowRange::new(0, 64)).unwrap();
        let part = smooth_rows_fixed(&image, &kernel, BOOST, RowRange::new(0, 32)).unwrap();
        assert_eq!(&full.data[..32 * 19], part.data.as_slice());
    }
}
