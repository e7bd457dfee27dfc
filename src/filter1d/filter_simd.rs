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
use crate::filter1d::arena::{ColumnArena, PaddedRow};
use crate::filter1d::check_request;
use crate::filter1d::edge_sum::KernelPrefix;
use crate::filter1d::region::FilterRegion;
use crate::partition::RowRange;
use crate::safe_math::SafeMul;
use crate::stitch::PartialResult;
use crate::util::try_vec;
use crate::{Image, Kernel, SmoothError};
use log::trace;

type RowHandler = fn(&[f32], &mut [f32], &[f32], &[f32]);
type ColumnHandler = fn(&[&[f32]], &mut [i16], &[f32], f32, f32);

fn row_handler() -> RowHandler {
    #[cfg(all(target_arch = "aarch64", feature = "neon"))]
    {
        use crate::filter1d::neon::filter_row_neon_symm_f32;
        filter_row_neon_symm_f32
    }
    #[cfg(not(all(target_arch = "aarch64", feature = "neon")))]
    {
        #[cfg(all(target_arch = "x86_64", feature = "avx"))]
        {
            if std::arch::is_x86_feature_detected!("avx2")
                && std::arch::is_x86_feature_detected!("fma")
            {
                use crate::filter1d::avx::filter_row_avx_symm_f32;
                return filter_row_avx_symm_f32;
            }
        }
        #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
        {
            if std::arch::is_x86_feature_detected!("sse4.1") {
                use crate::filter1d::sse::filter_row_sse_symm_f32;
                return filter_row_sse_symm_f32;
            }
        }
        crate::filter1d::filter_row::filter_row_symm_f32
    }
}

fn column_handler() -> ColumnHandler {
    #[cfg(all(target_arch = "aarch64", feature = "neon"))]
    {
        use crate::filter1d::neon::filter_column_neon_symm_f32;
        filter_column_neon_symm_f32
    }
    #[cfg(not(all(target_arch = "aarch64", feature = "neon")))]
    {
        #[cfg(all(target_arch = "x86_64", feature = "avx"))]
        {
            if std::arch::is_x86_feature_detected!("avx2")
                && std::arch::is_x86_feature_detected!("fma")
            {
                use crate::filter1d::avx::filter_column_avx_symm_f32;
                return filter_column_avx_symm_f32;
            }
        }
        #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
        {
            if std::arch::is_x86_feature_detected!("sse4.1") {
                use crate::filter1d::sse::filter_column_sse_symm_f32;
                return filter_column_sse_symm_f32;
            }
        }
        crate::filter1d::filter_column::filter_column_symm_f32
    }
}

/// Vectorized two pass smoothing.
///
/// Rows are zero padded so every lane load stays in-bounds, the kernel sum of
/// border pixels is derived from kernel prefix sums instead of per tap checks.
pub(crate) fn smooth_region_simd(
    image: &Image,
    kernel: &Kernel,
    boost: u16,
    region: FilterRegion,
    dst: &mut [i16],
) -> Result<(), SmoothError> {
    smooth_region_with(
        image,
        kernel,
        boost,
        region,
        dst,
        row_handler(),
        column_handler(),
    )
}

fn smooth_region_with(
    image: &Image,
    kernel: &Kernel,
    boost: u16,
    region: FilterRegion,
    dst: &mut [i16],
    row_handler: RowHandler,
    column_handler: ColumnHandler,
) -> Result<(), SmoothError> {
    let rows = image.rows as usize;
    let cols = image.cols as usize;
    let taps = kernel.taps();
    let center = kernel.center();

    let prefix = KernelPrefix::new(taps);
    let row_sums = prefix.row_sums(cols)?;

    let source = region.source_rows(center, rows);
    trace!(
        "Horizontal pass over rows {}..{} for region {}..{}",
        source.start,
        source.end,
        region.start,
        region.end
    );

    let mut arena = ColumnArena::new(region, center, cols)?;
    let mut padded = PaddedRow::new(cols, center)?;

    for y in source {
        padded.load(image.row(y));
        row_handler(padded.window(center), arena.row_mut(y), taps, &row_sums);
    }

    let arena_rows = arena.rows();
    let boost = boost as f32;

    for ((y, dst_row), brows) in region
        .rows()
        .zip(dst.chunks_exact_mut(cols))
        .zip(arena_rows.windows(taps.len()))
    {
        column_handler(brows, dst_row, taps, prefix.edge_sum(y, rows), boost);
    }

    Ok(())
}

/// Smooths rows `range` of `image` with the vectorized float path.
///
/// Uses NEON on aarch64, AVX2 with FMA or SSE 4.1 on x86 when available and
/// enabled by features, and a portable four lane batch otherwise. All of them
/// share the same padding and kernel sum rules.
pub fn smooth_rows_simd(
    image: &Image,
    kernel: &Kernel,
    boost: u16,
    range: RowRange,
) -> Result<PartialResult, SmoothError> {
    let region = range.region();
    check_request(image, boost, region)?;
    let mut data = try_vec(region.len().safe_mul(image.cols as usize)?, 0i16)?;
    smooth_region_simd(image, kernel, boost, region, &mut data)?;
    Ok(PartialResult::new(range, image.cols, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter1d::filter_column::filter_column_symm_f32;
    use crate::filter1d::filter_row::filter_row_symm_f32;
    use crate::filter1d::smooth_rows_reference;
    use crate::BOOST;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_image(rows: u32, cols: u32, seed: u64) -> Image<'static> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..rows * cols).map(|_| rng.gen::<u8>()).collect();
        Image::new(data, rows, cols)
    }

    fn assert_close(a: &[i16], b: &[i16], what: &str) {
        assert_eq!(a.len(), b.len());
        for (i, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
            let diff = (x as i32 - y as i32).abs();
            assert!(diff <= 1, "{what}: index {i} differs by {diff}, {x} vs {y}");
        }
    }

    #[test]
    fn test_simd_close_to_reference() {
        for (rows, cols, sigma) in [
            (128u32, 128u32, 2.5f32),
            (31, 17, 1.0),
            (9, 5, 2.5),
            (40, 3, 0.8),
            (1, 29, 1.3),
        ] {
            let image = random_image(rows, cols, rows as u64 * 31 + cols as u64);
            let kernel = Kernel::new(sigma).unwrap();
            let range = RowRange::new(0, rows as usize);
            let simd = smooth_rows_simd(&image, &kernel, BOOST, range).unwrap();
            let reference = smooth_rows_reference::<f64>(&image, sigma, BOOST, range).unwrap();
            assert_close(
                &simd.data,
                &reference.data,
                &format!("{rows}x{cols} sigma {sigma}"),
            );
        }
    }

    #[test]
    fn test_dispatched_matches_portable() {
        let image = random_image(45, 61, 99);
        let kernel = Kernel::new(2.5).unwrap();
        let region = FilterRegion::new(0, 45);
        let mut dispatched = vec![0i16; 45 * 61];
        let mut portable = vec![0i16; 45 * 61];
        smooth_region_simd(&image, &kernel, BOOST, region, &mut dispatched).unwrap();
        smooth_region_with(
            &image,
            &kernel,
            BOOST,
            region,
            &mut portable,
            filter_row_symm_f32,
            filter_column_symm_f32,
        )
        .unwrap();
        assert_close(&dispatched, &portable, "dispatched vs portable");
    }

    #[test]
    fn test_halo_rows_are_exact() {
        let image = random_image(128, 128, 5);
        let kernel = Kernel::new(2.5).unwrap();
        let full = smooth_rows_simd(&image, &kernel, BOOST, RowRange::new(0, 128)).unwrap();
        let local = smooth_rows_simd(&image, &kernel, BOOST, RowRange::with_halo(57, 128, 7)).unwrap();
        assert_eq!(&full.data[57 * 128..], local.data.as_slice());
    }

    #[test]
    fn test_constant_image_is_preserved() {
        let image = Image::new(vec![37u8; 23 * 14], 23, 14);
        let kernel = Kernel::new(3.1).unwrap();
        let result = smooth_rows_simd(&image, &kernel, BOOST, RowRange::new(0, 23)).unwrap();
        assert!(result.data.iter().all(|&x| x == 37 * 90), "{:?}", result.data);
    }
}
