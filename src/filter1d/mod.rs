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
mod arena;
#[cfg(all(target_arch = "x86_64", feature = "avx"))]
mod avx;
mod edge_sum;
mod filter_column;
mod filter_fixed;
mod filter_reference;
mod filter_row;
mod filter_simd;
#[cfg(all(target_arch = "aarch64", feature = "neon"))]
mod neon;
mod region;
#[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
mod sse;

use crate::{Image, SmoothError, MAX_BOOST};

pub(crate) use filter_fixed::smooth_region_fixed;
pub use filter_fixed::smooth_rows_fixed;
pub(crate) use filter_reference::smooth_region_reference;
pub use filter_reference::smooth_rows_reference;
pub(crate) use filter_simd::smooth_region_simd;
pub use filter_simd::smooth_rows_simd;
pub use region::FilterRegion;

pub(crate) fn check_boost(boost: u16) -> Result<(), SmoothError> {
    if boost == 0 || boost > MAX_BOOST {
        return Err(SmoothError::InvalidBoost(boost));
    }
    Ok(())
}

/// Validates image layout, boost and that `region` lies inside the image.
pub(crate) fn check_request(
    image: &Image,
    boost: u16,
    region: FilterRegion,
) -> Result<(), SmoothError> {
    image.check_layout()?;
    check_boost(boost)?;
    let rows = image.rows as usize;
    if region.start > region.end || region.end > rows {
        return Err(SmoothError::RowRangeOutOfBounds {
            start: region.start,
            end: region.end,
            rows,
        });
    }
    Ok(())
}
