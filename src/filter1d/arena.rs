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
use crate::filter1d::region::FilterRegion;
use crate::safe_math::{SafeAdd, SafeMul};
use crate::util::try_vec;
use crate::SmoothError;

/// Vector width the zero padding is rounded up to.
pub(crate) const LANES: usize = 4;

/// Columns of zero padding on each side of a row for a kernel half width `center`.
#[inline]
pub(crate) fn halo_columns(center: usize) -> usize {
    center.div_ceil(LANES) * LANES
}

/// Single image row widened with zero padding, so that every kernel tap of every
/// output pixel reads in-bounds memory.
pub(crate) struct PaddedRow {
    data: Vec<f32>,
    halo: usize,
    cols: usize,
}

impl PaddedRow {
    pub(crate) fn new(cols: usize, center: usize) -> Result<PaddedRow, SmoothError> {
        let halo = halo_columns(center);
        let width = halo.safe_mul(2)?.safe_add(cols)?;
        Ok(PaddedRow {
            data: try_vec(width, 0f32)?,
            halo,
            cols,
        })
    }

    /// Replaces the payload, padding stays zero.
    #[inline]
    pub(crate) fn load(&mut self, src: &[u8]) {
        for (dst, &src) in self.data[self.halo..self.halo + self.cols]
            .iter_mut()
            .zip(src.iter())
        {
            *dst = src as f32;
        }
    }

    /// Slice where index `x` is the leftmost tap of output pixel `x`.
    #[inline]
    pub(crate) fn window(&self, center: usize) -> &[f32] {
        &self.data[self.halo - center..]
    }
}

/// Horizontal pass output for all rows the vertical pass of a region reads.
///
/// Arena row `a` holds image row `start + a - center`; rows above or below the
/// image are left zero.
pub(crate) struct ColumnArena {
    data: Vec<f32>,
    cols: usize,
    first_row: isize,
}

impl ColumnArena {
    pub(crate) fn new(
        region: FilterRegion,
        center: usize,
        cols: usize,
    ) -> Result<ColumnArena, SmoothError> {
        let height = region.len().safe_add(center.safe_mul(2)?)?;
        let size = height.safe_mul(cols)?;
        Ok(ColumnArena {
            data: try_vec(size, 0f32)?,
            cols,
            first_row: region.start as isize - center as isize,
        })
    }

    /// Storage for image row `y`.
    #[inline]
    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let a = (y as isize - self.first_row) as usize;
        &mut self.data[a * self.cols..(a + 1) * self.cols]
    }

    pub(crate) fn rows(&self) -> Vec<&[f32]> {
        self.data.chunks_exact(self.cols).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_row_window() {
        let mut row = PaddedRow::new(5, 3).unwrap();
        row.load(&[1, 2, 3, 4, 5]);
        let window = row.window(3);
        assert_eq!(&window[..3], &[0., 0., 0.]);
        assert_eq!(&window[3..8], &[1., 2., 3., 4., 5.]);
        assert!(window[8..].iter().all(|&x| x == 0.));
        assert!(window.len() >= 5 + 2 * 3);
        assert_eq!(halo_columns(7), 8);
        assert_eq!(halo_columns(8), 8);
        assert_eq!(halo_columns(1), 4);
    }

    #[test]
    fn test_column_arena_rows() {
        let mut arena = ColumnArena::new(FilterRegion::new(0, 2), 2, 3).unwrap();
        arena.row_mut(0).copy_from_slice(&[1., 1., 1.]);
        arena.row_mut(3).copy_from_slice(&[4., 4., 4.]);
        let rows = arena.rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], &[0., 0., 0.]);
        assert_eq!(rows[2], &[1., 1., 1.]);
        assert_eq!(rows[5], &[4., 4., 4.]);
    }
}
