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
use crate::util::check_slice_size;
use crate::SmoothError;
use std::borrow::Cow;

/// Planar 8-bit luminance image, row-major without padding.
///
/// Immutable once created, the smoothing paths only ever read it.
#[derive(Debug, Clone)]
pub struct Image<'a> {
    pub data: Cow<'a, [u8]>,
    pub rows: u32,
    pub cols: u32,
}

impl<'a> Image<'a> {
    /// Borrows existing data, which must hold at least `rows * cols` samples.
    pub fn borrow(arr: &'a [u8], rows: u32, cols: u32) -> Self {
        Self {
            data: Cow::Borrowed(arr),
            rows,
            cols,
        }
    }

    /// Takes ownership of `data`.
    pub fn new(data: Vec<u8>, rows: u32, cols: u32) -> Image<'static> {
        Image {
            data: Cow::Owned(data),
            rows,
            cols,
        }
    }

    #[inline]
    pub fn check_layout(&self) -> Result<(), SmoothError> {
        check_slice_size(self.data.as_ref(), self.rows as usize, self.cols as usize)
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let cols = self.cols as usize;
        &self.data[y * cols..(y + 1) * cols]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Final merged smoothing result, same dimensions as the source [Image].
///
/// Samples are gaussian smoothed intensities multiplied by the boost factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmoothedImage {
    pub data: Vec<i16>,
    pub rows: u32,
    pub cols: u32,
}

impl SmoothedImage {
    #[inline]
    pub fn row(&self, y: usize) -> &[i16] {
        let cols = self.cols as usize;
        &self.data[y * cols..(y + 1) * cols]
    }

    /// Largest absolute difference between two images of the same size.
    ///
    /// Returns `None` if dimensions differ.
    pub fn max_abs_diff(&self, other: &SmoothedImage) -> Option<u16> {
        if self.rows != other.rows || self.cols != other.cols {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() as u16)
                .max()
                .unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_layout() {
        let data = vec![7u8; 6];
        let image = Image::borrow(&data, 2, 3);
        assert!(image.check_layout().is_ok());
        assert_eq!(image.row(1), &[7, 7, 7]);
        let short = Image::borrow(&data[..5], 2, 3);
        assert!(short.check_layout().is_err());
    }

    #[test]
    fn test_max_abs_diff() {
        let a = SmoothedImage {
            data: vec![10, 20, 30, 40],
            rows: 2,
            cols: 2,
        };
        let mut b = a.clone();
        b.data[2] = 33;
        assert_eq!(a.max_abs_diff(&b), Some(3));
        let c = SmoothedImage {
            data: vec![0; 4],
            rows: 1,
            cols: 4,
        };
        assert_eq!(a.max_abs_diff(&c), None);
    }
}
