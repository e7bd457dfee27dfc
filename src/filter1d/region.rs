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
use std::ops::Range;

/// Output rows `[start, end)` one smoothing call is asked to produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterRegion {
    pub start: usize,
    pub end: usize,
}

impl FilterRegion {
    pub fn new(start: usize, end: usize) -> FilterRegion {
        FilterRegion { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Source rows the horizontal pass must cover so every output row sees
    /// all of its in-bounds vertical neighbours.
    #[inline]
    pub(crate) fn source_rows(&self, center: usize, rows: usize) -> Range<usize> {
        self.start.saturating_sub(center)..self.end.saturating_add(center).min(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_rows_clamped() {
        assert_eq!(FilterRegion::new(0, 10).source_rows(7, 128), 0..17);
        assert_eq!(FilterRegion::new(64, 128).source_rows(7, 128), 57..128);
        assert_eq!(FilterRegion::new(3, 5).source_rows(2, 6), 1..6);
        assert!(FilterRegion::new(4, 4).is_empty());
    }
}
