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
use crate::filter1d::FilterRegion;
use crate::SmoothError;
use std::ops::Range;

/// Half open row interval `[start, end)` whose first `halo` rows exist only to
/// feed neighbouring data to the vertical pass and never reach the output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
    pub halo: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> RowRange {
        RowRange::with_halo(start, end, 0)
    }

    pub fn with_halo(start: usize, end: usize, halo: usize) -> RowRange {
        debug_assert!(start <= end);
        debug_assert!(halo <= end - start);
        RowRange { start, end, halo }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Rows this range is responsible for in the merged output.
    #[inline]
    pub fn authoritative(&self) -> Range<usize> {
        (self.start + self.halo)..self.end
    }

    /// Rows computed only for the neighbour dependency, discarded when stitching.
    #[inline]
    pub fn halo_rows(&self) -> Range<usize> {
        self.start..(self.start + self.halo)
    }

    #[inline]
    pub fn region(&self) -> FilterRegion {
        FilterRegion::new(self.start, self.end)
    }
}

/// What the local path does when every row is assigned to the accelerator.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
pub enum FullOffloadPolicy {
    /// Local path still computes the halo rows below the accelerator's end,
    /// which only serve as a cross-check region.
    #[default]
    ComputeHalo,
    /// Local path does no work at all.
    SkipLocal,
}

/// Row assignment of one invocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    pub rows: usize,
    /// `floor(rows * fraction / 100)`
    pub accelerator_rows: usize,
    /// Always `[0, accelerator_rows)`, no halo.
    pub accelerator: RowRange,
    /// `[accelerator_rows - center, rows)` clamped at zero, or nothing.
    pub local: Option<RowRange>,
}

impl Partition {
    /// Splits `rows` between the accelerator and the local path.
    ///
    /// `fraction` is the percentage of rows given to the accelerator, `center` is
    /// the kernel half width which sets the halo of the local range.
    pub fn new(
        rows: usize,
        fraction: u32,
        center: usize,
        policy: FullOffloadPolicy,
    ) -> Result<Partition, SmoothError> {
        if rows == 0 {
            return Err(SmoothError::ZeroBaseSize);
        }
        if fraction > 100 {
            return Err(SmoothError::InvalidFraction(fraction));
        }
        let accelerator_rows = (rows as u64 * fraction as u64 / 100) as usize;
        let accelerator = RowRange::new(0, accelerator_rows);

        let local = if accelerator_rows == rows && policy == FullOffloadPolicy::SkipLocal {
            None
        } else {
            let start = accelerator_rows.saturating_sub(center);
            Some(RowRange::with_halo(start, rows, accelerator_rows - start))
        };

        Ok(Partition {
            rows,
            accelerator_rows,
            accelerator,
            local,
        })
    }

    /// Rows the local path contributes to the merged output.
    pub fn local_authoritative(&self) -> Range<usize> {
        match self.local {
            Some(local) => local.authoritative(),
            None => self.rows..self.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_split() {
        let partition = Partition::new(128, 50, 7, FullOffloadPolicy::ComputeHalo).unwrap();
        assert_eq!(partition.accelerator_rows, 64);
        assert_eq!(partition.accelerator, RowRange::new(0, 64));
        let local = partition.local.unwrap();
        assert_eq!(local.start, 57);
        assert_eq!(local.end, 128);
        assert_eq!(local.halo_rows(), 57..64);
        assert_eq!(local.authoritative(), 64..128);
    }

    #[test]
    fn test_no_offload() {
        let partition = Partition::new(100, 0, 7, FullOffloadPolicy::ComputeHalo).unwrap();
        assert_eq!(partition.accelerator_rows, 0);
        assert!(partition.accelerator.is_empty());
        assert_eq!(partition.local, Some(RowRange::new(0, 100)));
    }

    #[test]
    fn test_full_offload() {
        let partition = Partition::new(100, 100, 7, FullOffloadPolicy::ComputeHalo).unwrap();
        assert_eq!(partition.accelerator, RowRange::new(0, 100));
        let local = partition.local.unwrap();
        assert_eq!(local, RowRange::with_halo(93, 100, 7));
        assert!(local.authoritative().is_empty());

        let skipped = Partition::new(100, 100, 7, FullOffloadPolicy::SkipLocal).unwrap();
        assert_eq!(skipped.local, None);
        assert!(skipped.local_authoritative().is_empty());
    }

    #[test]
    fn test_halo_clamped_at_top() {
        let partition = Partition::new(10, 30, 7, FullOffloadPolicy::ComputeHalo).unwrap();
        assert_eq!(partition.accelerator_rows, 3);
        assert_eq!(partition.local, Some(RowRange::with_halo(0, 10, 3)));
    }

    #[test]
    fn test_every_row_assigned_once() {
        for rows in [1usize, 2, 7, 15, 64, 127, 480] {
            for fraction in [0u32, 1, 13, 50, 77, 99, 100] {
                for policy in [FullOffloadPolicy::ComputeHalo, FullOffloadPolicy::SkipLocal] {
                    let partition = Partition::new(rows, fraction, 7, policy).unwrap();
                    let mut owners = vec![0u32; rows];
                    for y in 0..partition.accelerator_rows {
                        owners[y] += 1;
                    }
                    for y in partition.local_authoritative() {
                        owners[y] += 1;
                    }
                    assert!(
                        owners.iter().all(|&x| x == 1),
                        "Rows {rows} fraction {fraction} assigned {owners:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            Partition::new(10, 101, 7, FullOffloadPolicy::ComputeHalo),
            Err(SmoothError::InvalidFraction(101))
        );
        assert_eq!(
            Partition::new(0, 50, 7, FullOffloadPolicy::ComputeHalo),
            Err(SmoothError::ZeroBaseSize)
        );
    }
}
