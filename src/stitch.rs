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
use crate::partition::{Partition, RowRange};
use crate::util::{try_vec, MismatchedSize};
use crate::{SmoothError, SmoothedImage};
use log::trace;
use std::ops::Range;

/// Smoothed samples for exactly one [RowRange], produced by one compute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialResult {
    pub range: RowRange,
    pub cols: u32,
    pub data: Vec<i16>,
}

impl PartialResult {
    pub fn new(range: RowRange, cols: u32, data: Vec<i16>) -> PartialResult {
        PartialResult { range, cols, data }
    }

    /// Row `y` in image coordinates, `None` if outside the range.
    pub fn row(&self, y: usize) -> Option<&[i16]> {
        if y < self.range.start || y >= self.range.end {
            return None;
        }
        let cols = self.cols as usize;
        let offset = (y - self.range.start) * cols;
        self.data.get(offset..offset + cols)
    }

    fn check_covers(&self, rows: Range<usize>, cols: u32) -> Result<(), SmoothError> {
        if self.cols != cols {
            return Err(SmoothError::MinimumSliceSizeMismatch(MismatchedSize {
                expected: cols as usize,
                received: self.cols as usize,
            }));
        }
        let expected = self.range.len() * cols as usize;
        if self.data.len() != expected {
            return Err(SmoothError::MinimumSliceSizeMismatch(MismatchedSize {
                expected,
                received: self.data.len(),
            }));
        }
        if !rows.is_empty() && (rows.start < self.range.start || rows.end > self.range.end) {
            return Err(SmoothError::MissingRows {
                start: rows.start,
                end: rows.end,
            });
        }
        Ok(())
    }
}

/// What the stitcher took from where.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct StitchReport {
    /// Rows copied from the accelerator result.
    pub accelerator_rows: usize,
    /// Rows copied from the local result.
    pub local_rows: usize,
    /// Local rows dropped because the accelerator owns them.
    pub discarded_halo_rows: usize,
}

/// Merges both partial results into `dst`.
///
/// Rows `[0, accelerator_rows)` come from `accelerator`, rows
/// `[accelerator_rows, rows)` from `local`. Halo rows of `local` are dropped.
/// Every output row is written exactly once.
pub fn stitch_into(
    dst: &mut SmoothedImage,
    partition: &Partition,
    accelerator: &PartialResult,
    local: Option<&PartialResult>,
) -> Result<StitchReport, SmoothError> {
    let cols = dst.cols;
    let cols_usize = cols as usize;
    if dst.rows as usize != partition.rows || dst.data.len() != partition.rows * cols_usize {
        return Err(SmoothError::MinimumSliceSizeMismatch(MismatchedSize {
            expected: partition.rows * cols_usize,
            received: dst.data.len(),
        }));
    }

    let accelerator_rows = 0..partition.accelerator_rows;
    accelerator.check_covers(accelerator_rows.clone(), cols)?;

    let local_rows = partition.local_authoritative();
    match local {
        Some(local) => local.check_covers(local_rows.clone(), cols)?,
        None if !local_rows.is_empty() => {
            return Err(SmoothError::MissingRows {
                start: local_rows.start,
                end: local_rows.end,
            })
        }
        None => {}
    }

    let mut report = StitchReport::default();

    if !accelerator_rows.is_empty() {
        let src_offset = (accelerator_rows.start - accelerator.range.start) * cols_usize;
        let len = accelerator_rows.len() * cols_usize;
        dst.data[accelerator_rows.start * cols_usize..accelerator_rows.end * cols_usize]
            .copy_from_slice(&accelerator.data[src_offset..src_offset + len]);
        report.accelerator_rows = accelerator_rows.len();
    }

    if let Some(local) = local {
        if !local_rows.is_empty() {
            let src_offset = (local_rows.start - local.range.start) * cols_usize;
            let len = local_rows.len() * cols_usize;
            dst.data[local_rows.start * cols_usize..local_rows.end * cols_usize]
                .copy_from_slice(&local.data[src_offset..src_offset + len]);
        }
        report.local_rows = local_rows.len();
        report.discarded_halo_rows = local.range.len() - local_rows.len();
    }

    trace!(
        "Stitched {} accelerator rows, {} local rows, dropped {} halo rows",
        report.accelerator_rows,
        report.local_rows,
        report.discarded_halo_rows
    );

    Ok(report)
}

/// Allocates the output and merges both partial results into it, see [stitch_into].
pub fn stitch(
    partition: &Partition,
    cols: u32,
    accelerator: &PartialResult,
    local: Option<&PartialResult>,
) -> Result<(SmoothedImage, StitchReport), SmoothError> {
    let mut dst = SmoothedImage {
        data: try_vec(partition.rows * cols as usize, 0i16)?,
        rows: partition.rows as u32,
        cols,
    };
    let report = stitch_into(&mut dst, partition, accelerator, local)?;
    Ok((dst, report))
}

/// Outcome of comparing the local path's halo rows with the accelerator rows they overlap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct HaloComparison {
    pub rows_compared: usize,
    /// Largest absolute difference over all compared samples.
    pub max_diff: u16,
    /// Rows holding at least one sample that differs by more than the tolerance.
    pub mismatched_rows: usize,
}

impl HaloComparison {
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.mismatched_rows == 0
    }
}

/// Compares rows computed by both paths.
///
/// Both results are expected to agree within `tolerance`, the fixed point and
/// float paths differ by at most one quantization step.
pub fn verify_halo(
    accelerator: &PartialResult,
    local: &PartialResult,
    tolerance: u16,
) -> HaloComparison {
    let mut comparison = HaloComparison::default();
    let start = local.range.start.max(accelerator.range.start);
    let end = accelerator.range.end.min(local.range.end);
    for y in start..end {
        let (Some(a), Some(b)) = (accelerator.row(y), local.row(y)) else {
            continue;
        };
        let row_max = a
            .iter()
            .zip(b.iter())
            .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs().min(u16::MAX as u32) as u16)
            .max()
            .unwrap_or(0);
        comparison.rows_compared += 1;
        comparison.max_diff = comparison.max_diff.max(row_max);
        if row_max > tolerance {
            comparison.mismatched_rows += 1;
        }
    }
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::FullOffloadPolicy;

    fn tagged(range: RowRange, cols: u32, tag: i16) -> PartialResult {
        let mut data = Vec::with_capacity(range.len() * cols as usize);
        for y in range.start..range.end {
            for _ in 0..cols {
                data.push(tag * 1000 + y as i16);
            }
        }
        PartialResult::new(range, cols, data)
    }

    #[test]
    fn test_stitch_takes_rows_from_owner() {
        let partition = Partition::new(128, 50, 7, FullOffloadPolicy::ComputeHalo).unwrap();
        let accelerator = tagged(partition.accelerator, 4, 1);
        let local = tagged(partition.local.unwrap(), 4, 2);
        let (image, report) = stitch(&partition, 4, &accelerator, Some(&local)).unwrap();
        assert_eq!(image.data.len(), 128 * 4);
        for y in 0..128usize {
            let expected = if y < 64 { 1000 + y as i16 } else { 2000 + y as i16 };
            assert!(image.row(y).iter().all(|&x| x == expected), "Row {y}");
        }
        assert_eq!(
            report,
            StitchReport {
                accelerator_rows: 64,
                local_rows: 64,
                discarded_halo_rows: 7,
            }
        );
    }

    #[test]
    fn test_every_row_written_once() {
        for rows in [1usize, 5, 16, 33] {
            for fraction in [0u32, 10, 50, 90, 100] {
                for policy in [FullOffloadPolicy::ComputeHalo, FullOffloadPolicy::SkipLocal] {
                    let partition = Partition::new(rows, fraction, 3, policy).unwrap();
                    let accelerator = tagged(partition.accelerator, 3, 1);
                    let local = partition.local.map(|range| tagged(range, 3, 2));
                    let (image, report) =
                        stitch(&partition, 3, &accelerator, local.as_ref()).unwrap();
                    assert_eq!(image.data.len(), rows * 3);
                    assert_eq!(report.accelerator_rows + report.local_rows, rows);
                    assert!(image.data.iter().all(|&x| x >= 1000));
                }
            }
        }
    }

    #[test]
    fn test_stitch_rejects_short_results() {
        let partition = Partition::new(20, 50, 2, FullOffloadPolicy::ComputeHalo).unwrap();
        let accelerator = tagged(RowRange::new(0, 8), 2, 1);
        let local = tagged(partition.local.unwrap(), 2, 2);
        assert_eq!(
            stitch(&partition, 2, &accelerator, Some(&local)).err(),
            Some(SmoothError::MissingRows { start: 0, end: 10 })
        );
        let accelerator = tagged(partition.accelerator, 2, 1);
        assert_eq!(
            stitch(&partition, 2, &accelerator, None).err(),
            Some(SmoothError::MissingRows { start: 10, end: 20 })
        );
        let mut broken = tagged(partition.local.unwrap(), 2, 2);
        broken.data.pop();
        assert!(stitch(&partition, 2, &accelerator, Some(&broken)).is_err());
    }

    #[test]
    fn test_verify_halo() {
        let accelerator = tagged(RowRange::new(0, 10), 3, 0);
        let mut local = tagged(RowRange::with_halo(7, 20, 3), 3, 0);
        let comparison = verify_halo(&accelerator, &local, 1);
        assert_eq!(comparison.rows_compared, 3);
        assert_eq!(comparison.max_diff, 0);
        assert!(comparison.is_consistent());

        local.data[1] += 5;
        let comparison = verify_halo(&accelerator, &local, 1);
        assert_eq!(comparison.max_diff, 5);
        assert_eq!(comparison.mismatched_rows, 1);
        assert!(!comparison.is_consistent());
    }
}
