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
use std::error::Error;
use std::time::Duration;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
/// Shows size mismatching
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

/// Reason a shared buffer transfer could not be completed.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum TransferFault {
    /// Handle is not registered in the shared pool.
    UnknownHandle(u32),
    /// Region is smaller than the requested transfer.
    RegionTooSmall(MismatchedSize),
    /// Device memory lock was poisoned by a panicking peer.
    Poisoned,
}

/// Code carried by an accelerator memory-error sentinel.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum FaultCode {
    /// Accelerator could not allocate its working buffers.
    OutOfMemory,
    /// Buffer handle was never announced or is not present in the pool.
    UnknownBuffer,
    /// Announced region cannot hold `rows * cols` samples.
    RegionTooSmall,
    /// Start arrived before dimensions, load fraction or sigma were announced.
    MissingConfiguration,
    /// Accelerator rejected the announced parameters.
    InvalidParameters,
}

impl FaultCode {
    pub(crate) fn to_raw(self) -> u32 {
        match self {
            FaultCode::OutOfMemory => 1,
            FaultCode::UnknownBuffer => 2,
            FaultCode::RegionTooSmall => 3,
            FaultCode::MissingConfiguration => 4,
            FaultCode::InvalidParameters => 5,
        }
    }

    pub(crate) fn from_raw(raw: u32) -> Option<FaultCode> {
        match raw {
            1 => Some(FaultCode::OutOfMemory),
            2 => Some(FaultCode::UnknownBuffer),
            3 => Some(FaultCode::RegionTooSmall),
            4 => Some(FaultCode::MissingConfiguration),
            5 => Some(FaultCode::InvalidParameters),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SmoothError {
    ZeroBaseSize,
    NegativeOrZeroSigma,
    InvalidFraction(u32),
    InvalidBoost(u16),
    DimensionsExceedPacking { rows: usize, cols: usize },
    MinimumSliceSizeMismatch(MismatchedSize),
    RowRangeOutOfBounds { start: usize, end: usize, rows: usize },
    MissingRows { start: usize, end: usize },
    KernelTooLarge(usize),
    ExceedingPointerSize,
    OutOfMemory(usize),
    TransferError(TransferFault),
    AcceleratorFault(FaultCode),
    AcceleratorTimeout(Duration),
    Disconnected,
}

impl SmoothError {
    /// Returns true if the session survives this error and the invocation may be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SmoothError::AcceleratorFault(_) | SmoothError::AcceleratorTimeout(_)
        )
    }
}

impl Error for SmoothError {}

impl std::fmt::Display for TransferFault {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TransferFault::UnknownHandle(handle) => {
                f.write_fmt(format_args!("Shared buffer handle {handle} is not registered"))
            }
            TransferFault::RegionTooSmall(size) => f.write_fmt(format_args!(
                "Shared region is too small: expected={}, received={}",
                size.expected, size.received
            )),
            TransferFault::Poisoned => f.write_str("Device memory is poisoned"),
        }
    }
}

impl std::fmt::Display for SmoothError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SmoothError::ZeroBaseSize => f.write_str("Image size must not be zero"),
            SmoothError::NegativeOrZeroSigma => {
                f.write_str("Negative, zero or non finite sigma is not supported")
            }
            SmoothError::InvalidFraction(frac) => f.write_fmt(format_args!(
                "Accelerator fraction must be in 0..=100, but received {frac}"
            )),
            SmoothError::InvalidBoost(boost) => f.write_fmt(format_args!(
                "Boost must be in 1..=128, but received {boost}"
            )),
            SmoothError::DimensionsExceedPacking { rows, cols } => f.write_fmt(format_args!(
                "Image {rows}x{cols} cannot be announced, both dimensions must be below 65536"
            )),
            SmoothError::MinimumSliceSizeMismatch(size) => f.write_fmt(format_args!(
                "Minimum image slice size mismatch: expected={}, received={}",
                size.expected, size.received
            )),
            SmoothError::RowRangeOutOfBounds { start, end, rows } => f.write_fmt(format_args!(
                "Row range {start}..{end} does not fit into image with {rows} rows"
            )),
            SmoothError::MissingRows { start, end } => f.write_fmt(format_args!(
                "Partial results do not cover rows {start}..{end}"
            )),
            SmoothError::KernelTooLarge(size) => {
                f.write_fmt(format_args!("Kernel of size {size} is not supported"))
            }
            SmoothError::ExceedingPointerSize => {
                f.write_str("Image bounds and smoothing kernel exceeds pointer capacity")
            }
            SmoothError::OutOfMemory(bytes) => {
                f.write_fmt(format_args!("Failed to allocate {bytes} bytes"))
            }
            SmoothError::TransferError(fault) => {
                f.write_fmt(format_args!("Shared buffer transfer failed: {fault}"))
            }
            SmoothError::AcceleratorFault(code) => {
                f.write_fmt(format_args!("Accelerator reported memory error: {code:?}"))
            }
            SmoothError::AcceleratorTimeout(timeout) => f.write_fmt(format_args!(
                "Accelerator did not complete within {timeout:?}"
            )),
            SmoothError::Disconnected => f.write_str("Accelerator link is disconnected"),
        }
    }
}

impl From<TransferFault> for SmoothError {
    fn from(value: TransferFault) -> Self {
        SmoothError::TransferError(value)
    }
}

pub(crate) fn check_slice_size<T>(arr: &[T], rows: usize, cols: usize) -> Result<(), SmoothError> {
    if rows == 0 || cols == 0 {
        return Err(SmoothError::ZeroBaseSize);
    }
    let expected = rows
        .checked_mul(cols)
        .ok_or(SmoothError::ExceedingPointerSize)?;
    if arr.len() < expected {
        return Err(SmoothError::MinimumSliceSizeMismatch(MismatchedSize {
            expected,
            received: arr.len(),
        }));
    }
    Ok(())
}

/// Allocates a zero filled vector, reporting allocation failure instead of aborting.
pub(crate) fn try_vec<T: Copy>(len: usize, value: T) -> Result<Vec<T>, SmoothError> {
    let mut store: Vec<T> = Vec::new();
    store
        .try_reserve_exact(len)
        .map_err(|_| SmoothError::OutOfMemory(len.saturating_mul(size_of::<T>())))?;
    store.resize(len, value);
    Ok(store)
}
