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
#![allow(clippy::too_many_arguments)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! Separable gaussian smoothing split between an accelerator and the host.
//!
//! The accelerator computes the top rows of the image with integer arithmetic,
//! the host computes the remaining rows plus a halo with a vectorized float path,
//! and both halves are stitched into one buffer. Every path can also be run on
//! its own, over the whole image or over any row range.

mod filter1d;
mod gaussian;
mod image;
mod offload;
mod partition;
mod safe_math;
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
mod smooth_image;
mod stitch;
mod threading_policy;
mod util;

pub use filter1d::{smooth_rows_fixed, smooth_rows_reference, smooth_rows_simd, FilterRegion};
pub use gaussian::{
    gaussian_kernel_1d, gaussian_smooth, window_size, FixedKernel, Kernel, SmoothingPath, BOOST,
    MAX_BOOST, MAX_FIXED_SCALE,
};
pub use image::{Image, SmoothedImage};
pub use offload::{
    AcceleratorLink, CoordinatorState, DeviceEndpoint, DeviceMessage, HaloCheck, HostMessage,
    OffloadCoordinator, OffloadOutcome, OffloadParams, OffloadReport, SessionContext, SharedBuffer,
    SharedPool, SimulatedAccelerator,
};
pub use partition::{FullOffloadPolicy, Partition, RowRange};
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
pub use smooth_image::gaussian_smooth_image;
pub use stitch::{stitch, stitch_into, verify_halo, HaloComparison, PartialResult, StitchReport};
pub use threading_policy::ThreadingPolicy;
pub use util::{FaultCode, MismatchedSize, SmoothError, TransferFault};
