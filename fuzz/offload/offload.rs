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

#![no_main]

use libfuzzer_sys::fuzz_target;
use splitblur::{FullOffloadPolicy, HaloCheck, Image, OffloadCoordinator, OffloadParams};
use std::time::Duration;

fuzz_target!(|data: (u8, u8, u8, u8, bool)| {
    let rows = data.0 as usize;
    let cols = data.1 as usize;
    if rows == 0 || cols == 0 {
        return;
    }
    let sigma = (data.2 as f32 / 32.).max(0.1);
    let fraction = data.3 as u32 % 101;
    let image = Image::new(vec![15u8; rows * cols], rows as u32, cols as u32);

    let Ok(mut coordinator) = OffloadCoordinator::with_simulated_accelerator() else {
        return;
    };
    let policy = if data.4 {
        FullOffloadPolicy::SkipLocal
    } else {
        FullOffloadPolicy::ComputeHalo
    };
    let params = OffloadParams::new(sigma, fraction)
        .with_full_offload(policy)
        .with_halo_check(HaloCheck::Verify)
        .with_completion_timeout(Some(Duration::from_secs(5)));
    if let Ok(outcome) = coordinator.smooth(&image, &params) {
        assert_eq!(outcome.image.data.len(), rows * cols);
        assert!(outcome.image.data.iter().all(|&x| x == 15 * 90));
    }
    _ = coordinator.shutdown();
});
