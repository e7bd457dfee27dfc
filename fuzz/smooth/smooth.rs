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
use splitblur::{
    gaussian_smooth, smooth_rows_fixed, smooth_rows_simd, FixedKernel, Image, Kernel, RowRange,
    SmoothingPath, ThreadingPolicy, BOOST,
};

fuzz_target!(|data: (u8, u8, u8, u8, u8)| {
    let rows = data.0 as usize;
    let cols = data.1 as usize;
    let sigma = data.2 as f32 / 16.;
    if rows == 0 || cols == 0 || sigma <= 0. {
        return;
    }
    let src: Vec<u8> = (0..rows * cols)
        .map(|i| (i as u8).wrapping_mul(data.3))
        .collect();
    let image = Image::new(src, rows as u32, cols as u32);

    for path in [
        SmoothingPath::Simd,
        SmoothingPath::FixedPoint,
        SmoothingPath::Reference,
    ] {
        _ = gaussian_smooth(&image, sigma, BOOST, path, ThreadingPolicy::Single);
    }

    let Ok(kernel) = Kernel::new(sigma) else {
        return;
    };
    let start = data.4 as usize % rows;
    let range = RowRange::new(start, rows);
    _ = smooth_rows_simd(&image, &kernel, BOOST, range);
    if let Ok(fixed) = FixedKernel::from_kernel(&kernel) {
        _ = smooth_rows_fixed(&image, &fixed, BOOST, range);
    }
});
