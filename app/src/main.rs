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

use image::{GrayImage, ImageReader, Luma};
use splitblur::{
    gaussian_smooth_image, FullOffloadPolicy, HaloCheck, Image, OffloadCoordinator, OffloadParams,
    SmoothingPath, ThreadingPolicy, BOOST,
};
use std::time::{Duration, Instant};

fn gradient(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let checker = if (x / 16 + y / 16) % 2 == 0 { 40 } else { 0 };
        Luma([((x + y) % 216) as u8 + checker])
    })
}

fn to_gray(width: u32, height: u32, data: &[i16], boost: u16) -> Option<GrayImage> {
    let boost = boost as i32;
    let bytes = data
        .iter()
        .map(|&x| ((x as i32 + boost / 2) / boost).clamp(0, 255) as u8)
        .collect();
    GrayImage::from_raw(width, height, bytes)
}

fn main() {
    let mut args = std::env::args().skip(1);
    let gray = match args.next() {
        Some(path) => ImageReader::open(&path)
            .unwrap()
            .decode()
            .unwrap()
            .to_luma8(),
        None => gradient(640, 480),
    };
    let sigma: f32 = args.next().map(|x| x.parse().unwrap()).unwrap_or(2.5);
    let fraction: u32 = args.next().map(|x| x.parse().unwrap()).unwrap_or(50);

    println!("dimensions {:?}, sigma {sigma}, fraction {fraction}", gray.dimensions());

    let image = Image::borrow(gray.as_raw(), gray.height(), gray.width());
    let mut coordinator = OffloadCoordinator::with_simulated_accelerator().unwrap();
    let params = OffloadParams::new(sigma, fraction)
        .with_full_offload(FullOffloadPolicy::ComputeHalo)
        .with_halo_check(HaloCheck::Verify)
        .with_completion_timeout(Some(Duration::from_secs(10)));

    let start = Instant::now();
    let outcome = coordinator.smooth(&image, &params).unwrap();
    println!("offloaded smoothing: {:?}", start.elapsed());
    println!("{:?}", outcome.report);

    let start = Instant::now();
    let local = gaussian_smooth_image(
        &gray,
        sigma,
        BOOST,
        SmoothingPath::Simd,
        ThreadingPolicy::Adaptive,
    )
    .unwrap();
    println!("local smoothing: {:?}", start.elapsed());

    let max_diff = outcome
        .image
        .data
        .iter()
        .zip(local.as_raw().iter())
        .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
        .max()
        .unwrap_or(0);
    println!("max difference between offloaded and local: {max_diff}");

    to_gray(gray.width(), gray.height(), &outcome.image.data, BOOST)
        .unwrap()
        .save("smoothed.png")
        .unwrap();

    coordinator.shutdown().unwrap();
}
