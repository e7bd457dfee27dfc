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

use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use splitblur::{
    gaussian_smooth, Image, OffloadCoordinator, OffloadParams, SmoothingPath, ThreadingPolicy,
    BOOST,
};

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut c = c.benchmark_group("Smooth");
    c.sample_size(10);

    let (rows, cols) = (1080u32, 1920u32);
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..rows * cols).map(|_| rng.gen()).collect();
    let image = Image::borrow(&data, rows, cols);

    for path in [
        SmoothingPath::Simd,
        SmoothingPath::FixedPoint,
        SmoothingPath::Reference,
    ] {
        c.bench_function(format!("{path:?} sigma 2.5 single thread"), |b| {
            b.iter(|| {
                gaussian_smooth(&image, 2.5, BOOST, path, ThreadingPolicy::Single).unwrap();
            })
        });
    }

    c.bench_function("Simd sigma 2.5 adaptive", |b| {
        b.iter(|| {
            gaussian_smooth(
                &image,
                2.5,
                BOOST,
                SmoothingPath::Simd,
                ThreadingPolicy::Adaptive,
            )
            .unwrap();
        })
    });

    let mut coordinator = OffloadCoordinator::with_simulated_accelerator().unwrap();
    for fraction in [0u32, 25, 50, 100] {
        let params = OffloadParams::new(2.5, fraction);
        c.bench_function(format!("Offload sigma 2.5 fraction {fraction}"), |b| {
            b.iter(|| {
                coordinator.smooth(&image, &params).unwrap();
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
