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
/// Narrows a boosted, half biased value to the output type, truncating toward zero.
#[inline(always)]
pub(crate) fn quantize(v: f32) -> i16 {
    (v as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Symmetric vertical pass, four pixels per step.
///
/// `brows` holds `kernel.len()` consecutive rows of the horizontal pass, rows
/// outside the image are zero and `edge_sum` is the sum of taps that fall
/// inside it.
#[cfg_attr(all(target_arch = "aarch64", feature = "neon"), allow(dead_code))]
pub(crate) fn filter_column_symm_f32(
    brows: &[&[f32]],
    dst: &mut [i16],
    kernel: &[f32],
    edge_sum: f32,
    boost: f32,
) {
    let length = kernel.len();
    let half_len = length / 2;
    let width = dst.len();
    let coeff = kernel[half_len];
    let scale = boost / edge_sum;

    let mut cx = 0usize;

    while cx + 4 <= width {
        let mut k0 = [0f32; 4];
        let center_row = &brows[half_len][cx..cx + 4];
        for (k, &v) in k0.iter_mut().zip(center_row) {
            *k = v * coeff;
        }

        for i in 0..half_len {
            let rollback = length - i - 1;
            let weight = kernel[i];
            let top = &brows[i][cx..cx + 4];
            let bottom = &brows[rollback][cx..cx + 4];
            for ((k, &t), &b) in k0.iter_mut().zip(top).zip(bottom) {
                *k += (t + b) * weight;
            }
        }

        for (dst, k) in dst[cx..cx + 4].iter_mut().zip(k0) {
            *dst = quantize(k * scale + 0.5);
        }
        cx += 4;
    }

    for x in cx..width {
        let mut k0 = brows[half_len][x] * coeff;
        for i in 0..half_len {
            let rollback = length - i - 1;
            k0 += (brows[i][x] + brows[rollback][x]) * kernel[i];
        }
        dst[x] = quantize(k0 * scale + 0.5);
    }
}
