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
/// Symmetric horizontal pass over a zero padded row, four pixels per step.
///
/// `src[x..x + kernel.len()]` is the window of output pixel `x`, the result is
/// divided by the in-bounds kernel sum `edge_sums[x]`.
#[cfg_attr(all(target_arch = "aarch64", feature = "neon"), allow(dead_code))]
pub(crate) fn filter_row_symm_f32(src: &[f32], dst: &mut [f32], kernel: &[f32], edge_sums: &[f32]) {
    let length = kernel.len();
    let half_len = length / 2;
    let width = dst.len();
    let coeff = kernel[half_len];

    let mut cx = 0usize;

    while cx + 4 <= width {
        let shifted_src = &src[cx..];

        let mut k0 = [0f32; 4];
        for (l, k) in k0.iter_mut().enumerate() {
            *k = shifted_src[half_len + l] * coeff;
        }

        for i in 0..half_len {
            let rollback = length - i - 1;
            let weight = kernel[i];
            for (l, k) in k0.iter_mut().enumerate() {
                *k += (shifted_src[i + l] + shifted_src[rollback + l]) * weight;
            }
        }

        for ((dst, k), &sum) in dst[cx..cx + 4]
            .iter_mut()
            .zip(k0)
            .zip(edge_sums[cx..cx + 4].iter())
        {
            *dst = k / sum;
        }
        cx += 4;
    }

    for x in cx..width {
        let shifted_src = &src[x..];
        let mut k0 = shifted_src[half_len] * coeff;
        for i in 0..half_len {
            let rollback = length - i - 1;
            k0 += (shifted_src[i] + shifted_src[rollback]) * kernel[i];
        }
        dst[x] = k0 / edge_sums[x];
    }
}
