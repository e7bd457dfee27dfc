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
use std::arch::aarch64::*;

pub(crate) fn filter_row_neon_symm_f32(
    src: &[f32],
    dst: &mut [f32],
    kernel: &[f32],
    edge_sums: &[f32],
) {
    let length = kernel.len();
    let half_len = length / 2;
    let width = dst.len();
    assert!(src.len() >= width + length - 1);
    assert!(edge_sums.len() >= width);

    unsafe {
        let mut cx = 0usize;

        while cx + 8 <= width {
            let shifted_src = src.get_unchecked(cx..);
            let coeff = vdupq_n_f32(*kernel.get_unchecked(half_len));

            let mut k0 = vmulq_f32(
                vld1q_f32(shifted_src.get_unchecked(half_len..).as_ptr()),
                coeff,
            );
            let mut k1 = vmulq_f32(
                vld1q_f32(shifted_src.get_unchecked(half_len + 4..).as_ptr()),
                coeff,
            );

            for i in 0..half_len {
                let rollback = length - i - 1;
                let coeff = vdupq_n_f32(*kernel.get_unchecked(i));
                let v_source0 = vld1q_f32(shifted_src.get_unchecked(i..).as_ptr());
                let v_source1 = vld1q_f32(shifted_src.get_unchecked(rollback..).as_ptr());
                let v_source2 = vld1q_f32(shifted_src.get_unchecked(i + 4..).as_ptr());
                let v_source3 = vld1q_f32(shifted_src.get_unchecked(rollback + 4..).as_ptr());
                k0 = vfmaq_f32(k0, vaddq_f32(v_source0, v_source1), coeff);
                k1 = vfmaq_f32(k1, vaddq_f32(v_source2, v_source3), coeff);
            }

            let sums0 = vld1q_f32(edge_sums.get_unchecked(cx..).as_ptr());
            let sums1 = vld1q_f32(edge_sums.get_unchecked(cx + 4..).as_ptr());
            let dst_ptr = dst.get_unchecked_mut(cx..).as_mut_ptr();
            vst1q_f32(dst_ptr, vdivq_f32(k0, sums0));
            vst1q_f32(dst_ptr.add(4), vdivq_f32(k1, sums1));
            cx += 8;
        }

        while cx + 4 <= width {
            let shifted_src = src.get_unchecked(cx..);
            let coeff = vdupq_n_f32(*kernel.get_unchecked(half_len));

            let mut k0 = vmulq_f32(
                vld1q_f32(shifted_src.get_unchecked(half_len..).as_ptr()),
                coeff,
            );

            for i in 0..half_len {
                let rollback = length - i - 1;
                let coeff = vdupq_n_f32(*kernel.get_unchecked(i));
                let v_source0 = vld1q_f32(shifted_src.get_unchecked(i..).as_ptr());
                let v_source1 = vld1q_f32(shifted_src.get_unchecked(rollback..).as_ptr());
                k0 = vfmaq_f32(k0, vaddq_f32(v_source0, v_source1), coeff);
            }

            let sums = vld1q_f32(edge_sums.get_unchecked(cx..).as_ptr());
            vst1q_f32(
                dst.get_unchecked_mut(cx..).as_mut_ptr(),
                vdivq_f32(k0, sums),
            );
            cx += 4;
        }

        for x in cx..width {
            let shifted_src = src.get_unchecked(x..);
            let mut k0 = *shifted_src.get_unchecked(half_len) * *kernel.get_unchecked(half_len);

            for i in 0..half_len {
                let rollback = length - i - 1;
                k0 = f32::mul_add(
                    *shifted_src.get_unchecked(i) + *shifted_src.get_unchecked(rollback),
                    *kernel.get_unchecked(i),
                    k0,
                );
            }

            *dst.get_unchecked_mut(x) = k0 / *edge_sums.get_unchecked(x);
        }
    }
}
