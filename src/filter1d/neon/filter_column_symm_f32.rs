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
use crate::filter1d::filter_column::quantize;
use std::arch::aarch64::*;

pub(crate) fn filter_column_neon_symm_f32(
    brows: &[&[f32]],
    dst: &mut [i16],
    kernel: &[f32],
    edge_sum: f32,
    boost: f32,
) {
    let length = kernel.len();
    let half_len = length / 2;
    let width = dst.len();
    assert!(brows.len() >= length);
    assert!(brows.iter().all(|row| row.len() >= width));

    let scale = boost / edge_sum;

    unsafe {
        let v_scale = vdupq_n_f32(scale);
        let v_half = vdupq_n_f32(0.5);

        let mut cx = 0usize;

        while cx + 8 <= width {
            let coeff = vdupq_n_f32(*kernel.get_unchecked(half_len));
            let center_row = brows.get_unchecked(half_len).get_unchecked(cx..);
            let mut k0 = vmulq_f32(vld1q_f32(center_row.as_ptr()), coeff);
            let mut k1 = vmulq_f32(vld1q_f32(center_row.get_unchecked(4..).as_ptr()), coeff);

            for i in 0..half_len {
                let rollback = length - i - 1;
                let coeff = vdupq_n_f32(*kernel.get_unchecked(i));
                let top = brows.get_unchecked(i).get_unchecked(cx..);
                let bottom = brows.get_unchecked(rollback).get_unchecked(cx..);
                let s0 = vaddq_f32(vld1q_f32(top.as_ptr()), vld1q_f32(bottom.as_ptr()));
                let s1 = vaddq_f32(
                    vld1q_f32(top.get_unchecked(4..).as_ptr()),
                    vld1q_f32(bottom.get_unchecked(4..).as_ptr()),
                );
                k0 = vfmaq_f32(k0, s0, coeff);
                k1 = vfmaq_f32(k1, s1, coeff);
            }

            let z0 = vcvtq_s32_f32(vfmaq_f32(v_half, k0, v_scale));
            let z1 = vcvtq_s32_f32(vfmaq_f32(v_half, k1, v_scale));
            let packed = vcombine_s16(vqmovn_s32(z0), vqmovn_s32(z1));
            vst1q_s16(dst.get_unchecked_mut(cx..).as_mut_ptr(), packed);
            cx += 8;
        }

        while cx + 4 <= width {
            let coeff = vdupq_n_f32(*kernel.get_unchecked(half_len));
            let center_row = brows.get_unchecked(half_len).get_unchecked(cx..);
            let mut k0 = vmulq_f32(vld1q_f32(center_row.as_ptr()), coeff);

            for i in 0..half_len {
                let rollback = length - i - 1;
                let coeff = vdupq_n_f32(*kernel.get_unchecked(i));
                let top = vld1q_f32(brows.get_unchecked(i).get_unchecked(cx..).as_ptr());
                let bottom = vld1q_f32(brows.get_unchecked(rollback).get_unchecked(cx..).as_ptr());
                k0 = vfmaq_f32(k0, vaddq_f32(top, bottom), coeff);
            }

            let z0 = vcvtq_s32_f32(vfmaq_f32(v_half, k0, v_scale));
            vst1_s16(dst.get_unchecked_mut(cx..).as_mut_ptr(), vqmovn_s32(z0));
            cx += 4;
        }

        for x in cx..width {
            let mut k0 = *brows.get_unchecked(half_len).get_unchecked(x) * *kernel.get_unchecked(half_len);
            for i in 0..half_len {
                let rollback = length - i - 1;
                k0 = f32::mul_add(
                    *brows.get_unchecked(i).get_unchecked(x)
                        + *brows.get_unchecked(rollback).get_unchecked(x),
                    *kernel.get_unchecked(i),
                    k0,
                );
            }
            *dst.get_unchecked_mut(x) = quantize(f32::mul_add(k0, scale, 0.5));
        }
    }
}
