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
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

pub(crate) fn filter_column_sse_symm_f32(
    brows: &[&[f32]],
    dst: &mut [i16],
    kernel: &[f32],
    edge_sum: f32,
    boost: f32,
) {
    assert!(brows.len() >= kernel.len());
    assert!(brows.iter().all(|row| row.len() >= dst.len()));
    unsafe {
        filter_column_sse_symm_f32_impl(brows, dst, kernel, boost / edge_sum);
    }
}

#[target_feature(enable = "sse4.1")]
unsafe fn filter_column_sse_symm_f32_impl(
    brows: &[&[f32]],
    dst: &mut [i16],
    kernel: &[f32],
    scale: f32,
) {
    unsafe {
        let length = kernel.len();
        let half_len = length / 2;
        let width = dst.len();

        let v_scale = _mm_set1_ps(scale);
        let v_half = _mm_set1_ps(0.5);

        let mut cx = 0usize;

        while cx + 8 <= width {
            let coeff = _mm_set1_ps(*kernel.get_unchecked(half_len));
            let center_row = brows.get_unchecked(half_len).get_unchecked(cx..);
            let mut k0 = _mm_mul_ps(_mm_loadu_ps(center_row.as_ptr()), coeff);
            let mut k1 = _mm_mul_ps(_mm_loadu_ps(center_row.get_unchecked(4..).as_ptr()), coeff);

            for i in 0..half_len {
                let rollback = length - i - 1;
                let coeff = _mm_set1_ps(*kernel.get_unchecked(i));
                let top = brows.get_unchecked(i).get_unchecked(cx..);
                let bottom = brows.get_unchecked(rollback).get_unchecked(cx..);
                let s0 = _mm_add_ps(_mm_loadu_ps(top.as_ptr()), _mm_loadu_ps(bottom.as_ptr()));
                let s1 = _mm_add_ps(
                    _mm_loadu_ps(top.get_unchecked(4..).as_ptr()),
                    _mm_loadu_ps(bottom.get_unchecked(4..).as_ptr()),
                );
                k0 = _mm_add_ps(k0, _mm_mul_ps(s0, coeff));
                k1 = _mm_add_ps(k1, _mm_mul_ps(s1, coeff));
            }

            let z0 = _mm_cvttps_epi32(_mm_add_ps(_mm_mul_ps(k0, v_scale), v_half));
            let z1 = _mm_cvttps_epi32(_mm_add_ps(_mm_mul_ps(k1, v_scale), v_half));
            _mm_storeu_si128(
                dst.get_unchecked_mut(cx..).as_mut_ptr() as *mut __m128i,
                _mm_packs_epi32(z0, z1),
            );
            cx += 8;
        }

        while cx + 4 <= width {
            let coeff = _mm_set1_ps(*kernel.get_unchecked(half_len));
            let center_row = brows.get_unchecked(half_len).get_unchecked(cx..);
            let mut k0 = _mm_mul_ps(_mm_loadu_ps(center_row.as_ptr()), coeff);

            for i in 0..half_len {
                let rollback = length - i - 1;
                let coeff = _mm_set1_ps(*kernel.get_unchecked(i));
                let top = _mm_loadu_ps(brows.get_unchecked(i).get_unchecked(cx..).as_ptr());
                let bottom =
                    _mm_loadu_ps(brows.get_unchecked(rollback).get_unchecked(cx..).as_ptr());
                k0 = _mm_add_ps(k0, _mm_mul_ps(_mm_add_ps(top, bottom), coeff));
            }

            let z0 = _mm_cvttps_epi32(_mm_add_ps(_mm_mul_ps(k0, v_scale), v_half));
            _mm_storel_epi64(
                dst.get_unchecked_mut(cx..).as_mut_ptr() as *mut __m128i,
                _mm_packs_epi32(z0, z0),
            );
            cx += 4;
        }

        for x in cx..width {
            let mut k0 = *brows.get_unchecked(half_len).get_unchecked(x)
                * *kernel.get_unchecked(half_len);
            for i in 0..half_len {
                let rollback = length - i - 1;
                k0 += (*brows.get_unchecked(i).get_unchecked(x)
                    + *brows.get_unchecked(rollback).get_unchecked(x))
                    * *kernel.get_unchecked(i);
            }
            *dst.get_unchecked_mut(x) = quantize(k0 * scale + 0.5);
        }
    }
}
