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
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

pub(crate) fn filter_row_sse_symm_f32(
    src: &[f32],
    dst: &mut [f32],
    kernel: &[f32],
    edge_sums: &[f32],
) {
    assert!(src.len() >= dst.len() + kernel.len() - 1);
    assert!(edge_sums.len() >= dst.len());
    unsafe {
        filter_row_sse_symm_f32_impl(src, dst, kernel, edge_sums);
    }
}

#[target_feature(enable = "sse4.1")]
unsafe fn filter_row_sse_symm_f32_impl(
    src: &[f32],
    dst: &mut [f32],
    kernel: &[f32],
    edge_sums: &[f32],
) {
    unsafe {
        let length = kernel.len();
        let half_len = length / 2;
        let width = dst.len();

        let mut cx = 0usize;

        while cx + 8 <= width {
            let shifted_src = src.get_unchecked(cx..);
            let coeff = _mm_set1_ps(*kernel.get_unchecked(half_len));

            let mut k0 = _mm_mul_ps(
                _mm_loadu_ps(shifted_src.get_unchecked(half_len..).as_ptr()),
                coeff,
            );
            let mut k1 = _mm_mul_ps(
                _mm_loadu_ps(shifted_src.get_unchecked(half_len + 4..).as_ptr()),
                coeff,
            );

            for i in 0..half_len {
                let rollback = length - i - 1;
                let coeff = _mm_set1_ps(*kernel.get_unchecked(i));
                let v_source0 = _mm_loadu_ps(shifted_src.get_unchecked(i..).as_ptr());
                let v_source1 = _mm_loadu_ps(shifted_src.get_unchecked(rollback..).as_ptr());
                let v_source2 = _mm_loadu_ps(shifted_src.get_unchecked(i + 4..).as_ptr());
                let v_source3 = _mm_loadu_ps(shifted_src.get_unchecked(rollback + 4..).as_ptr());
                k0 = _mm_add_ps(k0, _mm_mul_ps(_mm_add_ps(v_source0, v_source1), coeff));
                k1 = _mm_add_ps(k1, _mm_mul_ps(_mm_add_ps(v_source2, v_source3), coeff));
            }

            let sums0 = _mm_loadu_ps(edge_sums.get_unchecked(cx..).as_ptr());
            let sums1 = _mm_loadu_ps(edge_sums.get_unchecked(cx + 4..).as_ptr());
            let dst_ptr = dst.get_unchecked_mut(cx..).as_mut_ptr();
            _mm_storeu_ps(dst_ptr, _mm_div_ps(k0, sums0));
            _mm_storeu_ps(dst_ptr.add(4), _mm_div_ps(k1, sums1));
            cx += 8;
        }

        while cx + 4 <= width {
            let shifted_src = src.get_unchecked(cx..);
            let coeff = _mm_set1_ps(*kernel.get_unchecked(half_len));

            let mut k0 = _mm_mul_ps(
                _mm_loadu_ps(shifted_src.get_unchecked(half_len..).as_ptr()),
                coeff,
            );

            for i in 0..half_len {
                let rollback = length - i - 1;
                let coeff = _mm_set1_ps(*kernel.get_unchecked(i));
                let v_source0 = _mm_loadu_ps(shifted_src.get_unchecked(i..).as_ptr());
                let v_source1 = _mm_loadu_ps(shifted_src.get_unchecked(rollback..).as_ptr());
                k0 = _mm_add_ps(k0, _mm_mul_ps(_mm_add_ps(v_source0, v_source1), coeff));
            }

            let sums = _mm_loadu_ps(edge_sums.get_unchecked(cx..).as_ptr());
            _mm_storeu_ps(
                dst.get_unchecked_mut(cx..).as_mut_ptr(),
                _mm_div_ps(k0, sums),
            );
            cx += 4;
        }

        for x in cx..width {
            let shifted_src = src.get_unchecked(x..);
            let mut k0 = *shifted_src.get_unchecked(half_len) * *kernel.get_unchecked(half_len);
            for i in 0..half_len {
                let rollback = length - i - 1;
                k0 += (*shifted_src.get_unchecked(i) + *shifted_src.get_unchecked(rollback))
                    * *kernel.get_unchecked(i);
            }
            *dst.get_unchecked_mut(x) = k0 / *edge_sums.get_unchecked(x);
        }
    }
}
