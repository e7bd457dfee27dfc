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
use crate::{gaussian_smooth, Image, SmoothError, SmoothingPath, ThreadingPolicy};
use image::{GrayImage, ImageBuffer, Luma};

/// Performs gaussian smoothing of a gray image provided by the image crate.
///
/// Negative samples cannot occur, the boosted result is stored as `u16`.
///
/// # Arguments
///
/// * `image`: Gray image provided by image crate.
/// * `sigma` - Gaussian sigma.
/// * `boost` - Post multiplier, see [crate::BOOST].
/// * `path` - See [SmoothingPath] for more info.
/// * `threading_policy` - Threads usage policy.
///
pub fn gaussian_smooth_image(
    image: &GrayImage,
    sigma: f32,
    boost: u16,
    path: SmoothingPath,
    threading_policy: ThreadingPolicy,
) -> Result<ImageBuffer<Luma<u16>, Vec<u16>>, SmoothError> {
    let source = Image::borrow(image.as_raw(), image.height(), image.width());
    let smoothed = gaussian_smooth(&source, sigma, boost, path, threading_policy)?;
    let data: Vec<u16> = smoothed.data.iter().map(|&x| x.max(0) as u16).collect();
    ImageBuffer::from_raw(image.width(), image.height(), data).ok_or(SmoothError::ZeroBaseSize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BOOST;

    #[test]
    fn test_gray_image_adapter() {
        let image = GrayImage::from_pixel(24, 16, Luma([200u8]));
        let smoothed =
            gaussian_smooth_image(&image, 1.5, BOOST, SmoothingPath::Simd, ThreadingPolicy::Single)
                .unwrap();
        assert_eq!(smoothed.dimensions(), (24, 16));
        assert!(smoothed.pixels().all(|p| p.0[0] == 200 * 90));
    }
}
