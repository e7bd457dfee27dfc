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
use crate::filter1d::check_boost;
use crate::gaussian::window_size;
use crate::partition::FullOffloadPolicy;
use crate::{SmoothError, BOOST};
use std::time::Duration;

/// Whether the local path's halo rows are compared with the accelerator's rows.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
pub enum HaloCheck {
    #[default]
    Off,
    /// Compare and log rows differing by more than one quantization step.
    Verify,
}

/// Parameters of one offloaded smoothing invocation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OffloadParams {
    /// Gaussian sigma, must be positive and finite.
    pub sigma: f32,
    /// Percentage of rows assigned to the accelerator, `0..=100`.
    pub fraction: u32,
    /// Post multiplier, `1..=128`.
    pub boost: u16,
    /// `None` waits for the accelerator forever.
    pub completion_timeout: Option<Duration>,
    pub full_offload: FullOffloadPolicy,
    pub halo_check: HaloCheck,
}

impl OffloadParams {
    pub fn new(sigma: f32, fraction: u32) -> OffloadParams {
        OffloadParams {
            sigma,
            fraction,
            boost: BOOST,
            completion_timeout: None,
            full_offload: FullOffloadPolicy::default(),
            halo_check: HaloCheck::default(),
        }
    }

    pub fn with_boost(mut self, boost: u16) -> OffloadParams {
        self.boost = boost;
        self
    }

    pub fn with_completion_timeout(mut self, timeout: Option<Duration>) -> OffloadParams {
        self.completion_timeout = timeout;
        self
    }

    pub fn with_full_offload(mut self, policy: FullOffloadPolicy) -> OffloadParams {
        self.full_offload = policy;
        self
    }

    pub fn with_halo_check(mut self, halo_check: HaloCheck) -> OffloadParams {
        self.halo_check = halo_check;
        self
    }

    pub fn validate(&self) -> Result<(), SmoothError> {
        window_size(self.sigma)?;
        if self.fraction > 100 {
            return Err(SmoothError::InvalidFraction(self.fraction));
        }
        check_boost(self.boost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_setters() {
        let params = OffloadParams::new(2.5, 50);
        assert_eq!(params.boost, BOOST);
        assert_eq!(params.completion_timeout, None);
        assert_eq!(params.full_offload, FullOffloadPolicy::ComputeHalo);
        assert_eq!(params.halo_check, HaloCheck::Off);
        assert!(params.validate().is_ok());

        let tuned = params
            .with_boost(64)
            .with_completion_timeout(Some(Duration::from_millis(250)))
            .with_full_offload(FullOffloadPolicy::SkipLocal)
            .with_halo_check(HaloCheck::Verify);
        assert_eq!(tuned.boost, 64);
        assert_eq!(tuned.completion_timeout, Some(Duration::from_millis(250)));
        assert_eq!(tuned.full_offload, FullOffloadPolicy::SkipLocal);
        assert_eq!(tuned.halo_check, HaloCheck::Verify);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            OffloadParams::new(0., 50).validate(),
            Err(SmoothError::NegativeOrZeroSigma)
        );
        assert_eq!(
            OffloadParams::new(1., 101).validate(),
            Err(SmoothError::InvalidFraction(101))
        );
        assert_eq!(
            OffloadParams::new(1., 100).with_boost(200).validate(),
            Err(SmoothError::InvalidBoost(200))
        );
    }
}
