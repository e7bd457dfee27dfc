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
use crate::util::FaultCode;
use crate::SmoothError;

const KIND_BUFFER_HANDLE: u32 = 1;
const KIND_DIMENSIONS: u32 = 2;
const KIND_LOAD_FRACTION: u32 = 3;
const KIND_SIGMA: u32 = 4;
const KIND_BOOST: u32 = 5;
const KIND_START: u32 = 6;
const KIND_SHUTDOWN: u32 = 7;

const MSG_INITIALIZED: u32 = 1;
const MSG_DONE: u32 = 2;
const MSG_MEMORY_ERROR: u32 = 3;

/// Host to accelerator notification.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HostMessage {
    /// Handle of the shared region holding the image.
    BufferHandle(u32),
    /// `rows << 16 | cols`.
    Dimensions(u32),
    /// Percentage of rows the accelerator computes.
    LoadFraction(u32),
    Sigma(f32),
    Boost(u16),
    /// Begin smoothing, the reply carries the same sequence number.
    Start { seq: u32 },
    Shutdown,
}

impl HostMessage {
    /// Packs image dimensions, both must be below 65536.
    pub fn dimensions(rows: usize, cols: usize) -> Result<HostMessage, SmoothError> {
        if rows > u16::MAX as usize || cols > u16::MAX as usize {
            return Err(SmoothError::DimensionsExceedPacking { rows, cols });
        }
        Ok(HostMessage::Dimensions(((rows as u32) << 16) | cols as u32))
    }

    /// Splits a packed `Dimensions` payload into `(rows, cols)`.
    #[inline]
    pub fn unpack_dimensions(packed: u32) -> (usize, usize) {
        (((packed >> 16) & 0xFFFF) as usize, (packed & 0xFFFF) as usize)
    }

    /// `[kind, payload]` for transports that only carry integers.
    pub fn encode(&self) -> [u32; 2] {
        match *self {
            HostMessage::BufferHandle(handle) => [KIND_BUFFER_HANDLE, handle],
            HostMessage::Dimensions(packed) => [KIND_DIMENSIONS, packed],
            HostMessage::LoadFraction(fraction) => [KIND_LOAD_FRACTION, fraction],
            HostMessage::Sigma(sigma) => [KIND_SIGMA, sigma.to_bits()],
            HostMessage::Boost(boost) => [KIND_BOOST, boost as u32],
            HostMessage::Start { seq } => [KIND_START, seq],
            HostMessage::Shutdown => [KIND_SHUTDOWN, 0],
        }
    }

    pub fn decode(raw: [u32; 2]) -> Option<HostMessage> {
        let [kind, payload] = raw;
        match kind {
            KIND_BUFFER_HANDLE => Some(HostMessage::BufferHandle(payload)),
            KIND_DIMENSIONS => Some(HostMessage::Dimensions(payload)),
            KIND_LOAD_FRACTION => Some(HostMessage::LoadFraction(payload)),
            KIND_SIGMA => Some(HostMessage::Sigma(f32::from_bits(payload))),
            KIND_BOOST => u16::try_from(payload).ok().map(HostMessage::Boost),
            KIND_START => Some(HostMessage::Start { seq: payload }),
            KIND_SHUTDOWN => Some(HostMessage::Shutdown),
            _ => None,
        }
    }
}

/// Accelerator to host notification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeviceMessage {
    Initialized,
    Done { seq: u32 },
    MemoryError { seq: u32, code: FaultCode },
}

impl DeviceMessage {
    /// `[sentinel, seq, code]`, sentinel is 1 for initialized, 2 for done and 3 for memory error.
    pub fn to_raw(&self) -> [u32; 3] {
        match *self {
            DeviceMessage::Initialized => [MSG_INITIALIZED, 0, 0],
            DeviceMessage::Done { seq } => [MSG_DONE, seq, 0],
            DeviceMessage::MemoryError { seq, code } => [MSG_MEMORY_ERROR, seq, code.to_raw()],
        }
    }

    pub fn from_raw(raw: [u32; 3]) -> Option<DeviceMessage> {
        match raw {
            [MSG_INITIALIZED, _, _] => Some(DeviceMessage::Initialized),
            [MSG_DONE, seq, _] => Some(DeviceMessage::Done { seq }),
            [MSG_MEMORY_ERROR, seq, code] => {
                FaultCode::from_raw(code).map(|code| DeviceMessage::MemoryError { seq, code })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_packing() {
        let msg = HostMessage::dimensions(480, 640).unwrap();
        assert_eq!(msg, HostMessage::Dimensions((480 << 16) | 640));
        assert_eq!(HostMessage::unpack_dimensions((480 << 16) | 640), (480, 640));
        assert_eq!(
            HostMessage::dimensions(65536, 4),
            Err(SmoothError::DimensionsExceedPacking {
                rows: 65536,
                cols: 4
            })
        );
    }

    #[test]
    fn test_host_wire_format() {
        assert_eq!(HostMessage::LoadFraction(50).encode(), [3, 50]);
        assert_eq!(
            HostMessage::decode(HostMessage::Sigma(2.5).encode()),
            Some(HostMessage::Sigma(2.5))
        );
        assert_eq!(
            HostMessage::decode([6, 17]),
            Some(HostMessage::Start { seq: 17 })
        );
        assert_eq!(HostMessage::decode([5, 70_000]), None);
        assert_eq!(HostMessage::decode([42, 0]), None);
    }

    #[test]
    fn test_device_sentinels() {
        assert_eq!(DeviceMessage::Initialized.to_raw()[0], 1);
        assert_eq!(DeviceMessage::Done { seq: 9 }.to_raw(), [2, 9, 0]);
        let fault = DeviceMessage::MemoryError {
            seq: 4,
            code: FaultCode::OutOfMemory,
        };
        assert_eq!(fault.to_raw()[0], 3);
        assert_eq!(DeviceMessage::from_raw(fault.to_raw()), Some(fault));
        assert_eq!(DeviceMessage::from_raw([3, 1, 99]), None);
        assert_eq!(DeviceMessage::from_raw([0, 0, 0]), None);
    }
}
