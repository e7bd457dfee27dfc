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
use crate::offload::message::{DeviceMessage, HostMessage};
use crate::SmoothError;
use crossbeam_channel::{
    bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender, TrySendError,
};
use std::time::Duration;

/// Host end of the notification channel.
pub struct AcceleratorLink {
    to_device: Sender<HostMessage>,
    from_device: Receiver<DeviceMessage>,
}

/// Device end of the notification channel.
pub struct DeviceEndpoint {
    from_host: Receiver<HostMessage>,
    to_host: Sender<DeviceMessage>,
}

impl AcceleratorLink {
    /// Creates both ends, each direction buffers at most `capacity` messages.
    pub fn pair(capacity: usize) -> (AcceleratorLink, DeviceEndpoint) {
        let (to_device, from_host) = bounded(capacity);
        let (to_host, from_device) = bounded(capacity);
        (
            AcceleratorLink {
                to_device,
                from_device,
            },
            DeviceEndpoint { from_host, to_host },
        )
    }

    pub fn send(&self, message: HostMessage) -> Result<(), SmoothError> {
        self.to_device
            .send(message)
            .map_err(|_| SmoothError::Disconnected)
    }

    /// Like [AcceleratorLink::send], but gives up once `timeout` elapses on a full channel.
    pub fn send_timeout(
        &self,
        message: HostMessage,
        timeout: Option<Duration>,
    ) -> Result<(), SmoothError> {
        match timeout {
            None => self.send(message),
            Some(timeout) => self
                .to_device
                .send_timeout(message, timeout)
                .map_err(|e| match e {
                    SendTimeoutError::Timeout(_) => SmoothError::AcceleratorTimeout(timeout),
                    SendTimeoutError::Disconnected(_) => SmoothError::Disconnected,
                }),
        }
    }

    /// Sends without waiting, a full channel is reported as a zero timeout.
    pub fn try_send(&self, message: HostMessage) -> Result<(), SmoothError> {
        self.to_device.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => SmoothError::AcceleratorTimeout(Duration::ZERO),
            TrySendError::Disconnected(_) => SmoothError::Disconnected,
        })
    }

    /// Waits for the next device message, `None` blocks until one arrives.
    pub fn recv(&self, timeout: Option<Duration>) -> Result<DeviceMessage, SmoothError> {
        match timeout {
            None => self.from_device.recv().map_err(|_| SmoothError::Disconnected),
            Some(timeout) => self.from_device.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => SmoothError::AcceleratorTimeout(timeout),
                RecvTimeoutError::Disconnected => SmoothError::Disconnected,
            }),
        }
    }

    /// Drops replies that were queued after an abandoned invocation.
    pub(crate) fn drain(&self) -> usize {
        self.from_device.try_iter().count()
    }
}

impl DeviceEndpoint {
    /// Blocks for the next host message, `None` once the host is gone.
    pub fn recv(&self) -> Option<HostMessage> {
        self.from_host.recv().ok()
    }

    pub fn send(&self, message: DeviceMessage) -> Result<(), SmoothError> {
        self.to_host
            .send(message)
            .map_err(|_| SmoothError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_timeout() {
        let (link, endpoint) = AcceleratorLink::pair(4);
        link.send(HostMessage::LoadFraction(30)).unwrap();
        assert_eq!(endpoint.recv(), Some(HostMessage::LoadFraction(30)));

        endpoint.send(DeviceMessage::Done { seq: 3 }).unwrap();
        assert_eq!(link.recv(None), Ok(DeviceMessage::Done { seq: 3 }));

        let timeout = Duration::from_millis(10);
        assert_eq!(
            link.recv(Some(timeout)),
            Err(SmoothError::AcceleratorTimeout(timeout))
        );
    }

    #[test]
    fn test_send_gives_up_on_full_channel() {
        let (link, endpoint) = AcceleratorLink::pair(2);
        let timeout = Duration::from_millis(10);
        link.send_timeout(HostMessage::LoadFraction(1), Some(timeout))
            .unwrap();
        link.send_timeout(HostMessage::LoadFraction(2), Some(timeout))
            .unwrap();
        assert_eq!(
            link.send_timeout(HostMessage::LoadFraction(3), Some(timeout)),
            Err(SmoothError::AcceleratorTimeout(timeout))
        );
        assert_eq!(
            link.try_send(HostMessage::Shutdown),
            Err(SmoothError::AcceleratorTimeout(Duration::ZERO))
        );
        assert_eq!(endpoint.recv(), Some(HostMessage::LoadFraction(1)));
        assert_eq!(link.try_send(HostMessage::Shutdown), Ok(()));
    }

    #[test]
    fn test_disconnect() {
        let (link, endpoint) = AcceleratorLink::pair(1);
        drop(endpoint);
        assert_eq!(link.send(HostMessage::Shutdown), Err(SmoothError::Disconnected));
        assert_eq!(link.recv(None), Err(SmoothError::Disconnected));
        assert_eq!(
            link.try_send(HostMessage::Shutdown),
            Err(SmoothError::Disconnected)
        );
        assert_eq!(
            link.recv(Some(Duration::from_millis(1))),
            Err(SmoothError::Disconnected)
        );
    }
}
