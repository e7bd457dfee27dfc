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
use crate::filter1d::{check_boost, smooth_region_fixed, FilterRegion};
use crate::offload::link::{AcceleratorLink, DeviceEndpoint};
use crate::offload::message::{DeviceMessage, HostMessage};
use crate::offload::shared_buffer::SharedPool;
use crate::util::{try_vec, FaultCode, TransferFault};
use crate::{FixedKernel, Image, Kernel, SmoothError};
use log::{debug, info, warn};
use std::thread::JoinHandle;

const LINK_CAPACITY: usize = 16;

impl From<TransferFault> for FaultCode {
    fn from(value: TransferFault) -> Self {
        match value {
            TransferFault::UnknownHandle(_) | TransferFault::Poisoned => FaultCode::UnknownBuffer,
            TransferFault::RegionTooSmall(_) => FaultCode::RegionTooSmall,
        }
    }
}

fn fault_of(err: SmoothError) -> FaultCode {
    match err {
        SmoothError::OutOfMemory(_) => FaultCode::OutOfMemory,
        SmoothError::TransferError(fault) => fault.into(),
        _ => FaultCode::InvalidParameters,
    }
}

/// Configuration announced by the host, kept across invocations.
#[derive(Debug, Default)]
struct DeviceState {
    handle: Option<u32>,
    dimensions: Option<(usize, usize)>,
    fraction: Option<u32>,
    sigma: Option<f32>,
    boost: Option<u16>,
}

impl DeviceState {
    fn apply(&mut self, message: HostMessage) {
        match message {
            HostMessage::BufferHandle(handle) => self.handle = Some(handle),
            HostMessage::Dimensions(packed) => {
                self.dimensions = Some(HostMessage::unpack_dimensions(packed))
            }
            HostMessage::LoadFraction(fraction) => self.fraction = Some(fraction),
            HostMessage::Sigma(sigma) => self.sigma = Some(sigma),
            HostMessage::Boost(boost) => self.boost = Some(boost),
            HostMessage::Start { .. } | HostMessage::Shutdown => {}
        }
    }

    /// Smooths the accelerator's rows in place, returns how many rows were written.
    fn execute(&self, pool: &SharedPool) -> Result<usize, FaultCode> {
        let (Some(handle), Some((rows, cols)), Some(fraction), Some(sigma)) =
            (self.handle, self.dimensions, self.fraction, self.sigma)
        else {
            return Err(FaultCode::MissingConfiguration);
        };
        let boost = self.boost.unwrap_or(crate::BOOST);
        if rows == 0 || cols == 0 || fraction > 100 || check_boost(boost).is_err() {
            return Err(FaultCode::InvalidParameters);
        }

        let samples = rows * cols;
        let region_len = pool.region_len(handle)?;
        if region_len < samples * size_of::<i16>() {
            return Err(FaultCode::RegionTooSmall);
        }

        let accelerator_rows = rows * fraction as usize / 100;
        if accelerator_rows == 0 {
            return Ok(0);
        }

        let pixels = pool.device_read(handle, samples)?;
        let image = Image::new(pixels, rows as u32, cols as u32);
        let kernel = Kernel::new(sigma)
            .and_then(|kernel| FixedKernel::from_kernel(&kernel))
            .map_err(fault_of)?;

        let mut smoothed = try_vec(accelerator_rows * cols, 0i16).map_err(fault_of)?;
        smooth_region_fixed(
            &image,
            &kernel,
            boost,
            FilterRegion::new(0, accelerator_rows),
            &mut smoothed,
        )
        .map_err(fault_of)?;

        let mut encoded = try_vec(smoothed.len() * size_of::<i16>(), 0u8).map_err(fault_of)?;
        for (dst, &v) in encoded.chunks_exact_mut(2).zip(smoothed.iter()) {
            dst.copy_from_slice(&v.to_le_bytes());
        }
        pool.device_write(handle, &encoded)?;
        Ok(accelerator_rows)
    }
}

fn run(endpoint: DeviceEndpoint, pool: SharedPool) {
    info!("Accelerator online");
    if endpoint.send(DeviceMessage::Initialized).is_err() {
        return;
    }
    let mut state = DeviceState::default();
    while let Some(message) = endpoint.recv() {
        debug!("Accelerator received {message:?}");
        match message {
            HostMessage::Start { seq } => {
                let reply = match state.execute(&pool) {
                    Ok(rows) => {
                        debug!("Accelerator finished {rows} rows for invocation {seq}");
                        DeviceMessage::Done { seq }
                    }
                    Err(code) => {
                        warn!("Accelerator fault {code:?} in invocation {seq}");
                        DeviceMessage::MemoryError { seq, code }
                    }
                };
                if endpoint.send(reply).is_err() {
                    break;
                }
            }
            HostMessage::Shutdown => break,
            other => state.apply(other),
        }
    }
    info!("Accelerator stopped");
}

/// In-process stand-in for the remote accelerator.
///
/// Runs on its own thread, talks to the host only through the notification link
/// and the regions of a [SharedPool], and computes its rows with the integer
/// path. It stops on `Shutdown` or once the host end of the link is dropped.
pub struct SimulatedAccelerator {
    worker: JoinHandle<()>,
}

impl SimulatedAccelerator {
    pub fn spawn(pool: SharedPool) -> Result<(AcceleratorLink, SimulatedAccelerator), SmoothError> {
        let (link, endpoint) = AcceleratorLink::pair(LINK_CAPACITY);
        let worker = std::thread::Builder::new()
            .name("accelerator".to_string())
            .spawn(move || run(endpoint, pool))
            .map_err(|_| SmoothError::Disconnected)?;
        Ok((link, SimulatedAccelerator { worker }))
    }

    /// Waits for the device thread to exit.
    pub fn join(self) -> Result<(), SmoothError> {
        self.worker.join().map_err(|_| SmoothError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter1d::smooth_rows_fixed;
    use crate::partition::RowRange;
    use crate::BOOST;

    fn announce(link: &AcceleratorLink, handle: u32, rows: usize, cols: usize, fraction: u32) {
        link.send(HostMessage::BufferHandle(handle)).unwrap();
        link.send(HostMessage::dimensions(rows, cols).unwrap()).unwrap();
        link.send(HostMessage::LoadFraction(fraction)).unwrap();
        link.send(HostMessage::Sigma(2.5)).unwrap();
    }

    #[test]
    fn test_accelerator_computes_its_rows() {
        let pool = SharedPool::new();
        let (link, accelerator) = SimulatedAccelerator::spawn(pool.clone()).unwrap();
        assert_eq!(link.recv(None), Ok(DeviceMessage::Initialized));

        let (rows, cols) = (20usize, 9usize);
        let pixels: Vec<u8> = (0..rows * cols).map(|i| (i * 7 % 251) as u8).collect();
        let mut buffer = pool.allocate(rows * cols * 2).unwrap();
        buffer.as_mut_slice()[..rows * cols].copy_from_slice(&pixels);
        buffer.sync_to_device().unwrap();

        announce(&link, buffer.handle(), rows, cols, 50);
        link.send(HostMessage::Start { seq: 5 }).unwrap();
        assert_eq!(link.recv(None), Ok(DeviceMessage::Done { seq: 5 }));
        buffer.sync_from_device().unwrap();

        let image = Image::new(pixels, rows as u32, cols as u32);
        let kernel = FixedKernel::from_kernel(&Kernel::new(2.5).unwrap()).unwrap();
        let expected = smooth_rows_fixed(&image, &kernel, BOOST, RowRange::new(0, 10)).unwrap();
        let received: Vec<i16> = buffer.as_slice()[..10 * cols * 2]
            .chunks_exact(2)
            .map(|x| i16::from_le_bytes([x[0], x[1]]))
            .collect();
        assert_eq!(received, expected.data);

        link.send(HostMessage::Shutdown).unwrap();
        accelerator.join().unwrap();
    }

    #[test]
    fn test_accelerator_reports_faults() {
        let pool = SharedPool::new();
        let (link, accelerator) = SimulatedAccelerator::spawn(pool.clone()).unwrap();
        assert_eq!(link.recv(None), Ok(DeviceMessage::Initialized));

        link.send(HostMessage::Start { seq: 1 }).unwrap();
        assert_eq!(
            link.recv(None),
            Ok(DeviceMessage::MemoryError {
                seq: 1,
                code: FaultCode::MissingConfiguration
            })
        );

        announce(&link, 999, 4, 4, 100);
        link.send(HostMessage::Start { seq: 2 }).unwrap();
        assert_eq!(
            link.recv(None),
            Ok(DeviceMessage::MemoryError {
                seq: 2,
                code: FaultCode::UnknownBuffer
            })
        );

        let small = pool.allocate(16).unwrap();
        announce(&link, small.handle(), 4, 4, 100);
        link.send(HostMessage::Start { seq: 3 }).unwrap();
        assert_eq!(
            link.recv(None),
            Ok(DeviceMessage::MemoryError {
                seq: 3,
                code: FaultCode::RegionTooSmall
            })
        );

        drop(link);
        accelerator.join().unwrap();
    }
}
