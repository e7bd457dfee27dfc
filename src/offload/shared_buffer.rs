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
use crate::util::{try_vec, MismatchedSize, TransferFault};
use crate::SmoothError;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{fence, Ordering};
use std::sync::{Arc, Mutex};

type Region = Arc<Mutex<Vec<u8>>>;

#[derive(Default)]
struct PoolInner {
    next_handle: u32,
    regions: HashMap<u32, Region>,
}

/// Accelerator visible memory, regions are addressed by opaque handles.
///
/// Host and device never share a Rust allocation: the host fills its own copy and
/// publishes it with an explicit flush, the device copies it out after an explicit
/// invalidate. Cloning the pool hands out another view of the same regions.
#[derive(Clone, Default)]
pub struct SharedPool {
    inner: Arc<Mutex<PoolInner>>,
}

impl SharedPool {
    pub fn new() -> SharedPool {
        SharedPool::default()
    }

    /// Reserves a zeroed region of `len` bytes and returns its host side.
    pub fn allocate(&self, len: usize) -> Result<SharedBuffer, SmoothError> {
        let device = try_vec(len, 0u8)?;
        let host = try_vec(len, 0u8)?;
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| SmoothError::TransferError(TransferFault::Poisoned))?;
        inner.next_handle = inner.next_handle.wrapping_add(1).max(1);
        let handle = inner.next_handle;
        inner.regions.insert(handle, Arc::new(Mutex::new(device)));
        debug!("Allocated shared region {handle}, {len} bytes");
        Ok(SharedBuffer {
            handle,
            host,
            pool: self.clone(),
        })
    }

    /// Number of regions still registered.
    pub fn live_regions(&self) -> usize {
        self.inner.lock().map(|x| x.regions.len()).unwrap_or(0)
    }

    fn region(&self, handle: u32) -> Result<Region, TransferFault> {
        let inner = self.inner.lock().map_err(|_| TransferFault::Poisoned)?;
        inner
            .regions
            .get(&handle)
            .cloned()
            .ok_or(TransferFault::UnknownHandle(handle))
    }

    fn release(&self, handle: u32) {
        if let Ok(mut inner) = self.inner.lock() {
            if inner.regions.remove(&handle).is_some() {
                debug!("Released shared region {handle}");
            }
        }
    }

    /// Device side invalidate: copies the first `len` bytes of the region out.
    pub(crate) fn device_read(&self, handle: u32, len: usize) -> Result<Vec<u8>, TransferFault> {
        let region = self.region(handle)?;
        let region = region.lock().map_err(|_| TransferFault::Poisoned)?;
        fence(Ordering::Acquire);
        if region.len() < len {
            return Err(TransferFault::RegionTooSmall(MismatchedSize {
                expected: len,
                received: region.len(),
            }));
        }
        let mut copy = Vec::new();
        copy.try_reserve_exact(len)
            .map_err(|_| TransferFault::RegionTooSmall(MismatchedSize {
                expected: len,
                received: 0,
            }))?;
        copy.extend_from_slice(&region[..len]);
        debug!("Device invalidated region {handle}, {len} bytes");
        Ok(copy)
    }

    /// Device side write back of `bytes` at the start of the region.
    pub(crate) fn device_write(&self, handle: u32, bytes: &[u8]) -> Result<(), TransferFault> {
        let region = self.region(handle)?;
        let mut region = region.lock().map_err(|_| TransferFault::Poisoned)?;
        if region.len() < bytes.len() {
            return Err(TransferFault::RegionTooSmall(MismatchedSize {
                expected: bytes.len(),
                received: region.len(),
            }));
        }
        region[..bytes.len()].copy_from_slice(bytes);
        fence(Ordering::Release);
        debug!("Device wrote back region {handle}, {} bytes", bytes.len());
        Ok(())
    }

    /// Size of a region in bytes.
    pub(crate) fn region_len(&self, handle: u32) -> Result<usize, TransferFault> {
        let region = self.region(handle)?;
        let region = region.lock().map_err(|_| TransferFault::Poisoned)?;
        Ok(region.len())
    }
}

/// Host side of a shared region, the region is released when this is dropped.
pub struct SharedBuffer {
    handle: u32,
    host: Vec<u8>,
    pool: SharedPool,
}

impl SharedBuffer {
    #[inline]
    pub fn handle(&self) -> u32 {
        self.handle
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.host.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.host.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.host
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.host
    }

    /// Flush: publishes the host copy to the device.
    pub fn sync_to_device(&self) -> Result<(), SmoothError> {
        let region = self.pool.region(self.handle)?;
        let mut region = region
            .lock()
            .map_err(|_| SmoothError::TransferError(TransferFault::Poisoned))?;
        if region.len() != self.host.len() {
            return Err(SmoothError::TransferError(TransferFault::RegionTooSmall(
                MismatchedSize {
                    expected: self.host.len(),
                    received: region.len(),
                },
            )));
        }
        region.copy_from_slice(&self.host);
        fence(Ordering::Release);
        debug!("Flushed region {}, {} bytes", self.handle, self.host.len());
        Ok(())
    }

    /// Invalidate: refreshes the host copy from the device.
    pub fn sync_from_device(&mut self) -> Result<(), SmoothError> {
        let region = self.pool.region(self.handle)?;
        let region = region
            .lock()
            .map_err(|_| SmoothError::TransferError(TransferFault::Poisoned))?;
        fence(Ordering::Acquire);
        if region.len() != self.host.len() {
            return Err(SmoothError::TransferError(TransferFault::RegionTooSmall(
                MismatchedSize {
                    expected: self.host.len(),
                    received: region.len(),
                },
            )));
        }
        self.host.copy_from_slice(&region);
        debug!("Invalidated region {}, {} bytes", self.handle, self.host.len());
        Ok(())
    }
}

impl Drop for SharedBuffer {
    fn drop(&mut self) {
        self.pool.release(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_and_invalidate() {
        let pool = SharedPool::new();
        let mut buffer = pool.allocate(8).unwrap();
        buffer.as_mut_slice().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(pool.device_read(buffer.handle(), 4).unwrap(), vec![0, 0, 0, 0]);

        buffer.sync_to_device().unwrap();
        assert_eq!(pool.device_read(buffer.handle(), 4).unwrap(), vec![1, 2, 3, 4]);

        pool.device_write(buffer.handle(), &[9, 9]).unwrap();
        assert_eq!(&buffer.as_slice()[..2], &[1, 2]);
        buffer.sync_from_device().unwrap();
        assert_eq!(buffer.as_slice(), &[9, 9, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_region_released_on_drop() {
        let pool = SharedPool::new();
        let buffer = pool.allocate(16).unwrap();
        let handle = buffer.handle();
        assert_eq!(pool.live_regions(), 1);
        assert_eq!(pool.region_len(handle), Ok(16));
        drop(buffer);
        assert_eq!(pool.live_regions(), 0);
        assert_eq!(
            pool.device_read(handle, 1),
            Err(TransferFault::UnknownHandle(handle))
        );
    }

    #[test]
    fn test_device_bounds() {
        let pool = SharedPool::new();
        let buffer = pool.allocate(4).unwrap();
        assert!(matches!(
            pool.device_read(buffer.handle(), 5),
            Err(TransferFault::RegionTooSmall(_))
        ));
        assert!(matches!(
            pool.device_write(buffer.handle(), &[0; 6]),
            Err(TransferFault::RegionTooSmall(_))
        ));
    }
}
