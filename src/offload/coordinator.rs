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
use crate::filter1d::smooth_rows_simd;
use crate::offload::accelerator::SimulatedAccelerator;
use crate::offload::config::{HaloCheck, OffloadParams};
use crate::offload::link::AcceleratorLink;
use crate::offload::message::{DeviceMessage, HostMessage};
use crate::offload::shared_buffer::{SharedBuffer, SharedPool};
use crate::partition::{Partition, RowRange};
use crate::safe_math::SafeMul;
use crate::stitch::{stitch, verify_halo, HaloComparison, PartialResult, StitchReport};
use crate::util::try_vec;
use crate::{Image, Kernel, SmoothError, SmoothedImage};
use log::{debug, warn};
use std::time::{Duration, Instant};

/// Largest difference tolerated between the integer and float paths.
const HALO_TOLERANCE: u16 = 1;

/// Where an invocation currently is.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
pub enum CoordinatorState {
    #[default]
    Idle,
    /// Image bytes are flushed to the shared region.
    BufferPushed,
    /// Configuration and start were sent.
    AcceleratorStarted,
    /// Local path is smoothing its rows on the calling thread.
    LocalRunning,
    /// Completion for the current invocation arrived.
    AcceleratorDone,
    Merged,
}

/// What one invocation did besides producing the image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OffloadReport {
    pub partition: Partition,
    pub stitch: StitchReport,
    /// Present when [HaloCheck::Verify] was requested and the local path ran.
    pub halo: Option<HaloComparison>,
    /// Sequence number carried by `Start` and the matching completion.
    pub sequence: u32,
}

/// Counters of one attached session, carried from invocation to invocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SessionContext {
    /// Sequence number the next `Start` will carry.
    pub next_sequence: u32,
    pub completed: u64,
    pub failed: u64,
}

impl Default for SessionContext {
    fn default() -> Self {
        SessionContext {
            next_sequence: 1,
            completed: 0,
            failed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffloadOutcome {
    pub image: SmoothedImage,
    pub report: OffloadReport,
}

/// Splits smoothing between an accelerator and the calling thread.
///
/// Each invocation flushes the image into a shared region, announces the
/// configuration, starts the accelerator on the top rows and smooths the
/// remaining rows plus a halo locally while the accelerator works. Once the
/// matching completion arrives the region is invalidated and both halves are
/// stitched together.
///
/// Completions carrying another sequence number belong to an abandoned
/// invocation and are skipped. After a fault or a timeout the coordinator goes
/// back to [CoordinatorState::Idle] and can be used again.
pub struct OffloadCoordinator {
    link: AcceleratorLink,
    pool: SharedPool,
    accelerator: Option<SimulatedAccelerator>,
    state: CoordinatorState,
    buffer: Option<SharedBuffer>,
    session: SessionContext,
    stopped: bool,
}

impl OffloadCoordinator {
    /// Takes over a link and waits forever for the accelerator to come up.
    pub fn attach(link: AcceleratorLink, pool: SharedPool) -> Result<OffloadCoordinator, SmoothError> {
        OffloadCoordinator::attach_with_timeout(link, pool, None)
    }

    /// Takes over a link and waits at most `timeout` for the `Initialized` sentinel.
    pub fn attach_with_timeout(
        link: AcceleratorLink,
        pool: SharedPool,
        timeout: Option<Duration>,
    ) -> Result<OffloadCoordinator, SmoothError> {
        loop {
            match link.recv(timeout)? {
                DeviceMessage::Initialized => break,
                other => warn!("Ignoring {other:?} before accelerator initialization"),
            }
        }
        debug!("Accelerator initialized");
        Ok(OffloadCoordinator {
            link,
            pool,
            accelerator: None,
            state: CoordinatorState::Idle,
            buffer: None,
            session: SessionContext::default(),
            stopped: false,
        })
    }

    /// Spawns a [SimulatedAccelerator] on its own shared pool and attaches to it.
    pub fn with_simulated_accelerator() -> Result<OffloadCoordinator, SmoothError> {
        let pool = SharedPool::new();
        let (link, accelerator) = SimulatedAccelerator::spawn(pool.clone())?;
        let mut coordinator = OffloadCoordinator::attach(link, pool)?;
        coordinator.accelerator = Some(accelerator);
        Ok(coordinator)
    }

    #[inline]
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    #[inline]
    pub fn session(&self) -> SessionContext {
        self.session
    }

    /// Runs one split smoothing invocation.
    ///
    /// # Errors
    ///
    /// Argument errors are returned before anything is sent. [SmoothError::AcceleratorFault]
    /// and [SmoothError::AcceleratorTimeout] leave the coordinator usable, see
    /// [SmoothError::is_recoverable].
    pub fn smooth(
        &mut self,
        image: &Image,
        params: &OffloadParams,
    ) -> Result<OffloadOutcome, SmoothError> {
        if self.stopped {
            return Err(SmoothError::Disconnected);
        }
        params.validate()?;
        image.check_layout()?;

        let result = self.execute(image, params);
        match &result {
            Ok(_) => self.session.completed += 1,
            Err(err) => {
                warn!("Offloaded smoothing failed in {:?}: {err}", self.state);
                self.session.failed += 1;
                self.transition(CoordinatorState::Idle);
            }
        }
        result
    }

    fn transition(&mut self, next: CoordinatorState) {
        debug!("Coordinator {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn take_buffer(&mut self, len: usize) -> Result<SharedBuffer, SmoothError> {
        match self.buffer.take() {
            Some(buffer) if buffer.len() == len => Ok(buffer),
            _ => self.pool.allocate(len),
        }
    }

    fn execute(&mut self, image: &Image, params: &OffloadParams) -> Result<OffloadOutcome, SmoothError> {
        let rows = image.rows as usize;
        let cols = image.cols as usize;
        let kernel = Kernel::new(params.sigma)?;
        let partition = Partition::new(rows, params.fraction, kernel.center(), params.full_offload)?;
        let dimensions = HostMessage::dimensions(rows, cols)?;

        let stale = self.link.drain();
        if stale > 0 {
            debug!("Dropped {stale} stale accelerator messages");
        }

        let samples = rows.safe_mul(cols)?;
        let mut buffer = self.take_buffer(samples.safe_mul(size_of::<i16>())?)?;
        buffer.as_mut_slice()[..samples].copy_from_slice(&image.data[..samples]);
        buffer.sync_to_device()?;
        self.transition(CoordinatorState::BufferPushed);

        let timeout = params.completion_timeout;
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let sequence = self.session.next_sequence;
        self.session.next_sequence = sequence.wrapping_add(1);
        for message in [
            HostMessage::BufferHandle(buffer.handle()),
            dimensions,
            HostMessage::LoadFraction(params.fraction),
            HostMessage::Sigma(params.sigma),
            HostMessage::Boost(params.boost),
            HostMessage::Start { seq: sequence },
        ] {
            self.link
                .send_timeout(message, remaining(deadline))
                .map_err(|err| expired(err, timeout))?;
        }
        self.transition(CoordinatorState::AcceleratorStarted);

        self.transition(CoordinatorState::LocalRunning);
        let local = match partition.local {
            Some(range) => Some(smooth_rows_simd(image, &kernel, params.boost, range)?),
            None => None,
        };

        self.wait_for_completion(sequence, deadline, timeout)?;
        self.transition(CoordinatorState::AcceleratorDone);

        buffer.sync_from_device()?;
        let accelerator = read_accelerator_rows(&buffer, partition.accelerator, image.cols)?;

        let halo = match (params.halo_check, &local) {
            (HaloCheck::Verify, Some(local)) => {
                let comparison = verify_halo(&accelerator, local, HALO_TOLERANCE);
                if !comparison.is_consistent() {
                    warn!(
                        "{} of {} halo rows differ by up to {}",
                        comparison.mismatched_rows, comparison.rows_compared, comparison.max_diff
                    );
                }
                Some(comparison)
            }
            _ => None,
        };

        let (smoothed, stitch_report) = stitch(&partition, image.cols, &accelerator, local.as_ref())?;
        self.transition(CoordinatorState::Merged);

        self.buffer = Some(buffer);
        self.transition(CoordinatorState::Idle);

        Ok(OffloadOutcome {
            image: smoothed,
            report: OffloadReport {
                partition,
                stitch: stitch_report,
                halo,
                sequence,
            },
        })
    }

    /// Blocks until the completion of `sequence` or until `deadline` passes.
    fn wait_for_completion(
        &self,
        sequence: u32,
        deadline: Option<Instant>,
        timeout: Option<Duration>,
    ) -> Result<(), SmoothError> {
        loop {
            let message = self
                .link
                .recv(remaining(deadline))
                .map_err(|err| expired(err, timeout))?;
            debug!("Coordinator received {message:?}");
            match message {
                DeviceMessage::Done { seq } if seq == sequence => return Ok(()),
                DeviceMessage::MemoryError { seq, code } if seq == sequence => {
                    warn!("Accelerator reported {code:?} for invocation {seq}");
                    return Err(SmoothError::AcceleratorFault(code));
                }
                other => warn!("Ignoring {other:?} while waiting for invocation {sequence}"),
            }
        }
    }

    fn stop(&mut self) -> Result<(), SmoothError> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        self.buffer = None;
        match self.link.try_send(HostMessage::Shutdown) {
            Err(SmoothError::AcceleratorTimeout(_)) => {
                // The device is not draining its queue, it exits once the link is dropped.
                warn!("Accelerator queue is full, detaching without shutdown");
                self.accelerator = None;
                Ok(())
            }
            sent => {
                if let Some(accelerator) = self.accelerator.take() {
                    accelerator.join()?;
                }
                sent
            }
        }
    }

    /// Stops the accelerator and waits for a simulated one to exit.
    pub fn shutdown(mut self) -> Result<(), SmoothError> {
        self.stop()
    }
}

impl Drop for OffloadCoordinator {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}

/// Reports an elapsed deadline with the configured timeout.
fn expired(err: SmoothError, timeout: Option<Duration>) -> SmoothError {
    match (err, timeout) {
        (SmoothError::AcceleratorTimeout(_), Some(timeout)) => {
            SmoothError::AcceleratorTimeout(timeout)
        }
        (err, _) => err,
    }
}

fn read_accelerator_rows(
    buffer: &SharedBuffer,
    range: RowRange,
    cols: u32,
) -> Result<PartialResult, SmoothError> {
    let samples = range.len().safe_mul(cols as usize)?;
    let bytes = buffer
        .as_slice()
        .get(..samples.safe_mul(size_of::<i16>())?)
        .ok_or(SmoothError::MissingRows {
            start: range.start,
            end: range.end,
        })?;
    let mut data = try_vec(samples, 0i16)?;
    for (dst, src) in data.iter_mut().zip(bytes.chunks_exact(2)) {
        *dst = i16::from_le_bytes([src[0], src[1]]);
    }
    Ok(PartialResult::new(range, cols, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter1d::smooth_rows_reference;
    use crate::offload::link::DeviceEndpoint;
    use crate::partition::FullOffloadPolicy;
    use crate::util::FaultCode;
    use crate::{gaussian_smooth, SmoothingPath, ThreadingPolicy, BOOST};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::thread::JoinHandle;

    fn random_image(rows: u32, cols: u32, seed: u64) -> Image<'static> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..rows * cols).map(|_| rng.gen::<u8>()).collect();
        Image::new(data, rows, cols)
    }

    /// Device that announces itself and hands every `Start` to `on_start`.
    fn scripted_device<F>(on_start: F) -> (OffloadCoordinator, JoinHandle<()>)
    where
        F: FnMut(u32, &DeviceEndpoint) -> bool + Send + 'static,
    {
        let (link, endpoint) = AcceleratorLink::pair(16);
        let mut on_start = on_start;
        let worker = std::thread::spawn(move || {
            endpoint.send(DeviceMessage::Initialized).unwrap();
            while let Some(message) = endpoint.recv() {
                match message {
                    HostMessage::Start { seq } => {
                        if !on_start(seq, &endpoint) {
                            break;
                        }
                    }
                    HostMessage::Shutdown => break,
                    _ => {}
                }
            }
        });
        let coordinator = OffloadCoordinator::attach(link, SharedPool::new()).unwrap();
        (coordinator, worker)
    }

    #[test]
    fn test_half_split_matches_reference() {
        let image = random_image(128, 128, 77);
        let mut coordinator = OffloadCoordinator::with_simulated_accelerator().unwrap();
        let outcome = coordinator
            .smooth(&image, &OffloadParams::new(2.5, 50))
            .unwrap();
        assert_eq!(coordinator.state(), CoordinatorState::Idle);

        let report = outcome.report;
        assert_eq!(report.partition.accelerator_rows, 64);
        assert_eq!(report.partition.local, Some(RowRange::with_halo(57, 128, 7)));
        assert_eq!(report.stitch.accelerator_rows, 64);
        assert_eq!(report.stitch.local_rows, 64);
        assert_eq!(report.stitch.discarded_halo_rows, 7);

        let reference =
            smooth_rows_reference::<f64>(&image, 2.5, BOOST, RowRange::new(0, 128)).unwrap();
        for (i, (&a, &b)) in outcome.image.data.iter().zip(reference.data.iter()).enumerate() {
            let diff = (a as i32 - b as i32).abs();
            assert!(diff <= 1, "Index {i} differs by {diff}, {a} vs {b}");
        }
        coordinator.shutdown().unwrap();
    }

    #[test]
    fn test_boundary_fractions() {
        let image = random_image(41, 37, 3);
        let mut coordinator = OffloadCoordinator::with_simulated_accelerator().unwrap();

        let local_only = coordinator
            .smooth(&image, &OffloadParams::new(1.7, 0))
            .unwrap();
        let simd =
            gaussian_smooth(&image, 1.7, BOOST, SmoothingPath::Simd, ThreadingPolicy::Single)
                .unwrap();
        assert_eq!(local_only.image, simd);
        assert_eq!(local_only.report.stitch.accelerator_rows, 0);

        let fixed = gaussian_smooth(
            &image,
            1.7,
            BOOST,
            SmoothingPath::FixedPoint,
            ThreadingPolicy::Single,
        )
        .unwrap();
        for policy in [FullOffloadPolicy::ComputeHalo, FullOffloadPolicy::SkipLocal] {
            let offloaded = coordinator
                .smooth(
                    &image,
                    &OffloadParams::new(1.7, 100).with_full_offload(policy),
                )
                .unwrap();
            assert_eq!(offloaded.image, fixed);
            assert_eq!(offloaded.report.stitch.local_rows, 0);
        }
    }

    #[test]
    fn test_repeated_invocations_are_identical() {
        let image = random_image(64, 50, 11);
        let params = OffloadParams::new(2.5, 30);
        let mut coordinator = OffloadCoordinator::with_simulated_accelerator().unwrap();
        let first = coordinator.smooth(&image, &params).unwrap();
        let second = coordinator.smooth(&image, &params).unwrap();
        assert_eq!(first.image, second.image);
        assert_eq!(second.report.sequence, first.report.sequence + 1);
    }

    #[test]
    fn test_halo_verification() {
        let image = Image::new(vec![100u8; 40 * 16], 40, 16);
        let mut coordinator = OffloadCoordinator::with_simulated_accelerator().unwrap();
        let params = OffloadParams::new(2.5, 50).with_halo_check(HaloCheck::Verify);
        let outcome = coordinator.smooth(&image, &params).unwrap();
        let halo = outcome.report.halo.unwrap();
        assert_eq!(halo.rows_compared, 7);
        assert_eq!(halo.max_diff, 0);
        assert!(halo.is_consistent());
        assert!(outcome.image.data.iter().all(|&x| x == 9000));

        let unchecked = coordinator
            .smooth(&image, &OffloadParams::new(2.5, 50))
            .unwrap();
        assert_eq!(unchecked.report.halo, None);
    }

    #[test]
    fn test_memory_error_is_recoverable() {
        let mut failed_once = false;
        let (mut coordinator, worker) = scripted_device(move |seq, endpoint| {
            let reply = if failed_once {
                DeviceMessage::Done { seq }
            } else {
                failed_once = true;
                DeviceMessage::MemoryError {
                    seq,
                    code: FaultCode::OutOfMemory,
                }
            };
            endpoint.send(reply).is_ok()
        });
        let image = random_image(12, 12, 8);
        let params = OffloadParams::new(1.0, 0);

        let err = coordinator.smooth(&image, &params).unwrap_err();
        assert_eq!(err, SmoothError::AcceleratorFault(FaultCode::OutOfMemory));
        assert!(err.is_recoverable());
        assert_eq!(coordinator.state(), CoordinatorState::Idle);

        let outcome = coordinator.smooth(&image, &params).unwrap();
        assert_eq!(outcome.image.data.len(), 144);
        assert_eq!(coordinator.session().completed, 1);
        assert_eq!(coordinator.session().failed, 1);
        drop(coordinator);
        worker.join().unwrap();
    }

    #[test]
    fn test_bounded_wait_times_out() {
        let (mut coordinator, worker) = scripted_device(|_, _| true);
        let timeout = Duration::from_millis(20);
        let params = OffloadParams::new(1.0, 0).with_completion_timeout(Some(timeout));
        let image = random_image(8, 8, 1);
        assert_eq!(
            coordinator.smooth(&image, &params),
            Err(SmoothError::AcceleratorTimeout(timeout))
        );
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
        coordinator.shutdown().unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn test_wedged_device_cannot_block_invocations() {
        let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(1);
        let (mut coordinator, worker) = scripted_device(move |_, _| {
            let _ = release_rx.recv();
            false
        });
        let timeout = Duration::from_millis(20);
        let params = OffloadParams::new(1.0, 0).with_completion_timeout(Some(timeout));
        let image = random_image(8, 8, 6);

        let started = Instant::now();
        for i in 0..6 {
            assert_eq!(
                coordinator.smooth(&image, &params),
                Err(SmoothError::AcceleratorTimeout(timeout)),
                "Invocation {i}"
            );
            assert_eq!(coordinator.state(), CoordinatorState::Idle);
        }
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "Invocations took {:?}",
            started.elapsed()
        );
        assert_eq!(coordinator.session().failed, 6);

        coordinator.shutdown().unwrap();
        release_tx.send(()).unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn test_stale_completions_are_skipped() {
        let (mut coordinator, worker) = scripted_device(|seq, endpoint| {
            endpoint
                .send(DeviceMessage::Done {
                    seq: seq.wrapping_add(100),
                })
                .unwrap();
            endpoint
                .send(DeviceMessage::MemoryError {
                    seq: seq.wrapping_sub(1),
                    code: FaultCode::UnknownBuffer,
                })
                .unwrap();
            endpoint.send(DeviceMessage::Done { seq }).is_ok()
        });
        let image = random_image(10, 6, 4);
        let expected = coordinator.session().next_sequence;
        let outcome = coordinator
            .smooth(&image, &OffloadParams::new(1.0, 0))
            .unwrap();
        assert_eq!(outcome.report.sequence, expected);
        drop(coordinator);
        worker.join().unwrap();
    }

    #[test]
    fn test_device_going_away() {
        let (mut coordinator, worker) = scripted_device(|_, _| false);
        let image = random_image(8, 8, 2);
        assert_eq!(
            coordinator.smooth(&image, &OffloadParams::new(1.0, 50)),
            Err(SmoothError::Disconnected)
        );
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
        worker.join().unwrap();
    }

    #[test]
    fn test_rejects_invalid_params_before_sending() {
        let mut coordinator = OffloadCoordinator::with_simulated_accelerator().unwrap();
        let image = random_image(8, 8, 2);
        let session = coordinator.session();
        assert_eq!(
            coordinator.smooth(&image, &OffloadParams::new(1.0, 101)),
            Err(SmoothError::InvalidFraction(101))
        );
        assert_eq!(
            coordinator.smooth(&image, &OffloadParams::new(-2.0, 10)),
            Err(SmoothError::NegativeOrZeroSigma)
        );
        assert_eq!(coordinator.session(), session);
    }
}
