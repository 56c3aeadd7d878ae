// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Background GPU utilization sampler
//!
//! Pulls instantaneous readings from an injected provider at a fixed
//! interval on a dedicated thread until stopped. The stop signal is an
//! mpsc channel observed with `recv_timeout`, so a pending sleep is
//! preempted immediately instead of running out the full interval.
//!
//! State machine: `Idle -> Running -> Stopped`. An unavailable provider
//! short-circuits `Idle -> Stopped` with zero samples; provider absence
//! is not an error at this level.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{BenchError, Result};
use crate::provider::{GpuProvider, GpuSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Stopped,
}

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<Vec<GpuSample>>,
}

/// Samples GPU load and VRAM usage in the background at a fixed interval.
///
/// The provider is exclusively owned: it moves into the worker thread at
/// `start`, so no other component can touch the hardware handle while a
/// run is in flight.
pub struct GpuSampler {
    provider: Option<Box<dyn GpuProvider + Send>>,
    provider_name: &'static str,
    state: State,
    worker: Option<Worker>,
    samples: Vec<GpuSample>,
}

impl GpuSampler {
    /// Create a sampler owning the given provider.
    pub fn new(provider: Box<dyn GpuProvider + Send>) -> Self {
        let provider_name = provider.name();
        Self {
            provider: Some(provider),
            provider_name,
            state: State::Idle,
            worker: None,
            samples: Vec::new(),
        }
    }

    /// Backend identifier of the injected provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }

    /// Whether the background schedule is currently running.
    pub fn is_sampling(&self) -> bool {
        self.state == State::Running
    }

    /// Start the background sampling schedule.
    ///
    /// A non-positive (or non-finite) interval is rejected before anything
    /// else happens. An unavailable provider is not an error: the sampler
    /// transitions straight to the stopped state with zero samples and the
    /// run proceeds without GPU data. Starting twice fails with
    /// [`BenchError::AlreadyStarted`]; one run uses one sampler instance.
    pub fn start(&mut self, interval_seconds: f64) -> Result<()> {
        if !interval_seconds.is_finite() || interval_seconds <= 0.0 {
            return Err(BenchError::InvalidInterval(interval_seconds));
        }
        if self.state != State::Idle {
            return Err(BenchError::AlreadyStarted);
        }

        let provider = self.provider.take().ok_or(BenchError::AlreadyStarted)?;
        if !provider.is_available() {
            log::warn!(
                "GPU provider '{}' unavailable; sampling disabled",
                provider.name()
            );
            self.state = State::Stopped;
            return Ok(());
        }

        let interval = Duration::from_secs_f64(interval_seconds);
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || sample_loop(provider, interval, stop_rx));

        self.worker = Some(Worker { stop_tx, handle });
        self.state = State::Running;
        Ok(())
    }

    /// Stop the background schedule.
    ///
    /// Idempotent in every state: stopping an idle or already-stopped
    /// sampler is a no-op. Blocks until the in-flight sample attempt (if
    /// any) completes, so no sample lands after this returns.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            match worker.handle.join() {
                Ok(samples) => self.samples = samples,
                Err(_) => log::error!("sampler thread panicked; samples lost"),
            }
        }
        self.state = State::Stopped;
    }

    /// Hand off the accumulated samples.
    ///
    /// Drains exactly once; a second call returns an empty vector.
    pub fn take_samples(&mut self) -> Vec<GpuSample> {
        std::mem::take(&mut self.samples)
    }
}

impl Drop for GpuSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn sample_loop(
    provider: Box<dyn GpuProvider + Send>,
    interval: Duration,
    stop_rx: mpsc::Receiver<()>,
) -> Vec<GpuSample> {
    let mut samples = Vec::new();
    loop {
        match provider.sample() {
            Ok(sample) => samples.push(sample),
            // one flaky reading must not abort the whole run
            Err(e) => log::debug!("dropping failed GPU sample: {}", e),
        }
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    samples
}
