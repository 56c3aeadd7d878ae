// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Child process supervision
//!
//! Launches the benchmarked command with inherited standard streams and
//! coordinates the sampler around its lifetime: the sampling schedule is
//! armed strictly before the child starts, and is stopped only after the
//! child has fully terminated, so the sample window matches the child's
//! lifetime exactly.

use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{BenchError, Result};
use crate::provider::{GpuProvider, GpuSample};
use crate::sampler::GpuSampler;

/// Poll granularity for child termination and cancellation checks
const WAIT_POLL: Duration = Duration::from_millis(25);

/// Result of one supervised benchmark run
#[derive(Debug)]
pub struct RunOutcome {
    /// Child exit code; `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
    /// Wall-clock duration of the run in seconds
    pub elapsed_seconds: f64,
    /// Raw samples captured between child start and termination
    pub samples: Vec<GpuSample>,
    /// Identifier of the provider that produced the samples
    pub provider: &'static str,
}

/// Run `cmd` to completion while sampling GPU utilization.
///
/// A child that exits non-zero is a normal completion; its status is
/// reported in the outcome, not as an error. A command that cannot be
/// launched fails with [`BenchError::Launch`] after the sampler has been
/// released. Setting `cancel` (typically from a Ctrl-C handler) forwards
/// termination to the child, stops the sampler, and fails with
/// [`BenchError::Interrupted`] — no orphaned child, no orphaned sampler
/// thread.
pub fn run(
    cmd: &[String],
    interval_seconds: f64,
    provider: Box<dyn GpuProvider + Send>,
    cancel: &AtomicBool,
) -> Result<RunOutcome> {
    let (program, args) = cmd.split_first().ok_or_else(|| BenchError::Launch {
        command: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
    })?;

    let mut sampler = GpuSampler::new(provider);
    let provider_name = sampler.provider_name();

    let started = Instant::now();

    // An invalid interval must abort before any child process exists.
    sampler.start(interval_seconds)?;

    // stdio is inherited so interactive or streaming child output passes
    // through unbuffered.
    let mut child = match Command::new(program).args(args).spawn() {
        Ok(child) => child,
        Err(e) => {
            sampler.stop();
            return Err(BenchError::Launch {
                command: program.clone(),
                source: e,
            });
        }
    };

    let status = loop {
        if cancel.load(Ordering::SeqCst) {
            log::warn!("interrupt received; terminating '{}'", program);
            let _ = child.kill();
            let _ = child.wait();
            sampler.stop();
            return Err(BenchError::Interrupted);
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => thread::sleep(WAIT_POLL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                sampler.stop();
                return Err(BenchError::Io(e));
            }
        }
    };

    sampler.stop();
    let elapsed_seconds = started.elapsed().as_secs_f64();

    if !status.success() {
        log::warn!("'{}' exited with {}", program, status);
    }

    Ok(RunOutcome {
        exit_code: status.code(),
        elapsed_seconds,
        samples: sampler.take_samples(),
        provider: provider_name,
    })
}
