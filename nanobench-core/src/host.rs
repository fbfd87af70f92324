// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Host runtime primitives.
//!
//! The measurement engine never touches the clock, the allocator or the
//! process memory directly. Everything goes through [`HostRuntime`], so the
//! real implementation can be swapped for [`FakeHost`] in tests.

use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use sysinfo::{Pid, System};

use crate::error::HostError;
use crate::types::Timestamp;

/// Clock, reclaim and memory primitives supplied by the surrounding platform.
pub trait HostRuntime: Debug + Send + Sync {
    /// Current monotonic timestamp in nanoseconds.
    fn now(&self) -> Timestamp;

    /// Best-effort pass returning unused heap memory to the system.
    fn force_reclaim(&self);

    /// Current memory occupancy of the process in bytes.
    fn used_memory(&self) -> u64;

    /// Block for `delay` so asynchronous cleanup can finish.
    fn settle(&self, delay: Duration) -> Result<(), HostError>;
}

/// Host primitives backed by the operating system.
#[derive(Debug)]
pub struct SystemHost {
    origin: Instant,
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl SystemHost {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(reason) => {
                tracing::warn!(reason, "Process id unavailable, memory readings will be zero");
                None
            }
        };

        Self {
            origin: Instant::now(),
            pid,
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRuntime for SystemHost {
    fn now(&self) -> Timestamp {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn force_reclaim(&self) {
        // SAFETY: malloc_trim only releases free pages held by the allocator.
        #[cfg(all(target_os = "linux", target_env = "gnu"))]
        let _ = unsafe { libc::malloc_trim(0) };
    }

    fn used_memory(&self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };

        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        if !system.refresh_process(pid) {
            return 0;
        }
        system.process(pid).map(|process| process.memory()).unwrap_or(0)
    }

    fn settle(&self, delay: Duration) -> Result<(), HostError> {
        std::thread::sleep(delay);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FakeHostState {
    now: Timestamp,
    tick: u64,
    used_memory: u64,
    reclaim_passes: u64,
    settle_calls: Vec<Duration>,
    fail_next_settle: bool,
}

/// Deterministic host for tests.
///
/// Clones share the same state, so a test can keep one handle while the
/// harness owns another and still drive the clock or the memory reading.
/// Every call to [`HostRuntime::now`] returns the current time and then
/// advances it by the configured tick.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<FakeHostState>>,
}

impl FakeHost {
    /// Creates a fake host with a frozen clock and zero memory usage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fake host whose clock advances by `tick` on every read.
    pub fn with_tick(tick: Duration) -> Self {
        let host = Self::new();
        host.set_tick(tick);
        host
    }

    pub fn set_tick(&self, tick: Duration) {
        self.lock().tick = duration_nanos(tick);
    }

    /// Moves the clock forward, as if the task had spent `elapsed` working.
    pub fn advance(&self, elapsed: Duration) {
        let mut state = self.lock();
        state.now = state.now.saturating_add(duration_nanos(elapsed));
    }

    pub fn set_used_memory(&self, bytes: u64) {
        self.lock().used_memory = bytes;
    }

    /// Number of reclaim passes requested so far.
    pub fn reclaim_passes(&self) -> u64 {
        self.lock().reclaim_passes
    }

    /// Delays passed to [`HostRuntime::settle`], in call order.
    pub fn settle_calls(&self) -> Vec<Duration> {
        self.lock().settle_calls.clone()
    }

    /// Makes the next settle call report an interruption.
    pub fn fail_next_settle(&self) {
        self.lock().fail_next_settle = true;
    }

    fn lock(&self) -> MutexGuard<'_, FakeHostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostRuntime for FakeHost {
    fn now(&self) -> Timestamp {
        let mut state = self.lock();
        let now = state.now;
        state.now = state.now.saturating_add(state.tick);
        now
    }

    fn force_reclaim(&self) {
        self.lock().reclaim_passes += 1;
    }

    fn used_memory(&self) -> u64 {
        self.lock().used_memory
    }

    fn settle(&self, delay: Duration) -> Result<(), HostError> {
        let mut state = self.lock();
        state.settle_calls.push(delay);
        if std::mem::take(&mut state.fail_next_settle) {
            return Err(HostError::SettleInterrupted {
                reason: "interrupted by fake host".to_string(),
            });
        }
        Ok(())
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
