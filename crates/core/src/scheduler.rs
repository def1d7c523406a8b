//! Recompute scheduling for interactive hosts.
//!
//! The engine itself is synchronous. Hosts that recompute layouts while the
//! user edits inputs drive a [`RecomputeScheduler`]: every edit is reported
//! with [`RecomputeScheduler::notify`], the host calls
//! [`RecomputeScheduler::poll`] from its event loop and runs the computation
//! when a [`Ticket`] is handed out, then reports back with
//! [`RecomputeScheduler::complete`].
//!
//! ```text
//! Idle ──notify──▶ Scheduled ──poll (due)──▶ Running ──complete──▶ Idle
//!                      ▲                        │
//!                      └───────notify───────────┘ (cancels the ticket)
//! too many triggers ──▶ Cooldown ──poll (expired)──▶ Scheduled / Idle
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag handed to a running computation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns the underlying flag, for APIs that take a raw `Arc<AtomicBool>`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

/// Kind of input edit reported to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Boundary vertices were added, moved or removed.
    Boundary,
    /// Module dimensions or orientation changed.
    Footprint,
    /// Topology parameters changed.
    Topology,
    /// Unit budget changed.
    Budget,
    /// Installation azimuth changed.
    Azimuth,
    /// Alignment policy changed.
    Alignment,
}

impl ChangeKind {
    /// Discrete, user-intentional edits that always recompute immediately.
    pub fn bypasses_throttle(self) -> bool {
        matches!(self, ChangeKind::Azimuth | ChangeKind::Alignment)
    }
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing to do.
    Idle,
    /// A computation starts once `due` has passed.
    Scheduled {
        /// When the computation may start.
        due: Instant,
    },
    /// A computation is in flight.
    Running {
        /// When it started.
        started: Instant,
        /// Input generation it computes.
        generation: u64,
    },
    /// Automatic recomputation is suspended.
    Cooldown {
        /// When recomputation resumes.
        until: Instant,
    },
}

/// Timing parameters of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Quiet period after an ordinary edit before recomputing.
    pub debounce: Duration,
    /// Window in which consecutive triggers are counted.
    pub chain_window: Duration,
    /// Triggers allowed inside the window before cooling down.
    pub chain_limit: usize,
    /// Length of the cooldown.
    pub cooldown: Duration,
    /// Age after which a running computation is considered stuck.
    pub watchdog: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            chain_window: Duration::from_secs(2),
            chain_limit: 8,
            cooldown: Duration::from_secs(3),
            watchdog: Duration::from_secs(15),
        }
    }
}

impl SchedulerConfig {
    /// Sets the debounce period.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the chain breaker window and limit.
    pub fn with_chain_breaker(mut self, window: Duration, limit: usize) -> Self {
        self.chain_window = window;
        self.chain_limit = limit;
        self
    }

    /// Sets the cooldown length.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the watchdog timeout.
    pub fn with_watchdog(mut self, watchdog: Duration) -> Self {
        self.watchdog = watchdog;
        self
    }
}

/// Permission to run one computation.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    token: CancellationToken,
}

impl Ticket {
    /// Input generation the computation must use.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token the computation should observe.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// `Idle → Scheduled → Running → Cooldown` state machine.
#[derive(Debug)]
pub struct RecomputeScheduler {
    config: SchedulerConfig,
    state: SchedulerState,
    generation: u64,
    triggers: VecDeque<Instant>,
    pending: bool,
    in_flight: Option<CancellationToken>,
}

impl RecomputeScheduler {
    /// Creates an idle scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: SchedulerState::Idle,
            generation: 0,
            triggers: VecDeque::new(),
            pending: false,
            in_flight: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Generation of the latest inputs.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reports an input edit.
    pub fn notify(&mut self, change: ChangeKind, now: Instant) -> SchedulerState {
        self.generation += 1;
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }

        if change.bypasses_throttle() {
            log::debug!("{:?} change schedules immediately", change);
            self.pending = false;
            self.state = SchedulerState::Scheduled { due: now };
            return self.state;
        }

        if let SchedulerState::Cooldown { until } = self.state {
            if now < until {
                self.pending = true;
                return self.state;
            }
        }

        while let Some(&oldest) = self.triggers.front() {
            if now.saturating_duration_since(oldest) > self.config.chain_window {
                self.triggers.pop_front();
            } else {
                break;
            }
        }
        self.triggers.push_back(now);

        if self.triggers.len() > self.config.chain_limit {
            log::warn!(
                "{} recompute triggers within {:?}, pausing for {:?}",
                self.triggers.len(),
                self.config.chain_window,
                self.config.cooldown
            );
            self.triggers.clear();
            self.pending = true;
            self.state = SchedulerState::Cooldown {
                until: now + self.config.cooldown,
            };
        } else {
            self.state = SchedulerState::Scheduled {
                due: now + self.config.debounce,
            };
        }
        self.state
    }

    /// Advances timers. Returns a ticket when a computation should start.
    pub fn poll(&mut self, now: Instant) -> Option<Ticket> {
        match self.state {
            SchedulerState::Scheduled { due } if now >= due => {
                let token = CancellationToken::new();
                self.in_flight = Some(token.clone());
                self.state = SchedulerState::Running {
                    started: now,
                    generation: self.generation,
                };
                Some(Ticket {
                    generation: self.generation,
                    token,
                })
            }
            SchedulerState::Running { started, generation }
                if now.saturating_duration_since(started) >= self.config.watchdog =>
            {
                log::warn!(
                    "computation for generation {} exceeded {:?}, clearing",
                    generation,
                    self.config.watchdog
                );
                if let Some(token) = self.in_flight.take() {
                    token.cancel();
                }
                self.state = SchedulerState::Idle;
                None
            }
            SchedulerState::Cooldown { until } if now >= until => {
                if std::mem::take(&mut self.pending) {
                    self.state = SchedulerState::Scheduled { due: now };
                    self.poll(now)
                } else {
                    self.state = SchedulerState::Idle;
                    None
                }
            }
            _ => None,
        }
    }

    /// Reports a finished computation. Returns true if its result is current
    /// and should be applied.
    pub fn complete(&mut self, ticket: &Ticket, now: Instant) -> bool {
        match self.state {
            SchedulerState::Running { started, generation }
                if generation == ticket.generation
                    && generation == self.generation
                    && !ticket.token.is_cancelled() =>
            {
                log::debug!(
                    "generation {} computed in {:?}",
                    generation,
                    now.saturating_duration_since(started)
                );
                self.in_flight = None;
                self.state = SchedulerState::Idle;
                true
            }
            _ => {
                log::debug!("discarding stale result for generation {}", ticket.generation);
                false
            }
        }
    }
}

impl Default for RecomputeScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
