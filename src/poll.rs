// This file is part of fpgamgr, an application to bring up an FPGA through the SoC FPGA manager registers.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// fpgamgr is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// fpgamgr is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Bounded polling with exponential backoff.
//!
//! The FPGA manager signals progress only through the mode bits of the status register,
//! so every phase change of a configuration run is observed by polling. All of those
//! waits go through [`wait_until`] so the retry budget and sleep schedule live in one
//! place and a device that never progresses turns into an error instead of a hang.

use crate::error::FpgaMgrError;
use log::trace;
use std::thread::sleep;
use std::time::Duration;

/// Retry budget and backoff schedule for [`wait_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of times the condition is evaluated before giving up. 0 behaves as 1.
    pub max_attempts: u32,
    /// Sleep after the first unsuccessful attempt.
    pub initial_delay: Duration,
    /// Upper bound for the doubling delay.
    pub max_delay: Duration,
}

impl PollPolicy {
    /// Poll without sleeping between attempts. Used by simulated devices.
    pub fn immediate(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to sleep after unsuccessful attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(31);
        self.initial_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            max_attempts: 100_000,
            initial_delay: Duration::from_micros(1),
            max_delay: Duration::from_millis(1),
        }
    }
}

/// Result of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The condition held on attempt `attempts`.
    Satisfied { attempts: u32 },
    /// The condition never held within the budget.
    Exhausted { attempts: u32 },
}

/// Evaluate `condition` until it returns `true` or the policy's budget runs out.
///
/// Errors returned by `condition` abort the wait immediately and are propagated.
///
/// # Returns: `Result<PollOutcome, FpgaMgrError>`
/// * `Ok(PollOutcome::Satisfied)` - Condition held
/// * `Ok(PollOutcome::Exhausted)` - Budget used up without the condition holding
/// * `Err(FpgaMgrError)` - The condition itself failed
pub fn wait_until<F>(policy: &PollPolicy, mut condition: F) -> Result<PollOutcome, FpgaMgrError>
where
    F: FnMut() -> Result<bool, FpgaMgrError>,
{
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        if condition()? {
            trace!("Condition met after {attempt} attempt(s)");
            return Ok(PollOutcome::Satisfied { attempts: attempt });
        }
        if attempt < max_attempts {
            let delay = policy.delay_after(attempt);
            if !delay.is_zero() {
                sleep(delay);
            }
        }
    }
    Ok(PollOutcome::Exhausted {
        attempts: max_attempts,
    })
}
