//! autoblock-schedule: The weekly schedule compiler.
//!
//! Turns user-authored block schedules into the calendar trigger instants a
//! launchd job fires on. Two stages: the validator ([`normalize`]) rejects
//! malformed or overlapping windows and produces a disjoint, sorted window
//! set; the expander ([`expand`]) turns every window edge into one trigger
//! record. [`compile`] runs both and returns the immutable
//! [`CompiledSchedule`] handed to the registration step.
//!
//! Pure computation over in-memory lists; no I/O, no clock access.

pub mod expand;
pub mod validate;

use thiserror::Error;

use autoblock_types::{BlockSchedule, MINUTES_PER_DAY, MINUTES_PER_WEEK, TriggerInstant, Weekday};

pub use expand::expand;
pub use validate::normalize;

/// User-configuration errors detected while validating block schedules.
///
/// Validation is all-or-nothing: the first error aborts the whole compile
/// and no trigger set is produced, so a bad config can never leave blocking
/// half-configured.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(
        "block-schedules[{entry}]: {field} time {hour:02}:{minute:02} is out of range \
         (hour 0-23, minute 0-59)"
    )]
    InvalidTime {
        entry: usize,
        field: &'static str,
        hour: u32,
        minute: u32,
    },

    #[error(
        "block-schedules[{entry}] starts and ends at {hour:02}:{minute:02}; \
         a window must cover at least one minute"
    )]
    DegenerateInterval { entry: usize, hour: u32, minute: u32 },

    #[error(
        "block-schedules[{first}] ({first_window}) overlaps \
         block-schedules[{second}] ({second_window})"
    )]
    Overlap {
        first: usize,
        first_window: String,
        second: usize,
        second_window: String,
    },
}

/// The expander received data that violates a validator-established
/// invariant. Never expected in correct operation: this is a defect in the
/// compiler, not a configuration mistake.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("internal consistency fault in the schedule compiler: {detail}; this is a bug")]
pub struct InternalConsistencyFault {
    pub detail: String,
}

/// Everything that can abort a compile.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Internal(#[from] InternalConsistencyFault),
}

/// A validated block window on the circular week timeline.
///
/// Half-open `[start, end)` in minutes since Monday 00:00. An `end`
/// numerically smaller than `start` means the window wraps past Sunday
/// midnight into Monday. Only [`normalize`] constructs these, which is what
/// makes the expander total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedInterval {
    start: u32,
    end: u32,
    source: usize,
}

impl NormalizedInterval {
    /// Opening minute of the week.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Closing minute of the week (exclusive); may be numerically below
    /// `start` for wrapping windows.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Index of the config entry this window came from.
    pub fn source(&self) -> usize {
        self.source
    }

    /// Logical length in minutes, wraparound included.
    pub fn duration_minutes(&self) -> u32 {
        (self.end + MINUTES_PER_WEEK - self.start) % MINUTES_PER_WEEK
    }

    /// Whether the window covers the given minute of the week.
    pub fn contains(&self, minute: u32) -> bool {
        let m = minute % MINUTES_PER_WEEK;
        if self.start < self.end {
            self.start <= m && m < self.end
        } else {
            m >= self.start || m < self.end
        }
    }

    /// Minutes from `minute` until the window closes. Meaningful only when
    /// `minute` is inside the window.
    pub fn minutes_until_end(&self, minute: u32) -> u32 {
        (self.end + MINUTES_PER_WEEK - minute % MINUTES_PER_WEEK) % MINUTES_PER_WEEK
    }

    /// "Monday 09:00-17:30" style label for error messages and status output.
    pub fn describe(&self) -> String {
        let day = Weekday::from_minute_of_week(self.start);
        let (sh, sm) = in_day(self.start);
        let (eh, em) = in_day(self.end);
        format!("{day} {sh:02}:{sm:02}-{eh:02}:{em:02}")
    }
}

fn in_day(offset: u32) -> (u32, u32) {
    let m = offset % MINUTES_PER_DAY;
    (m / 60, m % 60)
}

/// The immutable result of a compile: the disjoint window set plus the
/// trigger instants derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSchedule {
    intervals: Vec<NormalizedInterval>,
    triggers: Vec<TriggerInstant>,
}

impl CompiledSchedule {
    /// Validated windows, sorted by opening minute.
    pub fn intervals(&self) -> &[NormalizedInterval] {
        &self.intervals
    }

    /// Trigger instants, ordered by minute of week (Stop before Start on a
    /// shared instant).
    pub fn triggers(&self) -> &[TriggerInstant] {
        &self.triggers
    }

    /// The window covering `minute` of the week, if any. Disjointness
    /// guarantees at most one exists.
    pub fn active_at(&self, minute: u32) -> Option<&NormalizedInterval> {
        self.intervals.iter().find(|iv| iv.contains(minute))
    }
}

/// Compile raw config entries into the schedule handed to the launchd
/// registration step.
pub fn compile(entries: &[BlockSchedule]) -> Result<CompiledSchedule, CompileError> {
    let intervals = validate::normalize(entries)?;
    let triggers = expand::expand(&intervals)?;
    Ok(CompiledSchedule { intervals, triggers })
}
