//! Run-time window resolution
//!
//! A run is described by four related quantities: `start_time`, `end_time`,
//! `duration` and `steps`. Two of them (at least one being a timestamp) fix
//! the other two given the simulation `time_step` and the run direction.
//! This module is pure: nothing here reads or writes configuration state.

use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::core::duration::{format_iso, scale};

/// Errors from time window resolution
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TimeError {
    #[error("need two of start_time, end_time, duration, steps; supplied: {supplied}")]
    Underdetermined { supplied: String },

    #[error("duration and steps alone do not anchor the run; supply start_time or end_time ({supplied})")]
    MissingAnchor { supplied: String },

    #[error("{field} supplied as {supplied} but the other time fields give {computed}")]
    Inconsistent {
        field: &'static str,
        supplied: String,
        computed: String,
    },

    #[error("end_time {end} lies on the wrong side of start_time {start} for a {direction} run")]
    DirectionMismatch {
        start: NaiveDateTime,
        end: NaiveDateTime,
        direction: Direction,
    },

    #[error("time_step must be positive, got {0}")]
    InvalidTimeStep(String),

    #[error("{0} is outside the representable time range")]
    OutOfRange(&'static str),
}

/// Run direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn from_run_forward(run_forward: bool) -> Self {
        if run_forward {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// +1 forward, -1 backward
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    fn offset(self, start: NaiveDateTime, span: TimeDelta) -> Option<NaiveDateTime> {
        match self {
            Direction::Forward => start.checked_add_signed(span),
            Direction::Backward => start.checked_sub_signed(span),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// Partially specified time window (caller input)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeWindow {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Option<TimeDelta>,
    pub steps: Option<u64>,
}

impl TimeWindow {
    /// Names of the fields that are set, in canonical order
    pub fn supplied(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.start_time.is_some() {
            names.push("start_time");
        }
        if self.end_time.is_some() {
            names.push("end_time");
        }
        if self.duration.is_some() {
            names.push("duration");
        }
        if self.steps.is_some() {
            names.push("steps");
        }
        names
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(start) = self.start_time {
            parts.push(format!("start_time={}", start));
        }
        if let Some(end) = self.end_time {
            parts.push(format!("end_time={}", end));
        }
        if let Some(duration) = self.duration {
            parts.push(format!("duration={}", format_iso(duration)));
        }
        if let Some(steps) = self.steps {
            parts.push(format!("steps={}", steps));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Fully resolved time window
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWindow {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration: TimeDelta,
    pub steps: u64,
    pub direction: Direction,
}

impl ResolvedWindow {
    /// Same values as a fully populated input window
    pub fn as_window(&self) -> TimeWindow {
        TimeWindow {
            start_time: Some(self.start_time),
            end_time: Some(self.end_time),
            duration: Some(self.duration),
            steps: Some(self.steps),
        }
    }
}

/// Resolves a [`TimeWindow`] for a fixed time step and direction
///
/// # Example
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use particle_tracking_core_rs::core::time::{Direction, TimeResolver, TimeWindow};
///
/// let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let resolver = TimeResolver::new(TimeDelta::hours(1), Direction::Forward).unwrap();
///
/// let window = TimeWindow { start_time: Some(start), steps: Some(24), ..Default::default() };
/// let resolved = resolver.resolve(&window).unwrap();
/// assert_eq!(resolved.duration, TimeDelta::days(1));
/// assert_eq!(resolved.end_time, start + TimeDelta::days(1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeResolver {
    time_step: TimeDelta,
    direction: Direction,
}

impl TimeResolver {
    /// Create a resolver
    ///
    /// # Errors
    /// `InvalidTimeStep` if `time_step` is zero, negative or below a microsecond.
    pub fn new(time_step: TimeDelta, direction: Direction) -> Result<Self, TimeError> {
        match time_step.num_microseconds() {
            Some(micros) if micros > 0 => Ok(Self {
                time_step,
                direction,
            }),
            _ => Err(TimeError::InvalidTimeStep(format_iso(time_step))),
        }
    }

    pub fn time_step(&self) -> TimeDelta {
        self.time_step
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Steps needed to cover `duration`, rounded to the nearest whole step
    pub fn steps_for(&self, duration: TimeDelta) -> Result<u64, TimeError> {
        let span = duration
            .abs()
            .num_microseconds()
            .ok_or(TimeError::OutOfRange("duration"))? as i128;
        let step = self
            .time_step
            .num_microseconds()
            .ok_or(TimeError::OutOfRange("time_step"))? as i128;
        let rounded = (2 * span + step) / (2 * step);
        u64::try_from(rounded).map_err(|_| TimeError::OutOfRange("steps"))
    }

    /// Resolve the window
    ///
    /// Exactly two supplied fields (one of them a timestamp) determine the
    /// rest. With three or four supplied, the basis is taken from the
    /// timestamps first and every other supplied field must agree with what
    /// the basis computes; duration is compared in canonical ISO-8601 form.
    pub fn resolve(&self, window: &TimeWindow) -> Result<ResolvedWindow, TimeError> {
        let supplied = window.supplied();
        if supplied.len() < 2 {
            return Err(TimeError::Underdetermined {
                supplied: window.describe(),
            });
        }

        let resolved = match (window.start_time, window.end_time) {
            (Some(start), Some(end)) => self.from_endpoints(start, end)?,
            (Some(start), None) => self.from_start(start, window)?,
            (None, Some(end)) => self.from_end(end, window)?,
            (None, None) => {
                return Err(TimeError::MissingAnchor {
                    supplied: window.describe(),
                })
            }
        };

        self.check_supplied(window, &resolved)?;
        Ok(resolved)
    }

    fn from_endpoints(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<ResolvedWindow, TimeError> {
        let wrong_side = match self.direction {
            Direction::Forward => end < start,
            Direction::Backward => end > start,
        };
        if wrong_side {
            return Err(TimeError::DirectionMismatch {
                start,
                end,
                direction: self.direction,
            });
        }

        let duration = (end - start).abs();
        Ok(ResolvedWindow {
            start_time: start,
            end_time: end,
            duration,
            steps: self.steps_for(duration)?,
            direction: self.direction,
        })
    }

    fn from_start(
        &self,
        start: NaiveDateTime,
        window: &TimeWindow,
    ) -> Result<ResolvedWindow, TimeError> {
        let (duration, steps) = self.span(window)?;
        let end = self
            .direction
            .offset(start, duration)
            .ok_or(TimeError::OutOfRange("end_time"))?;
        Ok(ResolvedWindow {
            start_time: start,
            end_time: end,
            duration,
            steps,
            direction: self.direction,
        })
    }

    fn from_end(&self, end: NaiveDateTime, window: &TimeWindow) -> Result<ResolvedWindow, TimeError> {
        let (duration, steps) = self.span(window)?;
        let start = match self.direction {
            Direction::Forward => end.checked_sub_signed(duration),
            Direction::Backward => end.checked_add_signed(duration),
        }
        .ok_or(TimeError::OutOfRange("start_time"))?;
        Ok(ResolvedWindow {
            start_time: start,
            end_time: end,
            duration,
            steps,
            direction: self.direction,
        })
    }

    /// Duration and steps from whichever of the two is supplied (duration wins)
    fn span(&self, window: &TimeWindow) -> Result<(TimeDelta, u64), TimeError> {
        match (window.duration, window.steps) {
            (Some(duration), _) => {
                let duration = duration.abs();
                Ok((duration, self.steps_for(duration)?))
            }
            (None, Some(steps)) => {
                let duration =
                    scale(self.time_step, steps).ok_or(TimeError::OutOfRange("duration"))?;
                Ok((duration, steps))
            }
            (None, None) => Err(TimeError::Underdetermined {
                supplied: window.describe(),
            }),
        }
    }

    fn check_supplied(
        &self,
        window: &TimeWindow,
        resolved: &ResolvedWindow,
    ) -> Result<(), TimeError> {
        if let Some(duration) = window.duration {
            let supplied = format_iso(duration.abs());
            let computed = format_iso(resolved.duration);
            if supplied != computed {
                return Err(TimeError::Inconsistent {
                    field: "duration",
                    supplied,
                    computed,
                });
            }
        }
        if let Some(steps) = window.steps {
            if steps != resolved.steps {
                return Err(TimeError::Inconsistent {
                    field: "steps",
                    supplied: steps.to_string(),
                    computed: resolved.steps.to_string(),
                });
            }
        }
        Ok(())
    }
}
