//! Temporal primitives — self-validating value types with no dependencies on
//! the rest of the engine.
//!
//! [`TimeRange`] is a wall-clock window within a single day, [`SlotConfiguration`]
//! defines the slot cadence, and [`TimeSlot`] is a concrete bookable interval.
//!
//! Slot-vs-slot overlap is half-open: a slot ending at 10:30 does NOT overlap
//! one starting at 10:30. Containment checks are inclusive at both ends.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::ValidationError;

/// Longest bookable slot, in minutes (8 hours).
pub const MAX_SLOT_MINUTES: u32 = 480;

/// Longest rest gap between slots, in minutes.
pub const MAX_REST_MINUTES: u32 = 120;

/// A `(start, end)` wall-clock pair within one day. Invariant: `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    /// # Errors
    /// Returns [`ValidationError::InvertedTimeRange`] unless `end > start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvertedTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Inclusive containment: both `start` and `end` are inside the range.
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap: two ranges sharing only a boundary do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Slot cadence: how long a bookable slot lasts and how much rest follows it.
///
/// `slot_duration + rest_time` is the grid step — the distance between two
/// consecutive bookable start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConfiguration {
    slot_duration: u32,
    rest_time: u32,
}

impl SlotConfiguration {
    /// # Errors
    /// Returns a [`ValidationError`] unless `1 <= slot_duration <= 480` and
    /// `rest_time <= 120`.
    pub fn new(slot_duration: u32, rest_time: u32) -> Result<Self, ValidationError> {
        if slot_duration == 0 || slot_duration > MAX_SLOT_MINUTES {
            return Err(ValidationError::SlotDurationOutOfRange(slot_duration));
        }
        if rest_time > MAX_REST_MINUTES {
            return Err(ValidationError::RestTimeOutOfRange(rest_time));
        }
        Ok(Self {
            slot_duration,
            rest_time,
        })
    }

    pub fn slot_duration(&self) -> u32 {
        self.slot_duration
    }

    pub fn rest_time(&self) -> u32 {
        self.rest_time
    }

    /// The grid step in minutes.
    pub fn total_slot_time(&self) -> u32 {
        self.slot_duration + self.rest_time
    }
}

/// A concrete bookable interval: a start instant plus a duration in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    start: NaiveDateTime,
    duration: u32,
}

impl TimeSlot {
    /// # Errors
    /// Returns [`ValidationError::SlotDurationOutOfRange`] unless
    /// `1 <= duration <= 480`.
    pub fn new(start: NaiveDateTime, duration: u32) -> Result<Self, ValidationError> {
        if duration == 0 || duration > MAX_SLOT_MINUTES {
            return Err(ValidationError::SlotDurationOutOfRange(duration));
        }
        Ok(Self { start, duration })
    }

    /// Builds a slot whose duration was already validated elsewhere, e.g. by
    /// [`SlotConfiguration::new`]. Grid expansion uses this to avoid threading
    /// an impossible error through a pure generator.
    pub(crate) fn new_unchecked(start: NaiveDateTime, duration: u32) -> Self {
        debug_assert!(duration >= 1 && duration <= MAX_SLOT_MINUTES);
        Self { start, duration }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(i64::from(self.duration))
    }

    pub fn is_in_past(&self, now: NaiveDateTime) -> bool {
        self.start < now
    }

    pub fn is_in_future(&self, now: NaiveDateTime) -> bool {
        self.start > now
    }

    /// Whether the slot starts at least 24 hours after `now`.
    ///
    /// The cutoff is measured from the slot start and is inclusive: a slot
    /// starting exactly 24 hours from `now` still passes. This is the guard
    /// behind the cancellation window.
    pub fn starts_in_more_than_24h(&self, now: NaiveDateTime) -> bool {
        self.start - now >= Duration::hours(24)
    }

    /// Inclusive containment: the slot end counts as inside.
    pub fn contains(&self, date_time: NaiveDateTime) -> bool {
        date_time >= self.start && date_time <= self.end()
    }

    /// Half-open overlap: a slot ending exactly when another starts does not
    /// overlap it.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Overlap against a raw `(start, duration)` interval, same semantics as
    /// [`TimeSlot::overlaps`].
    pub fn overlaps_interval(&self, other_start: NaiveDateTime, other_duration: u32) -> bool {
        let other_end = other_start + Duration::minutes(i64::from(other_duration));
        self.start < other_end && other_start < self.end()
    }
}
