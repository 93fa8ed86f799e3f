//! Error types for booking-engine operations.
//!
//! Three enums map to the three ways an operation can be rejected:
//!
//! - [`ValidationError`] — a value object or aggregate was constructed with
//!   malformed inputs (inverted range, empty weekday set, ...)
//! - [`TransitionError`] — an appointment state-machine transition was
//!   attempted from the wrong state or outside its time window
//! - [`BookingError`] — a proposed booking failed one of the four ordered
//!   validation gates
//!
//! Every failure is a rejected operation, never a panic; callers pattern-match
//! on the kind rather than catching exceptions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::appointment::AppointmentStatus;

/// Construction-time validation failures for value objects and aggregates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("end time {end} must be after start time {start}")]
    InvertedTimeRange { start: NaiveTime, end: NaiveTime },

    #[error("slot duration must be between 1 and 480 minutes, got {0}")]
    SlotDurationOutOfRange(u32),

    #[error("rest time must be between 0 and 120 minutes, got {0}")]
    RestTimeOutOfRange(u32),

    #[error("at least one weekday must be selected")]
    EmptyWeekDays,

    #[error("the contractor must be active to define availability")]
    ContractorInactive,

    #[error("the working time range ({range_minutes} min) must fit at least one slot ({slot_duration} min)")]
    RangeTooShortForSlot { range_minutes: i64, slot_duration: u32 },

    #[error("a break must lie within the working time range")]
    BreakOutsideWorkingHours,

    #[error("this break overlaps an existing break")]
    BreakOverlapsExisting,

    #[error("end date {end} must not be before start date {start}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("new end date {proposed} must not be before the current end date {current}")]
    ShortenedUnavailability { current: NaiveDate, proposed: NaiveDate },
}

/// Invalid appointment state-machine transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot confirm an appointment with status {0}")]
    NotConfirmable(AppointmentStatus),

    #[error("cannot cancel an appointment with status {0}")]
    NotCancellable(AppointmentStatus),

    #[error("cannot cancel less than 24 hours before the appointment starts")]
    CancellationWindowClosed,

    #[error("cannot complete an appointment with status {0}")]
    NotCompletable(AppointmentStatus),

    #[error("cannot complete an appointment that has not taken place yet")]
    NotFinished,
}

/// Failures of the booking validation pipeline, one kind per gate.
///
/// The gates run in a fixed order and the first failure wins, so a proposal
/// outside the contractor's hours reports [`BookingError::OutsideAvailability`]
/// even when it would also conflict with an existing appointment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("no availability rules are defined for this contractor")]
    NoAvailabilityRules,

    #[error("the proposed slot ({proposed}, {duration} min) does not match any availability rule")]
    OutsideAvailability { proposed: NaiveDateTime, duration: u32 },

    #[error("the proposed slot ({proposed}) is blocked by an unavailability period")]
    UnavailabilityConflict { proposed: NaiveDateTime },

    #[error("the proposed slot ({proposed}, {duration} min) conflicts with an existing appointment")]
    AppointmentConflict { proposed: NaiveDateTime, duration: u32 },

    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),
}
