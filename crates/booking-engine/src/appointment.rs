//! The booked appointment aggregate and its lifecycle state machine.
//!
//! An [`Appointment`] is an immutable value: `confirm`, `cancel` and
//! `complete` consume the appointment and return either the next state or a
//! [`TransitionError`]. Nothing is ever mutated in place.
//!
//! ```text
//! Pending ──confirm──► Confirmed ──complete──► Completed
//!    │                     │
//!    └──────cancel─────────┘──► Cancelled        (both terminal)
//! ```
//!
//! Cancellation additionally requires the slot start to be at least 24 hours
//! away; completion requires the slot to have ended.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TransitionError, ValidationError};
use crate::slot::TimeSlot;

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Pending and Confirmed appointments are the only ones that can still
    /// block a slot.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn can_be_confirmed(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn can_be_completed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Free-text reason and accumulated notes. Both optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppointmentDetails {
    reason: Option<String>,
    notes: Option<String>,
}

impl AppointmentDetails {
    pub fn new(reason: Option<String>, notes: Option<String>) -> Self {
        Self { reason, notes }
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Appends a note, separated from existing notes by `" | "`. Blank notes
    /// are ignored.
    pub fn add_note(&self, additional_note: &str) -> Self {
        if additional_note.trim().is_empty() {
            return self.clone();
        }
        let notes = match &self.notes {
            Some(existing) => format!("{existing} | {additional_note}"),
            None => additional_note.to_string(),
        };
        Self {
            reason: self.reason.clone(),
            notes: Some(notes),
        }
    }
}

/// A booked interval between a client and a contractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    id: Uuid,
    client_id: Uuid,
    contractor_id: Uuid,
    slot: TimeSlot,
    status: AppointmentStatus,
    details: AppointmentDetails,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Appointment {
    /// Creates a new appointment in `Pending` status.
    ///
    /// # Errors
    /// Propagates slot validation (duration out of range).
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: Uuid,
        client_id: Uuid,
        contractor_id: Uuid,
        start_date_time: NaiveDateTime,
        duration: u32,
        reason: Option<String>,
        notes: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            client_id,
            contractor_id,
            slot: TimeSlot::new(start_date_time, duration)?,
            status: AppointmentStatus::Pending,
            details: AppointmentDetails::new(reason, notes),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes an appointment from stored state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        client_id: Uuid,
        contractor_id: Uuid,
        slot: TimeSlot,
        status: AppointmentStatus,
        details: AppointmentDetails,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            client_id,
            contractor_id,
            slot,
            status,
            details,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    pub fn contractor_id(&self) -> Uuid {
        self.contractor_id
    }

    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    pub fn appointment_date_time(&self) -> NaiveDateTime {
        self.slot.start()
    }

    pub fn duration(&self) -> u32 {
        self.slot.duration()
    }

    pub fn end_date_time(&self) -> NaiveDateTime {
        self.slot.end()
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn details(&self) -> &AppointmentDetails {
        &self.details
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Confirms a pending appointment (contractor action).
    ///
    /// # Errors
    /// Returns [`TransitionError::NotConfirmable`] unless the status is
    /// `Pending`.
    pub fn confirm(self, now: NaiveDateTime) -> Result<Self, TransitionError> {
        if !self.status.can_be_confirmed() {
            return Err(TransitionError::NotConfirmable(self.status));
        }
        Ok(Self {
            status: AppointmentStatus::Confirmed,
            updated_at: now,
            ..self
        })
    }

    /// Cancels the appointment, appending an audit note with the reason.
    ///
    /// # Errors
    /// Returns [`TransitionError::NotCancellable`] unless the status is
    /// `Pending` or `Confirmed`, and [`TransitionError::CancellationWindowClosed`]
    /// when the slot starts in less than 24 hours.
    pub fn cancel(self, cancellation_reason: &str, now: NaiveDateTime) -> Result<Self, TransitionError> {
        if !self.status.can_be_cancelled() {
            return Err(TransitionError::NotCancellable(self.status));
        }
        if !self.slot.starts_in_more_than_24h(now) {
            return Err(TransitionError::CancellationWindowClosed);
        }
        let details = self
            .details
            .add_note(&format!("Cancelled: {cancellation_reason}"));
        Ok(Self {
            status: AppointmentStatus::Cancelled,
            details,
            updated_at: now,
            ..self
        })
    }

    /// Marks a confirmed, finished appointment as completed.
    ///
    /// # Errors
    /// Returns [`TransitionError::NotCompletable`] unless the status is
    /// `Confirmed`, and [`TransitionError::NotFinished`] while the slot end
    /// is still in the future.
    pub fn complete(self, now: NaiveDateTime) -> Result<Self, TransitionError> {
        if !self.status.can_be_completed() {
            return Err(TransitionError::NotCompletable(self.status));
        }
        if self.slot.end() > now {
            return Err(TransitionError::NotFinished);
        }
        Ok(Self {
            status: AppointmentStatus::Completed,
            updated_at: now,
            ..self
        })
    }

    /// Appends a free-text note.
    pub fn with_note(self, note: &str, now: NaiveDateTime) -> Self {
        let details = self.details.add_note(note);
        Self {
            details,
            updated_at: now,
            ..self
        }
    }

    /// Whether the appointment can still be changed: in the future, active,
    /// and more than 24 hours away.
    pub fn is_modifiable(&self, now: NaiveDateTime) -> bool {
        self.slot.is_in_future(now) && self.status.is_active() && self.slot.starts_in_more_than_24h(now)
    }

    /// Whether this appointment blocks a proposed `(start, duration)`
    /// interval. This is the primitive behind conflict detection: only
    /// active appointments block, and overlap is half-open (back-to-back
    /// appointments do not conflict).
    pub fn blocks_time_slot(&self, start: NaiveDateTime, duration: u32) -> bool {
        self.status.is_active() && self.slot.overlaps_interval(start, duration)
    }

    /// Whether this appointment belongs to the given contractor and starts at
    /// exactly the given instant.
    pub fn is_at(&self, contractor_id: Uuid, date_time: NaiveDateTime) -> bool {
        self.contractor_id == contractor_id && self.slot.start() == date_time
    }
}
