//! # booking-engine
//!
//! Deterministic availability expansion and booking validation for contractor
//! scheduling.
//!
//! Contractors publish a weekly availability template with breaks and declare
//! date-range absences; clients book fixed-cadence slots against it. This
//! crate is the pure decision core: it expands the template into concrete,
//! status-tagged slots, validates proposed bookings through an ordered gate
//! pipeline, and drives the appointment lifecycle state machine. It performs
//! no I/O and holds no state — every operation is a function of the supplied
//! snapshots and an injected `now`, so independent requests can run fully in
//! parallel.
//!
//! The one hazard the engine cannot solve alone is the check-then-act race at
//! the booking boundary: callers must make "validate snapshot → persist new
//! appointment" atomic (see the contract on [`booking::can_create_appointment`]).
//!
//! ## Modules
//!
//! - [`slot`] — temporal value types: `TimeRange`, `SlotConfiguration`, `TimeSlot`
//! - [`availability`] — weekly template (`AvailabilityRule`, `BreakTime`) and slot generation
//! - [`unavailability`] — date-range overrides that block otherwise-available time
//! - [`appointment`] — the booked aggregate and its lifecycle state machine
//! - [`booking`] — validation pipeline, next-slot search, occupancy, reminders
//! - [`planning`] — materialized, status-tagged schedule with summary metadata
//! - [`error`] — error kinds for rejected operations

pub mod appointment;
pub mod availability;
pub mod booking;
pub mod error;
pub mod planning;
pub mod slot;
pub mod unavailability;

pub use appointment::{Appointment, AppointmentDetails, AppointmentStatus};
pub use availability::{AvailabilityRule, BreakTime};
pub use booking::{can_create_appointment, find_next_available_slot, validate_and_create};
pub use error::{BookingError, TransitionError, ValidationError};
pub use planning::{
    generate_planning, AvailabilityStatus, AvailableSlot, ContractorPlanning, PlanningMetadata,
};
pub use slot::{SlotConfiguration, TimeRange, TimeSlot};
pub use unavailability::{UnavailabilityPeriod, UnavailabilityRule};
