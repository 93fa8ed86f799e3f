//! Booking validation and search — the stateless decision engine behind
//! appointment creation.
//!
//! [`can_create_appointment`] runs four ordered gates over a snapshot of the
//! contractor's rules, absences and existing appointments; the first failing
//! gate wins and maps to one [`BookingError`] kind. The individual gates are
//! public so the transport layer can answer cheaper questions ("is this
//! aligned?") without running the whole pipeline.
//!
//! # Concurrency contract
//!
//! The pipeline inspects a *snapshot* and the caller persists the appointment
//! afterwards. Two concurrent requests for the same slot can both pass the
//! same checks (check-then-act). The engine performs no locking; the caller
//! must make "validate snapshot → persist" atomic — e.g. a uniqueness
//! constraint on `(contractor_id, slot start)` in the persistence layer — so
//! that at most one active appointment ever exists per contractor slot.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::appointment::{Appointment, AppointmentStatus};
use crate::availability::AvailabilityRule;
use crate::error::BookingError;
use crate::unavailability::UnavailabilityRule;

/// Upper bound for [`find_next_available_slot`], in days.
pub const MAX_SEARCH_DAYS: i64 = 90;

const REMINDER_MIN_HOURS: i64 = 24;
const REMINDER_MAX_HOURS: i64 = 48;

/// Decides whether a proposed booking is legal and non-conflicting.
///
/// Four gates, in order; the first failure is returned and later gates are
/// not evaluated:
///
/// 1. the contractor has at least one availability rule
/// 2. some applicable rule covers the proposal: weekday selected, start and
///    last covered minute inside the working hours, duration exactly the
///    configured slot duration, start on the slot grid
/// 3. no unavailability period blocks the interval
/// 4. no active appointment overlaps the interval
///
/// # Errors
/// One [`BookingError`] kind per gate.
pub fn can_create_appointment(
    proposed_date_time: NaiveDateTime,
    duration: u32,
    contractor_rules: &[AvailabilityRule],
    unavailabilities: &[UnavailabilityRule],
    existing_appointments: &[Appointment],
) -> Result<(), BookingError> {
    if contractor_rules.is_empty() {
        return Err(BookingError::NoAvailabilityRules);
    }

    if !is_within_availability_rules(proposed_date_time, duration, contractor_rules) {
        return Err(BookingError::OutsideAvailability {
            proposed: proposed_date_time,
            duration,
        });
    }

    if is_blocked_by_unavailability(proposed_date_time, duration, unavailabilities) {
        return Err(BookingError::UnavailabilityConflict {
            proposed: proposed_date_time,
        });
    }

    if has_conflict_with_existing(proposed_date_time, duration, existing_appointments) {
        return Err(BookingError::AppointmentConflict {
            proposed: proposed_date_time,
            duration,
        });
    }

    Ok(())
}

/// Runs the validation pipeline and, on success, builds the `Pending`
/// appointment.
///
/// # Errors
/// Gate failures as in [`can_create_appointment`]; malformed request values
/// surface as [`BookingError::InvalidRequest`].
#[allow(clippy::too_many_arguments)]
pub fn validate_and_create(
    id: Uuid,
    client_id: Uuid,
    contractor_id: Uuid,
    proposed_date_time: NaiveDateTime,
    duration: u32,
    reason: Option<String>,
    notes: Option<String>,
    contractor_rules: &[AvailabilityRule],
    unavailabilities: &[UnavailabilityRule],
    existing_appointments: &[Appointment],
    now: NaiveDateTime,
) -> Result<Appointment, BookingError> {
    can_create_appointment(
        proposed_date_time,
        duration,
        contractor_rules,
        unavailabilities,
        existing_appointments,
    )?;

    Ok(Appointment::create(
        id,
        client_id,
        contractor_id,
        proposed_date_time,
        duration,
        reason,
        notes,
        now,
    )?)
}

/// Whether any applicable rule accepts the proposed interval.
pub fn is_within_availability_rules(
    proposed_date_time: NaiveDateTime,
    duration: u32,
    rules: &[AvailabilityRule],
) -> bool {
    rules
        .iter()
        .filter(|rule| rule.applies_to(proposed_date_time.weekday()))
        .any(|rule| is_valid_for_rule(proposed_date_time, duration, rule))
}

/// A proposal fits one rule when its start and its last covered minute lie
/// within the working hours, the duration matches the configured slot
/// duration exactly (no partial or oversized bookings), and the start sits
/// on the slot grid. A slot spilling into the next calendar day never fits.
fn is_valid_for_rule(
    proposed_date_time: NaiveDateTime,
    duration: u32,
    rule: &AvailabilityRule,
) -> bool {
    let last_minute = proposed_date_time + Duration::minutes(i64::from(duration) - 1);
    if last_minute.date() != proposed_date_time.date() {
        return false;
    }

    rule.is_within_time_range(proposed_date_time.time())
        && rule.is_within_time_range(last_minute.time())
        && duration == rule.slot_config().slot_duration()
        && is_aligned_with_slot_grid(proposed_date_time, rule)
}

/// Whether the proposed start sits on the rule's slot grid.
///
/// The grid is anchored at the working range start and steps by
/// `slot_duration + rest_time`; only whole multiples of the step are
/// bookable. Starts before the range start are rejected. This keeps
/// arbitrary-offset bookings from fragmenting the schedule.
pub fn is_aligned_with_slot_grid(
    proposed_date_time: NaiveDateTime,
    rule: &AvailabilityRule,
) -> bool {
    let minutes_from_start =
        (proposed_date_time.time() - rule.time_range().start()).num_minutes();

    if minutes_from_start < 0 {
        return false;
    }

    minutes_from_start % i64::from(rule.slot_config().total_slot_time()) == 0
}

/// Whether any declared absence blocks the proposed interval.
pub fn is_blocked_by_unavailability(
    proposed_date_time: NaiveDateTime,
    duration: u32,
    unavailabilities: &[UnavailabilityRule],
) -> bool {
    let proposed_end = proposed_date_time + Duration::minutes(i64::from(duration));
    unavailabilities
        .iter()
        .any(|u| u.blocks_interval(proposed_date_time, proposed_end))
}

/// Whether any active (pending or confirmed) appointment overlaps the
/// proposed interval.
pub fn has_conflict_with_existing(
    proposed_date_time: NaiveDateTime,
    duration: u32,
    existing_appointments: &[Appointment],
) -> bool {
    existing_appointments
        .iter()
        .any(|apt| apt.blocks_time_slot(proposed_date_time, duration))
}

/// Finds the first unblocked, grid-aligned slot of the required duration at
/// or after `after_date_time`.
///
/// Bounded linear search over at most [`MAX_SEARCH_DAYS`] days. For each day,
/// each applicable rule whose slot duration matches contributes its grid:
/// starting at the rule's range start (or, on the first day, at the first
/// grid point at or after `after_date_time`) and stepping by the grid step
/// until a slot no longer fits before the range end. The first candidate
/// blocked by neither an unavailability nor an active appointment wins.
///
/// Returns `None` once the window is exhausted.
pub fn find_next_available_slot(
    after_date_time: NaiveDateTime,
    required_duration: u32,
    rules: &[AvailabilityRule],
    unavailabilities: &[UnavailabilityRule],
    existing_appointments: &[Appointment],
) -> Option<NaiveDateTime> {
    if rules.is_empty() {
        return None;
    }

    let first_date = after_date_time.date();

    for day_offset in 0..=MAX_SEARCH_DAYS {
        let date = first_date + Duration::days(day_offset);

        for rule in rules {
            if !rule.applies_to(date.weekday())
                || rule.slot_config().slot_duration() != required_duration
            {
                continue;
            }

            let grid_step = Duration::minutes(i64::from(rule.slot_config().total_slot_time()));
            let day_start = date.and_time(rule.time_range().start());
            let day_end = date.and_time(rule.time_range().end());

            // First candidate: the rule start, bumped up to the first grid
            // point at or after `after_date_time` on the starting day.
            let mut slot = day_start;
            if date == first_date && after_date_time > day_start {
                let offset = (after_date_time - day_start).num_minutes();
                let step = grid_step.num_minutes();
                let aligned = (offset + step - 1) / step * step;
                slot = day_start + Duration::minutes(aligned);
            }

            while slot + Duration::minutes(i64::from(required_duration)) <= day_end {
                let blocked =
                    is_blocked_by_unavailability(slot, required_duration, unavailabilities)
                        || has_conflict_with_existing(
                            slot,
                            required_duration,
                            existing_appointments,
                        );

                if !blocked {
                    return Some(slot);
                }
                slot += grid_step;
            }
        }
    }

    None
}

/// Share of rule-generated slots occupied by active appointments over a date
/// range, as a percentage.
///
/// The denominator is every slot the rules generate across the range (break
/// windows are already excluded by generation); the numerator counts active
/// appointments whose start date falls inside the range. Returns `0.0` for
/// empty rules, an inverted range, or a zero denominator.
pub fn calculate_occupancy_rate(
    appointments: &[Appointment],
    rules: &[AvailabilityRule],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> f64 {
    if rules.is_empty() || start_date > end_date {
        return 0.0;
    }

    let total_slots: usize = start_date
        .iter_days()
        .take_while(|date| *date <= end_date)
        .map(|date| {
            rules
                .iter()
                .map(|rule| rule.generate_slots_for_date(date).len())
                .sum::<usize>()
        })
        .sum();

    if total_slots == 0 {
        return 0.0;
    }

    let occupied_slots = appointments
        .iter()
        .filter(|apt| {
            let date = apt.slot().start().date();
            date >= start_date && date <= end_date
        })
        .filter(|apt| apt.status().is_active())
        .count();

    occupied_slots as f64 / total_slots as f64 * 100.0
}

/// Whether the given client may cancel this appointment: they own it, the
/// status is still cancellable, and the slot is at least 24 hours away.
pub fn can_client_cancel_appointment(
    appointment: &Appointment,
    client_id: Uuid,
    now: NaiveDateTime,
) -> bool {
    appointment.client_id() == client_id
        && appointment.slot().starts_in_more_than_24h(now)
        && appointment.status().can_be_cancelled()
}

/// Whether the given contractor may cancel this appointment: they own it and
/// the status is still cancellable. Contractors are not bound by the 24-hour
/// window.
pub fn can_contractor_cancel_appointment(appointment: &Appointment, contractor_id: Uuid) -> bool {
    appointment.contractor_id() == contractor_id && appointment.status().can_be_cancelled()
}

/// Whether a reminder should fire now: the appointment is confirmed and the
/// (truncated) number of hours until its start falls in `[24, 48]`.
pub fn should_send_reminder(appointment: &Appointment, now: NaiveDateTime) -> bool {
    if appointment.status() != AppointmentStatus::Confirmed {
        return false;
    }

    let hours_until = (appointment.slot().start() - now).num_hours();
    (REMINDER_MIN_HOURS..=REMINDER_MAX_HOURS).contains(&hours_until)
}
