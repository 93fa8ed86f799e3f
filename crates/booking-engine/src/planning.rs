//! Schedule materialization — turns one availability rule, a list of
//! absences and a list of appointments into a chronologically ordered,
//! status-tagged slot list with summary metadata.
//!
//! The planning is entirely derived: it is recomputed on every request and
//! never persisted.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::appointment::Appointment;
use crate::availability::AvailabilityRule;
use crate::slot::TimeSlot;
use crate::unavailability::UnavailabilityRule;

/// Derived status of one generated slot. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Available,
    Booked,
    Unavailable,
    Past,
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Unavailable => "unavailable",
            Self::Past => "past",
        };
        f.write_str(name)
    }
}

/// Read-only projection of one slot in a contractor's planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailableSlot {
    pub contractor_id: Uuid,
    pub time_slot: TimeSlot,
    pub status: AvailabilityStatus,
}

/// Summary counters computed from a generated slot list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanningMetadata {
    pub total_slots: usize,
    pub available_count: usize,
    pub booked_count: usize,
    pub unavailable_count: usize,
    /// Earliest `Available` slot starting strictly after the generation
    /// instant.
    pub next_available: Option<TimeSlot>,
    pub generated_at: NaiveDateTime,
}

impl PlanningMetadata {
    fn empty(generated_at: NaiveDateTime) -> Self {
        Self {
            total_slots: 0,
            available_count: 0,
            booked_count: 0,
            unavailable_count: 0,
            next_available: None,
            generated_at,
        }
    }

    /// Share of generated slots that are available, as a percentage.
    pub fn availability_rate(&self) -> f64 {
        if self.total_slots > 0 {
            self.available_count as f64 / self.total_slots as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Share of bookable slots (available + booked) that are booked, as a
    /// percentage.
    pub fn occupancy_rate(&self) -> f64 {
        let bookable = self.available_count + self.booked_count;
        if bookable > 0 {
            self.booked_count as f64 / bookable as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn has_availability(&self) -> bool {
        self.available_count > 0
    }
}

/// A contractor's materialized schedule over a date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractorPlanning {
    pub contractor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub slots: Vec<AvailableSlot>,
    pub metadata: PlanningMetadata,
}

impl ContractorPlanning {
    /// Only the available slots, in chronological order.
    pub fn available_slots(&self) -> Vec<TimeSlot> {
        self.filter_by_status(AvailabilityStatus::Available)
    }

    /// Only the booked slots, in chronological order.
    pub fn booked_slots(&self) -> Vec<TimeSlot> {
        self.filter_by_status(AvailabilityStatus::Booked)
    }

    pub fn count_by_status(&self, status: AvailabilityStatus) -> usize {
        self.slots.iter().filter(|s| s.status == status).count()
    }

    fn filter_by_status(&self, status: AvailabilityStatus) -> Vec<TimeSlot> {
        self.slots
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.time_slot)
            .collect()
    }
}

/// Builds the full planning for a contractor over `[start_date, end_date]`.
///
/// Returns an empty planning with zeroed metadata when the rule is inactive
/// or the date range is inverted. `now` classifies past slots and stamps
/// `generated_at`.
pub fn generate_planning(
    contractor_id: Uuid,
    availability_rule: &AvailabilityRule,
    unavailability_rules: &[UnavailabilityRule],
    existing_appointments: &[Appointment],
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: NaiveDateTime,
) -> ContractorPlanning {
    let slots = generate_slots(
        contractor_id,
        availability_rule,
        unavailability_rules,
        existing_appointments,
        start_date,
        end_date,
        now,
    );

    let metadata = calculate_planning_metadata(&slots, now);

    ContractorPlanning {
        contractor_id,
        start_date,
        end_date,
        slots,
        metadata,
    }
}

/// Expands raw slots over the date window and tags each with exactly one
/// status.
///
/// The raw slots from every date are concatenated, sorted chronologically,
/// then classified first-match-wins in strict priority order:
/// `Past` → `Unavailable` → `Booked` → `Available`. A past slot is reported
/// `Past` even when it would also be unavailable or booked.
pub fn generate_slots(
    contractor_id: Uuid,
    availability_rule: &AvailabilityRule,
    unavailability_rules: &[UnavailabilityRule],
    existing_appointments: &[Appointment],
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: NaiveDateTime,
) -> Vec<AvailableSlot> {
    if start_date > end_date || !availability_rule.is_active() {
        return Vec::new();
    }

    let mut raw_slots: Vec<TimeSlot> = start_date
        .iter_days()
        .take_while(|date| *date <= end_date)
        .flat_map(|date| availability_rule.generate_slots_for_date(date))
        .collect();

    raw_slots.sort_by_key(TimeSlot::start);

    raw_slots
        .into_iter()
        .map(|slot| AvailableSlot {
            contractor_id,
            time_slot: slot,
            status: determine_slot_status(&slot, unavailability_rules, existing_appointments, now),
        })
        .collect()
}

/// Ordered early-return classification. The order IS the priority; earlier
/// checks short-circuit later ones.
fn determine_slot_status(
    slot: &TimeSlot,
    unavailabilities: &[UnavailabilityRule],
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> AvailabilityStatus {
    if slot.is_in_past(now) {
        return AvailabilityStatus::Past;
    }

    if unavailabilities.iter().any(|u| u.blocks_time_slot(slot)) {
        return AvailabilityStatus::Unavailable;
    }

    let booked = appointments
        .iter()
        .any(|apt| apt.status().is_active() && apt.slot().overlaps(slot));
    if booked {
        return AvailabilityStatus::Booked;
    }

    AvailabilityStatus::Available
}

fn calculate_planning_metadata(slots: &[AvailableSlot], now: NaiveDateTime) -> PlanningMetadata {
    if slots.is_empty() {
        return PlanningMetadata::empty(now);
    }

    let next_available = slots
        .iter()
        .filter(|s| s.status == AvailabilityStatus::Available)
        .map(|s| s.time_slot)
        .filter(|slot| slot.start() > now)
        .min_by_key(TimeSlot::start);

    PlanningMetadata {
        total_slots: slots.len(),
        available_count: count_status(slots, AvailabilityStatus::Available),
        booked_count: count_status(slots, AvailabilityStatus::Booked),
        unavailable_count: count_status(slots, AvailabilityStatus::Unavailable),
        next_available,
        generated_at: now,
    }
}

fn count_status(slots: &[AvailableSlot], status: AvailabilityStatus) -> usize {
    slots.iter().filter(|s| s.status == status).count()
}
