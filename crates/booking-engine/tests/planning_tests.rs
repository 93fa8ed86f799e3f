//! Tests for planning generation: expansion, classification priority, and
//! metadata aggregation.

use std::collections::HashSet;

use booking_engine::appointment::Appointment;
use booking_engine::availability::{AvailabilityRule, BreakTime};
use booking_engine::planning::{generate_planning, generate_slots, AvailabilityStatus};
use booking_engine::slot::{SlotConfiguration, TimeRange};
use booking_engine::unavailability::UnavailabilityRule;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use uuid::Uuid;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn dt(day: u32, h: u32, m: u32) -> NaiveDateTime {
    date(day).and_hms_opt(h, m, 0).unwrap()
}

fn days(list: &[Weekday]) -> HashSet<Weekday> {
    list.iter().copied().collect()
}

/// Monday and Tuesday, 9:00-12:00, 30-minute slots → 6 slots per day.
fn short_rule() -> AvailabilityRule {
    AvailabilityRule::create(
        Uuid::new_v4(),
        true,
        days(&[Weekday::Mon, Weekday::Tue]),
        TimeRange::new(time(9, 0), time(12, 0)).unwrap(),
        SlotConfiguration::new(30, 0).unwrap(),
    )
    .unwrap()
}

fn appointment(start: NaiveDateTime, duration: u32) -> Appointment {
    Appointment::create(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        start,
        duration,
        None,
        None,
        dt(1, 8, 0),
    )
    .unwrap()
}

// ── Expansion ───────────────────────────────────────────────────────────────

#[test]
fn planning_concatenates_days_in_chronological_order() {
    let contractor = Uuid::new_v4();
    // Window: Mon 16th through Tue 17th; everything in the future.
    let planning = generate_planning(
        contractor,
        &short_rule(),
        &[],
        &[],
        date(16),
        date(17),
        dt(1, 8, 0),
    );

    assert_eq!(planning.slots.len(), 12);
    assert!(planning
        .slots
        .windows(2)
        .all(|pair| pair[0].time_slot.start() <= pair[1].time_slot.start()));
    assert_eq!(planning.slots[0].time_slot.start(), dt(16, 9, 0));
    assert_eq!(planning.slots[11].time_slot.start(), dt(17, 11, 30));
    assert!(planning.slots.iter().all(|s| s.contractor_id == contractor));
}

#[test]
fn non_working_days_contribute_no_slots() {
    // Wednesday 18th is not selected; the window still spans it.
    let planning = generate_planning(
        Uuid::new_v4(),
        &short_rule(),
        &[],
        &[],
        date(16),
        date(18),
        dt(1, 8, 0),
    );
    assert_eq!(planning.slots.len(), 12);
}

#[test]
fn inactive_rule_or_inverted_range_yields_an_empty_planning() {
    let inactive = short_rule().deactivated();
    let planning = generate_planning(
        Uuid::new_v4(),
        &inactive,
        &[],
        &[],
        date(16),
        date(17),
        dt(1, 8, 0),
    );
    assert!(planning.slots.is_empty());
    assert_eq!(planning.metadata.total_slots, 0);
    assert_eq!(planning.metadata.next_available, None);

    let inverted = generate_planning(
        Uuid::new_v4(),
        &short_rule(),
        &[],
        &[],
        date(17),
        date(16),
        dt(1, 8, 0),
    );
    assert!(inverted.slots.is_empty());
}

// ── Classification priority ─────────────────────────────────────────────────

#[test]
fn statuses_follow_past_unavailable_booked_available_priority() {
    let booked = appointment(dt(16, 9, 30), 30);
    let absence = UnavailabilityRule::create(
        Uuid::new_v4(),
        date(16),
        date(16),
        Some(TimeRange::new(time(10, 30), time(11, 0)).unwrap()),
        None,
        dt(1, 8, 0),
    )
    .unwrap();

    // "now" is Monday 9:15: the 9:00 slot has already started.
    let slots = generate_slots(
        Uuid::new_v4(),
        &short_rule(),
        &[absence],
        &[booked],
        date(16),
        date(16),
        dt(16, 9, 15),
    );

    // Absence blocking is inclusive: slots touching the 10:30-11:00 window
    // on either side are blocked too.
    let statuses: Vec<_> = slots.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            AvailabilityStatus::Past,        // 9:00 — already started
            AvailabilityStatus::Booked,      // 9:30 — active appointment
            AvailabilityStatus::Unavailable, // 10:00 — ends at the window start
            AvailabilityStatus::Unavailable, // 10:30 — inside the window
            AvailabilityStatus::Unavailable, // 11:00 — starts at the window end
            AvailabilityStatus::Available,   // 11:30
        ]
    );
}

#[test]
fn past_wins_over_unavailable_and_booked() {
    let booked = appointment(dt(16, 9, 0), 30);
    let all_day =
        UnavailabilityRule::single_day(Uuid::new_v4(), date(16), None, dt(1, 8, 0)).unwrap();

    // Everything on the 16th is in the past from the 17th onward.
    let slots = generate_slots(
        Uuid::new_v4(),
        &short_rule(),
        &[all_day],
        &[booked],
        date(16),
        date(16),
        dt(17, 0, 0),
    );

    assert!(slots.iter().all(|s| s.status == AvailabilityStatus::Past));
}

#[test]
fn cancelled_appointments_leave_the_slot_available() {
    let cancelled = appointment(dt(16, 9, 0), 30).cancel("freed", dt(1, 8, 0)).unwrap();

    let slots = generate_slots(
        Uuid::new_v4(),
        &short_rule(),
        &[],
        &[cancelled],
        date(16),
        date(16),
        dt(1, 8, 0),
    );
    assert_eq!(slots[0].status, AvailabilityStatus::Available);
}

#[test]
fn breaks_are_excluded_before_classification() {
    let rule = short_rule()
        .with_break_time(BreakTime::every_day(
            TimeRange::new(time(10, 0), time(11, 0)).unwrap(),
        ))
        .unwrap();

    let slots = generate_slots(Uuid::new_v4(), &rule, &[], &[], date(16), date(16), dt(1, 8, 0));

    // 6 grid cells minus the two covered by the break.
    assert_eq!(slots.len(), 4);
    assert!(slots
        .iter()
        .all(|s| s.time_slot.start().time() != time(10, 0) && s.time_slot.start().time() != time(10, 30)));
}

// ── Metadata ────────────────────────────────────────────────────────────────

#[test]
fn metadata_counts_match_the_slot_list() {
    let booked = appointment(dt(16, 9, 30), 30);
    let absence = UnavailabilityRule::create(
        Uuid::new_v4(),
        date(16),
        date(16),
        Some(TimeRange::new(time(10, 30), time(11, 0)).unwrap()),
        None,
        dt(1, 8, 0),
    )
    .unwrap();

    let planning = generate_planning(
        Uuid::new_v4(),
        &short_rule(),
        &[absence],
        &[booked],
        date(16),
        date(16),
        dt(16, 9, 15),
    );

    let meta = &planning.metadata;
    assert_eq!(meta.total_slots, 6);
    assert_eq!(meta.available_count, 1);
    assert_eq!(meta.booked_count, 1);
    assert_eq!(meta.unavailable_count, 3);
    assert_eq!(meta.generated_at, dt(16, 9, 15));

    assert_eq!(planning.count_by_status(AvailabilityStatus::Past), 1);
    assert_eq!(planning.available_slots().len(), 1);
    assert_eq!(planning.booked_slots().len(), 1);
}

#[test]
fn next_available_is_the_earliest_future_available_slot() {
    let booked = appointment(dt(16, 9, 30), 30);

    let planning = generate_planning(
        Uuid::new_v4(),
        &short_rule(),
        &[],
        &[booked],
        date(16),
        date(16),
        dt(16, 9, 15),
    );

    // 9:00 is past, 9:30 is booked → next available is 10:00.
    let next = planning.metadata.next_available.unwrap();
    assert_eq!(next.start(), dt(16, 10, 0));
}

#[test]
fn next_available_is_none_when_everything_is_taken() {
    let all_day =
        UnavailabilityRule::single_day(Uuid::new_v4(), date(16), None, dt(1, 8, 0)).unwrap();

    let planning = generate_planning(
        Uuid::new_v4(),
        &short_rule(),
        &[all_day],
        &[],
        date(16),
        date(16),
        dt(1, 8, 0),
    );
    assert_eq!(planning.metadata.next_available, None);
    assert!(!planning.metadata.has_availability());
}

#[test]
fn metadata_rates_derive_from_the_counts() {
    let booked = appointment(dt(16, 9, 0), 30);

    let planning = generate_planning(
        Uuid::new_v4(),
        &short_rule(),
        &[],
        &[booked],
        date(16),
        date(16),
        dt(1, 8, 0),
    );

    // 6 slots: 1 booked, 5 available.
    let meta = &planning.metadata;
    assert!((meta.availability_rate() - 5.0 / 6.0 * 100.0).abs() < 1e-9);
    assert!((meta.occupancy_rate() - 1.0 / 6.0 * 100.0).abs() < 1e-9);
    assert!(meta.has_availability());
}

// ── Serialization ───────────────────────────────────────────────────────────

#[test]
fn planning_serializes_for_the_transport_layer() {
    let planning = generate_planning(
        Uuid::new_v4(),
        &short_rule(),
        &[],
        &[],
        date(16),
        date(16),
        dt(1, 8, 0),
    );

    let json = serde_json::to_value(&planning).unwrap();
    assert_eq!(json["metadata"]["total_slots"], 6);
    assert_eq!(json["slots"][0]["status"], "Available");
}
