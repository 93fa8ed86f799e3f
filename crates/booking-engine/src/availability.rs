//! Weekly availability template — the recurrence rule that turns a calendar
//! date into raw candidate slots.
//!
//! An [`AvailabilityRule`] owns its [`BreakTime`]s and is immutable: every
//! mutation returns a new rule (or a [`ValidationError`]), so a planner can
//! hold a snapshot without worrying about hidden state changes.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::slot::{SlotConfiguration, TimeRange, TimeSlot};

/// A recurring break inside the working hours.
///
/// `week_days = None` means the break applies to every day the owning rule is
/// active; `Some(days)` restricts it to those days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakTime {
    time_range: TimeRange,
    week_days: Option<HashSet<Weekday>>,
}

impl BreakTime {
    /// # Errors
    /// Returns [`ValidationError::EmptyWeekDays`] when a weekday set is given
    /// but empty.
    pub fn new(
        time_range: TimeRange,
        week_days: Option<HashSet<Weekday>>,
    ) -> Result<Self, ValidationError> {
        if let Some(days) = &week_days {
            if days.is_empty() {
                return Err(ValidationError::EmptyWeekDays);
            }
        }
        Ok(Self {
            time_range,
            week_days,
        })
    }

    /// A break with no weekday restriction.
    pub fn every_day(time_range: TimeRange) -> Self {
        Self {
            time_range,
            week_days: None,
        }
    }

    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    pub fn week_days(&self) -> Option<&HashSet<Weekday>> {
        self.week_days.as_ref()
    }

    pub fn applies_to(&self, day: Weekday) -> bool {
        match &self.week_days {
            None => true,
            Some(days) => days.contains(&day),
        }
    }

    /// Whether a candidate slot collides with this break on the slot's day.
    ///
    /// Compared on time-of-day with half-open semantics: a slot ending when
    /// the break starts is not a collision.
    pub fn overlaps_slot(&self, slot_start: NaiveDateTime, slot_end: NaiveDateTime) -> bool {
        if !self.applies_to(slot_start.weekday()) {
            return false;
        }
        slot_start.time() < self.time_range.end() && slot_end.time() > self.time_range.start()
    }
}

/// Weekly recurrence template for one contractor: selected weekdays, working
/// hours, slot cadence, and owned breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRule {
    id: Uuid,
    contractor_id: Uuid,
    week_days: HashSet<Weekday>,
    time_range: TimeRange,
    slot_config: SlotConfiguration,
    break_times: Vec<BreakTime>,
    active: bool,
}

impl AvailabilityRule {
    /// Creates a fresh, active rule with no breaks.
    ///
    /// `contractor_active` is the contractor's status at creation time; an
    /// inactive contractor cannot define availability.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] for an empty weekday set, an inactive
    /// contractor, or a working range too short to fit one slot.
    pub fn create(
        contractor_id: Uuid,
        contractor_active: bool,
        week_days: HashSet<Weekday>,
        time_range: TimeRange,
        slot_config: SlotConfiguration,
    ) -> Result<Self, ValidationError> {
        Self::new(
            Uuid::new_v4(),
            contractor_id,
            contractor_active,
            week_days,
            time_range,
            slot_config,
            Vec::new(),
            true,
        )
    }

    /// Reconstitutes a rule from stored state, re-running all invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        contractor_id: Uuid,
        contractor_active: bool,
        week_days: HashSet<Weekday>,
        time_range: TimeRange,
        slot_config: SlotConfiguration,
        break_times: Vec<BreakTime>,
        active: bool,
    ) -> Result<Self, ValidationError> {
        if week_days.is_empty() {
            return Err(ValidationError::EmptyWeekDays);
        }
        if !contractor_active {
            return Err(ValidationError::ContractorInactive);
        }
        Self::check_range_fits_slot(&time_range, &slot_config)?;

        Ok(Self {
            id,
            contractor_id,
            week_days,
            time_range,
            slot_config,
            break_times,
            active,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn contractor_id(&self) -> Uuid {
        self.contractor_id
    }

    pub fn week_days(&self) -> &HashSet<Weekday> {
        &self.week_days
    }

    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    pub fn slot_config(&self) -> &SlotConfiguration {
        &self.slot_config
    }

    pub fn break_times(&self) -> &[BreakTime] {
        &self.break_times
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Replaces the weekday set and working hours.
    ///
    /// # Errors
    /// Rejects an empty weekday set or a new range too short for the current
    /// slot duration.
    pub fn with_schedule(
        self,
        week_days: HashSet<Weekday>,
        time_range: TimeRange,
    ) -> Result<Self, ValidationError> {
        if week_days.is_empty() {
            return Err(ValidationError::EmptyWeekDays);
        }
        Self::check_range_fits_slot(&time_range, &self.slot_config)?;
        Ok(Self {
            week_days,
            time_range,
            ..self
        })
    }

    /// Replaces the slot cadence.
    ///
    /// # Errors
    /// Rejects a configuration whose slot no longer fits the working range.
    pub fn with_slot_config(self, slot_config: SlotConfiguration) -> Result<Self, ValidationError> {
        Self::check_range_fits_slot(&self.time_range, &slot_config)?;
        Ok(Self {
            slot_config,
            ..self
        })
    }

    /// Adds a break, keeping the break invariants.
    ///
    /// # Errors
    /// Rejects a break outside the working hours or overlapping a sibling
    /// break (sharing only a boundary is allowed).
    pub fn with_break_time(mut self, break_time: BreakTime) -> Result<Self, ValidationError> {
        if break_time.time_range().start() < self.time_range.start()
            || break_time.time_range().end() > self.time_range.end()
        {
            return Err(ValidationError::BreakOutsideWorkingHours);
        }
        if self
            .break_times
            .iter()
            .any(|existing| existing.time_range().overlaps(break_time.time_range()))
        {
            return Err(ValidationError::BreakOverlapsExisting);
        }
        self.break_times.push(break_time);
        Ok(self)
    }

    /// Removes any break equal to the given one.
    pub fn without_break_time(mut self, break_time: &BreakTime) -> Self {
        self.break_times.retain(|existing| existing != break_time);
        self
    }

    pub fn without_break_times(mut self) -> Self {
        self.break_times.clear();
        self
    }

    pub fn activated(self) -> Self {
        Self {
            active: true,
            ..self
        }
    }

    pub fn deactivated(self) -> Self {
        Self {
            active: false,
            ..self
        }
    }

    /// Whether the rule produces slots on the given weekday. Always false for
    /// a deactivated rule.
    pub fn applies_to(&self, day: Weekday) -> bool {
        self.active && self.week_days.contains(&day)
    }

    pub fn is_within_time_range(&self, time: NaiveTime) -> bool {
        self.time_range.contains(time)
    }

    /// Expands the rule into raw candidate slots for one calendar date.
    ///
    /// Returns an empty list when the rule is inactive or the date's weekday
    /// is not selected. Otherwise walks the working range on the fixed grid
    /// (`total_slot_time` apart, anchored at the range start) and emits every
    /// slot that ends at or before the range end — except slots colliding
    /// with an applicable break, which are skipped. The grid keeps advancing
    /// through skipped slots, so breaks never shift later start times.
    pub fn generate_slots_for_date(&self, date: NaiveDate) -> Vec<TimeSlot> {
        if !self.applies_to(date.weekday()) {
            return Vec::new();
        }

        let slot_duration = Duration::minutes(i64::from(self.slot_config.slot_duration()));
        let grid_step = Duration::minutes(i64::from(self.slot_config.total_slot_time()));
        let day_end = date.and_time(self.time_range.end());

        let mut slots = Vec::new();
        let mut current_start = date.and_time(self.time_range.start());

        while current_start + slot_duration <= day_end {
            let slot_end = current_start + slot_duration;

            let during_break = self
                .break_times
                .iter()
                .any(|bt| bt.overlaps_slot(current_start, slot_end));

            if !during_break {
                slots.push(TimeSlot::new_unchecked(
                    current_start,
                    self.slot_config.slot_duration(),
                ));
            }

            current_start += grid_step;
        }

        slots
    }

    fn check_range_fits_slot(
        time_range: &TimeRange,
        slot_config: &SlotConfiguration,
    ) -> Result<(), ValidationError> {
        let range_minutes = time_range.duration_minutes();
        if range_minutes < i64::from(slot_config.slot_duration()) {
            return Err(ValidationError::RangeTooShortForSlot {
                range_minutes,
                slot_duration: slot_config.slot_duration(),
            });
        }
        Ok(())
    }
}
