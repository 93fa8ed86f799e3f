//! Date-range unavailability overrides — vacations, sick days, appointments
//! elsewhere. These block time that the weekly template would otherwise offer.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::slot::{TimeRange, TimeSlot};

/// The exact period a contractor is unavailable.
///
/// `hours = None` makes the period a full-day block for every date in
/// `[start_date, end_date]`; `Some(range)` blocks only that time window on
/// each of those days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnavailabilityPeriod {
    start_date: NaiveDate,
    end_date: NaiveDate,
    hours: Option<TimeRange>,
}

impl UnavailabilityPeriod {
    /// # Errors
    /// Returns [`ValidationError::InvertedDateRange`] when `end_date` is
    /// before `start_date`. (An inverted time window is already impossible:
    /// [`TimeRange`] validates it.)
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        hours: Option<TimeRange>,
    ) -> Result<Self, ValidationError> {
        if end_date < start_date {
            return Err(ValidationError::InvertedDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
            hours,
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn hours(&self) -> Option<&TimeRange> {
        self.hours.as_ref()
    }

    pub fn is_full_day(&self) -> bool {
        self.hours.is_none()
    }

    /// Whether a specific instant falls inside the unavailability.
    pub fn contains(&self, date_time: NaiveDateTime) -> bool {
        let date = date_time.date();
        if date < self.start_date || date > self.end_date {
            return false;
        }
        match &self.hours {
            None => true,
            Some(range) => range.contains(date_time.time()),
        }
    }

    /// Whether the period collides with a `[slot_start, slot_end]` interval.
    ///
    /// A full-day period blocks any slot touching one of its dates. A
    /// time-bounded period contributes one concrete sub-interval per date in
    /// range, and the slot is blocked if it intersects any of them. The
    /// comparison is inclusive (not-after / not-before), matching the
    /// conservative blocking stance of an absence: a slot merely touching the
    /// boundary of a declared absence is rejected.
    pub fn overlaps_slot(&self, slot_start: NaiveDateTime, slot_end: NaiveDateTime) -> bool {
        if slot_end.date() < self.start_date || slot_start.date() > self.end_date {
            return false;
        }

        let Some(range) = &self.hours else {
            // Full-day: the date check above already established contact.
            return true;
        };

        let mut date = self.start_date;
        while date <= self.end_date {
            let period_start = date.and_time(range.start());
            let period_end = date.and_time(range.end());
            if slot_end >= period_start && slot_start <= period_end {
                return true;
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        false
    }
}

/// A declared absence for one contractor: a period plus an optional reason.
///
/// Created standalone (not owned by the availability rule) and queried by
/// contractor and date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailabilityRule {
    id: Uuid,
    contractor_id: Uuid,
    period: UnavailabilityPeriod,
    reason: Option<String>,
    created_at: NaiveDateTime,
}

impl UnavailabilityRule {
    /// Creates a rule with a fresh id.
    ///
    /// # Errors
    /// Propagates period validation failures.
    pub fn create(
        contractor_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        hours: Option<TimeRange>,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::new_v4(),
            contractor_id,
            period: UnavailabilityPeriod::new(start_date, end_date, hours)?,
            reason,
            created_at: now,
        })
    }

    /// Full-day block for every date in `[start_date, end_date]`.
    pub fn full_day(
        contractor_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        Self::create(contractor_id, start_date, end_date, None, reason, now)
    }

    /// Full-day block for a single date.
    pub fn single_day(
        contractor_id: Uuid,
        date: NaiveDate,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        Self::full_day(contractor_id, date, date, reason, now)
    }

    /// Reconstitutes a rule from stored state.
    pub fn new(
        id: Uuid,
        contractor_id: Uuid,
        period: UnavailabilityPeriod,
        reason: Option<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            contractor_id,
            period,
            reason,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn contractor_id(&self) -> Uuid {
        self.contractor_id
    }

    pub fn period(&self) -> &UnavailabilityPeriod {
        &self.period
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn is_full_day(&self) -> bool {
        self.period.is_full_day()
    }

    /// Whether the rule covers the given date at all.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.period.start_date() && date <= self.period.end_date()
    }

    pub fn blocks_date_time(&self, date_time: NaiveDateTime) -> bool {
        self.period.contains(date_time)
    }

    pub fn blocks_time_slot(&self, slot: &TimeSlot) -> bool {
        self.period.overlaps_slot(slot.start(), slot.end())
    }

    /// Raw-interval variant of [`UnavailabilityRule::blocks_time_slot`], used
    /// by the booking gates before any slot value exists.
    pub fn blocks_interval(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.period.overlaps_slot(start, end)
    }

    pub fn is_future(&self, today: NaiveDate) -> bool {
        self.period.start_date() > today
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.period.end_date() < today
    }

    pub fn is_currently_active(&self, today: NaiveDate) -> bool {
        self.is_active_on(today)
    }

    /// Returns a copy of this rule with a later end date.
    ///
    /// # Errors
    /// Returns [`ValidationError::ShortenedUnavailability`] when the new end
    /// date is before the current one.
    pub fn extend_period(&self, new_end_date: NaiveDate) -> Result<Self, ValidationError> {
        if new_end_date < self.period.end_date() {
            return Err(ValidationError::ShortenedUnavailability {
                current: self.period.end_date(),
                proposed: new_end_date,
            });
        }
        Ok(Self {
            id: self.id,
            contractor_id: self.contractor_id,
            period: UnavailabilityPeriod::new(
                self.period.start_date(),
                new_end_date,
                self.period.hours().copied(),
            )?,
            reason: self.reason.clone(),
            created_at: self.created_at,
        })
    }
}
