//! Calendar bucket planning
//!
//! Turns a date range and a unit into contiguous half-open buckets. Both
//! endpoints are truncated to the unit boundary first; the plan then runs
//! from the truncated start through the bucket containing the end date.

use chrono::{Datelike, Days, Months, NaiveDate};

use super::error::ValidationError;
use super::types::{Bucket, BucketPlan, BucketUnit, DateRange, WeekAnchor};

#[derive(Debug, Clone, Copy)]
pub struct DateBucketPlanner {
    week_anchor: WeekAnchor,
    max_buckets: usize,
}

impl DateBucketPlanner {
    pub fn new(week_anchor: WeekAnchor, max_buckets: usize) -> Self {
        Self {
            week_anchor,
            max_buckets,
        }
    }

    pub fn plan(&self, range: DateRange, unit: BucketUnit) -> Result<BucketPlan, ValidationError> {
        let DateRange { start, end } = range;
        let invalid = || ValidationError::InvalidRange { start, end };

        if start > end {
            return Err(invalid());
        }

        let (first, last) = match (unit, self.week_anchor) {
            (BucketUnit::Week, WeekAnchor::RangeStart) => {
                let whole_weeks = (end - start).num_days() / 7;
                let last = start
                    .checked_add_days(Days::new(whole_weeks as u64 * 7))
                    .ok_or_else(invalid)?;
                (start, last)
            }
            _ => (
                truncate(start, unit).ok_or_else(invalid)?,
                truncate(end, unit).ok_or_else(invalid)?,
            ),
        };

        let mut buckets = Vec::new();
        let mut cur = first;
        while cur <= last {
            if buckets.len() == self.max_buckets {
                return Err(ValidationError::RangeTooLarge {
                    buckets: estimate_count(first, last, unit),
                    max: self.max_buckets,
                });
            }
            let next = advance(cur, unit).ok_or_else(invalid)?;
            buckets.push(Bucket {
                start: cur,
                end: next,
            });
            cur = next;
        }

        Ok(BucketPlan { unit, buckets })
    }
}

/// Start of the unit containing `date` (ISO Monday for weeks)
fn truncate(date: NaiveDate, unit: BucketUnit) -> Option<NaiveDate> {
    match unit {
        BucketUnit::Day => Some(date),
        BucketUnit::Week => {
            date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
        }
        BucketUnit::Month => date.with_day(1),
        BucketUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    }
}

fn advance(date: NaiveDate, unit: BucketUnit) -> Option<NaiveDate> {
    match unit {
        BucketUnit::Day => date.checked_add_days(Days::new(1)),
        BucketUnit::Week => date.checked_add_days(Days::new(7)),
        BucketUnit::Month => date.checked_add_months(Months::new(1)),
        BucketUnit::Year => date.checked_add_months(Months::new(12)),
    }
}

/// Bucket count between two unit-aligned dates, inclusive
fn estimate_count(first: NaiveDate, last: NaiveDate, unit: BucketUnit) -> usize {
    let months = |a: NaiveDate, b: NaiveDate| {
        (b.year() - a.year()) as i64 * 12 + b.month() as i64 - a.month() as i64
    };
    let steps = match unit {
        BucketUnit::Day => (last - first).num_days(),
        BucketUnit::Week => (last - first).num_days() / 7,
        BucketUnit::Month => months(first, last),
        BucketUnit::Year => (last.year() - first.year()) as i64,
    };
    steps.max(0) as usize + 1
}
