//! Budget window arithmetic.
//!
//! A budget recurs from its start date: window `k` is
//! `[start + k * period, start + (k + 1) * period)`. Every boundary is
//! computed from `start` rather than from the previous boundary, so
//! end-of-month clamping never drifts (Jan 31, Feb 28, Mar 31, ...).

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::Serialize;

use super::BudgetPeriod;

/// Half-open interval `[start, end)` that spending is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BudgetWindow {
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

fn boundary(period: BudgetPeriod, start: DateTime<Utc>, k: u32) -> Option<DateTime<Utc>> {
    match period {
        BudgetPeriod::Weekly => start.checked_add_signed(Duration::weeks(i64::from(k))),
        BudgetPeriod::Monthly => start.checked_add_months(Months::new(k)),
        BudgetPeriod::Yearly => start.checked_add_months(Months::new(k.checked_mul(12)?)),
    }
}

/// First guess for the window index; corrected by the caller.
fn estimate_index(period: BudgetPeriod, start: DateTime<Utc>, at: DateTime<Utc>) -> u32 {
    let steps = match period {
        BudgetPeriod::Weekly => (at - start).num_weeks(),
        BudgetPeriod::Monthly | BudgetPeriod::Yearly => {
            let months = i64::from(at.year() - start.year()) * 12 + i64::from(at.month())
                - i64::from(start.month());
            if period == BudgetPeriod::Yearly {
                months / 12
            } else {
                months
            }
        }
    };
    u32::try_from(steps.max(0)).unwrap_or(u32::MAX)
}

/// Returns the window containing `at`.
///
/// `at` is clamped into the budget's own range first, so asking before the
/// start yields the first window and asking after the end yields the last
/// one. The window end never extends past the budget end date.
#[must_use]
pub fn current_window(
    period: BudgetPeriod,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    at: DateTime<Utc>,
) -> BudgetWindow {
    let mut reference = at.max(start);
    if let Some(end) = end {
        reference = reference.min(end);
    }

    let mut k = estimate_index(period, start, reference);
    while k > 0 && boundary(period, start, k).is_none_or(|b| b > reference) {
        k -= 1;
    }
    while boundary(period, start, k.saturating_add(1)).is_some_and(|b| b <= reference) {
        k += 1;
    }

    // An end date that sits exactly on a boundary would otherwise select an
    // empty trailing window.
    if let Some(end) = end {
        while k > 0 && boundary(period, start, k).is_none_or(|b| b >= end) {
            k -= 1;
        }
    }

    let window_start = boundary(period, start, k).unwrap_or(start);
    let mut window_end =
        boundary(period, start, k.saturating_add(1)).unwrap_or(DateTime::<Utc>::MAX_UTC);
    if let Some(end) = end {
        window_end = window_end.min(end);
    }

    BudgetWindow {
        start: window_start,
        end: window_end,
    }
}
