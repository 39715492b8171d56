// 📅 Calendar - day colorizer, month grid, day details
//
// Day tiers use the user's calendar thresholds, not the category budgets.

use crate::aggregation::{daily_expense_totals, expenses_on};
use crate::models::{CalendarLimits, Transaction};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ============================================================================
// COLORIZER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpendTier {
    /// No spending: no marker on the day.
    None,
    Low,
    Medium,
    High,
}

impl SpendTier {
    pub fn label(&self) -> &'static str {
        match self {
            SpendTier::None => "none",
            SpendTier::Low => "low",
            SpendTier::Medium => "medium",
            SpendTier::High => "high",
        }
    }
}

/// Tier of one day's expense total. Upper bounds are inclusive: a total equal
/// to `low` is `Low`, equal to `medium` is `Medium`.
pub fn colorize(day_total: f64, low: f64, medium: f64) -> SpendTier {
    if day_total.is_nan() || day_total <= 0.0 {
        SpendTier::None
    } else if day_total <= low {
        SpendTier::Low
    } else if day_total <= medium {
        SpendTier::Medium
    } else {
        SpendTier::High
    }
}

impl CalendarLimits {
    pub fn tier(&self, day_total: f64) -> SpendTier {
        colorize(day_total, self.low, self.medium)
    }
}

// ============================================================================
// MONTH CURSOR
// ============================================================================

/// A calendar month (`month` is 1-12) that can step forwards and backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    /// `None` unless `month` is 1-12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(MonthCursor { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        MonthCursor {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.trim().split_once('-')?;
        MonthCursor::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            MonthCursor { year: self.year + 1, month: 1 }
        } else {
            MonthCursor { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            MonthCursor { year: self.year - 1, month: 12 }
        } else {
            MonthCursor { year: self.year, month: self.month - 1 }
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(&self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 0,
        }
    }

    /// Blank cells before day 1 in a Monday-first week grid.
    pub fn leading_blanks(&self) -> u32 {
        self.first_day()
            .map(|d| d.weekday().num_days_from_monday())
            .unwrap_or(0)
    }

    /// e.g. "March 2026"
    pub fn title(&self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// MONTH GRID
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub total: f64,
    pub tier: SpendTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMonth {
    pub cursor: MonthCursor,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    pub fn build(cursor: MonthCursor, transactions: &[Transaction], limits: &CalendarLimits) -> Self {
        let totals = daily_expense_totals(transactions, cursor.year, cursor.month);

        let days = (1..=cursor.days_in_month())
            .map(|day| {
                let total = totals.get(&day).copied().unwrap_or(0.0);
                CalendarDay {
                    day,
                    total,
                    tier: limits.tier(total),
                }
            })
            .collect();

        CalendarMonth {
            cursor,
            leading_blanks: cursor.leading_blanks(),
            days,
        }
    }

    pub fn day(&self, day: u32) -> Option<&CalendarDay> {
        self.days.get(day.checked_sub(1)? as usize)
    }

    /// Grid rows of seven cells (Monday first); `None` pads the edges.
    pub fn weeks(&self) -> Vec<Vec<Option<&CalendarDay>>> {
        let mut cells: Vec<Option<&CalendarDay>> = vec![None; self.leading_blanks as usize];
        cells.extend(self.days.iter().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }
        cells.chunks(7).map(|week| week.to_vec()).collect()
    }
}

// ============================================================================
// DAY DETAILS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetails {
    pub date: NaiveDate,
    pub total: f64,
    pub expenses: Vec<Transaction>,
}

/// Expenses recorded on one local calendar day and their total.
pub fn day_details(transactions: &[Transaction], date: NaiveDate) -> DayDetails {
    let expenses: Vec<Transaction> = expenses_on(transactions, date).into_iter().cloned().collect();
    let total = expenses.iter().map(|tx| tx.effective_amount()).sum();

    DayDetails { date, total, expenses }
}
