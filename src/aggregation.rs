// 📊 Aggregation Engine - derived figures over a ledger snapshot
//
// Every function here is pure: it reads transactions (and budgets) and
// returns new values. Amounts go through `Transaction::effective_amount`, so
// a bad amount read from storage contributes 0.

use crate::models::Transaction;
use crate::registry::BudgetMap;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// TOTALS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Income and expense across the whole ledger; `balance = income - expense`.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let (income, expense) = transactions.iter().fold((0.0, 0.0), |(inc, exp), tx| {
        if tx.is_income() {
            (inc + tx.effective_amount(), exp)
        } else {
            (inc, exp + tx.effective_amount())
        }
    });

    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

// ============================================================================
// CATEGORY / DAY BREAKDOWNS
// ============================================================================

fn month_expenses(transactions: &[Transaction], year: i32, month: u32) -> impl Iterator<Item = &Transaction> {
    transactions
        .iter()
        .filter(move |tx| tx.is_expense() && tx.in_month(year, month))
}

/// Expense total per category for one local calendar month (`month` 1-12).
pub fn monthly_expense_by_category(
    transactions: &[Transaction],
    year: i32,
    month: u32,
) -> BTreeMap<String, f64> {
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    for tx in month_expenses(transactions, year, month) {
        *by_category.entry(tx.category.clone()).or_insert(0.0) += tx.effective_amount();
    }
    debug!(year, month, categories = by_category.len(), "monthly expense by category");
    by_category
}

/// Expense total per category over the whole ledger. Feeds the spending chart.
pub fn expense_by_category(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        *by_category.entry(tx.category.clone()).or_insert(0.0) += tx.effective_amount();
    }
    by_category
}

/// Expense total per day-of-month (1-31) for one local calendar month.
/// Days without expenses are absent.
pub fn daily_expense_totals(transactions: &[Transaction], year: i32, month: u32) -> BTreeMap<u32, f64> {
    let mut by_day: BTreeMap<u32, f64> = BTreeMap::new();
    for tx in month_expenses(transactions, year, month) {
        *by_day.entry(tx.local_date().day()).or_insert(0.0) += tx.effective_amount();
    }
    debug!(year, month, days = by_day.len(), "daily expense totals");
    by_day
}

/// Expense transactions of one local calendar day, in ledger order.
pub fn expenses_on(transactions: &[Transaction], date: NaiveDate) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.is_expense() && tx.local_date() == date)
        .collect()
}

// ============================================================================
// BUDGET UTILIZATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub category: String,
    pub spent: f64,
    pub limit: f64,
    pub ratio: f64,
}

/// One row per budget entry, ranked by `spent / limit` descending.
///
/// The sort is stable, so equal ratios keep budget map order. A limit that is
/// not positive (only possible from corrupt storage) yields ratio 0.
pub fn budget_utilization(
    transactions: &[Transaction],
    budgets: &BudgetMap,
    year: i32,
    month: u32,
) -> Vec<BudgetUsage> {
    let spent_by_category = monthly_expense_by_category(transactions, year, month);

    let mut rows: Vec<BudgetUsage> = budgets
        .iter()
        .map(|(category, limit)| {
            let spent = spent_by_category.get(category).copied().unwrap_or(0.0);
            let ratio = if limit.is_finite() && limit > 0.0 {
                spent / limit
            } else {
                0.0
            };
            BudgetUsage {
                category: category.to_string(),
                spent,
                limit,
                ratio,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    rows
}
