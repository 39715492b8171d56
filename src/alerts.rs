// 🚦 Alert Classifier - budget utilization to severity tier

use crate::aggregation::{budget_utilization, BudgetUsage};
use crate::models::Transaction;
use crate::registry::BudgetMap;
use serde::Serialize;

/// Spend ratio at which a budget is flagged as close to its limit.
pub const NEAR_LIMIT_RATIO: f64 = 0.8;

/// Spend ratio at which a budget is flagged as exceeded.
pub const EXCEEDED_RATIO: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertLevel {
    OnTrack,
    NearLimit,
    Exceeded,
}

impl AlertLevel {
    /// Lower bounds are inclusive: 0.8 is already `NearLimit`, 1.0 is
    /// already `Exceeded`.
    pub fn classify(ratio: f64) -> AlertLevel {
        if ratio >= EXCEEDED_RATIO {
            AlertLevel::Exceeded
        } else if ratio >= NEAR_LIMIT_RATIO {
            AlertLevel::NearLimit
        } else {
            AlertLevel::OnTrack
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertLevel::OnTrack => "On track",
            AlertLevel::NearLimit => "Near limit",
            AlertLevel::Exceeded => "Budget exceeded",
        }
    }
}

/// Free-function form of [`AlertLevel::classify`].
pub fn classify(ratio: f64) -> AlertLevel {
    AlertLevel::classify(ratio)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub usage: BudgetUsage,
    pub level: AlertLevel,
}

impl BudgetAlert {
    pub fn percent(&self) -> f64 {
        self.usage.ratio * 100.0
    }
}

/// Utilization rows for the month with their alert level, highest usage first.
/// Empty when no budgets are set.
pub fn budget_alerts(transactions: &[Transaction], budgets: &BudgetMap, year: i32, month: u32) -> Vec<BudgetAlert> {
    budget_utilization(transactions, budgets, year, month)
        .into_iter()
        .map(|usage| BudgetAlert {
            level: AlertLevel::classify(usage.ratio),
            usage,
        })
        .collect()
}
