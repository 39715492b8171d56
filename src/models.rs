// Core records: transactions, calendar thresholds, display settings
// Transactions are immutable values; the ledger only appends and removes them.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// DEFAULTS
// ============================================================================

/// Categories a fresh registry starts with (and returns to on reset).
pub const DEFAULT_CATEGORIES: [&str; 9] = [
    "Food",
    "Rent",
    "Travel",
    "Shopping",
    "Salary",
    "Entertainment",
    "Health",
    "Education",
    "Subscriptions",
];

pub const DEFAULT_CURRENCY: &str = "₹";

pub const DEFAULT_LOW_LIMIT: f64 = 500.0;
pub const DEFAULT_MEDIUM_LIMIT: f64 = 1500.0;

pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

// ============================================================================
// TRANSACTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// One ledger record.
///
/// `id` is the creation time in epoch milliseconds (bumped on collision) and
/// never changes. `category` is a plain name: deleting the category from the
/// registry leaves this field untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// Amount as it enters aggregates. Records read back from storage may
    /// carry a non-finite or non-positive amount; those count as 0.
    pub fn effective_amount(&self) -> f64 {
        if self.amount.is_finite() && self.amount > 0.0 {
            self.amount
        } else {
            0.0
        }
    }

    /// Calendar date of the transaction in the local time zone.
    pub fn local_date(&self) -> NaiveDate {
        self.date.with_timezone(&Local).date_naive()
    }

    /// True when the local calendar date falls in `year`/`month` (1-based).
    pub fn in_month(&self, year: i32, month: u32) -> bool {
        let date = self.local_date();
        date.year() == year && date.month() == month
    }
}

// ============================================================================
// CALENDAR THRESHOLDS
// ============================================================================

/// Per-day spend thresholds for the calendar colorizer. Independent from the
/// per-category budgets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarLimits {
    pub low: f64,
    pub medium: f64,
}

impl CalendarLimits {
    /// Both finite, both positive, `low < medium`.
    pub fn is_valid(&self) -> bool {
        self.low.is_finite()
            && self.medium.is_finite()
            && self.low > 0.0
            && self.medium > 0.0
            && self.low < self.medium
    }
}

impl Default for CalendarLimits {
    fn default() -> Self {
        CalendarLimits {
            low: DEFAULT_LOW_LIMIT,
            medium: DEFAULT_MEDIUM_LIMIT,
        }
    }
}

// ============================================================================
// DISPLAY SETTINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// Presentational only; nothing here affects aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub currency: String,
    pub theme: Theme,
}

impl DisplaySettings {
    /// Prefix an amount with the currency symbol, shortest numeric form.
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{}", self.currency, amount)
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency: DEFAULT_CURRENCY.to_string(),
            theme: Theme::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(amount: f64) -> Transaction {
        Transaction {
            id: 1,
            description: "Lunch".to_string(),
            amount,
            category: "Food".to_string(),
            kind: TransactionType::Expense,
            date: Local
                .with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_transaction_json_shape() {
        let tx = sample(12.5);
        let value = serde_json::to_value(&tx).unwrap();

        assert_eq!(value["type"], "expense");
        assert_eq!(value["amount"], 12.5);
        assert_eq!(value["category"], "Food");
        assert!(value["date"].is_string());
    }

    #[test]
    fn test_reads_browser_style_record() {
        let raw = r#"{"id":1700000000000,"description":"Pay","amount":2000,
            "category":"Salary","type":"income","date":"2026-03-01T09:30:00.000Z"}"#;
        let tx: Transaction = serde_json::from_str(raw).unwrap();

        assert_eq!(tx.id, 1_700_000_000_000);
        assert!(tx.is_income());
        assert_eq!(tx.amount, 2000.0);
    }

    #[test]
    fn test_effective_amount_ignores_bad_values() {
        assert_eq!(sample(40.0).effective_amount(), 40.0);
        assert_eq!(sample(0.0).effective_amount(), 0.0);
        assert_eq!(sample(-5.0).effective_amount(), 0.0);
        assert_eq!(sample(f64::NAN).effective_amount(), 0.0);
        assert_eq!(sample(f64::INFINITY).effective_amount(), 0.0);
    }

    #[test]
    fn test_in_month_uses_local_calendar() {
        let tx = sample(1.0);
        assert!(tx.in_month(2026, 3));
        assert!(!tx.in_month(2026, 4));
        assert!(!tx.in_month(2025, 3));
    }

    #[test]
    fn test_calendar_limits_validity() {
        assert!(CalendarLimits::default().is_valid());
        assert!(!CalendarLimits { low: 1500.0, medium: 500.0 }.is_valid());
        assert!(!CalendarLimits { low: 500.0, medium: 500.0 }.is_valid());
        assert!(!CalendarLimits { low: 0.0, medium: 500.0 }.is_valid());
        assert!(!CalendarLimits { low: f64::NAN, medium: 500.0 }.is_valid());
    }

    #[test]
    fn test_theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }

    #[test]
    fn test_format_amount() {
        let settings = DisplaySettings::default();
        assert_eq!(settings.format_amount(300.0), "₹300");
        assert_eq!(settings.format_amount(12.5), "₹12.5");
    }
}
