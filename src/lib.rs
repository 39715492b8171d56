// Budget Tracker - Core Library
// Ledger, category budgets, monthly aggregation and calendar tiers over a
// local key-value store. Used by the CLI and the terminal UI.

pub mod error;
pub mod models;
pub mod storage;      // Persistence gateway (SQLite / in-memory)
pub mod ledger;
pub mod registry;     // Categories + budget limits
pub mod aggregation;  // Totals, per-category, per-day, utilization
pub mod alerts;
pub mod calendar;
pub mod export;
pub mod tracker;

// Re-export commonly used types
pub use error::{CorruptStorage, LoadError, Result, StorageError, TrackerError, ValidationError};
pub use models::{
    CalendarLimits, DisplaySettings, Theme, Transaction, TransactionType,
    DEFAULT_CATEGORIES, DEFAULT_CURRENCY,
};
pub use storage::{BatchEntry, KeyValueStore, MemoryStore, SqliteStore, Storage, StorageKey, WriteBatch};
pub use ledger::Ledger;
pub use registry::{BudgetMap, Registry};
pub use aggregation::{
    budget_utilization, daily_expense_totals, expense_by_category,
    monthly_expense_by_category, totals, BudgetUsage, Totals,
};
pub use alerts::{budget_alerts, classify, AlertLevel, BudgetAlert};
pub use calendar::{colorize, day_details, CalendarDay, CalendarMonth, DayDetails, MonthCursor, SpendTier};
pub use export::{to_csv_string, write_csv};
pub use tracker::Tracker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
