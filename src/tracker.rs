// Tracker - the single owner of ledger, registry and settings
//
// Every mutation validates against a copy of the touched state, persists the
// copy, and only then replaces the in-memory snapshot, so a failed write
// leaves memory and storage as they were. Reads go straight to the
// aggregation functions over the current snapshot.

use crate::aggregation::{self, BudgetUsage, Totals};
use crate::alerts::{budget_alerts, BudgetAlert};
use crate::calendar::{day_details, CalendarMonth, DayDetails, MonthCursor};
use crate::error::{Result, ValidationError};
use crate::export;
use crate::ledger::Ledger;
use crate::models::{
    default_categories, CalendarLimits, DisplaySettings, Theme, Transaction, TransactionType,
    DEFAULT_CURRENCY,
};
use crate::registry::{BudgetMap, Registry};
use crate::storage::{KeyValueStore, Storage, StorageKey, WriteBatch};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{info, warn};

pub struct Tracker<S: KeyValueStore> {
    storage: Storage<S>,
    ledger: Ledger,
    registry: Registry,
    settings: DisplaySettings,
    limits: CalendarLimits,
}

impl<S: KeyValueStore> Tracker<S> {
    // ========================================================================
    // LOADING
    // ========================================================================

    /// Load every entity from `store`, falling back to defaults for anything
    /// missing or corrupt. Fails if the store itself cannot be read.
    pub fn open(store: S) -> Result<Self> {
        let storage = Storage::new(store);

        let ledger = Ledger::from_transactions(load_transactions(&storage)?);

        let categories = storage.load_or(StorageKey::Categories, default_categories())?;
        let budgets = storage.load_or(StorageKey::Budgets, BudgetMap::new())?;
        let registry = Registry::from_parts(categories, budgets);

        let currency: String = storage.load_or(StorageKey::Currency, DEFAULT_CURRENCY.to_string())?;
        let currency = if currency.trim().is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            currency
        };
        let theme = storage.load_or(StorageKey::Theme, Theme::Light)?;

        let limits = storage.load_or(StorageKey::CalendarLimits, CalendarLimits::default())?;
        let limits = if limits.is_valid() {
            limits
        } else {
            warn!(low = limits.low, medium = limits.medium, "stored calendar limits invalid, using defaults");
            CalendarLimits::default()
        };

        info!(
            transactions = ledger.len(),
            categories = registry.categories().len(),
            budgets = registry.budgets().len(),
            "tracker loaded"
        );

        Ok(Tracker {
            storage,
            ledger,
            registry,
            settings: DisplaySettings { currency, theme },
            limits,
        })
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn into_store(self) -> S {
        self.storage.into_inner()
    }

    // ========================================================================
    // SNAPSHOT
    // ========================================================================

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.list()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn categories(&self) -> &[String] {
        self.registry.categories()
    }

    pub fn budgets(&self) -> &BudgetMap {
        self.registry.budgets()
    }

    pub fn budget_for(&self, category: &str) -> Option<f64> {
        self.registry.budget_for(category)
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn calendar_limits(&self) -> CalendarLimits {
        self.limits
    }

    pub fn recent(&self, limit: usize) -> Vec<&Transaction> {
        self.ledger.recent(limit)
    }

    // ========================================================================
    // LEDGER MUTATIONS
    // ========================================================================

    pub fn add_transaction(
        &mut self,
        description: &str,
        amount: f64,
        category: &str,
        kind: TransactionType,
    ) -> Result<Transaction> {
        self.add_transaction_at(description, amount, category, kind, Utc::now())
    }

    /// Same as `add_transaction` with an explicit creation time.
    pub fn add_transaction_at(
        &mut self,
        description: &str,
        amount: f64,
        category: &str,
        kind: TransactionType,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        let mut ledger = self.ledger.clone();
        let tx = ledger.add_at(description, amount, category, kind, now)?;
        self.commit_ledger(ledger)?;
        info!(id = tx.id, amount = tx.amount, category = %tx.category, kind = %tx.kind, "transaction added");
        Ok(tx)
    }

    /// Remove by id. A missing id is a silent no-op (`Ok(None)`) but the log
    /// is still persisted, so stale views converge on storage.
    pub fn remove_transaction(&mut self, id: i64) -> Result<Option<Transaction>> {
        let mut ledger = self.ledger.clone();
        let removed = ledger.remove(id);
        self.commit_ledger(ledger)?;
        match &removed {
            Some(tx) => info!(id = tx.id, "transaction removed"),
            None => info!(id, "transaction already absent"),
        }
        Ok(removed)
    }

    fn commit_ledger(&mut self, ledger: Ledger) -> Result<()> {
        self.storage.save(StorageKey::Transactions, ledger.list())?;
        self.ledger = ledger;
        Ok(())
    }

    // ========================================================================
    // REGISTRY MUTATIONS
    // ========================================================================

    pub fn add_category(&mut self, name: &str) -> Result<String> {
        let mut registry = self.registry.clone();
        let name = registry.add_category(name)?;
        self.storage.save(StorageKey::Categories, registry.categories())?;
        self.registry = registry;
        info!(category = %name, "category added");
        Ok(name)
    }

    /// Remove the category and its budget. Transactions keep the name.
    /// Both keys are written in one batch.
    pub fn remove_category(&mut self, name: &str) -> Result<()> {
        let mut registry = self.registry.clone();
        let removed = registry.remove_category(name)?;

        let mut batch = WriteBatch::new();
        if removed.budget.is_some() {
            batch = batch.save(StorageKey::Budgets, registry.budgets())?;
        }
        batch = batch.save(StorageKey::Categories, registry.categories())?;
        self.storage.commit(batch)?;

        self.registry = registry;
        info!(category = %removed.name, had_budget = removed.budget.is_some(), "category removed (transactions unchanged)");
        Ok(())
    }

    pub fn set_budget(&mut self, category: &str, amount: f64) -> Result<()> {
        let mut registry = self.registry.clone();
        registry.set_budget(category, amount)?;
        self.storage.save(StorageKey::Budgets, registry.budgets())?;
        self.registry = registry;
        info!(category = category.trim(), limit = amount, "budget set");
        Ok(())
    }

    // ========================================================================
    // SETTINGS MUTATIONS
    // ========================================================================

    pub fn set_calendar_limits(&mut self, low: f64, medium: f64) -> Result<()> {
        let limits = CalendarLimits { low, medium };
        if !limits.is_valid() {
            return Err(ValidationError::InvalidThresholds { low, medium }.into());
        }
        self.storage.save(StorageKey::CalendarLimits, &limits)?;
        self.limits = limits;
        info!(low, medium, "calendar limits set");
        Ok(())
    }

    /// An empty symbol resets to the default one.
    pub fn set_currency(&mut self, symbol: &str) -> Result<()> {
        let symbol = match symbol.trim() {
            "" => DEFAULT_CURRENCY,
            s => s,
        };
        self.storage.save(StorageKey::Currency, symbol)?;
        self.settings.currency = symbol.to_string();
        info!(currency = symbol, "currency set");
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.storage.save(StorageKey::Theme, &theme)?;
        self.settings.theme = theme;
        info!(theme = theme.as_str(), "theme set");
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let next = self.settings.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Clear transactions and budgets, restore default categories. Display
    /// settings and calendar limits are kept.
    pub fn reset(&mut self) -> Result<()> {
        // Transactions last: a store without batch support that fails midway
        // still keeps the ledger
        let batch = WriteBatch::new()
            .remove(StorageKey::Budgets)
            .remove(StorageKey::Categories)
            .remove(StorageKey::Transactions);
        self.storage.commit(batch)?;
        self.ledger.clear();
        self.registry.reset();
        info!("ledger, budgets and categories reset");
        Ok(())
    }

    // ========================================================================
    // AGGREGATION
    // ========================================================================

    pub fn totals(&self) -> Totals {
        aggregation::totals(self.ledger.list())
    }

    pub fn monthly_expense_by_category(&self, year: i32, month: u32) -> BTreeMap<String, f64> {
        aggregation::monthly_expense_by_category(self.ledger.list(), year, month)
    }

    pub fn expense_by_category(&self) -> BTreeMap<String, f64> {
        aggregation::expense_by_category(self.ledger.list())
    }

    pub fn daily_expense_totals(&self, year: i32, month: u32) -> BTreeMap<u32, f64> {
        aggregation::daily_expense_totals(self.ledger.list(), year, month)
    }

    pub fn budget_utilization(&self, year: i32, month: u32) -> Vec<BudgetUsage> {
        aggregation::budget_utilization(self.ledger.list(), self.registry.budgets(), year, month)
    }

    pub fn budget_alerts(&self, year: i32, month: u32) -> Vec<BudgetAlert> {
        budget_alerts(self.ledger.list(), self.registry.budgets(), year, month)
    }

    /// Alerts for the current local month.
    pub fn current_alerts(&self) -> Vec<BudgetAlert> {
        let today = Local::now().date_naive();
        self.budget_alerts(today.year(), today.month())
    }

    pub fn calendar_month(&self, cursor: MonthCursor) -> CalendarMonth {
        CalendarMonth::build(cursor, self.ledger.list(), &self.limits)
    }

    pub fn day_details(&self, date: NaiveDate) -> DayDetails {
        day_details(self.ledger.list(), date)
    }

    // ========================================================================
    // EXPORT
    // ========================================================================

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        export::write_csv(self.ledger.list(), writer)
    }

    pub fn export_csv_string(&self) -> Result<String> {
        export::to_csv_string(self.ledger.list())
    }
}

/// Ledger load is record-tolerant: a payload that is not an array falls back
/// to an empty ledger, a malformed record inside the array is dropped.
fn load_transactions<S: KeyValueStore>(storage: &Storage<S>) -> Result<Vec<Transaction>> {
    let raw: Vec<serde_json::Value> = storage.load_or(StorageKey::Transactions, Vec::new())?;

    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Transaction>(value) {
            Ok(tx) => Some(tx),
            Err(e) => {
                warn!(index, error = %e, "dropping malformed transaction record");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertLevel;
    use crate::calendar::SpendTier;
    use crate::error::{StorageError, TrackerError};
    use crate::storage::{MemoryStore, SqliteStore};
    use chrono::TimeZone;

    fn tracker() -> Tracker<MemoryStore> {
        Tracker::open(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_fresh_tracker_defaults() {
        let t = tracker();
        assert!(t.transactions().is_empty());
        assert_eq!(t.categories(), default_categories().as_slice());
        assert!(t.budgets().is_empty());
        assert_eq!(t.settings().currency, "₹");
        assert_eq!(t.settings().theme, Theme::Light);
        assert_eq!(t.calendar_limits(), CalendarLimits::default());
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let mut t = tracker();
        t.add_transaction("Groceries", 42.0, "Food", TransactionType::Expense).unwrap();
        t.add_category("Pets").unwrap();
        t.set_budget("Pets", 80.0).unwrap();
        t.set_currency("$").unwrap();
        t.set_theme(Theme::Dark).unwrap();
        t.set_calendar_limits(100.0, 400.0).unwrap();

        let reopened = Tracker::open(t.into_store()).unwrap();

        assert_eq!(reopened.transactions().len(), 1);
        assert_eq!(reopened.transactions()[0].description, "Groceries");
        assert!(reopened.categories().iter().any(|c| c == "Pets"));
        assert_eq!(reopened.budget_for("Pets"), Some(80.0));
        assert_eq!(reopened.settings().currency, "$");
        assert_eq!(reopened.settings().theme, Theme::Dark);
        assert_eq!(reopened.calendar_limits(), CalendarLimits { low: 100.0, medium: 400.0 });
    }

    #[test]
    fn test_failed_add_leaves_state_and_storage_untouched() {
        let mut t = tracker();
        assert!(t.add_transaction("", 10.0, "Food", TransactionType::Expense).is_err());
        assert!(t.add_transaction("Taxi", -1.0, "Travel", TransactionType::Expense).is_err());

        assert!(t.transactions().is_empty());
        assert!(t.storage().store().is_empty());
    }

    #[test]
    fn test_remove_missing_transaction_is_noop() {
        let mut t = tracker();
        let tx = t.add_transaction("Book", 15.0, "Education", TransactionType::Expense).unwrap();

        assert_eq!(t.remove_transaction(tx.id).unwrap().map(|r| r.id), Some(tx.id));
        assert!(t.remove_transaction(tx.id).unwrap().is_none());
        assert!(t.transactions().is_empty());
    }

    #[test]
    fn test_remove_category_keeps_transactions() {
        let mut t = tracker();
        t.add_transaction("Dinner", 60.0, "Food", TransactionType::Expense).unwrap();
        t.set_budget("Food", 500.0).unwrap();

        t.remove_category("Food").unwrap();

        assert!(!t.categories().iter().any(|c| c == "Food"));
        assert_eq!(t.budget_for("Food"), None);
        assert_eq!(t.transactions()[0].category, "Food");
        assert_eq!(t.totals().expense, 60.0);
        assert_eq!(t.expense_by_category().get("Food"), Some(&60.0));

        let reopened = Tracker::open(t.into_store()).unwrap();
        assert_eq!(reopened.budget_for("Food"), None);
        assert_eq!(reopened.transactions().len(), 1);
    }

    #[test]
    fn test_remove_unknown_category_not_found() {
        let mut t = tracker();
        let err = t.remove_category("Yachts").unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }

    #[test]
    fn test_invalid_calendar_limits_rejected() {
        let mut t = tracker();
        for (low, medium) in [(1500.0, 500.0), (500.0, 500.0), (0.0, 10.0), (f64::NAN, 10.0)] {
            let err = t.set_calendar_limits(low, medium).unwrap_err();
            assert!(matches!(
                err,
                TrackerError::Validation(ValidationError::InvalidThresholds { .. })
            ));
        }
        assert_eq!(t.calendar_limits(), CalendarLimits::default());
    }

    #[test]
    fn test_toggle_theme_and_blank_currency() {
        let mut t = tracker();
        assert_eq!(t.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(t.toggle_theme().unwrap(), Theme::Light);

        t.set_currency("  ").unwrap();
        assert_eq!(t.settings().currency, "₹");
    }

    #[test]
    fn test_reset_keeps_settings() {
        let mut t = tracker();
        t.add_transaction("Rent", 900.0, "Rent", TransactionType::Expense).unwrap();
        t.add_category("Pets").unwrap();
        t.set_budget("Rent", 1000.0).unwrap();
        t.set_currency("€").unwrap();
        t.set_calendar_limits(50.0, 150.0).unwrap();

        t.reset().unwrap();

        assert!(t.transactions().is_empty());
        assert!(t.budgets().is_empty());
        assert_eq!(t.categories(), default_categories().as_slice());

        let reopened = Tracker::open(t.into_store()).unwrap();
        assert!(reopened.transactions().is_empty());
        assert_eq!(reopened.settings().currency, "€");
        assert_eq!(reopened.calendar_limits().low, 50.0);
    }

    #[test]
    fn test_corrupt_entries_recover_independently() {
        let mut store = MemoryStore::new();
        store.set("transactions", "[not json").unwrap();
        store.set("categories", r#"["Food","Food","Rent"]"#).unwrap();
        store.set("calendarLimits", r#"{"low":900,"medium":100}"#).unwrap();
        store.set("currency", "\"$\"").unwrap();

        let t = Tracker::open(store).unwrap();

        assert!(t.transactions().is_empty());
        assert_eq!(t.categories(), &["Food".to_string(), "Rent".to_string()]);
        assert_eq!(t.calendar_limits(), CalendarLimits::default());
        assert_eq!(t.settings().currency, "$");
    }

    #[test]
    fn test_malformed_record_dropped_rest_kept() {
        let mut store = MemoryStore::new();
        store
            .set(
                "transactions",
                r#"[
                    {"id":1,"description":"ok","amount":10,"category":"Food","type":"expense","date":"2026-03-01T10:00:00.000Z"},
                    {"id":2,"description":"bad type","amount":10,"category":"Food","type":"gift","date":"2026-03-01T10:00:00.000Z"},
                    {"id":3,"description":"weird amount","amount":-4,"category":"Food","type":"expense","date":"2026-03-01T10:00:00.000Z"}
                ]"#,
            )
            .unwrap();

        let t = Tracker::open(store).unwrap();

        let ids: Vec<i64> = t.transactions().iter().map(|tx| tx.id).collect();
        assert_eq!(ids, vec![1, 3]);
        // The negative amount is kept but contributes nothing
        assert_eq!(t.totals().expense, 10.0);
    }

    #[test]
    fn test_alerts_and_calendar_for_one_month() {
        let mut t = tracker();
        let at = Local
            .with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        t.add_transaction_at("Big shop", 450.0, "Food", TransactionType::Expense, at).unwrap();
        t.set_budget("Food", 500.0).unwrap();

        let alerts = t.budget_alerts(2026, 3);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::NearLimit);
        assert_eq!(t.budget_alerts(2026, 4)[0].usage.spent, 0.0);

        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let month = t.calendar_month(MonthCursor::of(day));
        let cell = month.day(14).unwrap();
        assert_eq!(cell.total, 450.0);
        assert_eq!(cell.tier, SpendTier::Low);

        assert_eq!(t.day_details(day).total, 450.0);
    }

    #[test]
    fn test_current_alerts_list_every_budget() {
        let mut t = tracker();
        t.set_budget("Food", 100.0).unwrap();

        let alerts = t.current_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].usage.spent, 0.0);
        assert_eq!(alerts[0].level, AlertLevel::OnTrack);
    }

    // ========================================================================
    // STORAGE FAILURES
    // ========================================================================

    fn locked() -> StorageError {
        StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "database is locked"))
    }

    /// Memory-backed store with switchable read failure and per-key write failure.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: bool,
        fail_writes: Vec<&'static str>,
    }

    impl FlakyStore {
        fn failing_writes(inner: MemoryStore, keys: &[&'static str]) -> Self {
            FlakyStore {
                inner,
                fail_reads: false,
                fail_writes: keys.to_vec(),
            }
        }

        fn refuses(&self, key: &str) -> bool {
            self.fail_writes.iter().any(|k| *k == key)
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            if self.fail_reads {
                return Err(locked());
            }
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if self.refuses(key) {
                return Err(locked());
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> std::result::Result<(), StorageError> {
            if self.refuses(key) {
                return Err(locked());
            }
            self.inner.remove(key)
        }
    }

    fn seeded_store() -> MemoryStore {
        let mut t = tracker();
        for (description, amount) in [("A", 10.0), ("B", 20.0), ("C", 30.0), ("D", 40.0), ("E", 50.0)] {
            t.add_transaction(description, amount, "Food", TransactionType::Expense).unwrap();
        }
        t.set_budget("Food", 500.0).unwrap();
        t.into_store()
    }

    #[test]
    fn test_unreadable_store_fails_open_instead_of_emptying_ledger() {
        let store = seeded_store();
        let locked_store = FlakyStore {
            inner: store.clone(),
            fail_reads: true,
            fail_writes: Vec::new(),
        };

        let err = Tracker::open(locked_store).err().unwrap();
        assert!(matches!(err, TrackerError::Storage(_)));

        // Nothing was overwritten; a later open sees all five
        let t = Tracker::open(store).unwrap();
        assert_eq!(t.transactions().len(), 5);
    }

    #[test]
    fn test_failed_ledger_write_leaves_memory_unchanged() {
        let store = FlakyStore::failing_writes(seeded_store(), &["transactions"]);
        let mut t = Tracker::open(store).unwrap();
        let first = t.transactions()[0].id;

        assert!(t.add_transaction("Lunch", 10.0, "Food", TransactionType::Expense).is_err());
        assert_eq!(t.transactions().len(), 5);
        assert_eq!(t.totals().expense, 150.0);

        assert!(t.remove_transaction(first).is_err());
        assert_eq!(t.transactions().len(), 5);
        assert_eq!(t.transactions()[0].id, first);
    }

    #[test]
    fn test_failed_registry_write_leaves_memory_unchanged() {
        let store = FlakyStore::failing_writes(MemoryStore::new(), &["categories", "budgets"]);
        let mut t = Tracker::open(store).unwrap();

        assert!(t.add_category("Pets").is_err());
        assert!(!t.categories().iter().any(|c| c == "Pets"));

        assert!(t.set_budget("Food", 300.0).is_err());
        assert_eq!(t.budget_for("Food"), None);
    }

    #[test]
    fn test_failed_category_removal_keeps_category_and_budget() {
        let store = FlakyStore::failing_writes(seeded_store(), &["budgets"]);
        let mut t = Tracker::open(store).unwrap();

        assert!(t.remove_category("Food").is_err());
        assert!(t.categories().iter().any(|c| c == "Food"));
        assert_eq!(t.budget_for("Food"), Some(500.0));

        // Storage still agrees with memory
        let reopened = Tracker::open(t.into_store().inner).unwrap();
        assert!(reopened.categories().iter().any(|c| c == "Food"));
        assert_eq!(reopened.budget_for("Food"), Some(500.0));
    }

    #[test]
    fn test_failed_reset_keeps_ledger() {
        let store = FlakyStore::failing_writes(seeded_store(), &["transactions"]);
        let mut t = Tracker::open(store).unwrap();

        assert!(t.reset().is_err());
        assert_eq!(t.transactions().len(), 5);
        assert_eq!(t.budget_for("Food"), Some(500.0));

        let reopened = Tracker::open(t.into_store().inner).unwrap();
        assert_eq!(reopened.transactions().len(), 5);
    }

    #[test]
    fn test_sqlite_reset_is_atomic() {
        use rusqlite::Connection;

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE kv_store (key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT NOT NULL);
             CREATE TRIGGER refuse_delete BEFORE DELETE ON kv_store
             WHEN OLD.key = 'transactions'
             BEGIN SELECT RAISE(ABORT, 'database is locked'); END;",
        )
        .unwrap();
        let mut t = Tracker::open(SqliteStore::from_connection(conn).unwrap()).unwrap();
        t.add_transaction("Rent", 900.0, "Rent", TransactionType::Expense).unwrap();
        t.set_budget("Rent", 1000.0).unwrap();

        assert!(t.reset().is_err());

        let reopened = Tracker::open(t.into_store()).unwrap();
        assert_eq!(reopened.transactions().len(), 1);
        assert_eq!(reopened.budget_for("Rent"), Some(1000.0));
    }

    #[test]
    fn test_export_goes_through_ledger() {
        let mut t = tracker();
        assert!(matches!(t.export_csv_string(), Err(TrackerError::NothingToExport)));

        t.add_transaction("Book", 15.0, "Education", TransactionType::Expense).unwrap();
        let csv = t.export_csv_string().unwrap();
        assert!(csv.starts_with("Date,Description,Amount,Category,Type\n"));
        assert!(csv.contains(r#""Book","15","Education","expense""#));
    }
}
