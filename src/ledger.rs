// Transaction Ledger - append/remove-only log, insertion order preserved

use crate::error::{Result, ValidationError};
use crate::models::{Transaction, TransactionType};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Ledger { transactions }
    }

    /// Record a new transaction created at `now`.
    ///
    /// The id is `now` in epoch milliseconds, bumped past the largest id
    /// already in the log so two additions in one millisecond stay unique.
    pub fn add_at(
        &mut self,
        description: &str,
        amount: f64,
        category: &str,
        kind: TransactionType,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription.into());
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::InvalidAmount(amount).into());
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::NoCategory.into());
        }

        let tx = Transaction {
            id: self.next_id(now),
            description: description.to_string(),
            amount,
            category: category.to_string(),
            kind,
            date: now,
        };
        self.transactions.push(tx.clone());
        Ok(tx)
    }

    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let stamp = now.timestamp_millis();
        match self.transactions.iter().map(|t| t.id).max() {
            Some(last) if last >= stamp => last + 1,
            _ => stamp,
        }
    }

    /// Drop the transaction with `id`. Returns it if it was present; a
    /// missing id is not an error.
    pub fn remove(&mut self, id: i64) -> Option<Transaction> {
        let pos = self.transactions.iter().position(|t| t.id == id)?;
        Some(self.transactions.remove(pos))
    }

    /// All transactions, oldest first.
    pub fn list(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The last `limit` transactions, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&Transaction> {
        self.transactions.iter().rev().take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }
}
