// 🏷️ Category & Budget Registry
//
// Ordered, unique category names plus one optional monthly limit per name.
// Deleting a category drops its budget entry but never touches transactions
// that reference the name.

use crate::error::{Result, TrackerError, ValidationError};
use crate::models::default_categories;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// BUDGET MAP
// ============================================================================

/// Category name → monthly limit, iterated in insertion order.
///
/// Insertion order is what breaks ties when budgets are ranked by
/// utilization, so this keeps a vector instead of a hash map. Serialized as a
/// plain JSON object in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetMap {
    entries: Vec<(String, f64)>,
}

impl BudgetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, category: &str, limit: f64) {
        match self.entries.iter_mut().find(|(name, _)| name == category) {
            Some(entry) => entry.1 = limit,
            None => self.entries.push((category.to_string(), limit)),
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, limit)| *limit)
    }

    /// Returns the removed limit, if there was one.
    pub fn remove(&mut self, category: &str) -> Option<f64> {
        let pos = self.entries.iter().position(|(name, _)| name == category)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, limit)| (name.as_str(), *limit))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for BudgetMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, limit) in &self.entries {
            map.serialize_entry(name, limit)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BudgetMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BudgetMapVisitor;

        impl<'de> Visitor<'de> for BudgetMapVisitor {
            type Value = BudgetMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to budget limit")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<BudgetMap, A::Error> {
                let mut budgets = BudgetMap::new();
                while let Some((name, limit)) = access.next_entry::<String, f64>()? {
                    budgets.insert(&name, limit);
                }
                Ok(budgets)
            }
        }

        deserializer.deserialize_map(BudgetMapVisitor)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    categories: Vec<String>,
    budgets: BudgetMap,
}

/// What `remove_category` took out, so the caller knows what to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedCategory {
    pub name: String,
    pub budget: Option<f64>,
}

impl Registry {
    /// Registry holding the default category set and no budgets.
    pub fn with_defaults() -> Self {
        Registry {
            categories: default_categories(),
            budgets: BudgetMap::new(),
        }
    }

    /// Build from persisted parts. Duplicate names keep their first position.
    pub fn from_parts(categories: Vec<String>, budgets: BudgetMap) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(categories.len());
        for name in categories {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Registry {
            categories: unique,
            budgets,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn budgets(&self) -> &BudgetMap {
        &self.budgets
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    pub fn budget_for(&self, category: &str) -> Option<f64> {
        self.budgets.get(category)
    }

    /// Append a trimmed, non-empty, not yet present name. Returns the stored name.
    pub fn add_category(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.contains(name) {
            return Err(TrackerError::DuplicateCategory(name.to_string()));
        }
        self.categories.push(name.to_string());
        Ok(name.to_string())
    }

    /// Remove a category and its budget entry.
    pub fn remove_category(&mut self, name: &str) -> Result<RemovedCategory> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let pos = self
            .categories
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TrackerError::NotFound(format!("category '{}'", name)))?;

        let removed = self.categories.remove(pos);
        let budget = self.budgets.remove(&removed);

        Ok(RemovedCategory {
            name: removed,
            budget,
        })
    }

    /// Upsert the monthly limit for a registered category.
    pub fn set_budget(&mut self, category: &str, amount: f64) -> Result<()> {
        let category = category.trim();
        if category.is_empty() || !self.contains(category) {
            return Err(ValidationError::NoCategory.into());
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::InvalidAmount(amount).into());
        }
        self.budgets.insert(category, amount);
        Ok(())
    }

    /// Back to the default categories with no budgets.
    pub fn reset(&mut self) {
        *self = Registry::with_defaults();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
