//! Category table.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::CategoryKey;
use crate::error::{FinanceError, Result};

/// A spending or income category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable key stored on transactions.
    pub key: CategoryKey,
    /// Display name.
    pub name: String,
    /// Chart color (`#RRGGBB`).
    pub color: String,
    /// Icon name.
    pub icon: String,
}

impl Category {
    /// Creates a category.
    #[inline]
    #[must_use]
    pub fn new(key: &str, name: &str, color: &str, icon: &str) -> Self {
        Self {
            key: CategoryKey::from(key),
            name: name.to_owned(),
            color: color.to_owned(),
            icon: icon.to_owned(),
        }
    }
}

/// Ordered table of categories.
///
/// The order is significant: the monthly breakdown is emitted in table
/// order. Keys are unique and the table is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryTable(Vec<Category>);

impl CategoryTable {
    /// Creates a table, validating that it is non-empty with unique keys.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::InvalidCategoryTable`] for an empty table or
    /// a repeated key.
    #[inline]
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(FinanceError::InvalidCategoryTable(
                "table has no categories".to_owned(),
            ));
        }
        let mut seen = HashSet::with_capacity(categories.len());
        for category in &categories {
            if !seen.insert(&category.key) {
                return Err(FinanceError::InvalidCategoryTable(format!(
                    "duplicate key {}",
                    category.key
                )));
            }
        }
        Ok(Self(categories))
    }

    /// Parses a table from a JSON array of `{key, name, color, icon}`.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::Serialization`] for malformed JSON and
    /// [`FinanceError::InvalidCategoryTable`] if validation fails.
    #[inline]
    pub fn from_json(json: &str) -> Result<Self> {
        let categories: Vec<Category> = serde_json::from_str(json)?;
        Self::new(categories)
    }

    /// Looks up a category by key.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &CategoryKey) -> Option<&Category> {
        self.0.iter().find(|category| category.key == *key)
    }

    /// Returns `true` if the key is present in the table.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &CategoryKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterates categories in table order.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Category> {
        self.0.iter()
    }

    /// Number of categories.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with [`Self::len`].
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CategoryTable {
    /// The built-in table shipped with the app.
    #[inline]
    fn default() -> Self {
        Self(vec![
            Category::new("purchases", "Compras", "#5636D3", "shopping-bag"),
            Category::new("food", "Alimentação", "#FF872C", "coffee"),
            Category::new("salary", "Salário", "#12A454", "dollar-sign"),
            Category::new("car", "Carro", "#E83F5B", "crosshair"),
            Category::new("leisure", "Lazer", "#26195C", "heart"),
            Category::new("studies", "Estudos", "#9C001A", "book"),
        ])
    }
}

impl<'table> IntoIterator for &'table CategoryTable {
    type Item = &'table Category;
    type IntoIter = core::slice::Iter<'table, Category>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_order() {
        let table = CategoryTable::default();
        let keys: Vec<&str> = table.iter().map(|c| c.key.as_inner()).collect();
        assert_eq!(
            keys,
            ["purchases", "food", "salary", "car", "leisure", "studies"]
        );
    }

    #[test]
    fn default_table_passes_validation() {
        let table = CategoryTable::default();
        let validated = CategoryTable::new(table.iter().cloned().collect()).unwrap();
        assert_eq!(validated, table);
    }

    #[test]
    fn lookup_by_key() {
        let table = CategoryTable::default();
        let food = table.get(&CategoryKey::from("food")).unwrap();
        assert_eq!(food.name, "Alimentação");
        assert_eq!(food.color, "#FF872C");
        assert!(!table.contains(&CategoryKey::from("pets")));
    }

    #[test]
    fn empty_table_rejected() {
        let err = CategoryTable::new(Vec::new()).unwrap_err();
        assert!(matches!(err, FinanceError::InvalidCategoryTable(_)));
    }

    #[test]
    fn duplicate_key_rejected() {
        let err = CategoryTable::new(vec![
            Category::new("food", "Food", "#000000", "coffee"),
            Category::new("food", "Groceries", "#111111", "cart"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate key food"));
    }

    #[test]
    fn from_json_keeps_order() {
        let json = r##"[
            {"key": "rent", "name": "Rent", "color": "#222222", "icon": "home"},
            {"key": "food", "name": "Food", "color": "#FF872C", "icon": "coffee"}
        ]"##;
        let table = CategoryTable::from_json(json).unwrap();
        assert_eq!(table.len(), 2);
        let first = table.iter().next().unwrap();
        assert_eq!(first.key, CategoryKey::from("rent"));
    }

    #[test]
    fn from_json_malformed() {
        let err = CategoryTable::from_json("{").unwrap_err();
        assert!(matches!(err, FinanceError::Serialization(_)));
    }
}
