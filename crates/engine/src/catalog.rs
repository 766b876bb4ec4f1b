//! Unit catalog – read-only category and unit metadata.
//!
//! A [`Catalog`] is an ordered list of [`Category`] values, each holding its
//! units in declaration order. Lookups by key go through per-category
//! indexes built once at construction; nothing is mutable afterwards.

use crate::error::{CatalogError, ConversionError};
use crate::rates::RateKind;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How the dispatcher converts values inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `(value * from.factor) / to.factor`
    Linear,
    /// Offset-based scales pivoting through Celsius.
    Affine,
    /// Oven temperatures and gas marks pivoting through Fahrenheit.
    Baking,
    /// Remote exchange rates.
    Rate(RateKind),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDefinition {
    pub key: String,
    pub display_name: String,
    /// Ratio to the category's base unit.
    pub factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

impl UnitDefinition {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>, factor: f64) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            factor,
            offset: None,
        }
    }

    pub fn affine(
        key: impl Into<String>,
        display_name: impl Into<String>,
        factor: f64,
        offset: f64,
    ) -> Self {
        Self {
            offset: Some(offset),
            ..Self::new(key, display_name, factor)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub key: String,
    pub display_name: String,
    pub icon: String,
    pub strategy: Strategy,
    units: Vec<UnitDefinition>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Category {
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        icon: impl Into<String>,
        strategy: Strategy,
        units: Vec<UnitDefinition>,
    ) -> Self {
        let index = units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.key.clone(), i))
            .collect();
        Self {
            key: key.into(),
            display_name: display_name.into(),
            icon: icon.into(),
            strategy,
            units,
            index,
        }
    }

    pub fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    pub fn unit(&self, key: &str) -> Option<&UnitDefinition> {
        self.index.get(key).map(|&i| &self.units[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            key: self.key.clone(),
            display_name: self.display_name.clone(),
            icon: self.icon.clone(),
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.units.is_empty() {
            return Err(CatalogError::EmptyCategory(self.key.clone()));
        }
        let mut seen = HashSet::new();
        for unit in &self.units {
            if !seen.insert(unit.key.as_str()) {
                return Err(CatalogError::DuplicateUnit {
                    category: self.key.clone(),
                    unit: unit.key.clone(),
                });
            }
            if !unit.factor.is_finite() || unit.factor == 0.0 {
                return Err(CatalogError::InvalidFactor {
                    category: self.key.clone(),
                    unit: unit.key.clone(),
                    factor: unit.factor,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub key: String,
    pub display_name: String,
    pub icon: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting empty categories, duplicate keys and
    /// zero or non-finite factors.
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(categories.len());
        for (i, category) in categories.iter().enumerate() {
            category.validate()?;
            if index.insert(category.key.clone(), i).is_some() {
                return Err(CatalogError::DuplicateCategory(category.key.clone()));
            }
        }
        Ok(Self { categories, index })
    }

    /// The bundled reference catalog (19 categories).
    pub fn builtin() -> Self {
        let categories = crate::units::builtin_categories();
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key.clone(), i))
            .collect();
        Self { categories, index }
    }

    /// Keep only `keys`, in the order given.
    pub fn restricted<S: AsRef<str>>(&self, keys: &[S]) -> Result<Self, CatalogError> {
        let categories = keys
            .iter()
            .map(|k| {
                self.category(k.as_ref())
                    .cloned()
                    .ok_or_else(|| CatalogError::UnknownCategory(k.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(categories)
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        self.categories.iter().map(Category::summary).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.index.get(key).map(|&i| &self.categories[i])
    }

    pub fn units(&self, category: &str) -> Result<&[UnitDefinition], ConversionError> {
        self.category(category)
            .map(Category::units)
            .ok_or_else(|| ConversionError::UnknownCategory(category.to_string()))
    }

    pub fn unit(&self, category: &str, unit: &str) -> Option<&UnitDefinition> {
        self.category(category).and_then(|c| c.unit(unit))
    }

    /// First category, in catalog order, that contains both unit keys.
    pub fn find_category(&self, from: &str, to: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.contains(from) && c.contains(to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Vec<Category> {
        vec![Category::new(
            "length",
            "Length",
            "📏",
            Strategy::Linear,
            vec![
                UnitDefinition::new("meters", "Meter", 1.0),
                UnitDefinition::new("feet", "Foot", 0.3048),
            ],
        )]
    }

    #[test]
    fn builtin_catalog_passes_validation() {
        let builtin = Catalog::builtin();
        let validated = Catalog::new(builtin.iter().cloned().collect());
        assert!(validated.is_ok(), "builtin catalog invalid: {:?}", validated.err());
        assert_eq!(builtin.len(), 19);
    }

    #[test]
    fn categories_keep_declaration_order() {
        let keys: Vec<String> = Catalog::builtin()
            .categories()
            .into_iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(keys.first().map(String::as_str), Some("length"));
        assert_eq!(keys[1], "weight");
        assert_eq!(keys[2], "temperature");
        assert_eq!(keys.last().map(String::as_str), Some("crypto"));
    }

    #[test]
    fn units_for_unknown_category_fails() {
        let catalog = Catalog::builtin();
        let err = catalog.units("nope").unwrap_err();
        assert_eq!(err, ConversionError::UnknownCategory("nope".into()));
    }

    #[test]
    fn rejects_duplicate_unit_keys() {
        let mut cats = tiny();
        cats[0] = Category::new(
            "length",
            "Length",
            "📏",
            Strategy::Linear,
            vec![
                UnitDefinition::new("meters", "Meter", 1.0),
                UnitDefinition::new("meters", "Metre", 1.0),
            ],
        );
        assert!(matches!(
            Catalog::new(cats),
            Err(CatalogError::DuplicateUnit { .. })
        ));
    }

    #[test]
    fn rejects_zero_factor_and_empty_category() {
        let zero = vec![Category::new(
            "x",
            "X",
            "",
            Strategy::Linear,
            vec![UnitDefinition::new("a", "A", 0.0)],
        )];
        assert!(matches!(
            Catalog::new(zero),
            Err(CatalogError::InvalidFactor { .. })
        ));

        let empty = vec![Category::new("x", "X", "", Strategy::Linear, vec![])];
        assert_eq!(
            Catalog::new(empty).unwrap_err(),
            CatalogError::EmptyCategory("x".into())
        );
    }

    #[test]
    fn rejects_duplicate_categories() {
        let mut cats = tiny();
        cats.extend(tiny());
        assert_eq!(
            Catalog::new(cats).unwrap_err(),
            CatalogError::DuplicateCategory("length".into())
        );
    }

    #[test]
    fn find_category_uses_catalog_order() {
        let catalog = Catalog::builtin();
        // "cups" and "liters" live in both volume and cooking_volume; volume comes first.
        assert_eq!(
            catalog.find_category("cups", "liters").map(|c| c.key.as_str()),
            Some("volume")
        );
        assert_eq!(
            catalog
                .find_category("cups_flour", "grams")
                .map(|c| c.key.as_str()),
            Some("cooking_weight")
        );
        assert!(catalog.find_category("meters", "grams").is_none());
    }

    #[test]
    fn restricted_catalog_reorders_and_filters() {
        let catalog = Catalog::builtin();
        let small = catalog.restricted(&["currency", "length"]).unwrap();
        let keys: Vec<String> = small.categories().into_iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["currency", "length"]);
        assert!(small.category("weight").is_none());

        assert_eq!(
            catalog.restricted(&["bogus"]).unwrap_err(),
            CatalogError::UnknownCategory("bogus".into())
        );
    }

    #[test]
    fn currency_table_has_no_duplicates_and_keeps_names() {
        let catalog = Catalog::builtin();
        let units = catalog.units("currency").unwrap();
        let mut seen = HashSet::new();
        for u in units {
            assert!(seen.insert(u.key.as_str()), "duplicate {}", u.key);
        }
        assert_eq!(
            catalog.unit("currency", "JOD").map(|u| u.display_name.as_str()),
            Some("Jordanian Dinar")
        );
        assert!(units.len() > 100);
        for code in ["MRO", "XOF", "XAF"] {
            assert!(catalog.unit("currency", code).is_some(), "{}", code);
        }
    }
}
