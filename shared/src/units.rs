//! Unit definition table
//!
//! The registry is built once from a fixed list of definitions and is read-only
//! afterwards. Pack sizes such as "sack of 25 kg" are ordinary definitions whose
//! factor is the pack size in base units.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::error::{StockError, StockResult};
use crate::models::{UnitDefinition, UnitType};

static STANDARD: Lazy<UnitRegistry> = Lazy::new(|| UnitRegistry::from_sorted(standard_units()));

/// Built-in units
pub fn standard_units() -> Vec<UnitDefinition> {
    use UnitType::*;

    vec![
        // Weight, base grams
        UnitDefinition::new("g", Weight, 1.0, "Gram")
            .with_aliases(&["gram", "grams"])
            .scaled_for_display(),
        UnitDefinition::new("kg", Weight, 1000.0, "Kilogram")
            .with_aliases(&["kilogram", "kilograms"])
            .scaled_for_display(),
        UnitDefinition::new("oz", Weight, 28.349523125, "Ounce"),
        UnitDefinition::new("lb", Weight, 453.59237, "Pound").with_aliases(&["lbs"]),
        UnitDefinition::pack("sack_25kg", Weight, 25_000.0, "Sack (25 kg)"),
        // Volume, base milliliters
        UnitDefinition::new("mL", Volume, 1.0, "Milliliter")
            .with_aliases(&["ml"])
            .scaled_for_display(),
        UnitDefinition::new("L", Volume, 1000.0, "Liter")
            .with_aliases(&["l"])
            .scaled_for_display(),
        UnitDefinition::new("tsp", Volume, 4.92892159375, "Teaspoon"),
        UnitDefinition::new("tbsp", Volume, 14.78676478125, "Tablespoon"),
        UnitDefinition::new("cup", Volume, 240.0, "Cup"),
        UnitDefinition::new("gal", Volume, 3785.411784, "Gallon"),
        // Count, base pieces
        UnitDefinition::new("piece", Count, 1.0, "Piece")
            .with_aliases(&["pc", "pcs", "pieces"])
            .scaled_for_display(),
        UnitDefinition::new("dozen", Count, 12.0, "Dozen"),
        UnitDefinition::pack("case_24", Count, 24.0, "Case (24)"),
    ]
}

/// Immutable lookup table from unit symbol to definition
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: Vec<UnitDefinition>,
}

impl UnitRegistry {
    /// Build a registry from definitions, validating every entry
    pub fn new(definitions: Vec<UnitDefinition>) -> StockResult<Self> {
        validate_definitions(&definitions)?;
        Ok(Self::from_sorted(definitions))
    }

    /// The built-in table
    pub fn standard() -> &'static UnitRegistry {
        &STANDARD
    }

    /// The built-in table plus additional pack sizes
    pub fn with_extra(extra: Vec<UnitDefinition>) -> StockResult<Self> {
        let mut definitions = standard_units();
        definitions.extend(extra);
        Self::new(definitions)
    }

    fn from_sorted(mut units: Vec<UnitDefinition>) -> Self {
        units.sort_by(|a, b| {
            a.unit_type
                .cmp(&b.unit_type)
                .then(a.to_base_factor.total_cmp(&b.to_base_factor))
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        Self { units }
    }

    /// Find a unit by symbol or alias; unknown symbols are an error
    pub fn lookup(&self, symbol: &str) -> StockResult<&UnitDefinition> {
        self.units
            .iter()
            .find(|u| u.symbol == symbol)
            .or_else(|| self.units.iter().find(|u| u.matches(symbol)))
            .ok_or_else(|| StockError::UnknownUnit(symbol.to_string()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_ok()
    }

    /// Units of one type, smallest to largest
    pub fn units_for_type(&self, unit_type: UnitType) -> Vec<&UnitDefinition> {
        self.units
            .iter()
            .filter(|u| u.unit_type == unit_type)
            .collect()
    }

    /// Units display formatting may choose from, smallest to largest
    pub fn display_units(&self, unit_type: UnitType) -> Vec<&UnitDefinition> {
        self.units
            .iter()
            .filter(|u| u.unit_type == unit_type && u.display_scale)
            .collect()
    }

    pub fn base_unit(&self, unit_type: UnitType) -> StockResult<&UnitDefinition> {
        self.lookup(unit_type.base_symbol())
    }

    pub fn all(&self) -> &[UnitDefinition] {
        &self.units
    }
}

fn validate_definitions(definitions: &[UnitDefinition]) -> StockResult<()> {
    let invalid = |def: &UnitDefinition, reason: &str| StockError::InvalidUnitDefinition {
        symbol: def.symbol.clone(),
        reason: reason.to_string(),
    };

    let mut seen = HashSet::new();
    for def in definitions {
        if def.symbol.trim().is_empty() {
            return Err(invalid(def, "symbol is empty"));
        }
        if !def.to_base_factor.is_finite() || def.to_base_factor <= 0.0 {
            return Err(invalid(def, "factor must be a positive finite number"));
        }
        if def.is_base() && def.to_base_factor != 1.0 {
            return Err(invalid(def, "base unit factor must be 1"));
        }
        for name in std::iter::once(&def.symbol).chain(def.aliases.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(invalid(def, &format!("{} is already registered", name)));
            }
        }
    }

    for unit_type in UnitType::ALL {
        let has_units = definitions.iter().any(|d| d.unit_type == unit_type);
        let has_base = definitions
            .iter()
            .any(|d| d.unit_type == unit_type && d.is_base());
        if has_units && !has_base {
            return Err(StockError::InvalidUnitDefinition {
                symbol: unit_type.base_symbol().to_string(),
                reason: format!("{} units need their base unit", unit_type),
            });
        }
    }

    Ok(())
}
