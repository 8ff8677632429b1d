//! Validation utilities for catalog and stock input

use rust_decimal::Decimal;

use crate::units::UnitRegistry;

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate ingredient name (1-120 characters after trimming)
pub fn validate_ingredient_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Ingredient name is required");
    }
    if trimmed.chars().count() > 120 {
        return Err("Ingredient name must be at most 120 characters");
    }
    Ok(())
}

/// Validate that an ingredient is stocked in a base unit
pub fn validate_stock_unit(registry: &UnitRegistry, unit: &str) -> Result<(), &'static str> {
    match registry.lookup(unit) {
        Ok(def) if def.is_base() => Ok(()),
        Ok(_) => Err("Ingredient unit must be a base unit (g, mL or piece)"),
        Err(_) => Err("Unknown unit"),
    }
}

/// Validate par levels: both non-negative, max not below min unless unset
pub fn validate_par_levels(min_level: f64, max_level: f64) -> Result<(), &'static str> {
    if !min_level.is_finite() || !max_level.is_finite() {
        return Err("Stock levels must be numbers");
    }
    if min_level < 0.0 || max_level < 0.0 {
        return Err("Stock levels cannot be negative");
    }
    if max_level > 0.0 && max_level < min_level {
        return Err("Maximum stock level must not be below the minimum");
    }
    Ok(())
}

/// Validate cost per unit is not negative
pub fn validate_cost(cost: Decimal) -> Result<(), &'static str> {
    if cost < Decimal::ZERO {
        return Err("Cost cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate an opening stock quantity
pub fn validate_initial_stock(quantity: f64) -> Result<(), &'static str> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err("Initial stock must be a non-negative number");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ingredient_name() {
        assert!(validate_ingredient_name("Espresso Beans").is_ok());
        assert!(validate_ingredient_name("   ").is_err());
        assert!(validate_ingredient_name(&"x".repeat(121)).is_err());
    }

    #[test]
    fn test_validate_stock_unit() {
        let registry = UnitRegistry::standard();
        assert!(validate_stock_unit(registry, "g").is_ok());
        assert!(validate_stock_unit(registry, "piece").is_ok());
        assert!(validate_stock_unit(registry, "kg").is_err());
        assert!(validate_stock_unit(registry, "furlong").is_err());
    }

    #[test]
    fn test_validate_par_levels() {
        assert!(validate_par_levels(1000.0, 10_000.0).is_ok());
        assert!(validate_par_levels(0.0, 0.0).is_ok());
        assert!(validate_par_levels(10.0, 0.0).is_ok());
        assert!(validate_par_levels(-1.0, 10.0).is_err());
        assert!(validate_par_levels(100.0, 10.0).is_err());
        assert!(validate_par_levels(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_validate_cost() {
        assert!(validate_cost(Decimal::new(125, 2)).is_ok());
        assert!(validate_cost(Decimal::ZERO).is_ok());
        assert!(validate_cost(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_validate_initial_stock() {
        assert!(validate_initial_stock(0.0).is_ok());
        assert!(validate_initial_stock(-0.5).is_err());
        assert!(validate_initial_stock(f64::INFINITY).is_err());
    }
}
