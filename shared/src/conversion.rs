//! Quantity conversion between human units and base units

use serde::{Deserialize, Serialize};

use crate::error::{StockError, StockResult};
use crate::models::UnitType;
use crate::units::UnitRegistry;

/// Relative tolerance for comparing converted quantities
pub const RELATIVE_TOLERANCE: f64 = 1e-9;

/// A human-entered amount in a named unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quantity {
    pub amount: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(amount: f64, unit: impl Into<String>) -> StockResult<Self> {
        if !amount.is_finite() {
            return Err(StockError::InvalidAmount(format!("{} is not finite", amount)));
        }
        if amount < 0.0 {
            return Err(StockError::InvalidAmount(format!(
                "{} is negative",
                amount
            )));
        }
        Ok(Self {
            amount,
            unit: unit.into(),
        })
    }

    pub fn to_base(&self, registry: &UnitRegistry) -> StockResult<f64> {
        to_base(registry, self.amount, &self.unit)
    }

    /// Convert to base units, checking the unit measures `expected`
    pub fn to_base_for(&self, registry: &UnitRegistry, expected: UnitType) -> StockResult<f64> {
        ensure_unit_type(registry, &self.unit, expected)?;
        self.to_base(registry)
    }
}

/// `amount * factor`; no rounding
pub fn to_base(registry: &UnitRegistry, amount: f64, unit: &str) -> StockResult<f64> {
    let def = registry.lookup(unit)?;
    if !amount.is_finite() {
        return Err(StockError::InvalidAmount(format!("{} is not finite", amount)));
    }
    Ok(amount * def.to_base_factor)
}

/// Inverse of [`to_base`]
pub fn from_base(registry: &UnitRegistry, base_amount: f64, unit: &str) -> StockResult<f64> {
    let def = registry.lookup(unit)?;
    if !base_amount.is_finite() {
        return Err(StockError::InvalidAmount(format!(
            "{} is not finite",
            base_amount
        )));
    }
    Ok(base_amount / def.to_base_factor)
}

/// Convert between two units of the same type
pub fn convert(registry: &UnitRegistry, amount: f64, from: &str, to: &str) -> StockResult<f64> {
    let target = registry.lookup(to)?;
    ensure_unit_type(registry, from, target.unit_type)?;
    let base = to_base(registry, amount, from)?;
    from_base(registry, base, to)
}

/// Fail with `IncompatibleUnit` unless `unit` measures `expected`
pub fn ensure_unit_type(registry: &UnitRegistry, unit: &str, expected: UnitType) -> StockResult<()> {
    let def = registry.lookup(unit)?;
    if def.unit_type != expected {
        return Err(StockError::IncompatibleUnit {
            unit: unit.to_string(),
            expected,
            actual: def.unit_type,
        });
    }
    Ok(())
}

/// Render a base amount in the most readable unit of its type
///
/// Picks the largest display unit whose converted magnitude is at least 1,
/// falling back to the smallest one.
pub fn format_for_display(registry: &UnitRegistry, base_amount: f64, unit_type: UnitType) -> String {
    let mut candidates = registry.display_units(unit_type);
    if candidates.is_empty() {
        candidates = registry.units_for_type(unit_type);
    }
    let precision = unit_type.display_precision();

    let Some(smallest) = candidates.first() else {
        return render(base_amount, precision, unit_type.base_symbol());
    };

    let magnitude = base_amount.abs();
    let chosen = candidates
        .iter()
        .rev()
        .find(|u| magnitude / u.to_base_factor >= 1.0)
        .unwrap_or(smallest);

    render(base_amount / chosen.to_base_factor, precision, &chosen.symbol)
}

fn render(value: f64, precision: usize, symbol: &str) -> String {
    let rounded = format!("{:.*}", precision, value);
    // "-0.00" reads as a negative stock level
    let rounded = match rounded.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => rounded,
    };
    format!("{} {}", rounded, symbol)
}

/// True when `a` and `b` agree within [`RELATIVE_TOLERANCE`]
pub fn approx_eq(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= RELATIVE_TOLERANCE * scale
}
