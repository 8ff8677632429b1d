//! Unit of measure models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::StockError;

/// Dimension a unit measures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Weight,
    Volume,
    Count,
}

impl UnitType {
    pub const ALL: [UnitType; 3] = [UnitType::Weight, UnitType::Volume, UnitType::Count];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Weight => "weight",
            UnitType::Volume => "volume",
            UnitType::Count => "count",
        }
    }

    /// Canonical unit every conversion of this type routes through
    pub fn base_symbol(&self) -> &'static str {
        match self {
            UnitType::Weight => "g",
            UnitType::Volume => "mL",
            UnitType::Count => "piece",
        }
    }

    /// Decimal places used when rendering quantities of this type
    pub fn display_precision(&self) -> usize {
        match self {
            UnitType::Weight | UnitType::Volume => 2,
            UnitType::Count => 0,
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(UnitType::Weight),
            "volume" => Ok(UnitType::Volume),
            "count" => Ok(UnitType::Count),
            other => Err(StockError::UnknownUnit(format!("unit type {}", other))),
        }
    }
}

/// A registered unit and its factor to the base unit of its type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDefinition {
    pub symbol: String,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub to_base_factor: f64,
    pub display_name: String,
    /// Alternate spellings accepted by lookup
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Whether display formatting may pick this unit
    #[serde(default)]
    pub display_scale: bool,
}

impl UnitDefinition {
    pub fn new(
        symbol: impl Into<String>,
        unit_type: UnitType,
        to_base_factor: f64,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            unit_type,
            to_base_factor,
            display_name: display_name.into(),
            aliases: Vec::new(),
            display_scale: false,
        }
    }

    /// A purchase unit holding `pack_size` base units, such as a 25 kg sack
    pub fn pack(
        symbol: impl Into<String>,
        unit_type: UnitType,
        pack_size: f64,
        display_name: impl Into<String>,
    ) -> Self {
        Self::new(symbol, unit_type, pack_size, display_name)
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn scaled_for_display(mut self) -> Self {
        self.display_scale = true;
        self
    }

    pub fn is_base(&self) -> bool {
        self.symbol == self.unit_type.base_symbol()
    }

    pub fn matches(&self, symbol: &str) -> bool {
        self.symbol == symbol || self.aliases.iter().any(|a| a == symbol)
    }
}
