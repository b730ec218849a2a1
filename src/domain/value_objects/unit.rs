//! Measurement units for orders and product prices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit an amount or price is expressed in.
///
/// Stored as TEXT with a CHECK constraint in `orders.unit` and `product_shops.unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[default]
    Units,
    Kg,
    G,
    Cg,
    Mg,
    L,
    Dl,
    Cl,
    Ml,
    M,
    Dm,
    Cm,
    Mm,
}

impl Unit {
    pub const ALL: [Unit; 13] = [
        Unit::Units,
        Unit::Kg,
        Unit::G,
        Unit::Cg,
        Unit::Mg,
        Unit::L,
        Unit::Dl,
        Unit::Cl,
        Unit::Ml,
        Unit::M,
        Unit::Dm,
        Unit::Cm,
        Unit::Mm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::Kg => "kg",
            Self::G => "g",
            Self::Cg => "cg",
            Self::Mg => "mg",
            Self::L => "l",
            Self::Dl => "dl",
            Self::Cl => "cl",
            Self::Ml => "ml",
            Self::M => "m",
            Self::Dm => "dm",
            Self::Cm => "cm",
            Self::Mm => "mm",
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        Unit::ALL
            .iter()
            .copied()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| format!("Unknown unit '{}'", s))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
