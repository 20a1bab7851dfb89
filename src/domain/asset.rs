//! Tradable instrument identity.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AssetType {
    #[default]
    Stock,
    Option,
    Future,
    Forex,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Option => "option",
            AssetType::Future => "future",
            AssetType::Forex => "forex",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" => Ok(AssetType::Stock),
            "option" => Ok(AssetType::Option),
            "future" => Ok(AssetType::Future),
            "forex" => Ok(AssetType::Forex),
            other => Err(format!(
                "unknown asset type '{other}' (expected stock, option, future or forex)"
            )),
        }
    }
}

/// Symbol plus instrument class. Used as the dataset pool key, so equality
/// and hashing are by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Asset {
    symbol: String,
    asset_type: AssetType,
}

impl Asset {
    pub fn new(symbol: &str, asset_type: AssetType) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            asset_type,
        }
    }

    pub fn stock(symbol: &str) -> Self {
        Self::new(symbol, AssetType::Stock)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.symbol, self.asset_type)
    }
}
