//! Asset-class heuristics for holdings.
//!
//! Holdings carry no asset class of their own; it is derived from the ticker
//! symbol and the instrument name. The default rules are keyword tables tuned
//! for Borsa Italiana listings and can be replaced through configuration or
//! by supplying another [`AssetClassifier`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Asset classes used for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Stocks,
    Bonds,
    Etf,
}

impl AssetCategory {
    /// Order used for presentation and rounding reconciliation.
    pub const DISPLAY_ORDER: [AssetCategory; 3] =
        [AssetCategory::Stocks, AssetCategory::Bonds, AssetCategory::Etf];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Stocks => "stocks",
            AssetCategory::Bonds => "bonds",
            AssetCategory::Etf => "etf",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an instrument to exactly one asset class.
pub trait AssetClassifier: Send + Sync {
    fn classify(&self, symbol: &str, name: &str) -> AssetCategory;
}

/// Keywords that mark an instrument as belonging to one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordRule {
    pub symbol: Vec<String>,
    pub name: Vec<String>,
}

impl KeywordRule {
    fn new(symbol: &[&str], name: &[&str]) -> Self {
        KeywordRule {
            symbol: symbol.iter().map(|s| s.to_string()).collect(),
            name: name.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Inputs are expected upper-cased already.
    fn matches(&self, symbol: &str, name: &str) -> bool {
        self.symbol.iter().any(|k| symbol.contains(&k.to_uppercase()))
            || self.name.iter().any(|k| name.contains(&k.to_uppercase()))
    }
}

/// Case-insensitive substring rules, checked bonds → etf → stocks.
///
/// Keywords overlap between categories, so the order is significant.
/// Anything unmatched falls back to stocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordClassifier {
    pub bonds: KeywordRule,
    pub etf: KeywordRule,
    pub stocks: KeywordRule,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        KeywordClassifier {
            bonds: KeywordRule::new(&["BTP", "CTZ", "CCT", "CORP-BOND", "BOND"], &["BOND", "BTP", "OBBLIGAZ"]),
            etf: KeywordRule::new(&["FTSE-MIB", "MSCI", "ISHARES", "VANGUARD", "ETF"], &["ETF", "INDEX"]),
            stocks: KeywordRule::new(
                &["ENI", "ENEL", "UCG", "ISP", "TIT", "RACE", "G", "STM"],
                &["S.P.A", "N.V."],
            ),
        }
    }
}

impl KeywordClassifier {
    /// The category whose keywords match, or `None` when only the fallback applies.
    pub fn explicit_match(&self, symbol: &str, name: &str) -> Option<AssetCategory> {
        let symbol = symbol.to_uppercase();
        let name = name.to_uppercase();

        [
            (AssetCategory::Bonds, &self.bonds),
            (AssetCategory::Etf, &self.etf),
            (AssetCategory::Stocks, &self.stocks),
        ]
        .into_iter()
        .find(|(_, rule)| rule.matches(&symbol, &name))
        .map(|(category, _)| category)
    }
}

impl AssetClassifier for KeywordClassifier {
    fn classify(&self, symbol: &str, name: &str) -> AssetCategory {
        self.explicit_match(symbol, name)
            .unwrap_or(AssetCategory::Stocks)
    }
}

/// Shared instance of the built-in keyword tables.
pub fn default_classifier() -> &'static KeywordClassifier {
    static DEFAULT: OnceLock<KeywordClassifier> = OnceLock::new();
    DEFAULT.get_or_init(KeywordClassifier::default)
}

/// Classify with the built-in keyword tables.
pub fn categorize(symbol: &str, name: &str) -> AssetCategory {
    default_classifier().classify(symbol, name)
}
