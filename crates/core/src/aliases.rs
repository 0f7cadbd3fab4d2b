use std::collections::BTreeMap;

/// Display alias → provider-native symbol pairs served out of the box.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("SPX", "^GSPC"),
    ("DJI", "^DJI"),
    ("NDX", "^NDX"),
    ("IWM", "IWM"),
    ("DAX", "^GDAXI"),
    ("ESX50", "^STOXX50E"),
    ("URTH", "URTH"),
    ("DBC", "DBC"),
    ("Bitcoin", "BTC-USD"),
    ("Ethereum", "ETH-USD"),
    ("DJT", "DJT"),
    ("GSCI", "^SPGSCI"),
    ("FTSE", "^FTSE"),
    ("NIKKEI", "^N225"),
    ("SSEC", "000001.SS"),
    ("HSI", "^HSI"),
    ("VIX", "^VIX"),
    ("GLD", "GLD"),
    ("SLV", "SLV"),
    ("USO", "USO"),
    ("TLT", "TLT"),
    ("DXY", "DX-Y.NYB"),
    ("EURUSD=X", "EURUSD=X"),
    ("JPY=X", "USDJPY=X"),
    ("AAPL", "AAPL"),
    ("MSFT", "MSFT"),
    ("XOM", "XOM"),
    ("JPM", "JPM"),
    ("WMT", "WMT"),
    ("GDX", "GDX"),
    ("XLF", "XLF"),
];

/// Immutable alias table mapping short display names to provider symbols.
///
/// Built once at startup and shared read-only; lookups never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    /// The built-in table of index, commodity, FX, crypto and equity aliases.
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_ALIASES.iter().copied())
    }

    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Return a new table with `overrides` added on top of this one.
    /// An override for an existing alias replaces its symbol.
    pub fn with_overrides<'a, I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut entries = self.entries.clone();
        for (alias, symbol) in overrides {
            entries.insert(alias.clone(), symbol.clone());
        }
        Self { entries }
    }

    /// Map `name` to its provider symbol, or pass it through unchanged.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in alias order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}
