use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable instrument identifier (ticker symbol).
///
/// Ordered so that ledger positions and journal lots can live in a `BTreeMap`
/// and iterate in the same order on every run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for InstrumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_ids_order_lexically() {
        let mut ids = vec![InstrumentId::from("SPY"), InstrumentId::from("AAPL")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "AAPL");
    }

    #[test]
    fn instrument_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&InstrumentId::from("QQQ")).unwrap();
        assert_eq!(json, "\"QQQ\"");
    }
}
