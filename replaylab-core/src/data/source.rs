//! Bar sources — the engine's view of historical data.
//!
//! The BarSource trait abstracts over where bars come from (CSV, Parquet,
//! synthetic) so the engine and strategies never touch I/O.

use crate::domain::{Bar, InstrumentId};

/// A finite, chronologically ordered stream of bars plus a full-history snapshot.
///
/// `bars()` must yield timestamps in non-decreasing order and must return the
/// same sequence every time it is called. `history()` may be consulted at any
/// time, typically from a strategy's `prepare` hook.
pub trait BarSource: Send + Sync {
    /// Lazily iterate every bar in delivery order.
    fn bars(&self) -> Box<dyn Iterator<Item = &Bar> + '_>;

    /// The complete history, in delivery order.
    fn history(&self) -> &[Bar];

    /// Bars for one instrument, in delivery order.
    fn history_for(&self, instrument: &InstrumentId) -> Vec<&Bar> {
        self.history()
            .iter()
            .filter(|bar| &bar.instrument == instrument)
            .collect()
    }

    /// Distinct instruments, in order of first appearance.
    fn instruments(&self) -> Vec<InstrumentId> {
        let mut seen: Vec<InstrumentId> = Vec::new();
        for bar in self.history() {
            if !seen.contains(&bar.instrument) {
                seen.push(bar.instrument.clone());
            }
        }
        seen
    }

    fn len(&self) -> usize {
        self.history().len()
    }

    fn is_empty(&self) -> bool {
        self.history().is_empty()
    }
}

/// Bars held in memory, stable-sorted by timestamp.
///
/// Bars sharing a timestamp keep the order in which they were supplied.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBarSource {
    bars: Vec<Bar>,
}

impl InMemoryBarSource {
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|bar| bar.timestamp);
        Self { bars }
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

impl BarSource for InMemoryBarSource {
    fn bars(&self) -> Box<dyn Iterator<Item = &Bar> + '_> {
        Box::new(self.bars.iter())
    }

    fn history(&self) -> &[Bar] {
        &self.bars
    }
}

impl From<Vec<Bar>> for InMemoryBarSource {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(sym: &str, d: u32, close: f64) -> Bar {
        Bar {
            timestamp: day(d),
            instrument: InstrumentId::from(sym),
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    #[test]
    fn sorts_by_timestamp_and_keeps_ties_stable() {
        let source = InMemoryBarSource::new(vec![
            bar("SPY", 3, 3.0),
            bar("QQQ", 2, 20.0),
            bar("SPY", 2, 2.0),
            bar("AAA", 3, 30.0),
        ]);
        let order: Vec<(String, f64)> = source
            .bars()
            .map(|b| (b.instrument.to_string(), b.close))
            .collect();
        assert_eq!(
            order,
            vec![
                ("QQQ".to_string(), 20.0),
                ("SPY".to_string(), 2.0),
                ("SPY".to_string(), 3.0),
                ("AAA".to_string(), 30.0),
            ]
        );
    }

    #[test]
    fn bars_is_restartable() {
        let source = InMemoryBarSource::new(vec![bar("SPY", 1, 1.0), bar("SPY", 2, 2.0)]);
        assert_eq!(source.bars().count(), 2);
        assert_eq!(source.bars().count(), 2);
    }

    #[test]
    fn history_for_filters_instrument() {
        let source = InMemoryBarSource::new(vec![
            bar("SPY", 1, 1.0),
            bar("QQQ", 1, 10.0),
            bar("SPY", 2, 2.0),
        ]);
        let spy = source.history_for(&InstrumentId::from("SPY"));
        assert_eq!(spy.len(), 2);
        assert_eq!(
            source.instruments(),
            vec![InstrumentId::from("SPY"), InstrumentId::from("QQQ")]
        );
    }

    #[test]
    fn empty_source() {
        let source = InMemoryBarSource::default();
        assert!(source.is_empty());
        assert_eq!(source.bars().count(), 0);
    }
}
