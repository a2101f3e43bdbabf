//! Weekly aggregation of raw sales history

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::calendar::week_start;
use crate::models::{SaleEvent, WeeklyBucket};

/// Weekly sales totals, unique and ascending by week start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySeries {
    buckets: Vec<WeeklyBucket>,
}

impl WeeklySeries {
    /// Group sales up to and including `today` into Monday-aligned weeks
    pub fn from_events<'a, I>(events: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a SaleEvent>,
    {
        let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for event in events.into_iter().filter(|e| e.date <= today) {
            *totals.entry(week_start(event.date)).or_insert(Decimal::ZERO) +=
                event.effective_quantity();
        }

        let buckets = totals
            .into_iter()
            .map(|(week_start, total_quantity)| WeeklyBucket {
                week_start,
                total_quantity,
            })
            .collect();

        Self { buckets }
    }

    /// No sales recorded at all
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn buckets(&self) -> &[WeeklyBucket] {
        &self.buckets
    }

    /// Total for the week starting on `week_start`, if any sales fell in it
    pub fn total_for(&self, week_start: NaiveDate) -> Option<Decimal> {
        self.buckets
            .binary_search_by_key(&week_start, |b| b.week_start)
            .ok()
            .map(|i| self.buckets[i].total_quantity)
    }

    pub fn latest(&self) -> Option<&WeeklyBucket> {
        self.buckets.last()
    }

    /// The last `n` weeks, fewer when history is shorter
    pub fn tail(&self, n: usize) -> &[WeeklyBucket] {
        &self.buckets[self.buckets.len().saturating_sub(n)..]
    }
}

/// Aggregate a product's sales into its weekly demand series
pub fn aggregate_weekly(events: &[SaleEvent], today: NaiveDate) -> WeeklySeries {
    WeeklySeries::from_events(events, today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(d: NaiveDate, qty: i64) -> SaleEvent {
        SaleEvent::new(1, d, Decimal::from(qty))
    }

    #[test]
    fn test_empty_history() {
        let series = aggregate_weekly(&[], date(2024, 6, 13));
        assert!(series.is_empty());
        assert!(series.latest().is_none());
        assert!(series.tail(4).is_empty());
    }

    #[test]
    fn test_same_week_sales_are_summed() {
        let events = vec![
            sale(date(2024, 6, 11), 4),
            sale(date(2024, 6, 3), 2),
            sale(date(2024, 6, 16), 6),
        ];
        let series = aggregate_weekly(&events, date(2024, 6, 20));

        assert_eq!(series.len(), 2);
        assert_eq!(series.buckets()[0].week_start, date(2024, 6, 3));
        assert_eq!(series.buckets()[0].total_quantity, Decimal::from(2));
        assert_eq!(series.buckets()[1].week_start, date(2024, 6, 10));
        assert_eq!(series.buckets()[1].total_quantity, Decimal::from(10));
    }

    #[test]
    fn test_unparseable_quantity_counts_as_zero() {
        let events = vec![
            SaleEvent::from_raw(1, date(2024, 6, 11), Some("12.5")),
            SaleEvent::from_raw(1, date(2024, 6, 12), Some("twelve")),
            SaleEvent::from_raw(1, date(2024, 6, 13), None),
        ];
        let series = aggregate_weekly(&events, date(2024, 6, 14));

        assert_eq!(series.len(), 1);
        assert_eq!(series.buckets()[0].total_quantity, Decimal::new(125, 1));
    }

    #[test]
    fn test_future_sales_are_ignored() {
        let events = vec![sale(date(2024, 6, 11), 4), sale(date(2024, 6, 19), 9)];
        let series = aggregate_weekly(&events, date(2024, 6, 12));

        assert_eq!(series.len(), 1);
        assert_eq!(series.total_for(date(2024, 6, 17)), None);
    }

    #[test]
    fn test_tail_is_chronological() {
        let events: Vec<SaleEvent> = (0..6)
            .map(|w| sale(date(2024, 1, 1) + chrono::Duration::weeks(w), w + 1))
            .collect();
        let series = aggregate_weekly(&events, date(2024, 12, 31));

        let tail: Vec<Decimal> = series.tail(4).iter().map(|b| b.total_quantity).collect();
        assert_eq!(
            tail,
            vec![
                Decimal::from(3),
                Decimal::from(4),
                Decimal::from(5),
                Decimal::from(6)
            ]
        );
    }
}
