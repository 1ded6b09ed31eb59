//! Series aligner: outer join of price, PBR, and event series onto one
//! ascending, duplicate-free date axis.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{AlignedRow, EventMarker, PbrPoint, PricePoint};

/// Outer join on date. Each output row carries whichever of price/PBR/events
/// exist on that date; the rest stay absent. Duplicate price or PBR dates
/// keep the first value seen; duplicate events all survive.
pub fn align(prices: &[PricePoint], pbrs: &[PbrPoint], events: &[EventMarker]) -> Vec<AlignedRow> {
    let mut rows: BTreeMap<NaiveDate, AlignedRow> = BTreeMap::new();

    for price in prices {
        let row = rows
            .entry(price.date)
            .or_insert_with(|| AlignedRow::empty(price.date));
        if row.price.is_none() {
            row.price = Some(price.close);
        }
    }
    for pbr in pbrs {
        let row = rows
            .entry(pbr.date)
            .or_insert_with(|| AlignedRow::empty(pbr.date));
        if row.pbr.is_none() {
            row.pbr = Some(pbr.ratio);
        }
    }
    for event in events {
        rows.entry(event.date)
            .or_insert_with(|| AlignedRow::empty(event.date))
            .events
            .push(event.label.clone());
    }

    rows.into_values().collect()
}

/// Bridge interior price/PBR gaps by straight-line interpolation between the
/// nearest known points, weighted by calendar-day distance. A deliberate
/// simplification for continuous plotting; never extrapolates past the first
/// or last known value.
pub fn interpolate_gaps(mut rows: Vec<AlignedRow>) -> Vec<AlignedRow> {
    fill_linear(&mut rows, |row| &mut row.price);
    fill_linear(&mut rows, |row| &mut row.pbr);
    rows
}

fn fill_linear<F>(rows: &mut [AlignedRow], mut field: F)
where
    F: FnMut(&mut AlignedRow) -> &mut Option<f64>,
{
    let known: Vec<(usize, NaiveDate, f64)> = rows
        .iter_mut()
        .enumerate()
        .filter_map(|(i, row)| {
            let date = row.date;
            (*field(row)).map(|v| (i, date, v))
        })
        .collect();

    for pair in known.windows(2) {
        let (lo_idx, lo_date, lo_val) = pair[0];
        let (hi_idx, hi_date, hi_val) = pair[1];
        let span = (hi_date - lo_date).num_days();
        if span <= 0 {
            continue;
        }
        for row in &mut rows[lo_idx + 1..hi_idx] {
            let t = (row.date - lo_date).num_days() as f64 / span as f64;
            let slot = field(row);
            if slot.is_none() {
                *slot = Some(lo_val + (hi_val - lo_val) * t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn price(d: u32, close: f64) -> PricePoint {
        PricePoint {
            date: date(d),
            close,
            currency: Currency::Usd,
        }
    }

    fn pbr(d: u32, ratio: f64) -> PbrPoint {
        PbrPoint {
            date: date(d),
            ratio,
        }
    }

    #[test]
    fn test_output_is_sorted_and_duplicate_free() {
        let prices = vec![price(5, 10.0), price(3, 9.0), price(5, 11.0)];
        let pbrs = vec![pbr(4, 1.5), pbr(3, 1.4)];
        let rows = align(&prices, &pbrs, &[]);
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
        // First price wins for the duplicated date
        assert_eq!(rows[2].price, Some(10.0));
    }

    #[test]
    fn test_disjoint_series_populate_one_field_each() {
        // Price on odd days, PBR on even days
        let prices = vec![price(1, 10.0), price(3, 11.0), price(5, 12.0)];
        let pbrs = vec![pbr(2, 1.1), pbr(4, 1.2)];
        let rows = align(&prices, &pbrs, &[]);
        assert_eq!(rows.len(), 5);
        for row in &rows {
            let populated = usize::from(row.price.is_some()) + usize::from(row.pbr.is_some());
            assert_eq!(populated, 1, "exactly one field on {}", row.date);
        }
    }

    #[test]
    fn test_events_join_and_stack() {
        let prices = vec![price(3, 10.0)];
        let events = vec![
            EventMarker {
                date: date(3),
                label: "Dividend 25".to_string(),
            },
            EventMarker {
                date: date(3),
                label: "Earnings".to_string(),
            },
            EventMarker {
                date: date(9),
                label: "Split 3:1".to_string(),
            },
        ];
        let rows = align(&prices, &[], &events);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].events.len(), 2);
        assert_eq!(rows[1].price, None);
        assert_eq!(rows[1].events, vec!["Split 3:1".to_string()]);
    }

    #[test]
    fn test_empty_inputs_align_to_zero_rows() {
        assert!(align(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_interpolation_fills_interior_gaps_only() {
        let prices = vec![price(1, 10.0), price(5, 18.0)];
        let pbrs = vec![pbr(3, 2.0)];
        let mut rows = align(&prices, &pbrs, &[]);
        // Add a leading row with no price to prove no extrapolation happens
        rows.insert(0, AlignedRow::empty(NaiveDate::from_ymd_opt(2022, 12, 30).unwrap()));

        let rows = interpolate_gaps(rows);
        assert_eq!(rows[0].price, None);
        assert_eq!(rows[0].pbr, None);
        // Day 3 sits midway between day 1 (10.0) and day 5 (18.0)
        assert_eq!(rows[2].price, Some(14.0));
        // PBR has a single known point, so nothing to bridge
        assert_eq!(rows[1].pbr, None);
        assert_eq!(rows[3].pbr, None);
    }

    #[test]
    fn test_interpolation_preserves_known_values() {
        let prices = vec![price(1, 10.0), price(2, 11.0), price(3, 12.0)];
        let rows = interpolate_gaps(align(&prices, &[], &[]));
        assert_eq!(rows[1].price, Some(11.0));
    }
}
