//! Turns sparse cumulative readings into dense daily deltas and a monthly
//! roll-up. Nothing here fails: empty or odd input yields zeros.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::model::reading::{Reading, Series};
use crate::model::summary::{DailyDelta, MonthKey, MonthlySummary};
use crate::report::Reporter;
use crate::time::{dates_between, format_record_date, month_key};

/// One reading for every date of the inclusive window.
///
/// A missing date takes the count of the nearest earlier reading, including
/// readings from before the window. Dates earlier than all recorded data take
/// the back-fill value (see [`backfill_value`]). An empty series fills the
/// window with zeros.
pub fn fill_gaps(
    series: &Series,
    window_start: NaiveDate,
    window_end: NaiveDate,
    reporter: &dyn Reporter,
) -> Series {
    if window_start > window_end {
        reporter.warn(&format!(
            "empty window: start {} is after end {}",
            format_record_date(window_start),
            format_record_date(window_end)
        ));
        return Series::new();
    }

    let backfill = backfill_value(series);
    if series.is_empty() {
        reporter.info("no readings recorded, window filled with zeros");
    }

    let mut carried = 0usize;
    let mut backfilled = 0usize;
    let dense: Series = dates_between(window_start, window_end)
        .map(|date| {
            let count = match series.latest_on_or_before(date) {
                Some(reading) if reading.date == date => reading.count,
                Some(reading) => {
                    carried += 1;
                    reading.count
                }
                None => {
                    backfilled += 1;
                    backfill
                }
            };
            Reading::new(date, count)
        })
        .collect();

    if carried + backfilled > 0 {
        reporter.debug(&format!(
            "window {}..{}: {} dates carried forward, {} back-filled with {}",
            format_record_date(window_start),
            format_record_date(window_end),
            carried,
            backfilled,
            backfill
        ));
    }

    dense
}

/// Count used for window dates that precede every reading: the earliest
/// recorded count, or the rounded mean of all counts when the earliest is 0.
/// Zero for an empty series.
pub fn backfill_value(series: &Series) -> u64 {
    match series.first() {
        Some(reading) if reading.count != 0 => reading.count,
        Some(_) => series.mean_count().unwrap_or(0),
        None => 0,
    }
}

/// Day over day change of a dense series. The first date has delta 0.
/// Decreases are kept as negative deltas and reported.
pub fn compute_deltas(dense: &Series, reporter: &dyn Reporter) -> Vec<DailyDelta> {
    let mut previous: Option<u64> = None;
    dense
        .iter()
        .map(|reading| {
            let delta = match previous {
                Some(prev) => {
                    let exact = reading.count as i128 - prev as i128;
                    i64::try_from(exact).unwrap_or_else(|_| {
                        reporter.warn(&format!(
                            "delta on {} does not fit in 64 bits ({}), saturated",
                            format_record_date(reading.date),
                            exact
                        ));
                        saturate(exact)
                    })
                }
                None => 0,
            };
            if delta < 0 {
                reporter.warn(&format!(
                    "counter decreased on {}: {} -> {} ({})",
                    format_record_date(reading.date),
                    previous.unwrap_or_default(),
                    reading.count,
                    delta
                ));
            }
            previous = Some(reading.count);
            DailyDelta {
                date: reading.date,
                delta,
            }
        })
        .collect()
}

/// Sums deltas per calendar month, ascending, followed by the synthetic
/// total row.
pub fn aggregate_monthly(deltas: &[DailyDelta]) -> Vec<MonthlySummary> {
    // i128 sums cannot overflow for any realistic number of i64 deltas
    let mut months: BTreeMap<MonthKey, i128> = BTreeMap::new();
    for day in deltas {
        *months.entry(month_key(day.date)).or_default() += day.delta as i128;
    }

    let total: i128 = months.values().sum();
    let mut summaries: Vec<MonthlySummary> = months
        .into_iter()
        .map(|(month, total)| MonthlySummary {
            month,
            total: saturate(total),
        })
        .collect();
    summaries.push(MonthlySummary {
        month: MonthKey::Total,
        total: saturate(total),
    });
    summaries
}

fn saturate(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Most recent cumulative count of the stored series, 0 when empty.
pub fn latest_value(series: &Series) -> u64 {
    series.last().map(|r| r.count).unwrap_or(0)
}

/// Largest single-day delta, 0 when there are none.
pub fn max_daily_delta(deltas: &[DailyDelta]) -> i64 {
    deltas.iter().map(|d| d.delta).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(readings: &[((i32, u32, u32), u64)]) -> Series {
        readings
            .iter()
            .map(|((y, m, d), count)| Reading::new(ymd(*y, *m, *d), *count))
            .collect()
    }

    fn delta_values(deltas: &[DailyDelta]) -> Vec<i64> {
        deltas.iter().map(|d| d.delta).collect()
    }

    #[test]
    fn test_gap_is_carried_forward() {
        let reporter = RecordingReporter::new();
        let history = series(&[((2024, 1, 1), 100), ((2024, 1, 3), 130)]);

        let dense = fill_gaps(&history, ymd(2024, 1, 1), ymd(2024, 1, 3), &reporter);
        assert_eq!(dense.counts(), vec![100, 100, 130]);

        let deltas = compute_deltas(&dense, &reporter);
        assert_eq!(delta_values(&deltas), vec![0, 0, 30]);

        let monthly = aggregate_monthly(&deltas);
        assert_eq!(
            monthly,
            vec![
                MonthlySummary { month: MonthKey::Month { year: 2024, month: 1 }, total: 30 },
                MonthlySummary { month: MonthKey::Total, total: 30 },
            ]
        );
    }

    #[test]
    fn test_empty_history_yields_zeros() {
        let reporter = RecordingReporter::new();
        let history = Series::new();

        let dense = fill_gaps(&history, ymd(2024, 1, 1), ymd(2024, 1, 5), &reporter);
        assert_eq!(dense.counts(), vec![0; 5]);

        let deltas = compute_deltas(&dense, &reporter);
        assert_eq!(delta_values(&deltas), vec![0; 5]);

        let monthly = aggregate_monthly(&deltas);
        assert_eq!(monthly.last(), Some(&MonthlySummary { month: MonthKey::Total, total: 0 }));
        assert_eq!(latest_value(&history), 0);
    }

    #[test]
    fn test_counter_reset_is_surfaced() {
        let reporter = RecordingReporter::new();
        let history = series(&[((2024, 2, 28), 500), ((2024, 2, 29), 10)]);

        let dense = fill_gaps(&history, ymd(2024, 2, 28), ymd(2024, 2, 29), &reporter);
        let deltas = compute_deltas(&dense, &reporter);
        assert_eq!(delta_values(&deltas), vec![0, -490]);

        let monthly = aggregate_monthly(&deltas);
        assert_eq!(monthly[0].total, -490);
        assert_eq!(monthly[1].total, -490);

        let warnings = reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("20240229"));
        assert!(warnings[0].contains("-490"));
    }

    #[test]
    fn test_deltas_near_max_count_keep_their_sign() {
        let reporter = RecordingReporter::new();
        let top = crate::model::reading::MAX_COUNT;
        let history = series(&[((2024, 2, 1), 0), ((2024, 2, 2), top), ((2024, 2, 3), 0)]);

        let dense = fill_gaps(&history, ymd(2024, 2, 1), ymd(2024, 2, 3), &reporter);
        let deltas = compute_deltas(&dense, &reporter);
        assert_eq!(delta_values(&deltas), vec![0, i64::MAX, -i64::MAX]);

        let monthly = aggregate_monthly(&deltas);
        assert_eq!(monthly[0].total, 0);
        assert_eq!(monthly[1], MonthlySummary { month: MonthKey::Total, total: 0 });
    }

    #[test]
    fn test_out_of_range_counts_do_not_wrap() {
        let reporter = RecordingReporter::new();
        let history = series(&[((2024, 2, 1), 0), ((2024, 2, 2), 1u64 << 63), ((2024, 2, 3), 0)]);

        let dense = fill_gaps(&history, ymd(2024, 2, 1), ymd(2024, 2, 3), &reporter);
        let deltas = compute_deltas(&dense, &reporter);
        assert_eq!(deltas[1].delta, i64::MAX);
        assert_eq!(deltas[2].delta, i64::MIN);
        assert_eq!(reporter.warnings().iter().filter(|w| w.contains("saturated")).count(), 1);

        let same_day = vec![
            DailyDelta { date: ymd(2024, 2, 1), delta: i64::MAX },
            DailyDelta { date: ymd(2024, 2, 2), delta: i64::MAX },
        ];
        assert_eq!(aggregate_monthly(&same_day)[0].total, i64::MAX);
    }

    #[test]
    fn test_window_covers_every_date() {
        let reporter = RecordingReporter::new();
        let history = series(&[((2024, 1, 10), 5), ((2024, 2, 20), 50)]);

        let dense = fill_gaps(&history, ymd(2024, 1, 15), ymd(2024, 3, 15), &reporter);
        // 17 days of January, 29 of February, 15 of March
        assert_eq!(dense.len(), 61);
        let dates: Vec<_> = dense.iter().map(|r| r.date).collect();
        let expected: Vec<_> = dates_between(ymd(2024, 1, 15), ymd(2024, 3, 15)).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_reading_before_window_is_carried_in() {
        let reporter = RecordingReporter::new();
        let history = series(&[((2024, 1, 1), 100), ((2024, 1, 12), 160)]);

        let dense = fill_gaps(&history, ymd(2024, 1, 10), ymd(2024, 1, 12), &reporter);
        assert_eq!(dense.counts(), vec![100, 100, 160]);
    }

    #[test]
    fn test_window_before_history_is_backfilled_with_earliest() {
        let reporter = RecordingReporter::new();
        let history = series(&[((2024, 1, 3), 130), ((2024, 1, 4), 135)]);

        let dense = fill_gaps(&history, ymd(2024, 1, 1), ymd(2024, 1, 4), &reporter);
        assert_eq!(dense.counts(), vec![130, 130, 130, 135]);
        assert_eq!(delta_values(&compute_deltas(&dense, &reporter)), vec![0, 0, 0, 5]);
    }

    #[test]
    fn test_zero_earliest_falls_back_to_mean() {
        let history = series(&[((2024, 1, 3), 0), ((2024, 1, 4), 20), ((2024, 1, 5), 40)]);
        assert_eq!(backfill_value(&history), 20);

        let reporter = RecordingReporter::new();
        let dense = fill_gaps(&history, ymd(2024, 1, 2), ymd(2024, 1, 3), &reporter);
        assert_eq!(dense.counts(), vec![20, 0]);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let reporter = RecordingReporter::new();
        let history = series(&[((2024, 1, 1), 1)]);

        let dense = fill_gaps(&history, ymd(2024, 1, 5), ymd(2024, 1, 1), &reporter);
        assert!(dense.is_empty());
        assert!(compute_deltas(&dense, &reporter).is_empty());
        assert_eq!(reporter.warnings().len(), 1);
    }

    #[test]
    fn test_delta_sum_matches_first_and_last() {
        let reporter = RecordingReporter::new();
        let history = series(&[
            ((2023, 12, 20), 1000),
            ((2023, 12, 27), 1100),
            ((2024, 1, 2), 1090),
            ((2024, 1, 20), 1400),
            ((2024, 2, 3), 1500),
        ]);

        let dense = fill_gaps(&history, ymd(2023, 12, 20), ymd(2024, 2, 3), &reporter);
        let deltas = compute_deltas(&dense, &reporter);
        assert_eq!(deltas.len(), dense.len());
        assert_eq!(deltas[0].delta, 0);

        let sum: i64 = delta_values(&deltas).iter().sum();
        assert_eq!(sum, 1500 - 1000);

        let monthly = aggregate_monthly(&deltas);
        let keys: Vec<String> = monthly.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(keys, vec!["2023/12", "2024/01", "2024/02", "Total Result"]);

        let months_sum: i64 = monthly.iter().filter(|m| !m.is_total()).map(|m| m.total).sum();
        assert_eq!(months_sum, sum);
        assert_eq!(monthly.last().map(|m| m.total), Some(sum));
    }

    #[test]
    fn test_total_row_ignores_grouping() {
        let deltas = vec![
            DailyDelta { date: ymd(2024, 3, 31), delta: 7 },
            DailyDelta { date: ymd(2024, 1, 1), delta: 3 },
            DailyDelta { date: ymd(2024, 3, 1), delta: -2 },
        ];

        let monthly = aggregate_monthly(&deltas);
        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly[0].month, MonthKey::Month { year: 2024, month: 1 });
        assert_eq!(monthly[1].total, 5);
        assert_eq!(monthly[2], MonthlySummary { month: MonthKey::Total, total: 8 });
    }

    #[test]
    fn test_aggregate_empty_has_only_total() {
        assert_eq!(aggregate_monthly(&[]), vec![MonthlySummary { month: MonthKey::Total, total: 0 }]);
    }

    #[test]
    fn test_latest_value_uses_stored_series() {
        let history = series(&[((2024, 1, 5), 150), ((2024, 1, 1), 100)]);
        assert_eq!(latest_value(&history), 150);
    }

    #[test]
    fn test_max_daily_delta() {
        let deltas = vec![
            DailyDelta { date: ymd(2024, 1, 1), delta: 0 },
            DailyDelta { date: ymd(2024, 1, 2), delta: 12 },
            DailyDelta { date: ymd(2024, 1, 3), delta: -20 },
        ];
        assert_eq!(max_daily_delta(&deltas), 12);
        assert_eq!(max_daily_delta(&[]), 0);
    }
}
