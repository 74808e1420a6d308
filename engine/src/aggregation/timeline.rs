// Time-bucketing engine. Records whose `Data` does not parse are left out of
// every bucket; buckets are sparse and ordered by their zero-padded key.
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use shared::brazilian_format::{day_key, day_label, month_key, month_label};
use shared::models::{AverageBasis, Granularity, StackedPoint, StackedSeries, TimeBucket};
use shared::{Field, Materia};

/// Machine-sortable key and display label of the bucket holding `date`.
pub fn bucket_of(date: NaiveDate, granularity: Granularity) -> (String, String) {
    match granularity {
        Granularity::Day => (day_key(date), day_label(date)),
        Granularity::Month => (month_key(date), month_label(date)),
    }
}

struct BucketAccumulator {
    label: String,
    count: usize,
    days: BTreeSet<NaiveDate>,
    sums: IndexMap<String, f64>,
}

pub fn bucket_by_time(
    records: &[Materia],
    granularity: Granularity,
    value_fields: &[Field],
) -> Vec<TimeBucket> {
    let fields: IndexSet<Field> = value_fields.iter().copied().collect();
    let mut buckets: BTreeMap<String, BucketAccumulator> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(date) = record.date() else {
            skipped += 1;
            continue;
        };
        let (key, label) = bucket_of(date, granularity);
        let bucket = buckets.entry(key).or_insert_with(|| BucketAccumulator {
            label,
            count: 0,
            days: BTreeSet::new(),
            sums: fields.iter().map(|f| (f.column().to_string(), 0.0)).collect(),
        });
        bucket.count += 1;
        bucket.days.insert(date);
        for field in &fields {
            *bucket.sums.entry(field.column().to_string()).or_insert(0.0) += record.number(*field);
        }
    }

    if skipped > 0 {
        tracing::trace!(
            skipped,
            ?granularity,
            "Records without a valid date left out of the series"
        );
    }

    buckets
        .into_iter()
        .map(|(key, bucket)| TimeBucket {
            key,
            label: bucket.label,
            count: bucket.count,
            distinct_days: bucket.days.len(),
            sums: bucket.sums,
            averages: IndexMap::new(),
        })
        .collect()
}

/// Fills each bucket's `averages` for `fields`, dividing the sums by `basis`.
pub fn with_averages(
    buckets: Vec<TimeBucket>,
    fields: &[Field],
    basis: AverageBasis,
) -> Vec<TimeBucket> {
    buckets
        .into_iter()
        .map(|mut bucket| {
            for field in fields {
                let average = bucket.average(*field, basis);
                bucket.averages.insert(field.column().to_string(), average);
            }
            bucket
        })
        .collect()
}

/// Per-bucket counts of a categorical key, default-filled so every point
/// carries every category seen in the dated records (stacked charts).
pub fn stacked_timeline<K>(
    records: &[Materia],
    granularity: Granularity,
    key_fn: K,
) -> StackedSeries
where
    K: Fn(&Materia) -> String,
{
    let mut keys = IndexSet::new();
    let mut points: BTreeMap<String, (String, IndexMap<String, usize>)> = BTreeMap::new();

    for record in records {
        let Some(date) = record.date() else {
            continue;
        };
        let category = key_fn(record);
        let (key, label) = bucket_of(date, granularity);
        let (_, tally) = points.entry(key).or_insert_with(|| (label, IndexMap::new()));
        *tally.entry(category.clone()).or_insert(0) += 1;
        keys.insert(category);
    }

    let keys: Vec<String> = keys.into_iter().collect();
    let points = points
        .into_iter()
        .map(|(key, (label, tally))| StackedPoint {
            key,
            label,
            values: keys
                .iter()
                .map(|k| (k.clone(), tally.get(k).copied().unwrap_or(0)))
                .collect(),
        })
        .collect();
    StackedSeries { keys, points }
}

/// Re-keys a stacked series to a fixed category list, filling gaps with 0.
pub fn with_keys(series: StackedSeries, keys: Vec<String>) -> StackedSeries {
    let points = series
        .points
        .into_iter()
        .map(|point| StackedPoint {
            values: keys
                .iter()
                .map(|k| (k.clone(), point.values.get(k).copied().unwrap_or(0)))
                .collect(),
            ..point
        })
        .collect();
    StackedSeries { keys, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::RawValue;

    fn dated(date: &str, valor: Option<&str>) -> Materia {
        Materia {
            data: Some(date.to_string()),
            valor: valor.map(RawValue::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_month_buckets_example() {
        let records = vec![
            dated("01/01/2024", None),
            dated("01/01/2024", None),
            dated("15/02/2024", None),
            dated("not-a-date", None),
        ];
        let buckets = bucket_by_time(&records, Granularity::Month, &[]);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "2024-01");
        assert_eq!(buckets[0].label, "jan/24");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].key, "2024-02");
        assert_eq!(buckets[1].label, "fev/24");
        assert_eq!(buckets[1].count, 1);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_day_buckets_sorted_chronologically_not_by_label() {
        let records = vec![
            dated("02/01/2025", None),
            dated("31/12/2024", None),
            dated("05/01/2024", None),
        ];
        let buckets = bucket_by_time(&records, Granularity::Day, &[]);
        let keys: Vec<_> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-01-05", "2024-12-31", "2025-01-02"]);
        assert_eq!(buckets[1].label, "31/12/24");
    }

    #[test]
    fn test_sums_and_daily_average_policy() {
        let records = vec![
            dated("01/03/2024", Some("100,00")),
            dated("01/03/2024", Some("50")),
            dated("01/03/2024", None),
            dated("20/03/2024", Some("1.050,00")),
        ];
        let buckets =
            bucket_by_time(&records, Granularity::Month, &[Field::Valor, Field::Valor]);
        assert_eq!(buckets.len(), 1);
        let march = &buckets[0];
        assert_eq!(march.count, 4);
        assert_eq!(march.distinct_days, 2);
        assert_eq!(march.sums.len(), 1);
        assert_eq!(march.sum(Field::Valor), 1200.0);
        assert_eq!(march.average(Field::Valor, AverageBasis::PerRecord), 300.0);
        assert_eq!(march.average(Field::Valor, AverageBasis::PerDistinctDay), 600.0);
        assert_eq!(march.daily_average_count(), 2.0);
    }

    #[test]
    fn test_with_averages_per_record() {
        let records = vec![
            dated("01/03/2024", Some("100")),
            dated("02/03/2024", Some("300")),
            dated("01/04/2024", None),
        ];
        let buckets = bucket_by_time(&records, Granularity::Month, &[Field::Valor]);
        let buckets = with_averages(buckets, &[Field::Valor], AverageBasis::PerRecord);
        assert_eq!(buckets[0].averages["Valor"], 200.0);
        assert_eq!(buckets[1].averages["Valor"], 0.0);
        assert_eq!(buckets[0].sum(Field::Valor), 400.0);
    }

    #[test]
    fn test_sparse_series_has_no_gap_buckets() {
        let records = vec![dated("10/01/2024", None), dated("10/04/2024", None)];
        let buckets = bucket_by_time(&records, Granularity::Month, &[]);
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn test_all_dates_invalid() {
        let records = vec![dated("31/04/2024", None), Materia::default()];
        assert!(bucket_by_time(&records, Granularity::Day, &[Field::Vmn]).is_empty());
    }

    #[test]
    fn test_stacked_timeline_default_fill() {
        let mut records = vec![
            dated("01/01/2024", None),
            dated("01/01/2024", None),
            dated("02/01/2024", None),
        ];
        records[0].destaque = Some("Alto".into());
        records[1].destaque = Some("Baixo".into());
        records[2].destaque = Some("Alto".into());

        let series = stacked_timeline(&records, Granularity::Day, |m| m.group_key(Field::Destaque));
        assert_eq!(series.keys, vec!["Alto", "Baixo"]);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[1].label, "02/01/24");
        assert_eq!(series.points[1].values["Alto"], 1);
        assert_eq!(series.points[1].values["Baixo"], 0);

        let rekeyed = with_keys(series, vec!["Baixo".into(), "Médio".into()]);
        assert_eq!(rekeyed.points[0].values.get("Médio"), Some(&0));
        assert_eq!(rekeyed.points[0].values.get("Alto"), None);
        assert_eq!(rekeyed.points[0].values["Baixo"], 1);
    }
}
