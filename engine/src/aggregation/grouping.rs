// Grouping engine: counts, sums and two-level tallies keyed by record fields.
use indexmap::{IndexMap, IndexSet};
use shared::models::{CrossTab, CrossTabRow};
use shared::{Field, Materia};

/// Counts records per key. Keys keep first-seen order.
pub fn group_count_by<K>(records: &[Materia], key_fn: K) -> IndexMap<String, usize>
where
    K: Fn(&Materia) -> String,
{
    let mut tally = IndexMap::new();
    for record in records {
        *tally.entry(key_fn(record)).or_insert(0) += 1;
    }
    tally
}

/// Counts records per value of `field`; blanks land in the sentinel key.
pub fn group_count(records: &[Materia], field: Field) -> IndexMap<String, usize> {
    group_count_by(records, |m| m.group_key(field))
}

pub fn group_sum_by<K, V>(records: &[Materia], key_fn: K, value_fn: V) -> IndexMap<String, f64>
where
    K: Fn(&Materia) -> String,
    V: Fn(&Materia) -> f64,
{
    let mut tally = IndexMap::new();
    for record in records {
        *tally.entry(key_fn(record)).or_insert(0.0) += value_fn(record);
    }
    tally
}

/// Sums the parsed `sum_field` per value of `group_field`.
pub fn group_sum(
    records: &[Materia],
    group_field: Field,
    sum_field: Field,
) -> IndexMap<String, f64> {
    group_sum_by(records, |m| m.group_key(group_field), |m| m.number(sum_field))
}

pub fn cross_tab_by<A, B>(records: &[Materia], key_a: A, key_b: B) -> CrossTab
where
    A: Fn(&Materia) -> String,
    B: Fn(&Materia) -> String,
{
    let mut columns = IndexSet::new();
    let mut tally: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();
    for record in records {
        let row = key_a(record);
        let column = key_b(record);
        *tally.entry(row).or_default().entry(column.clone()).or_insert(0) += 1;
        columns.insert(column);
    }

    CrossTab {
        columns: columns.into_iter().collect(),
        rows: tally
            .into_iter()
            .map(|(name, values)| CrossTabRow { name, values })
            .collect(),
    }
}

/// `field_a` x `field_b` record counts: one row per distinct `field_a` value.
pub fn cross_tab(records: &[Materia], field_a: Field, field_b: Field) -> CrossTab {
    cross_tab_by(records, |m| m.group_key(field_a), |m| m.group_key(field_b))
}
