// Chart-data formatter: unordered tallies -> `{name, value}` lists ready for
// ranking/pie charts. Every "Top N" view slices the output of `to_chart_data`.
use indexmap::IndexMap;
use shared::models::{ChartDatum, CrossTabRow};
use shared::SENTINEL;

/// Tally values a chart can plot.
pub trait ChartValue: Copy {
    fn to_f64(self) -> f64;
}

impl ChartValue for usize {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl ChartValue for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

/// Sorted by value descending. The sort is stable, so ties keep the map's
/// insertion order; there is no alphabetic tie-break.
pub fn to_chart_data<V: ChartValue>(grouped: &IndexMap<String, V>) -> Vec<ChartDatum> {
    let mut data: Vec<ChartDatum> = grouped
        .iter()
        .map(|(name, value)| ChartDatum {
            name: name.clone(),
            value: value.to_f64(),
        })
        .collect();
    data.sort_by(|a, b| b.value.total_cmp(&a.value));
    data
}

pub fn top_n(mut data: Vec<ChartDatum>, n: usize) -> Vec<ChartDatum> {
    data.truncate(n);
    data
}

/// Drops the sentinel and empty names (rankings of "who was cited").
pub fn without_sentinel(data: Vec<ChartDatum>) -> Vec<ChartDatum> {
    data.into_iter()
        .filter(|d| d.name != SENTINEL && !d.name.is_empty())
        .collect()
}

/// Cross-tab rows ordered by row total, descending and stable.
pub fn rank_rows(mut rows: Vec<CrossTabRow>) -> Vec<CrossTabRow> {
    rows.sort_by(|a, b| b.total().cmp(&a.total()));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(data: &[ChartDatum]) -> Vec<&str> {
        data.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_sorted_descending() {
        let mut grouped = IndexMap::new();
        grouped.insert("a".to_string(), 1usize);
        grouped.insert("b".to_string(), 5);
        grouped.insert("c".to_string(), 3);
        let data = to_chart_data(&grouped);
        assert_eq!(names(&data), vec!["b", "c", "a"]);
        assert_eq!(data[0].value, 5.0);
        assert!(data.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut grouped = IndexMap::new();
        grouped.insert("zeta".to_string(), 2.0);
        grouped.insert("alpha".to_string(), 2.0);
        grouped.insert("mid".to_string(), 7.5);
        grouped.insert("beta".to_string(), 2.0);
        let data = to_chart_data(&grouped);
        assert_eq!(names(&data), vec!["mid", "zeta", "alpha", "beta"]);
    }

    #[test]
    fn test_top_n_and_sentinel_filter() {
        let mut grouped = IndexMap::new();
        grouped.insert(SENTINEL.to_string(), 10usize);
        grouped.insert("Agência Brasil".to_string(), 4);
        grouped.insert("Ministério".to_string(), 3);
        let data = without_sentinel(to_chart_data(&grouped));
        assert_eq!(names(&data), vec!["Agência Brasil", "Ministério"]);
        assert_eq!(top_n(data.clone(), 1).len(), 1);
        assert_eq!(top_n(data, 10).len(), 2);
    }

    #[test]
    fn test_empty_map() {
        let grouped: IndexMap<String, f64> = IndexMap::new();
        assert!(to_chart_data(&grouped).is_empty());
    }

    #[test]
    fn test_rank_rows_by_total() {
        let row = |name: &str, p: usize, q: usize| CrossTabRow {
            name: name.to_string(),
            values: [("p".to_string(), p), ("q".to_string(), q)].into_iter().collect(),
        };
        let ranked = rank_rows(vec![row("a", 1, 0), row("b", 2, 2), row("c", 0, 1)]);
        let order: Vec<_> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
