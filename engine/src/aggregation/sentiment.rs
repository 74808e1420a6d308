// Coarse sentiment bucketing. Teor/Avaliação are free text ("Muito Positiva",
// "Pouco negativa", ...), matched by case-insensitive substring, not an enum.
use serde::Serialize;
use shared::models::{FieldValue, Granularity, StackedSeries};
use shared::{Field, Materia, RawValue};

use super::grouping::cross_tab_by;
use super::timeline::{stacked_timeline, with_keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Positive wins when both markers appear.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("positiv") {
            Sentiment::Positive
        } else if lower.contains("negativ") {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn of(record: &Materia, field: Field) -> Self {
        match record.get(field) {
            FieldValue::Text(s) => Self::classify(s),
            FieldValue::Raw(RawValue::Text(s)) => Self::classify(s),
            FieldValue::Raw(RawValue::Number(_)) | FieldValue::Missing => Sentiment::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positiva",
            Sentiment::Negative => "Negativa",
            Sentiment::Neutral => "Neutra",
        }
    }
}

/// Sentiment split for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRow {
    pub name: String,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentRow {
    /// Positive plus negative; the ranking charts ignore neutral mentions.
    pub fn polarized(&self) -> usize {
        self.positive + self.negative
    }
}

/// One row per value of `group_field` (first-seen order).
pub fn sentiment_by(
    records: &[Materia],
    group_field: Field,
    sentiment_field: Field,
) -> Vec<SentimentRow> {
    let tab = cross_tab_by(
        records,
        |m| m.group_key(group_field),
        |m| Sentiment::of(m, sentiment_field).label().to_string(),
    );
    tab.rows
        .into_iter()
        .map(|row| SentimentRow {
            positive: row.get(Sentiment::Positive.label()),
            negative: row.get(Sentiment::Negative.label()),
            neutral: row.get(Sentiment::Neutral.label()),
            name: row.name,
        })
        .collect()
}

/// Rows ordered by polarized total, descending and stable.
pub fn rank_by_polarized(mut rows: Vec<SentimentRow>) -> Vec<SentimentRow> {
    rows.sort_by(|a, b| b.polarized().cmp(&a.polarized()));
    rows
}

/// Stacked per-bucket sentiment counts, keyed Positiva/Negativa/Neutra.
pub fn sentiment_timeline(
    records: &[Materia],
    granularity: Granularity,
    sentiment_field: Field,
) -> StackedSeries {
    let series = stacked_timeline(records, granularity, |m| {
        Sentiment::of(m, sentiment_field).label().to_string()
    });
    with_keys(series, Sentiment::ALL.iter().map(|s| s.label().to_string()).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentTotals {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub positive_pct: f64,
    pub negative_pct: f64,
}

impl SentimentTotals {
    pub fn compute(records: &[Materia], sentiment_field: Field) -> Self {
        let mut totals = SentimentTotals {
            total: records.len(),
            positive: 0,
            negative: 0,
            neutral: 0,
            positive_pct: 0.0,
            negative_pct: 0.0,
        };
        for record in records {
            match Sentiment::of(record, sentiment_field) {
                Sentiment::Positive => totals.positive += 1,
                Sentiment::Negative => totals.negative += 1,
                Sentiment::Neutral => totals.neutral += 1,
            }
        }
        if totals.total > 0 {
            totals.positive_pct = totals.positive as f64 / totals.total as f64 * 100.0;
            totals.negative_pct = totals.negative as f64 / totals.total as f64 * 100.0;
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(midia: &str, teor: Option<&str>, data: &str) -> Materia {
        Materia {
            midia: Some(midia.to_string()),
            teor: teor.map(str::to_string),
            data: Some(data.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_substrings() {
        assert_eq!(Sentiment::classify("Muito Positiva"), Sentiment::Positive);
        assert_eq!(Sentiment::classify("pouco positiva"), Sentiment::Positive);
        assert_eq!(Sentiment::classify("NEGATIVA"), Sentiment::Negative);
        assert_eq!(Sentiment::classify("Negativo"), Sentiment::Negative);
        assert_eq!(Sentiment::classify("Neutra"), Sentiment::Neutral);
        assert_eq!(Sentiment::classify(""), Sentiment::Neutral);
    }

    #[test]
    fn test_sentiment_by_group() {
        let records = vec![
            rated("TV", Some("Positiva"), "01/01/2024"),
            rated("TV", Some("Muito Negativa"), "01/01/2024"),
            rated("Web", Some("Positiva"), "02/01/2024"),
            rated("Web", None, "02/01/2024"),
            rated("Web", Some("Pouco Positiva"), "xx"),
        ];
        let rows = sentiment_by(&records, Field::Midia, Field::Teor);
        assert_eq!(rows.len(), 2);
        let row = |name: &str, positive, negative, neutral| SentimentRow {
            name: name.into(),
            positive,
            negative,
            neutral,
        };
        assert_eq!(rows[0], row("TV", 1, 1, 0));
        assert_eq!(rows[1], row("Web", 2, 0, 1));

        let ranked = rank_by_polarized(rows);
        assert_eq!(ranked[0].name, "TV");
    }

    #[test]
    fn test_sentiment_field_is_selectable() {
        let mut record = rated("TV", Some("Negativa"), "01/01/2024");
        record.avaliacao = Some("Positiva".into());
        assert_eq!(Sentiment::of(&record, Field::Teor), Sentiment::Negative);
        assert_eq!(Sentiment::of(&record, Field::Avaliacao), Sentiment::Positive);
    }

    #[test]
    fn test_sentiment_timeline_fixed_keys() {
        let records = vec![
            rated("TV", Some("Positiva"), "01/01/2024"),
            rated("TV", Some("Positiva"), "03/01/2024"),
        ];
        let series = sentiment_timeline(&records, Granularity::Day, Field::Teor);
        assert_eq!(series.keys, vec!["Positiva", "Negativa", "Neutra"]);
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].values["Negativa"], 0);
        assert_eq!(series.points[1].values["Positiva"], 1);
    }

    #[test]
    fn test_totals_percentages() {
        let records = vec![
            rated("TV", Some("Positiva"), ""),
            rated("TV", Some("Negativa"), ""),
            rated("TV", Some("Positiva"), ""),
            rated("TV", None, ""),
        ];
        let totals = SentimentTotals::compute(&records, Field::Teor);
        assert_eq!((totals.positive, totals.negative, totals.neutral), (2, 1, 1));
        assert_eq!(totals.positive_pct, 50.0);
        assert_eq!(totals.negative_pct, 25.0);
        assert_eq!(SentimentTotals::compute(&[], Field::Teor).positive_pct, 0.0);
    }
}
