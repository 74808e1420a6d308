// Time-based sections: volume/value over time and the sentiment page.
use std::cmp::Reverse;

use serde_json::{json, Value};
use shared::models::{AverageBasis, ChartDatum, Granularity};
use shared::{Field, Materia};

use super::{ranking, Chart};
use crate::aggregation::sentiment::{sentiment_timeline, SentimentTotals};
use crate::aggregation::{bucket_by_time, group_count, to_chart_data, with_averages, Sentiment};
use crate::config::DashboardSettings;
use crate::views::ChartPayload;

pub fn timeline(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let monthly = bucket_by_time(records, Granularity::Month, &[Field::Valor, Field::Vmn]);
    let daily = bucket_by_time(records, Granularity::Day, &[Field::Valor, Field::Vmn]);

    // Earliest month wins a tie.
    let peak = monthly.iter().min_by_key(|b| Reverse(b.count)).map(|b| b.label.clone());
    let daily_averages: Vec<Value> = monthly
        .iter()
        .map(|b| {
            json!({
                "key": b.key,
                "label": b.label,
                "materias_per_day": b.daily_average_count(),
                "valor_per_day": b.average(Field::Valor, AverageBasis::PerDistinctDay),
            })
        })
        .collect();
    let dated: usize = monthly.iter().map(|b| b.count).sum();

    let charts = vec![
        Chart::new("monthly_volume", "Volume e valor por mês", ChartPayload::Series(monthly)),
        Chart::new(
            "monthly_sentiment",
            "Sentimento por mês",
            ChartPayload::StackedSeries(sentiment_timeline(
                records,
                Granularity::Month,
                settings.sentiment.field,
            )),
        ),
        Chart::new("daily_volume", "Volume diário", ChartPayload::Series(daily)),
    ];
    let summary = json!({
        "dated_materias": dated,
        "undated_materias": records.len() - dated,
        "peak_month": peak,
        "daily_averages": daily_averages,
    });
    (charts, summary)
}

pub fn sentiment(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let field = settings.sentiment.field;
    let totals = SentimentTotals::compute(records, field);
    let polarity = vec![
        ChartDatum { name: Sentiment::Positive.label().to_string(), value: totals.positive as f64 },
        ChartDatum { name: Sentiment::Negative.label().to_string(), value: totals.negative as f64 },
        ChartDatum { name: Sentiment::Neutral.label().to_string(), value: totals.neutral as f64 },
    ];

    let monthly_k = with_averages(
        bucket_by_time(records, Granularity::Month, &[Field::K]),
        &[Field::K],
        AverageBasis::PerRecord,
    );

    let charts = vec![
        Chart::new(
            "distribution",
            "Distribuição do teor",
            ranking(to_chart_data(&group_count(records, field)), None),
        ),
        Chart::new("polarity", "Positivas x Negativas", ChartPayload::Ranking(polarity)),
        Chart::new(
            "evaluation_distribution",
            "Distribuição da avaliação",
            ranking(to_chart_data(&group_count(records, Field::Avaliacao)), None),
        ),
        Chart::new("monthly_k", "K médio por mês", ChartPayload::Series(monthly_k)),
    ];
    let summary = json!({
        "field": field,
        "total": totals.total,
        "positive": totals.positive,
        "negative": totals.negative,
        "neutral": totals.neutral,
        "positive_pct": totals.positive_pct,
        "negative_pct": totals.negative_pct,
    });
    (charts, summary)
}
