// Handlers for the headline sections: KPI cards and the panorama page.
use serde_json::{json, Value};
use shared::models::Granularity;
use shared::{Field, Materia};

use super::{ranking, sentiment_stack, Chart};
use crate::aggregation::sentiment::{rank_by_polarized, sentiment_by, sentiment_timeline};
use crate::aggregation::{group_count, to_chart_data, MetricsSummary};
use crate::config::DashboardSettings;
use crate::views::ChartPayload;

pub fn metrics(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let summary = MetricsSummary::compute(records, settings);
    let snapshot = json!({
        "total_materias": summary.total_materias,
        "total_valor": summary.total_valor,
        "total_vmn": summary.total_vmn,
        "average_audience": summary.average_audience,
        "mean_k": summary.mean_k,
    });
    let charts = vec![Chart::new("kpis", "Indicadores", ChartPayload::Metrics(Box::new(summary)))];
    (charts, snapshot)
}

pub fn panorama(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let sentiment_field = settings.sentiment.field;
    let limit = settings.rankings.cross;

    let coverage = rank_by_polarized(sentiment_by(records, Field::Abrangencia, sentiment_field));
    let mut themes = rank_by_polarized(sentiment_by(records, Field::Temas, sentiment_field));
    themes.truncate(limit);
    let mut vehicles = rank_by_polarized(sentiment_by(records, Field::Veiculo, sentiment_field));
    vehicles.truncate(limit);
    let daily = sentiment_timeline(records, Granularity::Day, sentiment_field);

    let summary = MetricsSummary::compute(records, settings);
    let charts = vec![
        Chart::new("coverage_by_sentiment", "Abrangência x Sentimento", sentiment_stack(coverage)),
        Chart::new("themes_by_sentiment", "Narrativas x Avaliações", sentiment_stack(themes)),
        Chart::new(
            "evaluation_distribution",
            "Avaliação",
            ranking(to_chart_data(&group_count(records, Field::Avaliacao)), None),
        ),
        Chart::new("vehicles_by_sentiment", "Veículos x Sentimento", sentiment_stack(vehicles)),
        Chart::new("daily_sentiment", "Sentimento por dia", ChartPayload::StackedSeries(daily)),
    ];
    let snapshot = json!({
        "total_materias": summary.total_materias,
        "total_vmn": summary.total_vmn,
        "mean_k": summary.mean_k,
        "positive_pct": summary.positive_pct,
        "negative_pct": summary.negative_pct,
    });
    (charts, snapshot)
}
