// Categorical sections: rankings and cross-tabs over the record attributes.
use serde_json::{json, Value};
use shared::models::Granularity;
use shared::{Field, Materia, SENTINEL};

use super::{ranking, sentiment_stack, Chart};
use crate::aggregation::sentiment::{rank_by_polarized, sentiment_by};
use crate::aggregation::timeline::stacked_timeline;
use crate::aggregation::{group_count, group_sum, to_chart_data, without_sentinel};
use crate::config::DashboardSettings;
use crate::views::ChartPayload;

fn count_ranking(records: &[Materia], field: Field, top: Option<usize>) -> ChartPayload {
    ranking(to_chart_data(&group_count(records, field)), top)
}

fn sum_ranking(
    records: &[Materia],
    field: Field,
    sum_field: Field,
    top: Option<usize>,
) -> ChartPayload {
    ranking(to_chart_data(&group_sum(records, field, sum_field)), top)
}

/// Distinct informed values of `field` (the sentinel is not counted).
fn informed(records: &[Materia], field: Field) -> usize {
    group_count(records, field).keys().filter(|k| k.as_str() != SENTINEL).count()
}

pub fn distribution(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let limits = &settings.rankings;
    let charts = vec![
        Chart::new("by_media", "Por mídia", count_ranking(records, Field::Midia, None)),
        Chart::new(
            "by_vehicle",
            "Por veículo",
            count_ranking(records, Field::Veiculo, Some(limits.distribution_vehicles)),
        ),
        Chart::new("by_type", "Por tipo", count_ranking(records, Field::Tipo, None)),
        Chart::new(
            "by_coverage",
            "Por abrangência",
            count_ranking(records, Field::Abrangencia, None),
        ),
        Chart::new(
            "by_state",
            "Por UF",
            count_ranking(records, Field::Uf, Some(limits.distribution_states)),
        ),
    ];
    let summary = json!({
        "total_materias": records.len(),
        "media": informed(records, Field::Midia),
        "vehicles": informed(records, Field::Veiculo),
        "states": informed(records, Field::Uf),
    });
    (charts, summary)
}

pub fn cross_analysis(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let top = Some(settings.rankings.cross);
    let sentiment_field = settings.sentiment.field;
    let sources = without_sentinel(to_chart_data(&group_count(records, Field::Fonte)));

    let charts = vec![
        Chart::new(
            "media_by_sentiment",
            "Mídia x Sentimento",
            sentiment_stack(sentiment_by(records, Field::Midia, sentiment_field)),
        ),
        Chart::new(
            "vehicle_by_value",
            "Veículos por valor",
            sum_ranking(records, Field::Veiculo, Field::Valor, top),
        ),
        Chart::new("theme_volume", "Volume por tema", count_ranking(records, Field::Temas, top)),
        Chart::new("source_ranking", "Fontes mais citadas", ranking(sources, top)),
        Chart::new(
            "highlight_by_sentiment",
            "Destaque x Sentimento",
            sentiment_stack(sentiment_by(records, Field::Destaque, sentiment_field)),
        ),
        Chart::new(
            "coverage_by_value",
            "Abrangência por valor",
            sum_ranking(records, Field::Abrangencia, Field::Valor, None),
        ),
    ];
    let summary = json!({
        "total_materias": records.len(),
        "total_valor": records.iter().map(|m| m.number(Field::Valor)).sum::<f64>(),
    });
    (charts, summary)
}

pub fn geography(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let limits = &settings.rankings;
    let charts = vec![
        Chart::new(
            "states_by_count",
            "Matérias por UF",
            count_ranking(records, Field::Uf, Some(limits.states)),
        ),
        Chart::new(
            "states_by_vmn",
            "VMN por UF",
            sum_ranking(records, Field::Uf, Field::Vmn, Some(limits.states_by_vmn)),
        ),
        Chart::new(
            "coverage_by_vmn",
            "Abrangência x VMN",
            sum_ranking(records, Field::Abrangencia, Field::Vmn, None),
        ),
    ];
    let summary = json!({
        "states": informed(records, Field::Uf),
        "without_state": records.iter().filter(|m| !m.has(Field::Uf)).count(),
    });
    (charts, summary)
}

pub fn vehicles(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let limits = &settings.rankings;
    let mut by_sentiment =
        rank_by_polarized(sentiment_by(records, Field::Veiculo, settings.sentiment.field));
    by_sentiment.truncate(limits.vehicles);

    let charts = vec![
        Chart::new(
            "vehicles_by_count",
            "Matérias por veículo",
            count_ranking(records, Field::Veiculo, Some(limits.vehicles)),
        ),
        Chart::new(
            "vehicles_by_vmn",
            "VMN por veículo",
            sum_ranking(records, Field::Veiculo, Field::Vmn, Some(limits.vehicles_by_vmn)),
        ),
        Chart::new(
            "vehicles_by_sentiment",
            "Veículos x Sentimento",
            sentiment_stack(by_sentiment),
        ),
    ];
    let summary = json!({ "vehicles": informed(records, Field::Veiculo) });
    (charts, summary)
}

pub fn sources_themes(records: &[Materia], settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let limits = &settings.rankings;
    let sources = without_sentinel(to_chart_data(&group_count(records, Field::Fonte)));

    let charts = vec![
        Chart::new(
            "top_themes",
            "Principais temas",
            count_ranking(records, Field::Temas, Some(limits.themes)),
        ),
        Chart::new("top_sources", "Principais fontes", ranking(sources, Some(limits.sources))),
        Chart::new(
            "highlight_by_sentiment",
            "Destaque x Sentimento",
            sentiment_stack(sentiment_by(records, Field::Destaque, settings.sentiment.field)),
        ),
    ];
    let summary = json!({
        "themes": informed(records, Field::Temas),
        "sources": informed(records, Field::Fonte),
    });
    (charts, summary)
}

fn daily_stack(records: &[Materia], field: Field) -> ChartPayload {
    ChartPayload::StackedSeries(stacked_timeline(records, Granularity::Day, |m| {
        m.group_key(field)
    }))
}

pub fn highlights(records: &[Materia], _settings: &DashboardSettings) -> (Vec<Chart>, Value) {
    let charts = vec![
        Chart::new(
            "highlight_distribution",
            "Destaque",
            count_ranking(records, Field::Destaque, None),
        ),
        Chart::new(
            "adherence_distribution",
            "Aderência",
            count_ranking(records, Field::Aderencia, None),
        ),
        Chart::new("highlight_timeline", "Destaque por dia", daily_stack(records, Field::Destaque)),
        Chart::new(
            "adherence_timeline",
            "Aderência por dia",
            daily_stack(records, Field::Aderencia),
        ),
    ];
    let summary = json!({
        "with_highlight": records.iter().filter(|m| m.has(Field::Destaque)).count(),
        "with_adherence": records.iter().filter(|m| m.has(Field::Aderencia)).count(),
    });
    (charts, summary)
}
