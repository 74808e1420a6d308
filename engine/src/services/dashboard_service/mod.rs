// engine/src/services/dashboard_service/mod.rs
// DashboardService owns the record store and settings; each dashboard section
// is built by a handler in one of the sibling modules.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{ChartDatum, CrossTabRow};
use shared::Materia;

use crate::aggregation::{SentimentRow, Sentiment};
use crate::config::DashboardSettings;
use crate::data::{MateriaFilter, MateriaStore};
use crate::error::EngineError;
use crate::views::{build_view, ChartPayload};

pub mod breakdowns;
pub mod overview;
pub mod trends;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Metrics,
    Panorama,
    Timeline,
    Sentiment,
    Distribution,
    CrossAnalysis,
    Geography,
    Vehicles,
    SourcesThemes,
    Highlights,
}

impl SectionId {
    pub const ALL: [SectionId; 10] = [
        SectionId::Metrics,
        SectionId::Panorama,
        SectionId::Timeline,
        SectionId::Sentiment,
        SectionId::Distribution,
        SectionId::CrossAnalysis,
        SectionId::Geography,
        SectionId::Vehicles,
        SectionId::SourcesThemes,
        SectionId::Highlights,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Metrics => "metrics",
            SectionId::Panorama => "panorama",
            SectionId::Timeline => "timeline",
            SectionId::Sentiment => "sentiment",
            SectionId::Distribution => "distribution",
            SectionId::CrossAnalysis => "cross_analysis",
            SectionId::Geography => "geography",
            SectionId::Vehicles => "vehicles",
            SectionId::SourcesThemes => "sources_themes",
            SectionId::Highlights => "highlights",
        }
    }

    /// Title shown on the dashboard tab.
    pub fn label(self) -> &'static str {
        match self {
            SectionId::Metrics => "Métricas",
            SectionId::Panorama => "Panorama",
            SectionId::Timeline => "Linha do tempo",
            SectionId::Sentiment => "Sentimento",
            SectionId::Distribution => "Distribuição",
            SectionId::CrossAnalysis => "Análise cruzada",
            SectionId::Geography => "Geografia",
            SectionId::Vehicles => "Veículos",
            SectionId::SourcesThemes => "Fontes e temas",
            SectionId::Highlights => "Destaque e aderência",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| EngineError::UnknownView(format!("section '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: String,
    pub title: String,
    pub payload: ChartPayload,
}

impl Chart {
    pub fn new(id: &str, title: &str, payload: ChartPayload) -> Self {
        Chart {
            id: id.to_string(),
            title: title.to_string(),
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub id: SectionId,
    pub label: String,
    pub charts: Vec<Chart>,
    /// Headline numbers of the section.
    pub summary: Value,
}

impl SectionReport {
    pub fn chart(&self, id: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }
}

pub struct DashboardService {
    store: MateriaStore,
    settings: DashboardSettings,
}

impl DashboardService {
    pub fn new(store: MateriaStore, settings: DashboardSettings) -> Self {
        DashboardService { store, settings }
    }

    pub fn store(&self) -> &MateriaStore {
        &self.store
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn section(&self, id: SectionId, filter: &MateriaFilter) -> SectionReport {
        let records = self.store.filter(filter);
        tracing::info!(section = %id, records = records.len(), "Building dashboard section");
        let (charts, summary) = self.build_section(id, &records);
        SectionReport {
            id,
            label: id.label().to_string(),
            charts,
            summary,
        }
    }

    /// Every section over the same filtered slice.
    pub fn report(&self, filter: &MateriaFilter) -> Vec<SectionReport> {
        let records = self.store.filter(filter);
        tracing::info!(records = records.len(), "Building full dashboard report");
        SectionId::ALL
            .into_iter()
            .map(|id| {
                let (charts, summary) = self.build_section(id, &records);
                SectionReport {
                    id,
                    label: id.label().to_string(),
                    charts,
                    summary,
                }
            })
            .collect()
    }

    /// Ad-hoc chart from a named view over the filtered records.
    pub fn view(
        &self,
        kind: &str,
        params: &Value,
        filter: &MateriaFilter,
    ) -> Result<ChartPayload, EngineError> {
        let view = build_view(kind, params)?;
        let records = self.store.filter(filter);
        tracing::debug!(
            view = view.name(),
            parameters = %view.parameters(),
            records = records.len(),
            "Computing chart view"
        );
        Ok(view.compute(&records))
    }

    fn build_section(&self, id: SectionId, records: &[Materia]) -> (Vec<Chart>, Value) {
        let settings = &self.settings;
        match id {
            SectionId::Metrics => overview::metrics(records, settings),
            SectionId::Panorama => overview::panorama(records, settings),
            SectionId::Timeline => trends::timeline(records, settings),
            SectionId::Sentiment => trends::sentiment(records, settings),
            SectionId::Distribution => breakdowns::distribution(records, settings),
            SectionId::CrossAnalysis => breakdowns::cross_analysis(records, settings),
            SectionId::Geography => breakdowns::geography(records, settings),
            SectionId::Vehicles => breakdowns::vehicles(records, settings),
            SectionId::SourcesThemes => breakdowns::sources_themes(records, settings),
            SectionId::Highlights => breakdowns::highlights(records, settings),
        }
    }
}

// Shared chart shaping for the section handlers.

pub(crate) fn ranking(data: Vec<ChartDatum>, top: Option<usize>) -> ChartPayload {
    ChartPayload::Ranking(match top {
        Some(n) => crate::aggregation::top_n(data, n),
        None => data,
    })
}

/// Sentiment rows as a stacked payload keyed Positiva/Negativa/Neutra.
pub(crate) fn sentiment_stack(rows: Vec<SentimentRow>) -> ChartPayload {
    let keys: Vec<String> = Sentiment::ALL.iter().map(|s| s.label().to_string()).collect();
    let rows = rows
        .into_iter()
        .map(|row| CrossTabRow {
            values: [
                (Sentiment::Positive.label().to_string(), row.positive),
                (Sentiment::Negative.label().to_string(), row.negative),
                (Sentiment::Neutral.label().to_string(), row.neutral),
            ]
            .into_iter()
            .collect(),
            name: row.name,
        })
        .collect();
    ChartPayload::Stacked { keys, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::RawValue;

    pub(super) fn sample_records() -> Vec<Materia> {
        let row = |cells: [&str; 5], valor: &str, vmn: f64| Materia {
            data: Some(cells[0].to_string()),
            midia: Some(cells[1].to_string()),
            veiculo: Some(cells[2].to_string()),
            uf: Some(cells[3].to_string()),
            teor: Some(cells[4].to_string()),
            valor: Some(valor.into()),
            vmn: Some(RawValue::Number(vmn)),
            ..Default::default()
        };
        vec![
            row(["01/01/2024", "TV", "Globo", "SP", "Positiva"], "1.000,00", 100.0),
            row(["01/01/2024", "Web", "Folha", "SP", "Negativa"], "500,00", 50.0),
            row(["15/01/2024", "TV", "Globo", "RJ", "Muito Positiva"], "250.50", 25.0),
            row(["03/02/2024", "Rádio", "CBN", "", "Neutra"], "0", 0.0),
        ]
    }

    fn service() -> DashboardService {
        DashboardService::new(MateriaStore::new(sample_records()), DashboardSettings::default())
    }

    #[test]
    fn test_section_id_parse_and_display() {
        assert_eq!("cross-analysis".parse::<SectionId>().unwrap(), SectionId::CrossAnalysis);
        assert_eq!(" Metrics ".parse::<SectionId>().unwrap(), SectionId::Metrics);
        assert!("charts".parse::<SectionId>().is_err());
        for id in SectionId::ALL {
            assert_eq!(id.to_string().parse::<SectionId>().unwrap(), id);
        }
    }

    #[test]
    fn test_every_section_builds_charts() {
        let reports = service().report(&MateriaFilter::default());
        assert_eq!(reports.len(), SectionId::ALL.len());
        for report in &reports {
            assert!(!report.charts.is_empty(), "section {} has no charts", report.id);
            assert_eq!(report.label, report.id.label());
        }
    }

    #[test]
    fn test_section_respects_filter() {
        let filter = MateriaFilter::default().select(shared::Field::Midia, "TV");
        let report = service().section(SectionId::Metrics, &filter);
        assert_eq!(report.summary["total_materias"], json!(2));
    }

    #[test]
    fn test_view_through_service() {
        let payload = service()
            .view("group_count", &json!({"field": "uf"}), &MateriaFilter::default())
            .unwrap();
        let ChartPayload::Ranking(data) = payload else {
            panic!("expected ranking");
        };
        assert_eq!(data[0], ChartDatum { name: "SP".into(), value: 2.0 });
        assert_eq!(data.last().map(|d| d.name.as_str()), Some(shared::SENTINEL));
    }

    #[test]
    fn test_report_serializes() {
        let report = service().section(SectionId::Distribution, &MateriaFilter::default());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["id"], json!("distribution"));
        assert_eq!(value["charts"][0]["payload"]["type"], json!("ranking"));
    }
}
