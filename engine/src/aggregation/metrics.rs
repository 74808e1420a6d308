// Headline KPIs for the metrics cards.
use serde::Serialize;
use shared::brazilian_format::{format_compact, format_currency, format_decimal};
use shared::{Field, Materia};

use super::sentiment::SentimentTotals;
use crate::config::DashboardSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_materias: usize,
    pub total_valor: f64,
    pub total_vmn: f64,
    pub total_publico: f64,
    /// `sum(publico) / n * audience_multiplier`.
    pub average_audience: f64,
    /// Mean of `K` over records carrying one; `None` when no record has it.
    pub mean_k: Option<f64>,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub display: MetricsDisplay,
}

/// pt-BR renderings of the headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsDisplay {
    pub total_valor: String,
    pub total_vmn: String,
    pub average_audience: String,
    pub mean_k: String,
}

impl MetricsSummary {
    pub fn compute(records: &[Materia], settings: &DashboardSettings) -> Self {
        let total_materias = records.len();
        let total_valor: f64 = records.iter().map(|m| m.number(Field::Valor)).sum();
        let total_vmn: f64 = records.iter().map(|m| m.number(Field::Vmn)).sum();
        let total_publico: f64 = records.iter().map(|m| m.number(Field::Publico)).sum();

        let average_audience = if total_materias == 0 {
            0.0
        } else {
            total_publico / total_materias as f64 * settings.metrics.audience_multiplier
        };

        let (k_sum, k_count) = records
            .iter()
            .filter(|m| m.has(Field::K))
            .fold((0.0, 0usize), |(sum, n), m| (sum + m.number(Field::K), n + 1));
        let mean_k = (k_count > 0).then(|| k_sum / k_count as f64);

        let sentiment = SentimentTotals::compute(records, settings.sentiment.field);

        MetricsSummary {
            total_materias,
            total_valor,
            total_vmn,
            total_publico,
            average_audience,
            mean_k,
            positive_pct: sentiment.positive_pct,
            negative_pct: sentiment.negative_pct,
            display: MetricsDisplay {
                total_valor: format_currency(total_valor),
                total_vmn: format_currency(total_vmn),
                average_audience: format_compact(average_audience),
                mean_k: mean_k.map_or_else(|| "-".to_string(), |k| format_decimal(k, 2)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::RawValue;

    fn materia(valor: &str, publico: f64, k: Option<&str>, teor: &str) -> Materia {
        Materia {
            valor: Some(valor.into()),
            vmn: Some(RawValue::Number(10.0)),
            publico: Some(RawValue::Number(publico)),
            k: k.map(RawValue::from),
            teor: Some(teor.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_totals() {
        let records = vec![
            materia("1.000,50", 100.0, Some("2,5"), "Positiva"),
            materia("999.50", 300.0, None, "Negativa"),
        ];
        let summary = MetricsSummary::compute(&records, &DashboardSettings::default());
        assert_eq!(summary.total_materias, 2);
        assert!((summary.total_valor - 2000.0).abs() < 1e-9);
        assert_eq!(summary.total_vmn, 20.0);
        assert_eq!(summary.total_publico, 400.0);
        assert!((summary.average_audience - 2100.0).abs() < 1e-9);
        assert_eq!(summary.mean_k, Some(2.5));
        assert_eq!(summary.positive_pct, 50.0);
        assert_eq!(summary.display.total_valor, "R$ 2.000,00");
        assert_eq!(summary.display.average_audience, "2.1K");
        assert_eq!(summary.display.mean_k, "2,50");
    }

    #[test]
    fn test_compute_empty() {
        let summary = MetricsSummary::compute(&[], &DashboardSettings::default());
        assert_eq!(summary.total_materias, 0);
        assert_eq!(summary.average_audience, 0.0);
        assert_eq!(summary.mean_k, None);
        assert_eq!(summary.display.mean_k, "-");
        assert_eq!(summary.display.total_valor, "R$ 0,00");
    }

    #[test]
    fn test_multiplier_from_settings() {
        let mut settings = DashboardSettings::default();
        settings.metrics.audience_multiplier = 1.0;
        let records = vec![materia("0", 50.0, None, ""), materia("0", 150.0, None, "")];
        assert_eq!(MetricsSummary::compute(&records, &settings).average_audience, 100.0);
    }
}
