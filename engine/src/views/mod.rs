// Parameterised chart views, resolved by name from JSON parameters.
pub mod cross;
pub mod ranking;
pub mod series;

use serde::Serialize;
use serde_json::Value;
use shared::models::{ChartDatum, CrossTabRow, Granularity, StackedSeries, TimeBucket};
use shared::{Field, Materia};

use crate::aggregation::MetricsSummary;
use crate::error::EngineError;

pub use cross::CrossTabView;
pub use ranking::{GroupCountView, GroupSumView};
pub use series::TimelineView;

/// Shape-tagged data of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChartPayload {
    Ranking(Vec<ChartDatum>),
    Stacked { keys: Vec<String>, rows: Vec<CrossTabRow> },
    StackedSeries(StackedSeries),
    Series(Vec<TimeBucket>),
    Metrics(Box<MetricsSummary>),
}

pub trait ChartView: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value;
    fn compute(&self, records: &[Materia]) -> ChartPayload;
}

pub const VIEW_KINDS: [&str; 4] = ["group_count", "group_sum", "cross_tab", "timeline"];

pub fn build_view(kind: &str, params: &Value) -> Result<Box<dyn ChartView>, EngineError> {
    tracing::debug!(kind, %params, "Building chart view");
    let top = optional_usize(params, "top")?;
    let view: Box<dyn ChartView> = match kind.to_lowercase().as_str() {
        "group_count" => Box::new(GroupCountView::new(required_field(params, "field")?, top)),
        "group_sum" => Box::new(GroupSumView::new(
            required_field(params, "field")?,
            required_field(params, "sum_field")?,
            top,
        )),
        "cross_tab" => Box::new(CrossTabView::new(
            required_field(params, "field")?,
            required_field(params, "field_b")?,
            top,
        )),
        "timeline" => {
            let granularity = match params.get("granularity") {
                None | Some(Value::Null) => Granularity::Month,
                Some(value) => serde_json::from_value(value.clone()).map_err(|_| {
                    EngineError::InvalidViewParameters(format!(
                        "granularity must be \"day\" or \"month\", got {}",
                        value
                    ))
                })?,
            };
            Box::new(TimelineView::new(granularity, field_list(params, "value_fields")?))
        }
        _ => {
            tracing::error!(kind, "Unknown chart view requested");
            return Err(EngineError::UnknownView(kind.to_string()));
        }
    };
    Ok(view)
}

fn required_field(params: &Value, key: &str) -> Result<Field, EngineError> {
    match params.get(key) {
        Some(Value::String(name)) => Ok(name.parse()?),
        Some(other) => Err(EngineError::InvalidViewParameters(format!(
            "'{}' must be a field name, got {}",
            key, other
        ))),
        None => Err(EngineError::InvalidViewParameters(format!("missing '{}'", key))),
    }
}

fn optional_usize(params: &Value, key: &str) -> Result<Option<usize>, EngineError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| {
                EngineError::InvalidViewParameters(format!(
                    "'{}' must be a non-negative integer",
                    key
                ))
            }),
    }
}

fn field_list(params: &Value, key: &str) -> Result<Vec<Field>, EngineError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| -> Result<Field, EngineError> {
                match item {
                    Value::String(name) => Ok(name.parse()?),
                    other => Err(EngineError::InvalidViewParameters(format!(
                        "'{}' entries must be field names, got {}",
                        key, other
                    ))),
                }
            })
            .collect(),
        Some(other) => Err(EngineError::InvalidViewParameters(format!(
            "'{}' must be an array, got {}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_each_kind() {
        let cases = [
            ("group_count", json!({"field": "Mídia"}), "group_count"),
            ("group_sum", json!({"field": "Veiculo", "sum_field": "VMN", "top": 5}), "group_sum"),
            ("cross_tab", json!({"field": "uf", "field_b": "Abrangência"}), "cross_tab"),
            ("TIMELINE", json!({"granularity": "day", "value_fields": ["Valor"]}), "timeline"),
        ];
        for (kind, params, expected) in cases {
            let view = build_view(kind, &params).unwrap();
            assert_eq!(view.name(), expected);
        }
    }

    #[test]
    fn test_parameters_echo() {
        let params = json!({"field": "midia", "sum_field": "valor", "top": 3});
        let view = build_view("group_sum", &params).unwrap();
        assert_eq!(view.parameters(), json!({"field": "Mídia", "sum_field": "Valor", "top": 3}));
    }

    #[test]
    fn test_unknown_kind() {
        let err = build_view("pie", &json!({})).err().unwrap();
        assert!(matches!(err, EngineError::UnknownView(ref k) if k == "pie"));
    }

    #[test]
    fn test_missing_and_malformed_parameters() {
        assert!(matches!(
            build_view("group_count", &json!({})),
            Err(EngineError::InvalidViewParameters(_))
        ));
        assert!(matches!(
            build_view("group_count", &json!({"field": "Tipo", "top": -1})),
            Err(EngineError::InvalidViewParameters(_))
        ));
        assert!(matches!(
            build_view("timeline", &json!({"granularity": "week"})),
            Err(EngineError::InvalidViewParameters(_))
        ));
        assert!(matches!(
            build_view("timeline", &json!({"value_fields": "Valor"})),
            Err(EngineError::InvalidViewParameters(_))
        ));
    }

    #[test]
    fn test_unknown_field() {
        let err = build_view("group_count", &json!({"field": "Humor"})).err().unwrap();
        assert!(matches!(err, EngineError::UnknownField { .. }));
        assert_eq!(err.to_string(), "Unknown field selector 'Humor'");
    }

    #[test]
    fn test_payload_serialization_is_tagged() {
        let payload = ChartPayload::Ranking(vec![ChartDatum { name: "TV".into(), value: 2.0 }]);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"type": "ranking", "data": [{"name": "TV", "value": 2.0}]})
        );
    }
}
