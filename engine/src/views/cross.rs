use serde_json::{json, Value};
use shared::{Field, Materia};

use super::{ChartPayload, ChartView};
use crate::aggregation::{cross_tab, rank_rows};

/// `field` x `field_b` counts, rows ranked by total and default-filled with 0.
pub struct CrossTabView {
    field: Field,
    field_b: Field,
    top: Option<usize>,
}

impl CrossTabView {
    pub fn new(field: Field, field_b: Field, top: Option<usize>) -> Self {
        Self { field, field_b, top }
    }
}

impl ChartView for CrossTabView {
    fn name(&self) -> &str {
        "cross_tab"
    }

    fn parameters(&self) -> Value {
        let mut params = json!({ "field": self.field, "field_b": self.field_b });
        if let (Some(n), Some(map)) = (self.top, params.as_object_mut()) {
            map.insert("top".to_string(), json!(n));
        }
        params
    }

    fn compute(&self, records: &[Materia]) -> ChartPayload {
        let tab = cross_tab(records, self.field, self.field_b);
        let mut rows = rank_rows(tab.filled_rows());
        if let Some(n) = self.top {
            rows.truncate(n);
        }
        ChartPayload::Stacked { keys: tab.columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_tab_view_ranks_and_fills() {
        let records: Vec<Materia> = [("x", "p"), ("y", "p"), ("y", "q"), ("z", "q")]
            .iter()
            .map(|(uf, tipo)| Materia {
                uf: Some(uf.to_string()),
                tipo: Some(tipo.to_string()),
                ..Default::default()
            })
            .collect();
        let payload = CrossTabView::new(Field::Uf, Field::Tipo, Some(2)).compute(&records);
        let ChartPayload::Stacked { keys, rows } = payload else {
            panic!("expected stacked payload");
        };
        assert_eq!(keys, vec!["p", "q"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "y");
        assert_eq!(rows[1].name, "x");
        assert_eq!(rows[1].values.get("q"), Some(&0));
    }
}
