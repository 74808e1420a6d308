// Ranking views: a tally per field value, sorted descending, optionally cut to Top N.
use serde_json::{json, Value};
use shared::{Field, Materia};

use super::{ChartPayload, ChartView};
use crate::aggregation::{group_count, group_sum, to_chart_data, top_n};

fn with_top(mut params: Value, top: Option<usize>) -> Value {
    if let (Some(n), Some(map)) = (top, params.as_object_mut()) {
        map.insert("top".to_string(), json!(n));
    }
    params
}

pub struct GroupCountView {
    field: Field,
    top: Option<usize>,
}

impl GroupCountView {
    pub fn new(field: Field, top: Option<usize>) -> Self {
        Self { field, top }
    }
}

impl ChartView for GroupCountView {
    fn name(&self) -> &str {
        "group_count"
    }

    fn parameters(&self) -> Value {
        with_top(json!({ "field": self.field }), self.top)
    }

    fn compute(&self, records: &[Materia]) -> ChartPayload {
        let data = to_chart_data(&group_count(records, self.field));
        ChartPayload::Ranking(match self.top {
            Some(n) => top_n(data, n),
            None => data,
        })
    }
}

pub struct GroupSumView {
    field: Field,
    sum_field: Field,
    top: Option<usize>,
}

impl GroupSumView {
    pub fn new(field: Field, sum_field: Field, top: Option<usize>) -> Self {
        Self { field, sum_field, top }
    }
}

impl ChartView for GroupSumView {
    fn name(&self) -> &str {
        "group_sum"
    }

    fn parameters(&self) -> Value {
        with_top(json!({ "field": self.field, "sum_field": self.sum_field }), self.top)
    }

    fn compute(&self, records: &[Materia]) -> ChartPayload {
        let data = to_chart_data(&group_sum(records, self.field, self.sum_field));
        ChartPayload::Ranking(match self.top {
            Some(n) => top_n(data, n),
            None => data,
        })
    }
}
