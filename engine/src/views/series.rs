use serde_json::{json, Value};
use shared::models::Granularity;
use shared::{Field, Materia};

use super::{ChartPayload, ChartView};
use crate::aggregation::bucket_by_time;

/// Record counts per day or month, with per-bucket sums of `value_fields`.
pub struct TimelineView {
    granularity: Granularity,
    value_fields: Vec<Field>,
}

impl TimelineView {
    pub fn new(granularity: Granularity, value_fields: Vec<Field>) -> Self {
        Self { granularity, value_fields }
    }
}

impl ChartView for TimelineView {
    fn name(&self) -> &str {
        "timeline"
    }

    fn parameters(&self) -> Value {
        json!({ "granularity": self.granularity, "value_fields": self.value_fields })
    }

    fn compute(&self, records: &[Materia]) -> ChartPayload {
        ChartPayload::Series(bucket_by_time(records, self.granularity, &self.value_fields))
    }
}
