// Flattens chart payloads into header + rows tables and writes them as CSV.
use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::EngineError;
use crate::services::Chart;
use crate::views::ChartPayload;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn number(value: f64) -> String {
    format!("{}", value)
}

impl ExportTable {
    pub fn from_chart(chart: &Chart) -> Self {
        Self::from_payload(&chart.payload)
    }

    pub fn from_payload(payload: &ChartPayload) -> Self {
        match payload {
            ChartPayload::Ranking(data) => ExportTable {
                headers: vec!["name".to_string(), "value".to_string()],
                rows: data.iter().map(|d| vec![d.name.clone(), number(d.value)]).collect(),
            },
            ChartPayload::Stacked { keys, rows } => ExportTable {
                headers: std::iter::once("name".to_string()).chain(keys.iter().cloned()).collect(),
                rows: rows
                    .iter()
                    .map(|row| {
                        std::iter::once(row.name.clone())
                            .chain(keys.iter().map(|k| row.get(k).to_string()))
                            .collect()
                    })
                    .collect(),
            },
            ChartPayload::StackedSeries(series) => ExportTable {
                headers: ["key", "label"]
                    .iter()
                    .map(|h| h.to_string())
                    .chain(series.keys.iter().cloned())
                    .collect(),
                rows: series
                    .points
                    .iter()
                    .map(|point| {
                        [point.key.clone(), point.label.clone()]
                            .into_iter()
                            .chain(series.keys.iter().map(|k| {
                                point.values.get(k).copied().unwrap_or(0).to_string()
                            }))
                            .collect()
                    })
                    .collect(),
            },
            ChartPayload::Series(buckets) => {
                let (sum_columns, average_columns): (Vec<String>, Vec<String>) = buckets
                    .first()
                    .map(|b| {
                        (b.sums.keys().cloned().collect(), b.averages.keys().cloned().collect())
                    })
                    .unwrap_or_default();
                ExportTable {
                    headers: ["key", "label", "count", "distinct_days"]
                        .iter()
                        .map(|h| h.to_string())
                        .chain(sum_columns.iter().cloned())
                        .chain(average_columns.iter().map(|c| format!("{}_avg", c)))
                        .collect(),
                    rows: buckets
                        .iter()
                        .map(|b| {
                            let sums = sum_columns.iter().map(|c| b.sums.get(c));
                            let averages = average_columns.iter().map(|c| b.averages.get(c));
                            [
                                b.key.clone(),
                                b.label.clone(),
                                b.count.to_string(),
                                b.distinct_days.to_string(),
                            ]
                            .into_iter()
                            .chain(sums.chain(averages).map(|v| number(v.copied().unwrap_or(0.0))))
                            .collect()
                        })
                        .collect(),
                }
            }
            ChartPayload::Metrics(summary) => {
                let pairs = [
                    ("total_materias", summary.total_materias.to_string()),
                    ("total_valor", number(summary.total_valor)),
                    ("total_vmn", number(summary.total_vmn)),
                    ("total_publico", number(summary.total_publico)),
                    ("average_audience", number(summary.average_audience)),
                    ("mean_k", summary.mean_k.map(number).unwrap_or_default()),
                    ("positive_pct", number(summary.positive_pct)),
                    ("negative_pct", number(summary.negative_pct)),
                ];
                ExportTable {
                    headers: vec!["metric".to_string(), "value".to_string()],
                    rows: pairs.into_iter().map(|(k, v)| vec![k.to_string(), v]).collect(),
                }
            }
        }
    }
}

pub fn write_csv<W: Write>(
    table: &ExportTable,
    writer: W,
    delimiter: u8,
) -> Result<(), EngineError> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{AverageBasis, ChartDatum, CrossTabRow, Granularity};
    use shared::{Field, Materia};

    use crate::aggregation::{bucket_by_time, with_averages};

    fn to_string(table: &ExportTable) -> String {
        let mut out = Vec::new();
        write_csv(table, &mut out, b';').unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_ranking_export() {
        let chart = Chart::new(
            "by_media",
            "Por mídia",
            ChartPayload::Ranking(vec![
                ChartDatum { name: "TV".into(), value: 3.0 },
                ChartDatum { name: "Rádio; AM".into(), value: 1.5 },
            ]),
        );
        let table = ExportTable::from_chart(&chart);
        assert_eq!(to_string(&table), "name;value\nTV;3\n\"Rádio; AM\";1.5\n");
    }

    #[test]
    fn test_stacked_export_fills_missing_columns() {
        let payload = ChartPayload::Stacked {
            keys: vec!["p".into(), "q".into()],
            rows: vec![CrossTabRow {
                name: "y".into(),
                values: [("p".to_string(), 2)].into_iter().collect(),
            }],
        };
        let table = ExportTable::from_payload(&payload);
        assert_eq!(table.headers, vec!["name", "p", "q"]);
        assert_eq!(table.rows, vec![vec!["y", "2", "0"]]);
    }

    #[test]
    fn test_series_export_includes_sums() {
        let records = vec![Materia {
            data: Some("05/05/2024".into()),
            vmn: Some("1.000,5".into()),
            ..Default::default()
        }];
        let buckets = bucket_by_time(&records, Granularity::Month, &[Field::Vmn]);
        let payload = ChartPayload::Series(buckets);
        let table = ExportTable::from_payload(&payload);
        assert_eq!(table.headers, vec!["key", "label", "count", "distinct_days", "VMN"]);
        assert_eq!(table.rows[0], vec!["2024-05", "mai/24", "1", "1", "1000.5"]);
    }

    #[test]
    fn test_series_export_includes_averages() {
        let records: Vec<Materia> = ["2", "4"]
            .iter()
            .map(|k| Materia {
                data: Some("05/05/2024".into()),
                k: Some((*k).into()),
                ..Default::default()
            })
            .collect();
        let buckets = bucket_by_time(&records, Granularity::Month, &[Field::K]);
        let buckets = with_averages(buckets, &[Field::K], AverageBasis::PerRecord);
        let payload = ChartPayload::Series(buckets);
        let table = ExportTable::from_payload(&payload);
        assert_eq!(table.headers, vec!["key", "label", "count", "distinct_days", "K", "K_avg"]);
        assert_eq!(table.rows[0], vec!["2024-05", "mai/24", "2", "1", "6", "3"]);
    }

    #[test]
    fn test_empty_series_export() {
        let table = ExportTable::from_payload(&ChartPayload::Series(Vec::new()));
        assert_eq!(to_string(&table), "key;label;count;distinct_days\n");
    }
}
