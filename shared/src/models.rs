use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::utils::brazilian_format;

/// Grouping key used whenever a field is absent or blank.
pub const SENTINEL: &str = "Não informado";

/// A numeric-ish cell as it arrives from the data source: either a native
/// number or a string in Brazilian (`1.234,56`) or American (`1,234.56`) form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => RawValue::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => RawValue::Text(s),
            Value::Null => RawValue::Text(String::new()),
            other => RawValue::Text(other.to_string()),
        })
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

// Text columns sometimes come back as numbers or booleans from the store.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Some(Value::Number(n)) => Some(format!("{}", n.as_f64().unwrap_or(0.0))),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// One press mention ("matéria"). Every attribute is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Materia {
    #[serde(
        rename = "id_noticia",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub titulo: Option<String>,
    #[serde(rename = "Data", default, deserialize_with = "lenient_text")]
    pub data: Option<String>,
    #[serde(rename = "Tipo", default, deserialize_with = "lenient_text")]
    pub tipo: Option<String>,
    #[serde(rename = "Mídia", default, deserialize_with = "lenient_text")]
    pub midia: Option<String>,
    #[serde(rename = "Veiculo", default, deserialize_with = "lenient_text")]
    pub veiculo: Option<String>,
    #[serde(rename = "Valor", default)]
    pub valor: Option<RawValue>,
    #[serde(default)]
    pub publico: Option<RawValue>,
    #[serde(rename = "K", default)]
    pub k: Option<RawValue>,
    #[serde(rename = "Vn", default)]
    pub vn: Option<RawValue>,
    #[serde(rename = "Teor", default, deserialize_with = "lenient_text")]
    pub teor: Option<String>,
    #[serde(rename = "Avaliação", default, deserialize_with = "lenient_text")]
    pub avaliacao: Option<String>,
    #[serde(rename = "Abrangência", default, deserialize_with = "lenient_text")]
    pub abrangencia: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub uf: Option<String>,
    #[serde(rename = "Temas", default, deserialize_with = "lenient_text")]
    pub temas: Option<String>,
    #[serde(rename = "Fonte", default, deserialize_with = "lenient_text")]
    pub fonte: Option<String>,
    #[serde(rename = "Destaque", default, deserialize_with = "lenient_text")]
    pub destaque: Option<String>,
    #[serde(rename = "Aderência", default, deserialize_with = "lenient_text")]
    pub aderencia: Option<String>,
    #[serde(rename = "VMN", default)]
    pub vmn: Option<RawValue>,
}

/// Borrowed view of a single record attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Raw(&'a RawValue),
    Missing,
}

fn text(value: &Option<String>) -> FieldValue<'_> {
    value.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
}

fn raw(value: &Option<RawValue>) -> FieldValue<'_> {
    value.as_ref().map_or(FieldValue::Missing, FieldValue::Raw)
}

impl Materia {
    pub fn get(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Titulo => text(&self.titulo),
            Field::Data => text(&self.data),
            Field::Tipo => text(&self.tipo),
            Field::Midia => text(&self.midia),
            Field::Veiculo => text(&self.veiculo),
            Field::Valor => raw(&self.valor),
            Field::Publico => raw(&self.publico),
            Field::K => raw(&self.k),
            Field::Vn => raw(&self.vn),
            Field::Teor => text(&self.teor),
            Field::Avaliacao => text(&self.avaliacao),
            Field::Abrangencia => text(&self.abrangencia),
            Field::Uf => text(&self.uf),
            Field::Temas => text(&self.temas),
            Field::Fonte => text(&self.fonte),
            Field::Destaque => text(&self.destaque),
            Field::Aderencia => text(&self.aderencia),
            Field::Vmn => raw(&self.vmn),
        }
    }

    /// Grouping key for `field`: the trimmed value as a string, or
    /// [`SENTINEL`] when the value is absent or blank.
    pub fn group_key(&self, field: Field) -> String {
        let key = match self.get(field) {
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Raw(RawValue::Text(s)) => s.trim().to_string(),
            FieldValue::Raw(RawValue::Number(n)) if n.is_finite() => format!("{}", n),
            FieldValue::Raw(RawValue::Number(_)) | FieldValue::Missing => String::new(),
        };
        if key.is_empty() {
            SENTINEL.to_string()
        } else {
            key
        }
    }

    /// Numeric reading of `field`; 0 when absent or unparseable.
    pub fn number(&self, field: Field) -> f64 {
        match self.get(field) {
            FieldValue::Raw(value) => brazilian_format::parse_value(Some(value)),
            FieldValue::Text(s) => brazilian_format::parse_decimal_str(s),
            FieldValue::Missing => 0.0,
        }
    }

    /// True when `field` carries a non-blank value.
    pub fn has(&self, field: Field) -> bool {
        match self.get(field) {
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::Raw(RawValue::Text(s)) => !s.trim().is_empty(),
            FieldValue::Raw(RawValue::Number(n)) => !n.is_nan(),
            FieldValue::Missing => false,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.data.as_deref().and_then(brazilian_format::parse_date)
    }

    /// Sets `field` from a raw cell. Blank cells clear the field.
    pub fn set(&mut self, field: Field, cell: &str) {
        let text_cell = (!cell.trim().is_empty()).then(|| cell.to_string());
        let raw_cell = text_cell.clone().map(RawValue::Text);
        match field {
            Field::Titulo => self.titulo = text_cell,
            Field::Data => self.data = text_cell,
            Field::Tipo => self.tipo = text_cell,
            Field::Midia => self.midia = text_cell,
            Field::Veiculo => self.veiculo = text_cell,
            Field::Valor => self.valor = raw_cell,
            Field::Publico => self.publico = raw_cell,
            Field::K => self.k = raw_cell,
            Field::Vn => self.vn = raw_cell,
            Field::Teor => self.teor = text_cell,
            Field::Avaliacao => self.avaliacao = text_cell,
            Field::Abrangencia => self.abrangencia = text_cell,
            Field::Uf => self.uf = text_cell,
            Field::Temas => self.temas = text_cell,
            Field::Fonte => self.fonte = text_cell,
            Field::Destaque => self.destaque = text_cell,
            Field::Aderencia => self.aderencia = text_cell,
            Field::Vmn => self.vmn = raw_cell,
        }
    }
}

/// Typed selector for a [`Materia`] attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Titulo,
    Data,
    Tipo,
    Midia,
    Veiculo,
    Valor,
    Publico,
    K,
    Vn,
    Teor,
    Avaliacao,
    Abrangencia,
    Uf,
    Temas,
    Fonte,
    Destaque,
    Aderencia,
    Vmn,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::Titulo,
        Field::Data,
        Field::Tipo,
        Field::Midia,
        Field::Veiculo,
        Field::Valor,
        Field::Publico,
        Field::K,
        Field::Vn,
        Field::Teor,
        Field::Avaliacao,
        Field::Abrangencia,
        Field::Uf,
        Field::Temas,
        Field::Fonte,
        Field::Destaque,
        Field::Aderencia,
        Field::Vmn,
    ];

    /// Column name used by the data source.
    pub fn column(self) -> &'static str {
        match self {
            Field::Titulo => "titulo",
            Field::Data => "Data",
            Field::Tipo => "Tipo",
            Field::Midia => "Mídia",
            Field::Veiculo => "Veiculo",
            Field::Valor => "Valor",
            Field::Publico => "publico",
            Field::K => "K",
            Field::Vn => "Vn",
            Field::Teor => "Teor",
            Field::Avaliacao => "Avaliação",
            Field::Abrangencia => "Abrangência",
            Field::Uf => "uf",
            Field::Temas => "Temas",
            Field::Fonte => "Fonte",
            Field::Destaque => "Destaque",
            Field::Aderencia => "Aderência",
            Field::Vmn => "VMN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown field selector '{0}'")]
pub struct FieldParseError(pub String);

// Lowercase and strip the accents that appear in column names.
fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
            'ú' | 'Ú' => 'u',
            'ç' | 'Ç' => 'c',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

impl FromStr for Field {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = fold(s);
        Field::ALL
            .into_iter()
            .find(|field| fold(field.column()) == wanted)
            .ok_or_else(|| FieldParseError(s.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.column())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// One `{name, value}` point of a ranking/pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatum {
    pub name: String,
    pub value: f64,
}

/// One row of a two-level tally, serialized as `{"name": .., column: count, ..}`.
/// Columns never observed for this row are absent; [`CrossTabRow::get`] reads them as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTabRow {
    pub name: String,
    #[serde(flatten)]
    pub values: IndexMap<String, usize>,
}

impl CrossTabRow {
    pub fn get(&self, column: &str) -> usize {
        self.values.get(column).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.values.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    /// Every second-level key observed in the dataset, in first-seen order.
    pub columns: Vec<String>,
    pub rows: Vec<CrossTabRow>,
}

impl CrossTab {
    /// Rows restricted and default-filled to `columns`, for fixed stacked series.
    pub fn filled(&self, columns: &[String]) -> Vec<CrossTabRow> {
        self.rows
            .iter()
            .map(|row| CrossTabRow {
                name: row.name.clone(),
                values: columns.iter().map(|c| (c.clone(), row.get(c))).collect(),
            })
            .collect()
    }

    pub fn filled_rows(&self) -> Vec<CrossTabRow> {
        self.filled(&self.columns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
}

/// Denominator used when averaging a bucket's sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageBasis {
    /// Divide by the number of records in the bucket.
    PerRecord,
    /// Divide by the number of distinct calendar days present in the bucket.
    /// Several records may share a day, so this is not the record count.
    PerDistinctDay,
}

/// One calendar interval of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// `YYYY-MM-DD` or `YYYY-MM`; sorts lexicographically in chronological order.
    pub key: String,
    /// Display label (`DD/MM/YY` or `mmm/YY`). Never used for ordering.
    pub label: String,
    pub count: usize,
    pub distinct_days: usize,
    /// Sums of the requested value fields, keyed by column name.
    pub sums: IndexMap<String, f64>,
    /// Averages of value fields, filled only for series that chart them.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub averages: IndexMap<String, f64>,
}

impl TimeBucket {
    pub fn sum(&self, field: Field) -> f64 {
        self.sums.get(field.column()).copied().unwrap_or(0.0)
    }

    pub fn average(&self, field: Field, basis: AverageBasis) -> f64 {
        let denominator = match basis {
            AverageBasis::PerRecord => self.count,
            AverageBasis::PerDistinctDay => self.distinct_days,
        };
        if denominator == 0 {
            0.0
        } else {
            self.sum(field) / denominator as f64
        }
    }

    /// Records per distinct day within the bucket.
    pub fn daily_average_count(&self) -> f64 {
        if self.distinct_days == 0 {
            0.0
        } else {
            self.count as f64 / self.distinct_days as f64
        }
    }
}

/// One bucket of a stacked time series, default-filled to the series' keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedPoint {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub values: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackedSeries {
    pub keys: Vec<String>,
    pub points: Vec<StackedPoint>,
}
