use crate::blueprint_core::registry::InputKind;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Semantic type of a model field.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    StringList,
    ShortStringList,
    IsoDateString,
    LongString,
    Decimal,
    Integer,
    Boolean,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::String,
        FieldType::StringList,
        FieldType::ShortStringList,
        FieldType::IsoDateString,
        FieldType::LongString,
        FieldType::Decimal,
        FieldType::Integer,
        FieldType::Boolean,
    ];
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::String
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FieldSpec {
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default, alias = "inc")]
    pub increment: Option<f64>,
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64, increment: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.increment = Some(increment);
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// One form field as declared in the model or in YAML.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub spec: FieldSpec,
    // Explicit widget kind; wins over the registry default
    #[serde(default)]
    pub input: Option<InputKind>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, spec: FieldSpec) -> Self {
        Self {
            name: name.into(),
            label: None,
            spec,
            input: None,
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// A single cell of tabular sample data.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }

    /// Total order used to sort series keys: numbers first, then text.
    pub fn sort_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.total_cmp(b),
            (Scalar::Number(_), Scalar::Text(_)) => Ordering::Less,
            (Scalar::Text(_), Scalar::Number(_)) => Ordering::Greater,
            (Scalar::Text(a), Scalar::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(f64::from(v))
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

pub type Record = BTreeMap<String, Scalar>;

pub fn record<K, V, I>(cells: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Scalar>,
{
    cells
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LineChartConfig {
    pub x_field: String,
    pub y_field: String,
    pub series_field: String,
    #[serde(default = "default_plot_width")]
    pub width: u16,
    #[serde(default = "default_plot_height")]
    pub height: u16,
}

impl Default for LineChartConfig {
    fn default() -> Self {
        Self {
            x_field: "Day".into(),
            y_field: "Average Height (cm)".into(),
            series_field: "lab_id".into(),
            width: default_plot_width(),
            height: default_plot_height(),
        }
    }
}

fn default_plot_width() -> u16 {
    800
}

fn default_plot_height() -> u16 {
    400
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SeriesColor {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct YieldChartConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(default = "default_seed_field")]
    pub series_field: String,
    #[serde(default = "default_humidity_field")]
    pub x_field: String,
    #[serde(default = "default_temperature_field")]
    pub y_field: String,
    #[serde(default = "default_yield_field")]
    pub size_field: String,
    #[serde(default)]
    pub series: Vec<SeriesColor>,
}

impl Default for YieldChartConfig {
    fn default() -> Self {
        let seeds = [
            ("AXM477", "red"),
            ("AXM478", "yellow"),
            ("AXM479", "green"),
            ("AXM480", "blue"),
        ];
        Self {
            title: "Yield as a product of humidity and temperature".into(),
            x_label: "Average plot humidity".into(),
            y_label: "Average plot temperature".into(),
            series_field: default_seed_field(),
            x_field: default_humidity_field(),
            y_field: default_temperature_field(),
            size_field: default_yield_field(),
            series: seeds
                .iter()
                .map(|(label, color)| SeriesColor {
                    label: (*label).into(),
                    color: (*color).into(),
                })
                .collect(),
        }
    }
}

fn default_seed_field() -> String {
    "seed_sample".into()
}

fn default_humidity_field() -> String {
    "avg_humidity".into()
}

fn default_temperature_field() -> String {
    "avg_temperature".into()
}

fn default_yield_field() -> String {
    "yield".into()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_header")]
    pub header: String,
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub line_chart: LineChartConfig,
    #[serde(default)]
    pub yield_chart: YieldChartConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            header: default_header(),
            fields: default_fields(),
            line_chart: LineChartConfig::default(),
            yield_chart: YieldChartConfig::default(),
        }
    }
}

fn default_title() -> String {
    "Blueprint Application".into()
}

fn default_header() -> String {
    "Header".into()
}

fn default_fields() -> Vec<FieldConfig> {
    vec![FieldConfig::new(
        "Notes",
        FieldSpec::new(FieldType::LongString).required(),
    )]
}

// Example data for the line chart: average plant height per lab and day.
pub fn nodes() -> Vec<Record> {
    let rows: [(i32, &str, f64); 15] = [
        (0, "A", 1.419875),
        (0, "B", 1.332),
        (0, "C", 1.53775),
        (1, "A", 1.726625),
        (1, "B", 1.850375),
        (1, "C", 1.463375),
        (2, "A", 1.9),
        (2, "B", 2.1),
        (2, "C", 1.8),
        (3, "A", 2.2),
        (3, "B", 2.3),
        (3, "C", 2.0),
        (4, "A", 2.4),
        (4, "B", 2.5),
        (4, "C", 2.2),
    ];
    rows.iter()
        .map(|(day, lab, height)| {
            record([
                ("Day", Scalar::from(*day)),
                ("lab_id", Scalar::from(*lab)),
                ("Average Height (cm)", Scalar::from(*height)),
            ])
        })
        .collect()
}

// Example data for the yield chart: per-plot humidity/temperature and yield by seed sample.
pub fn seeds() -> Vec<Record> {
    let rows: [(&str, i32, f64, f64); 10] = [
        ("AXM480", 11, 27.758214285714286, 23.748571428571428),
        ("AXM480", 20, 27.214642857142857, 23.803214285714286),
        ("AXM480", 15, 26.289642857142857, 23.675),
        ("AXM478", 31, 27.292857142857143, 23.831785714285714),
        ("AXM477", 39, 27.100357142857143, 23.736071428571428),
        ("AXM478", 29, 26.855, 23.763214285714286),
        ("AXM479", 49, 25.855, 23.763214285714286),
        ("AXM478", 9, 26.155, 23.763214285714286),
        ("AXM477", 22, 27.500357142857143, 23.736071428571428),
        ("AXM479", 19, 26.555, 23.763214285714286),
    ];
    rows.iter()
        .map(|(seed, yld, humidity, temperature)| {
            record([
                ("seed_sample", Scalar::from(*seed)),
                ("yield", Scalar::from(*yld)),
                ("avg_humidity", Scalar::from(*humidity)),
                ("avg_temperature", Scalar::from(*temperature)),
            ])
        })
        .collect()
}
