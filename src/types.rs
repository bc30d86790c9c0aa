use std::collections::BTreeSet;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Column names as they appear in the source CSV and in derived tables.
pub mod col {
    pub const YEAR: &str = "anio";
    pub const DANGER_ID: &str = "idpeligro";
    pub const PROVINCE_ID: &str = "idprovincia";
    pub const PROVINCE: &str = "provincia";
    pub const PERSONNEL: &str = "numeromediospersonal";
    pub const HEAVY: &str = "numeromediospesados";
    pub const AIR: &str = "numeromediosaereos";
    pub const AREA_SOURCE: &str = "perdidassuperficiales";
    pub const CAUSE: &str = "idcausa";

    // Derived columns.
    pub const INTENTIONAL: &str = "intencionado";
    pub const BURNED_AREA: &str = "hectareas_quemadas";
    pub const TOTAL: &str = "total_medios";
}

/// Every source column the reader recognizes. Anything else in the CSV is
/// ignored.
pub const SOURCE_COLUMNS: [&str; 9] = [
    col::YEAR,
    col::DANGER_ID,
    col::PROVINCE_ID,
    col::PROVINCE,
    col::PERSONNEL,
    col::HEAVY,
    col::AIR,
    col::AREA_SOURCE,
    col::CAUSE,
];

/// Which columns a table actually carries. Record fields always exist; this
/// set is what operations consult before trusting a field, instead of probing
/// values at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet(BTreeSet<&'static str>);

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names(names: &[&'static str]) -> Self {
        Self(names.iter().copied().collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: &'static str) {
        self.0.insert(name);
    }

    /// Intersection with `names`, preserving only columns present in both.
    pub fn restrict(&self, names: &[&'static str]) -> Self {
        Self(names.iter().copied().filter(|n| self.contains(n)).collect())
    }

    /// The subset of `required` that this table does not carry.
    pub fn missing(&self, required: &[&'static str]) -> Vec<&'static str> {
        required
            .iter()
            .copied()
            .filter(|n| !self.contains(n))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One CSV row as read from disk, everything still a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "anio")]
    pub year: Option<String>,
    #[serde(rename = "idpeligro")]
    pub danger_id: Option<String>,
    #[serde(rename = "idprovincia")]
    pub province_id: Option<String>,
    #[serde(rename = "provincia")]
    pub province: Option<String>,
    #[serde(rename = "numeromediospersonal")]
    pub personnel: Option<String>,
    #[serde(rename = "numeromediospesados")]
    pub heavy: Option<String>,
    #[serde(rename = "numeromediosaereos")]
    pub air: Option<String>,
    #[serde(rename = "perdidassuperficiales")]
    pub area: Option<String>,
    #[serde(rename = "idcausa")]
    pub cause: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: ColumnSet,
    pub rows: Vec<RawRow>,
}

/// One fire event after cleaning. Sentinels follow the column conventions:
/// -1 for unparsable ids, 0 for unparsable resource counts, `None` where a
/// value is genuinely missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireRecord {
    #[serde(rename = "anio")]
    pub year: i32,
    #[serde(rename = "idpeligro")]
    pub danger_id: i64,
    #[serde(rename = "idprovincia")]
    pub province_code: i64,
    #[serde(rename = "provincia")]
    pub province_name: Option<String>,
    #[serde(rename = "numeromediospersonal")]
    pub personnel: f64,
    #[serde(rename = "numeromediospesados")]
    pub heavy: f64,
    #[serde(rename = "numeromediosaereos")]
    pub air: f64,
    #[serde(rename = "perdidassuperficiales")]
    pub burned_area_source: Option<f64>,
    #[serde(rename = "idcausa")]
    pub cause_code: Option<i64>,
    #[serde(rename = "intencionado")]
    pub intentional: bool,
    #[serde(rename = "hectareas_quemadas")]
    pub burned_area: f64,
    #[serde(rename = "total_medios")]
    pub total_resources: f64,
}

impl Default for FireRecord {
    fn default() -> Self {
        Self {
            year: -1,
            danger_id: -1,
            province_code: -1,
            province_name: None,
            personnel: 0.0,
            heavy: 0.0,
            air: 0.0,
            burned_area_source: None,
            cause_code: None,
            intentional: false,
            burned_area: 0.0,
            total_resources: 0.0,
        }
    }
}

/// The cleaned table: typed rows plus the set of columns they were built from.
#[derive(Debug, Clone, Default)]
pub struct FireTable {
    pub columns: ColumnSet,
    pub rows: Vec<FireRecord>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ProvinceResourcesRow {
    #[serde(rename = "provincia")]
    #[tabled(rename = "provincia")]
    pub province: String,
    #[serde(rename = "total_medios")]
    #[tabled(rename = "total_medios")]
    pub total: f64,
    #[serde(rename = "numeromediospersonal")]
    #[tabled(rename = "numeromediospersonal")]
    pub personnel: f64,
    #[serde(rename = "numeromediospesados")]
    #[tabled(rename = "numeromediospesados")]
    pub heavy: f64,
    #[serde(rename = "numeromediosaereos")]
    #[tabled(rename = "numeromediosaereos")]
    pub air: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct BurnedAreaYearRow {
    #[serde(rename = "anio")]
    #[tabled(rename = "anio")]
    pub year: i32,
    #[serde(rename = "hectareas_quemadas")]
    #[tabled(rename = "hectareas_quemadas")]
    pub burned_area: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ResourcesYearRow {
    #[serde(rename = "anio")]
    #[tabled(rename = "anio")]
    pub year: i32,
    #[serde(rename = "numeromediospersonal")]
    #[tabled(rename = "numeromediospersonal")]
    pub personnel: f64,
    #[serde(rename = "numeromediospesados")]
    #[tabled(rename = "numeromediospesados")]
    pub heavy: f64,
    #[serde(rename = "numeromediosaereos")]
    #[tabled(rename = "numeromediosaereos")]
    pub air: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct TopProvinceRow {
    #[serde(rename = "provincia")]
    #[tabled(rename = "provincia")]
    pub province: String,
    #[serde(rename = "hectareas_quemadas")]
    #[tabled(rename = "hectareas_quemadas")]
    pub burned_area: f64,
}

/// Headline numbers for the current filter selection, exported as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub total_fires: usize,
    pub total_provinces: usize,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub burned_area: f64,
    pub personnel: f64,
    pub heavy: f64,
    pub air: f64,
    pub intentional_share: f64,
    pub generated_at: DateTime<Local>,
}
