// High-level facade over the wildfire dataset.
//
// Mirrors the session lifecycle: both inputs are loaded once, cleaned and
// joined, and every aggregate afterwards is a derived view recomputed from
// the (possibly filtered) table.
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::Local;
use geojson::FeatureCollection;

use crate::aggregates::{
    aggregate_burned_area_by_year, aggregate_resources_by_year, group_by_province_for_map,
    top_provinces_by_burned_area,
};
use crate::cleaning;
use crate::error::DataError;
use crate::geo::{self, PROVINCE_CODE_KEY, PROVINCE_NAME_KEY};
use crate::loader::{self, LoadReport};
use crate::types::{
    col, BurnedAreaYearRow, FireTable, ProvinceResourcesRow, ResourcesYearRow, SummaryStats,
    TopProvinceRow,
};

/// The columns the map consumer reads off each enriched feature, plus the
/// join key itself.
pub const MAP_COLUMNS: [&str; 5] = [
    col::PROVINCE,
    col::TOTAL,
    col::PERSONNEL,
    col::HEAVY,
    col::AIR,
];

/// Loaded and prepared wildfire data: the cleaned table, the boundary
/// collection it joins against, and the code -> name lookup derived from it.
pub struct Wildfires {
    pub geojson: FeatureCollection,
    pub provinces: BTreeMap<i64, String>,
    pub table: FireTable,
    pub years: Vec<i32>,
    pub load_report: LoadReport,
}

impl Wildfires {
    /// Read both inputs, prepare the table and resolve province names.
    pub fn load(csv_path: &Path, geojson_path: &Path) -> Result<Self, DataError> {
        let (raw, load_report) = loader::read_wildfires_csv(csv_path)?;
        let geojson = loader::read_provinces_geojson(geojson_path)?;

        let prepared = cleaning::prepare(&raw, None);
        let provinces = geo::build_province_lookup(&geojson, PROVINCE_CODE_KEY, PROVINCE_NAME_KEY);
        let table = geo::resolve_province_names(prepared, &provinces);

        // Distinct years, ascending; the -1 sentinel is not a real year.
        let years: Vec<i32> = table
            .rows
            .iter()
            .map(|r| r.year)
            .filter(|y| *y >= 0)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(Self {
            geojson,
            provinces,
            table,
            years,
            load_report,
        })
    }

    pub fn min_max_year(&self) -> Option<(i32, i32)> {
        match (self.years.first(), self.years.last()) {
            (Some(min), Some(max)) => Some((*min, *max)),
            _ => None,
        }
    }

    /// Per-province aggregation feeding the choropleth.
    pub fn for_map(&self) -> Result<Vec<ProvinceResourcesRow>, DataError> {
        group_by_province_for_map(&self.table)
    }

    pub fn burned_area_by_year(&self) -> Result<Vec<BurnedAreaYearRow>, DataError> {
        aggregate_burned_area_by_year(&self.table)
    }

    pub fn resources_by_year(&self) -> Result<Vec<ResourcesYearRow>, DataError> {
        aggregate_resources_by_year(&self.table)
    }

    pub fn top_provinces(&self, n: usize) -> Result<Vec<TopProvinceRow>, DataError> {
        top_provinces_by_burned_area(&self.table, n, false)
    }

    /// Enrich the boundary collection with the per-province aggregates of
    /// `table` (usually a filtered view), ready for map rendering.
    pub fn enriched_geojson(&self, table: &FireTable) -> Result<FeatureCollection, DataError> {
        let rows = group_by_province_for_map(table)?;
        geo::enrich_feature_collection(
            &rows,
            col::PROVINCE,
            &self.geojson,
            PROVINCE_NAME_KEY,
            Some(&MAP_COLUMNS),
        )
    }
}

/// Keep rows inside the inclusive year range whose intent flag matches the
/// requested kinds. One conjunctive predicate, so the year and intent
/// conditions can be applied in any order with the same result.
pub fn filter_by_year_and_intent(
    table: &FireTable,
    year_range: (i32, i32),
    show_intentional: bool,
    show_non_intentional: bool,
) -> FireTable {
    let (y0, y1) = year_range;
    let rows = table
        .rows
        .iter()
        .filter(|r| {
            let in_years = r.year >= y0 && r.year <= y1;
            let intent_ok =
                (show_intentional && r.intentional) || (show_non_intentional && !r.intentional);
            in_years && intent_ok
        })
        .cloned()
        .collect();
    FireTable {
        columns: table.columns.clone(),
        rows,
    }
}

/// Headline numbers for the current selection.
pub fn summary_stats(table: &FireTable) -> SummaryStats {
    let total_fires = table.rows.len();
    let provinces: BTreeSet<&str> = table
        .rows
        .iter()
        .filter_map(|r| r.province_name.as_deref())
        .collect();
    let years: Vec<i32> = table.rows.iter().map(|r| r.year).filter(|y| *y >= 0).collect();
    let intentional = table.rows.iter().filter(|r| r.intentional).count();
    SummaryStats {
        total_fires,
        total_provinces: provinces.len(),
        year_min: years.iter().min().copied(),
        year_max: years.iter().max().copied(),
        burned_area: table.rows.iter().map(|r| r.burned_area).sum(),
        personnel: table.rows.iter().map(|r| r.personnel).sum(),
        heavy: table.rows.iter().map(|r| r.heavy).sum(),
        air: table.rows.iter().map(|r| r.air).sum(),
        intentional_share: if total_fires == 0 {
            0.0
        } else {
            intentional as f64 / total_fires as f64
        },
        generated_at: Local::now(),
    }
}
