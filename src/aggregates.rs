// Grouped sums feeding the map and the yearly charts.
//
// Unlike the cleaning steps, these operations have hard preconditions: a
// missing input column aborts with an error naming every missing column. The
// only soft fallback is the alias-or-source resolution for burned area, which
// happens before the hard check.
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::DataError;
use crate::types::{
    col, BurnedAreaYearRow, FireRecord, FireTable, ProvinceResourcesRow, ResourcesYearRow,
    TopProvinceRow,
};

/// The three extinction-resource columns every resource aggregation needs.
pub const RESOURCE_COLUMNS: [&str; 3] = [col::PERSONNEL, col::HEAVY, col::AIR];

/// Add `total_medios` as the per-row sum of personnel, heavy and air
/// resources.
pub fn add_total_resources(mut table: FireTable) -> Result<FireTable, DataError> {
    let missing = table.columns.missing(&RESOURCE_COLUMNS);
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }
    for r in &mut table.rows {
        r.total_resources = r.personnel + r.heavy + r.air;
    }
    table.columns.insert(col::TOTAL);
    Ok(table)
}

/// Aggregate per province the metrics the choropleth needs: summed total,
/// personnel, heavy and air resources. Computes `total_medios` first if the
/// table does not carry it yet.
///
/// Rows whose province name is still unresolved are not part of any group.
/// Output rows come sorted by province name.
pub fn group_by_province_for_map(table: &FireTable) -> Result<Vec<ProvinceResourcesRow>, DataError> {
    let owned;
    let table = if table.columns.contains(col::TOTAL) {
        table
    } else {
        owned = add_total_resources(table.clone())?;
        &owned
    };
    let mut required = vec![col::PROVINCE];
    required.extend_from_slice(&RESOURCE_COLUMNS);
    let missing = table.columns.missing(&required);
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }

    #[derive(Default)]
    struct Acc {
        total: f64,
        personnel: f64,
        heavy: f64,
        air: f64,
    }
    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in &table.rows {
        let Some(name) = r.province_name.as_deref() else {
            continue;
        };
        let e = groups.entry(name).or_default();
        e.total += r.total_resources;
        e.personnel += r.personnel;
        e.heavy += r.heavy;
        e.air += r.air;
    }
    Ok(groups
        .into_iter()
        .map(|(name, acc)| ProvinceResourcesRow {
            province: name.to_string(),
            total: acc.total,
            personnel: acc.personnel,
            heavy: acc.heavy,
            air: acc.air,
        })
        .collect())
}

/// Pick the burned-area column: the alias if the table carries it, the raw
/// loss column otherwise. Neither present is a hard error naming both.
fn burned_area_column(table: &FireTable) -> Result<&'static str, DataError> {
    if table.columns.contains(col::BURNED_AREA) {
        Ok(col::BURNED_AREA)
    } else if table.columns.contains(col::AREA_SOURCE) {
        Ok(col::AREA_SOURCE)
    } else {
        Err(DataError::MissingColumns(vec![
            col::BURNED_AREA,
            col::AREA_SOURCE,
        ]))
    }
}

fn burned_area_value(r: &FireRecord, column: &str) -> f64 {
    if column == col::BURNED_AREA {
        r.burned_area
    } else {
        r.burned_area_source.unwrap_or(0.0)
    }
}

/// Sum burned hectares per year, sorted by year.
pub fn aggregate_burned_area_by_year(table: &FireTable) -> Result<Vec<BurnedAreaYearRow>, DataError> {
    let area_col = burned_area_column(table)?;
    let missing = table.columns.missing(&[col::YEAR]);
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }
    let mut groups: BTreeMap<i32, f64> = BTreeMap::new();
    for r in &table.rows {
        *groups.entry(r.year).or_default() += burned_area_value(r, area_col);
    }
    Ok(groups
        .into_iter()
        .map(|(year, burned_area)| BurnedAreaYearRow { year, burned_area })
        .collect())
}

/// Sum each resource column per year, sorted by year.
pub fn aggregate_resources_by_year(table: &FireTable) -> Result<Vec<ResourcesYearRow>, DataError> {
    let mut required = vec![col::YEAR];
    required.extend_from_slice(&RESOURCE_COLUMNS);
    let missing = table.columns.missing(&required);
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }
    #[derive(Default)]
    struct Acc {
        personnel: f64,
        heavy: f64,
        air: f64,
    }
    let mut groups: BTreeMap<i32, Acc> = BTreeMap::new();
    for r in &table.rows {
        let e = groups.entry(r.year).or_default();
        e.personnel += r.personnel;
        e.heavy += r.heavy;
        e.air += r.air;
    }
    Ok(groups
        .into_iter()
        .map(|(year, acc)| ResourcesYearRow {
            year,
            personnel: acc.personnel,
            heavy: acc.heavy,
            air: acc.air,
        })
        .collect())
}

/// Top `n` provinces by summed burned area, descending by default.
///
/// Groups are built in name order and the sort is stable, so provinces with
/// equal sums come out ordered by name.
pub fn top_provinces_by_burned_area(
    table: &FireTable,
    n: usize,
    ascending: bool,
) -> Result<Vec<TopProvinceRow>, DataError> {
    let area_col = burned_area_column(table)?;
    let missing = table.columns.missing(&[col::PROVINCE]);
    if !missing.is_empty() {
        return Err(DataError::MissingColumns(missing));
    }
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for r in &table.rows {
        let Some(name) = r.province_name.as_deref() else {
            continue;
        };
        *groups.entry(name).or_default() += burned_area_value(r, area_col);
    }
    let mut rows: Vec<TopProvinceRow> = groups
        .into_iter()
        .map(|(name, burned_area)| TopProvinceRow {
            province: name.to_string(),
            burned_area,
        })
        .collect();
    rows.sort_by(|a, b| {
        let ord = a
            .burned_area
            .partial_cmp(&b.burned_area)
            .unwrap_or(Ordering::Equal);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    rows.truncate(n);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnSet;

    fn row(year: i32, province: &str, resources: (f64, f64, f64), area: f64) -> FireRecord {
        FireRecord {
            year,
            province_name: Some(province.to_string()),
            personnel: resources.0,
            heavy: resources.1,
            air: resources.2,
            burned_area: area,
            burned_area_source: Some(area),
            ..FireRecord::default()
        }
    }

    fn full_table(rows: Vec<FireRecord>) -> FireTable {
        FireTable {
            columns: ColumnSet::from_names(&[
                col::YEAR,
                col::PROVINCE,
                col::PERSONNEL,
                col::HEAVY,
                col::AIR,
                col::AREA_SOURCE,
                col::BURNED_AREA,
            ]),
            rows,
        }
    }

    fn missing_columns(err: DataError) -> Vec<&'static str> {
        match err {
            DataError::MissingColumns(cols) => cols,
            other => panic!("expected MissingColumns, got {other}"),
        }
    }

    #[test]
    fn total_resources_sums_per_row() {
        let table = add_total_resources(full_table(vec![row(2020, "A", (2.0, 1.0, 0.5), 0.0)]))
            .unwrap();
        assert_eq!(table.rows[0].total_resources, 3.5);
        assert!(table.columns.contains(col::TOTAL));
    }

    #[test]
    fn total_resources_names_every_missing_column() {
        let mut table = full_table(vec![]);
        table.columns = ColumnSet::from_names(&[col::YEAR, col::PERSONNEL]);
        let cols = missing_columns(add_total_resources(table).unwrap_err());
        assert_eq!(cols, vec![col::HEAVY, col::AIR]);
    }

    #[test]
    fn province_grouping_sums_and_sorts_by_name() {
        let table = full_table(vec![
            row(2020, "Lugo", (2.0, 1.0, 0.0), 0.0),
            row(2020, "Asturias", (1.0, 0.0, 1.0), 0.0),
            row(2021, "Lugo", (3.0, 0.0, 1.0), 0.0),
        ]);
        let rows = group_by_province_for_map(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].province, "Asturias");
        assert_eq!(rows[0].total, 2.0);
        assert_eq!(rows[1].province, "Lugo");
        assert_eq!(rows[1].total, 7.0);
        assert_eq!(rows[1].personnel, 5.0);
    }

    #[test]
    fn province_grouping_skips_unresolved_rows() {
        let mut unresolved = row(2020, "x", (9.0, 9.0, 9.0), 0.0);
        unresolved.province_name = None;
        let table = full_table(vec![unresolved, row(2020, "Lugo", (1.0, 0.0, 0.0), 0.0)]);
        let rows = group_by_province_for_map(&table).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].province, "Lugo");
    }

    #[test]
    fn burned_area_by_year_prefers_the_alias() {
        let mut r = row(2019, "A", (0.0, 0.0, 0.0), 5.0);
        r.burned_area_source = Some(999.0);
        let rows = aggregate_burned_area_by_year(&full_table(vec![r])).unwrap();
        assert_eq!(rows[0].burned_area, 5.0);
    }

    #[test]
    fn burned_area_by_year_falls_back_to_the_source_column() {
        let mut table = full_table(vec![
            row(2019, "A", (0.0, 0.0, 0.0), 0.0),
            row(2019, "B", (0.0, 0.0, 0.0), 0.0),
        ]);
        table.columns = ColumnSet::from_names(&[col::YEAR, col::AREA_SOURCE]);
        table.rows[0].burned_area_source = Some(2.0);
        table.rows[1].burned_area_source = None;
        let rows = aggregate_burned_area_by_year(&table).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].burned_area, 2.0);
    }

    #[test]
    fn burned_area_by_year_errors_when_no_area_column_exists() {
        let mut table = full_table(vec![]);
        table.columns = ColumnSet::from_names(&[col::YEAR]);
        let cols = missing_columns(aggregate_burned_area_by_year(&table).unwrap_err());
        assert_eq!(cols, vec![col::BURNED_AREA, col::AREA_SOURCE]);
    }

    #[test]
    fn resources_by_year_sums_each_column() {
        let table = full_table(vec![
            row(2020, "A", (2.0, 1.0, 0.0), 0.0),
            row(2020, "B", (3.0, 0.0, 1.0), 0.0),
            row(2021, "A", (5.0, 2.0, 2.0), 0.0),
        ]);
        let rows = aggregate_resources_by_year(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 2020);
        assert_eq!(
            (rows[0].personnel, rows[0].heavy, rows[0].air),
            (5.0, 1.0, 1.0)
        );
        assert_eq!(rows[1].year, 2021);
        assert_eq!(
            (rows[1].personnel, rows[1].heavy, rows[1].air),
            (5.0, 2.0, 2.0)
        );
    }

    #[test]
    fn resources_by_year_names_missing_columns() {
        let mut table = full_table(vec![]);
        table.columns = ColumnSet::from_names(&[col::YEAR, col::AIR]);
        let cols = missing_columns(aggregate_resources_by_year(&table).unwrap_err());
        assert_eq!(cols, vec![col::PERSONNEL, col::HEAVY]);
    }

    #[test]
    fn top_provinces_ranks_descending_and_truncates() {
        let table = full_table(vec![
            row(2020, "A", (0.0, 0.0, 0.0), 100.0),
            row(2020, "B", (0.0, 0.0, 0.0), 50.0),
            row(2020, "C", (0.0, 0.0, 0.0), 75.0),
            row(2020, "D", (0.0, 0.0, 0.0), 10.0),
        ]);
        let rows = top_provinces_by_burned_area(&table, 3, false).unwrap();
        let got: Vec<(&str, f64)> = rows
            .iter()
            .map(|r| (r.province.as_str(), r.burned_area))
            .collect();
        assert_eq!(got, vec![("A", 100.0), ("C", 75.0), ("B", 50.0)]);
    }

    #[test]
    fn top_provinces_ascending_returns_the_smallest() {
        let table = full_table(vec![
            row(2020, "A", (0.0, 0.0, 0.0), 100.0),
            row(2020, "B", (0.0, 0.0, 0.0), 50.0),
            row(2020, "C", (0.0, 0.0, 0.0), 75.0),
        ]);
        let rows = top_provinces_by_burned_area(&table, 2, true).unwrap();
        let got: Vec<&str> = rows.iter().map(|r| r.province.as_str()).collect();
        assert_eq!(got, vec!["B", "C"]);
    }
}
