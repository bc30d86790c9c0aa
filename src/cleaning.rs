// Cleaning and preparation of the raw fire table.
//
// The pipeline order is fixed: select -> flag -> coerce -> alias. Flagging
// runs before coercion on purpose, so the intent flag is derived from the raw
// cause values with its own ad-hoc numeric parse.
use crate::types::{col, FireRecord, FireTable, RawRow, RawTable, SOURCE_COLUMNS};
use crate::util::{parse_f64_safe, parse_i64_safe};

/// Default set of columns of interest, in source order.
pub const DEFAULT_COLUMNS: [&str; 9] = SOURCE_COLUMNS;

/// Inclusive cause-code range that marks a fire as intentional.
pub const INTENTIONAL_LOWER: i64 = 400;
pub const INTENTIONAL_UPPER: i64 = 499;

/// Keep a subset of columns if they exist in the table.
///
/// Requested columns that the table does not carry are silently dropped; a
/// request with no present column yields an empty-column table, not an error.
pub fn select_columns(table: &RawTable, columns: Option<&[&'static str]>) -> RawTable {
    let requested = columns.unwrap_or(&DEFAULT_COLUMNS);
    let keep = table.columns.restrict(requested);
    let rows = table
        .rows
        .iter()
        .map(|r| RawRow {
            year: field_if(keep.contains(col::YEAR), &r.year),
            danger_id: field_if(keep.contains(col::DANGER_ID), &r.danger_id),
            province_id: field_if(keep.contains(col::PROVINCE_ID), &r.province_id),
            province: field_if(keep.contains(col::PROVINCE), &r.province),
            personnel: field_if(keep.contains(col::PERSONNEL), &r.personnel),
            heavy: field_if(keep.contains(col::HEAVY), &r.heavy),
            air: field_if(keep.contains(col::AIR), &r.air),
            area: field_if(keep.contains(col::AREA_SOURCE), &r.area),
            cause: field_if(keep.contains(col::CAUSE), &r.cause),
        })
        .collect();
    RawTable {
        columns: keep,
        rows,
    }
}

fn field_if(keep: bool, value: &Option<String>) -> Option<String> {
    if keep {
        value.clone()
    } else {
        None
    }
}

/// Compute the `intencionado` column: true iff the raw cause value parses as
/// a number inside `[lower, upper]` inclusive.
///
/// If the cause column is absent entirely, every row is flagged false. There
/// is no "unknown" state.
pub fn flag_intentional(table: &RawTable, lower: i64, upper: i64) -> Vec<bool> {
    if !table.columns.contains(col::CAUSE) {
        return vec![false; table.rows.len()];
    }
    let (lo, hi) = (lower as f64, upper as f64);
    table
        .rows
        .iter()
        .map(|r| match parse_f64_safe(r.cause.as_deref()) {
            Some(v) => v >= lo && v <= hi,
            None => false,
        })
        .collect()
}

/// Turn raw string fields into typed values.
///
/// - `idpeligro`, `idprovincia` (and `anio`): numeric parse, -1 on failure,
///   truncated to integer.
/// - resource counts: numeric parse, 0 on failure or missing.
/// - `perdidassuperficiales`: numeric parse, missing stays missing. The 0
///   substitution only happens later, in the alias column.
///
/// `intentional` must come from [`flag_intentional`] on the same table; the
/// flag column is attached here because the typed record is born here.
pub fn coerce_types(table: &RawTable, intentional: Vec<bool>) -> FireTable {
    let mut columns = table.columns.clone();
    columns.insert(col::INTENTIONAL);
    let rows = table
        .rows
        .iter()
        .zip(intentional)
        .map(|(r, flag)| FireRecord {
            year: parse_i64_safe(r.year.as_deref()).unwrap_or(-1) as i32,
            danger_id: parse_i64_safe(r.danger_id.as_deref()).unwrap_or(-1),
            province_code: parse_i64_safe(r.province_id.as_deref()).unwrap_or(-1),
            province_name: r.province.clone(),
            personnel: parse_f64_safe(r.personnel.as_deref()).unwrap_or(0.0),
            heavy: parse_f64_safe(r.heavy.as_deref()).unwrap_or(0.0),
            air: parse_f64_safe(r.air.as_deref()).unwrap_or(0.0),
            burned_area_source: parse_f64_safe(r.area.as_deref()),
            cause_code: parse_i64_safe(r.cause.as_deref()),
            intentional: flag,
            ..FireRecord::default()
        })
        .collect();
    FireTable { columns, rows }
}

/// Add the semantic `hectareas_quemadas` alias over the raw loss column,
/// replacing missing values with 0. If the source column is absent entirely,
/// the alias is 0 for every row.
pub fn add_burned_area_alias(mut table: FireTable) -> FireTable {
    for r in &mut table.rows {
        r.burned_area = r.burned_area_source.unwrap_or(0.0);
    }
    table.columns.insert(col::BURNED_AREA);
    table
}

/// Minimal preparation pipeline: select columns, flag intentional fires,
/// coerce types and create the burned-area alias, in that fixed order.
pub fn prepare(raw: &RawTable, columns: Option<&[&'static str]>) -> FireTable {
    let selected = select_columns(raw, columns);
    let flags = flag_intentional(&selected, INTENTIONAL_LOWER, INTENTIONAL_UPPER);
    let coerced = coerce_types(&selected, flags);
    add_burned_area_alias(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnSet;

    fn raw_table(columns: &[&'static str], rows: Vec<RawRow>) -> RawTable {
        RawTable {
            columns: ColumnSet::from_names(columns),
            rows,
        }
    }

    fn cause_row(cause: Option<&str>) -> RawRow {
        RawRow {
            cause: cause.map(str::to_string),
            ..RawRow::default()
        }
    }

    #[test]
    fn select_drops_absent_columns_silently() {
        let table = raw_table(
            &[col::YEAR, col::CAUSE],
            vec![RawRow {
                year: Some("2001".into()),
                cause: Some("410".into()),
                province: Some("should vanish".into()),
                ..RawRow::default()
            }],
        );
        let out = select_columns(&table, Some(&[col::YEAR, col::PROVINCE]));
        assert!(out.columns.contains(col::YEAR));
        assert!(!out.columns.contains(col::PROVINCE));
        assert!(!out.columns.contains(col::CAUSE));
        assert_eq!(out.rows[0].year.as_deref(), Some("2001"));
        assert_eq!(out.rows[0].cause, None);
    }

    #[test]
    fn select_with_nothing_present_yields_empty_columns() {
        let table = raw_table(&[col::YEAR], vec![RawRow::default()]);
        let out = select_columns(&table, Some(&[col::PROVINCE, col::CAUSE]));
        assert!(out.columns.is_empty());
        assert_eq!(out.rows.len(), 1);
    }

    #[test]
    fn intent_flag_uses_inclusive_bounds_on_raw_values() {
        let table = raw_table(
            &[col::CAUSE],
            vec![
                cause_row(Some("400")),
                cause_row(Some("499")),
                cause_row(Some("450.5")),
                cause_row(Some("399")),
                cause_row(Some("500")),
                cause_row(Some("abc")),
                cause_row(None),
            ],
        );
        let flags = flag_intentional(&table, INTENTIONAL_LOWER, INTENTIONAL_UPPER);
        assert_eq!(flags, vec![true, true, true, false, false, false, false]);
    }

    #[test]
    fn intent_flag_is_false_when_cause_column_absent() {
        let table = raw_table(&[col::YEAR], vec![RawRow::default(), RawRow::default()]);
        let flags = flag_intentional(&table, INTENTIONAL_LOWER, INTENTIONAL_UPPER);
        assert_eq!(flags, vec![false, false]);
    }

    #[test]
    fn coerce_substitutes_sentinels() {
        let table = raw_table(
            &[col::DANGER_ID, col::PROVINCE_ID, col::PERSONNEL, col::AREA_SOURCE],
            vec![
                RawRow {
                    danger_id: Some("abc".into()),
                    province_id: Some("12.0".into()),
                    personnel: Some("3".into()),
                    area: Some("1.5".into()),
                    ..RawRow::default()
                },
                RawRow {
                    danger_id: Some("7".into()),
                    ..RawRow::default()
                },
            ],
        );
        let out = coerce_types(&table, vec![false, false]);
        assert_eq!(out.rows[0].danger_id, -1);
        assert_eq!(out.rows[0].province_code, 12);
        assert_eq!(out.rows[0].personnel, 3.0);
        assert_eq!(out.rows[0].burned_area_source, Some(1.5));
        assert_eq!(out.rows[1].danger_id, 7);
        assert_eq!(out.rows[1].personnel, 0.0);
        assert_eq!(out.rows[1].burned_area_source, None);
        assert!(out.columns.contains(col::INTENTIONAL));
    }

    #[test]
    fn alias_fills_missing_with_zero() {
        let table = raw_table(
            &[col::AREA_SOURCE],
            vec![
                RawRow {
                    area: Some("2.5".into()),
                    ..RawRow::default()
                },
                RawRow::default(),
            ],
        );
        let out = add_burned_area_alias(coerce_types(&table, vec![false, false]));
        assert_eq!(out.rows[0].burned_area, 2.5);
        assert_eq!(out.rows[1].burned_area, 0.0);
        assert!(out.columns.contains(col::BURNED_AREA));
    }

    #[test]
    fn alias_is_zero_when_source_column_absent() {
        let table = raw_table(&[col::YEAR], vec![RawRow::default()]);
        let out = add_burned_area_alias(coerce_types(&table, vec![false]));
        assert_eq!(out.rows[0].burned_area, 0.0);
        assert!(out.columns.contains(col::BURNED_AREA));
    }

    #[test]
    fn prepare_runs_the_full_pipeline() {
        let table = raw_table(
            &[col::YEAR, col::CAUSE, col::AREA_SOURCE],
            vec![RawRow {
                year: Some("1998".into()),
                cause: Some("425".into()),
                area: Some("10".into()),
                ..RawRow::default()
            }],
        );
        let out = prepare(&table, None);
        let row = &out.rows[0];
        assert_eq!(row.year, 1998);
        assert!(row.intentional);
        assert_eq!(row.cause_code, Some(425));
        assert_eq!(row.burned_area, 10.0);
    }
}
