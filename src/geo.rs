// Province boundary handling: code -> name lookup and choropleth enrichment.
use std::collections::BTreeMap;

use geojson::{FeatureCollection, JsonObject, JsonValue};
use serde::Serialize;

use crate::error::DataError;
use crate::types::{col, FireTable};

/// Property key holding the numeric province code in the provinces GeoJSON.
pub const PROVINCE_CODE_KEY: &str = "cod_prov";
/// Property key holding the province name in the provinces GeoJSON.
pub const PROVINCE_NAME_KEY: &str = "name";

/// Build the `{province code -> province name}` lookup from a feature
/// collection.
///
/// Features missing either property are skipped without error. If two
/// features carry the same code, the last one wins.
pub fn build_province_lookup(
    collection: &FeatureCollection,
    code_key: &str,
    name_key: &str,
) -> BTreeMap<i64, String> {
    let mut lookup = BTreeMap::new();
    for feature in &collection.features {
        let Some(code) = feature.property(code_key).and_then(property_as_code) else {
            continue;
        };
        let Some(name) = feature.property(name_key).and_then(JsonValue::as_str) else {
            continue;
        };
        lookup.insert(code, name.to_string());
    }
    lookup
}

/// Province codes appear as JSON numbers in some boundary files and as
/// (possibly zero-padded) strings in others. Accept both.
fn property_as_code(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Fill the `provincia` column from the province-code lookup.
///
/// If the table has no `idprovincia` column this is a no-op. Codes without a
/// lookup entry keep whatever name the row already carried (which may be
/// none).
pub fn resolve_province_names(mut table: FireTable, lookup: &BTreeMap<i64, String>) -> FireTable {
    if !table.columns.contains(col::PROVINCE_ID) {
        return table;
    }
    for r in &mut table.rows {
        if let Some(name) = lookup.get(&r.province_code) {
            r.province_name = Some(name.clone());
        }
    }
    table.columns.insert(col::PROVINCE);
    table
}

/// Copy columns from aggregate rows onto the matching features of a GeoJSON
/// collection, keyed by province name.
///
/// Rows are matched to features through `feature.properties[geo_name_field]`
/// equal to the row's `key_field` value. Matched features receive each
/// selected column as a JSON-safe property; features without a match get
/// every selected property set to JSON null, so a missing aggregate is
/// distinguishable from a property that never existed. The caller's
/// collection is left untouched; the enriched copy is returned.
pub fn enrich_feature_collection<T: Serialize>(
    rows: &[T],
    key_field: &str,
    collection: &FeatureCollection,
    geo_name_field: &str,
    columns: Option<&[&str]>,
) -> Result<FeatureCollection, DataError> {
    let mut serialized: Vec<JsonObject> = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::to_value(row)? {
            JsonValue::Object(map) => serialized.push(map),
            _ => return Err(DataError::NotAnObject),
        }
    }

    // Columns to copy: the explicit list minus the key, or everything the
    // rows carry except the key.
    let copied: Vec<String> = match columns {
        Some(cols) => cols
            .iter()
            .filter(|c| **c != key_field)
            .filter(|c| serialized.first().map_or(true, |m| m.contains_key(**c)))
            .map(|c| (*c).to_string())
            .collect(),
        None => serialized
            .first()
            .map(|m| {
                m.keys()
                    .filter(|k| k.as_str() != key_field)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default(),
    };

    let mut lookup: BTreeMap<String, JsonObject> = BTreeMap::new();
    for map in serialized {
        if let Some(key) = map.get(key_field).and_then(JsonValue::as_str) {
            lookup.insert(key.to_string(), map);
        }
    }

    let mut enriched = collection.clone();
    for feature in &mut enriched.features {
        let matched = feature
            .property(geo_name_field)
            .and_then(JsonValue::as_str)
            .and_then(|name| lookup.get(name))
            .cloned();
        for column in &copied {
            let value = matched
                .as_ref()
                .and_then(|row| row.get(column))
                .cloned()
                .unwrap_or(JsonValue::Null);
            feature.set_property(column.clone(), value);
        }
    }
    Ok(enriched)
}
