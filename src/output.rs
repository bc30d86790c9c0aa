use geojson::FeatureCollection;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::error::DataError;

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), DataError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_feature_collection(path: &str, collection: &FeatureCollection) -> Result<(), DataError> {
    let s = serde_json::to_string_pretty(collection)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
