// Entry point and high-level CLI flow.
//
// The binary is a small console dashboard over the Spain wildfires dataset:
// - Option [1] loads the CSV and the provinces GeoJSON, cleans the table and
//   resolves province names, printing diagnostics.
// - Option [2] adjusts the year-range and cause filters.
// - Option [3] prints the four aggregate views the map and charts consume.
// - Option [4] exports the clean table, the enriched GeoJSON and a JSON
//   summary of the current selection.
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use spain_wildfires::dataset::{filter_by_year_and_intent, summary_stats, Wildfires};
use spain_wildfires::types::FireTable;
use spain_wildfires::util::{format_int, format_number};
use spain_wildfires::{aggregates, output};

const CSV_PATH: &str = "data/raw/incendios.csv";
const GEOJSON_PATH: &str = "data/raw/spain-provinces.geojson";
const TOP_N: usize = 10;
const PREVIEW_ROWS: usize = 10;

const CLEAN_CSV_FILE: &str = "incendios_clean.csv";
const ENRICHED_GEOJSON_FILE: &str = "provinces_enriched.geojson";
const SUMMARY_FILE: &str = "summary.json";

// Simple in-memory app state so we only load the inputs once but can
// re-filter and re-aggregate any number of times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        filters: None,
    })
});

struct AppState {
    data: Option<Wildfires>,
    filters: Option<Filters>,
}

#[derive(Clone, Copy)]
struct Filters {
    year_range: (i32, i32),
    show_intentional: bool,
    show_non_intentional: bool,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt. The prompt is reused for the main menu and simple numeric inputs.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_line_with_prompt(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask a Y/N question until the user answers one or the other.
fn prompt_yes_no(question: &str) -> bool {
    loop {
        let resp = read_line_with_prompt(&format!("{} (Y/N): ", question)).to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Prompt for a year, keeping `current` when the input is empty or not a
/// number.
fn prompt_year(label: &str, current: i32) -> i32 {
    let resp = read_line_with_prompt(&format!("{} [{}]: ", label, current));
    resp.parse::<i32>().unwrap_or(current)
}

/// Handle option [1]: load and prepare both inputs.
///
/// On success the dataset lands in `APP_STATE` together with the default
/// filter selection (first decade of the data, both cause kinds).
fn handle_load() {
    match Wildfires::load(Path::new(CSV_PATH), Path::new(GEOJSON_PATH)) {
        Ok(ds) => {
            println!(
                "Processing dataset... ({} rows loaded, {} provinces in the boundary file)",
                format_int(ds.load_report.total_rows as i64),
                format_int(ds.provinces.len() as i64)
            );
            if ds.load_report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    format_int(ds.load_report.parse_errors as i64)
                );
            }
            let filters = ds.min_max_year().map(|(min, max)| Filters {
                year_range: (min, (min + 10).min(max)),
                show_intentional: true,
                show_non_intentional: true,
            });
            if filters.is_none() {
                println!("Warning: no valid years detected in the dataset.");
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(ds);
            state.filters = filters;
        }
        Err(e) => {
            eprintln!("Failed to load dataset: {}\n", e);
        }
    }
}

/// Handle option [2]: adjust the year range and the cause-kind toggles.
fn handle_filters() {
    let (min_max, current) = {
        let state = APP_STATE.lock().unwrap();
        let Some(ds) = state.data.as_ref() else {
            println!("Error: No data loaded. Please load the dataset first (option 1).\n");
            return;
        };
        let Some(min_max) = ds.min_max_year() else {
            println!("Error: The dataset has no usable years.\n");
            return;
        };
        (min_max, state.filters)
    };
    let current = current.unwrap_or(Filters {
        year_range: min_max,
        show_intentional: true,
        show_non_intentional: true,
    });

    println!("Years available: {}-{}", min_max.0, min_max.1);
    let mut y0 = prompt_year("Start year", current.year_range.0).clamp(min_max.0, min_max.1);
    let mut y1 = prompt_year("End year", current.year_range.1).clamp(min_max.0, min_max.1);
    if y0 > y1 {
        std::mem::swap(&mut y0, &mut y1);
    }
    let show_intentional = prompt_yes_no("Show intentional fires");
    let show_non_intentional = prompt_yes_no("Show non-intentional fires");
    if !show_intentional && !show_non_intentional {
        println!("Select at least one cause kind to display data. Filters unchanged.\n");
        return;
    }

    let mut state = APP_STATE.lock().unwrap();
    state.filters = Some(Filters {
        year_range: (y0, y1),
        show_intentional,
        show_non_intentional,
    });
    println!();
}

/// The filtered view of the loaded table, or `None` when nothing is loaded.
fn filtered_selection(state: &AppState) -> Option<(FireTable, Filters)> {
    let ds = state.data.as_ref()?;
    let filters = state.filters?;
    let filtered = filter_by_year_and_intent(
        &ds.table,
        filters.year_range,
        filters.show_intentional,
        filters.show_non_intentional,
    );
    Some((filtered, filters))
}

/// Handle option [3]: print the aggregate tables the map and the charts
/// would consume, computed from the filtered selection.
fn handle_dashboard() {
    let state = APP_STATE.lock().unwrap();
    let Some((filtered, filters)) = filtered_selection(&state) else {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return;
    };
    println!(
        "Selection: years {}-{}, {} rows\n",
        filters.year_range.0,
        filters.year_range.1,
        format_int(filtered.rows.len() as i64)
    );

    println!("Resources by province (choropleth input)");
    match aggregates::group_by_province_for_map(&filtered) {
        Ok(rows) => {
            output::preview_table_rows(&rows, PREVIEW_ROWS);
            if rows.len() > PREVIEW_ROWS {
                println!("({} provinces total)\n", format_int(rows.len() as i64));
            }
        }
        Err(e) => eprintln!("Aggregation error: {}\n", e),
    }

    println!("Burned hectares by year");
    match aggregates::aggregate_burned_area_by_year(&filtered) {
        Ok(rows) => output::preview_table_rows(&rows, PREVIEW_ROWS),
        Err(e) => eprintln!("Aggregation error: {}\n", e),
    }

    println!("Resources by year");
    match aggregates::aggregate_resources_by_year(&filtered) {
        Ok(rows) => output::preview_table_rows(&rows, PREVIEW_ROWS),
        Err(e) => eprintln!("Aggregation error: {}\n", e),
    }

    println!("Top {} provinces by burned hectares", TOP_N);
    match aggregates::top_provinces_by_burned_area(&filtered, TOP_N, false) {
        Ok(rows) => output::preview_table_rows(&rows, TOP_N),
        Err(e) => eprintln!("Aggregation error: {}\n", e),
    }

    let stats = summary_stats(&filtered);
    println!(
        "Summary: {} fires, {} provinces, {} ha burned, {}% intentional\n",
        format_int(stats.total_fires as i64),
        format_int(stats.total_provinces as i64),
        format_number(stats.burned_area, 1),
        format_number(stats.intentional_share * 100.0, 1)
    );
}

/// Handle option [4]: write the clean table, the enriched GeoJSON and the
/// summary for the current selection.
fn handle_export() {
    let state = APP_STATE.lock().unwrap();
    let Some(ds) = state.data.as_ref() else {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return;
    };
    let Some((filtered, _)) = filtered_selection(&state) else {
        println!("Error: No filter selection available.\n");
        return;
    };

    if let Err(e) = output::write_csv(CLEAN_CSV_FILE, &ds.table.rows) {
        eprintln!("Write error: {}", e);
    } else {
        println!("Clean table exported to {}", CLEAN_CSV_FILE);
    }

    match ds.enriched_geojson(&filtered) {
        Ok(enriched) => {
            if let Err(e) = output::write_feature_collection(ENRICHED_GEOJSON_FILE, &enriched) {
                eprintln!("Write error: {}", e);
            } else {
                println!("Enriched GeoJSON exported to {}", ENRICHED_GEOJSON_FILE);
            }
        }
        Err(e) => eprintln!("Enrichment error: {}", e),
    }

    let summary = summary_stats(&filtered);
    if let Err(e) = output::write_json(SUMMARY_FILE, &summary) {
        eprintln!("Write error: {}", e);
    } else {
        println!("Summary exported to {}", SUMMARY_FILE);
    }
    println!();
}

fn main() {
    pretty_env_logger::init();
    loop {
        println!("Spain Wildfires - console dashboard");
        println!("[1] Load the dataset");
        println!("[2] Adjust filters");
        println!("[3] Show dashboard tables");
        println!("[4] Export artifacts");
        println!("[5] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => handle_filters(),
            "3" => {
                println!();
                handle_dashboard();
            }
            "4" => {
                println!();
                handle_export();
            }
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter a number between 1 and 5.\n");
            }
        }
    }
}
