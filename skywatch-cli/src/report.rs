//! Console output for an alert report: JSON dump and summary table.

use comfy_table::{Cell, Table};

use skywatch_core::{AlertReport, DistanceUnit};

/// Compact JSON, the same shape downstream scripts consume.
pub fn to_json(report: &AlertReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

/// One row per (watch point, aircraft).
pub fn build_table(report: &AlertReport, unit: DistanceUnit) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Point".to_string(),
        "Name".to_string(),
        "Hex".to_string(),
        "Flight".to_string(),
        format!("Dist ({unit})"),
        "Alt (ft)".to_string(),
    ]);

    for (point, record) in report {
        for (hex, hit) in &record.aircraft {
            let flight = hit.flight.trim();
            table.add_row(vec![
                Cell::new(point),
                Cell::new(&record.friendly_name),
                Cell::new(hex),
                Cell::new(if flight.is_empty() { "-" } else { flight }),
                Cell::new(format!("{:.3}", hit.distance)),
                Cell::new(if hit.altitude == 0.0 {
                    "-".to_string()
                } else {
                    hit.altitude.to_string()
                }),
            ]);
        }
    }

    table
}

pub fn print_json(report: &AlertReport) {
    match to_json(report) {
        Ok(text) => println!("{text}"),
        Err(e) => log::error!("cannot encode report: {e}"),
    }
}

pub fn print_table(report: &AlertReport, unit: DistanceUnit) {
    if report.is_empty() {
        println!("No aircraft inside any watch point.");
        return;
    }
    println!("{}", build_table(report, unit));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
