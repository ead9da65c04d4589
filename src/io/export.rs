//! CSV export of the zone inputs table.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::zones::{ZoneField, ZoneInputsReport};

/// Column header of the inputs table.
const HEADER: [&str; 4] = ["field", "description", "valid_zones", "total_zones"];

/// Exports the inputs table to a CSV file at the given path.
///
/// # Errors
///
/// Returns a `csv::Error` if file creation or writing fails.
pub fn export_inputs_csv(
    report: &ZoneInputsReport,
    schema: &[ZoneField],
    zone_count: usize,
    path: &Path,
) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_inputs_csv(report, schema, zone_count, io::BufWriter::new(file))
}

/// Writes one row per schema field, in schema order, to any writer.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_inputs_csv(
    report: &ZoneInputsReport,
    schema: &[ZoneField],
    zone_count: usize,
    writer: impl Write,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER)?;

    let total = zone_count.to_string();
    for field in schema {
        wtr.write_record([
            field.name,
            field.description,
            report.count(field.name).to_string().as_str(),
            total.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
