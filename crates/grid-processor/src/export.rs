//! CSV and Word export of extracted series.

use std::io::{Cursor, Write};

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use grid_common::{format_timestamp, Sample};

use crate::error::{GridError, Result};
use crate::extract::Extraction;

/// Write one row per time step: `time,lat,lon,<series...>`.
///
/// Series columns follow key order. Rows follow the sample order of the
/// series, which all come from the same time axis, so duplicate or
/// unsorted time values are written as they appear. Missing values are
/// empty cells.
pub fn write_csv<W: Write>(extraction: &Extraction, writer: W) -> Result<()> {
    let point = extraction
        .point
        .ok_or_else(|| GridError::export("extraction has no grid point"))?;

    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["time".to_string(), "lat".to_string(), "lon".to_string()];
    header.extend(extraction.series.keys().cloned());
    wtr.write_record(&header)?;

    let columns: Vec<Vec<&Sample>> = extraction
        .series
        .values()
        .map(|s| s.iter().collect())
        .collect();
    let n_rows = columns.iter().map(Vec::len).max().unwrap_or(0);

    let lat = point.lat.to_string();
    let lon = point.lon.to_string();
    for row in 0..n_rows {
        let Some(timestamp) = columns.iter().find_map(|c| c.get(row)).map(|s| s.timestamp) else {
            continue;
        };

        let mut record = vec![format_timestamp(&timestamp), lat.clone(), lon.clone()];
        record.extend(columns.iter().map(|column| match column.get(row) {
            Some(sample) if sample.timestamp == timestamp => {
                sample.value.map(|v| v.to_string()).unwrap_or_default()
            }
            _ => String::new(),
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| GridError::export(e.to_string()))?;
    Ok(())
}

/// Render the extraction as a CSV document.
pub fn to_csv_string(extraction: &Extraction) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(extraction, &mut buf)?;
    String::from_utf8(buf).map_err(|e| GridError::export(e.to_string()))
}

/// Render the extraction as a Word document.
///
/// A title, the grid point, the date window when one was applied, then the
/// CSV rows as a table.
pub fn to_docx_bytes(extraction: &Extraction) -> Result<Vec<u8>> {
    let point = extraction
        .point
        .ok_or_else(|| GridError::export("extraction has no grid point"))?;
    let csv = to_csv_string(extraction)?;

    let mut rows = Vec::new();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(csv.as_bytes());
    for record in reader.records() {
        let cells = record?
            .iter()
            .map(|field| TableCell::new().add_paragraph(text_paragraph(field)))
            .collect();
        rows.push(TableRow::new(cells));
    }

    let mut doc = Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text("Time Series Data").bold().size(40)),
        )
        .add_paragraph(text_paragraph(&format!(
            "Grid Point: Lat {:.4}, Lon {:.4}",
            point.lat, point.lon
        )));
    if let Some(range) = extraction.range {
        doc = doc.add_paragraph(text_paragraph(&format!(
            "Date Range: {} → {}",
            range.start.date_naive(),
            range.end.date_naive()
        )));
    }
    let doc = doc.add_table(Table::new(rows));

    let mut buf = Cursor::new(Vec::new());
    doc.build()
        .pack(&mut buf)
        .map_err(|e| GridError::export(e.to_string()))?;
    Ok(buf.into_inner())
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}
