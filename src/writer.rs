use crate::error::{Error, Result};
use crate::table::{Cell, Table};
use crate::OutputFormat;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;

pub struct CsvConfig {
    pub format: OutputFormat,
    pub empty_value: String,
}

pub fn write_table<W: Write>(table: &Table, writer: W, config: &CsvConfig) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(config.format.delimiter())
        .flexible(true)
        .from_writer(writer);

    csv_writer.write_record(table.headers())?;

    let width = table.headers().len();
    for cells in table.rows() {
        let record: Vec<String> = (0..width)
            .map(|col| match cells.get(col) {
                None | Some(Cell::Empty) => config.empty_value.clone(),
                Some(cell) => cell.to_string(),
            })
            .collect();
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the table as a single-sheet workbook, keeping numbers numeric.
pub fn write_xlsx(table: &Table, path: &Path, sheet_name: &str) -> Result<()> {
    let xlsx_error = |details: String| Error::XlsxWrite {
        path: path.to_path_buf(),
        details,
    };

    let mut book = umya_spreadsheet::new_file();
    {
        let sheet = book
            .get_sheet_mut(&0)
            .ok_or_else(|| xlsx_error("workbook has no sheet".to_string()))?;
        sheet.set_name(sheet_title(sheet_name));

        for (col, header) in table.headers().iter().enumerate() {
            sheet
                .get_cell_mut((col as u32 + 1, 1u32))
                .set_value(header.as_str());
        }

        for row in 0..table.len() {
            for col in 0..table.headers().len() {
                let coord = (col as u32 + 1, row as u32 + 2);
                match table.get(row, col) {
                    Cell::Empty => {}
                    Cell::Number(n) => {
                        sheet.get_cell_mut(coord).set_value_number(*n);
                    }
                    Cell::Text(s) => {
                        sheet.get_cell_mut(coord).set_value(s.as_str());
                    }
                }
            }
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path).map_err(|e| xlsx_error(e.to_string()))
}

/// Excel rejects sheet names over 31 characters or containing `[]:*?/\`.
fn sheet_title(name: &str) -> String {
    name.chars()
        .map(|c| if "[]:*?/\\".contains(c) { '-' } else { c })
        .take(31)
        .collect()
}
