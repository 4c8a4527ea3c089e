use crate::error::{Error, Result};
use crate::table::{Cell, Table};
use csv::ReaderBuilder;
use ssfmt::{FormatOptions, NumberFormat};
use std::path::Path;
use tracing::debug;
use umya_spreadsheet::structs::Worksheet;
use umya_spreadsheet::Spreadsheet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

/// A bare number selects by position, anything else by name.
pub fn parse_sheet_selector(selector: &str) -> SheetSelector {
    match selector.trim().parse::<usize>() {
        Ok(idx) => SheetSelector::Index(idx),
        Err(_) => SheetSelector::Name(selector.to_string()),
    }
}

/// How to find the header row and which sheet to read.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub sheet: Option<SheetSelector>,
    /// Rows above the header line.
    pub skip_rows: usize,
}

/// Load the input file into a [`Table`], dispatching on extension.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<Table> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    match extension(path).as_str() {
        "csv" => read_csv(path, options.skip_rows),
        _ => {
            let workbook = open_workbook(path)?;
            let sheet_names = get_sheet_names(&workbook);
            let idx = match &options.sheet {
                Some(sel) => resolve_sheet_index(sel, &sheet_names)?,
                None => 0,
            };
            let sheet = workbook
                .get_sheet(&idx)
                .ok_or_else(|| Error::SheetIndexOutOfRange {
                    index: idx,
                    count: sheet_names.len(),
                })?;
            debug!(sheet = %sheet.get_name(), "Reading worksheet");
            sheet_to_table(sheet, options.skip_rows)
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

pub fn open_workbook(path: &Path) -> Result<Spreadsheet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let extension = extension(path);
    match extension.as_str() {
        "xlsx" | "xlsm" => open_xlsx(path),
        "xls" => open_xls(path),
        _ => Err(Error::UnsupportedFormat(extension)),
    }
}

fn open_xlsx(path: &Path) -> Result<Spreadsheet> {
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| Error::InvalidExcel {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

fn open_xls(path: &Path) -> Result<Spreadsheet> {
    xlrd::open(path).map_err(|e| Error::InvalidExcel {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

pub fn get_sheet_names(workbook: &Spreadsheet) -> Vec<String> {
    workbook
        .get_sheet_collection()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect()
}

fn resolve_sheet_index(selector: &SheetSelector, sheet_names: &[String]) -> Result<usize> {
    match selector {
        SheetSelector::Index(idx) => {
            if *idx < sheet_names.len() {
                Ok(*idx)
            } else {
                Err(Error::SheetIndexOutOfRange {
                    index: *idx,
                    count: sheet_names.len(),
                })
            }
        }
        SheetSelector::Name(name) => sheet_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::SheetNotFound {
                name: name.clone(),
                available: sheet_names.join(", "),
            }),
    }
}

fn sheet_to_table(sheet: &Worksheet, skip_rows: usize) -> Result<Table> {
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    let opts = FormatOptions::default();

    let mut rows = (1..=max_row).map(|row| {
        (1..=max_col)
            .map(|col| read_cell(sheet, col, row, &opts))
            .collect::<Vec<_>>()
    });
    let table = build_table(&mut rows, skip_rows)?;

    debug!(rows = table.len(), columns = table.headers().len(), "Loaded worksheet");
    Ok(table)
}

/// Read a cell through its number format so durations arrive as the text
/// Excel would show. General-format numbers and date serials stay numeric.
fn read_cell(sheet: &Worksheet, col: u32, row: u32, opts: &FormatOptions) -> Cell {
    let Some(cell) = sheet.get_cell((col, row)) else {
        return Cell::Empty;
    };

    let raw_value = cell.get_value();
    if raw_value.trim().is_empty() {
        return Cell::Empty;
    }

    let format_code = cell
        .get_style()
        .get_number_format()
        .map(|nf| nf.get_format_code())
        .unwrap_or("General");

    format_value(&raw_value, format_code, opts)
}

/// Render a raw cell value through its format code.
///
/// Date-formatted numbers stay as serials: the rendered text can be
/// month-first (`mm-dd-yy`) and would not read back reliably.
fn format_value(raw_value: &str, format_code: &str, opts: &FormatOptions) -> Cell {
    if format_code.eq_ignore_ascii_case("General") {
        return Cell::parse(raw_value);
    }

    if let Ok(num) = raw_value.trim().parse::<f64>() {
        if is_date_format(format_code) {
            return Cell::Number(num);
        }
    }

    let fmt = match NumberFormat::parse(format_code) {
        Ok(f) => f,
        Err(_) => return Cell::parse(raw_value),
    };

    if let Ok(num) = raw_value.parse::<f64>() {
        return Cell::parse(&fmt.format(num, opts));
    }

    Cell::text(fmt.format_text(raw_value, opts))
}

/// A format code shows a calendar date if it has a year or day token
/// outside quoted literals, bracketed sections and escapes.
fn is_date_format(format_code: &str) -> bool {
    let mut chars = format_code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                chars.by_ref().find(|&c| c == '"');
            }
            '[' => {
                chars.by_ref().find(|&c| c == ']');
            }
            '\\' => {
                chars.next();
            }
            'y' | 'Y' | 'd' | 'D' => return true,
            _ => {}
        }
    }
    false
}

fn read_csv(path: &Path, skip_rows: usize) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(Error::CsvRead)?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(Error::CsvRead)?;
        records.push(record.iter().map(Cell::parse).collect::<Vec<_>>());
    }
    let table = build_table(&mut records.into_iter(), skip_rows)?;

    debug!(rows = table.len(), columns = table.headers().len(), "Loaded CSV");
    Ok(table)
}

/// Skip `skip_rows` lines, take the next as headers, keep non-blank rows after it.
fn build_table<I>(rows: &mut I, skip_rows: usize) -> Result<Table>
where
    I: Iterator<Item = Vec<Cell>>,
{
    let header = rows
        .nth(skip_rows)
        .ok_or(Error::EmptyInput { skipped: skip_rows })?;
    let mut table = Table::new(header.iter().map(|c| c.to_string()).collect());

    for row in rows {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        table.push_row(row);
    }
    Ok(table)
}
