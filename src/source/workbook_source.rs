use std::fs::File;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use super::{LoadOptions, assemble, file_label};
use crate::error::LoadError;
use crate::models::Dataset;

/// Text form of a spreadsheet cell. Empty and error cells are absent.
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Data::Float(f) => Some(format_float(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(|d| d.to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

// Spreadsheets store every number as a double; whole numbers print without ".0".
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

pub fn read_workbook(path: &Path, opts: &LoadOptions) -> Result<Dataset, LoadError> {
    let path_str = path.display().to_string();
    // calamine folds open failures into its per-format errors
    File::open(path).map_err(|source| LoadError::Io {
        path: path_str.clone(),
        source,
    })?;
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Workbook {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    let names = workbook.sheet_names();
    let sheet = match &opts.sheet {
        Some(wanted) => {
            if !names.iter().any(|n| n == wanted) {
                return Err(LoadError::SheetNotFound {
                    path: path_str,
                    sheet: wanted.clone(),
                    available: names.join(", "),
                });
            }
            wanted.clone()
        }
        None => match names.first() {
            Some(first) => first.clone(),
            None => return Err(LoadError::NoSheets { path: path_str }),
        },
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| LoadError::Workbook {
            path: path_str.clone(),
            reason: format!("sheet '{}': {}", sheet, e),
        })?;

    // The used range may start below row 0; skip_rows counts from the top of the sheet.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let skip = opts.skip_rows.saturating_sub(first_row);

    let rows = range
        .rows()
        .skip(skip)
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    log::debug!("{}: reading sheet '{}' (skip {} rows)", path_str, sheet, opts.skip_rows);
    Ok(assemble(file_label(path), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn cell_rendering() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(cell_text(&Data::String("RTX 4060".into())).as_deref(), Some("RTX 4060"));
        assert_eq!(cell_text(&Data::Float(14.0)).as_deref(), Some("14"));
        assert_eq!(cell_text(&Data::Float(15.6)).as_deref(), Some("15.6"));
        assert_eq!(cell_text(&Data::Int(2560)).as_deref(), Some("2560"));
        assert_eq!(cell_text(&Data::Bool(true)).as_deref(), Some("true"));
    }

    fn write_sample(path: &Path) {
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name("Cover").unwrap();
        ws.write_string(0, 0, "nothing here").unwrap();

        let ws = wb.add_worksheet();
        ws.set_name("Notebook PC spec data").unwrap();
        ws.write_string(0, 0, "Mobile PC Specifications").unwrap();
        ws.write_string(2, 0, "Region").unwrap();
        ws.write_string(2, 1, "Brand").unwrap();
        ws.write_string(2, 2, "Screen").unwrap();
        ws.write_string(3, 0, "EMEA").unwrap();
        ws.write_string(3, 1, "Acer").unwrap();
        ws.write_number(3, 2, 14.0).unwrap();
        ws.write_string(5, 0, "APAC").unwrap();
        wb.save(path).unwrap();
    }

    #[test]
    fn reads_named_sheet_after_skipped_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specs.xlsx");
        write_sample(&path);

        let opts = LoadOptions {
            sheet: Some("Notebook PC spec data".into()),
            skip_rows: 2,
        };
        let ds = read_workbook(&path, &opts).unwrap();
        assert_eq!(ds.label, "specs.xlsx");
        assert_eq!(ds.columns, vec!["Region", "Brand", "Screen"]);
        // the blank row 4 is dropped
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(0, "Screen"), Some("14"));
        assert_eq!(ds.get(1, "Region"), Some("APAC"));
        assert_eq!(ds.get(1, "Brand"), None);
    }

    #[test]
    fn blank_rows_after_skip_do_not_become_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specs.xlsx");
        write_sample(&path);

        // row 1 is blank; the header is on row 2
        let opts = LoadOptions {
            sheet: Some("Notebook PC spec data".into()),
            skip_rows: 1,
        };
        let ds = read_workbook(&path, &opts).unwrap();
        assert_eq!(ds.columns, vec!["Region", "Brand", "Screen"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(0, "Brand"), Some("Acer"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_workbook(&dir.path().join("absent.xlsx"), &LoadOptions::default());
        assert!(matches!(err, Err(LoadError::Io { .. })));
    }

    #[test]
    fn first_sheet_is_the_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specs.xlsx");
        write_sample(&path);
        let ds = read_workbook(&path, &LoadOptions::default()).unwrap();
        assert_eq!(ds.columns, vec!["nothing here"]);
        assert!(ds.is_empty());
    }

    #[test]
    fn unknown_sheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("specs.xlsx");
        write_sample(&path);
        let opts = LoadOptions {
            sheet: Some("Missing".into()),
            skip_rows: 0,
        };
        match read_workbook(&path, &opts) {
            Err(LoadError::SheetNotFound { available, .. }) => {
                assert!(available.contains("Cover"));
            }
            other => panic!("unexpected: {:?}", other.map(|d| d.len())),
        }
    }
}
