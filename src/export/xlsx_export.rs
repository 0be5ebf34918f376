use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use super::ensure_parent_dir;
use crate::error::ExportError;
use crate::models::Record;

/// Excel worksheet row limit, header included.
pub const XLSX_MAX_ROWS: usize = 1_048_576;

#[derive(Debug, Clone)]
pub struct SummaryContext {
    pub master_label: String,
    pub candidate_label: String,

    pub total_master: usize,
    pub total_candidate: usize,

    pub new_rows: usize,
    pub duplicate_rows: usize,

    // New rows broken down by the stage that decided them
    pub new_no_group: usize,
    pub new_no_model: usize,
    pub new_variant: usize,
    pub blank_spec_duplicates: usize,

    pub columns_only_in_master: usize,
    pub columns_only_in_candidate: usize,

    pub strategy: String,
    pub parallel: bool,

    // Timing
    pub load_time: Duration,
    pub match_time: Duration,
    pub export_time: Duration,

    // Run window (UTC)
    pub started_utc: DateTime<Utc>,
    pub ended_utc: DateTime<Utc>,
    pub duration_secs: f64,
}

impl SummaryContext {
    /// Ordered key/value rows shared by the CSV and XLSX summaries.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let secs = |d: Duration| format!("{:.3}", d.as_secs_f64());
        vec![
            ("Master dataset", self.master_label.clone()),
            ("Candidate dataset", self.candidate_label.clone()),
            ("Master rows", self.total_master.to_string()),
            ("Candidate rows processed", self.total_candidate.to_string()),
            ("New rows", self.new_rows.to_string()),
            ("Duplicate rows", self.duplicate_rows.to_string()),
            ("New: no region/country/brand match", self.new_no_group.to_string()),
            ("New: no model match", self.new_no_model.to_string()),
            ("New: CPU/GPU/resolution variant", self.new_variant.to_string()),
            (
                "Duplicates matched on blank CPU/GPU/resolution",
                self.blank_spec_duplicates.to_string(),
            ),
            (
                "Columns only in master",
                self.columns_only_in_master.to_string(),
            ),
            (
                "Columns only in candidate",
                self.columns_only_in_candidate.to_string(),
            ),
            ("Strategy", self.strategy.clone()),
            ("Parallel", self.parallel.to_string()),
            ("Load time (s)", secs(self.load_time)),
            ("Match time (s)", secs(self.match_time)),
            ("Export time (s)", secs(self.export_time)),
            ("Started (UTC)", self.started_utc.to_rfc3339()),
            ("Ended (UTC)", self.ended_utc.to_rfc3339()),
            ("Duration (s)", format!("{:.3}", self.duration_secs)),
        ]
    }
}

fn header_format() -> Format {
    Format::new().set_bold().set_align(FormatAlign::Center)
}

fn row_format_even() -> Format {
    Format::new().set_background_color(Color::RGB(0xF2F2F2))
}

fn col_num(c: usize) -> Result<u16, ExportError> {
    u16::try_from(c)
        .map_err(|_| ExportError::Xlsx(format!("column {} exceeds the worksheet column limit", c)))
}

/// Numeric form of a cell value, when it reads back as the same number.
/// Leading zeros, signs and exponents stay text ("00123", "+1", "1e3").
fn numeric_cell(v: &str) -> Option<f64> {
    let digits = v.strip_prefix('-').unwrap_or(v);
    let first = digits.chars().next()?;
    if !first.is_ascii_digit() || !digits.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return None;
    }
    if digits.ends_with('.') || (digits.len() > 1 && first == '0' && !digits.starts_with("0.")) {
        return None;
    }
    v.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn write_headers(ws: &mut Worksheet, columns: &[String]) -> Result<(), ExportError> {
    let hfmt = header_format();
    for (c, h) in columns.iter().enumerate() {
        ws.write_string_with_format(0, col_num(c)?, h, &hfmt)?;
    }
    Ok(())
}

/// One sheet: header row, then each record's original values. Absent cells stay empty.
pub fn export_records_xlsx(
    path: &str,
    sheet_name: &str,
    columns: &[String],
    records: &[&Record],
) -> Result<(), ExportError> {
    if records.len() + 1 > XLSX_MAX_ROWS {
        return Err(ExportError::Xlsx(format!(
            "{} rows exceed the worksheet limit of {}",
            records.len(),
            XLSX_MAX_ROWS - 1
        )));
    }
    ensure_parent_dir(path)?;
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(sheet_name)?;
    write_headers(ws, columns)?;

    let even = row_format_even();
    for (i, rec) in records.iter().enumerate() {
        let r = (i + 1) as u32;
        if i % 2 == 0 {
            ws.set_row_format(r, &even)?;
        }
        for (c, _) in columns.iter().enumerate() {
            let Some(v) = rec.value(c) else { continue };
            let col = col_num(c)?;
            match numeric_cell(v) {
                Some(n) => ws.write_number(r, col, n)?,
                None => ws.write_string(r, col, v)?,
            };
        }
    }
    wb.save(path)?;
    Ok(())
}

fn write_summary_sheet(ws: &mut Worksheet, ctx: &SummaryContext) -> Result<(), ExportError> {
    let hfmt = header_format();
    let mut row: u32 = 0;

    ws.write_string_with_format(row, 0, "Summary", &hfmt)?;
    row += 2;

    for (k, v) in ctx.rows() {
        ws.write_string(row, 0, k)?;
        ws.write_string(row, 1, &v)?;
        row += 1;
    }
    ws.set_column_width(0, 48)?;
    ws.set_column_width(1, 32)?;
    Ok(())
}

pub fn export_summary_xlsx(path: &str, ctx: &SummaryContext) -> Result<(), ExportError> {
    ensure_parent_dir(path)?;
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Summary")?;
    write_summary_sheet(ws, ctx)?;
    wb.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::LoadOptions;
    use crate::source::workbook_source::read_workbook;

    fn sample_summary() -> SummaryContext {
        let now = Utc::now();
        SummaryContext {
            master_label: "3Q25.xlsb".into(),
            candidate_label: "4Q25.xlsb".into(),
            total_master: 10,
            total_candidate: 4,
            new_rows: 3,
            duplicate_rows: 1,
            new_no_group: 1,
            new_no_model: 1,
            new_variant: 1,
            blank_spec_duplicates: 0,
            columns_only_in_master: 1,
            columns_only_in_candidate: 1,
            strategy: "indexed".into(),
            parallel: true,
            load_time: Duration::from_millis(5),
            match_time: Duration::from_millis(1),
            export_time: Duration::ZERO,
            started_utc: now,
            ended_utc: now,
            duration_secs: 0.0,
        }
    }

    #[test]
    fn write_records_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("new_rows_to_add.xlsx");
        let out = out.to_str().unwrap();

        let columns = vec!["Brand".to_string(), "Model Name".to_string(), "Price".to_string()];
        let a = Record::new(vec![Some("Acer".into()), Some("Aspire 5".into()), None]);
        let b = Record::new(vec![Some("Dell".into()), None, Some("899".into())]);
        export_records_xlsx(out, "Sheet1", &columns, &[&a, &b]).unwrap();

        let ds = read_workbook(std::path::Path::new(out), &LoadOptions::default()).unwrap();
        assert_eq!(ds.columns, columns);
        assert_eq!(ds.records, vec![a, b]);
    }

    #[test]
    fn numeric_values_stay_numeric() {
        assert_eq!(numeric_cell("899"), Some(899.0));
        assert_eq!(numeric_cell("15.6"), Some(15.6));
        assert_eq!(numeric_cell("-2"), Some(-2.0));
        assert_eq!(numeric_cell("0.5"), Some(0.5));
        assert_eq!(numeric_cell("0"), Some(0.0));
        assert_eq!(numeric_cell("00123"), None);
        assert_eq!(numeric_cell("1920x1080"), None);
        assert_eq!(numeric_cell("1e3"), None);
        assert_eq!(numeric_cell("+1"), None);
        assert_eq!(numeric_cell("1.2.3"), None);
        assert_eq!(numeric_cell("5."), None);
        assert_eq!(numeric_cell(""), None);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("typed.xlsx");
        let columns = vec!["Price".to_string(), "SKU".to_string(), "Screen".to_string()];
        let rec = Record::new(vec![
            Some("899".into()),
            Some("00123".into()),
            Some("15.6".into()),
        ]);
        export_records_xlsx(out.to_str().unwrap(), "Sheet1", &columns, &[&rec]).unwrap();

        use calamine::{Data, Reader, open_workbook_auto};
        let mut wb = open_workbook_auto(&out).unwrap();
        let range = wb.worksheet_range("Sheet1").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(899.0)));
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("00123".into())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(15.6)));
    }

    #[test]
    fn column_index_beyond_u16_is_an_error() {
        assert_eq!(col_num(65_535).unwrap(), u16::MAX);
        assert!(matches!(col_num(65_536), Err(ExportError::Xlsx(_))));
    }

    #[test]
    fn header_only_when_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dups.xlsx");
        let out = out.to_str().unwrap();
        export_records_xlsx(out, "Sheet1", &["Brand".to_string()], &[]).unwrap();
        let ds = read_workbook(std::path::Path::new(out), &LoadOptions::default()).unwrap();
        assert_eq!(ds.columns, vec!["Brand"]);
        assert!(ds.is_empty());
    }

    #[test]
    fn write_summary_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.xlsx");
        export_summary_xlsx(out.to_str().unwrap(), &sample_summary()).unwrap();
        assert!(out.exists());
    }
}
