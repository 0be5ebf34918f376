use std::fs::File;
use std::io::BufWriter;

use csv::{Writer, WriterBuilder};

use super::ensure_parent_dir;
use super::xlsx_export::SummaryContext;
use crate::error::ExportError;
use crate::models::Record;

fn open_writer(path: &str) -> Result<Writer<BufWriter<File>>, ExportError> {
    ensure_parent_dir(path)?;
    let file = File::create(path)?;
    let buf_writer = BufWriter::with_capacity(512 * 1024, file);
    Ok(WriterBuilder::new().from_writer(buf_writer))
}

/// Header row, then each record's original values; absent values are written empty.
pub fn export_records_csv(
    path: &str,
    columns: &[String],
    records: &[&Record],
) -> Result<(), ExportError> {
    let mut w = open_writer(path)?;
    w.write_record(columns)?;
    for rec in records {
        let row: Vec<&str> = (0..columns.len())
            .map(|i| rec.value(i).unwrap_or(""))
            .collect();
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_summary_csv(path: &str, ctx: &SummaryContext) -> Result<(), ExportError> {
    let mut w = open_writer(path)?;
    w.write_record(["Key", "Value"])?;
    for (k, v) in ctx.rows() {
        w.write_record([k, v.as_str()])?;
    }
    w.flush()?;
    Ok(())
}
