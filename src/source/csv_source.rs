use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::ReaderBuilder;

use super::{LoadOptions, assemble, file_label};
use crate::error::LoadError;
use crate::models::Dataset;

pub fn read_csv(path: &Path, opts: &LoadOptions) -> Result<Dataset, LoadError> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path_str.clone(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for rec in rdr.records().skip(opts.skip_rows) {
        let rec = rec.map_err(|source| LoadError::Csv {
            path: path_str.clone(),
            source,
        })?;
        rows.push(
            rec.iter()
                .map(|v| {
                    if v.is_empty() {
                        None
                    } else {
                        Some(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(assemble(file_label(path), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_header_and_rows() {
        let f = write_tmp("Region,Brand,Model Name\nEMEA,Acer,Aspire 5\nEMEA,,\"Swift, 3\"\n");
        let ds = read_csv(f.path(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.columns, vec!["Region", "Brand", "Model Name"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1, "Brand"), None);
        assert_eq!(ds.get(1, "Model Name"), Some("Swift, 3"));
    }

    #[test]
    fn skips_leading_rows_and_pads_short_rows() {
        let f = write_tmp("Title row\nnotes,,\nsubtitle\nRegion,Brand\nAPAC\n");
        let opts = LoadOptions {
            sheet: None,
            skip_rows: 3,
        };
        let ds = read_csv(f.path(), &opts).unwrap();
        assert_eq!(ds.columns, vec!["Region", "Brand"]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0, "Region"), Some("APAC"));
        assert_eq!(ds.records[0].values.len(), 2);
    }

    #[test]
    fn comma_only_rows_before_header_are_skipped() {
        let f = write_tmp("Notebook PC spec data\n,,\n,,\nRegion,Brand\n,,\nEMEA,Dell\n");
        let opts = LoadOptions {
            sheet: None,
            skip_rows: 1,
        };
        let ds = read_csv(f.path(), &opts).unwrap();
        assert_eq!(ds.columns, vec!["Region", "Brand"]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0, "Brand"), Some("Dell"));
    }

    #[test]
    fn empty_file_gives_empty_dataset() {
        let f = write_tmp("");
        let ds = read_csv(f.path(), &LoadOptions::default()).unwrap();
        assert!(ds.columns.is_empty());
        assert!(ds.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_csv(Path::new("/nonexistent/dir/x.csv"), &LoadOptions::default());
        assert!(matches!(err, Err(LoadError::Io { .. })));
    }
}
