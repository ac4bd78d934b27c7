//! Reading CSV files from disk before handing them to the parser.

use std::fs;
use std::path::Path;

use log::info;

use crate::error::WatchlistError;
use crate::parser::{MAX_CSV_BYTES, ParseResult, parse_csv, validate_file_content};
use crate::result::Result;

/// Read, validate and parse the CSV file at `path`.
///
/// Files over 1 MiB are refused before being read. Validation problems are
/// returned as `InvalidFile`; row-level problems end up in the `ParseResult`.
pub fn read_csv_file(path: &Path) -> Result<ParseResult> {
    let size = fs::metadata(path)?.len();
    if size > MAX_CSV_BYTES as u64 {
        return Err(WatchlistError::InvalidFile(vec![
            "File is too large. Maximum size is 1MB".to_string(),
        ]));
    }

    let content = String::from_utf8(fs::read(path)?)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let problems = validate_file_content(&content, &filename);
    if !problems.is_empty() {
        return Err(WatchlistError::InvalidFile(problems));
    }

    let result = parse_csv(&content);
    info!(
        "Parsed {}: {} symbols, {} errors",
        path.display(),
        result.success_count,
        result.error_count
    );
    Ok(result)
}

/// List name derived from a file name: `momentum.csv` becomes `momentum`.
pub fn suggested_list_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem_len = name.len().saturating_sub(4);
    match name.get(stem_len..) {
        Some(ext) if ext.eq_ignore_ascii_case(".csv") => name[..stem_len].to_string(),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Breakouts.CSV");
        fs::write(&path, "Symbol,Name\nTCS,Tata\n").unwrap();

        let result = read_csv_file(&path).unwrap();
        assert_eq!(result.success_count, 1);
        assert_eq!(suggested_list_name(&path), "Breakouts");
    }

    #[test]
    fn refuses_wrong_extension_and_bad_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("list.txt");
        fs::write(&txt, "Symbol\nTCS\n").unwrap();
        assert!(matches!(
            read_csv_file(&txt),
            Err(WatchlistError::InvalidFile(problems)) if problems.len() == 1
        ));

        let binary = dir.path().join("list.csv");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_csv_file(&binary), Err(WatchlistError::Utf8(_))));

        assert!(matches!(
            read_csv_file(&dir.path().join("missing.csv")),
            Err(WatchlistError::Io(_))
        ));
    }

    #[test]
    fn keeps_names_without_extension() {
        assert_eq!(suggested_list_name(Path::new("/tmp/watch")), "watch");
    }
}
