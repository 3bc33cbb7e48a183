use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use vt_core::row::{COLUMNS, DatasetRow};

/// Write `rows` as CSV to `path`, creating the parent directory if needed.
///
/// The header is always written, so an empty dataset still yields a valid
/// table. Floats use the shortest representation that reads back exactly;
/// undefined formants are written as `NaN`.
///
/// # Errors
/// Returns an error if the directory or file cannot be created or written.
///
/// # Example
/// ```no_run
/// use vt_export::write_table;
/// write_table("out/formants.csv", &[]).unwrap();
/// ```
pub fn write_table(path: impl AsRef<Path>, rows: &[DatasetRow]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create output directory: {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Cannot create output file: {}", path.display()))?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Cannot write output file: {}", path.display()))?;

    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a table written by [`write_table`].
///
/// # Errors
/// Returns an error if the file cannot be read or a row does not match the
/// column layout.
pub fn read_table(path: impl AsRef<Path>) -> Result<Vec<DatasetRow>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open table: {}", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<DatasetRow>, _>>()
        .with_context(|| format!("Malformed table: {}", path.display()))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vt_core::row::WORD_NOT_FOUND;

    fn row(time: f64, f1: f64, word: &str) -> DatasetRow {
        DatasetRow {
            file_id: "S001_reading".into(),
            vowel: "o".into(),
            token_start: 0.19,
            time,
            offset: time - 0.19,
            f1,
            f2: 1180.5,
            participant: "S001".into(),
            task: "reading".into(),
            word: word.into(),
        }
    }

    #[test]
    fn header_and_rows_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formants.csv");
        write_table(&path, &[row(0.195, 412.25, "no")]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Filename,Vowel,Start,Time,Offset,F1,F2,Participant,Task,Word")
        );
        let fields: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(fields[0], "S001_reading");
        assert_eq!(fields[1], "o");
        assert_eq!(fields[2], "0.19");
        assert_eq!(fields[3], "0.195");
        assert_eq!(fields[5], "412.25");
        assert_eq!(&fields[7..], ["S001", "reading", "no"]);
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_dataset_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/empty.csv");
        write_table(&path, &[]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(read_table(&path).unwrap().is_empty());
    }

    #[test]
    fn rows_read_back_including_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formants.csv");
        let rows = vec![row(0.195, f64::NAN, WORD_NOT_FOUND), row(0.2, 431.0, "no")];
        write_table(&path, &rows).unwrap();

        assert!(fs::read_to_string(&path).unwrap().contains(",NaN,"));
        let back = read_table(&path).unwrap();
        assert_eq!(back.len(), 2);
        for (a, b) in rows.iter().zip(&back) {
            assert!(a.approx_eq(b, 0.0), "{a:?} != {b:?}");
        }
    }

    #[test]
    fn labels_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formants.csv");
        write_table(&path, &[row(0.2, 400.0, "yes, no")]).unwrap();
        assert_eq!(read_table(&path).unwrap()[0].word, "yes, no");
    }
}
