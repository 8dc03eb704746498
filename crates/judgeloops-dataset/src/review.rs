//! The semicolon-separated sheet humans fill in to label generated answers.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use judgeloops_judge::Verdict;
use tracing::warn;

use crate::{DatasetError, GeneratedCase, HumanLabeledRow, SkippedRecord};

pub const REVIEW_HEADER: [&str; 5] = [
    "ID",
    "Reference_Answer",
    "System_Answer",
    "Human_Label_Correct (1/0)",
    "Human_Notes",
];

const DELIMITER: u8 = b';';

/// Parsed review sheet
#[derive(Debug, Clone, Default)]
pub struct ReviewSheet {
    /// Rows with a usable "1"/"0" label
    pub rows: Vec<HumanLabeledRow>,
    /// Rows whose label column is still empty
    pub unlabeled: usize,
    /// Rows that are too short or carry an unrecognised label
    pub skipped: Vec<SkippedRecord>,
}

/// Write an unlabeled review sheet for the given cases
pub fn write_review_template<W: Write>(
    writer: W,
    cases: &[GeneratedCase],
) -> Result<usize, DatasetError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);

    csv_writer.write_record(REVIEW_HEADER)?;
    for case in cases {
        csv_writer.write_record([
            case.id(),
            case.reference(),
            case.system_answer.as_str(),
            "",
            "",
        ])?;
    }
    csv_writer.flush()?;

    Ok(cases.len())
}

/// Create the review sheet file at `path`
pub fn export_review_template(
    path: &Path,
    cases: &[GeneratedCase],
) -> Result<usize, DatasetError> {
    let file = File::create(path).map_err(|source| DatasetError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_review_template(file, cases)
}

/// Read a filled-in review sheet. The header row is always skipped.
pub fn read_review<R: Read>(reader: R) -> Result<ReviewSheet, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut sheet = ReviewSheet::default();

    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                skip(&mut sheet, line, e.to_string());
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < 4 {
            skip(
                &mut sheet,
                line,
                format!("expected at least 4 columns, found {}", record.len()),
            );
            continue;
        }

        let raw_label = record[3].trim();
        if raw_label.is_empty() {
            sheet.unlabeled += 1;
            continue;
        }

        let Some(human_label) = Verdict::from_label(raw_label) else {
            skip(&mut sheet, line, format!("unrecognised label {:?}", raw_label));
            continue;
        };

        let notes = record
            .get(4)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        sheet.rows.push(HumanLabeledRow {
            id: record[0].to_string(),
            reference: record[1].to_string(),
            system_answer: record[2].to_string(),
            human_label,
            notes,
        });
    }

    Ok(sheet)
}

/// Open and read the review sheet at `path`
pub fn load_review(path: &Path) -> Result<ReviewSheet, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_review(file)
}

fn skip(sheet: &mut ReviewSheet, line: u64, reason: String) {
    warn!(line, reason = %reason, "Skipping review row");
    sheet.skipped.push(SkippedRecord { line, reason });
}
