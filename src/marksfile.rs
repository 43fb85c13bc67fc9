use std::path::Path;

use crate::store::StudentRecord;

/// Result of reading a marks file. A missing file is not an error: the store
/// starts empty and the front-end is told so it can show a notice.
pub struct LoadedMarks {
    pub records: Vec<StudentRecord>,
    pub file_missing: bool,
}

/// Parse the line-oriented marks format:
///
/// ```text
/// <record_count>
/// <code>,<name>,<c1>,<c2>,<c3>,<exam>
/// ...
/// ```
///
/// The count line is informational and never checked against the actual
/// number of record lines. Blank lines are skipped. A record line with fewer
/// than 6 comma fields, or whose mark fields fail integer parse, is skipped
/// without being reported. Fields are not quoted or escaped, so a comma
/// inside a name shifts the fields and the line is dropped by the mark
/// parse; that is the format's contract, not something to repair here.
pub fn parse_marks_text(text: &str) -> Vec<StudentRecord> {
    let mut records: Vec<StudentRecord> = Vec::new();
    let mut saw_count_line = false;

    for raw in text.lines() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if !saw_count_line {
            saw_count_line = true;
            continue;
        }
        if let Some(rec) = parse_record_line(line) {
            records.push(rec);
        }
    }

    records
}

fn parse_record_line(line: &str) -> Option<StudentRecord> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 6 {
        return None;
    }

    let code = parts[0].to_string();
    let name = parts[1].to_string();
    let c1 = parts[2].trim().parse::<i64>().ok()?;
    let c2 = parts[3].trim().parse::<i64>().ok()?;
    let c3 = parts[4].trim().parse::<i64>().ok()?;
    let exam = parts[5].trim().parse::<i64>().ok()?;

    // Mark ranges are enforced at entry time only, not re-validated on load.
    Some(StudentRecord::new(code, name, [c1, c2, c3], exam))
}

/// Serialize records back to the durable format: count line first, then one
/// line per record carrying only the four raw inputs. Derived fields are
/// never written.
pub fn serialize_marks(records: &[StudentRecord]) -> String {
    let mut out = String::new();
    out.push_str(&records.len().to_string());
    out.push('\n');
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            r.code, r.name, r.coursework[0], r.coursework[1], r.coursework[2], r.exam
        ));
    }
    out
}

pub fn load_marks_file(path: &Path) -> anyhow::Result<LoadedMarks> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(LoadedMarks {
                records: Vec::new(),
                file_missing: true,
            });
        }
        Err(e) => return Err(e.into()),
    };
    let text = String::from_utf8_lossy(&bytes);
    Ok(LoadedMarks {
        records: parse_marks_text(&text),
        file_missing: false,
    })
}

/// Full overwrite of prior content. No append, no merge, no backup copy.
pub fn write_marks_file(path: &Path, records: &[StudentRecord]) -> anyhow::Result<()> {
    std::fs::write(path, serialize_marks(records))?;
    Ok(())
}
