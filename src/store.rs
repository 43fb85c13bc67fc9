use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::calc;
use crate::marksfile;

/// One student row. The four raw inputs come from the marks file; the rest
/// is recomputed from them on every load, insert, and update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub code: String,
    pub name: String,
    pub coursework: [i64; 3],
    pub exam: i64,
    pub coursework_total: i64,
    pub overall_total: i64,
    pub percentage: f64,
    pub grade: &'static str,
}

impl StudentRecord {
    pub fn new(code: String, name: String, coursework: [i64; 3], exam: i64) -> Self {
        let d = calc::derive_marks(coursework, exam);
        Self {
            code,
            name,
            coursework,
            exam,
            coursework_total: d.coursework_total,
            overall_total: d.overall_total,
            percentage: d.percentage,
            grade: d.grade,
        }
    }

    fn rederive(&mut self) {
        let d = calc::derive_marks(self.coursework, self.exam);
        self.coursework_total = d.coursework_total;
        self.overall_total = d.overall_total;
        self.percentage = d.percentage;
        self.grade = d.grade;
    }
}

/// Store-level rejection signal. Everything here is a no-op with an
/// explanation; nothing aborts the process.
#[derive(Debug, Clone, Serialize)]
pub struct StoreError {
    pub code: String,
    pub message: String,
}

impl StoreError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAggregate {
    pub max: StudentRecord,
    pub min: StudentRecord,
    pub average_percentage: f64,
}

/// Answers the pre-delete confirmation question. The store never talks to
/// the UI itself; it only requires an answer before a record goes away.
pub trait ConfirmDelete {
    fn confirm_delete(&mut self, record: &StudentRecord) -> bool;
}

pub enum DeleteOutcome {
    Deleted(StudentRecord),
    Cancelled(StudentRecord),
}

/// The record store: owns its file path and the in-memory rows. No ambient
/// globals; callers hold one of these and pass it into every operation.
pub struct RecordStore {
    path: PathBuf,
    records: Vec<StudentRecord>,
    file_missing: bool,
}

impl RecordStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let loaded = marksfile::load_marks_file(&path)?;
        Ok(Self {
            path,
            records: loaded.records,
            file_missing: loaded.file_missing,
        })
    }

    /// Re-read the full record set from the file, dropping whatever was in
    /// memory. Every IPC operation does this first so no session state
    /// survives between operations.
    pub fn reload(&mut self) -> anyhow::Result<()> {
        let loaded = marksfile::load_marks_file(&self.path)?;
        self.records = loaded.records;
        self.file_missing = loaded.file_missing;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn file_missing(&self) -> bool {
        self.file_missing
    }

    /// Key match rule shared by get/update/delete: case-insensitive exact
    /// match on `code`, or case-insensitive substring match within `name`.
    /// First match in store order wins; ties are not disambiguated (known
    /// limitation, kept for output compatibility).
    pub fn find_index(&self, key: &str) -> Option<usize> {
        let needle = key.to_lowercase();
        self.records.iter().position(|r| {
            r.code.to_lowercase() == needle || r.name.to_lowercase().contains(&needle)
        })
    }

    pub fn find_by_key(&self, key: &str) -> Option<&StudentRecord> {
        self.find_index(key).map(|i| &self.records[i])
    }

    /// Highest/lowest scorer and mean percentage. `None` on an empty store:
    /// max/min are undefined and the average must not be computed.
    pub fn aggregate(&self) -> Option<StoreAggregate> {
        let first = self.records.first()?;
        let mut max = first;
        let mut min = first;
        let mut sum = 0.0;
        for r in &self.records {
            // Strict comparisons keep the first record on ties.
            if r.percentage > max.percentage {
                max = r;
            }
            if r.percentage < min.percentage {
                min = r;
            }
            sum += r.percentage;
        }
        Some(StoreAggregate {
            max: max.clone(),
            min: min.clone(),
            average_percentage: sum / self.records.len() as f64,
        })
    }

    /// Stable sort by percentage. Descending is the reverse of the stably
    /// ascending order, not a descending comparator, so equal percentages
    /// flip their relative order on descent exactly as the original did.
    pub fn sorted_by_percentage(&self, ascending: bool) -> Vec<StudentRecord> {
        let mut out = self.records.clone();
        out.sort_by(|a, b| {
            a.percentage
                .partial_cmp(&b.percentage)
                .unwrap_or(Ordering::Equal)
        });
        if !ascending {
            out.reverse();
        }
        out
    }

    /// Append a new record and persist. The duplicate check is
    /// case-SENSITIVE even though search is case-insensitive; that mismatch
    /// is a documented quirk of the format's original keeper, preserved
    /// deliberately.
    pub fn insert(
        &mut self,
        code: String,
        name: String,
        coursework: [i64; 3],
        exam: i64,
    ) -> Result<StudentRecord, StoreError> {
        for (i, v) in coursework.iter().enumerate() {
            if !calc::coursework_mark_in_range(*v) {
                return Err(StoreError::new(
                    "invalid_input",
                    format!(
                        "c{} must be between 0 and {}",
                        i + 1,
                        calc::COURSEWORK_MARK_MAX
                    ),
                ));
            }
        }
        if !calc::exam_mark_in_range(exam) {
            return Err(StoreError::new(
                "invalid_input",
                format!("exam must be between 0 and {}", calc::EXAM_MARK_MAX),
            ));
        }
        if self.records.iter().any(|r| r.code == code) {
            return Err(StoreError::new(
                "duplicate_code",
                format!("a record with code {} already exists", code),
            ));
        }

        let rec = StudentRecord::new(code, name, coursework, exam);
        self.records.push(rec.clone());
        self.persist()?;
        Ok(rec)
    }

    /// Change one field of the first record matching `key`, re-derive, and
    /// persist the whole store. Numeric fields are re-validated against the
    /// entry-time ranges; a rejected value leaves the record untouched.
    pub fn update(
        &mut self,
        key: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<StudentRecord, StoreError> {
        let Some(idx) = self.find_index(key) else {
            return Err(StoreError::new(
                "not_found",
                format!("no record matches {}", key),
            ));
        };

        match field {
            "name" => {
                let Some(v) = value.as_str() else {
                    return Err(StoreError::new("invalid_input", "name must be text"));
                };
                self.records[idx].name = v.to_string();
            }
            "c1" | "c2" | "c3" => {
                let Some(v) = integer_value(value) else {
                    return Err(StoreError::new(
                        "invalid_input",
                        format!("{} must be an integer", field),
                    ));
                };
                if !calc::coursework_mark_in_range(v) {
                    return Err(StoreError::new(
                        "invalid_input",
                        format!(
                            "{} must be between 0 and {}",
                            field,
                            calc::COURSEWORK_MARK_MAX
                        ),
                    ));
                }
                let slot = match field {
                    "c1" => 0,
                    "c2" => 1,
                    _ => 2,
                };
                self.records[idx].coursework[slot] = v;
            }
            "exam" => {
                let Some(v) = integer_value(value) else {
                    return Err(StoreError::new("invalid_input", "exam must be an integer"));
                };
                if !calc::exam_mark_in_range(v) {
                    return Err(StoreError::new(
                        "invalid_input",
                        format!("exam must be between 0 and {}", calc::EXAM_MARK_MAX),
                    ));
                }
                self.records[idx].exam = v;
            }
            _ => {
                return Err(StoreError::new(
                    "invalid_field",
                    format!("unknown field: {}", field),
                ));
            }
        }

        self.records[idx].rederive();
        self.persist()?;
        Ok(self.records[idx].clone())
    }

    /// Remove the first record matching `key`, but only once the caller's
    /// confirmation seam says yes. A declined confirmation is a clean
    /// cancel: nothing mutates, nothing persists.
    pub fn delete(
        &mut self,
        key: &str,
        confirm: &mut dyn ConfirmDelete,
    ) -> Result<DeleteOutcome, StoreError> {
        let Some(idx) = self.find_index(key) else {
            return Err(StoreError::new(
                "not_found",
                format!("no record matches {}", key),
            ));
        };

        let pending = self.records[idx].clone();
        if !confirm.confirm_delete(&pending) {
            return Ok(DeleteOutcome::Cancelled(pending));
        }

        self.records.remove(idx);
        self.persist()?;
        Ok(DeleteOutcome::Deleted(pending))
    }

    fn persist(&self) -> Result<(), StoreError> {
        // A failed write is fatal to this operation only: report, don't retry.
        marksfile::write_marks_file(&self.path, &self.records)
            .map_err(|e| StoreError::new("store_write_failed", e.to_string()))
    }
}

/// Accept a JSON integer or a numeric string (the front-end's prompt
/// returns text). Anything else is invalid input.
fn integer_value(value: &serde_json::Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    value.as_str().and_then(|s| s.trim().parse::<i64>().ok())
}
