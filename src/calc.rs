use serde::Serialize;

pub const COURSEWORK_MARK_MAX: i64 = 20;
pub const EXAM_MARK_MAX: i64 = 100;

/// Everything a record is marked out of: three coursework pieces plus the exam.
pub const OVERALL_OUT_OF: f64 = 160.0;

/// Letter grade for an overall percentage. Inclusive lower bounds.
pub fn grade_for(percent: f64) -> &'static str {
    if percent >= 70.0 {
        "A"
    } else if percent >= 60.0 {
        "B"
    } else if percent >= 50.0 {
        "C"
    } else if percent >= 40.0 {
        "D"
    } else {
        "F"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMarks {
    pub coursework_total: i64,
    pub overall_total: i64,
    pub percentage: f64,
    pub grade: &'static str,
}

/// Recompute the derived fields from the four raw inputs. These are never
/// persisted; they exist only as a function of the marks.
pub fn derive_marks(coursework: [i64; 3], exam: i64) -> DerivedMarks {
    let coursework_total = coursework.iter().sum::<i64>();
    let overall_total = coursework_total + exam;
    let percentage = (overall_total as f64) / OVERALL_OUT_OF * 100.0;
    DerivedMarks {
        coursework_total,
        overall_total,
        percentage,
        grade: grade_for(percentage),
    }
}

pub fn coursework_mark_in_range(v: i64) -> bool {
    (0..=COURSEWORK_MARK_MAX).contains(&v)
}

pub fn exam_mark_in_range(v: i64) -> bool {
    (0..=EXAM_MARK_MAX).contains(&v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_thresholds_at_boundaries() {
        assert_eq!(grade_for(39.99), "F");
        assert_eq!(grade_for(40.0), "D");
        assert_eq!(grade_for(49.99), "D");
        assert_eq!(grade_for(50.0), "C");
        assert_eq!(grade_for(59.99), "C");
        assert_eq!(grade_for(60.0), "B");
        assert_eq!(grade_for(69.99), "B");
        assert_eq!(grade_for(70.0), "A");
        assert_eq!(grade_for(100.0), "A");
        assert_eq!(grade_for(0.0), "F");
    }

    #[test]
    fn derive_marks_example() {
        // (18+19+17 + 80) / 160 * 100 = 83.75
        let d = derive_marks([18, 19, 17], 80);
        assert_eq!(d.coursework_total, 54);
        assert_eq!(d.overall_total, 134);
        assert!((d.percentage - 83.75).abs() < 1e-9);
        assert_eq!(d.grade, "A");
    }

    #[test]
    fn derive_marks_after_exam_drop() {
        // (54 + 30) / 160 * 100 = 52.5
        let d = derive_marks([18, 19, 17], 30);
        assert!((d.percentage - 52.5).abs() < 1e-9);
        assert_eq!(d.grade, "C");
    }

    #[test]
    fn mark_ranges() {
        assert!(coursework_mark_in_range(0));
        assert!(coursework_mark_in_range(20));
        assert!(!coursework_mark_in_range(21));
        assert!(!coursework_mark_in_range(-1));
        assert!(exam_mark_in_range(100));
        assert!(!exam_mark_in_range(101));
    }
}
