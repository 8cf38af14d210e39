use std::path::Path;

use crate::model::{EqLevel, Status, Student};

const CSV_HEADERS: [&str; 7] = [
    "รหัสนักเรียน",
    "ชื่อ-นามสกุล",
    "ชั้น",
    "ห้อง",
    "SDQ Status",
    "Risk Status",
    "EQ Level",
];

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Normal => "NORMAL",
        Status::Risk => "RISK",
        Status::Problem => "PROBLEM",
    }
}

fn eq_label(level: EqLevel) -> &'static str {
    match level {
        EqLevel::NeedsImprovement => "ปรับปรุง",
        EqLevel::Normal => "ปกติ",
        EqLevel::High => "สูงกว่าปกติ",
    }
}

/// Renders the 7-column summary table: one header row, one row per student,
/// literal `N/A` where an assessment has not been recorded yet. Prefixed
/// with a UTF-8 BOM so spreadsheet imports pick up the Thai text.
pub fn students_summary_csv(students: &[Student]) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str(&CSV_HEADERS.join(","));
    out.push('\n');
    for s in students {
        let row = [
            s.id.as_str(),
            s.name.as_str(),
            s.grade.as_str(),
            s.room.as_str(),
            s.sdq.as_ref().map(|r| status_label(r.status)).unwrap_or("N/A"),
            s.risk.as_ref().map(|r| status_label(r.status)).unwrap_or("N/A"),
            s.eq.as_ref().map(|r| eq_label(r.level)).unwrap_or("N/A"),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

pub fn write_students_summary_csv(out_path: &Path, students: &[Student]) -> anyhow::Result<()> {
    std::fs::write(out_path, students_summary_csv(students))?;
    Ok(())
}
