use crate::grading::round_2_decimals;
use crate::records::{AttendanceBook, Student};
use chrono::NaiveDate;
use serde::Serialize;

pub const PRESENT: &str = "Present";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub total_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub percentage: f64,
    pub history: Vec<HistoryEntry>,
}

/// Folds every recorded date for one student, in document order. Only the
/// exact status `"Present"` counts as present; anything else counts as absent.
pub fn summarize(book: &AttendanceBook, student_id: i64) -> AttendanceSummary {
    let key = student_id.to_string();
    let mut total_days = 0u32;
    let mut present_days = 0u32;
    let mut history = Vec::new();

    for (date, statuses) in book {
        let Some(status) = statuses.get(&key) else {
            continue;
        };
        total_days += 1;
        if status == PRESENT {
            present_days += 1;
        }
        history.push(HistoryEntry {
            date: date.clone(),
            status: status.clone(),
        });
    }

    let percentage = if total_days > 0 {
        round_2_decimals(f64::from(present_days) * 100.0 / f64::from(total_days))
    } else {
        0.0
    };

    AttendanceSummary {
        total_days,
        present_days,
        absent_days: total_days - present_days,
        percentage,
        history,
    }
}

/// `None` when the id does not name a known student.
pub fn student_attendance<'a>(
    students: &'a [Student],
    book: &AttendanceBook,
    student_id: i64,
) -> Option<(&'a Student, AttendanceSummary)> {
    let student = students.iter().find(|s| s.id == student_id)?;
    Some((student, summarize(book, student_id)))
}

/// Records statuses for `date`. Only students in `roster` are written, and a
/// blank status leaves any earlier entry for that student untouched. Returns
/// how many entries were written.
pub fn mark_day<'a, F>(
    book: &mut AttendanceBook,
    date: &str,
    roster: impl IntoIterator<Item = &'a Student>,
    mut status_for: F,
) -> usize
where
    F: FnMut(&str) -> Option<String>,
{
    let day = book.entry(date.to_string()).or_default();
    let mut written = 0usize;
    for s in roster {
        let key = s.id.to_string();
        let Some(status) = status_for(&key) else {
            continue;
        };
        if status.is_empty() {
            continue;
        }
        day.insert(key, status);
        written += 1;
    }
    written
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
