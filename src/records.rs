use crate::grading::{self, Grade, ScoreOverflow, SubjectScores};
use crate::store::{JsonDocument, StoreError, ATTENDANCE_FILE, STUDENTS_FILE};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// date (ISO 8601) -> student id -> status, both levels in document order.
pub type AttendanceBook = IndexMap<String, IndexMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub roll: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub maths: i64,
    pub science: i64,
    pub computer: i64,
    pub total: i64,
    pub percentage: f64,
    pub grade: Grade,
    pub remark: String,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub roll: String,
    pub class_name: String,
    pub scores: SubjectScores,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("{field} must be a whole number, got {got}")]
    NotInteger { field: &'static str, got: String },
    #[error(transparent)]
    Overflow(#[from] ScoreOverflow),
    #[error("no student id left after {0}")]
    IdsExhausted(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    pub students: JsonDocument<Vec<Student>>,
    pub attendance: JsonDocument<AttendanceBook>,
}

impl Workspace {
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(root).map_err(|source| StoreError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            root: root.to_path_buf(),
            students: JsonDocument::new(root.join(STUDENTS_FILE)),
            attendance: JsonDocument::new(root.join(ATTENDANCE_FILE)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Grades and appends one student, then rewrites the students document.
    pub fn add_student(&self, new: NewStudent) -> Result<Student, RecordError> {
        let mut students = self.students.load()?;
        let id = next_student_id(&students)
            .ok_or_else(|| RecordError::IdsExhausted(max_student_id(&students)))?;
        let student = build_student(id, new)?;
        students.push(student.clone());
        self.students.save(&students)?;
        tracing::info!(id = student.id, class = %student.class_name, "student added");
        Ok(student)
    }
}

fn max_student_id(students: &[Student]) -> i64 {
    students.iter().map(|s| s.id).max().unwrap_or(0)
}

/// `None` once a hand-edited file holds `i64::MAX`.
pub fn next_student_id(students: &[Student]) -> Option<i64> {
    max_student_id(students).checked_add(1)
}

pub fn build_student(id: i64, new: NewStudent) -> Result<Student, ScoreOverflow> {
    let g = grading::grade_scores(new.scores)?;
    Ok(Student {
        id,
        name: new.name,
        roll: new.roll,
        class_name: new.class_name,
        maths: new.scores.maths,
        science: new.scores.science,
        computer: new.scores.computer,
        total: g.total,
        percentage: g.percentage,
        grade: g.grade,
        remark: g.remark,
    })
}

pub fn find_student(students: &[Student], id: i64) -> Option<&Student> {
    students.iter().find(|s| s.id == id)
}

pub fn class_names(students: &[Student]) -> Vec<String> {
    students
        .iter()
        .map(|s| s.class_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub class_name: Option<String>,
}

impl StudentFilter {
    /// A name search wins over the class filter; the class filter is dropped
    /// when both are given.
    pub fn effective_class(&self) -> Option<&str> {
        if non_blank(self.search.as_deref()).is_some() {
            return None;
        }
        non_blank(self.class_name.as_deref())
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        if let Some(needle) = non_blank(self.search.as_deref()) {
            let needle = needle.to_lowercase();
            return students
                .iter()
                .filter(|s| s.name.to_lowercase().contains(&needle))
                .collect();
        }
        match self.effective_class() {
            Some(class_name) => students
                .iter()
                .filter(|s| s.class_name == class_name)
                .collect(),
            None => students.iter().collect(),
        }
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}

/// Accepts a JSON integer or a numeric string, the way form fields arrive.
pub fn parse_score(
    params: &serde_json::Value,
    field: &'static str,
) -> Result<i64, RecordError> {
    let Some(v) = params.get(field).filter(|v| !v.is_null()) else {
        return Err(RecordError::Missing(field));
    };
    if let Some(n) = v.as_i64() {
        return Ok(n);
    }
    if let Some(s) = v.as_str() {
        if let Ok(n) = s.trim().parse::<i64>() {
            return Ok(n);
        }
    }
    Err(RecordError::NotInteger {
        field,
        got: v.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn student(id: i64, name: &str, class_name: &str) -> Student {
        build_student(
            id,
            NewStudent {
                name: name.to_string(),
                roll: format!("R{}", id),
                class_name: class_name.to_string(),
                scores: SubjectScores {
                    maths: 50,
                    science: 50,
                    computer: 50,
                },
            },
        )
        .expect("build student")
    }

    #[test]
    fn search_overrides_class_filter() {
        let all = vec![
            student(1, "Asha Mehta", "7A"),
            student(2, "Rahul Das", "7B"),
            student(3, "ASHOK Rao", "7B"),
        ];
        let f = StudentFilter {
            search: Some("ash".to_string()),
            class_name: Some("7B".to_string()),
        };
        let ids: Vec<i64> = f.apply(&all).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(f.effective_class(), None);

        let f = StudentFilter {
            search: Some(String::new()),
            class_name: Some("7B".to_string()),
        };
        let ids: Vec<i64> = f.apply(&all).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn next_id_never_reuses() {
        assert_eq!(next_student_id(&[]), Some(1));
        let all = vec![student(1, "a", "x"), student(4, "b", "x")];
        assert_eq!(next_student_id(&all), Some(5));
        let full = vec![student(i64::MAX, "z", "x")];
        assert_eq!(next_student_id(&full), None);
    }

    #[test]
    fn class_names_are_sorted_and_distinct() {
        let all = vec![
            student(1, "a", "8C"),
            student(2, "b", "7A"),
            student(3, "c", "8C"),
        ];
        assert_eq!(class_names(&all), vec!["7A".to_string(), "8C".to_string()]);
    }

    #[test]
    fn scores_accept_numbers_and_numeric_strings() {
        let p = json!({ "maths": 90, "science": " 85 ", "computer": "eighty" });
        assert_eq!(parse_score(&p, "maths").expect("maths"), 90);
        assert_eq!(parse_score(&p, "science").expect("science"), 85);
        assert!(matches!(
            parse_score(&p, "computer"),
            Err(RecordError::NotInteger { field: "computer", .. })
        ));
        assert!(matches!(
            parse_score(&p, "history"),
            Err(RecordError::Missing("history"))
        ));
    }

    #[test]
    fn student_serializes_with_class_key() {
        let v = serde_json::to_value(student(1, "a", "7A")).expect("to value");
        assert_eq!(v["class"], "7A");
        assert_eq!(v["grade"], "C");
        assert!(v.get("class_name").is_none());
    }
}
