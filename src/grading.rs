use serde::{Deserialize, Serialize};

pub const SUBJECT_COUNT: i64 = 3;
pub const MAX_PER_SUBJECT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
}

impl Grade {
    /// Threshold table, evaluated on the unrounded percentage.
    pub fn for_percentage(percent: f64) -> Grade {
        if percent >= 80.0 {
            Grade::A
        } else if percent >= 60.0 {
            Grade::B
        } else {
            Grade::C
        }
    }

    pub fn remark(self) -> &'static str {
        match self {
            Grade::A => "Excellent",
            Grade::B => "Good",
            Grade::C => "Needs Improvement",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScores {
    pub maths: i64,
    pub science: i64,
    pub computer: i64,
}

impl SubjectScores {
    /// `None` when the three scores do not sum within `i64`.
    pub fn total(&self) -> Option<i64> {
        self.maths
            .checked_add(self.science)?
            .checked_add(self.computer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("scores are too large to total ({maths} + {science} + {computer})")]
pub struct ScoreOverflow {
    pub maths: i64,
    pub science: i64,
    pub computer: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeResult {
    pub total: i64,
    pub percentage: f64,
    pub grade: Grade,
    pub remark: String,
}

/// Half-away-from-zero rounding to 2 decimals.
pub fn round_2_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn grade_scores(scores: SubjectScores) -> Result<GradeResult, ScoreOverflow> {
    let total = scores.total().ok_or(ScoreOverflow {
        maths: scores.maths,
        science: scores.science,
        computer: scores.computer,
    })?;
    let percent = (total as f64) * 100.0 / ((SUBJECT_COUNT * MAX_PER_SUBJECT) as f64);
    let grade = Grade::for_percentage(percent);
    Ok(GradeResult {
        total,
        percentage: round_2_decimals(percent),
        grade,
        remark: grade.remark().to_string(),
    })
}
