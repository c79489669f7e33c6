use campusd::attendance;
use campusd::grading::{Grade, SubjectScores};
use campusd::records::{NewStudent, RecordError, Workspace};

fn new_student(name: &str, class_name: &str, m: i64, s: i64, c: i64) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        roll: "1".to_string(),
        class_name: class_name.to_string(),
        scores: SubjectScores {
            maths: m,
            science: s,
            computer: c,
        },
    }
}

#[test]
fn add_student_persists_graded_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ws = Workspace::open(dir.path()).expect("open workspace");

    let s = ws
        .add_student(new_student("Meera", "8B", 90, 85, 88))
        .expect("add");
    assert_eq!(s.id, 1);
    assert_eq!(s.total, 263);
    assert_eq!(s.percentage, 87.67);
    assert_eq!(s.grade, Grade::A);
    assert_eq!(s.remark, "Excellent");

    let again = ws
        .add_student(new_student("Kabir", "8B", 60, 60, 60))
        .expect("add");
    assert_eq!(again.id, 2);
    assert_eq!(again.grade, Grade::B);

    let on_disk: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("students.json")).expect("read"))
            .expect("json");
    assert_eq!(on_disk.as_array().map(|a| a.len()), Some(2));
    assert_eq!(on_disk[0]["class"], "8B");
    assert_eq!(on_disk[1]["remark"], "Good");
}

#[test]
fn ids_continue_after_hand_edited_gap() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ws = Workspace::open(dir.path()).expect("open workspace");
    ws.add_student(new_student("a", "1", 1, 1, 1)).expect("add");
    ws.add_student(new_student("b", "1", 1, 1, 1)).expect("add");
    ws.add_student(new_student("c", "1", 1, 1, 1)).expect("add");

    let mut students = ws.students.load().expect("load");
    students.remove(1);
    ws.students.save(&students).expect("save");

    let d = ws.add_student(new_student("d", "1", 1, 1, 1)).expect("add");
    assert_eq!(d.id, 4);
}

#[test]
fn overflowing_scores_are_rejected_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ws = Workspace::open(dir.path()).expect("open workspace");
    ws.add_student(new_student("a", "1", 1, 1, 1)).expect("add");
    let before = std::fs::read(dir.path().join("students.json")).expect("read");

    let e = ws
        .add_student(new_student("big", "1", i64::MAX, 1, 0))
        .expect_err("overflow");
    assert!(matches!(e, RecordError::Overflow(_)), "{:?}", e);
    assert_eq!(
        std::fs::read(dir.path().join("students.json")).expect("read"),
        before
    );
}

#[test]
fn exhausted_ids_are_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ws = Workspace::open(dir.path()).expect("open workspace");
    ws.add_student(new_student("a", "1", 1, 1, 1)).expect("add");

    let mut students = ws.students.load().expect("load");
    students[0].id = i64::MAX;
    ws.students.save(&students).expect("save");

    let e = ws
        .add_student(new_student("b", "1", 1, 1, 1))
        .expect_err("no id left");
    assert!(matches!(e, RecordError::IdsExhausted(i64::MAX)), "{:?}", e);
    assert_eq!(ws.students.load().expect("load").len(), 1);
}

#[test]
fn mark_then_query_attendance() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ws = Workspace::open(dir.path()).expect("open workspace");
    for name in ["a", "b", "c"] {
        ws.add_student(new_student(name, "6C", 50, 50, 50)).expect("add");
    }

    let students = ws.students.load().expect("load");
    let mut book = ws.attendance.load().expect("load attendance");
    let written = attendance::mark_day(&mut book, "2024-01-10", &students, |id| {
        (id == "3").then(|| "Present".to_string())
    });
    assert_eq!(written, 1);
    ws.attendance.save(&book).expect("save attendance");

    let book = ws.attendance.load().expect("reload");
    let (student, summary) =
        attendance::student_attendance(&students, &book, 3).expect("student 3");
    assert_eq!(student.name, "c");
    assert_eq!(summary.total_days, 1);
    assert_eq!(summary.present_days, 1);
    assert_eq!(summary.absent_days, 0);
    assert_eq!(summary.percentage, 100.0);

    assert!(attendance::student_attendance(&students, &book, 9).is_none());
}

#[test]
fn last_write_for_a_day_wins_and_blank_keeps_earlier() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ws = Workspace::open(dir.path()).expect("open workspace");
    ws.add_student(new_student("a", "6C", 50, 50, 50)).expect("add");
    ws.add_student(new_student("b", "6C", 50, 50, 50)).expect("add");
    let students = ws.students.load().expect("load");

    let mut book = ws.attendance.load().expect("load attendance");
    attendance::mark_day(&mut book, "2024-03-01", &students, |_| Some("Present".to_string()));
    attendance::mark_day(&mut book, "2024-03-01", &students, |id| {
        Some(if id == "1" { "Absent" } else { "" }.to_string())
    });
    ws.attendance.save(&book).expect("save");

    let book = ws.attendance.load().expect("reload");
    assert_eq!(book["2024-03-01"]["1"], "Absent");
    assert_eq!(book["2024-03-01"]["2"], "Present");
    assert_eq!(attendance::summarize(&book, 1).percentage, 0.0);
    assert_eq!(attendance::summarize(&book, 2).percentage, 100.0);
}

#[test]
fn history_follows_marking_order_across_reloads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ws = Workspace::open(dir.path()).expect("open workspace");
    ws.add_student(new_student("a", "6C", 50, 50, 50)).expect("add");
    let students = ws.students.load().expect("load");

    let mut book = ws.attendance.load().expect("load attendance");
    for (date, status) in [
        ("2024-02-02", "Absent"),
        ("2024-01-31", "Present"),
        ("2024-02-01", "Late"),
    ] {
        attendance::mark_day(&mut book, date, &students, |_| Some(status.to_string()));
    }
    ws.attendance.save(&book).expect("save attendance");

    // A backfilled day lands after the days already written.
    let mut book = ws.attendance.load().expect("reload");
    attendance::mark_day(&mut book, "2024-01-15", &students, |_| Some("Absent".to_string()));
    ws.attendance.save(&book).expect("save backfill");

    let book = ws.attendance.load().expect("reload");
    let keys: Vec<&str> = book.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["2024-02-02", "2024-01-31", "2024-02-01", "2024-01-15"]);

    let summary = attendance::summarize(&book, 1);
    let dates: Vec<&str> = summary.history.iter().map(|h| h.date.as_str()).collect();
    assert_eq!(dates, keys);
    assert_eq!(summary.present_days, 1);
    assert_eq!(summary.absent_days, 3);
    assert_eq!(summary.percentage, 25.0);
}
