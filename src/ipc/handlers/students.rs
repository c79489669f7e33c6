use crate::grading::SubjectScores;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{get_optional_str, get_student_id, get_text};
use crate::ipc::types::{AppState, Request};
use crate::records::{self, parse_score, NewStudent, StudentFilter};
use serde_json::json;

fn students_add(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = state.workspace()?;
    let name = get_text(params, "name")?;
    let roll = get_text(params, "roll")?;
    let class_name = get_text(params, "class")?;
    let scores = SubjectScores {
        maths: parse_score(params, "maths")?,
        science: parse_score(params, "science")?,
        computer: parse_score(params, "computer")?,
    };

    let student = ws.add_student(NewStudent {
        name,
        roll,
        class_name,
        scores,
    })?;
    Ok(json!({
        "studentId": student.id,
        "student": student
    }))
}

fn students_list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = state.workspace()?;
    let students = ws.students.load()?;
    let filter = StudentFilter {
        search: get_optional_str(params, "search"),
        class_name: get_optional_str(params, "class"),
    };
    let rows = filter.apply(&students);
    Ok(json!({
        "students": rows,
        "classes": records::class_names(&students),
        "selectedClass": filter.effective_class(),
        "search": filter.search
    }))
}

fn students_report(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = state.workspace()?;
    let student_id = get_student_id(params)?;
    let students = ws.students.load()?;
    let Some(student) = records::find_student(&students, student_id) else {
        return Err(HandlerErr::not_found("student not found")
            .with_details(json!({ "studentId": student_id })));
    };
    Ok(json!({ "student": student }))
}

fn classes_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    let ws = state.workspace()?;
    let students = ws.students.load()?;
    Ok(json!({ "classes": records::class_names(&students) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.add" => students_add(state, &req.params),
        "students.list" => students_list(state, &req.params),
        "students.report" => students_report(state, &req.params),
        "classes.list" => classes_list(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
