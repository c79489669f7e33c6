use crate::attendance;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{get_date_or_today, get_optional_str, get_student_id};
use crate::ipc::types::{AppState, Request};
use crate::records::{self, StudentFilter};
use serde_json::json;
use std::collections::BTreeMap;

fn class_filter(params: &serde_json::Value) -> StudentFilter {
    StudentFilter {
        search: None,
        class_name: get_optional_str(params, "class"),
    }
}

fn attendance_sheet(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = state.workspace()?;
    let date = get_date_or_today(params)?;
    let students = ws.students.load()?;
    let book = ws.attendance.load()?;
    let filter = class_filter(params);
    let roster = filter.apply(&students);

    let recorded = book.get(&date);
    let rows: Vec<serde_json::Value> = roster
        .iter()
        .map(|s| {
            json!({
                "studentId": s.id,
                "name": s.name,
                "roll": s.roll,
                "class": s.class_name,
                "status": recorded.and_then(|day| day.get(&s.id.to_string()))
            })
        })
        .collect();

    Ok(json!({
        "date": date,
        "classes": records::class_names(&students),
        "selectedClass": filter.effective_class(),
        "rows": rows
    }))
}

fn attendance_mark(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = state.workspace()?;
    let date = get_date_or_today(params)?;
    let Some(raw_statuses) = params.get("statuses").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::bad_params("missing statuses"));
    };
    let mut statuses: BTreeMap<String, String> = BTreeMap::new();
    for (id, v) in raw_statuses {
        let Some(status) = v.as_str() else {
            if v.is_null() {
                continue;
            }
            return Err(HandlerErr::bad_params("status must be a string")
                .with_details(json!({ "studentId": id })));
        };
        statuses.insert(id.trim().to_string(), status.trim().to_string());
    }

    let students = ws.students.load()?;
    let mut book = ws.attendance.load()?;
    let roster = class_filter(params).apply(&students);
    let written = attendance::mark_day(&mut book, &date, roster, |id| statuses.get(id).cloned());
    ws.attendance.save(&book)?;
    tracing::info!(%date, written, "attendance marked");

    Ok(json!({
        "date": date,
        "written": written
    }))
}

fn attendance_student(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ws = state.workspace()?;
    let student_id = get_student_id(params)?;
    let students = ws.students.load()?;
    let book = ws.attendance.load()?;
    let Some((student, summary)) = attendance::student_attendance(&students, &book, student_id) else {
        return Err(HandlerErr::not_found("student not found")
            .with_details(json!({ "studentId": student_id })));
    };
    Ok(json!({
        "student": student,
        "totalDays": summary.total_days,
        "presentDays": summary.present_days,
        "absentDays": summary.absent_days,
        "percentage": summary.percentage,
        "history": summary.history
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.sheet" => attendance_sheet(state, &req.params),
        "attendance.mark" => attendance_mark(state, &req.params),
        "attendance.student" => attendance_student(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
