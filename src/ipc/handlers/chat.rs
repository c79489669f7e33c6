use crate::chat::{self, Transcript};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{get_optional_str, get_required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use uuid::Uuid;

fn open_session(state: &mut AppState) -> String {
    let session_id = Uuid::new_v4().to_string();
    state.chats.insert(session_id.clone(), Transcript::new());
    session_id
}

fn known_session(state: &AppState, params: &serde_json::Value) -> Result<String, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    if !state.chats.contains_key(&session_id) {
        return Err(HandlerErr::not_found("chat session not found")
            .with_details(json!({ "sessionId": session_id })));
    }
    Ok(session_id)
}

fn chat_send(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    // Only an all-whitespace message is refused; the text itself goes out untrimmed.
    let message = match params.get("message").and_then(|v| v.as_str()) {
        Some(m) if !m.trim().is_empty() => m.to_string(),
        _ => return Err(HandlerErr::bad_params("missing message")),
    };
    let session_id = match get_optional_str(params, "sessionId") {
        Some(_) => known_session(state, params)?,
        None => open_session(state),
    };

    let transcript = state.chats.remove(&session_id).unwrap_or_default();
    let (transcript, reply) = chat::send_turn(state.generator.as_ref(), transcript, &message);
    let turns = transcript.len();
    state.chats.insert(session_id.clone(), transcript);

    Ok(json!({
        "sessionId": session_id,
        "reply": reply.text,
        "fallback": reply.fallback,
        "turns": turns
    }))
}

fn chat_history(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session_id = known_session(state, params)?;
    let transcript = state.chats.get(&session_id);
    Ok(json!({
        "sessionId": session_id,
        "transcript": transcript
    }))
}

fn chat_reset(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    let removed = state.chats.remove(&session_id).is_some();
    Ok(json!({ "sessionId": session_id, "removed": removed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "chat.open" => Ok(json!({ "sessionId": open_session(state) })),
        "chat.send" => chat_send(state, &req.params),
        "chat.history" => chat_history(state, &req.params),
        "chat.reset" => chat_reset(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
