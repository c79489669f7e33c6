use crate::backup;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::get_required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::{Path, PathBuf};

/// `workspacePath` if given, else the selected workspace.
fn target_workspace(state: &AppState, params: &serde_json::Value) -> Result<PathBuf, HandlerErr> {
    match params.get("workspacePath").and_then(|v| v.as_str()) {
        Some(p) if !p.trim().is_empty() => Ok(PathBuf::from(p.trim())),
        _ => Ok(state.workspace()?.root().to_path_buf()),
    }
}

fn bundle_failed(e: anyhow::Error, path: &Path) -> HandlerErr {
    tracing::warn!(error = %format!("{e:#}"), path = %path.display(), "bundle operation failed");
    HandlerErr::new("io_failed", format!("{e:#}"))
        .with_details(json!({ "path": path.to_string_lossy() }))
}

fn export_bundle(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let out = PathBuf::from(get_required_str(params, "outPath")?);
    let workspace = target_workspace(state, params)?;
    let summary =
        backup::export_workspace_bundle(&workspace, &out).map_err(|e| bundle_failed(e, &out))?;
    Ok(json!({
        "path": out.to_string_lossy(),
        "bundleFormat": summary.bundle_format,
        "entryCount": summary.entry_count
    }))
}

fn import_bundle(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let src = PathBuf::from(get_required_str(params, "inPath")?);
    let workspace = target_workspace(state, params)?;
    if !src.is_file() {
        return Err(HandlerErr::not_found("bundle file not found")
            .with_details(json!({ "path": src.to_string_lossy() })));
    }
    let summary =
        backup::import_workspace_bundle(&src, &workspace).map_err(|e| bundle_failed(e, &src))?;
    state.select_workspace(&workspace)?;
    Ok(json!({
        "workspacePath": workspace.to_string_lossy(),
        "bundleFormatDetected": summary.bundle_format_detected,
        "restored": summary.restored
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.exportWorkspaceBundle" => export_bundle(state, &req.params),
        "backup.importWorkspaceBundle" => import_bundle(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
