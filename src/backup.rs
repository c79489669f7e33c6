use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::store::{self, ATTENDANCE_FILE, STUDENTS_FILE};

const MANIFEST_ENTRY: &str = "manifest.json";
const DATA_DIR: &str = "data";
pub const BUNDLE_FORMAT_V1: &str = "campus-workspace-v1";

/// Documents carried by a bundle, in entry order.
const DOCUMENTS: [&str; 2] = [STUDENTS_FILE, ATTENDANCE_FILE];

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub restored: Vec<String>,
}

fn entry_name(doc: &str) -> String {
    format!("{}/{}", DATA_DIR, doc)
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// A document absent from the workspace is exported as its empty form so a
/// bundle always restores both files.
fn read_document(workspace_path: &Path, doc: &str) -> anyhow::Result<Vec<u8>> {
    let p = workspace_path.join(doc);
    match std::fs::read(&p) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(if doc == STUDENTS_FILE {
            b"[]\n".to_vec()
        } else {
            b"{}\n".to_vec()
        }),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", p.to_string_lossy())),
    }
}

pub fn export_workspace_bundle(
    workspace_path: &Path,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    if !workspace_path.is_dir() {
        return Err(anyhow!(
            "workspace not found: {}",
            workspace_path.to_string_lossy()
        ));
    }

    let mut payloads = Vec::with_capacity(DOCUMENTS.len());
    for doc in DOCUMENTS {
        let bytes = read_document(workspace_path, doc)?;
        serde_json::from_slice::<serde_json::Value>(&bytes)
            .with_context(|| format!("{} is not valid JSON; refusing to export", doc))?;
        payloads.push((doc, bytes));
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let checksums: serde_json::Map<String, serde_json::Value> = payloads
        .iter()
        .map(|(doc, bytes)| (entry_name(doc), json!(sha256_hex(bytes))))
        .collect();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "sha256": checksums,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    for (doc, bytes) in &payloads {
        zip.start_file(entry_name(doc), opts)
            .with_context(|| format!("failed to start {} entry", doc))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write {} entry", doc))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;
    tracing::info!(path = %out_path.display(), "workspace bundle exported");

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 1 + payloads.len(),
    })
}

/// Verifies every checksum before anything in the workspace is replaced.
pub fn import_workspace_bundle(
    in_path: &Path,
    workspace_path: &Path,
) -> anyhow::Result<ImportSummary> {
    if !is_zip_file(in_path)? {
        return Err(anyhow!(
            "not a workspace bundle: {}",
            in_path.to_string_lossy()
        ));
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut verified = Vec::with_capacity(DOCUMENTS.len());
    for doc in DOCUMENTS {
        let name = entry_name(doc);
        let mut bytes = Vec::new();
        archive
            .by_name(&name)
            .with_context(|| format!("bundle missing {}", name))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to extract {}", name))?;
        let expected = manifest
            .get("sha256")
            .and_then(|m| m.get(&name))
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("manifest has no checksum for {}", name))?;
        if sha256_hex(&bytes) != expected {
            return Err(anyhow!("checksum mismatch for {}", name));
        }
        serde_json::from_slice::<serde_json::Value>(&bytes)
            .with_context(|| format!("{} is not valid JSON", name))?;
        verified.push((doc, bytes));
    }

    std::fs::create_dir_all(workspace_path).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace_path.to_string_lossy()
        )
    })?;
    let mut restored = Vec::with_capacity(verified.len());
    for (doc, bytes) in verified {
        let dst = workspace_path.join(doc);
        store::write_replace(&dst, &bytes)
            .with_context(|| format!("failed to install {}", dst.to_string_lossy()))?;
        restored.push(doc.to_string());
    }
    tracing::info!(path = %workspace_path.display(), "workspace bundle imported");

    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        restored,
    })
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
