use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::chat::{TextGenerator, Transcript};
use crate::ipc::error::HandlerErr;
use crate::records::Workspace;
use crate::store::StoreError;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<Workspace>,
    /// Conversations keyed by session id; dropped on `chat.reset`.
    pub chats: HashMap<String, Transcript>,
    pub generator: Box<dyn TextGenerator>,
    pub generator_configured: bool,
}

impl AppState {
    pub fn new(generator: Box<dyn TextGenerator>, generator_configured: bool) -> Self {
        Self {
            workspace: None,
            chats: HashMap::new(),
            generator,
            generator_configured,
        }
    }

    pub fn select_workspace(&mut self, path: &Path) -> Result<(), StoreError> {
        let ws = Workspace::open(path)?;
        tracing::info!(path = %path.display(), "workspace selected");
        self.workspace = Some(ws);
        Ok(())
    }

    pub fn workspace(&self) -> Result<&Workspace, HandlerErr> {
        self.workspace.as_ref().ok_or_else(HandlerErr::no_workspace)
    }
}
