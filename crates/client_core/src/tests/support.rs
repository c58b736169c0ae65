use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::Value;
use shared::domain::RawFields;
use tokio::sync::Notify;

use crate::{
    error::TransportError,
    notify::Notifier,
    surface::{BannerId, FormSurface, NoticeKind},
    transport::{HttpReply, JsonRequest, Transport},
};

#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    pub label: String,
    pub enabled: bool,
    pub enable_calls: u32,
    pub disable_calls: u32,
    pub error: Option<String>,
    pub errors_shown: Vec<String>,
    pub banners: Vec<(BannerId, NoticeKind, String)>,
    pub open_banners: Vec<BannerId>,
    pub alerts: Vec<String>,
    pub texts: HashMap<String, String>,
    pub lists: HashMap<String, Vec<String>>,
    pub visible: HashMap<String, bool>,
    pub scrolls: Vec<String>,
    pub resets: u32,
}

impl SurfaceLog {
    pub fn is_visible(&self, region: &str) -> Option<bool> {
        self.visible.get(region).copied()
    }

    pub fn text(&self, target: &str) -> Option<&str> {
        self.texts.get(target).map(String::as_str)
    }
}

pub struct RecordingSurface {
    log: Mutex<SurfaceLog>,
    has_banner: bool,
}

impl RecordingSurface {
    pub fn new(label: &str) -> Arc<Self> {
        Arc::new(Self::build(label, true))
    }

    pub fn without_banner(label: &str) -> Arc<Self> {
        Arc::new(Self::build(label, false))
    }

    fn build(label: &str, has_banner: bool) -> Self {
        Self {
            log: Mutex::new(SurfaceLog {
                label: label.to_string(),
                enabled: true,
                ..SurfaceLog::default()
            }),
            has_banner,
        }
    }

    pub fn snapshot(&self) -> SurfaceLog {
        self.log.lock().expect("surface log").clone()
    }

    fn with_log(&self, f: impl FnOnce(&mut SurfaceLog)) {
        f(&mut self.log.lock().expect("surface log"));
    }
}

impl FormSurface for RecordingSurface {
    fn submit_label(&self) -> String {
        self.snapshot().label
    }

    fn set_submit_label(&self, label: &str) {
        self.with_log(|log| log.label = label.to_string());
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.with_log(|log| {
            log.enabled = enabled;
            if enabled {
                log.enable_calls += 1;
            } else {
                log.disable_calls += 1;
            }
        });
    }

    fn show_error(&self, message: &str) {
        self.with_log(|log| {
            log.error = Some(message.to_string());
            log.errors_shown.push(message.to_string());
        });
    }

    fn hide_error(&self) {
        self.with_log(|log| log.error = None);
    }

    fn show_banner(&self, kind: NoticeKind, message: &str) -> Option<BannerId> {
        if !self.has_banner {
            return None;
        }
        let mut id = 0;
        self.with_log(|log| {
            id = log.banners.len() as BannerId + 1;
            log.banners.push((id, kind, message.to_string()));
            log.open_banners.push(id);
        });
        Some(id)
    }

    fn dismiss_banner(&self, id: BannerId) {
        self.with_log(|log| log.open_banners.retain(|open| *open != id));
    }

    fn alert(&self, message: &str) {
        self.with_log(|log| log.alerts.push(message.to_string()));
    }

    fn set_text(&self, target: &str, text: &str) {
        self.with_log(|log| {
            log.texts.insert(target.to_string(), text.to_string());
        });
    }

    fn set_list(&self, target: &str, items: &[String]) {
        self.with_log(|log| {
            log.lists.insert(target.to_string(), items.to_vec());
        });
    }

    fn set_visible(&self, region: &str, visible: bool) {
        self.with_log(|log| {
            log.visible.insert(region.to_string(), visible);
        });
    }

    fn scroll_to(&self, region: &str) {
        self.with_log(|log| log.scrolls.push(region.to_string()));
    }

    fn reset_fields(&self) {
        self.with_log(|log| log.resets += 1);
    }
}

/// Replies from a fixed script and records every request.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpReply, TransportError>>>,
    requests: Mutex<Vec<JsonRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<HttpReply, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn json(status: u16, body: Value) -> Arc<Self> {
        Self::new(vec![Ok(HttpReply::json(status, &body))])
    }

    /// Holds every reply until `gate` is notified.
    pub fn gated(replies: Vec<Result<HttpReply, TransportError>>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            gate: Some(gate),
        })
    }

    pub fn requests(&self) -> Vec<JsonRequest> {
        self.requests.lock().expect("requests").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: JsonRequest) -> Result<HttpReply, TransportError> {
        self.requests.lock().expect("requests").push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .expect("replies")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted reply".into())))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(String, NoticeKind)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(String, NoticeKind)> {
        self.notices.lock().expect("notices").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        self.notices
            .lock()
            .expect("notices")
            .push((message.to_string(), kind));
    }
}

pub fn raw(pairs: &[(&str, &str)]) -> RawFields {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

pub fn connection_refused() -> TransportError {
    TransportError::Connect {
        url: "http://127.0.0.1:9/api".into(),
        reason: "connection refused".into(),
    }
}
