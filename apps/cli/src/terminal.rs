//! A [`FormSurface`] that renders to stdout/stderr.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, PoisonError,
    },
};

use client_core::{BannerId, FormSurface, NoticeKind};
use tracing::debug;

pub struct TerminalSurface {
    submit_label: Mutex<String>,
    next_banner: AtomicU64,
    labels: BTreeMap<&'static str, &'static str>,
}

impl TerminalSurface {
    pub fn new(submit_label: &str) -> Self {
        Self {
            submit_label: Mutex::new(submit_label.to_string()),
            next_banner: AtomicU64::new(1),
            labels: BTreeMap::new(),
        }
    }

    /// Human-readable captions for output targets.
    pub fn with_labels(mut self, labels: &[(&'static str, &'static str)]) -> Self {
        self.labels.extend(labels.iter().copied());
        self
    }

    fn caption<'a>(&'a self, target: &'a str) -> &'a str {
        self.labels.get(target).copied().unwrap_or(target)
    }
}

impl FormSurface for TerminalSurface {
    fn submit_label(&self) -> String {
        self.submit_label
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_submit_label(&self, label: &str) {
        *self
            .submit_label
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = label.to_string();
        debug!(label, "terminal: submit label changed");
    }

    fn set_submit_enabled(&self, enabled: bool) {
        if !enabled {
            eprintln!("{}", self.submit_label());
        }
        debug!(enabled, "terminal: submit control toggled");
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn hide_error(&self) {}

    fn show_banner(&self, kind: NoticeKind, message: &str) -> Option<BannerId> {
        let id = self.next_banner.fetch_add(1, Ordering::Relaxed);
        match kind {
            NoticeKind::Success => println!("{message}"),
            NoticeKind::Error => eprintln!("error: {message}"),
        }
        Some(id)
    }

    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }

    fn set_text(&self, target: &str, text: &str) {
        println!("{:>18}: {text}", self.caption(target));
    }

    fn set_list(&self, target: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        println!("{}:", self.caption(target));
        for item in items {
            println!("  - {item}");
        }
    }

    fn set_visible(&self, region: &str, visible: bool) {
        debug!(region, visible, "terminal: region visibility");
    }
}
