//! Notification capability. Forms accept any [`Notifier`]; without one they
//! fall back to [`BannerNotifier`] over their own surface.

use std::{sync::Arc, time::Duration};

use tracing::debug;

use crate::{
    schedule::schedule_after,
    surface::{FormSurface, NoticeKind},
};

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NoticeKind);
}

/// Shows a banner on the surface and dismisses it after a fixed delay, or
/// raises an alert when the surface has no banner region.
pub struct BannerNotifier {
    surface: Arc<dyn FormSurface>,
    dismiss_after: Duration,
}

impl BannerNotifier {
    pub fn new(surface: Arc<dyn FormSurface>, dismiss_after: Duration) -> Self {
        Self {
            surface,
            dismiss_after,
        }
    }
}

impl Notifier for BannerNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        match self.surface.show_banner(kind, message) {
            Some(id) => {
                debug!(banner_id = id, kind = kind.as_str(), "notify: banner shown");
                let surface = Arc::clone(&self.surface);
                schedule_after(self.dismiss_after, move || surface.dismiss_banner(id));
            }
            None => {
                debug!(kind = kind.as_str(), "notify: no banner region, alerting");
                self.surface.alert(message);
            }
        }
    }
}
