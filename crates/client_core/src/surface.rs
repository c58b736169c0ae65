//! The UI elements a form controller drives. Implementations use interior
//! mutability so one surface can be shared with delayed UI tasks.

pub type BannerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }
}

pub trait FormSurface: Send + Sync {
    fn submit_label(&self) -> String;
    fn set_submit_label(&self, label: &str);
    fn set_submit_enabled(&self, enabled: bool);

    fn show_error(&self, message: &str);
    fn hide_error(&self);

    /// Returns `None` when the surface has no banner region.
    fn show_banner(&self, _kind: NoticeKind, _message: &str) -> Option<BannerId> {
        None
    }
    fn dismiss_banner(&self, _id: BannerId) {}
    /// Blocking last-resort message.
    fn alert(&self, message: &str);

    fn set_text(&self, target: &str, text: &str);
    fn set_list(&self, target: &str, items: &[String]);
    fn set_visible(&self, region: &str, visible: bool);
    fn scroll_to(&self, _region: &str) {}
    fn reset_fields(&self) {}
}
