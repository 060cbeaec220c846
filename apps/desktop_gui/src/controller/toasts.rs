//! Transient toast notifications shown in the top-right corner.

use std::time::{Duration, Instant};

const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    created: Instant,
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, title: impl Into<String>, message: impl Into<String>) {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            created: Instant::now(),
        });
    }

    /// Drop toasts older than the display window.
    pub fn prune(&mut self, now: Instant) {
        self.toasts
            .retain(|toast| now.duration_since(toast.created) < TOAST_TTL);
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_ttl() {
        let mut queue = ToastQueue::default();
        queue.push(ToastKind::Success, "Upload Successful", "done");
        let created = queue.iter().next().unwrap().created;

        queue.prune(created + Duration::from_secs(4));
        assert!(!queue.is_empty());

        queue.prune(created + Duration::from_secs(5));
        assert!(queue.is_empty());
    }

    #[test]
    fn dismiss_removes_only_the_target() {
        let mut queue = ToastQueue::default();
        queue.push(ToastKind::Error, "Upload Failed", "first");
        queue.push(ToastKind::Info, "Theme Changed", "second");

        let first_id = queue.iter().next().unwrap().id;
        queue.dismiss(first_id);

        let remaining: Vec<&str> = queue.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(remaining, vec!["Theme Changed"]);
    }

    #[test]
    fn ids_are_unique_across_pushes() {
        let mut queue = ToastQueue::default();
        queue.push(ToastKind::Info, "a", "a");
        queue.push(ToastKind::Info, "b", "b");
        let ids: Vec<u64> = queue.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
