//! In-view notification banners

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub dismissible: bool,
}

/// Ordered list of banners awaiting the user's attention
#[derive(Debug, Default)]
pub struct Banners {
    next_id: u64,
    items: Vec<Banner>,
}

impl Banners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a dismissible banner, returning its id
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let banner = Banner {
            id: self.next_id,
            severity,
            message: message.into(),
            dismissible: true,
        };
        match severity {
            Severity::Error => tracing::error!(id = banner.id, "{}", banner.message),
            Severity::Warning => tracing::warn!(id = banner.id, "{}", banner.message),
            Severity::Info => tracing::info!(id = banner.id, "{}", banner.message),
        }
        self.items.push(banner);
        self.next_id
    }

    /// Remove a banner. Unknown ids are ignored.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|b| b.id != id);
        self.items.len() != before
    }

    pub fn active(&self) -> &[Banner] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn has(&self, severity: Severity) -> bool {
        self.items.iter().any(|b| b.severity == severity)
    }
}
