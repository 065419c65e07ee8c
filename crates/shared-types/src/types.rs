use serde::{Deserialize, Serialize};

/// Colour family used when presenting a status or audit action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Gray,
    Blue,
    Purple,
    Amber,
    Green,
    Red,
}

/// Icon shown next to a status badge or audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Document,
    Plus,
    Send,
    Pen,
    Eye,
    Trash,
    Clock,
    Alert,
    Check,
    Cross,
}

/// Lookup-table row describing how a value is shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub icon: Icon,
    pub tone: Tone,
    pub text: &'static str,
}

impl Presentation {
    pub const fn new(icon: Icon, tone: Tone, text: &'static str) -> Self {
        Self { icon, tone, text }
    }
}
