use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical category of a measured device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Form {
    InEar,
    OverEar,
    Earbud,
    Unknown,
}

impl Form {
    /// The forms with an on-disk keyword, in match order.
    pub const KNOWN: [Form; 3] = [Form::InEar, Form::OverEar, Form::Earbud];

    /// The keyword used in directory names and side-files.
    pub fn keyword(&self) -> &'static str {
        match self {
            Form::InEar => "in-ear",
            Form::OverEar => "over-ear",
            Form::Earbud => "earbud",
            Form::Unknown => "unknown",
        }
    }

    /// Parse a form keyword, case-insensitively. Anything unrecognized is
    /// `Form::Unknown`.
    pub fn from_keyword(s: &str) -> Form {
        match s.trim().to_lowercase().as_str() {
            "in-ear" => Form::InEar,
            "over-ear" => Form::OverEar,
            "earbud" => Form::Earbud,
            _ => Form::Unknown,
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// The measurement apparatus a frequency response was captured on.
///
/// The source data marks an unknown rig with the literal strings `unknown`
/// or `Unknown`; both collapse into [`Rig::Unknown`] here, and the boundary
/// emits `Unknown` when formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rig {
    Named(String),
    Unknown,
}

impl Rig {
    /// Parse a rig label; blank or any-case `unknown` is [`Rig::Unknown`].
    pub fn from_label(label: &str) -> Rig {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case("unknown") {
            Rig::Unknown
        } else {
            Rig::Named(label.to_string())
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Rig::Unknown)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Rig::Named(name) => Some(name),
            Rig::Unknown => None,
        }
    }
}

impl fmt::Display for Rig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rig::Named(name) => write!(f, "{}", name),
            Rig::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One row of a per-source name index, keyed by the measured name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameItem {
    pub name: String,
    pub form: Form,
    pub rig: Rig,
}

/// The searchable identity of one measured device variant.
///
/// Entries are not unique by label: the same device measured by several
/// sources, on several rigs, or in several configurations produces several
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Device label, taken from the device directory name
    pub label: String,
    pub form: Form,
    pub rig: Rig,
    /// Measurement source (database author)
    pub source: String,
    /// The raw `{rig and form}` directory name the entry was found under
    pub form_dir: String,
}
