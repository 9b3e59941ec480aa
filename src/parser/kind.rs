//! Parser kinds and their service routes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which service route handles an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// A IIIF manifest URL.
    Manifest,
    /// A Penn Libraries (Colenda) catalog ID.
    Penn,
    /// A Folger Shakespeare Library catalog ID.
    Shakespeare,
}

impl ParserKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 3] = [Self::Manifest, Self::Penn, Self::Shakespeare];

    /// Base route, including the trailing slash.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::Manifest => "/parse/",
            Self::Penn => "/parse/penn/",
            Self::Shakespeare => "/parse/shakespeare/",
        }
    }

    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::Penn => "penn",
            Self::Shakespeare => "shakespeare",
        }
    }

    /// Human-readable source name.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Manifest => "Manifest URL",
            Self::Penn => "Penn Libraries: Colenda Digital Repository",
            Self::Shakespeare => "Folger Shakespeare Library: Digital Collections",
        }
    }

    /// Example input.
    #[must_use]
    pub fn example_input(self) -> &'static str {
        match self {
            Self::Manifest => "https://example.com/manifest.json",
            Self::Penn => "81431-p3hk28",
            Self::Shakespeare => "bib244741-309974-lb41",
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manifest" => Ok(Self::Manifest),
            "penn" => Ok(Self::Penn),
            "shakespeare" => Ok(Self::Shakespeare),
            other => Err(format!(
                "unknown parser kind '{other}' (expected manifest, penn or shakespeare)"
            )),
        }
    }
}
