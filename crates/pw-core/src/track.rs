//! Circuit layout classification carried on [`Circuit`][crate::Circuit].
//!
//! The engine does not branch on track type; the value is part of the
//! reference record handed back with results.

/// Broad circuit classification.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TrackType {
    /// Purpose-built racing circuit (default).
    #[default]
    Permanent,
    /// Temporary circuit on public roads.
    Street,
    /// Mix of permanent sections and public roads.
    Hybrid,
}

impl TrackType {
    /// Human-readable label, as used in CSV reference files.
    pub fn as_str(self) -> &'static str {
        match self {
            TrackType::Permanent => "permanent",
            TrackType::Street    => "street",
            TrackType::Hybrid    => "hybrid",
        }
    }

    /// Parse a CSV label; case-insensitive.  `None` for unknown labels.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permanent" => Some(TrackType::Permanent),
            "street"    => Some(TrackType::Street),
            "hybrid"    => Some(TrackType::Hybrid),
            _ => None,
        }
    }
}

impl std::fmt::Display for TrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
