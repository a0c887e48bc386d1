//! Qualitative reliability tags attached to regions and cost drivers.

use serde::{Deserialize, Serialize};

/// How much weight an estimate deserves.
///
/// The knowledge store is externally authored, so labels outside the usual
/// three are kept verbatim rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
    Other(String),
}

impl From<String> for Confidence {
    fn from(s: String) -> Self {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Confidence::Low,
            "MEDIUM" => Confidence::Medium,
            "HIGH" => Confidence::High,
            _ => Confidence::Other(s),
        }
    }
}

impl From<Confidence> for String {
    fn from(c: Confidence) -> Self {
        match c {
            Confidence::Low => "LOW".into(),
            Confidence::Medium => "MEDIUM".into(),
            Confidence::High => "HIGH".into(),
            Confidence::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => f.write_str("LOW"),
            Self::Medium => f.write_str("MEDIUM"),
            Self::High => f.write_str("HIGH"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_normalize() {
        let c: Confidence = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(c, Confidence::High);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"HIGH\"");
    }

    #[test]
    fn unknown_label_is_preserved() {
        let c: Confidence = serde_json::from_str("\"MEDIUM-HIGH\"").unwrap();
        assert_eq!(c, Confidence::Other("MEDIUM-HIGH".into()));
        assert_eq!(c.to_string(), "MEDIUM-HIGH");
    }

    #[test]
    fn defaults_to_medium() {
        assert_eq!(Confidence::default(), Confidence::Medium);
    }
}
