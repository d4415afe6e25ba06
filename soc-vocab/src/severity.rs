use serde::{Deserialize, Serialize};

/// Alert severity, ordered from most to least severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Fatal,
    High,
    Medium,
    Low,
    Tips,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Fatal,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Tips,
    ];

    /// Label used on the wire.
    pub fn as_api(&self) -> &'static str {
        match self {
            Severity::Fatal => "Fatal",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Tips => "Tips",
        }
    }

    /// Label used by filters and display code.
    pub fn as_client(&self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Tips => "tips",
        }
    }

    pub fn from_api(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_api() == value)
    }

    pub fn from_client(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_client() == value)
    }

    /// Lenient parse used for free-form input: any case, surrounding
    /// whitespace, and the legacy `critical` alias for `Fatal`.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fatal" | "critical" => Some(Severity::Fatal),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "tips" => Some(Severity::Tips),
            _ => None,
        }
    }

    /// Numeric display level, 1 (fatal) through 5 (tips).
    pub fn level(&self) -> u8 {
        match self {
            Severity::Fatal => 1,
            Severity::High => 2,
            Severity::Medium => 3,
            Severity::Low => 4,
            Severity::Tips => 5,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.level() == level)
    }
}

/// Client label to wire label. Unknown input passes through unchanged.
pub fn api_severity(value: &str) -> String {
    Severity::from_client(value)
        .map(|s| s.as_api().to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Wire label to client label. Unknown input is lowercased.
pub fn client_severity(value: &str) -> String {
    Severity::from_api(value)
        .map(|s| s.as_client().to_string())
        .unwrap_or_else(|| value.to_lowercase())
}

pub fn severity_to_number(value: &str) -> Option<u8> {
    Severity::from_label(value).map(|s| s.level())
}

pub fn number_to_severity(level: u8) -> Option<&'static str> {
    Severity::from_level(level).map(|s| s.as_api())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_labels_roundtrip_both_ways() {
        for severity in Severity::ALL {
            let client = severity.as_client();
            let api = severity.as_api();
            assert_eq!(client_severity(&api_severity(client)), client);
            assert_eq!(api_severity(&client_severity(api)), api);
        }
    }

    #[test]
    fn unknown_labels_fall_back() {
        assert_eq!(api_severity("urgent"), "urgent");
        assert_eq!(client_severity("URGENT"), "urgent");
        assert_eq!(client_severity("HIGH"), "high");
    }

    #[test]
    fn severity_order_is_most_severe_first() {
        assert!(Severity::Fatal < Severity::High);
        assert!(Severity::Low < Severity::Tips);
        let mut shuffled = vec![Severity::Tips, Severity::Fatal, Severity::Medium];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Severity::Fatal, Severity::Medium, Severity::Tips]
        );
    }

    #[test]
    fn numeric_levels() {
        assert_eq!(severity_to_number("Fatal"), Some(1));
        assert_eq!(severity_to_number(" critical "), Some(1));
        assert_eq!(severity_to_number("tips"), Some(5));
        assert_eq!(severity_to_number(""), None);
        assert_eq!(number_to_severity(2), Some("High"));
        assert_eq!(number_to_severity(0), None);
        assert_eq!(number_to_severity(6), None);
    }
}
