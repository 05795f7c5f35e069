/// Result of the release check, produced once per process and cached on the
/// coordinator; repeated checks within a session are not needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub current_version: String,
    pub update_available: bool,
    pub latest_version: Option<String>,
}

impl VersionInfo {
    pub fn up_to_date(current: impl Into<String>) -> Self {
        Self {
            current_version: current.into(),
            update_available: false,
            latest_version: None,
        }
    }
}

pub fn current_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Dotted numeric component compare, tolerating a leading `v` and uneven
/// component counts. Non-numeric components compare as zero.
pub fn is_newer(current: &str, candidate: &str) -> bool {
    let current = components(current);
    let candidate = components(candidate);
    let len = current.len().max(candidate.len());
    for idx in 0..len {
        let a = current.get(idx).copied().unwrap_or(0);
        let b = candidate.get(idx).copied().unwrap_or(0);
        if b != a {
            return b > a;
        }
    }
    false
}

fn components(version: &str) -> Vec<u64> {
    version
        .trim()
        .trim_start_matches(['v', 'V'])
        .split('.')
        .map(|part| {
            part.chars()
                .take_while(|ch| ch.is_ascii_digit())
                .collect::<String>()
                .parse::<u64>()
                .unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{is_newer, VersionInfo};

    #[test]
    fn newer_versions_are_detected_across_component_positions() {
        assert!(is_newer("1.2.0", "1.2.1"));
        assert!(is_newer("1.2.9", "1.3.0"));
        assert!(is_newer("0.9.9", "2.3.0"));
        assert!(!is_newer("2.3.0", "2.3.0"));
        assert!(!is_newer("2.3.0", "1.9.9"));
    }

    #[test]
    fn leading_v_and_short_versions_are_tolerated() {
        assert!(is_newer("v1.2", "v1.2.1"));
        assert!(!is_newer("v1.2.0", "1.2"));
    }

    #[test]
    fn up_to_date_carries_no_latest_version() {
        let info = VersionInfo::up_to_date("1.0.0");
        assert!(!info.update_available);
        assert!(info.latest_version.is_none());
    }
}
