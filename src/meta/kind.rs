//! Kind identity metadata

use serde::{Deserialize, Serialize};

/// Identifies a resource type on the wire: Kind, API version, and
/// optional API group. One immutable instance per resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindMeta {
    pub kind: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl KindMeta {
    pub fn new(kind: impl Into<String>, version: impl Into<String>) -> Self {
        KindMeta {
            kind: kind.into(),
            version: version.into(),
            group: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// The `apiVersion` string as it appears in manifests:
    /// `group/version` for grouped resources, bare `version` for core.
    pub fn api_version(&self) -> String {
        match &self.group {
            Some(group) => format!("{}/{}", group, self.version),
            None => self.version.clone(),
        }
    }
}

impl std::fmt::Display for KindMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_api_version() {
        let kind = KindMeta::new("Pod", "v1");
        assert_eq!(kind.api_version(), "v1");
        assert_eq!(kind.to_string(), "v1/Pod");
    }

    #[test]
    fn test_grouped_api_version() {
        let kind = KindMeta::new("Deployment", "v1").with_group("apps");
        assert_eq!(kind.api_version(), "apps/v1");
        assert_eq!(kind.to_string(), "apps/v1/Deployment");
    }
}
