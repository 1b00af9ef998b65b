//! Resource creation settings

use serde::{Deserialize, Serialize};

/// Per-resource storage options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOptions {
    /// Assign hierarchical node labels
    #[serde(default = "default_true")]
    pub use_dewey_ids: bool,
    /// Compress text node values
    #[serde(default = "default_true")]
    pub use_text_compression: bool,
    /// Maintain a path summary alongside the tree
    #[serde(default = "default_true")]
    pub build_path_summary: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            use_dewey_ids: true,
            use_text_compression: true,
            build_path_summary: true,
        }
    }
}

/// Everything needed to create a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    name: String,
    options: ResourceOptions,
}

impl ResourceConfig {
    /// Config for `name` with default options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: ResourceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResourceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_all_enabled() {
        let options = ResourceOptions::default();
        assert!(options.use_dewey_ids);
        assert!(options.use_text_compression);
        assert!(options.build_path_summary);
    }

    #[test]
    fn test_options_missing_fields_default_true() {
        let options: ResourceOptions =
            serde_json::from_str(r#"{"use_text_compression": false}"#).unwrap();
        assert!(options.use_dewey_ids);
        assert!(!options.use_text_compression);
        assert!(options.build_path_summary);
    }
}
