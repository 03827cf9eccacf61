//! Pipeline configuration

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::xml::Layout;

/// Dependency sorting options
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortConfig {
    pub enabled: bool,
    /// Group by scope rank before ordering by coordinates
    pub by_scope: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            by_scope: false,
        }
    }
}

/// Version-to-property promotion options
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromotionConfig {
    pub enabled: bool,
    /// Rewrite existing `${x}` version references to the naming convention
    pub replace_existing: bool,
    /// Also promote plugin versions and plugin dependency versions
    pub convert_plugins: bool,
    /// Groups whose property names always include the artifact id
    pub qualified_groups: BTreeSet<String>,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            replace_existing: false,
            convert_plugins: true,
            qualified_groups: BTreeSet::new(),
        }
    }
}

/// Which rewrite rules run and how the result is written
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub insert_common_properties: bool,
    pub normalize_dependencies: bool,
    pub sort: SortConfig,
    pub normalize_plugins: bool,
    pub promotion: PromotionConfig,
    pub organize: bool,
    pub layout: Layout,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            insert_common_properties: true,
            normalize_dependencies: true,
            sort: SortConfig::default(),
            normalize_plugins: true,
            promotion: PromotionConfig::default(),
            organize: false,
            layout: Layout::default(),
        }
    }
}

impl PipelineConfig {
    /// Every stage disabled; the document is only re-serialized
    pub fn passthrough() -> Self {
        Self {
            insert_common_properties: false,
            normalize_dependencies: false,
            sort: SortConfig {
                enabled: false,
                by_scope: false,
            },
            normalize_plugins: false,
            promotion: PromotionConfig {
                enabled: false,
                convert_plugins: false,
                ..PromotionConfig::default()
            },
            organize: false,
            layout: Layout::default(),
        }
    }

    /// Reject options that only make sense with a disabled stage
    pub fn validate(&self) -> Result<()> {
        if self.sort.by_scope && !self.sort.enabled {
            return Err(Error::invalid_config(
                "sorting by scope requires dependency sorting to be enabled",
            ));
        }
        if !self.promotion.enabled {
            if self.promotion.replace_existing {
                return Err(Error::invalid_config(
                    "replacing existing property references requires version promotion to be enabled",
                ));
            }
            if !self.promotion.qualified_groups.is_empty() {
                return Err(Error::invalid_config(
                    "qualified groups require version promotion to be enabled",
                ));
            }
        }
        if self.promotion.qualified_groups.iter().any(|g| g.trim().is_empty()) {
            return Err(Error::invalid_config("qualified group must not be blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.organize);
        assert_eq!(config.layout, Layout::Pretty { indent: 4 });
        assert!(PipelineConfig::passthrough().validate().is_ok());
    }

    #[test]
    fn test_sub_options_need_their_stage() {
        let mut config = PipelineConfig::default();
        config.sort.enabled = false;
        config.sort.by_scope = true;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.promotion.enabled = false;
        config.promotion.qualified_groups.insert("org.slf4j".to_string());
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.promotion.qualified_groups.insert(" ".to_string());
        assert!(config.validate().is_err());
    }
}
