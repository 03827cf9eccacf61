//! Rule pipeline driver

use tracing::{debug, instrument};

use crate::config::PipelineConfig;
use crate::document::PomDocument;
use crate::error::Result;
use crate::rules::{self, Rule};

/// Rules in the order they are applied
pub const STAGES: &[(&str, Rule)] = &[
    ("insert-common-properties", rules::properties::apply),
    ("normalize-dependencies", rules::dependencies::apply),
    ("sort-dependencies", rules::sort::apply),
    ("normalize-plugins", rules::plugins::apply),
    ("promote-versions", rules::versions::apply),
    ("organize", rules::organize::apply),
];

/// Applies the enabled rules to a document and serializes the result
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline; the configuration is validated first
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over `doc` in place
    #[instrument(skip_all)]
    pub fn apply(&self, doc: &mut PomDocument) -> Result<()> {
        for (name, stage) in STAGES {
            debug!(stage = name, "running stage");
            stage(doc, &self.config)?;
        }
        Ok(())
    }

    /// Parse, rewrite and serialize a whole document
    #[instrument(skip_all, fields(bytes = input.len()))]
    pub fn process_str(&self, input: &str) -> Result<String> {
        let mut doc = PomDocument::parse(input)?;
        self.apply(&mut doc)?;
        Ok(doc.write(self.config.layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.sort.enabled = false;
        config.sort.by_scope = true;
        let err = Pipeline::new(config).err();
        assert_eq!(err.as_ref().map(|e| e.kind()), Some(&ErrorKind::InvalidConfig));
    }

    #[test]
    fn test_parse_error_produces_no_output() -> Result<()> {
        let pipeline = Pipeline::new(PipelineConfig::default())?;
        assert!(pipeline.process_str("<project><dependencies></project>").is_err());
        Ok(())
    }

    #[test]
    fn test_passthrough_only_reformats() -> Result<()> {
        let pipeline = Pipeline::new(PipelineConfig::passthrough())?;
        let output = pipeline.process_str(
            "<project><dependencies><dependency><version>1</version><groupId>g</groupId>\
             <scope>compile</scope></dependency></dependencies></project>",
        )?;
        assert!(output.contains("<version>1</version>"));
        assert!(output.contains("<scope>compile</scope>"));
        assert!(!output.contains("<properties>"));
        Ok(())
    }
}
