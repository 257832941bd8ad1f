use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use ellgraph_annotate::{FunctionLabeler, FunctionRules, HeadPercolator, HeadRules, SubsumptionPolicy};
use ellgraph_convert::ConverterConfig;
use serde::{Deserialize, Serialize};

/// Pipeline configuration.
///
/// Every section is optional, missing sections and fields take their
/// default values.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub converter: ConverterConfig,
    pub heads: HeadRules,
    pub functions: FunctionRules,
    pub subsumption: SubsumptionPolicy,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open configuration {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse configuration {}", path.display()))
    }

    pub fn head_percolator(&self) -> HeadPercolator {
        HeadPercolator::new(self.heads.clone())
    }

    pub fn function_labeler(&self) -> FunctionLabeler {
        FunctionLabeler::new(self.functions.clone()).subsumption(self.subsumption)
    }
}
