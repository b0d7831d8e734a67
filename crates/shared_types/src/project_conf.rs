use serde::{Deserialize, Serialize};

use crate::standard_library_config::StandardLibraryConf;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FStarConf {
    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub standard_library: StandardLibraryConf,

    /// Check that `--find_deps` ended its listing with the file we asked about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_trailing_source: Option<bool>,
}

impl FStarConf {
    /// The first file to set a value wins, so the main config overrides its includes.
    pub fn merge(&mut self, other: FStarConf) {
        self.includes.extend(other.includes.into_iter());
        self.includes.sort();
        self.includes.dedup();

        self.standard_library.merge(other.standard_library);

        if self.verify_trailing_source.is_none() {
            self.verify_trailing_source = other.verify_trailing_source;
        }
    }

    pub fn verify_trailing_source(&self) -> bool {
        self.verify_trailing_source.unwrap_or(true)
    }
}
