use serde::{Deserialize, Serialize};

/// Where the files shipped with the F* distribution live, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandardLibraryConf {
    #[serde(default)]
    pub roots: Vec<String>,

    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,

    /// Individual files to register in addition to whatever the roots contain.
    #[serde(default)]
    pub extra_paths: Vec<String>,
}

pub fn default_file_extensions() -> Vec<String> {
    vec!["fst".to_string(), "fsti".to_string()]
}

impl Default for StandardLibraryConf {
    fn default() -> Self {
        Self {
            roots: Vec::default(),
            file_extensions: default_file_extensions(),
            extra_paths: Vec::default(),
        }
    }
}

impl StandardLibraryConf {
    pub fn merge(&mut self, other: StandardLibraryConf) {
        self.roots.extend(other.roots.into_iter());
        self.roots.sort();
        self.roots.dedup();

        self.file_extensions
            .extend(other.file_extensions.into_iter());
        self.file_extensions.sort();
        self.file_extensions.dedup();

        self.extra_paths.extend(other.extra_paths.into_iter());
        self.extra_paths.sort();
        self.extra_paths.dedup();
    }
}
