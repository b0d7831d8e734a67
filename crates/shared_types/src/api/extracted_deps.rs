use serde::{Deserialize, Serialize};

use crate::{BuildObject, OrderPreservingSet};

/// Result file written by the dependency extractor for one top-level source file.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedDeps {
    pub source: String,
    pub working_directory: String,
    pub dependencies: OrderPreservingSet<BuildObject>,
}
