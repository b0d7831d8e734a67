use serde::{Deserialize, Serialize};

use crate::path::RelativePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Project authored source.
    Src,
    /// Source that belongs to the toolchain checked into the tree.
    Tools,
    PrebakedObjExpected,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Src => write!(f, "src"),
            SourceType::Tools => write!(f, "tools"),
            SourceType::PrebakedObjExpected => write!(f, "prebaked_obj_expected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    /// Ships with the F* distribution.
    StandardDistribution,
    Source(SourceType),
}

/// A file participating in the build graph, identified by its workspace relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "BuildObjectRepr", into = "BuildObjectRepr")]
pub struct BuildObject {
    pub path: RelativePath,
    pub origin: Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OriginTag {
    StandardDistribution,
    Source,
}

// On disk the origin is flattened next to the path.
#[derive(Serialize, Deserialize)]
struct BuildObjectRepr {
    path: RelativePath,
    origin: OriginTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_type: Option<SourceType>,
}

impl From<BuildObject> for BuildObjectRepr {
    fn from(value: BuildObject) -> Self {
        let (origin, source_type) = match value.origin {
            Origin::StandardDistribution => (OriginTag::StandardDistribution, None),
            Origin::Source(source_type) => (OriginTag::Source, Some(source_type)),
        };
        BuildObjectRepr {
            path: value.path,
            origin,
            source_type,
        }
    }
}

impl TryFrom<BuildObjectRepr> for BuildObject {
    type Error = String;

    fn try_from(value: BuildObjectRepr) -> Result<Self, Self::Error> {
        let origin = match (value.origin, value.source_type) {
            (OriginTag::StandardDistribution, None) => Origin::StandardDistribution,
            (OriginTag::Source, Some(source_type)) => Origin::Source(source_type),
            (OriginTag::StandardDistribution, Some(_)) => {
                return Err(format!(
                    "standard distribution dependency {} cannot carry a source_type",
                    value.path
                ))
            }
            (OriginTag::Source, None) => {
                return Err(format!("source dependency {} is missing its source_type", value.path))
            }
        };
        Ok(BuildObject {
            path: value.path,
            origin,
        })
    }
}

impl BuildObject {
    pub fn standard(path: RelativePath) -> BuildObject {
        BuildObject {
            path,
            origin: Origin::StandardDistribution,
        }
    }

    pub fn source(path: RelativePath, source_type: SourceType) -> BuildObject {
        BuildObject {
            path,
            origin: Origin::Source(source_type),
        }
    }

    pub fn is_standard(&self) -> bool {
        self.origin == Origin::StandardDistribution
    }
}

impl std::fmt::Display for BuildObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.origin {
            Origin::StandardDistribution => write!(f, "std:{}", self.path),
            Origin::Source(source_type) => write!(f, "{}:{}", source_type, self.path),
        }
    }
}
