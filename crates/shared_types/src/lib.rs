pub mod api;
pub mod build_object;
pub mod ordered_set;
pub mod path;
mod project_conf;
pub mod standard_library_config;

pub use build_object::{BuildObject, Origin, SourceType};
pub use ordered_set::OrderPreservingSet;
pub use path::{AbsolutePath, PathError, RelativePath, WorkingDirectory};
pub use project_conf::FStarConf;
pub use standard_library_config::StandardLibraryConf;
