use fstar_deps_shared_types::PathError;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DepOutputError {
    #[error("`--find_deps` output had no entries, expected at least the analyzed source file")]
    EmptyOutput,
    #[error("Dependency entry '{entry}' is not a well formed absolute path")]
    MalformedPath {
        entry: String,
        #[source]
        source: PathError,
    },
    #[error("Dependency entry '{entry}' cannot be expressed relative to the working directory")]
    OutsideWorkingDirectory {
        entry: String,
        #[source]
        source: PathError,
    },
    #[error("`--find_deps` did not end with the top-level source file, expected {expected} but saw '{found}'")]
    UnexpectedTrailingEntry { expected: String, found: String },
}
