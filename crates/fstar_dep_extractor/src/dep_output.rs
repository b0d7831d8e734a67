use fstar_deps_shared_types::{
    api::extracted_deps::ExtractedDeps, AbsolutePath, BuildObject, OrderPreservingSet,
    RelativePath, SourceType, WorkingDirectory,
};
use log::debug;

use crate::{catalog::StandardCatalog, errors::DepOutputError};

/// The dependencies `fstar --find_deps` reported for one top-level source file.
#[derive(Debug, PartialEq, Eq)]
pub struct FStarDepOutput {
    pub source: RelativePath,
    pub value: OrderPreservingSet<BuildObject>,
}

impl FStarDepOutput {
    pub fn parse(
        output: &str,
        source: RelativePath,
        working_directory: &WorkingDirectory,
        standard_catalog: &StandardCatalog,
        verify_trailing_source: bool,
    ) -> Result<FStarDepOutput, DepOutputError> {
        let value = if verify_trailing_source {
            parse_dep_output_verified(output, working_directory, standard_catalog, &source)?
        } else {
            parse_dep_output(output, working_directory, standard_catalog)?
        };
        Ok(FStarDepOutput { source, value })
    }

    pub fn into_extracted_deps(self, working_directory: &WorkingDirectory) -> ExtractedDeps {
        ExtractedDeps {
            source: self.source.to_string(),
            working_directory: working_directory.to_string(),
            dependencies: self.value,
        }
    }
}

fn split_entries(output: &str) -> Vec<&str> {
    output
        .split('\n')
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Turns the listing printed by `fstar --find_deps` into build objects.
///
/// The final line names the analyzed file itself and is dropped without being checked,
/// see [`parse_dep_output_verified`] for the strict variant. Entries matching a catalog
/// path (ignoring case) resolve to the catalog's object, anything else becomes a tools
/// source. Repeated entries keep their first position.
pub fn parse_dep_output(
    output: &str,
    working_directory: &WorkingDirectory,
    standard_catalog: &StandardCatalog,
) -> Result<OrderPreservingSet<BuildObject>, DepOutputError> {
    let mut entries = split_entries(output);
    if entries.pop().is_none() {
        return Err(DepOutputError::EmptyOutput);
    }
    resolve_entries(&entries, working_directory, standard_catalog)
}

/// Like [`parse_dep_output`], but fails unless the final line is `source`.
pub fn parse_dep_output_verified(
    output: &str,
    working_directory: &WorkingDirectory,
    standard_catalog: &StandardCatalog,
    source: &RelativePath,
) -> Result<OrderPreservingSet<BuildObject>, DepOutputError> {
    let mut entries = split_entries(output);
    let last = entries.pop().ok_or(DepOutputError::EmptyOutput)?;

    let trailing = to_relative_path(last, working_directory)?;
    if !trailing.eq_ignore_case(source) {
        return Err(DepOutputError::UnexpectedTrailingEntry {
            expected: working_directory.absolute_path_of(source).to_string(),
            found: last.to_string(),
        });
    }
    resolve_entries(&entries, working_directory, standard_catalog)
}

fn to_relative_path(
    entry: &str,
    working_directory: &WorkingDirectory,
) -> Result<RelativePath, DepOutputError> {
    let absolute = AbsolutePath::parse(entry).map_err(|source| DepOutputError::MalformedPath {
        entry: entry.to_string(),
        source,
    })?;
    working_directory
        .map_to_build_object_path(&absolute)
        .map_err(|source| DepOutputError::OutsideWorkingDirectory {
            entry: entry.to_string(),
            source,
        })
}

fn resolve_entries(
    entries: &[&str],
    working_directory: &WorkingDirectory,
    standard_catalog: &StandardCatalog,
) -> Result<OrderPreservingSet<BuildObject>, DepOutputError> {
    let mut set = OrderPreservingSet::with_capacity(entries.len());
    for entry in entries {
        let relative = to_relative_path(entry, working_directory)?;
        let build_object = match standard_catalog.lookup(&relative) {
            Some(std_dep) => std_dep.clone(),
            None => BuildObject::source(relative, SourceType::Tools),
        };
        if !set.insert(build_object) {
            debug!("Skipping repeated dependency entry {}", entry);
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fstar_deps_shared_types::{Origin, PathError};

    fn rel(s: &str) -> RelativePath {
        RelativePath::parse(s).unwrap()
    }

    fn work() -> WorkingDirectory {
        WorkingDirectory::parse("/work").unwrap()
    }

    fn tools(s: &str) -> BuildObject {
        BuildObject::source(rel(s), SourceType::Tools)
    }

    fn paths(set: &OrderPreservingSet<BuildObject>) -> Vec<&str> {
        set.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn single_entry_is_only_the_source() {
        let set =
            parse_dep_output("/work/Foo.fst\n", &work(), &StandardCatalog::default()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn empty_output_is_an_error() {
        for output in ["", "\n", "\n\n  \r\n"] {
            assert_eq!(
                parse_dep_output(output, &work(), &StandardCatalog::default()),
                Err(DepOutputError::EmptyOutput)
            );
        }
    }

    #[test]
    fn keeps_first_occurrence_order() {
        let output = "/work/A.fst\n/work/B.fst\n/work/A.fst\n/work/C.fst\n/work/S.fst\n";
        let set = parse_dep_output(output, &work(), &StandardCatalog::default()).unwrap();
        assert_eq!(paths(&set), vec!["A.fst", "B.fst", "C.fst"]);
        assert!(set
            .iter()
            .all(|e| e.origin == Origin::Source(SourceType::Tools)));
    }

    #[test]
    fn blank_lines_and_crlf_are_ignored() {
        let output = "\r\n/work/src/A.fst\r\n\r\n   \n/work/src/B.fst\r\n/work/src/S.fst\r\n\r\n";
        let set = parse_dep_output(output, &work(), &StandardCatalog::default()).unwrap();
        assert_eq!(set.into_vec(), vec![tools("src/A.fst"), tools("src/B.fst")]);
    }

    #[test]
    fn catalog_matches_ignore_case() {
        let catalog = StandardCatalog::new(vec![
            BuildObject::standard(rel("lib/Prims.fst")),
            BuildObject::source(rel("lib/FStar.All.fst"), SourceType::PrebakedObjExpected),
        ]);
        let output = "/work/LIB/PRIMS.FST\n/work/lib/fstar.all.FST\n/work/lib/Prims.fst\n/work/src/Foo.fst\n";

        let set = parse_dep_output(output, &work(), &catalog).unwrap();
        assert_eq!(
            set.into_vec(),
            vec![
                BuildObject::standard(rel("lib/Prims.fst")),
                BuildObject::source(rel("lib/FStar.All.fst"), SourceType::PrebakedObjExpected),
            ]
        );
    }

    #[test]
    fn unmatched_entries_become_tools_sources() {
        let catalog = StandardCatalog::new(vec![BuildObject::standard(rel("lib/Prims.fst"))]);
        let output = "/work/src/Bar.Baz.fst\n/work/src/Foo.fst\n";
        let set = parse_dep_output(output, &work(), &catalog).unwrap();
        assert_eq!(set.into_vec(), vec![tools("src/Bar.Baz.fst")]);
    }

    #[test]
    fn source_entries_keep_their_spelling() {
        // Only catalog matches fold case, sources differing in case stay separate nodes.
        let output = "/work/src/A.fst\n/work/SRC/a.fst\n/work/src/A.fst\n/work/src/Foo.fst\n";
        let set = parse_dep_output(output, &work(), &StandardCatalog::default()).unwrap();
        assert_eq!(set.into_vec(), vec![tools("src/A.fst"), tools("SRC/a.fst")]);
    }

    #[test]
    fn working_directory_prefix_ignores_case() {
        let working_directory = WorkingDirectory::parse(r"C:\Work\IronClad").unwrap();
        let output = "c:\\work\\ironclad\\src\\Bar.fst\nC:/Work/IronClad/src/Foo.fst\n";
        let set =
            parse_dep_output(output, &working_directory, &StandardCatalog::default()).unwrap();
        assert_eq!(set.into_vec(), vec![tools("src/Bar.fst")]);
    }

    #[test]
    fn malformed_entry_fails_the_whole_call() {
        let output = "/work/A.fst\nsrc/B.fst\n/work/S.fst\n";
        assert_eq!(
            parse_dep_output(output, &work(), &StandardCatalog::default()),
            Err(DepOutputError::MalformedPath {
                entry: "src/B.fst".to_string(),
                source: PathError::NotAbsolute("src/B.fst".to_string()),
            })
        );
    }

    #[test]
    fn malformed_trailing_entry_is_not_inspected() {
        let set = parse_dep_output(
            "/work/A.fst\nnot a path\n",
            &work(),
            &StandardCatalog::default(),
        )
        .unwrap();
        assert_eq!(set.into_vec(), vec![tools("A.fst")]);
    }

    #[test]
    fn entries_outside_the_working_directory_fail() {
        let result = parse_dep_output(
            "/opt/fstar/lib/prims.fst\n/work/S.fst\n",
            &work(),
            &StandardCatalog::default(),
        );
        assert!(matches!(
            result,
            Err(DepOutputError::OutsideWorkingDirectory { entry, .. }) if entry == "/opt/fstar/lib/prims.fst"
        ));
    }

    #[test]
    fn parsing_is_deterministic() {
        let catalog = StandardCatalog::new(vec![BuildObject::standard(rel("lib/Prims.fst"))]);
        let output = "/work/src/C.fst\n/work/lib/prims.fst\n/work/src/A.fst\n/work/src/C.fst\n/work/src/B.fst\n/work/src/S.fst\n";
        let first = parse_dep_output(output, &work(), &catalog).unwrap();
        let second = parse_dep_output(output, &work(), &catalog).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            paths(&first),
            vec!["src/C.fst", "lib/Prims.fst", "src/A.fst", "src/B.fst"]
        );
    }

    #[test]
    fn verified_parse_checks_the_trailing_entry() {
        let catalog = StandardCatalog::default();
        let output = "/work/src/A.fst\n/work/SRC/foo.FST\n";

        let set = parse_dep_output_verified(output, &work(), &catalog, &rel("src/Foo.fst")).unwrap();
        assert_eq!(set.into_vec(), vec![tools("src/A.fst")]);

        assert_eq!(
            parse_dep_output_verified(output, &work(), &catalog, &rel("src/Bar.fst")),
            Err(DepOutputError::UnexpectedTrailingEntry {
                expected: "/work/src/Bar.fst".to_string(),
                found: "/work/SRC/foo.FST".to_string(),
            })
        );

        assert_eq!(
            parse_dep_output_verified("", &work(), &catalog, &rel("src/Foo.fst")),
            Err(DepOutputError::EmptyOutput)
        );
    }

    #[test]
    fn dep_output_into_extracted_deps() {
        let output = FStarDepOutput::parse(
            "/work/src/A.fst\n/work/src/Foo.fst\n",
            rel("src/Foo.fst"),
            &work(),
            &StandardCatalog::default(),
            true,
        )
        .unwrap();
        let extracted = output.into_extracted_deps(&work());
        assert_eq!(extracted.source, "src/Foo.fst");
        assert_eq!(extracted.working_directory, "/work");
        assert_eq!(extracted.dependencies.into_vec(), vec![tools("src/A.fst")]);
    }
}
