use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use fstar_deps_shared_types::{
    path::{case_fold, eq_ignore_case},
    AbsolutePath, BuildObject, RelativePath, StandardLibraryConf,
    WorkingDirectory,
};
use log::debug;
use walkdir::WalkDir;

/// The files that ship with the F* distribution, looked up by workspace relative path
/// ignoring case.
///
/// Read only once built, so a single catalog can be shared by every parse in a build.
#[derive(Debug, Clone, Default)]
pub struct StandardCatalog {
    entries: Vec<BuildObject>,
    by_folded_path: HashMap<String, usize>,
}

impl StandardCatalog {
    pub fn new(entries: Vec<BuildObject>) -> StandardCatalog {
        let mut by_folded_path = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            // Earlier entries shadow later ones that only differ by case.
            by_folded_path
                .entry(case_fold(entry.path.as_str()))
                .or_insert(idx);
        }
        StandardCatalog {
            entries,
            by_folded_path,
        }
    }

    pub fn lookup(&self, path: &RelativePath) -> Option<&BuildObject> {
        self.by_folded_path
            .get(&case_fold(path.as_str()))
            .map(|idx| &self.entries[*idx])
    }

    pub fn entries(&self) -> &[BuildObject] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers every library file found below the configured roots, then the extra paths.
    pub fn from_distribution(
        working_directory: &WorkingDirectory,
        conf: &StandardLibraryConf,
    ) -> Result<StandardCatalog> {
        let mut entries: Vec<BuildObject> = Vec::default();

        for root in conf.roots.iter() {
            let relative_root = RelativePath::parse(root)
                .with_context(|| format!("Invalid standard library root {:?}", root))?;
            let root_dir = working_directory.absolute_path_of(&relative_root).to_string();

            if !std::path::Path::new(&root_dir).is_dir() {
                return Err(anyhow!(
                    "Standard library root {:?} doesn't exist, looked for it at {:?}",
                    root,
                    root_dir
                ));
            }

            for entry in WalkDir::new(&root_dir).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Walking {:?}", root_dir))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let matches_extension = entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|ext| {
                        conf.file_extensions
                            .iter()
                            .any(|wanted| eq_ignore_case(wanted, ext))
                    })
                    .unwrap_or(false);
                if !matches_extension {
                    continue;
                }

                let file_path = entry.path().to_string_lossy();
                let absolute = AbsolutePath::parse(file_path.as_ref())?;
                let relative = working_directory.map_to_build_object_path(&absolute)?;
                entries.push(BuildObject::standard(relative));
            }
        }

        for extra in conf.extra_paths.iter() {
            let relative = RelativePath::parse(extra)
                .with_context(|| format!("Invalid standard library path {:?}", extra))?;
            entries.push(BuildObject::standard(relative));
        }

        debug!(
            "Loaded {} standard library entries from {:?}",
            entries.len(),
            conf.roots
        );
        Ok(StandardCatalog::new(entries))
    }
}

impl From<Vec<BuildObject>> for StandardCatalog {
    fn from(entries: Vec<BuildObject>) -> Self {
        StandardCatalog::new(entries)
    }
}

impl FromIterator<BuildObject> for StandardCatalog {
    fn from_iter<I: IntoIterator<Item = BuildObject>>(iter: I) -> Self {
        StandardCatalog::new(iter.into_iter().collect())
    }
}
