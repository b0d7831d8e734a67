use std::{
    collections::{HashSet, VecDeque},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fstar_deps_shared_types::FStarConf;
use log::debug;
use serde::de::DeserializeOwned;

pub fn read_json_file<T: DeserializeOwned>(p: &Path) -> Result<T> {
    let contents =
        std::fs::read_to_string(p).with_context(|| format!("Opening json file {:?}", p))?;
    serde_json::from_str(&contents).with_context(|| format!("Parsing json file {:?}", p))
}

// Config paths are relative to the working directory. Canonical where possible so that two
// spellings of one include are only read once.
fn resolve_conf_path(working_directory: &Path, path: &Path) -> PathBuf {
    let joined = working_directory.join(path);
    joined.canonicalize().unwrap_or(joined)
}

/// Loads `conf_path` together with every config it includes, directly or through other
/// includes.
///
/// Files are read breadth first, includes in the order they are listed, and each file at
/// most once. That reading order is the precedence order: `verify_trailing_source` comes
/// from the first file that sets it. Library roots, extensions and extra paths from all
/// files are unioned.
pub fn read_all_fstar_conf(conf_path: &Path, working_directory: &Path) -> Result<FStarConf> {
    let main_path = resolve_conf_path(working_directory, conf_path);
    let mut visited: HashSet<PathBuf> = HashSet::from([main_path.clone()]);
    let mut pending: VecDeque<PathBuf> = VecDeque::from([main_path]);
    let mut merged: Option<FStarConf> = None;

    while let Some(path) = pending.pop_front() {
        let mut conf: FStarConf = read_json_file(&path)
            .with_context(|| format!("Reading F* config {}", path.display()))?;

        for include in std::mem::take(&mut conf.includes) {
            let include_path = resolve_conf_path(working_directory, Path::new(&include));
            if visited.insert(include_path.clone()) {
                pending.push_back(include_path);
            } else {
                debug!(
                    "{} includes {}, which was already read",
                    path.display(),
                    include_path.display()
                );
            }
        }

        merged = Some(match merged.take() {
            Some(mut acc) => {
                acc.merge(conf);
                acc
            }
            None => conf,
        });
    }

    Ok(merged.unwrap_or_default())
}
