use anyhow::{anyhow, Context, Result};
use fstar_deps_shared_types::{FStarConf, RelativePath, WorkingDirectory};
use log::{debug, info};
use std::path::{Path, PathBuf};

pub mod catalog;
pub mod conf;
pub mod dep_output;
pub mod errors;

pub use catalog::StandardCatalog;
pub use dep_output::{parse_dep_output, parse_dep_output_verified, FStarDepOutput};
pub use errors::DepOutputError;

/// Where the raw `--find_deps` listing comes from.
#[derive(Debug, Clone)]
pub enum DepOutputInput {
    /// stdout of an earlier run, captured to a file.
    Captured(PathBuf),
    Invoke {
        fstar_exe: PathBuf,
        extra_args: Vec<String>,
    },
}

async fn read_dep_output(
    input: &DepOutputInput,
    relative_source_path: &RelativePath,
    working_directory: &Path,
) -> Result<String> {
    match input {
        DepOutputInput::Captured(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("While attempting to read dependency output {:?}", path)),
        DepOutputInput::Invoke {
            fstar_exe,
            extra_args,
        } => {
            use tokio::process::Command;
            let mut command = Command::new(fstar_exe);
            command.args(extra_args);
            command.arg("--find_deps").arg(relative_source_path.as_str());
            command.current_dir(working_directory);
            command.kill_on_drop(true);

            let output = command
                .output()
                .await
                .with_context(|| format!("Failed to spawn {:?}", fstar_exe))?;
            if !output.status.success() {
                return Err(anyhow!(
                    "Failed to run program {:#?}, exited with {}: {}",
                    command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                ));
            }
            String::from_utf8(output.stdout)
                .with_context(|| format!("Output of {:?} was not valid utf-8", fstar_exe))
        }
    }
}

fn absolute_working_directory(working_directory: &Path) -> Result<PathBuf> {
    if working_directory.is_absolute() {
        Ok(working_directory.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(working_directory))
    }
}

/// Runs the whole extraction step for one source file and writes the result as json to
/// `output`.
pub async fn extract_fstar_deps(
    relative_source_path: String,
    working_directory: PathBuf,
    dep_output: DepOutputInput,
    conf_path: Option<PathBuf>,
    output: PathBuf,
) -> Result<()> {
    let working_directory = absolute_working_directory(&working_directory)?;
    let work_dir = WorkingDirectory::parse(&working_directory.to_string_lossy())
        .with_context(|| format!("Invalid working directory {:?}", working_directory))?;
    let source = RelativePath::parse(&relative_source_path)
        .with_context(|| format!("Invalid source path {:?}", relative_source_path))?;

    let conf: FStarConf = match conf_path.as_ref() {
        Some(p) => conf::read_all_fstar_conf(p, &working_directory)?,
        None => FStarConf::default(),
    };

    let standard_catalog = StandardCatalog::from_distribution(&work_dir, &conf.standard_library)
        .with_context(|| "Loading the standard library catalog")?;
    debug!("Standard catalog has {} entries", standard_catalog.len());

    let raw_output = read_dep_output(&dep_output, &source, &working_directory).await?;

    let deps = FStarDepOutput::parse(
        &raw_output,
        source,
        &work_dir,
        &standard_catalog,
        conf.verify_trailing_source(),
    )
    .with_context(|| format!("Error while parsing dependencies of {}", relative_source_path))?;

    info!(
        "{} has {} dependencies ({} from the standard library)",
        deps.source,
        deps.value.len(),
        deps.value.iter().filter(|e| e.is_standard()).count()
    );

    let extracted = deps.into_extracted_deps(&work_dir);
    tokio::fs::write(&output, serde_json::to_string_pretty(&extracted)?)
        .await
        .with_context(|| format!("Writing output {:?}", output))?;
    Ok(())
}
