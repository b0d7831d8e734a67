use anyhow::{anyhow, Result};
use clap::Parser;
use log::debug;
use std::path::PathBuf;
use std::time::Instant;

use fstar_dep_extractor as fde;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Opt {
    #[clap(long)]
    /// the analyzed source file, relative to the working directory
    relative_source_path: String,

    #[clap(long)]
    working_directory: PathBuf,

    #[clap(long)]
    output: PathBuf,

    /// Captured stdout of `fstar --find_deps`
    #[clap(long, conflicts_with = "fstar_exe")]
    dep_output: Option<PathBuf>,

    /// Run this F* binary with `--find_deps` instead of reading captured output
    #[clap(long)]
    fstar_exe: Option<PathBuf>,

    /// Extra arguments passed to F* ahead of `--find_deps`
    #[clap(long)]
    fstar_arg: Vec<String>,

    #[clap(long)]
    conf: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.format_timestamp_nanos();
    builder.target(pretty_env_logger::env_logger::Target::Stderr);
    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else {
        builder.parse_filters("warn,fstar_dep_extractor=info,fstar_deps_shared_types=info");
    }
    builder.init();

    let start_time = Instant::now();

    let dep_output = match (opt.dep_output, opt.fstar_exe) {
        (Some(path), _) => fde::DepOutputInput::Captured(path),
        (None, Some(fstar_exe)) => fde::DepOutputInput::Invoke {
            fstar_exe,
            extra_args: opt.fstar_arg,
        },
        (None, None) => return Err(anyhow!("One of --dep-output or --fstar-exe is required")),
    };

    fde::extract_fstar_deps(
        opt.relative_source_path,
        opt.working_directory,
        dep_output,
        opt.conf,
        opt.output,
    )
    .await?;

    debug!("took {:?}", start_time.elapsed());
    Ok(())
}
