use std::ffi::OsString;

use clap::Parser;
use st_api::{
    generate_artifact, load_config_file, resolve_goroot, GenerateOptions, GeneratorConfig,
};
use st_core::SigTableError;
use tracing::info;

mod cli_args;
mod error_map;
mod output;

pub(crate) use cli_args::Cli;
pub(crate) use error_map::{emit_error, map_emit_write};
pub(crate) use output::write_artifact;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, SigTableError> {
    let options = build_options(&cli, std::env::var_os("GOROOT"))?;
    let artifact = generate_artifact(&options)?;
    write_artifact(cli.output.as_deref(), &artifact)?;
    if let Some(path) = &cli.output {
        info!(output = %path.display(), bytes = artifact.len(), "wrote signature table");
    }
    Ok(0)
}

fn build_options(
    cli: &Cli,
    env_goroot: Option<OsString>,
) -> Result<GenerateOptions, SigTableError> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(goos) = &cli.goos {
        config.goos = Some(goos.clone());
    }
    if let Some(goarch) = &cli.goarch {
        config.goarch = Some(goarch.clone());
    }
    if let Some(package) = &cli.package {
        config.package = Some(package.clone());
    }

    let goroot = resolve_goroot(cli.goroot.clone(), env_goroot)?;
    let mut options = GenerateOptions::from_config(&config, &goroot);
    options.format = cli.format.into();
    Ok(options)
}
