mod config;
mod emit;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use st_core::{GroupedTables, ScopeConfig, SigTableError};
use st_generator::generate_tables;
use st_loader::GoSourceTree;
use tracing::info;

pub use config::{
    default_std_scopes, load_config_file, parse_config, GeneratorConfig, ScopeEntry,
    DEFAULT_PACKAGE_NAME, DEFAULT_STD_PACKAGES,
};
pub use emit::{go_quote, render, render_go_source, render_json, OutputFormat, GENERATED_HEADER};
pub use st_loader::BuildTarget;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub scopes: Vec<ScopeConfig>,
    pub source_root: PathBuf,
    pub target: BuildTarget,
    pub package: String,
    pub format: OutputFormat,
}

impl GenerateOptions {
    pub fn from_config(config: &GeneratorConfig, goroot: &Path) -> Self {
        let target = BuildTarget::new(
            config.goos.clone().unwrap_or_else(|| "linux".to_string()),
            config.goarch.clone().unwrap_or_else(|| "amd64".to_string()),
        )
        .with_tags(config.tags.iter().cloned());
        Self {
            scopes: config.scopes(),
            source_root: goroot.join("src"),
            target,
            package: config
                .package
                .clone()
                .unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string()),
            format: OutputFormat::Go,
        }
    }
}

pub fn resolve_goroot(
    explicit: Option<PathBuf>,
    env_goroot: Option<OsString>,
) -> Result<PathBuf, SigTableError> {
    explicit
        .or_else(|| {
            env_goroot
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
        .ok_or_else(|| {
            SigTableError::new(
                "CONFIG_GOROOT",
                "No Go root given: pass --goroot or set GOROOT.",
            )
        })
}

pub fn generate_from_source_tree(options: &GenerateOptions) -> Result<GroupedTables, SigTableError> {
    info!(
        root = %options.source_root.display(),
        goos = %options.target.goos,
        goarch = %options.target.goarch,
        scopes = options.scopes.len(),
        "reading Go source tree"
    );
    let mut tree = GoSourceTree::new(&options.source_root, options.target.clone());
    generate_tables(&mut tree, options.scopes.clone())
}

pub fn generate_artifact(options: &GenerateOptions) -> Result<String, SigTableError> {
    let tables = generate_from_source_tree(options)?;
    render(&tables, &options.package, options.format)
}
