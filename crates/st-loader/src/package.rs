use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use st_core::SigTableError;
use st_parser::{find_build_constraint, parse_build_constraint, ConstValue, GoFile, TypeSpec};
use tracing::debug;
use walkdir::WalkDir;

use crate::target::BuildTarget;

#[derive(Debug, Clone)]
pub(crate) struct TypeEntry {
    pub file: usize,
    pub spec: TypeSpec,
}

#[derive(Debug, Clone)]
pub(crate) struct LoadedPackage {
    pub path: String,
    pub name: String,
    pub files: Vec<GoFile>,
    pub types: BTreeMap<String, TypeEntry>,
    pub consts: BTreeMap<String, (usize, ConstValue)>,
}

pub(crate) fn load_package(
    root: &Path,
    path: &str,
    target: &BuildTarget,
) -> Result<LoadedPackage, SigTableError> {
    let dir = root.join(path);
    if !dir.is_dir() {
        return Err(SigTableError::new(
            "SCOPE_NOT_FOUND",
            format!("Package \"{}\" not found under {}.", path, root.display()),
        ));
    }

    let mut parsed = Vec::new();
    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|error| map_scan_error(path, error))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !is_candidate_file(&file_name, target) {
            continue;
        }

        let source = fs::read_to_string(entry.path()).map_err(|error| {
            SigTableError::new(
                "SCOPE_READ",
                format!("Failed to read {}: {}", entry.path().display(), error),
            )
        })?;
        if let Some(expr) = find_build_constraint(&source) {
            let constraint = parse_build_constraint(&expr).map_err(|error| SigTableError {
                message: format!("{}/{}: {}", path, file_name, error.message),
                ..error
            })?;
            if !constraint.eval(&|tag| target.has_tag(tag)) {
                debug!(package = path, file = %file_name, "build constraint excludes file");
                continue;
            }
        }

        let file = st_parser::parse_go_file(&format!("{}/{}", path, file_name), &source)?;
        if file.imports_path("C") {
            debug!(package = path, file = %file_name, "skipping cgo file");
            continue;
        }
        parsed.push(file);
    }

    if parsed.is_empty() {
        return Err(SigTableError::new(
            "SCOPE_EMPTY",
            format!("Package \"{}\" has no Go files for {}/{}.", path, target.goos, target.goarch),
        ));
    }

    let name = majority_package_name(&parsed);
    let files = parsed
        .into_iter()
        .filter(|file| file.package == name)
        .collect::<Vec<_>>();

    let mut types = BTreeMap::new();
    let mut consts = BTreeMap::new();
    for (index, file) in files.iter().enumerate() {
        for spec in &file.types {
            types.entry(spec.name.clone()).or_insert_with(|| TypeEntry {
                file: index,
                spec: spec.clone(),
            });
        }
        for constant in &file.consts {
            if let Some(value) = &constant.value {
                consts
                    .entry(constant.name.clone())
                    .or_insert_with(|| (index, value.clone()));
            }
        }
    }

    debug!(
        package = path,
        name = %name,
        files = files.len(),
        types = types.len(),
        "loaded package"
    );

    Ok(LoadedPackage {
        path: path.to_string(),
        name,
        files,
        types,
        consts,
    })
}

fn is_candidate_file(file_name: &str, target: &BuildTarget) -> bool {
    file_name.ends_with(".go")
        && !file_name.ends_with("_test.go")
        && !file_name.starts_with('_')
        && !file_name.starts_with('.')
        && target.matches_file_name(file_name)
}

// Ties go to the name seen first. `main` and `_test` packages only count
// when nothing else is present.
fn majority_package_name(files: &[GoFile]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for file in files {
        match counts.iter_mut().find(|(name, _)| *name == file.package) {
            Some((_, count)) => *count += 1,
            None => counts.push((&file.package, 1)),
        }
    }
    let is_library = |name: &str| name != "main" && !name.ends_with("_test");
    let has_library = counts.iter().any(|(name, _)| is_library(name));

    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if has_library && !is_library(name) {
            continue;
        }
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string()).unwrap_or_default()
}

fn map_scan_error(path: &str, error: walkdir::Error) -> SigTableError {
    SigTableError::new(
        "SCOPE_READ",
        format!("Failed to scan package \"{}\": {}", path, error),
    )
}
