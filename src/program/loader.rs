//! Loading a program from a directory tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use super::{Program, ProgramBuilder};
use crate::config::Config;
use crate::error::{Error, Result};

/// `module` directive of a `go.mod` file.
static MODULE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*module\s+"?([^\s"]+)"?"#).expect("valid regex"));

impl Program {
    /// Load the Go package in `dir` and every package below it.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Program> {
        Self::load_with(dir, &Config::default())
    }

    /// Load with explicit configuration.
    pub fn load_with<P: AsRef<Path>>(dir: P, config: &Config) -> Result<Program> {
        let dir = dir.as_ref();
        let root = fs::canonicalize(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let import_path = match &config.module_path {
            Some(path) => path.clone(),
            None => import_path_of(&root)?,
        };
        debug!(dir = %root.display(), import_path = %import_path, "loading program");

        let packages = collect_packages(&root, config)?;
        if packages.is_empty() {
            return Err(Error::NoPackages(dir.to_path_buf()));
        }

        let mut builder = ProgramBuilder::new().with_config(config.clone());
        // The loaded directory itself is the root package; BTreeMap puts the
        // empty relative path first.
        for (relative, files) in packages {
            let package_path = if relative.as_os_str().is_empty() {
                import_path.clone()
            } else {
                format!("{}/{}", import_path, to_slash(&relative))
            };

            let mut sources = Vec::with_capacity(files.len());
            for file in files {
                let source = fs::read_to_string(&file).map_err(|source| Error::Io {
                    path: file.clone(),
                    source,
                })?;
                sources.push((file.display().to_string(), source));
            }
            builder = builder.package(package_path, sources);
        }
        builder.build()
    }
}

/// Go files per package directory, relative to `root`, in sorted order.
fn collect_packages(root: &Path, config: &Config) -> Result<BTreeMap<PathBuf, Vec<PathBuf>>> {
    let exclusions = config.exclusion_set()?;
    let include_tests = config.should_include_test_files();
    let mut packages: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            // Same rules as the go tool: hidden, `_`-prefixed, vendor and
            // testdata directories hold no packages of the tree.
            !(name.starts_with('.') || name.starts_with('_') || name == "vendor" || name == "testdata")
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !include_tests && name.ends_with("_test.go") {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclusions.is_match(relative) {
            debug!(file = %relative.display(), "excluded");
            continue;
        }

        let dir = relative.parent().map(Path::to_path_buf).unwrap_or_default();
        packages.entry(dir).or_default().push(path.to_path_buf());
    }
    Ok(packages)
}

/// Import path of `dir`, derived from the nearest enclosing `go.mod`.
///
/// Without a `go.mod` the directory name is used.
fn import_path_of(dir: &Path) -> Result<String> {
    for ancestor in dir.ancestors() {
        let go_mod = ancestor.join("go.mod");
        if !go_mod.is_file() {
            continue;
        }
        let content = fs::read_to_string(&go_mod).map_err(|source| Error::Io {
            path: go_mod.clone(),
            source,
        })?;
        let Some(module) = MODULE_DIRECTIVE.captures(&content).map(|c| c[1].to_string()) else {
            continue;
        };
        let relative = dir.strip_prefix(ancestor).unwrap_or(Path::new(""));
        return Ok(if relative.as_os_str().is_empty() {
            module
        } else {
            format!("{}/{}", module, to_slash(relative))
        });
    }

    Ok(dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string()))
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_directive() {
        let content = "// comment\nmodule example.com/app\n\ngo 1.21\n";
        let module = MODULE_DIRECTIVE.captures(content).map(|c| c[1].to_string());
        assert_eq!(module.as_deref(), Some("example.com/app"));

        let quoted = "module \"example.com/q\"\n";
        let module = MODULE_DIRECTIVE.captures(quoted).map(|c| c[1].to_string());
        assert_eq!(module.as_deref(), Some("example.com/q"));
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("a/b")), "a/b");
        assert_eq!(to_slash(Path::new("")), "");
    }
}
