//! Loading a Gradle build from disk into a Build Descriptor Set.
//!
//! Reads the settings script, the root build script, every included
//! subproject's build script and the version catalog. Subproject scripts are
//! read concurrently.
//!
//! # Error Handling
//!
//! Missing subproject scripts are not errors (Gradle allows script-less
//! modules). Unreadable or oversized files, and scripts whose structure
//! cannot be scanned, abort the load with the offending path attached.

use crate::error::GradleError;
use crate::parser::{GradleSettings, build_script_parser, parse_settings, parse_version_catalog};
use futures::future::join_all;
use lazybuild_core::module::{path_to_dir, path_to_name};
use lazybuild_core::{BuildDescriptorSet, LazybuildError, Module, ROOT_PATH, Result};
use std::path::{Path, PathBuf};

/// Default maximum script size in bytes (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10_000_000;

/// Location of the version catalog relative to the build root.
pub const CATALOG_PATH: &str = "gradle/libs.versions.toml";

const CATALOG_FILE_TYPE: &str = "Gradle Version Catalog";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Files larger than this are rejected.
    pub max_file_size: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Loads the Gradle build rooted at `root`.
///
/// # Errors
///
/// - `LazybuildError::ParseError` - no settings or root build script, or a
///   script could not be scanned
/// - `LazybuildError::FileTooLarge` - a file exceeds `max_file_size`
/// - `LazybuildError::Io` - a file exists but could not be read
pub async fn load_build(root: &Path, options: &LoaderOptions) -> Result<BuildDescriptorSet> {
    tracing::debug!("Loading Gradle build from {:?}", root);

    let settings_file = find_script(root, "settings").await;
    let root_file = find_script(root, "build").await;
    if settings_file.is_none() && root_file.is_none() {
        return Err(GradleError::NoBuildFiles {
            dir: root.to_path_buf(),
        }
        .into());
    }

    let settings = match &settings_file {
        Some(path) => {
            let content = read_limited(path, options).await?;
            parse_settings(&content, path)?
        }
        None => GradleSettings::default(),
    };

    let root_name = settings
        .root_name
        .clone()
        .or_else(|| {
            root.file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "root".to_string());

    let mut set = BuildDescriptorSet::new(root, root_name.clone());
    set.settings_repositories = settings.repositories;

    let root_module = load_module(root, ROOT_PATH, &root_name, options).await?;
    set.insert(root_module);

    let subprojects = join_all(
        settings
            .includes
            .iter()
            .map(|path| load_module(root, path, path_to_name(path), options)),
    )
    .await;
    for module in subprojects {
        set.insert(module?);
    }

    let catalog_path = root.join(CATALOG_PATH);
    if is_file(&catalog_path).await {
        let content = read_limited(&catalog_path, options).await?;
        let catalog =
            parse_version_catalog(&content).map_err(|e| e.at(CATALOG_FILE_TYPE, &catalog_path))?;
        for module in set.modules.values_mut() {
            catalog.resolve_aliases(module);
        }
        set.catalog = Some(catalog);
    }

    tracing::debug!(
        "Loaded build '{}' with {} modules",
        set.root_name,
        set.len()
    );
    Ok(set)
}

async fn load_module(
    root: &Path,
    path: &str,
    name: &str,
    options: &LoaderOptions,
) -> Result<Module> {
    let mut module = Module::new(path, name);
    let dir = root.join(path_to_dir(path));

    let Some(file) = find_script(&dir, "build").await else {
        tracing::debug!("Module {} has no build script", path);
        return Ok(module);
    };

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let parser = build_script_parser(file_name).ok_or_else(|| LazybuildError::ParseError {
        file_type: "Gradle".into(),
        path: file.clone(),
        message: "unrecognised build script".into(),
    })?;

    let content = read_limited(&file, options).await?;
    parser.parse(&content, &file, &mut module)?;
    module.build_file = file.strip_prefix(root).ok().map(Path::to_path_buf);
    Ok(module)
}

/// `<stem>.gradle.kts`, falling back to `<stem>.gradle`.
async fn find_script(dir: &Path, stem: &str) -> Option<PathBuf> {
    for candidate in [format!("{stem}.gradle.kts"), format!("{stem}.gradle")] {
        let path = dir.join(candidate);
        if is_file(&path).await {
            return Some(path);
        }
    }
    None
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

async fn read_limited(path: &Path, options: &LoaderOptions) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| LazybuildError::io(path, e))?;

    let size = metadata.len();
    if size > options.max_file_size {
        tracing::warn!(
            "Skipping {:?}: {} bytes exceeds limit of {} bytes",
            path,
            size,
            options.max_file_size
        );
        return Err(LazybuildError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max: options.max_file_size,
        });
    }
    tracing::trace!("File size: {} bytes", size);

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::debug!("Failed to read file {:?}: {}", path, e);
        LazybuildError::io(path, e)
    })?;

    tracing::debug!("Read {:?} ({} bytes)", path, content.len());
    Ok(content)
}
