use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use super::{
    catalog::Catalog,
    download::Fetch,
    error::{ResolveError, Result},
    resolver::{resolve, ModelScopeEndpoint},
};

pub const MODEL_FLAGS: [&str; 4] = ["-m", "--model", "--embedding_model", "--reranker_model"];

pub const MODEL_PREFIX: char = ':';

pub struct ArtifactResolver<'a, F> {
    catalog: &'a Catalog,
    endpoint: ModelScopeEndpoint,
    fetcher: F,
    storage_dir: PathBuf,
}

impl<'a, F: Fetch> ArtifactResolver<'a, F> {
    pub fn new(
        catalog: &'a Catalog,
        endpoint: ModelScopeEndpoint,
        fetcher: F,
        storage_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            endpoint,
            fetcher,
            storage_dir: storage_dir.into(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn obtain(&mut self, identifier: &str, storage_dir: &Path) -> Result<PathBuf> {
        ensure_storage_dir(storage_dir)?;

        let download = resolve(identifier, self.catalog, &self.endpoint)?;
        let target = storage_dir.join(&download.file_name);

        if target.is_file() {
            let size = file_size(identifier, &target)?;
            if size == download.expected_size {
                debug!("{} already present", target.display());
                return Ok(target);
            }
            warn!(
                "{} is incomplete ({size} of {} bytes), download again",
                target.display(),
                download.expected_size
            );
        }

        info!("Downloading {identifier}");
        let completed = self
            .fetcher
            .fetch(&download.url, &target)
            .map_err(|error| ResolveError::DownloadFailed {
                identifier: identifier.to_owned(),
                reason: format!("{error:#}"),
            })?;
        if !completed {
            return Err(ResolveError::DownloadFailed {
                identifier: identifier.to_owned(),
                reason: "incomplete response".into(),
            });
        }

        let actual = file_size(identifier, &target)?;
        if actual != download.expected_size {
            return Err(ResolveError::SizeMismatch {
                path: target,
                expected: download.expected_size,
                actual,
            });
        }

        info!("Saved {identifier} to {}", target.display());
        Ok(target)
    }

    pub fn rewrite_args(&mut self, args: &[String]) -> Result<Vec<String>> {
        let mut rewritten = args.to_vec();
        let storage_dir = self.storage_dir.clone();
        for index in 0..rewritten.len() {
            if !MODEL_FLAGS.contains(&rewritten[index].as_str()) {
                continue;
            }
            let Some(value) = rewritten.get(index + 1) else {
                continue;
            };
            let Some(identifier) = value.strip_prefix(MODEL_PREFIX) else {
                continue;
            };
            let identifier = identifier.to_lowercase();
            let path = self.obtain(&identifier, &storage_dir)?;
            debug!("{} {identifier} -> {}", rewritten[index], path.display());
            rewritten[index + 1] = path.to_string_lossy().into_owned();
        }
        Ok(rewritten)
    }
}

fn ensure_storage_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir(path).map_err(|error| ResolveError::DirectoryError {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;
    }
    if !path.is_dir() {
        return Err(ResolveError::DirectoryError {
            path: path.to_path_buf(),
            reason: "not a directory".into(),
        });
    }
    Ok(())
}

fn file_size(identifier: &str, path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|error| ResolveError::DownloadFailed {
            identifier: identifier.to_owned(),
            reason: format!("stat {}: {error}", path.display()),
        })
}
