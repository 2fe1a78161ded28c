use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::error::{ResolveError, Result};

pub const DEFAULT_HOST: &str = "modelscope.cn";
pub const DEFAULT_USER: &str = "judd2024";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelScopeEndpoint {
    pub host: String,
    pub user: String,
}

impl Default for ModelScopeEndpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            user: DEFAULT_USER.into(),
        }
    }
}

impl ModelScopeEndpoint {
    #[must_use]
    pub fn file_url(&self, project: &str, file_name: &str) -> String {
        format!(
            "https://{}/api/v1/models/{}/{}/repo?Revision=master&FilePath={}",
            self.host, self.user, project, file_name
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDownload {
    pub url: String,
    pub file_name: String,
    pub expected_size: u64,
}

/// Resolves `family[:variant[:quantization]]` against the catalog.
///
/// Omitted segments fall back to the catalog-declared defaults. Keys are
/// matched exactly as given.
pub fn resolve(
    identifier: &str,
    catalog: &Catalog,
    endpoint: &ModelScopeEndpoint,
) -> Result<ResolvedDownload> {
    let mut segments = identifier.split(':');
    let family = segments.next().unwrap_or_default();
    let variant_key = segments.next();
    let quantization_key = segments.next();

    let model = catalog
        .model(family)
        .ok_or_else(|| ResolveError::UnknownModel(family.to_owned()))?;

    let variant_key = variant_key.unwrap_or(model.default.as_str());
    let variant = model
        .variant(variant_key)
        .ok_or_else(|| ResolveError::UnknownVariant {
            model: family.to_owned(),
            variant: variant_key.to_owned(),
        })?;

    let quantization_key = quantization_key.unwrap_or(variant.default.as_str());
    let entry = variant.quantized.get(quantization_key).ok_or_else(|| {
        ResolveError::UnknownQuantization {
            model: family.to_owned(),
            variant: variant_key.to_owned(),
            quantization: quantization_key.to_owned(),
        }
    })?;

    let (project, file_name) = match entry.url.split('/').collect::<Vec<_>>().as_slice() {
        [project, file_name] => (*project, *file_name),
        _ => return Err(ResolveError::MalformedUrlTemplate(entry.url.clone())),
    };

    Ok(ResolvedDownload {
        url: endpoint.file_url(project, file_name),
        file_name: file_name.to_owned(),
        expected_size: entry.size,
    })
}
