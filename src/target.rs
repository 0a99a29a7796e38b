use std::path::{Component, Path, PathBuf};

use log::warn;

use crate::error::{BuildStatsError, Result};

/// Routing coordinates carried by the last three segments of a target
/// directory: `<provider>/<owner>/<name>`.
///
/// For Bamboo `owner` is the server host and `name` is `PROJECT-PLAN`; for
/// Drone they are the repository user and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    pub dir: PathBuf,
    pub provider: String,
    pub owner: String,
    pub name: String,
}

impl TargetPath {
    pub fn parse(dir: &Path) -> Result<Self> {
        let invalid = |reason: &str| BuildStatsError::InvalidTargetPath {
            path: dir.to_path_buf(),
            reason: reason.to_string(),
        };

        let segments = dir
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_str()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| invalid("path is not valid UTF-8"))?;

        let (provider, owner, name) = match segments.as_slice() {
            [.., provider, owner, name] => (*provider, *owner, *name),
            _ => {
                return Err(invalid(
                    "expected at least three segments: <provider>/<owner>/<name>",
                ))
            }
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            provider: provider.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Whether the provider segment names `provider`, ignoring case. A
    /// mismatch is logged but not fatal: the caller picked the provider.
    pub fn matches_provider(&self, provider: &str) -> bool {
        let matches = self.provider.eq_ignore_ascii_case(provider);
        if !matches {
            warn!(
                "Target directory {} is under {:?} but is being mirrored from {provider}",
                self.dir.display(),
                self.provider
            );
        }
        matches
    }
}
