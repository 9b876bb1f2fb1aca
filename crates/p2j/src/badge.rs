//! "Open In Colab" badge for the first notebook cell.

use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

const SSH_PREFIX: &str = "git@github.com:";
const GITHUB_PREFIX: &str = "https://github.com/";
const COLAB_PREFIX: &str = "https://colab.research.google.com/github/";
const BADGE_IMAGE: &str = "https://colab.research.google.com/assets/colab-badge.svg";

/// Supplies the repository URL of the directory a notebook is written to.
///
/// The returned string is used as a prefix for the notebook's file name, so it
/// should end with a `/`. An empty string means no URL could be found.
pub trait RepositoryUrlResolver {
    fn resolve(&self, target: &Path) -> String;
}

/// Returns the same URL for every target.
#[derive(Debug, Clone)]
pub struct FixedUrlResolver(pub String);

impl RepositoryUrlResolver for FixedUrlResolver {
    fn resolve(&self, _target: &Path) -> String {
        self.0.clone()
    }
}

/// Asks `git` for the origin remote, current branch and directory prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitRemoteResolver;

impl RepositoryUrlResolver for GitRemoteResolver {
    fn resolve(&self, target: &Path) -> String {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let lookup = || -> Option<String> {
            let remote = git_output(dir, &["config", "--get", "remote.origin.url"])?;
            let branch = git_output(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
            let prefix = git_output(dir, &["rev-parse", "--show-prefix"]).unwrap_or_default();
            let remote = remote.strip_suffix(".git").unwrap_or(&remote);
            Some(format!("{remote}/blob/{branch}/{prefix}"))
        };

        lookup().unwrap_or_else(|| {
            warn!(dir = %dir.display(), "could not resolve a git remote for the badge");
            String::new()
        })
    }
}

fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Builds the markdown badge linking `target` on the hosted notebook viewer.
pub fn colab_badge(target: &Path, resolver: &dyn RepositoryUrlResolver) -> String {
    let base = resolver.resolve(target).replace(SSH_PREFIX, GITHUB_PREFIX);
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let url = format!("{base}{file_name}");
    info!(url = %url, "generating colab badge");
    let url = url.replace(GITHUB_PREFIX, COLAB_PREFIX);

    format!("[![Open In Colab]({BADGE_IMAGE})]({url})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn links_notebook_on_colab() {
        let resolver = FixedUrlResolver("https://github.com/org/repo/".into());
        let badge = colab_badge(&PathBuf::from("nb.ipynb"), &resolver);
        assert_eq!(
            badge,
            "[![Open In Colab](https://colab.research.google.com/assets/colab-badge.svg)]\
             (https://colab.research.google.com/github/org/repo/nb.ipynb)"
        );
    }

    #[test]
    fn rewrites_ssh_remotes() {
        let resolver = FixedUrlResolver("git@github.com:org/repo/blob/main/".into());
        let badge = colab_badge(&PathBuf::from("out/demo.ipynb"), &resolver);
        assert!(badge.ends_with(
            "(https://colab.research.google.com/github/org/repo/blob/main/demo.ipynb)"
        ));
    }

    #[test]
    fn empty_url_still_produces_badge() {
        let resolver = FixedUrlResolver(String::new());
        let badge = colab_badge(&PathBuf::from("nb.ipynb"), &resolver);
        assert!(badge.ends_with("](nb.ipynb)"));
    }
}
