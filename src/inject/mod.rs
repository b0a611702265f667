//! The bundle-write pass
//!
//! Runs once per completed bundle-write event: matches chunk keys against the
//! configured target rules, resolves each match's load order, and rewrites
//! the matched artifacts in place. All filesystem I/O for the crate happens
//! here.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::bundle::{Bundle, OutputOptions};
use crate::resolver::ImportResolver;
use crate::target::{apply_match_refs, match_target, Content, InjectionContext, Target};
use crate::utils::relative_script_path;

/// The write-output pass, configured once with its target rules.
pub struct WriteOutput {
    targets: Vec<Target>,
}

impl WriteOutput {
    /// Create a pass over the given rules. Rule order matters: matching is
    /// first-rule-wins.
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }

    /// Rewrite every targeted artifact for one bundle-write event.
    ///
    /// Chunk keys are processed sequentially in bundle order; keys no rule
    /// claims are skipped without side effects. When several keys target the
    /// same artifact, each rewrite re-reads the file and so builds on the
    /// previous rewrite's output. The first I/O, parse, or handler error
    /// aborts the pass; artifacts already rewritten keep their new content.
    pub async fn write_bundle(&self, options: &OutputOptions, bundle: &Bundle) -> Result<()> {
        let mut resolver = ImportResolver::new(bundle);
        let output_dir = absolutize(options.dir.clone())?;
        let mut rewritten = 0usize;

        for key in bundle.keys() {
            let matched = match match_target(key, &self.targets) {
                Some(matched) => matched,
                None => continue,
            };

            let target_path = absolutize(PathBuf::from(apply_match_refs(
                &matched.rule.target,
                &matched.groups,
            )))?;
            let target_dir = target_path.parent().unwrap_or_else(|| Path::new("."));

            let scripts = resolver
                .resolve(key)
                .iter()
                .map(|chunk_key| output_dir.join(chunk_key))
                .map(|chunk_path| relative_script_path(target_dir, &chunk_path))
                .collect::<Option<Vec<String>>>()
                .with_context(|| {
                    format!(
                        "cannot express chunk paths relative to {}",
                        target_path.display()
                    )
                })?;
            let ctx = InjectionContext::new(scripts);

            debug!("rewriting {} for chunk {}", target_path.display(), key);

            let raw = fs::read_to_string(&target_path).await.with_context(|| {
                format!("failed to read target artifact: {}", target_path.display())
            })?;

            let content = if is_json_target(&target_path) {
                let value = serde_json::from_str(&raw).with_context(|| {
                    format!("target artifact is not valid JSON: {}", target_path.display())
                })?;
                Content::Json(value)
            } else {
                Content::Text(raw)
            };

            let output = matched
                .rule
                .handler
                .handle(content, &ctx)
                .await
                .with_context(|| format!("handler failed for {}", target_path.display()))?;

            fs::write(&target_path, output.into_output()?)
                .await
                .with_context(|| {
                    format!("failed to write target artifact: {}", target_path.display())
                })?;
            rewritten += 1;
        }

        info!("write-output pass rewrote {} artifact(s)", rewritten);
        Ok(())
    }
}

/// Anchor relative paths (target templates and the output directory) at the
/// process working directory, the same base the host bundler's configuration
/// paths resolve against. Both sides of the relative-path computation must
/// share an anchor or no relative form exists.
fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        let cwd =
            env::current_dir().context("cannot resolve path against the working directory")?;
        Ok(cwd.join(path))
    }
}

/// Structured-data detection by target filename suffix.
fn is_json_target(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.ends_with(".json"))
}
