//! Target rules and injection handlers
//!
//! A target rule pairs a chunk-key predicate with the artifact it rewrites
//! and the handler that performs the rewrite. Rule selection is
//! first-match-wins, so a chunk key is claimed by at most one rule.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// `$N` references inside a target path template.
static MATCH_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").unwrap());

/// Artifact content as seen by a handler.
///
/// Artifacts whose path ends in `.json` are parsed before the handler runs
/// and pretty-printed after it; everything else passes through as raw text.
/// A handler may return the other variant than it was given; serialization
/// follows the returned variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Raw text (HTML pages and anything without a structured extension).
    Text(String),
    /// Parsed structured data for `.json` artifacts.
    Json(Value),
}

impl Content {
    /// Serialize to the on-disk form: text verbatim, JSON indented.
    pub fn into_output(self) -> Result<String> {
        match self {
            Content::Text(text) => Ok(text),
            Content::Json(value) => Ok(serde_json::to_string_pretty(&value)?),
        }
    }
}

/// Resolved script references handed to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionContext {
    /// Paths of the chunks the matched entry needs at load time, relative to
    /// the target artifact's directory, dependencies first.
    pub scripts: Vec<String>,
    /// The same list rendered as concatenated `<script>` tags.
    pub html_scripts: String,
}

impl InjectionContext {
    /// Build a context from already-relativized script paths.
    pub fn new(scripts: Vec<String>) -> Self {
        let html_scripts = scripts
            .iter()
            .map(|path| format!("<script src=\"{}\"></script>", path))
            .collect::<String>();

        Self {
            scripts,
            html_scripts,
        }
    }
}

/// Rewrites one target artifact with the resolved script list.
#[async_trait]
pub trait TargetHandler: Send + Sync {
    /// Produce the artifact's new content from its current content and the
    /// injection context. Errors abort the whole write pass.
    async fn handle(&self, content: Content, ctx: &InjectionContext) -> Result<Content>;
}

/// Adapter turning a plain closure into a [`TargetHandler`].
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> TargetHandler for FnHandler<F>
where
    F: Fn(Content, &InjectionContext) -> Result<Content> + Send + Sync,
{
    async fn handle(&self, content: Content, ctx: &InjectionContext) -> Result<Content> {
        (self.0)(content, ctx)
    }
}

/// One rewrite rule: which chunk keys it claims, which artifact it rewrites,
/// and how.
#[derive(Clone)]
pub struct Target {
    /// Predicate over chunk keys.
    pub test: Regex,
    /// Target artifact path template; `$1`, `$2`, ... substitute capture
    /// groups from the matched predicate.
    pub target: String,
    /// Rewrite callback invoked with the artifact content and context.
    pub handler: Arc<dyn TargetHandler>,
}

impl Target {
    /// Create a rule from its predicate, path template, and handler.
    pub fn new(test: Regex, target: impl Into<String>, handler: Arc<dyn TargetHandler>) -> Self {
        Self {
            test,
            target: target.into(),
            handler,
        }
    }

    /// Convenience constructor wrapping a plain closure handler.
    pub fn from_fn<F>(test: Regex, target: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Content, &InjectionContext) -> Result<Content> + Send + Sync + 'static,
    {
        Self::new(test, target, Arc::new(FnHandler(handler)))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("test", &self.test.as_str())
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// A matched rule together with its captured groups.
///
/// Group 0 is the whole match; non-participating groups are empty strings.
#[derive(Debug)]
pub struct RuleMatch<'t> {
    pub rule: &'t Target,
    pub groups: Vec<String>,
}

/// Select the first rule whose predicate matches `key`.
///
/// Rules are tried in list order and evaluation stops at the first success;
/// `None` means the key is skipped by the write pass entirely.
pub fn match_target<'t>(key: &str, targets: &'t [Target]) -> Option<RuleMatch<'t>> {
    for rule in targets {
        if let Some(caps) = rule.test.captures(key) {
            let groups = caps
                .iter()
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect();
            return Some(RuleMatch { rule, groups });
        }
    }
    None
}

/// Substitute `$N` references in a path template from captured groups.
///
/// References to a missing or empty group are left literally in place.
pub fn apply_match_refs(template: &str, groups: &[String]) -> String {
    MATCH_REF
        .replace_all(template, |caps: &regex::Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| groups.get(n))
                .filter(|group| !group.is_empty())
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
