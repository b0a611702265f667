//! write-output
//!
//! Post-bundling pass that rewrites HTML pages and JSON manifests with the
//! dependency-ordered list of chunks a matched entry chunk needs at load
//! time.
//!
//! The host bundler hands over its chunk graph once per completed write
//! event. Each configured [`Target`] claims matching chunk keys
//! (first-rule-wins), the [`ImportResolver`] computes each claimed entry's
//! load order (dependencies first, entry last, cycles broken at first
//! re-encounter), and the matched artifacts are rewritten in place with the
//! relativized script list.
//!
//! # Example
//!
//! ```no_run
//! use regex::Regex;
//! use write_output::{Bundle, Content, InjectionContext, OutputChunk, OutputOptions, Target, WriteOutput};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut bundle = Bundle::new();
//! bundle.insert("index.js", OutputChunk::new(["foo.js"]));
//! bundle.insert("foo.js", OutputChunk::leaf());
//!
//! let targets = vec![Target::from_fn(
//!     Regex::new(r"(index)\.js$")?,
//!     "dist/$1.html",
//!     |content, ctx: &InjectionContext| match content {
//!         Content::Text(html) => Ok(Content::Text(
//!             html.replace("</body>", &format!("{}</body>", ctx.html_scripts)),
//!         )),
//!         other => Ok(other),
//!     },
//! )];
//!
//! WriteOutput::new(targets)
//!     .write_bundle(&OutputOptions::new("dist/js"), &bundle)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod inject;
pub mod resolver;
pub mod target;
pub mod utils;

pub use bundle::{Bundle, OutputChunk, OutputOptions};
pub use inject::WriteOutput;
pub use resolver::ImportResolver;
pub use target::{Content, FnHandler, InjectionContext, RuleMatch, Target, TargetHandler};
