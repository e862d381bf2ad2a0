//! `history` tables and `changelog` fragments.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use crate::{
    ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput,
    LeafDirective,
};

/// Version history table.
///
/// ```text
/// {% history %}
/// | [3.5.0](/guides/references/changelog#3-5-0) | Added `timeout` option |
/// {% endhistory %}
/// ```
pub struct HistoryDirective;

impl ContainerDirective for HistoryDirective {
    fn name(&self) -> &'static str {
        "history"
    }

    fn process(
        &self,
        _args: &DirectiveArgs,
        body: &str,
        _ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let rows: Vec<&str> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut table = String::from("## History\n\n| Version | Changes |\n| ------- | ------- |\n");
        for row in rows {
            table.push_str(row);
            table.push('\n');
        }
        Ok(DirectiveOutput::Text(table))
    }
}

/// Changelog assembled from one Markdown file per release.
///
/// Files in the changelog directory are named after their version
/// (`12.3.0.md`) and rendered newest first. With a limit, only the first
/// `limit` releases are included; `::changelog{limit=N}` overrides the
/// configured limit but cannot lift it.
pub struct ChangelogDirective {
    dir: PathBuf,
    limit: Option<usize>,
}

impl ChangelogDirective {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, limit: Option<usize>) -> Self {
        Self {
            dir: dir.into(),
            limit,
        }
    }

    fn entries(&self, ctx: &DirectiveContext) -> Result<Vec<PathBuf>, DirectiveError> {
        let pattern = format!(
            "{}/*.md",
            glob::Pattern::escape(&self.dir.to_string_lossy())
        );

        let mut entries = Vec::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => entries.push(path),
                Err(e) => ctx.warn(format!("skipping changelog entry: {e}")),
            }
        }

        entries.sort_by_cached_key(|path| Reverse(version_key(path)));
        Ok(entries)
    }
}

impl LeafDirective for ChangelogDirective {
    fn name(&self) -> &'static str {
        "changelog"
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let limit = match self.limit {
            Some(default) => Some(match args.get("limit").or_else(|| args.arg(0)) {
                Some(value) => value
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| {
                        DirectiveError::invalid_option("limit", value, ["a positive integer"])
                    })?
                    .min(default),
                None => default,
            }),
            None => None,
        };

        let mut entries = self.entries(ctx)?;
        if entries.is_empty() {
            ctx.warn(format!("no changelog entries in {}", self.dir.display()));
            return Ok(DirectiveOutput::Text(String::new()));
        }
        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        tracing::debug!(count = entries.len(), "Rendering changelog");

        let mut sections = Vec::with_capacity(entries.len());
        for path in &entries {
            let content = ctx.read(path).map_err(|source| DirectiveError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
            sections.push(content.trim().to_owned());
        }

        Ok(DirectiveOutput::Markdown(sections.join("\n\n")))
    }
}

/// Sort key from a file stem such as `12.3.0` or `3.8.3-beta`.
///
/// Each dot-separated segment contributes its leading digits. A release sorts
/// above its pre-releases; the stem breaks remaining ties.
fn version_key(path: &Path) -> (Vec<u64>, bool, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let numbers = stem
        .split(['.', '_'])
        .map(|segment| {
            let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect();
    let release = !stem.contains('-');
    (numbers, release, stem)
}
