//! `include` and `partial` file inclusion.
//!
//! Both return [`DirectiveOutput::Included`], so directives inside the
//! included file are expanded too, relative to that file.

use std::path::PathBuf;

use crate::{DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput, LeafDirective};

/// `::include{file=snippets/setup.md}`, relative to the document's directory.
pub struct IncludeDirective;

impl LeafDirective for IncludeDirective {
    fn name(&self) -> &'static str {
        "include"
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let file = args
            .get("file")
            .or_else(|| args.arg(0))
            .ok_or(DirectiveError::MissingAttribute("file"))?;

        let path = ctx.resolve_path(file);
        let content = ctx.read(&path).map_err(|source| DirectiveError::ReadFile {
            path: file.to_owned(),
            source,
        })?;

        Ok(DirectiveOutput::included(path, content))
    }
}

/// `{% partial what-you-will-learn %}`, read from the partials directory.
pub struct PartialDirective {
    dir: PathBuf,
}

impl PartialDirective {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LeafDirective for PartialDirective {
    fn name(&self) -> &'static str {
        "partial"
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let name = args
            .arg(0)
            .or_else(|| args.get("name"))
            .or_else(|| args.content())
            .ok_or(DirectiveError::MissingArgument("partial name"))?;

        let path = self.dir.join(format!("{name}.md"));
        let content = ctx.read(&path).map_err(|source| DirectiveError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;

        Ok(DirectiveOutput::included(path, content))
    }
}
