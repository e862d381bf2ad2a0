//! Built-in directive handlers.

mod config_example;
mod history;
mod include;
mod link;
mod list;
mod media;
mod note;

use std::path::PathBuf;
use std::sync::Arc;

pub use config_example::{ConfigExampleDirective, ConfigExampleKind};
pub use history::{ChangelogDirective, HistoryDirective};
pub use include::{IncludeDirective, PartialDirective};
pub use link::{UrlDirective, UrlHashDirective};
pub use list::{AssertionKind, ListDirective, ListKind, RequirementKind, TimeoutKind};
pub use media::{BadgeDirective, BadgeStyle, ImageDirective, VideoDirective, VideoProvider};
pub use note::{NoteDirective, NoteKind};

use crate::{DirectiveError, DirectiveRegistry, LinkResolve};

/// A closed set of named options, parsed from a directive argument.
pub trait Choice: Copy + Sized + 'static {
    /// Noun used in error messages, e.g. "note type".
    const WHAT: &'static str;
    /// Every option, in documentation order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Other accepted spellings, left out of error messages.
    fn aliases(self) -> &'static [&'static str] {
        &[]
    }

    /// Look up an option by name or alias.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::InvalidOption`] naming the accepted values.
    fn parse(value: &str) -> Result<Self, DirectiveError> {
        Self::ALL
            .iter()
            .copied()
            .find(|option| {
                option.as_str() == value || option.aliases().iter().any(|alias| *alias == value)
            })
            .ok_or_else(|| {
                DirectiveError::invalid_option(
                    Self::WHAT,
                    value,
                    Self::ALL.iter().map(|option| option.as_str()),
                )
            })
    }
}

/// Settings for [`default_registry`].
pub struct RegistryOptions {
    /// Resolver used by `url`.
    pub resolver: Arc<dyn LinkResolve>,
    /// Markup emitted by `badge`.
    pub badge: BadgeStyle,
    /// Directory holding `{% partial name %}` files.
    pub partials_dir: PathBuf,
    /// Directory holding changelog fragments.
    pub changelog_dir: PathBuf,
    /// Default number of changelog entries; `None` renders all of them.
    pub changelog_limit: Option<usize>,
}

impl RegistryOptions {
    #[must_use]
    pub fn new(resolver: Arc<dyn LinkResolve>) -> Self {
        Self {
            resolver,
            badge: BadgeStyle::default(),
            partials_dir: PathBuf::from("_partials"),
            changelog_dir: PathBuf::from("_changelogs"),
            changelog_limit: None,
        }
    }

    #[must_use]
    pub fn with_badge(mut self, badge: BadgeStyle) -> Self {
        self.badge = badge;
        self
    }

    #[must_use]
    pub fn with_partials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.partials_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_changelog_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.changelog_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_changelog_limit(mut self, limit: Option<usize>) -> Self {
        self.changelog_limit = limit;
        self
    }
}

/// Build a registry with every built-in directive.
#[must_use]
pub fn default_registry(options: RegistryOptions) -> DirectiveRegistry {
    let RegistryOptions {
        resolver,
        badge,
        partials_dir,
        changelog_dir,
        changelog_limit,
    } = options;

    let mut registry = DirectiveRegistry::new()
        .with_container(NoteDirective)
        .with_container(HistoryDirective)
        .with_leaf(ListDirective::<AssertionKind>::new())
        .with_leaf(ListDirective::<RequirementKind>::new())
        .with_leaf(ListDirective::<TimeoutKind>::new())
        .with_leaf(UrlDirective::new(resolver))
        .with_leaf(UrlHashDirective)
        .with_leaf(BadgeDirective::new(badge))
        .with_leaf(VideoDirective)
        .with_leaf(ImageDirective::new("imgTag"))
        .with_leaf(ImageDirective::new("image"))
        .with_leaf(ChangelogDirective::new(changelog_dir, changelog_limit))
        .with_leaf(IncludeDirective)
        .with_leaf(PartialDirective::new(partials_dir));

    for &kind in ConfigExampleKind::ALL {
        registry = registry.with_container(ConfigExampleDirective::new(kind));
    }

    registry
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{BoxError, DirectiveKind};

    struct Literal;

    impl LinkResolve for Literal {
        fn resolve(&self, href: &str, _source: Option<&Path>) -> Result<String, BoxError> {
            Ok(href.to_owned())
        }
    }

    #[test]
    fn test_default_registry_names() {
        let registry = default_registry(RegistryOptions::new(Arc::new(Literal)));

        assert_eq!(
            registry.names(DirectiveKind::Container),
            vec![
                "cypress-config-example",
                "cypress-config-plugin-example",
                "cypress-env-example",
                "history",
                "note",
            ]
        );
        assert_eq!(
            registry.names(DirectiveKind::Leaf),
            vec![
                "assertions",
                "badge",
                "changelog",
                "image",
                "imgTag",
                "include",
                "partial",
                "requirements",
                "timeouts",
                "url",
                "urlHash",
                "video",
            ]
        );
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!(NoteKind::parse("danger").unwrap(), NoteKind::Danger);
        assert_eq!(
            VideoProvider::parse("dailymotion").unwrap_err().to_string(),
            "invalid video provider 'dailymotion' (expected one of: youtube, vimeo, local)"
        );
    }
}
