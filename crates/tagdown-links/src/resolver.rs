//! Link resolution with caching and optional target validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tagdown_cache::{CacheBucket, CacheBucketExt};
use tagdown_directives::{BoxError, LinkResolve};
use url::Url;

use crate::anchors::{html_has_anchor, markdown_has_anchor};
use crate::fetch::{Fetch, FetchError, HttpFetcher};
use crate::sidebar::NormalizedPaths;

type Lookup = Arc<OnceLock<Result<String, LinkErrorKind>>>;

/// Why a link could not be resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkErrorKind {
    #[error("no sidebar entry matches '{entry}'")]
    NotFound { entry: String },
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("{url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("#{fragment} not found on {url}; response body:\n{body}")]
    MissingFragment {
        fragment: String,
        url: String,
        body: String,
    },
    #[error("#{fragment} does not match any heading in {}", page.display())]
    MissingHeading { fragment: String, page: PathBuf },
    #[error("no page for '{target}' under {}", dir.display())]
    PageNotFound { target: String, dir: PathBuf },
}

/// A link that could not be resolved, with the page that referenced it.
#[derive(Debug, thiserror::Error)]
#[error("{file}: cannot resolve '{href}': {kind}")]
pub struct ResolveError {
    pub file: String,
    pub href: String,
    pub kind: LinkErrorKind,
}

/// Resolves `url` directive targets against the sidebar table.
///
/// Successful lookups are written to the cache bucket and served from it until
/// their TTL runs out. While a lookup is outstanding, concurrent callers for
/// the same href wait on it instead of starting their own.
pub struct LinkResolver {
    paths: NormalizedPaths,
    bucket: Box<dyn CacheBucket>,
    fetcher: Box<dyn Fetch>,
    validate: bool,
    source_dir: Option<PathBuf>,
    in_flight: Mutex<HashMap<String, Lookup>>,
}

impl LinkResolver {
    #[must_use]
    pub fn new(paths: NormalizedPaths, bucket: Box<dyn CacheBucket>) -> Self {
        Self {
            paths,
            bucket,
            fetcher: Box::new(HttpFetcher::default()),
            validate: false,
            source_dir: None,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch external links and check local fragments before accepting them.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Documentation root used to find the Markdown page behind a local link.
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl Fetch + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Resolve `href` as referenced from `source`.
    ///
    /// - `https://...` and `http://...` are normalized and, with validation
    ///   on, fetched; a `#fragment` must exist in the response.
    /// - `/path` and `./path` are returned as written.
    /// - Anything else is a sidebar key (`and`) or dotted path
    ///   (`api.commands.and`) and resolves to `/<full path>#fragment`.
    pub fn resolve_href(&self, href: &str, source: Option<&Path>) -> Result<String, ResolveError> {
        let fail = |kind: LinkErrorKind| ResolveError {
            file: source.map_or_else(|| "<unknown>".to_owned(), |p| p.display().to_string()),
            href: href.to_owned(),
            kind,
        };

        let key = normalize(href).map_err(fail)?;

        if let Some(hit) = self.bucket.get_string(&key) {
            tracing::debug!(href = %key, "Link cache hit");
            return Ok(hit);
        }

        let cell = Arc::clone(
            self.in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key.clone())
                .or_default(),
        );

        let result = cell
            .get_or_init(|| {
                // A lookup that finished since the cache check has stored its result.
                if let Some(hit) = self.bucket.get_string(&key) {
                    return Ok(hit);
                }
                tracing::debug!(href = %key, "Resolving link");
                let result = self.lookup(&key);
                if let Ok(resolved) = &result {
                    self.bucket.set_string(&key, resolved);
                }
                result
            })
            .clone();

        self.finish(&key, &cell);
        result.map_err(fail)
    }

    /// Drop the in-flight entry for `key` unless a newer lookup replaced it.
    fn finish(&self, key: &str, cell: &Lookup) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.get(key).is_some_and(|current| Arc::ptr_eq(current, cell)) {
            in_flight.remove(key);
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn lookup(&self, href: &str) -> Result<String, LinkErrorKind> {
        if is_external(href) {
            if self.validate {
                self.validate_external(href)?;
            }
            return Ok(href.to_owned());
        }

        let (path, fragment) = match href.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (href, None),
        };

        if path.starts_with('.') {
            return Ok(href.to_owned());
        }

        let target = if path.starts_with('/') {
            path.to_owned()
        } else {
            let full = self.paths.lookup(path).ok_or_else(|| LinkErrorKind::NotFound {
                entry: path.to_owned(),
            })?;
            format!("/{full}")
        };

        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            if self.validate {
                self.validate_local(&target, fragment)?;
            }
            return Ok(format!("{target}#{fragment}"));
        }
        Ok(target)
    }

    fn validate_external(&self, href: &str) -> Result<(), LinkErrorKind> {
        let (url, fragment) = match href.split_once('#') {
            Some((url, fragment)) => (url, Some(fragment)),
            None => (href, None),
        };

        let body = self
            .fetcher
            .fetch(url)
            .map_err(|source| LinkErrorKind::Fetch {
                url: url.to_owned(),
                source,
            })?;

        match fragment.filter(|f| !f.is_empty()) {
            Some(fragment) if !html_has_anchor(&body, fragment) => {
                Err(LinkErrorKind::MissingFragment {
                    fragment: fragment.to_owned(),
                    url: url.to_owned(),
                    body,
                })
            }
            _ => Ok(()),
        }
    }

    fn validate_local(&self, target: &str, fragment: &str) -> Result<(), LinkErrorKind> {
        let Some(dir) = &self.source_dir else {
            return Ok(());
        };

        let page = find_page(dir, target).ok_or_else(|| LinkErrorKind::PageNotFound {
            target: target.to_owned(),
            dir: dir.clone(),
        })?;
        let content = std::fs::read_to_string(&page).map_err(|_| LinkErrorKind::PageNotFound {
            target: target.to_owned(),
            dir: dir.clone(),
        })?;

        if markdown_has_anchor(&content, fragment) {
            Ok(())
        } else {
            Err(LinkErrorKind::MissingHeading {
                fragment: fragment.to_owned(),
                page,
            })
        }
    }
}

impl LinkResolve for LinkResolver {
    fn resolve(&self, href: &str, source: Option<&Path>) -> Result<String, BoxError> {
        Ok(self.resolve_href(href, source)?)
    }
}

fn is_external(href: &str) -> bool {
    href.starts_with("https://") || href.starts_with("http://")
}

fn normalize(href: &str) -> Result<String, LinkErrorKind> {
    let href = href.trim();
    if is_external(href) {
        return Url::parse(href)
            .map(String::from)
            .map_err(|e| LinkErrorKind::InvalidUrl(format!("{href}: {e}")));
    }
    Ok(href.to_owned())
}

/// Markdown source behind a site path: `/api/commands/and.html` maps to
/// `api/commands/and.md`, `and.mdx` or `and/index.md` under `dir`.
fn find_page(dir: &Path, target: &str) -> Option<PathBuf> {
    let stem = target.trim_start_matches('/');
    let stem = stem.strip_suffix(".html").unwrap_or(stem).trim_end_matches('/');

    [
        format!("{stem}.md"),
        format!("{stem}.mdx"),
        format!("{stem}/index.md"),
    ]
    .into_iter()
    .map(|candidate| dir.join(candidate))
    .find(|path| path.is_file())
}
