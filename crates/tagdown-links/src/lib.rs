//! Sidebar-driven link resolution for tagdown.
//!
//! Pages link to each other by sidebar key (`{% url '.and()' and %}`) rather
//! than by path. A [`SidebarTable`] is normalized once into
//! [`NormalizedPaths`], and a [`LinkResolver`] maps each href to its site
//! path, optionally validating external URLs and `#fragment`s.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use tagdown_cache::{Cache, MemoryCache};
//! use tagdown_links::{LinkResolver, SidebarTable};
//!
//! let table = SidebarTable::from_yaml("api:\n  commands:\n    and: and.html\n").unwrap();
//! let cache = MemoryCache::new();
//! let resolver = LinkResolver::new(table.normalize(), cache.bucket("links", Duration::from_secs(60)));
//!
//! assert_eq!(resolver.resolve_href("and#Syntax", None).unwrap(), "/api/commands/and.html#Syntax");
//! ```

mod anchors;
mod fetch;
mod resolver;
mod sidebar;

pub use fetch::{DEFAULT_TIMEOUT, Fetch, FetchError, HttpFetcher};
pub use resolver::{LinkErrorKind, LinkResolver, ResolveError};
pub use sidebar::{NormalizedPaths, SidebarError, SidebarTable};
