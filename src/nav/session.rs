//! Navigation session.
//!
//! Everything a navigation needs that outlives a single load: the config,
//! the route table, the default header, the currently loaded path and the
//! ticket counter that orders concurrent navigations.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::SiteConfig;
use crate::core::{CanonicalPath, IdRegistry};
use crate::fragment::HeaderText;
use crate::router::RouteTable;

/// Identifies one `load_route` call. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NavTicket(u64);

#[derive(Debug)]
pub struct Session {
    config: Arc<SiteConfig>,
    routes: RouteTable,
    default_header: HeaderText,
    current: Mutex<Option<CanonicalPath>>,
    latest: AtomicU64,
}

impl Session {
    pub fn new(config: Arc<SiteConfig>) -> Self {
        let routes = RouteTable::from_config(&config.routes);
        let default_header = HeaderText::new(config.site.title.clone(), config.site.subtitles.clone());
        Self {
            config,
            routes,
            default_header,
            current: Mutex::new(None),
            latest: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    #[inline]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[inline]
    pub fn default_header(&self) -> &HeaderText {
        &self.default_header
    }

    /// Start a navigation; every earlier ticket becomes stale.
    pub fn begin_navigation(&self) -> NavTicket {
        NavTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while no later navigation has started.
    pub fn is_current(&self, ticket: NavTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Path of the page on screen, `None` after a failed load.
    pub fn current_path(&self) -> Option<CanonicalPath> {
        self.current.lock().clone()
    }

    pub(crate) fn set_current(&self, path: Option<CanonicalPath>) {
        *self.current.lock() = path;
    }

    /// Fresh id registry for the next fragment, seeded with the configured
    /// reserved ids and the ids found in the live shell.
    pub fn id_registry(&self, shell_ids: impl IntoIterator<Item = String>) -> IdRegistry {
        let mut ids = self.config.site.id_registry();
        for id in shell_ids {
            ids.reserve(id);
        }
        ids
    }

    pub fn title_for(&self, page_title: Option<&str>) -> String {
        self.config.site.document_title(page_title)
    }

    pub fn not_found_title(&self) -> String {
        self.title_for(Some("Not found"))
    }

    pub fn error_title(&self) -> String {
        self.title_for(Some("Error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn session() -> Session {
        Session::new(Arc::new(test_parse_config(
            "[site]\nname = \"Ada\"\ntitle = \"Ada L.\"\nsubtitles = [\"long\", \"short\"]",
        )))
    }

    #[test]
    fn test_tickets_supersede() {
        let session = session();
        let first = session.begin_navigation();
        assert!(session.is_current(first));

        let second = session.begin_navigation();
        assert!(second > first);
        assert!(!session.is_current(first));
        assert!(session.is_current(second));
    }

    #[test]
    fn test_titles_end_with_site_name() {
        let session = session();
        assert_eq!(session.not_found_title(), "Not found · Ada");
        assert_eq!(session.error_title(), "Error · Ada");
        assert_eq!(session.title_for(None), "Ada");
    }

    #[test]
    fn test_default_header_from_config() {
        let session = session();
        assert_eq!(session.default_header().title, "Ada L.");
        assert_eq!(session.default_header().subtitles, ["long", "short"]);
    }

    #[test]
    fn test_id_registry_merges_shell_ids() {
        let session = Session::new(Arc::new(test_parse_config(
            "[site]\nreserved_ids = [\"top\"]",
        )));
        let ids = session.id_registry(["site-nav".to_string()]);
        assert!(ids.contains("top"));
        assert!(ids.contains("site-nav"));
    }

    #[test]
    fn test_current_path() {
        let session = session();
        assert_eq!(session.current_path(), None);
        session.set_current(Some(crate::core::normalize("/projects")));
        assert_eq!(session.current_path().unwrap(), "/projects");
    }
}
