//! Navigation: session state, the fragment loader, history and selection.
//!
//! ```text
//! nav/
//! ├── session     # Session: config, routes, current path, tickets
//! ├── loader      # load_route / relayout
//! ├── host        # Host trait (the document seam)
//! ├── history     # NavigationState, popstate and link-click decisions
//! └── selection   # SelectionLock state machine
//! ```

pub mod history;
pub mod host;
mod loader;
pub mod selection;
mod session;

#[cfg(test)]
mod tests;

pub use history::{HistoryMode, NavigationState};
pub use host::{Fade, FetchError, Host, Placeholder};
pub use loader::{NavOutcome, load_route, relayout};
pub use selection::{RegionKind, SelectionLock};
pub use session::{NavTicket, Session};
