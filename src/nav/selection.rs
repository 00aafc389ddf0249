//! Selection lock.
//!
//! Only one logical region (a sidenote, a math block, a table or the main
//! text) may hold a text selection at a time. The state machine here is
//! generic over how a host identifies a region.

/// Kind of selection region, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Sidenote,
    Math,
    Table,
    Main,
}

impl RegionKind {
    /// Region kind of an element, if it delimits one.
    pub fn classify(tag: &str, classes: &str) -> Option<Self> {
        let has = |name: &str| classes.split_ascii_whitespace().any(|c| c == name);
        if has("sidenote") {
            Some(Self::Sidenote)
        } else if has("math-display") {
            Some(Self::Math)
        } else if tag.eq_ignore_ascii_case("table") {
            Some(Self::Table)
        } else if tag.eq_ignore_ascii_case("main") || has("page-content") {
            Some(Self::Main)
        } else {
            None
        }
    }

    /// Value of the body-level lock attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sidenote => "sidenote",
            Self::Math => "math",
            Self::Table => "table",
            Self::Main => "main",
        }
    }
}

/// Closest region along an ancestor chain (innermost first).
pub fn closest_region<I, T, S1, S2>(chain: I) -> Option<(T, RegionKind)>
where
    I: IntoIterator<Item = (T, S1, S2)>,
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    chain.into_iter().find_map(|(node, tag, classes)| {
        RegionKind::classify(tag.as_ref(), classes.as_ref()).map(|kind| (node, kind))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockChange<R> {
    Unchanged,
    Locked(R),
    Released,
}

#[derive(Debug, Clone)]
pub struct SelectionLock<R> {
    active: Option<R>,
    pointer_down: bool,
}

impl<R> Default for SelectionLock<R> {
    fn default() -> Self {
        Self {
            active: None,
            pointer_down: false,
        }
    }
}

impl<R: Clone + PartialEq> SelectionLock<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&R> {
        self.active.as_ref()
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn pointer_down(&mut self, region: Option<R>) -> LockChange<R> {
        match region {
            Some(region) => {
                self.pointer_down = true;
                self.lock(region)
            }
            None => self.release(),
        }
    }

    /// `collapsed` is true for an empty or caret-only selection; `region`
    /// comes from the selection's anchor and focus.
    pub fn selection_change(&mut self, collapsed: bool, region: Option<R>) -> LockChange<R> {
        if collapsed && !self.pointer_down {
            return self.release();
        }
        match region {
            Some(region) => self.lock(region),
            None => LockChange::Unchanged,
        }
    }

    pub fn pointer_up(&mut self, collapsed: bool) -> LockChange<R> {
        self.pointer_down = false;
        if collapsed {
            self.release()
        } else {
            LockChange::Unchanged
        }
    }

    /// Drop the lock outright (new content was mounted).
    pub fn reset(&mut self) -> LockChange<R> {
        self.pointer_down = false;
        self.release()
    }

    fn lock(&mut self, region: R) -> LockChange<R> {
        if self.active.as_ref() == Some(&region) {
            return LockChange::Unchanged;
        }
        self.active = Some(region.clone());
        LockChange::Locked(region)
    }

    fn release(&mut self) -> LockChange<R> {
        match self.active.take() {
            Some(_) => LockChange::Released,
            None => LockChange::Unchanged,
        }
    }
}
