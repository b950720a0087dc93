//! Whitelist/blacklist filtering over bare operation and event names.

use std::collections::HashSet;

/// Name filter shared by every group.
///
/// Matching is on the bare name only, never qualified by group: a listed
/// name is included or excluded identically everywhere it appears.
#[derive(Clone, Debug, Default)]
pub struct NameFilter {
    whitelist: Option<HashSet<String>>,
    blacklist: Option<HashSet<String>>,
}

impl NameFilter {
    /// Build from optional configured lists.
    pub fn new(whitelist: Option<Vec<String>>, blacklist: Option<Vec<String>>) -> Self {
        Self {
            whitelist: whitelist.map(|names| names.into_iter().collect()),
            blacklist: blacklist.map(|names| names.into_iter().collect()),
        }
    }

    /// Whether a bare name survives filtering.
    ///
    /// A whitelist, when present, is authoritative and the blacklist is
    /// ignored entirely. With no whitelist, a name is excluded only when
    /// blacklisted. Total: defined for every string.
    pub fn includes(&self, name: &str) -> bool {
        match &self.whitelist {
            Some(whitelist) => whitelist.contains(name),
            None => self
                .blacklist
                .as_ref()
                .is_none_or(|blacklist| !blacklist.contains(name)),
        }
    }
}
