//! What happens to layout entries nothing can build right now.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Dockable;

/// Policy for single ids without a live dockable and for subtrees whose
/// factory is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingStrategy {
    /// Drop the entry.
    #[default]
    Purge,
    /// Remember where missing single dockables were; drop unknown subtrees.
    Single,
    /// Keep everything until it can be resolved.
    Store,
}

impl MissingStrategy {
    pub fn keeps_single(self) -> bool {
        matches!(self, MissingStrategy::Single | MissingStrategy::Store)
    }

    pub fn keeps_multiple(self) -> bool {
        matches!(self, MissingStrategy::Store)
    }
}

/// Creates a stand-in dockable for an id a layout refers to.
pub trait BackupFactory {
    fn create(&self, id: &str) -> Option<Dockable>;
}

impl<F> BackupFactory for F
where
    F: Fn(&str) -> Option<Dockable>,
{
    fn create(&self, id: &str) -> Option<Dockable> {
        self(id)
    }
}

/// Backup factories registered for exact ids or id prefixes. Exact ids win;
/// among prefixes the first registered match is used.
#[derive(Default)]
pub struct BackupRegistry {
    by_id: BTreeMap<String, Box<dyn BackupFactory>>,
    by_prefix: Vec<(String, Box<dyn BackupFactory>)>,
}

impl fmt::Debug for BackupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupRegistry")
            .field("ids", &self.by_id.keys().collect::<Vec<_>>())
            .field(
                "prefixes",
                &self.by_prefix.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl BackupRegistry {
    pub fn insert(&mut self, id: impl Into<String>, factory: impl BackupFactory + 'static) {
        self.by_id.insert(id.into(), Box::new(factory));
    }

    pub fn insert_prefix(&mut self, prefix: impl Into<String>, factory: impl BackupFactory + 'static) {
        self.by_prefix.push((prefix.into(), Box::new(factory)));
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.by_id.remove(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_prefix.is_empty()
    }

    pub fn create(&self, id: &str) -> Option<Dockable> {
        if let Some(factory) = self.by_id.get(id) {
            return factory.create(id);
        }
        self.by_prefix
            .iter()
            .filter(|(prefix, _)| id.starts_with(prefix.as_str()))
            .find_map(|(_, factory)| factory.create(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ids_win_over_prefixes() {
        let mut backups = BackupRegistry::default();
        backups.insert_prefix("panel-", |id: &str| Some(Dockable::text(format!("prefix {id}"))));
        backups.insert("panel-1", |_: &str| Some(Dockable::text("exact")));
        assert_eq!(backups.create("panel-1").unwrap().title(), "exact");
        assert_eq!(backups.create("panel-2").unwrap().title(), "prefix panel-2");
        assert!(backups.create("editor").is_none());
    }

    #[test]
    fn strategy_flags() {
        assert!(!MissingStrategy::Purge.keeps_single());
        assert!(MissingStrategy::Single.keeps_single());
        assert!(!MissingStrategy::Single.keeps_multiple());
        assert!(MissingStrategy::Store.keeps_multiple());
    }
}
