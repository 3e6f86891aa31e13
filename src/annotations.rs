//! Boundary between rendered groups and whatever displays them.
//!
//! Every group becomes one named annotation set, `hotspots-0`,
//! `hotspots-1`, ... Names are handed out densely from zero so that a later
//! process can remove them all by probing names in order until one is
//! missing.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::Result;
use crate::model::AnnotationGroup;

pub const KEY_PREFIX: &str = "hotspots-";

/// Name of the `index`-th annotation set.
#[must_use]
pub fn region_key(index: usize) -> String {
    format!("{KEY_PREFIX}{index}")
}

/// A view that can display named sets of line annotations.
pub trait AnnotationView {
    /// Create or replace the annotation set `key`.
    fn add_regions(&mut self, key: &str, group: &AnnotationGroup) -> Result<()>;

    /// Whether an annotation set named `key` exists.
    fn has_regions(&self, key: &str) -> Result<bool>;

    /// Remove the annotation set `key`. Removing a missing set is not an error.
    fn erase_regions(&mut self, key: &str) -> Result<()>;
}

/// The annotation sets created by one call to [`render_hotspots`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotspotRegistry {
    keys: BTreeSet<String>,
}

impl HotspotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Erase every registered set from `view` without querying it first.
    /// Returns the number of sets erased.
    pub fn clear(&mut self, view: &mut dyn AnnotationView) -> Result<usize> {
        let count = self.keys.len();
        for key in &self.keys {
            view.erase_regions(key)?;
        }
        self.keys.clear();
        debug!(count, "cleared registered hotspots");
        Ok(count)
    }
}

/// Display `groups` in `view`, replacing any hotspots shown before.
///
/// Existing sets are swept first so the new names start at zero with no
/// stale sets left behind them.
pub fn render_hotspots(
    view: &mut dyn AnnotationView,
    groups: &[AnnotationGroup],
) -> Result<HotspotRegistry> {
    clear_hotspots(view)?;

    let mut registry = HotspotRegistry::new();
    for (i, group) in groups.iter().enumerate() {
        let key = region_key(i);
        view.add_regions(&key, group)?;
        registry.keys.insert(key);
    }

    debug!(count = registry.len(), "rendered hotspots");
    Ok(registry)
}

/// Remove every hotspot set from `view`, probing `hotspots-0`,
/// `hotspots-1`, ... and stopping at the first name that does not exist.
/// Returns the number of sets removed.
pub fn clear_hotspots(view: &mut dyn AnnotationView) -> Result<usize> {
    let mut index = 0;
    loop {
        let key = region_key(index);
        if !view.has_regions(&key)? {
            break;
        }
        view.erase_regions(&key)?;
        index += 1;
    }

    debug!(count = index, "cleared hotspots");
    Ok(index)
}
