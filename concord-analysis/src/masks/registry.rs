//! Ordered registry of named masks.
//!
//! Registration order is the provenance record of an evaluation: the
//! registry never reorders entries, and re-registering a name replaces
//! the mask in place so the position survives. Stored masks are handed
//! out behind `Arc` and never mutated.

use std::sync::Arc;

use concord_core::errors::MaskError;
use concord_core::types::{FxHashMap, MaskKind};

use crate::store::{RatingStore, StoreIndex};

use super::types::Mask;

/// The result of merging named masks down to one granularity.
#[derive(Debug, Clone)]
pub struct MergedMask {
    /// Union of every convertible mask, at the requested granularity.
    pub mask: Mask,
    /// Names that were skipped because they are finer than the target
    /// and could not be coarsened. Order follows the request.
    pub skipped: Vec<String>,
}

/// Insertion-ordered, overwrite-in-place store of named masks.
#[derive(Debug, Default)]
pub struct MaskRegistry {
    entries: Vec<(String, Arc<Mask>)>,
    by_name: FxHashMap<String, usize>,
}

impl MaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mask under a name. A known name is overwritten in
    /// place and keeps its position; a new name appends.
    pub fn register(&mut self, name: &str, mask: Mask) -> Arc<Mask> {
        let mask = Arc::new(mask);
        match self.by_name.get(name) {
            Some(&slot) => {
                self.entries[slot].1 = Arc::clone(&mask);
            }
            None => {
                self.by_name.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), Arc::clone(&mask)));
            }
        }
        mask
    }

    /// Fetch a mask by name.
    pub fn get(&self, name: &str) -> Result<Arc<Mask>, MaskError> {
        match self.by_name.get(name) {
            Some(&slot) => Ok(Arc::clone(&self.entries[slot].1)),
            None => Err(MaskError::UnknownMask {
                name: name.to_string(),
            }),
        }
    }

    /// Returns true when the name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Registered (name, mask) pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Mask>)> {
        self.entries.iter().map(|(name, mask)| (name.as_str(), mask))
    }

    /// Number of registered masks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge the named masks into a single mask at `target` granularity.
    ///
    /// All names are resolved before anything is combined, so an
    /// unknown name fails the whole merge up front. Masks finer than
    /// `target` are skipped and reported, not failed: a read-side merge
    /// answers "what is excluded at this granularity", and finer
    /// exclusions simply have no representation there. Explicit
    /// [`Mask::convert`] keeps the loud failure for the write side.
    pub fn merge_into(
        &self,
        target: MaskKind,
        names: &[&str],
        store: &RatingStore,
        index: &StoreIndex,
    ) -> Result<MergedMask, MaskError> {
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            resolved.push((*name, self.get(name)?));
        }

        let mut merged = Mask::empty(target, store);
        let mut skipped = Vec::new();
        for (name, mask) in resolved {
            if mask.kind().converts_to(target) {
                let converted = mask.convert(target, index)?;
                merged = merged.combine(&converted)?;
            } else {
                skipped.push(name.to_string());
            }
        }

        Ok(MergedMask {
            mask: merged,
            skipped,
        })
    }
}
