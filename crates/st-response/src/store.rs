//! Shaped/original response pairs for every loop.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use st_core::Frd;

use crate::types::{FrdPair, LoopType, ResponseType};

/// Every [`ResponseType`] with its shaped and original FRD.
///
/// `shaped` is rewritten on each recompute; `original` only changes through
/// the explicit copy operations or when the engine seeds a fallback plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStore {
    entries: BTreeMap<ResponseType, FrdPair>,
}

impl Default for ResponseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseStore {
    /// A fresh store with an empty pair for every response.
    pub fn new() -> Self {
        Self {
            entries: ResponseType::ALL
                .into_iter()
                .map(|r| (r, FrdPair::default()))
                .collect(),
        }
    }

    pub fn pair(&self, response: ResponseType) -> Option<&FrdPair> {
        self.entries.get(&response)
    }

    pub fn shaped(&self, response: ResponseType) -> Option<&Frd> {
        self.pair(response).and_then(|p| p.shaped.as_ref())
    }

    pub fn original(&self, response: ResponseType) -> Option<&Frd> {
        self.pair(response).and_then(|p| p.original.as_ref())
    }

    pub fn set_shaped(&mut self, response: ResponseType, frd: Frd) {
        self.entries.entry(response).or_default().shaped = Some(frd);
    }

    pub fn set_original(&mut self, response: ResponseType, frd: Frd) {
        self.entries.entry(response).or_default().original = Some(frd);
    }

    pub fn clear_shaped(&mut self) {
        for pair in self.entries.values_mut() {
            pair.shaped = None;
        }
    }

    pub fn copy_shaped_to_original(&mut self) {
        for pair in self.entries.values_mut() {
            pair.original = pair.shaped.clone();
        }
    }

    pub fn copy_original_to_shaped(&mut self) {
        for pair in self.entries.values_mut() {
            pair.shaped = pair.original.clone();
        }
    }

    /// Replaces every shaped entry with `other`'s.
    pub fn copy_shaped_from(&mut self, other: &ResponseStore) {
        for r in ResponseType::ALL {
            self.entries.entry(r).or_default().shaped = other.shaped(r).cloned();
        }
    }

    /// Replaces every original entry with `other`'s.
    pub fn copy_original_from(&mut self, other: &ResponseStore) {
        for r in ResponseType::ALL {
            self.entries.entry(r).or_default().original = other.original(r).cloned();
        }
    }

    /// Shaped responses of `loop_type` that are currently populated.
    pub fn shaped_for(&self, loop_type: LoopType) -> impl Iterator<Item = (ResponseType, &Frd)> {
        loop_type
            .responses()
            .filter_map(|r| self.shaped(r).map(|frd| (r, frd)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResponseType, &FrdPair)> {
        self.entries.iter().map(|(r, p)| (*r, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_core::Complex64;

    fn frd(v: f64) -> Frd {
        Frd::constant(&[1.0, 2.0, 3.0], Complex64::new(v, 0.0))
    }

    #[test]
    fn new_store_has_every_entry_empty() {
        let store = ResponseStore::new();
        assert_eq!(store.iter().count(), 25);
        assert!(store.iter().all(|(_, p)| p.shaped.is_none() && p.original.is_none()));
    }

    #[test]
    fn clear_only_touches_shaped() {
        let mut store = ResponseStore::new();
        store.set_shaped(ResponseType::ServoPlant, frd(1.0));
        store.set_original(ResponseType::ServoPlant, frd(2.0));
        store.clear_shaped();
        assert!(store.shaped(ResponseType::ServoPlant).is_none());
        assert_eq!(store.original(ResponseType::ServoPlant), Some(&frd(2.0)));
    }

    #[test]
    fn copies_are_explicit_and_deep() {
        let mut store = ResponseStore::new();
        store.set_shaped(ResponseType::ServoOpenLoop, frd(1.0));
        store.copy_shaped_to_original();
        store.set_shaped(ResponseType::ServoOpenLoop, frd(5.0));
        assert_eq!(store.original(ResponseType::ServoOpenLoop), Some(&frd(1.0)));

        store.copy_original_to_shaped();
        assert_eq!(store.shaped(ResponseType::ServoOpenLoop), Some(&frd(1.0)));

        let mut other = ResponseStore::new();
        other.copy_shaped_from(&store);
        assert_eq!(other.shaped(ResponseType::ServoOpenLoop), Some(&frd(1.0)));
        assert!(other.original(ResponseType::ServoOpenLoop).is_none());
        assert_eq!(other.shaped_for(LoopType::Servo).count(), 1);
        assert_eq!(other.shaped_for(LoopType::Current).count(), 0);
    }
}
