// src/water/floors.rs
// Per-floor water entries, active floor selection, and the upper-floor occluder binding
// The binder never owns collaborator views beyond a shared handle it can release
// RELEVANT FILES: src/water/pass.rs, src/water/populate.rs

use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared handle to an externally owned occluder view.
///
/// `released` marks a binding the floor bus has withdrawn; a released
/// binding reports no view even if the caller still holds the handle.
#[derive(Debug)]
pub struct OccluderBinding<O> {
    handle: Option<O>,
    released: bool,
}

impl<O> Default for OccluderBinding<O> {
    fn default() -> Self {
        Self {
            handle: None,
            released: false,
        }
    }
}

impl<O> OccluderBinding<O> {
    pub fn bind(&mut self, handle: O) {
        self.handle = Some(handle);
        self.released = false;
    }

    pub fn release(&mut self) {
        self.handle = None;
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn get(&self) -> Option<&O> {
        if self.released {
            None
        } else {
            self.handle.as_ref()
        }
    }
}

/// Floor-indexed entries with "highest floor at or below the viewer" selection.
#[derive(Debug)]
pub struct FloorBinder<T, O = Arc<wgpu::TextureView>> {
    floors: BTreeMap<usize, T>,
    active: Option<usize>,
    max_visible: usize,
    occluder: OccluderBinding<O>,
}

impl<T, O> Default for FloorBinder<T, O> {
    fn default() -> Self {
        Self {
            floors: BTreeMap::new(),
            active: None,
            max_visible: 0,
            occluder: OccluderBinding::default(),
        }
    }
}

impl<T, O> FloorBinder<T, O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, floor: usize, entry: T) {
        self.floors.insert(floor, entry);
    }

    /// Replace every entry and reselect against the last requested floor.
    pub fn replace_all(&mut self, floors: impl IntoIterator<Item = (usize, T)>) {
        self.floors = floors.into_iter().collect();
        self.select(self.max_visible);
    }

    pub fn clear(&mut self) {
        self.floors.clear();
        self.active = None;
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn get(&self, floor: usize) -> Option<&T> {
        self.floors.get(&floor)
    }

    /// Activate the highest floor with water at or below `max_floor`.
    pub fn select(&mut self, max_floor: usize) -> Option<usize> {
        self.max_visible = max_floor;
        self.active = self.floors.range(..=max_floor).next_back().map(|(k, _)| *k);
        self.active
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&T> {
        self.active.and_then(|k| self.floors.get(&k))
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn occluder(&self) -> Option<&O> {
        self.occluder.get()
    }

    pub fn bind_occluder(&mut self, handle: O) {
        self.occluder.bind(handle);
    }

    pub fn release_occluder(&mut self) {
        self.occluder.release();
    }

    pub fn occluder_released(&self) -> bool {
        self.occluder.is_released()
    }
}
