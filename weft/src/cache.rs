// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide LRU cache of rasterized glyph masks.
//!
//! Masks are keyed by `(font identity, glyph)` and shared by every renderer
//! in the process. The cache is best-effort: an entry that cannot fit even
//! after evicting everything else is silently dropped, and renderers simply
//! re-rasterize on miss.
//!
//! Entries live in a dense vector linked into an LRU list through `u32`
//! indices; vacant slots are threaded into a free list through the same
//! `prev` field, so no per-entry allocation ever happens.

use std::sync::{Arc, LazyLock, RwLock};

use hashbrown::HashMap;

use crate::font::{AlphaMask, Font};
use crate::glyph::{GlyphId, PackedGlyph};

/// Default cache capacity, in bytes.
pub const DEFAULT_CAPACITY: usize = 8 * 1024 * 1024;

const MAX_CAPACITY: usize = 1024 * 1024 * 1024;

/// Approximate bookkeeping cost charged per cached mask.
const ENTRY_OVERHEAD: usize = 32;

/// Alpha-only CPU backend: one byte per mask pixel.
const BYTES_PER_PIXEL: usize = 1;

const NO_ENTRY: u32 = u32::MAX;

static SHARED: LazyLock<MaskCache> = LazyLock::new(|| MaskCache::new(DEFAULT_CAPACITY));

/// The process-wide cache instance.
pub(crate) fn shared() -> &'static MaskCache {
    &SHARED
}

/// Returns the current capacity of the glyph-mask cache, in bytes.
pub fn capacity() -> usize {
    shared().capacity()
}

/// Sets the capacity of the glyph-mask cache, in bytes. The default is
/// [`DEFAULT_CAPACITY`]; values above 1 GiB are clamped.
///
/// Setting the capacity to zero flushes the cache. Entries are otherwise
/// evicted automatically with an LRU policy, so manual flushing is rarely
/// needed.
pub fn set_capacity(bytes: usize) {
    shared().set_capacity(bytes);
}

/// Returns an approximation of the bytes currently held by cached masks.
pub fn current_size() -> usize {
    shared().current_size()
}

/// Returns the maximum value [`current_size`] has ever reached. Useful to
/// pick a sensible capacity for an application.
pub fn peak_size() -> usize {
    shared().peak_size()
}

/// Returns the number of masks currently cached.
pub fn num_entries() -> usize {
    shared().num_entries()
}

/// Fetches the glyph's mask from the shared cache, rasterizing and caching
/// it on miss. Rasterization happens outside the cache lock.
pub(crate) fn load_mask(font: &dyn Font, glyph: GlyphId) -> Arc<AlphaMask> {
    let font_id = font.id();
    let glyph_bits = PackedGlyph::from(glyph).bits();
    if let Some(mask) = shared().get(font_id, glyph_bits) {
        return mask;
    }
    let mask = Arc::new(font.rasterize(glyph));
    shared().put(font_id, glyph_bits, Some(mask.clone()));
    mask
}

struct Entry {
    mask: Option<Arc<AlphaMask>>,
    font_id: u64,
    glyph_bits: u32,
    byte_size: u32,
    /// Link toward the LRU end; doubles as the free-list link when vacant.
    prev: u32,
    /// Link toward the MRU end.
    next: u32,
}

struct Store {
    map: HashMap<(u64, u32), u32>,
    entries: Vec<Entry>,
    lru: u32,
    mru: u32,
    next_free: u32,
    capacity: usize,
    current_size: usize,
    peak_size: usize,
}

pub(crate) struct MaskCache {
    store: RwLock<Store>,
}

fn mask_byte_size(mask: Option<&AlphaMask>) -> usize {
    let pixels = mask.map_or(0, |m| {
        m.bounds().width().max(0) as usize * m.bounds().height().max(0) as usize
    });
    pixels * BYTES_PER_PIXEL + ENTRY_OVERHEAD
}

fn clamped_capacity(bytes: usize) -> usize {
    if bytes > MAX_CAPACITY {
        log::warn!("excessive glyph-mask cache capacity requested, limited to 1GiB");
        MAX_CAPACITY
    } else {
        bytes
    }
}

impl MaskCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            store: RwLock::new(Store {
                map: HashMap::with_capacity(64),
                entries: Vec::with_capacity(64),
                lru: NO_ENTRY,
                mru: NO_ENTRY,
                next_free: NO_ENTRY,
                capacity: clamped_capacity(capacity),
                current_size: 0,
                peak_size: 0,
            }),
        }
    }

    /// Looks up a cached mask. Does not affect the entry's LRU position;
    /// only [`MaskCache::put`] promotes entries.
    pub(crate) fn get(&self, font_id: u64, glyph_bits: u32) -> Option<Arc<AlphaMask>> {
        let store = self.store.read().unwrap();
        let index = *store.map.get(&(font_id, glyph_bits))?;
        store.entries[index as usize].mask.clone()
    }

    /// Inserts or replaces a mask, evicting from the LRU end as needed and
    /// promoting the entry to MRU. Masks that cannot fit even after full
    /// eviction are dropped.
    pub(crate) fn put(&self, font_id: u64, glyph_bits: u32, mask: Option<Arc<AlphaMask>>) {
        let new_size = mask_byte_size(mask.as_deref());
        let mut store = self.store.write().unwrap();
        if new_size > store.capacity {
            return;
        }
        let key = (font_id, glyph_bits);
        match store.map.get(&key).copied() {
            Some(index) => {
                // Detach while replacing so eviction can't free the slot.
                store.unlink(index);
                let old_size = store.entries[index as usize].byte_size as usize;
                store.current_size -= old_size;
                store.evict_until_fits(new_size);
                let entry = &mut store.entries[index as usize];
                entry.mask = mask;
                entry.byte_size = new_size as u32;
                store.current_size += new_size;
                store.push_mru(index);
            }
            None => {
                store.evict_until_fits(new_size);
                let index = store.alloc_entry(font_id, glyph_bits, mask, new_size as u32);
                store.current_size += new_size;
                store.map.insert(key, index);
                store.push_mru(index);
            }
        }
        store.peak_size = store.peak_size.max(store.current_size);
    }

    pub(crate) fn set_capacity(&self, bytes: usize) {
        let bytes = clamped_capacity(bytes);
        let mut store = self.store.write().unwrap();
        if bytes == 0 {
            store.map.clear();
            store.entries.clear();
            store.lru = NO_ENTRY;
            store.mru = NO_ENTRY;
            store.next_free = NO_ENTRY;
            store.current_size = 0;
        } else {
            while store.current_size > bytes {
                store.evict_oldest();
            }
        }
        store.capacity = bytes;
    }

    pub(crate) fn capacity(&self) -> usize {
        self.store.read().unwrap().capacity
    }

    pub(crate) fn current_size(&self) -> usize {
        self.store.read().unwrap().current_size
    }

    pub(crate) fn peak_size(&self) -> usize {
        self.store.read().unwrap().peak_size
    }

    pub(crate) fn num_entries(&self) -> usize {
        self.store.read().unwrap().map.len()
    }
}

impl Store {
    /// Removes the entry from the recency list, fixing up neighbors and the
    /// list heads. The entry itself keeps its links.
    fn unlink(&mut self, index: u32) {
        let (prev, next) = {
            let entry = &self.entries[index as usize];
            (entry.prev, entry.next)
        };
        if prev != NO_ENTRY {
            self.entries[prev as usize].next = next;
        } else {
            debug_assert_eq!(self.lru, index);
            self.lru = next;
        }
        if next != NO_ENTRY {
            self.entries[next as usize].prev = prev;
        } else {
            debug_assert_eq!(self.mru, index);
            self.mru = prev;
        }
    }

    fn push_mru(&mut self, index: u32) {
        let old_mru = self.mru;
        {
            let entry = &mut self.entries[index as usize];
            entry.prev = old_mru;
            entry.next = NO_ENTRY;
        }
        if old_mru != NO_ENTRY {
            self.entries[old_mru as usize].next = index;
        } else {
            self.lru = index;
        }
        self.mru = index;
    }

    fn evict_until_fits(&mut self, new_size: usize) {
        while self.current_size + new_size > self.capacity {
            if self.lru == NO_ENTRY {
                // Everything linked has been evicted and it still doesn't
                // fit: the accounting is broken.
                panic!("glyph-mask cache size accounting is inconsistent");
            }
            self.evict_oldest();
        }
    }

    fn evict_oldest(&mut self) {
        let index = self.lru;
        assert!(index != NO_ENTRY, "evicting from an empty glyph-mask cache");
        self.unlink(index);
        let (key, byte_size) = {
            let entry = &mut self.entries[index as usize];
            entry.mask = None;
            let byte_size = entry.byte_size;
            entry.byte_size = 0;
            ((entry.font_id, entry.glyph_bits), byte_size)
        };
        self.current_size -= byte_size as usize;
        self.map.remove(&key);
        // Thread the vacant slot into the free list.
        let next_free = self.next_free;
        let entry = &mut self.entries[index as usize];
        entry.prev = next_free;
        entry.next = NO_ENTRY;
        self.next_free = index;
    }

    fn alloc_entry(
        &mut self,
        font_id: u64,
        glyph_bits: u32,
        mask: Option<Arc<AlphaMask>>,
        byte_size: u32,
    ) -> u32 {
        if self.next_free != NO_ENTRY {
            let index = self.next_free;
            let entry = &mut self.entries[index as usize];
            self.next_free = entry.prev;
            entry.mask = mask;
            entry.font_id = font_id;
            entry.glyph_bits = glyph_bits;
            entry.byte_size = byte_size;
            entry.prev = NO_ENTRY;
            entry.next = NO_ENTRY;
            index
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                mask,
                font_id,
                glyph_bits,
                byte_size,
                prev: NO_ENTRY,
                next: NO_ENTRY,
            });
            index
        }
    }
}
