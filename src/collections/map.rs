//! # Specialized Map
//!
//! [`ValueMap`] is an open-addressed hash table with linear probing that
//! stores every mapping as bytes in one contiguous buffer. A slot is a
//! struct laid out by the layout engine:
//!
//! ```text
//! +-----------+---------+-----------+---------+-------------+
//! | hash: u32 | padding | key bytes | padding | value bytes |
//! +-----------+---------+-----------+---------+-------------+
//! ```
//!
//! with auto padding between members and at the end so the slot tiles.
//!
//! ## Hash tagging
//!
//! The stored hash field distinguishes three states on a `u32`:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `0x0000_0000` | empty — probing stops here |
//! | `0x7FFF_FFFF` | tombstone — was occupied, probing continues |
//! | high bit set | occupied, tag = `user_hash \| 0x8000_0000` |
//!
//! Forcing the high bit on real hashes keeps the two sentinels unambiguous,
//! and makes "claimable" a single bit test.
//!
//! ## Sizing
//!
//! Capacity is a power of two, at least 2. A rehash doubles the table as
//! soon as an insertion brings `len` to `capacity / 2`, so the load factor
//! never exceeds one half. Rehashing re-probes each occupied slot from its
//! stored tag and copies the slot bytes verbatim; tombstones are dropped.
//!
//! ## Iteration
//!
//! [`entries`](ValueMap::entries) borrows the map and decodes occupied slots
//! in table order. [`cursor`](ValueMap::cursor) is detached: it revalidates
//! a `mod_count` snapshot on every call, failing with
//! `ConcurrentModification` if the map changed underneath it, and supports
//! removing the most recently returned entry mid-walk.

use std::hash::{BuildHasher, Hash};

use eyre::{bail, Result};
use hashbrown::DefaultHashBuilder;

use crate::access::accessor::Accessor;
use crate::access::codec::{decode_record, encode_record};
use crate::access::record::Record;
use crate::collections::vec::{capacity_for, MAX_ELEMENTS};
use crate::error::Error;
use crate::layout::computed::layout_of;
use crate::layout::descriptor::{FieldDescriptor, TypeDescriptor};
use crate::memory::{Buffer, BufferAllocator};

const EMPTY: u32 = 0;
const TOMBSTONE: u32 = 0x7FFF_FFFF;
const OCCUPIED_BIT: u32 = 0x8000_0000;

/// Layout constants of one slot, fixed at construction.
#[derive(Debug, Clone, Copy)]
struct SlotLayout {
    stride: usize,
    alignment: usize,
    key_offset: usize,
    value_offset: usize,
}

pub struct ValueMap<'alloc, K, V, S = DefaultHashBuilder>
where
    K: Record + Hash + PartialEq,
    V: Record,
    S: BuildHasher,
{
    alloc: &'alloc dyn BufferAllocator,
    key_access: Accessor<K>,
    value_access: Accessor<V>,
    slot: SlotLayout,
    buf: Buffer<'alloc>,
    len: usize,
    mod_count: u64,
    hash_builder: S,
}

impl<'alloc, K, V> ValueMap<'alloc, K, V, DefaultHashBuilder>
where
    K: Record + Hash + PartialEq,
    V: Record,
{
    /// An empty map with the default presize of 16.
    pub fn new(alloc: &'alloc dyn BufferAllocator) -> Result<Self> {
        Self::with_capacity(alloc, 16)
    }

    /// An empty map sized for `presize` mappings up front.
    pub fn with_capacity(alloc: &'alloc dyn BufferAllocator, presize: usize) -> Result<Self> {
        Self::with_hasher(alloc, presize, DefaultHashBuilder::default())
    }
}

impl<'alloc, K, V, S> ValueMap<'alloc, K, V, S>
where
    K: Record + Hash + PartialEq,
    V: Record,
    S: BuildHasher,
{
    /// An empty map with an explicit hash builder.
    pub fn with_hasher(
        alloc: &'alloc dyn BufferAllocator,
        presize: usize,
        hash_builder: S,
    ) -> Result<Self> {
        let key_access = Accessor::<K>::new()?;
        let value_access = Accessor::<V>::new()?;
        // Keys and values must be whole-record codable; surface the failure
        // here rather than on the first put.
        key_access.ops()?;
        value_access.ops()?;

        let slot_desc = TypeDescriptor::struct_of([
            FieldDescriptor::new("hash", TypeDescriptor::U32),
            FieldDescriptor::new("key", K::descriptor()),
            FieldDescriptor::new("value", V::descriptor()),
        ]);
        let slot_layout = layout_of(&slot_desc)?;
        let key_offset = slot_layout
            .field("key")
            .map(|f| f.offset)
            .ok_or_else(|| Error::invalid_layout("slot layout is missing its key member"))?;
        let value_offset = slot_layout
            .field("value")
            .map(|f| f.offset)
            .ok_or_else(|| Error::invalid_layout("slot layout is missing its value member"))?;
        let slot = SlotLayout {
            stride: slot_layout.size,
            alignment: slot_layout.alignment,
            key_offset,
            value_offset,
        };

        let capacity = capacity_for(presize)?;
        let buf = alloc.allocate(capacity * slot.stride, slot.alignment)?;
        Ok(Self {
            alloc,
            key_access,
            value_access,
            slot,
            buf,
            len: 0,
            mod_count: 0,
            hash_builder,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len() / self.slot.stride
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        match self.probe(key)? {
            Some(slot) => self.value_at(slot).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.probe(key)?.is_some())
    }

    /// Walk the probe chain for `key`, returning its slot if present.
    ///
    /// Tombstones are stepped over (their tag matches neither EMPTY nor any
    /// occupied tag). The walk stops at the first empty slot, or after one
    /// full cycle of a table that has none left.
    fn probe(&self, key: &K) -> Result<Option<usize>> {
        let capacity = self.capacity();
        let mask = capacity - 1;
        let hash = self.hash_of(key);
        let tagged = hash | OCCUPIED_BIT;
        let mut index = hash as usize & mask;
        for _ in 0..capacity {
            let tag = self.tag(index);
            if tag == EMPTY {
                return Ok(None);
            }
            if tag == tagged && self.key_at(index)? == *key {
                return Ok(Some(index));
            }
            index = (index + 1) & mask;
        }
        Ok(None)
    }

    /// Insert or overwrite a mapping, returning the previous value if the
    /// key was present.
    ///
    /// A pure value overwrite does not count as a structural mutation; a new
    /// mapping claims the first empty or tombstone slot on the probe path
    /// and rehashes once the table reaches half occupancy.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        let capacity = self.capacity();
        let mask = capacity - 1;
        let hash = self.hash_of(&key);
        let tagged = hash | OCCUPIED_BIT;
        let mut index = hash as usize & mask;

        // First claimable slot on the probe path. A tombstone is only
        // claimed once the walk has ruled out an existing mapping further
        // along the chain, so no key ever occupies two slots.
        let mut claim = None;
        let mut probed = 0;
        let target = loop {
            if probed == capacity {
                break claim;
            }
            let tag = self.tag(index);
            if tag == EMPTY {
                break Some(claim.unwrap_or(index));
            }
            if tag == TOMBSTONE {
                claim.get_or_insert(index);
            } else if tag == tagged && self.key_at(index)? == key {
                let old = self.value_at(index)?;
                self.write_value(index, &value)?;
                return Ok(Some(old));
            }
            index = (index + 1) & mask;
            probed += 1;
        };
        let Some(target) = target else {
            // len < capacity always leaves a claimable slot.
            bail!("hash table has no claimable slot at {} of {capacity}", self.len);
        };

        // Detect a doomed rehash before writing anything so a failed put is
        // a no-op.
        let will_rehash = self.len + 1 == capacity / 2;
        if will_rehash && capacity > MAX_ELEMENTS / 2 {
            bail!(Error::capacity_exceeded(format!(
                "growing past {capacity} slots exceeds the {MAX_ELEMENTS}-element limit"
            )));
        }

        // Key and value land before the tag: the slot stays unclaimed until
        // its bytes are complete.
        let prev_tag = self.tag(target);
        self.write_key(target, &key)?;
        self.write_value(target, &value)?;
        self.set_tag(target, tagged);
        self.len += 1;
        self.mod_count += 1;
        if will_rehash {
            if let Err(err) = self.rehash(capacity * 2) {
                // Allocation failed: withdraw the claim so the map is
                // exactly as it was before the call.
                self.set_tag(target, prev_tag);
                self.len -= 1;
                self.mod_count -= 1;
                return Err(err);
            }
        }
        Ok(None)
    }

    /// Remove a mapping, returning its value if the key was present.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>> {
        let Some(slot) = self.probe(key)? else {
            return Ok(None);
        };
        let value = self.value_at(slot)?;
        self.set_tag(slot, TOMBSTONE);
        self.len -= 1;
        self.mod_count += 1;
        Ok(Some(value))
    }

    /// Borrowing iterator over the mappings, in table order.
    pub fn entries(&self) -> Entries<'_, 'alloc, K, V, S> {
        Entries {
            map: self,
            mod_count: self.mod_count,
            index: 0,
        }
    }

    /// Detached cursor for walks that interleave with removal.
    ///
    /// The cursor snapshots `mod_count`; any structural mutation it did not
    /// perform itself fails the next cursor call with
    /// `ConcurrentModification`.
    pub fn cursor(&self) -> MapCursor {
        MapCursor {
            mod_count: self.mod_count,
            index: 0,
            prev: None,
        }
    }

    /// Double the table, re-probing every occupied slot from its stored tag
    /// and copying slot bytes verbatim. Tombstones are dropped. The new
    /// buffer is published only after every slot has moved.
    fn rehash(&mut self, new_capacity: usize) -> Result<()> {
        let stride = self.slot.stride;
        let mut grown = self
            .alloc
            .allocate(new_capacity * stride, self.slot.alignment)?;
        let mask = new_capacity - 1;
        let old = self.buf.as_slice();
        let new = grown.as_mut_slice();
        for slot in 0..self.capacity() {
            let tag = tag_in(old, slot * stride);
            if tag & OCCUPIED_BIT == 0 {
                continue;
            }
            let mut index = tag as usize & mask;
            while tag_in(new, index * stride) != EMPTY {
                index = (index + 1) & mask;
            }
            new[index * stride..(index + 1) * stride]
                .copy_from_slice(&old[slot * stride..(slot + 1) * stride]);
        }
        self.buf = grown;
        Ok(())
    }

    fn hash_of(&self, key: &K) -> u32 {
        self.hash_builder.hash_one(key) as u32
    }

    fn tag(&self, slot: usize) -> u32 {
        tag_in(self.buf.as_slice(), slot * self.slot.stride)
    }

    fn set_tag(&mut self, slot: usize, tag: u32) {
        let base = slot * self.slot.stride;
        self.buf.as_mut_slice()[base..base + 4].copy_from_slice(&tag.to_ne_bytes());
    }

    fn key_at(&self, slot: usize) -> Result<K> {
        let base = slot * self.slot.stride + self.slot.key_offset;
        decode_record(self.key_access.ops()?, self.buf.as_slice(), base)
    }

    fn value_at(&self, slot: usize) -> Result<V> {
        let base = slot * self.slot.stride + self.slot.value_offset;
        decode_record(self.value_access.ops()?, self.buf.as_slice(), base)
    }

    fn write_key(&mut self, slot: usize, key: &K) -> Result<()> {
        let base = slot * self.slot.stride + self.slot.key_offset;
        encode_record(self.key_access.ops()?, self.buf.as_mut_slice(), base, key)
    }

    fn write_value(&mut self, slot: usize, value: &V) -> Result<()> {
        let base = slot * self.slot.stride + self.slot.value_offset;
        encode_record(
            self.value_access.ops()?,
            self.buf.as_mut_slice(),
            base,
            value,
        )
    }
}

fn tag_in(data: &[u8], base: usize) -> u32 {
    u32::from_ne_bytes([data[base], data[base + 1], data[base + 2], data[base + 3]])
}

impl<K, V, S> std::fmt::Debug for ValueMap<'_, K, V, S>
where
    K: Record + Hash + PartialEq,
    V: Record,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueMap")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("slot_stride", &self.slot.stride)
            .finish()
    }
}

/// Borrowing iterator over a map's mappings.
pub struct Entries<'m, 'alloc, K, V, S>
where
    K: Record + Hash + PartialEq,
    V: Record,
    S: BuildHasher,
{
    map: &'m ValueMap<'alloc, K, V, S>,
    mod_count: u64,
    index: usize,
}

impl<K, V, S> Iterator for Entries<'_, '_, K, V, S>
where
    K: Record + Hash + PartialEq,
    V: Record,
    S: BuildHasher,
{
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.mod_count != self.map.mod_count {
            return Some(Err(Error::ConcurrentModification.into()));
        }
        let capacity = self.map.capacity();
        while self.index < capacity {
            let slot = self.index;
            self.index += 1;
            if self.map.tag(slot) & OCCUPIED_BIT != 0 {
                let entry = self
                    .map
                    .key_at(slot)
                    .and_then(|key| self.map.value_at(slot).map(|value| (key, value)));
                return Some(entry);
            }
        }
        None
    }
}

/// Detached map cursor with mid-walk removal.
///
/// The cursor holds no borrow of the map; instead each call revalidates the
/// `mod_count` snapshot taken at creation (or refreshed by
/// [`remove`](MapCursor::remove)), so a mutation the cursor did not perform
/// fails the walk instead of yielding stale entries.
#[derive(Debug)]
pub struct MapCursor {
    mod_count: u64,
    index: usize,
    prev: Option<usize>,
}

impl MapCursor {
    /// Advance to the next occupied slot and decode its mapping.
    pub fn next<K, V, S>(&mut self, map: &ValueMap<'_, K, V, S>) -> Result<Option<(K, V)>>
    where
        K: Record + Hash + PartialEq,
        V: Record,
        S: BuildHasher,
    {
        if self.mod_count != map.mod_count {
            bail!(Error::ConcurrentModification);
        }
        let capacity = map.capacity();
        while self.index < capacity {
            let slot = self.index;
            self.index += 1;
            if map.tag(slot) & OCCUPIED_BIT != 0 {
                let key = map.key_at(slot)?;
                let value = map.value_at(slot)?;
                self.prev = Some(slot);
                return Ok(Some((key, value)));
            }
        }
        Ok(None)
    }

    /// Remove the most recently returned mapping.
    ///
    /// Tombstones the slot, keeps the walk valid, and resynchronizes the
    /// cursor with the map's new `mod_count`.
    pub fn remove<K, V, S>(&mut self, map: &mut ValueMap<'_, K, V, S>) -> Result<()>
    where
        K: Record + Hash + PartialEq,
        V: Record,
        S: BuildHasher,
    {
        let Some(slot) = self.prev else {
            bail!(Error::invalid_argument(
                "cursor has not returned an entry to remove"
            ));
        };
        if self.mod_count != map.mod_count {
            bail!(Error::ConcurrentModification);
        }
        map.set_tag(slot, TOMBSTONE);
        map.len -= 1;
        map.mod_count += 1;
        self.mod_count = map.mod_count;
        self.prev = None;
        Ok(())
    }
}
