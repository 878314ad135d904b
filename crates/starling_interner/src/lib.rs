//! A string interner that can be shared between threads.
//!
//! Interning the same text twice returns the same [`Istr`], so identifiers can
//! be compared by handle instead of by content. The only mutation is
//! insert-if-absent, done under a lock; interned strings live in an arena
//! owned by the [`Interner`] and are never freed before it is dropped.

mod arena;

use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Index;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ahash::RandomState;
use arena::InternerArena;
use hashbrown::hash_table::Entry;
use hashbrown::HashTable;

/// Handle to an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Istr(NonZeroUsize);

#[derive(Default)]
pub struct Interner {
    inner: Mutex<InternerInner>,
}

#[derive(Default)]
struct InternerInner {
    random_state: RandomState,
    lookup: HashTable<LookupEntry>,
    arena: InternerArena,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, s: &str) -> Istr {
        let mut inner = self.lock();
        let InternerInner {
            random_state,
            lookup,
            arena,
        } = &mut *inner;

        let hash = random_state.hash_one(s);

        let entry = lookup.entry(
            hash,
            |entry| arena.get(entry.index) == Some(s),
            |entry| entry.hash,
        );

        let index = match entry {
            Entry::Occupied(entry) => entry.get().index,
            Entry::Vacant(entry) => {
                let index = arena.push_str(s);
                entry.insert(LookupEntry { index, hash });
                index
            }
        };

        Istr(NonZeroUsize::MIN.saturating_add(index))
    }

    /// Returns the string for a handle, or `None` if the handle was created
    /// by a different interner and is out of range.
    pub fn get(&self, istr: Istr) -> Option<&str> {
        let ptr = self.lock().arena.get_ptr(istr.0.get() - 1)?;

        // Safety: the arena is owned by `self` and never frees or moves its
        // strings, so the pointer is valid for the lifetime of `&self`.
        Some(unsafe { &*ptr })
    }

    /// Every interned string in the order it was first interned. A handle
    /// serializes as its position in this list plus one.
    pub fn strings(&self) -> Vec<&str> {
        let inner = self.lock();

        (0..inner.arena.len())
            .filter_map(|index| inner.arena.get_ptr(index))
            // Safety: see `get`.
            .map(|ptr| unsafe { &*ptr })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, InternerInner> {
        // Insertion never leaves the table half-updated, so a poisoned lock is
        // still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Index<Istr> for Interner {
    type Output = str;

    /// # Panics
    /// Panics if the handle does not belong to this interner.
    fn index(&self, istr: Istr) -> &Self::Output {
        self.get(istr).expect("string not in interner")
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
struct LookupEntry {
    index: usize,
    hash: u64,
}
