use bumpalo::Bump;

#[derive(Default)]
pub struct InternerArena {
    vec: Vec<*const str>,
    alloc: Bump,
}

// Safety: the pointers in `vec` point into `alloc`, which is owned by the arena
// and moves with it. Strings are never mutated after being allocated.
unsafe impl Send for InternerArena {}

impl InternerArena {
    #[inline]
    pub fn push_str(&mut self, s: &str) -> usize {
        let index = self.vec.len();

        let s = &*self.alloc.alloc_str(s);
        self.vec.push(s as *const str);

        index
    }

    /// Returns a pointer to the string at `index`.
    ///
    /// The pointer stays valid for as long as the arena is alive: the bump
    /// allocator is never reset and allocations never move.
    #[inline]
    pub fn get_ptr(&self, index: usize) -> Option<*const str> {
        self.vec.get(index).copied()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        // Safety: see `get_ptr`. There are no mutable references to the string.
        self.get_ptr(index).map(|ptr| unsafe { &*ptr })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len()
    }
}
