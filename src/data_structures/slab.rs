use std::fmt::{self, Display, Formatter};

/// Index into a [Slab], stamped with the generation of the slot it was issued for.
///
/// Once the item is removed, the slot's generation moves on and every old [SlabIndex]
/// pointing at it stops resolving, even after the slot is reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SlabIndex {
    slot: usize,
    generation: u32,
}
impl SlabIndex {
    /// Returns the slot position of the index, useful for stable debug output.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Returns the generation the index was issued for.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}
impl Display for SlabIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    generation: u32,
    item: Option<T>,
}

/// Generational slab allocator. Stores items of the same type and reuses removed slots
/// without ever resolving a stale index to the new occupant.
///
/// # Example
///
/// ```
/// # use logik::data_structures::Slab;
/// let mut s = Slab::new();
///
/// let index = s.insert(5);
/// assert_eq!(s.get(index), Some(&5));
///
/// assert_eq!(s.remove(index), Some(5));
/// assert_eq!(s.get(index), None);
///
/// // The slot gets reused, the old index stays dead.
/// let new_index = s.insert(6);
/// assert_eq!(s.get(index), None);
/// assert_eq!(s.get(new_index), Some(&6));
/// ```
#[derive(Debug, Clone)]
pub struct Slab<T: Sized> {
    data: Vec<Entry<T>>,
    removed_slots: Vec<usize>,
}
impl<T: Sized> Slab<T> {
    /// Returns an empty [Slab].
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            removed_slots: Default::default(),
        }
    }

    /// Inserts an item into the slab and returns its index.
    ///
    /// Will reuse an empty slot if one is available.
    pub fn insert(&mut self, item: T) -> SlabIndex {
        if let Some(slot) = self.removed_slots.pop() {
            let entry = &mut self.data[slot];
            entry.item = Some(item);
            SlabIndex {
                slot,
                generation: entry.generation,
            }
        } else {
            let slot = self.data.len();
            self.data.push(Entry {
                generation: 0,
                item: Some(item),
            });
            SlabIndex { slot, generation: 0 }
        }
    }

    /// Returns a mutable reference to the item at `index`.
    ///
    /// Returns [None] if `index` has been removed.
    pub fn get_mut(&mut self, index: SlabIndex) -> Option<&mut T> {
        match self.data.get_mut(index.slot) {
            Some(entry) if entry.generation == index.generation => entry.item.as_mut(),
            _ => None,
        }
    }

    /// Return a reference to the item at `index`.
    ///
    /// Returns [None] if `index` has been removed.
    pub fn get(&self, index: SlabIndex) -> Option<&T> {
        match self.data.get(index.slot) {
            Some(entry) if entry.generation == index.generation => entry.item.as_ref(),
            _ => None,
        }
    }

    /// Returns true if `index` still points at a live item.
    pub fn contains(&self, index: SlabIndex) -> bool {
        self.get(index).is_some()
    }

    /// Removes an item from the Slab and returns it.
    ///
    /// Returns [None] if `index` has been removed.
    /// The slot will be reused on the next call to [Slab::insert] under a new generation.
    pub fn remove(&mut self, index: SlabIndex) -> Option<T> {
        let entry = self.data.get_mut(index.slot)?;
        if entry.generation != index.generation {
            return None;
        }
        let item = entry.item.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.removed_slots.push(index.slot);
        Some(item)
    }

    /// Returns the number of items in the slab.
    ///
    /// This is different from the number of allocated slots in the slab, see [Slab::total_len]
    pub fn len(&self) -> usize {
        self.data.len() - self.removed_slots.len()
    }

    /// Returns true if the number of items in the slab is 0.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of allocated slots in the slab, some of them could be empty.
    pub fn total_len(&self) -> usize {
        self.data.len()
    }

    /// Returns an iterator over pairs of ```(SlabIndex, &T)```.
    pub fn iter(&self) -> impl Iterator<Item = (SlabIndex, &T)> {
        self.data.iter().enumerate().filter_map(|(slot, entry)| {
            let item = entry.item.as_ref()?;
            Some((
                SlabIndex {
                    slot,
                    generation: entry.generation,
                },
                item,
            ))
        })
    }

    /// Returns an iterator over pairs of ```(SlabIndex, &mut T)```.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlabIndex, &mut T)> {
        self.data.iter_mut().enumerate().filter_map(|(slot, entry)| {
            let generation = entry.generation;
            let item = entry.item.as_mut()?;
            Some((SlabIndex { slot, generation }, item))
        })
    }

    /// Returns the indexes of all live items.
    pub fn indexes(&self) -> Vec<SlabIndex> {
        self.iter().map(|(index, _)| index).collect()
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}
