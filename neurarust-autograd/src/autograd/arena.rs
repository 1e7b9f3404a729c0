// Generation-checked slot arena backing the computation graph.
//
// A slot's generation is bumped every time it is freed, so an id handed out before
// the slot was reused no longer resolves.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct RawId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Debug)]
struct Slot<N> {
    generation: u32,
    node: Option<N>,
}

#[derive(Debug)]
pub(crate) struct Arena<N> {
    slots: Vec<Slot<N>>,
    free: Vec<u32>,
    live: usize,
    /// Most slots this arena will ever allocate; ids index with `u32`.
    limit: usize,
}

impl<N> Arena<N> {
    pub(crate) fn new() -> Self {
        Self::with_limit(u32::MAX as usize)
    }

    pub(crate) fn with_limit(limit: usize) -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            limit,
        }
    }

    /// Stores `node`, reusing a freed slot when there is one.
    ///
    /// # Panics
    /// When every slot up to the arena's limit (`u32::MAX` for graphs) is live. Running out
    /// of 32-bit ids is treated like running out of memory.
    pub(crate) fn insert(&mut self, node: N) -> RawId {
        if let Some(index) = self.free.pop() {
            self.live += 1;
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return RawId {
                index,
                generation: slot.generation,
            };
        }
        if self.slots.len() >= self.limit {
            panic!("graph arena is full: {} live slots", self.live);
        }
        let index = self.slots.len() as u32;
        self.live += 1;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        RawId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn get(&self, id: RawId) -> Option<&N> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: RawId) -> Option<&mut N> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn remove(&mut self, id: RawId) -> Option<N> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(node)
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (RawId, &mut N)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.node.as_mut().map(|node| {
                (
                    RawId {
                        index: index as u32,
                        generation,
                    },
                    node,
                )
            })
        })
    }
}
