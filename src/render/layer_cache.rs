use crate::error::RenderError;

/// Number of composite layer images a map keeps.
pub const MAP_MAX_RENDER_SLOTS: usize = 5;

/// Lazily filled slot -> composited image table. A slot goes from empty to
/// rendered once and is never invalidated; maps are immutable after load.
pub struct LayerCache<I> {
    slots: [Option<I>; MAP_MAX_RENDER_SLOTS],
    passes: usize,
}

impl<I> Default for LayerCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> LayerCache<I> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            passes: 0,
        }
    }

    fn check(slot: usize) -> Result<(), RenderError> {
        if slot >= MAP_MAX_RENDER_SLOTS {
            return Err(RenderError::InvalidSlot {
                slot,
                max: MAP_MAX_RENDER_SLOTS - 1,
            });
        }
        Ok(())
    }

    pub fn get(&self, slot: usize) -> Result<Option<&I>, RenderError> {
        Self::check(slot)?;
        Ok(self.slots[slot].as_ref())
    }

    pub fn is_rendered(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(Option::is_some)
    }

    /// Stores a freshly composited image. An already rendered slot keeps its
    /// image.
    pub fn store(&mut self, slot: usize, image: I) -> Result<&I, RenderError> {
        Self::check(slot)?;
        let entry = &mut self.slots[slot];
        if entry.is_none() {
            self.passes += 1;
        }
        Ok(&*entry.get_or_insert(image))
    }

    /// How many composite passes have been stored so far.
    pub fn composite_passes(&self) -> usize {
        self.passes
    }
}
