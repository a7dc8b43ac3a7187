//! State flags of an entity. Any combination may be set at once.

/// Independent boolean states of an [`Entity`](super::Entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntityFlags(pub u16);

impl EntityFlags {
    /// No flag set.
    pub const EMPTY: Self = Self(0);

    /// Facing left. Cleared means facing right.
    pub const DIRECTION: Self = Self(1 << 0);

    /// Fell out of the map; waiting for respawn.
    pub const DEAD: Self = Self(1 << 1);

    pub const IDLING: Self = Self(1 << 2);

    /// Vertical motion is driven by gravity, not ground contact.
    pub const AIRBORNE: Self = Self(1 << 3);

    /// Jump requested; consumed by the next update as an upward impulse.
    pub const JUMPING: Self = Self(1 << 4);

    /// Horizontal input is held; accelerate instead of decelerating.
    pub const TRAVELING: Self = Self(1 << 5);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl std::ops::BitOr for EntityFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
