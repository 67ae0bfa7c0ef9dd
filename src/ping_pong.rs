//! Two-slot role rotation for ping-pong rendering.
//!
//! Both slots are owned for the whole lifetime of the pair; only an index
//! changes hands on [`PingPong::swap`]. The input and output slots are always
//! distinct.

/// Identifies one of the two slots of a [`PingPong`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Index into a two-element array.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    /// The other slot.
    #[inline]
    pub fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Two owned values with alternating input/output roles.
#[derive(Debug, Clone)]
pub struct PingPong<T> {
    slots: [T; 2],
    input: Slot,
}

impl<T> PingPong<T> {
    /// Create a pair where `a` starts as the input and `b` as the output.
    pub fn new(a: T, b: T) -> Self {
        Self {
            slots: [a, b],
            input: Slot::A,
        }
    }

    /// Slot currently read from.
    #[inline]
    pub fn input_slot(&self) -> Slot {
        self.input
    }

    /// Slot currently written to.
    #[inline]
    pub fn output_slot(&self) -> Slot {
        self.input.other()
    }

    /// Value currently read from.
    #[inline]
    pub fn input(&self) -> &T {
        &self.slots[self.input.index()]
    }

    /// Value currently written to.
    #[inline]
    pub fn output(&self) -> &T {
        &self.slots[self.output_slot().index()]
    }

    /// Mutable access to the value currently written to.
    #[inline]
    pub fn output_mut(&mut self) -> &mut T {
        let index = self.output_slot().index();
        &mut self.slots[index]
    }

    /// Value in a specific slot, regardless of role.
    #[inline]
    pub fn get(&self, slot: Slot) -> &T {
        &self.slots[slot.index()]
    }

    /// Exchange the input and output roles. No data moves.
    #[inline]
    pub fn swap(&mut self) {
        self.input = self.input.other();
    }

    /// Apply `f` to both values, slot A first.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(Slot, &mut T)) {
        let [a, b] = &mut self.slots;
        f(Slot::A, a);
        f(Slot::B, b);
    }

    /// Both values in slot order.
    pub fn both(&self) -> [&T; 2] {
        [&self.slots[0], &self.slots[1]]
    }
}
