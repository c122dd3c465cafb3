/// Per-node role during a relaxation sweep at the current spacing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeStatus {
    /// Plain 12-point stencil update.
    #[default]
    Unconstrained = 0,
    /// Nearest datum lies in the quadrant `dx >= 0, dy >= 0`.
    Quadrant1 = 1,
    /// `dx < 0, dy >= 0`.
    Quadrant2 = 2,
    /// `dx < 0, dy < 0`.
    Quadrant3 = 3,
    /// `dx >= 0, dy < 0`.
    Quadrant4 = 4,
    /// Value fixed by a coincident datum or by the coarser level.
    Constrained = 5,
}

impl NodeStatus {
    /// Quadrant of the offset `(dx, dy)` from a node to its nearest datum.
    pub fn from_offset(dx: f64, dy: f64) -> Self {
        match (dx >= 0.0, dy >= 0.0) {
            (true, true) => NodeStatus::Quadrant1,
            (false, true) => NodeStatus::Quadrant2,
            (false, false) => NodeStatus::Quadrant3,
            (true, false) => NodeStatus::Quadrant4,
        }
    }

    /// Quadrant number `1..=4`, or `None` for the other states.
    #[inline]
    pub fn quadrant(self) -> Option<usize> {
        match self {
            NodeStatus::Quadrant1 => Some(1),
            NodeStatus::Quadrant2 => Some(2),
            NodeStatus::Quadrant3 => Some(3),
            NodeStatus::Quadrant4 => Some(4),
            _ => None,
        }
    }

    #[inline]
    pub fn is_constrained(self) -> bool {
        self == NodeStatus::Constrained
    }
}
