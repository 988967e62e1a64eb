#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Vertex {
        Vertex { x, y }
    }
}

/// Linear triangle. Node ids are stored counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub nodes: [usize; 3],
}

/// How boundary rows of the stiffness matrix are constrained
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DirichletMethod {
    /// Zero boundary rows and columns, put 1 on the diagonal
    #[default]
    Elimination,
    /// Add `factor * max|A_ij|` to boundary diagonal entries
    Penalty { factor: f64 },
}

pub const DEFAULT_PENALTY_FACTOR: f64 = 1e5;
