use tracing::debug;

use crate::{
    datatypes::{Element, Vertex},
    error::{PoissonError, Result},
};

/// Structured triangulation of the rectangle `[0, lx] x [0, ly]`.
///
/// Nodes are numbered row-major, `id = iy * nx + ix`, so that neighbours in
/// the same row are one id apart and neighbours in the same column are `nx`
/// ids apart. Every cell is split along its lower-right/upper-left diagonal
/// into a lower and an upper right triangle. The first half of `elements`
/// holds all lower triangles, the second half all upper triangles, both in
/// cell order.
#[derive(Debug, Clone)]
pub struct Mesh {
    subdivisions_x: usize,
    subdivisions_y: usize,
    length_x: f64,
    length_y: f64,
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    nodes: Vec<Vertex>,
    elements: Vec<Element>,
}

/// Checks that a domain extent is a finite, strictly positive number
fn validate_length(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PoissonError::InvalidParameter(format!(
            "{name} must be finite and positive, got {value}"
        )));
    }
    Ok(())
}

impl Mesh {
    /// Builds the mesh for `subdivisions_x * subdivisions_y` cells on a
    /// `length_x * length_y` rectangle.
    ///
    /// # Arguments
    /// * `subdivisions_x` - Number of cells along x (Nx)
    /// * `subdivisions_y` - Number of cells along y (Ny)
    /// * `length_x` - Extent of the domain along x (Lx)
    /// * `length_y` - Extent of the domain along y (Ly)
    ///
    /// # Returns
    /// A mesh with `(Nx+1)(Ny+1)` nodes and `2 Nx Ny` elements
    pub fn build(
        subdivisions_x: usize,
        subdivisions_y: usize,
        length_x: f64,
        length_y: f64,
    ) -> Result<Mesh> {
        if subdivisions_x == 0 || subdivisions_y == 0 {
            return Err(PoissonError::InvalidParameter(format!(
                "subdivision counts must be positive, got {subdivisions_x}x{subdivisions_y}"
            )));
        }
        validate_length("length_x", length_x)?;
        validate_length("length_y", length_y)?;

        let nx = subdivisions_x + 1;
        let ny = subdivisions_y + 1;
        let dx = length_x / subdivisions_x as f64;
        let dy = length_y / subdivisions_y as f64;

        let mut nodes: Vec<Vertex> = Vec::with_capacity(nx * ny);
        for iy in 0..ny {
            for ix in 0..nx {
                nodes.push(Vertex::new(ix as f64 * dx, iy as f64 * dy));
            }
        }

        let ncells = subdivisions_x * subdivisions_y;
        let mut elements: Vec<Element> = Vec::with_capacity(2 * ncells);

        // lower triangles: lower-left, lower-right, upper-left
        for iy in 0..subdivisions_y {
            for ix in 0..subdivisions_x {
                let lower_left = iy * nx + ix;
                elements.push(Element {
                    nodes: [lower_left, lower_left + 1, lower_left + nx],
                });
            }
        }

        // upper triangles: lower-right, upper-right, upper-left
        for iy in 0..subdivisions_y {
            for ix in 0..subdivisions_x {
                let lower_left = iy * nx + ix;
                elements.push(Element {
                    nodes: [lower_left + 1, lower_left + nx + 1, lower_left + nx],
                });
            }
        }

        debug!(
            "built {}x{} node grid with {} elements",
            nx,
            ny,
            elements.len()
        );

        Ok(Mesh {
            subdivisions_x,
            subdivisions_y,
            length_x,
            length_y,
            nx,
            ny,
            dx,
            dy,
            nodes,
            elements,
        })
    }
}

// getters
impl Mesh {
    pub fn subdivisions_x(&self) -> usize {
        self.subdivisions_x
    }
    pub fn subdivisions_y(&self) -> usize {
        self.subdivisions_y
    }
    pub fn length_x(&self) -> f64 {
        self.length_x
    }
    pub fn length_y(&self) -> f64 {
        self.length_y
    }
    /// Nodes per row
    pub fn nx(&self) -> usize {
        self.nx
    }
    /// Nodes per column
    pub fn ny(&self) -> usize {
        self.ny
    }
    pub fn dx(&self) -> f64 {
        self.dx
    }
    pub fn dy(&self) -> f64 {
        self.dy
    }
    pub fn nodes(&self) -> &[Vertex] {
        &self.nodes
    }
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }
    /// Maximum id distance between coupled nodes
    pub fn bandwidth(&self) -> usize {
        self.nx
    }
}

// indexing
impl Mesh {
    pub fn node_id(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx + ix
    }

    /// Inverse of [`Mesh::node_id`]
    pub fn grid_position(&self, id: usize) -> (usize, usize) {
        (id % self.nx, id / self.nx)
    }

    pub fn element_vertices(&self, element: &Element) -> [Vertex; 3] {
        element.nodes.map(|i| self.nodes[i])
    }

    pub fn is_boundary_node(&self, id: usize) -> bool {
        let (ix, iy) = self.grid_position(id);
        ix == 0 || ix == self.nx - 1 || iy == 0 || iy == self.ny - 1
    }

    /// Ids of all boundary nodes in ascending order
    pub fn boundary_nodes(&self) -> Vec<usize> {
        (0..self.n_nodes())
            .filter(|&id| self.is_boundary_node(id))
            .collect()
    }

    /// Boundary membership for every node, indexed by node id
    pub fn boundary_flags(&self) -> Vec<bool> {
        (0..self.n_nodes())
            .map(|id| self.is_boundary_node(id))
            .collect()
    }
}
