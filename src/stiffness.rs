use indicatif::ProgressBar;
use nalgebra::{matrix, SMatrix};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    banded::BandedMatrix,
    datatypes::{DirichletMethod, Element, Vertex},
    error::Result,
    mesher::Mesh,
};

/// Calculates the signed area of a triangle
///
/// # Arguments
/// * `vertices` - The three corners of the triangle
///
/// # Returns
/// The area, positive when the corners are ordered counter-clockwise
pub fn compute_element_area(vertices: &[Vertex; 3]) -> f64 {
    let [v0, v1, v2] = vertices;

    0.5 * (v0.x * (v1.y - v2.y) + v1.x * (v2.y - v0.y) + v2.x * (v0.y - v1.y))
}

/// Calculates the gradients of the three linear basis functions
///
/// The gradient of basis function `a` is the perpendicular of the edge
/// opposite to vertex `a`, divided by twice the signed area.
///
/// # Arguments
/// * `vertices` - The three corners of the triangle
/// * `element_area` - The signed area of the triangle
///
/// # Returns
/// A 2x3 matrix whose column `a` is the gradient of basis function `a`
pub fn compute_gradient_matrix(vertices: &[Vertex; 3], element_area: f64) -> SMatrix<f64, 2, 3> {
    let [v0, v1, v2] = vertices;

    let beta_1 = v1.y - v2.y;
    let beta_2 = v2.y - v0.y;
    let beta_3 = v0.y - v1.y;

    let gamma_1 = v2.x - v1.x;
    let gamma_2 = v0.x - v2.x;
    let gamma_3 = v1.x - v0.x;

    let mut gradient_mat: SMatrix<f64, 2, 3> = matrix![
        beta_1, beta_2, beta_3;
        gamma_1, gamma_2, gamma_3;
    ];

    gradient_mat /= 2.0 * element_area;

    gradient_mat
}

/// Computes the local stiffness matrix for a given element
///
/// # Arguments
/// * `mesh` - The mesh the element belongs to
/// * `element` - The element to target
///
/// # Returns
/// A symmetric 3x3 matrix `K_ab = area * grad(v_a) . grad(v_b)`
pub fn element_stiffness(mesh: &Mesh, element: &Element) -> SMatrix<f64, 3, 3> {
    let vertices = mesh.element_vertices(element);
    let element_area = compute_element_area(&vertices);
    let gradient_mat = compute_gradient_matrix(&vertices, element_area);

    gradient_mat.transpose() * gradient_mat * element_area
}

/// Accumulates all local stiffness matrices into the global sparse matrix.
/// No boundary conditions are applied.
pub fn assemble_matrix(mesh: &Mesh) -> CsrMatrix<f64> {
    assemble_matrix_with_progress(mesh, &ProgressBar::hidden())
}

/// Same as [`assemble_matrix`], ticking `bar` once per element
pub fn assemble_matrix_with_progress(mesh: &Mesh, bar: &ProgressBar) -> CsrMatrix<f64> {
    let n = mesh.n_nodes();
    bar.set_length(mesh.n_elements() as u64);

    let triplets: Vec<(usize, usize, f64)> = mesh
        .elements()
        .par_iter()
        .flat_map_iter(|element| {
            let stiffness_mat = element_stiffness(mesh, element);
            bar.inc(1);

            let mut local_triplets = Vec::with_capacity(9);
            for (local_row, &node_row) in element.nodes.iter().enumerate() {
                for (local_col, &node_col) in element.nodes.iter().enumerate() {
                    let value = stiffness_mat[(local_row, local_col)];
                    local_triplets.push((node_row, node_col, value));
                }
            }
            local_triplets
        })
        .collect();
    bar.finish();

    // duplicates are summed by the csr conversion
    let mut coo = CooMatrix::new(n, n);
    for (row, col, value) in triplets {
        coo.push(row, col, value);
    }
    let matrix = CsrMatrix::from(&coo);

    debug!(
        "accumulated {} element matrices into {} stored entries",
        mesh.n_elements(),
        matrix.nnz()
    );

    matrix
}

/// Constrains the boundary rows of an assembled matrix.
///
/// Only existing entries are modified, so the sparsity pattern and bandwidth
/// are unchanged and symmetry is kept.
///
/// # Arguments
/// * `matrix` - The accumulated global stiffness matrix
/// * `mesh` - The mesh the matrix was assembled on
/// * `method` - Elimination or penalty
pub fn apply_dirichlet(matrix: &mut CsrMatrix<f64>, mesh: &Mesh, method: DirichletMethod) {
    let boundary = mesh.boundary_flags();

    match method {
        DirichletMethod::Elimination => {
            for (row, mut row_entries) in matrix.row_iter_mut().enumerate() {
                let (cols, values) = row_entries.cols_and_values_mut();
                for (&col, value) in cols.iter().zip(values.iter_mut()) {
                    if boundary[row] || boundary[col] {
                        *value = if row == col { 1.0 } else { 0.0 };
                    }
                }
            }
        }
        DirichletMethod::Penalty { factor } => {
            let largest = matrix
                .values()
                .iter()
                .fold(0.0_f64, |acc, v| acc.max(v.abs()));
            let penalty = factor * largest;

            for (row, mut row_entries) in matrix.row_iter_mut().enumerate() {
                if !boundary[row] {
                    continue;
                }
                let (cols, values) = row_entries.cols_and_values_mut();
                for (&col, value) in cols.iter().zip(values.iter_mut()) {
                    if col == row {
                        *value += penalty;
                    }
                }
            }
        }
    }
}

/// Assembles the stiffness matrix with Dirichlet elimination and returns it in
/// banded storage with `kl = ku = nx`.
pub fn assemble(mesh: &Mesh) -> Result<BandedMatrix> {
    assemble_with_progress(mesh, DirichletMethod::Elimination, &ProgressBar::hidden())
}

/// Runs the full stiffness pipeline
///
/// # Arguments
/// * `mesh` - The mesh to assemble on
/// * `method` - How the boundary rows are constrained
/// * `bar` - Progress bar ticked once per element
///
/// # Returns
/// The constrained stiffness matrix in banded storage
pub fn assemble_with_progress(
    mesh: &Mesh,
    method: DirichletMethod,
    bar: &ProgressBar,
) -> Result<BandedMatrix> {
    info!("assembling stiffness matrix over {} elements", mesh.n_elements());

    let mut matrix = assemble_matrix_with_progress(mesh, bar);
    apply_dirichlet(&mut matrix, mesh, method);

    BandedMatrix::from_csr(&matrix, mesh.bandwidth())
}

#[cfg(test)]
mod test {
    use super::{
        apply_dirichlet, assemble, assemble_matrix, compute_element_area, compute_gradient_matrix,
        element_stiffness,
    };
    use crate::{
        datatypes::{DirichletMethod, Vertex},
        mesher::Mesh,
    };
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{matrix, DMatrix};

    #[test]
    fn gradients_of_reference_triangle() {
        let vertices = [
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(0.0, 1.0),
        ];
        let area = compute_element_area(&vertices);
        assert_relative_eq!(area, 0.5);

        let gradients = compute_gradient_matrix(&vertices, area);
        let expected = matrix![
            -1.0, 1.0, 0.0;
            -1.0, 0.0, 1.0;
        ];
        assert_relative_eq!(gradients, expected);
    }

    #[test]
    fn clockwise_area_is_negative() {
        let vertices = [
            Vertex::new(0.0, 0.0),
            Vertex::new(0.0, 1.0),
            Vertex::new(1.0, 0.0),
        ];
        assert_relative_eq!(compute_element_area(&vertices), -0.5);
    }

    #[test]
    fn lower_element_matches_closed_form() {
        let (dx, dy) = (0.5, 0.25);
        let mesh = Mesh::build(2, 4, 2.0 * dx, 4.0 * dy).unwrap();
        let k = element_stiffness(&mesh, &mesh.elements()[0]);

        let rx = dy / (2.0 * dx);
        let ry = dx / (2.0 * dy);
        let expected = matrix![
            rx + ry, -rx, -ry;
            -rx, rx, 0.0;
            -ry, 0.0, ry;
        ];
        assert_relative_eq!(k, expected, max_relative = 1e-12);
    }

    #[test]
    fn element_matrices_are_symmetric_with_zero_row_sums() {
        let mesh = Mesh::build(3, 2, 1.0, 0.7).unwrap();
        for element in mesh.elements() {
            let k = element_stiffness(&mesh, element);
            assert_relative_eq!(k, k.transpose(), max_relative = 1e-12);
            for r in 0..3 {
                assert_abs_diff_eq!(k.row(r).sum(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn raw_matrix_has_constants_in_kernel() {
        let mesh = Mesh::build(5, 3, 2.0, 1.0).unwrap();
        let a = DMatrix::from(&assemble_matrix(&mesh));
        for r in 0..mesh.n_nodes() {
            assert_abs_diff_eq!(a.row(r).sum(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn unit_square_gives_five_point_stencil() {
        let mesh = Mesh::build(2, 2, 1.0, 1.0).unwrap();
        let a = DMatrix::from(&assemble_matrix(&mesh));

        assert_relative_eq!(a[(4, 4)], 4.0, max_relative = 1e-12);
        for neighbour in [1, 3, 5, 7] {
            assert_relative_eq!(a[(4, neighbour)], -1.0, max_relative = 1e-12);
        }
        for diagonal_neighbour in [0, 2, 6, 8] {
            assert_abs_diff_eq!(a[(4, diagonal_neighbour)], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn elimination_decouples_boundary() {
        let mesh = Mesh::build(3, 4, 1.5, 2.0).unwrap();
        let raw = DMatrix::from(&assemble_matrix(&mesh));
        let mut csr = assemble_matrix(&mesh);
        apply_dirichlet(&mut csr, &mesh, DirichletMethod::Elimination);
        let a = DMatrix::from(&csr);

        for i in 0..mesh.n_nodes() {
            for j in 0..mesh.n_nodes() {
                if mesh.is_boundary_node(i) || mesh.is_boundary_node(j) {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_eq!(a[(i, j)], expected);
                } else {
                    assert_eq!(a[(i, j)], raw[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn penalty_only_touches_boundary_diagonal() {
        let mesh = Mesh::build(3, 3, 1.0, 1.0).unwrap();
        let raw = DMatrix::from(&assemble_matrix(&mesh));
        let largest = raw.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

        let mut csr = assemble_matrix(&mesh);
        apply_dirichlet(&mut csr, &mesh, DirichletMethod::Penalty { factor: 1e5 });
        let a = DMatrix::from(&csr);

        for i in 0..mesh.n_nodes() {
            for j in 0..mesh.n_nodes() {
                if i == j && mesh.is_boundary_node(i) {
                    assert_relative_eq!(a[(i, j)], raw[(i, j)] + 1e5 * largest);
                } else {
                    assert_eq!(a[(i, j)], raw[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn banded_result_is_symmetric_within_band() {
        let mesh = Mesh::build(4, 3, 1.0, 2.0).unwrap();
        let banded = assemble(&mesh).unwrap();
        let nx = mesh.nx();
        assert_eq!(banded.kl(), nx);
        assert_eq!(banded.ku(), nx);
        assert_eq!(banded.data().shape(), (2 * nx + 1, mesh.n_nodes()));

        let a = banded.to_dense();
        for i in 0..mesh.n_nodes() {
            for j in 0..mesh.n_nodes() {
                assert_eq!(a[(i, j)], a[(j, i)]);
                if i.abs_diff(j) > nx {
                    assert_eq!(a[(i, j)], 0.0);
                }
            }
        }
    }
}
