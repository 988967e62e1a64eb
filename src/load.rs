use indicatif::ProgressBar;
use nalgebra::DVector;
use rayon::prelude::*;
use tracing::info;

use crate::{
    error::Result,
    mesher::Mesh,
    source::{evaluate, SourceFunction},
    stiffness::compute_element_area,
};

/// Lumped (vertex) quadrature of `f * v_a` over one triangle.
///
/// Each vertex receives a third of the element area times the source value
/// at that vertex. Exact for constant sources.
pub fn element_load(element_area: f64, source_values: [f64; 3]) -> [f64; 3] {
    source_values.map(|f| element_area / 3.0 * f)
}

/// Assembles the load vector, zero on every boundary node
pub fn assemble<S>(mesh: &Mesh, source: &S) -> Result<DVector<f64>>
where
    S: SourceFunction + ?Sized,
{
    assemble_with_progress(mesh, source, &ProgressBar::hidden())
}

/// Assembles the load vector
///
/// The source is evaluated once over all mesh nodes; element contributions
/// are then summed into the node they belong to.
///
/// # Arguments
/// * `mesh` - The mesh to assemble on
/// * `source` - Vectorized right hand side
/// * `bar` - Progress bar ticked once per element
///
/// # Returns
/// A vector with one entry per node
pub fn assemble_with_progress<S>(
    mesh: &Mesh,
    source: &S,
    bar: &ProgressBar,
) -> Result<DVector<f64>>
where
    S: SourceFunction + ?Sized,
{
    info!("assembling load vector over {} elements", mesh.n_elements());

    let source_values = evaluate(source, mesh.nodes())?;
    bar.set_length(mesh.n_elements() as u64);

    let contributions: Vec<[f64; 3]> = mesh
        .elements()
        .par_iter()
        .map(|element| {
            let element_area = compute_element_area(&mesh.element_vertices(element));
            let local = element_load(element_area, element.nodes.map(|i| source_values[i]));
            bar.inc(1);
            local
        })
        .collect();
    bar.finish();

    let mut load = DVector::zeros(mesh.n_nodes());
    for (element, local) in std::iter::zip(mesh.elements(), contributions) {
        for (&node, value) in element.nodes.iter().zip(local) {
            load[node] += value;
        }
    }

    for node in mesh.boundary_nodes() {
        load[node] = 0.0;
    }

    Ok(load)
}
