use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use nalgebra::DVector;
use tracing::info;

use crate::{
    banded::BandedMatrix,
    error::{PoissonError, Result},
    mesher::Mesh,
};

fn create(path: &Path) -> Result<BufWriter<File>> {
    match File::create(path) {
        Ok(f) => Ok(BufWriter::new(f)),
        Err(err) => Err(PoissonError::PostProcessor(format!(
            "Failed to create {}: {err}",
            path.display()
        ))),
    }
}

fn write_error(path: &Path) -> impl Fn(std::io::Error) -> PoissonError + '_ {
    move |err| PoissonError::PostProcessor(format!("Failed to write {}: {err}", path.display()))
}

/// Writes node coordinates with one nodal value per node
///
/// # Arguments
/// * `mesh` - The mesh whose nodes are written
/// * `values` - One value per node, e.g. the source evaluated at the nodes
/// * `path` - The output csv file
pub fn write_nodes_csv(mesh: &Mesh, values: &[f64], path: &Path) -> Result<()> {
    if values.len() != mesh.n_nodes() {
        return Err(PoissonError::Shape {
            expected: mesh.n_nodes(),
            found: values.len(),
        });
    }

    let mut nodes_file = create(path)?;
    let on_err = write_error(path);

    writeln!(nodes_file, "x,y,f").map_err(&on_err)?;
    for (node, value) in std::iter::zip(mesh.nodes(), values) {
        writeln!(nodes_file, "{x},{y},{value}", x = node.x, y = node.y).map_err(&on_err)?;
    }
    nodes_file.flush().map_err(&on_err)?;

    Ok(())
}

/// Writes the banded storage, one storage row per line
pub fn write_banded_csv(banded: &BandedMatrix, path: &Path) -> Result<()> {
    let mut banded_file = create(path)?;
    let on_err = write_error(path);

    for row in banded.data().row_iter() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(banded_file, "{}", line.join(",")).map_err(&on_err)?;
    }
    banded_file.flush().map_err(&on_err)?;

    Ok(())
}

/// Writes a vector, one entry per line
pub fn write_vector_csv(vector: &DVector<f64>, path: &Path) -> Result<()> {
    let mut vector_file = create(path)?;
    let on_err = write_error(path);

    for value in vector.iter() {
        writeln!(vector_file, "{value}").map_err(&on_err)?;
    }
    vector_file.flush().map_err(&on_err)?;

    Ok(())
}

/// Writes `nodes.csv`, `banded.csv` and `load.csv` into `output_dir`
///
/// # Arguments
/// * `output_dir` - Target directory, created if missing
/// * `mesh` - The mesh the system was assembled on
/// * `source_values` - The source evaluated at every node
/// * `banded` - The constrained stiffness matrix
/// * `load` - The load vector
pub fn csv_output(
    output_dir: &Path,
    mesh: &Mesh,
    source_values: &[f64],
    banded: &BandedMatrix,
    load: &DVector<f64>,
) -> Result<()> {
    if let Err(err) = std::fs::create_dir_all(output_dir) {
        return Err(PoissonError::PostProcessor(format!(
            "Failed to create output directory {}: {err}",
            output_dir.display()
        )));
    }

    let nodes_output = output_dir.join("nodes.csv");
    let banded_output = output_dir.join("banded.csv");
    let load_output = output_dir.join("load.csv");

    write_nodes_csv(mesh, source_values, &nodes_output)?;
    write_banded_csv(banded, &banded_output)?;
    write_vector_csv(load, &load_output)?;

    info!(
        "wrote output to {}, {} and {}",
        nodes_output.display(),
        banded_output.display(),
        load_output.display()
    );

    Ok(())
}
