use json::JsonValue;
use tracing::{info, warn};

use crate::{
    datatypes::{DirichletMethod, DEFAULT_PENALTY_FACTOR},
    error::{PoissonError, Result},
    source::{ConstantSource, GaussianSource, Source},
};

/// Size and subdivision of the rectangular domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParameters {
    pub subdivisions_x: usize,
    pub subdivisions_y: usize,
    pub length_x: f64,
    pub length_y: f64,
}

/// Everything needed to set up one Poisson problem
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProblemDescription {
    pub mesh: MeshParameters,
    pub source: Source,
    pub dirichlet: DirichletMethod,
}

/// Reads and parses a problem description file
///
/// # Arguments
/// * `input_file` - The path to the input json
pub fn load_input_file(input_file: &str) -> Result<ProblemDescription> {
    let file_string = match std::fs::read_to_string(input_file) {
        Ok(f) => f,
        Err(err) => {
            return Err(PoissonError::Input(format!(
                "Unable to open input file {input_file}: {err}"
            )))
        }
    };

    let problem = parse_input(&file_string)?;
    info!("loaded problem description from {input_file}");
    Ok(problem)
}

/// Parses a problem description from a json string
pub fn parse_input(contents: &str) -> Result<ProblemDescription> {
    let input_json = match json::parse(contents) {
        Ok(f) => f,
        Err(err) => {
            return Err(PoissonError::Input(format!(
                "Error in input file json: {err}"
            )))
        }
    };

    if !input_json.has_key("mesh") {
        return Err(PoissonError::Input(
            "Input json missing mesh field".to_string(),
        ));
    }

    Ok(ProblemDescription {
        mesh: parse_mesh_parameters(&input_json["mesh"])?,
        source: parse_source(&input_json["source"])?,
        dirichlet: parse_boundary(&input_json["boundary"])?,
    })
}

fn required_f64(section: &JsonValue, section_name: &str, key: &str) -> Result<f64> {
    if !section.has_key(key) {
        return Err(PoissonError::Input(format!(
            "Input json missing {key} field in {section_name} section"
        )));
    }
    section[key].as_f64().ok_or_else(|| {
        PoissonError::Input(format!("Bad value for {key} in {section_name} section"))
    })
}

fn optional_f64(section: &JsonValue, section_name: &str, key: &str, default: f64) -> Result<f64> {
    if section[key].is_null() {
        return Ok(default);
    }
    section[key].as_f64().ok_or_else(|| {
        PoissonError::Input(format!("Bad value for {key} in {section_name} section"))
    })
}

fn subdivisions(section: &JsonValue, key: &str) -> Result<usize> {
    if !section.has_key(key) {
        return Err(PoissonError::Input(format!(
            "Input json missing {key} field in mesh section"
        )));
    }
    let value = match section[key].as_i64() {
        Some(v) => v,
        None => {
            return Err(PoissonError::Input(format!(
                "Bad value for {key} in mesh section, expected an integer"
            )))
        }
    };
    if value <= 0 {
        return Err(PoissonError::InvalidParameter(format!(
            "{key} must be positive, got {value}"
        )));
    }
    Ok(value as usize)
}

fn parse_mesh_parameters(mesh_json: &JsonValue) -> Result<MeshParameters> {
    Ok(MeshParameters {
        subdivisions_x: subdivisions(mesh_json, "nx")?,
        subdivisions_y: subdivisions(mesh_json, "ny")?,
        length_x: required_f64(mesh_json, "mesh", "lx")?,
        length_y: required_f64(mesh_json, "mesh", "ly")?,
    })
}

fn parse_source(source_json: &JsonValue) -> Result<Source> {
    if source_json.is_null() {
        warn!("no source section in input file, using default gaussian");
        return Ok(Source::Gaussian(GaussianSource::default()));
    }

    match source_json["type"].as_str() {
        Some("gaussian") | None => {
            let defaults = GaussianSource::default();
            Ok(Source::Gaussian(GaussianSource {
                x0: optional_f64(source_json, "source", "x0", defaults.x0)?,
                y0: optional_f64(source_json, "source", "y0", defaults.y0)?,
                sigma_x: optional_f64(source_json, "source", "sigma_x", defaults.sigma_x)?,
                sigma_y: optional_f64(source_json, "source", "sigma_y", defaults.sigma_y)?,
                amplitude: optional_f64(source_json, "source", "amplitude", defaults.amplitude)?,
            }))
        }
        Some("constant") => Ok(Source::Constant(ConstantSource {
            value: optional_f64(source_json, "source", "value", 0.0)?,
        })),
        Some(other) => Err(PoissonError::Input(format!(
            "Unrecognized source type {other}"
        ))),
    }
}

fn parse_boundary(boundary_json: &JsonValue) -> Result<DirichletMethod> {
    if boundary_json.is_null() {
        return Ok(DirichletMethod::Elimination);
    }

    match boundary_json["method"].as_str() {
        Some("elimination") | None => Ok(DirichletMethod::Elimination),
        Some("penalty") => {
            let factor = optional_f64(boundary_json, "boundary", "factor", DEFAULT_PENALTY_FACTOR)?;
            if !factor.is_finite() || factor <= 0.0 {
                return Err(PoissonError::InvalidParameter(format!(
                    "penalty factor must be finite and positive, got {factor}"
                )));
            }
            Ok(DirichletMethod::Penalty { factor })
        }
        Some(other) => Err(PoissonError::Input(format!(
            "Unrecognized boundary method {other}"
        ))),
    }
}
