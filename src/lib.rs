//! Finite-element discretization of the 2D Poisson equation with homogeneous
//! Dirichlet data on a rectangle.
//!
//! [`Mesh::build`] triangulates the domain, [`stiffness::assemble`] and
//! [`load::assemble`] produce the linear system, and the stiffness matrix is
//! handed out in the diagonal-ordered [`BandedMatrix`] layout expected by
//! banded solvers with `kl = ku = nx`.

pub mod banded;
pub mod datatypes;
pub mod error;
pub mod input;
pub mod load;
pub mod mesher;
pub mod post_processor;
pub mod source;
pub mod stiffness;

pub use banded::BandedMatrix;
pub use datatypes::{DirichletMethod, Element, Vertex};
pub use error::{PoissonError, Result};
pub use mesher::Mesh;
pub use source::{ConstantSource, GaussianSource, Source, SourceFunction};
