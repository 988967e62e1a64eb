use crate::{
    datatypes::Vertex,
    error::{PoissonError, Result},
};

/// Right hand side of the Poisson problem, evaluated in bulk.
///
/// Implementors receive all points at once and must return exactly one value
/// per point, in the same order.
pub trait SourceFunction: Sync {
    fn eval(&self, points: &[Vertex]) -> Vec<f64>;
}

impl<F> SourceFunction for F
where
    F: Fn(&[Vertex]) -> Vec<f64> + Sync,
{
    fn eval(&self, points: &[Vertex]) -> Vec<f64> {
        self(points)
    }
}

/// Evaluates `source` on `points` and checks the result has one value per point
pub fn evaluate<S>(source: &S, points: &[Vertex]) -> Result<Vec<f64>>
where
    S: SourceFunction + ?Sized,
{
    let values = source.eval(points);
    if values.len() != points.len() {
        return Err(PoissonError::Shape {
            expected: points.len(),
            found: values.len(),
        });
    }
    Ok(values)
}

/// `amplitude * exp(-((x-x0)^2 / (2 sigma_x) + (y-y0)^2 / (2 sigma_y)))`
///
/// The sigmas enter unsquared, so they act as variances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianSource {
    pub x0: f64,
    pub y0: f64,
    pub sigma_x: f64,
    pub sigma_y: f64,
    pub amplitude: f64,
}

impl Default for GaussianSource {
    fn default() -> Self {
        GaussianSource {
            x0: 0.5,
            y0: 0.5,
            sigma_x: 0.01,
            sigma_y: 0.01,
            amplitude: 1.0,
        }
    }
}

impl SourceFunction for GaussianSource {
    fn eval(&self, points: &[Vertex]) -> Vec<f64> {
        points
            .iter()
            .map(|p| {
                let ex = (p.x - self.x0).powi(2) / (2.0 * self.sigma_x);
                let ey = (p.y - self.y0).powi(2) / (2.0 * self.sigma_y);
                self.amplitude * f64::exp(-(ex + ey))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantSource {
    pub value: f64,
}

impl SourceFunction for ConstantSource {
    fn eval(&self, points: &[Vertex]) -> Vec<f64> {
        vec![self.value; points.len()]
    }
}

/// Built-in sources selectable from a problem description
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    Gaussian(GaussianSource),
    Constant(ConstantSource),
}

impl SourceFunction for Source {
    fn eval(&self, points: &[Vertex]) -> Vec<f64> {
        match self {
            Source::Gaussian(g) => g.eval(points),
            Source::Constant(c) => c.eval(points),
        }
    }
}
