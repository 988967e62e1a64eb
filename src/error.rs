use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoissonError {
    #[error("Parameter error: {0}")]
    InvalidParameter(String),
    #[error("Source error: source function returned {found} values for {expected} points")]
    Shape { expected: usize, found: usize },
    #[error("Banded error: entry ({row}, {col}) lies outside of bandwidth {bandwidth}")]
    BandwidthViolation {
        row: usize,
        col: usize,
        bandwidth: usize,
    },
    #[error("Input error: {0}")]
    Input(String),
    #[error("Post Processor error: {0}")]
    PostProcessor(String),
}

pub type Result<T> = std::result::Result<T, PoissonError>;

#[cfg(test)]
mod test {
    use super::PoissonError;

    #[test]
    fn display_names_the_stage() {
        let err = PoissonError::Shape {
            expected: 9,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "Source error: source function returned 4 values for 9 points"
        );

        let err = PoissonError::BandwidthViolation {
            row: 0,
            col: 7,
            bandwidth: 3,
        };
        assert_eq!(
            err.to_string(),
            "Banded error: entry (0, 7) lies outside of bandwidth 3"
        );
    }
}
