/// Error types shared by the generators, the mesh container and the scene
use thiserror::Error;

/// Everything the core can fail with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A matrix with an exactly zero determinant was asked for its inverse
    #[error("matrix is singular and has no inverse")]
    SingularMatrix,
    /// A generator was handed parameters it cannot build a mesh from
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A sweep sample had a zero-length tangent
    #[error("degenerate tangent at spline sample {index}")]
    DegenerateTangent { index: usize },
    /// Vertex/index buffers that break the mesh invariants
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for the `InvalidArgument` checks at the top of each generator.
pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::InvalidArgument(message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure() {
        assert!(ensure(true, || "unused".into()).is_ok());
        let err = ensure(false, || "stacks must be at least 1".into()).unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: stacks must be at least 1");
    }

    #[test]
    fn test_degenerate_tangent_message() {
        let err = Error::DegenerateTangent { index: 7 };
        assert_eq!(err.to_string(), "degenerate tangent at spline sample 7");
    }
}
