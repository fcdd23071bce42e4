use thiserror::Error;

/// Errors from backend-dependent linear algebra operations.
///
/// Element-wise arithmetic and products never fail: they fall back to the
/// pure-Rust kernels when no native library is present. Only the routines in
/// [`linalg`](crate::linalg), which have no fallback, return this error.
/// Shape mismatches are contract violations and panic instead.
///
/// ```
/// use dynla::LinalgError;
///
/// let err = LinalgError::Singular { routine: "LAPACKE_dgesv", info: 3 };
/// assert_eq!(err.info(), Some(3));
/// assert_eq!(err.to_string(), "LAPACKE_dgesv: matrix is singular (U[3,3] is exactly zero)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinalgError {
    /// The native library family could not be loaded or is missing symbols.
    #[error("{family} backend is not available")]
    BackendUnavailable { family: &'static str },

    /// The native routine rejected an argument (`info < 0`, the argument index
    /// is `-info`).
    #[error("{routine}: illegal argument value (info = {info})")]
    InvalidArgument { routine: &'static str, info: i32 },

    /// Factorization produced an exactly zero pivot.
    #[error("{routine}: matrix is singular (U[{info},{info}] is exactly zero)")]
    Singular { routine: &'static str, info: i32 },

    /// Least-squares problem whose matrix does not have full rank.
    #[error("{routine}: matrix does not have full rank (R[{info},{info}] is exactly zero)")]
    RankDeficient { routine: &'static str, info: i32 },

    /// Iterative algorithm did not converge.
    #[error("{routine}: algorithm failed to converge (info = {info})")]
    ConvergenceFailure { routine: &'static str, info: i32 },

    /// A dimension does not fit the native integer type.
    #[error("{routine}: dimension {dimension} exceeds the native integer range")]
    TooLarge { routine: &'static str, dimension: usize },
}

impl LinalgError {
    /// Native status code, if the error came from a native routine.
    pub fn info(&self) -> Option<i32> {
        match *self {
            LinalgError::BackendUnavailable { .. } | LinalgError::TooLarge { .. } => None,
            LinalgError::InvalidArgument { info, .. }
            | LinalgError::Singular { info, .. }
            | LinalgError::RankDeficient { info, .. }
            | LinalgError::ConvergenceFailure { info, .. } => Some(info),
        }
    }

    /// Map a native `info` code to `Ok(())` or the matching error.
    ///
    /// `positive` builds the error for `info > 0`, whose meaning depends on
    /// the routine.
    pub(crate) fn check(
        routine: &'static str,
        info: i32,
        positive: fn(&'static str, i32) -> LinalgError,
    ) -> Result<(), LinalgError> {
        match info {
            0 => Ok(()),
            i if i < 0 => Err(LinalgError::InvalidArgument { routine, info: i }),
            i => Err(positive(routine, i)),
        }
    }

    pub(crate) fn singular(routine: &'static str, info: i32) -> LinalgError {
        LinalgError::Singular { routine, info }
    }

    pub(crate) fn rank_deficient(routine: &'static str, info: i32) -> LinalgError {
        LinalgError::RankDeficient { routine, info }
    }

    pub(crate) fn convergence(routine: &'static str, info: i32) -> LinalgError {
        LinalgError::ConvergenceFailure { routine, info }
    }
}

/// Shorthand for results of backend-dependent routines.
pub type Result<T, E = LinalgError> = core::result::Result<T, E>;
