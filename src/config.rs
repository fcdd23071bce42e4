//! Backend discovery configuration.
//!
//! The process-wide registries ([`Blas::global`](crate::backend::Blas::global),
//! [`Lapack::global`](crate::backend::Lapack::global)) are built from
//! [`BackendConfig::from_env`] on first use. Explicit registries can be built
//! from any configuration with `Blas::load` / `Lapack::load`.
//!
//! | Variable | Effect |
//! |---|---|
//! | `DYNLA_BLAS_LIBRARY` | extra BLAS candidates, tried before the defaults |
//! | `DYNLA_LAPACK_LIBRARY` | extra LAPACKE candidates, tried before the defaults |
//! | `DYNLA_DISABLE_ACCELERATION` | `1`, `true` or `yes` forces the pure-Rust path |
//!
//! Candidate lists use the platform path separator (`:` on unix, `;` on
//! Windows).

use std::env;

/// Environment variable holding extra BLAS library candidates.
pub const BLAS_LIBRARY_VAR: &str = "DYNLA_BLAS_LIBRARY";
/// Environment variable holding extra LAPACKE library candidates.
pub const LAPACK_LIBRARY_VAR: &str = "DYNLA_LAPACK_LIBRARY";
/// Environment variable that disables native acceleration entirely.
pub const DISABLE_ACCELERATION_VAR: &str = "DYNLA_DISABLE_ACCELERATION";

#[cfg(target_os = "linux")]
const DEFAULT_BLAS: &[&str] = &[
    "libopenblas.so",
    "libopenblas.so.0",
    "libcblas.so.3",
    "libblis.so.4",
];
#[cfg(target_os = "linux")]
const DEFAULT_LAPACK: &[&str] = &["liblapacke.so", "liblapacke.so.3"];

#[cfg(target_os = "macos")]
const DEFAULT_BLAS: &[&str] = &[
    "libopenblas.dylib",
    "/opt/homebrew/opt/openblas/lib/libopenblas.dylib",
    "/usr/local/opt/openblas/lib/libopenblas.dylib",
];
#[cfg(target_os = "macos")]
const DEFAULT_LAPACK: &[&str] = &[
    "liblapacke.dylib",
    "/opt/homebrew/opt/lapack/lib/liblapacke.dylib",
    "/usr/local/opt/lapack/lib/liblapacke.dylib",
];

#[cfg(windows)]
const DEFAULT_BLAS: &[&str] = &["libopenblas.dll"];
#[cfg(windows)]
const DEFAULT_LAPACK: &[&str] = &["liblapacke.dll"];

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
const DEFAULT_BLAS: &[&str] = &["libopenblas.so"];
#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
const DEFAULT_LAPACK: &[&str] = &["liblapacke.so"];

#[cfg(windows)]
const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
const PATH_SEPARATOR: char = ':';

/// Which native libraries to look for, and whether to look at all.
///
/// ```
/// use dynla::BackendConfig;
///
/// let config = BackendConfig::default().with_blas_library("/opt/blas/libopenblas.so");
/// assert_eq!(config.blas_libraries[0], "/opt/blas/libopenblas.so");
/// assert!(config.acceleration);
///
/// let off = BackendConfig::default().without_acceleration();
/// assert!(!off.acceleration);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// BLAS candidates, tried in order. The first that opens is used.
    pub blas_libraries: Vec<String>,
    /// LAPACKE candidates, tried in order. Symbols missing from the opened
    /// LAPACKE library are looked up in the BLAS library.
    pub lapack_libraries: Vec<String>,
    /// When false, no library is opened and every family reports unavailable.
    pub acceleration: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            blas_libraries: DEFAULT_BLAS.iter().map(|s| s.to_string()).collect(),
            lapack_libraries: DEFAULT_LAPACK.iter().map(|s| s.to_string()).collect(),
            acceleration: true,
        }
    }
}

impl BackendConfig {
    /// Platform defaults overlaid with the `DYNLA_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(list) = env::var(BLAS_LIBRARY_VAR) {
            prepend(&mut config.blas_libraries, &list);
        }
        if let Ok(list) = env::var(LAPACK_LIBRARY_VAR) {
            prepend(&mut config.lapack_libraries, &list);
        }
        if let Ok(flag) = env::var(DISABLE_ACCELERATION_VAR) {
            if is_truthy(&flag) {
                config.acceleration = false;
            }
        }
        config
    }

    /// Try `name` before every other BLAS candidate.
    pub fn with_blas_library(mut self, name: impl Into<String>) -> Self {
        self.blas_libraries.insert(0, name.into());
        self
    }

    /// Try `name` before every other LAPACKE candidate.
    pub fn with_lapack_library(mut self, name: impl Into<String>) -> Self {
        self.lapack_libraries.insert(0, name.into());
        self
    }

    /// Disable native acceleration.
    pub fn without_acceleration(mut self) -> Self {
        self.acceleration = false;
        self
    }
}

fn prepend(list: &mut Vec<String>, value: &str) {
    let extra: Vec<String> = value
        .split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    list.splice(0..0, extra);
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
