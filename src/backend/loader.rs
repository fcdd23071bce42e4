//! Runtime shared-library loading and symbol binding.
//!
//! Every failure here is soft: a library that cannot be opened or a symbol
//! that cannot be found yields `None` and a log line, never an error. The
//! registries built on top decide what a missing piece means.
//!
//! Opened libraries are cached by name for the life of the process and never
//! closed, so function pointers resolved from them stay valid forever.

use std::collections::HashMap;
use std::ffi::c_void;
use std::fmt;
use std::mem;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, warn};

#[derive(Clone, Copy)]
struct Handle(NonNull<c_void>);

// SAFETY: a dlopen handle is a process-global token; the dl* functions that
// take it are thread-safe. The handle is never closed.
unsafe impl Send for Handle {}
// SAFETY: see above.
unsafe impl Sync for Handle {}

/// An opened shared library.
#[derive(Clone)]
pub struct Library {
    name: Arc<str>,
    handle: Handle,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library").field("name", &self.name).finish()
    }
}

fn cache() -> &'static Mutex<HashMap<String, Option<Library>>> {
    static CACHE: OnceLock<Mutex<HashMap<String, Option<Library>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

impl Library {
    /// Open a shared library by file name or path.
    ///
    /// Repeated calls with the same name return the cached result, including
    /// a cached failure.
    pub fn open(name: &str) -> Option<Library> {
        let mut cache = cache().lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(name) {
            return cached.clone();
        }
        let opened = match sys::open(name) {
            Ok(handle) => {
                debug!(library = name, "opened shared library");
                Some(Library {
                    name: Arc::from(name),
                    handle: Handle(handle),
                })
            }
            Err(reason) => {
                debug!(library = name, %reason, "could not open shared library");
                None
            }
        };
        cache.insert(name.to_string(), opened.clone());
        opened
    }

    /// Open the first candidate that loads.
    pub fn open_first<S: AsRef<str>>(candidates: &[S]) -> Option<Library> {
        let found = candidates.iter().find_map(|c| Library::open(c.as_ref()));
        if found.is_none() {
            let tried: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();
            debug!(?tried, "no candidate shared library could be opened");
        }
        found
    }

    /// The name this library was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an exported symbol as a function pointer of type `F`.
    ///
    /// # Safety
    ///
    /// `F` must be an `extern "C" fn` pointer type whose signature matches
    /// the native definition of `symbol`.
    pub unsafe fn symbol<F: Copy>(&self, symbol: &str) -> Option<F> {
        if mem::size_of::<F>() != mem::size_of::<*mut c_void>() {
            warn!(symbol, "requested symbol type is not pointer-sized");
            return None;
        }
        match sys::symbol(self.handle.0, symbol) {
            Ok(ptr) => {
                let raw = ptr.as_ptr();
                // SAFETY: F is pointer-sized (checked above) and the caller
                // guarantees it is the matching fn pointer type.
                Some(unsafe { mem::transmute_copy::<*mut c_void, F>(&raw) })
            }
            Err(reason) => {
                debug!(library = %self.name, symbol, %reason, "failed to load symbol");
                None
            }
        }
    }
}

/// Resolve `symbol` from an optional library. A missing library resolves
/// nothing.
///
/// # Safety
///
/// Same contract as [`Library::symbol`].
pub unsafe fn resolve_symbol<F: Copy>(library: Option<&Library>, symbol: &str) -> Option<F> {
    // SAFETY: contract forwarded to the caller.
    library.and_then(|lib| unsafe { lib.symbol(symbol) })
}

#[cfg(unix)]
mod sys {
    use std::ffi::{c_void, CStr, CString};
    use std::ptr::NonNull;

    pub(super) fn open(name: &str) -> Result<NonNull<c_void>, String> {
        let cname = CString::new(name).map_err(|_| "name contains a NUL byte".to_string())?;
        // SAFETY: cname is a valid NUL-terminated string for the duration of
        // the call.
        let handle = unsafe { libc::dlopen(cname.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        NonNull::new(handle).ok_or_else(last_error)
    }

    pub(super) fn symbol(handle: NonNull<c_void>, name: &str) -> Result<NonNull<c_void>, String> {
        let cname = CString::new(name).map_err(|_| "name contains a NUL byte".to_string())?;
        // SAFETY: handle came from a successful dlopen and is never closed;
        // cname is valid for the call. dlerror is cleared first so a null
        // result can be told apart from a null-valued symbol.
        let ptr = unsafe {
            libc::dlerror();
            libc::dlsym(handle.as_ptr(), cname.as_ptr())
        };
        NonNull::new(ptr).ok_or_else(last_error)
    }

    fn last_error() -> String {
        // SAFETY: dlerror returns null or a NUL-terminated string that stays
        // valid until the next dl* call on this thread; it is copied out
        // immediately.
        unsafe {
            let msg = libc::dlerror();
            if msg.is_null() {
                "unknown error".to_string()
            } else {
                CStr::from_ptr(msg).to_string_lossy().into_owned()
            }
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use std::ffi::c_void;
    use std::ptr::NonNull;

    const UNSUPPORTED: &str = "runtime library loading is not supported on this platform";

    pub(super) fn open(_name: &str) -> Result<NonNull<c_void>, String> {
        Err(UNSUPPORTED.to_string())
    }

    pub(super) fn symbol(_handle: NonNull<c_void>, _name: &str) -> Result<NonNull<c_void>, String> {
        Err(UNSUPPORTED.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Strlen = unsafe extern "C" fn(*const std::ffi::c_char) -> usize;

    #[test]
    fn missing_library_is_none_and_cached() {
        let name = "libdynla-does-not-exist.so";
        assert!(Library::open(name).is_none());
        assert!(Library::open(name).is_none());
        let cached = cache().lock().unwrap();
        assert!(matches!(cached.get(name), Some(None)));
    }

    #[test]
    fn open_first_with_no_candidates() {
        let none: [&str; 0] = [];
        assert!(Library::open_first(&none).is_none());
    }

    #[test]
    fn resolve_without_library() {
        let f: Option<Strlen> = unsafe { resolve_symbol(None, "strlen") };
        assert!(f.is_none());
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn resolves_symbol_from_libc() {
        let lib = Library::open_first(&["libc.so.6"]).expect("glibc is loadable");
        assert_eq!(lib.name(), "libc.so.6");
        let strlen: Strlen = unsafe { lib.symbol("strlen") }.expect("strlen is exported");
        let n = unsafe { strlen(b"dynla\0".as_ptr().cast()) };
        assert_eq!(n, 5);
        let missing: Option<Strlen> = unsafe { lib.symbol("dynla_no_such_symbol") };
        assert!(missing.is_none());
    }
}
