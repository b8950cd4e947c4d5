//! Native module loading
//!
//! Locates the FEAST shared library with platform-specific naming and search
//! paths, opens it with `libloading` and hands out entry points by symbol
//! name. The process-wide instance is opened at most once.

use crate::error::{FeastError, FeastResult};
use feast_config::{Config, ConfigError, ConfigLoader};
use libloading::Library;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Address of a native function, tied to the module that exported it
#[derive(Debug, Clone, Copy)]
pub struct EntryPoint<'m> {
    ptr: *const (),
    _module: PhantomData<&'m ()>,
}

impl<'m> EntryPoint<'m> {
    /// Wrap a raw function address
    ///
    /// # Safety
    ///
    /// `ptr` must be the address of a function whose C prototype matches the
    /// routine descriptor it will be called through, and the code must stay
    /// mapped for `'m`.
    pub unsafe fn from_raw(ptr: *const ()) -> Self {
        Self {
            ptr,
            _module: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const () {
        self.ptr
    }
}

/// Source of native entry points
///
/// Implemented by the dynamically loaded library. Tests implement it over
/// plain Rust `extern "C"` functions.
pub trait NativeModule {
    /// Display name used in errors and logs
    fn name(&self) -> &str;

    /// Look up `symbol`, failing with `SymbolNotFound` if absent
    fn entry_point(&self, symbol: &str) -> FeastResult<EntryPoint<'_>>;
}

impl<M: NativeModule + ?Sized> NativeModule for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn entry_point(&self, symbol: &str) -> FeastResult<EntryPoint<'_>> {
        (**self).entry_point(symbol)
    }
}

/// The FEAST shared library, opened with `libloading`
pub struct FeastLibrary {
    library: Library,
    path: PathBuf,
}

impl FeastLibrary {
    /// Open the library named by `config`, searching its paths first
    pub fn open(config: &Config) -> FeastResult<Self> {
        let path = resolve_library_path(config.library_name(), &search_paths(config))
            .ok_or_else(|| {
                FeastError::ModuleLoadError(format!(
                    "library '{}' not found in any search path",
                    config.library_name()
                ))
            })?;
        Self::open_path(&path)
    }

    /// Open the library at an explicit path
    ///
    /// Loading runs the library's initialisers in this process. The path is
    /// trusted to point at a genuine FEAST build.
    pub fn open_path(path: &Path) -> FeastResult<Self> {
        ensure_supported_platform()?;
        let library = unsafe { Library::new(path) }
            .map_err(|e| FeastError::ModuleLoadError(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "loaded native feature selection module");
        Ok(Self {
            library,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NativeModule for FeastLibrary {
    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("FSToolbox")
    }

    fn entry_point(&self, symbol: &str) -> FeastResult<EntryPoint<'_>> {
        let function = unsafe {
            self.library
                .get::<unsafe extern "C" fn()>(symbol.as_bytes())
                .map_err(|_| FeastError::SymbolNotFound {
                    module: self.name().to_string(),
                    symbol: symbol.to_string(),
                })?
        };
        debug!(symbol, "resolved native entry point");
        // The symbol borrows the library, the EntryPoint keeps that borrow
        Ok(unsafe { EntryPoint::from_raw(*function as *const ()) })
    }
}

/// Process-wide library together with the configuration it was reached with
pub struct SharedLibrary {
    pub library: &'static FeastLibrary,
    pub config: Config,
}

static LIBRARY: OnceLock<Result<FeastLibrary, String>> = OnceLock::new();

/// Process-wide library, configured from the current directory
pub fn shared() -> FeastResult<SharedLibrary> {
    let start = std::env::current_dir().map_err(ConfigError::from)?;
    shared_from(&start)
}

/// Process-wide library, configured from `start_dir`
///
/// Settings are read on every call and fail with `FeastError::Config`. The
/// library itself is opened once: a failed open is remembered and reported
/// again instead of retrying.
pub fn shared_from(start_dir: &Path) -> FeastResult<SharedLibrary> {
    let config = ConfigLoader::new().load_from_directory(start_dir)?;
    let library = LIBRARY
        .get_or_init(|| FeastLibrary::open(&config).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|msg| FeastError::ModuleLoadError(msg.clone()))?;
    Ok(SharedLibrary { library, config })
}

fn ensure_supported_platform() -> FeastResult<()> {
    if cfg!(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "windows"
    )) {
        Ok(())
    } else {
        Err(FeastError::ModuleLoadError(format!(
            "native module unavailable on {}",
            std::env::consts::OS
        )))
    }
}

/// Configured paths first, then the platform defaults
fn search_paths(config: &Config) -> Vec<PathBuf> {
    let mut paths = config.search_paths().to_vec();
    paths.extend(default_search_paths());
    paths
}

/// Platform-specific default library search paths
///
/// - Linux: /usr/lib, /usr/local/lib, /lib (+ lib64 variants)
/// - macOS: /usr/lib, /usr/local/lib, /opt/homebrew/lib
/// - Windows: System32
/// - All platforms: current working directory, searched first
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/lib"));

        if cfg!(target_pointer_width = "64") {
            paths.push(PathBuf::from("/usr/lib64"));
            paths.push(PathBuf::from("/lib64"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/opt/homebrew/lib"));
    }

    #[cfg(target_os = "windows")]
    {
        paths.push(PathBuf::from("C:\\Windows\\System32"));
        if let Ok(system_root) = std::env::var("SystemRoot") {
            paths.push(PathBuf::from(format!("{}\\System32", system_root)));
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.insert(0, cwd);
    }

    paths
}

/// Resolve a library name to a file
///
/// An absolute path is used as is. A short name is tried with the platform
/// prefixes and extensions (`libFSToolbox.so`, `libFSToolbox.dylib`,
/// `FSToolbox.dll`) in every search path, in order.
fn resolve_library_path(name: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    let path = Path::new(name);
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    let extensions: &[&str] = if cfg!(target_os = "windows") {
        &["dll"]
    } else if cfg!(target_os = "macos") {
        &["dylib", "so"]
    } else {
        &["so"]
    };

    let prefixes: &[&str] = if cfg!(target_os = "windows") {
        &["", "lib"]
    } else {
        &["lib", ""]
    };

    for search_path in search_paths {
        for prefix in prefixes {
            for ext in extensions {
                let full_path = search_path.join(format!("{}{}.{}", prefix, name, ext));
                if full_path.exists() {
                    return Some(full_path);
                }
            }
        }
    }

    None
}
