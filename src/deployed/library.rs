//! Shared library handles of deployed packages.

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::error::{Result, RuntimeError};

/// An opened shared library.
///
/// The library stays loaded until the handle is dropped: `dlopen` on Unix,
/// `LoadLibraryExW` on Windows.
#[derive(Debug)]
pub struct LoadedLibrary {
    path: PathBuf,
    handle: NonNull<c_void>,
}

impl LoadedLibrary {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
impl LoadedLibrary {
    /// Open the library at `path`, resolving all symbols now.
    pub fn open(path: &Path) -> Result<Self> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| load_error(path, "path contains a NUL byte"))?;
        tracing::debug!("dlopen {}", path.display());
        let raw = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        match NonNull::new(raw) {
            Some(handle) => Ok(Self {
                path: path.to_path_buf(),
                handle,
            }),
            None => Err(load_error(path, &last_dl_error())),
        }
    }

    /// Address of the exported symbol `name`.
    pub fn symbol(&self, name: &str) -> Option<NonNull<c_void>> {
        let c_name = std::ffi::CString::new(name).ok()?;
        NonNull::new(unsafe { libc::dlsym(self.handle.as_ptr(), c_name.as_ptr()) })
    }
}

#[cfg(unix)]
fn last_dl_error() -> String {
    let msg = unsafe { libc::dlerror() };
    if msg.is_null() {
        "unknown dlopen failure".to_string()
    } else {
        unsafe { std::ffi::CStr::from_ptr(msg) }
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(unix)]
impl Drop for LoadedLibrary {
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.handle.as_ptr());
        }
    }
}

#[cfg(windows)]
impl LoadedLibrary {
    /// Open the DLL at `path`. Its own directory is searched for the DLLs
    /// it depends on.
    pub fn open(path: &Path) -> Result<Self> {
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::System::LibraryLoader::{
            LoadLibraryExW, LOAD_WITH_ALTERED_SEARCH_PATH,
        };

        let wide: Vec<u16> = path.as_os_str().encode_wide().collect();
        if wide.contains(&0) {
            return Err(load_error(path, "path contains a NUL character"));
        }
        let wide: Vec<u16> = wide.into_iter().chain(Some(0)).collect();
        tracing::debug!("LoadLibraryExW {}", path.display());
        let raw = unsafe {
            LoadLibraryExW(
                wide.as_ptr(),
                std::ptr::null_mut(),
                LOAD_WITH_ALTERED_SEARCH_PATH,
            )
        };
        match NonNull::new(raw) {
            Some(handle) => Ok(Self {
                path: path.to_path_buf(),
                handle,
            }),
            None => Err(load_error(
                path,
                &std::io::Error::last_os_error().to_string(),
            )),
        }
    }

    /// Address of the exported symbol `name`.
    pub fn symbol(&self, name: &str) -> Option<NonNull<c_void>> {
        use windows_sys::Win32::System::LibraryLoader::GetProcAddress;

        let c_name = std::ffi::CString::new(name).ok()?;
        let proc = unsafe { GetProcAddress(self.handle.as_ptr(), c_name.as_ptr().cast()) }?;
        NonNull::new(proc as *mut c_void)
    }
}

#[cfg(windows)]
impl Drop for LoadedLibrary {
    fn drop(&mut self) {
        unsafe {
            windows_sys::Win32::Foundation::FreeLibrary(self.handle.as_ptr());
        }
    }
}

// The handle is only passed to the loader's lookup and unload calls, which
// are thread-safe on both families.
unsafe impl Send for LoadedLibrary {}
unsafe impl Sync for LoadedLibrary {}

fn load_error(path: &Path, message: &str) -> RuntimeError {
    RuntimeError::DeploymentLoad {
        package: path.display().to_string(),
        message: message.to_string(),
    }
}
