//! exec.library services used by the module
//!
//! [`Exec`] is the seam between the adapter and the machine: on m68k it is
//! backed by the real library vectors (see `arch::m68k`), in tests by a
//! software double that performs the same list surgery.

use core::ffi::CStr;
use core::ptr::NonNull;

use crate::layout::{Library, List, Node};

/// NUL-terminated name for `OpenLibrary()`
pub const EXPANSION_LIBRARY: &CStr = match CStr::from_bytes_with_nul(b"expansion.library\0") {
    Ok(name) => name,
    Err(_) => panic!("library name is not NUL-terminated"),
};

pub trait Exec {
    /// `Forbid()`, nests
    fn forbid(&self);

    /// `Permit()`
    fn permit(&self);

    /// `Remove()`
    ///
    /// # Safety
    /// `node` must be linked into a valid list.
    unsafe fn remove(&self, node: NonNull<Node>);

    /// `Enqueue()`: insert by `ln_Pri`, FIFO among equals
    ///
    /// # Safety
    /// `list` must be a valid list and `node` must not be linked anywhere.
    unsafe fn enqueue(&self, list: NonNull<List>, node: NonNull<Node>);

    /// `OpenLibrary()`; `None` if the library is unavailable
    fn open_library(&self, name: &CStr, version: u32) -> Option<NonNull<Library>>;

    /// `CloseLibrary()`
    ///
    /// # Safety
    /// `library` must come from a matching `open_library` and not be closed yet.
    unsafe fn close_library(&self, library: NonNull<Library>);

    /// `SysBase->SoftVer`
    fn soft_ver(&self) -> u16;
}

impl<E: Exec + ?Sized> Exec for &E {
    fn forbid(&self) {
        (**self).forbid()
    }

    fn permit(&self) {
        (**self).permit()
    }

    unsafe fn remove(&self, node: NonNull<Node>) {
        (**self).remove(node)
    }

    unsafe fn enqueue(&self, list: NonNull<List>, node: NonNull<Node>) {
        (**self).enqueue(list, node)
    }

    fn open_library(&self, name: &CStr, version: u32) -> Option<NonNull<Library>> {
        (**self).open_library(name, version)
    }

    unsafe fn close_library(&self, library: NonNull<Library>) {
        (**self).close_library(library)
    }

    fn soft_ver(&self) -> u16 {
        (**self).soft_ver()
    }
}
