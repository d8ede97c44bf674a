//! expansion.library handle and the [`Host`] built on exec
//!
//! Opening expansion.library yields an [`ExpansionLibrary`]; dropping it calls
//! `CloseLibrary()`, so the library is closed on every path out of a pass.

use core::ptr::{addr_of_mut, NonNull};

use bootselect_core::{ExpansionService, Host, HostError, EXPANSION_NAME};

use crate::exec::{Exec, EXPANSION_LIBRARY};
use crate::layout::ExpansionBase;
use crate::mount_list::ExecMountList;

/// An open expansion.library
pub struct ExpansionLibrary<'a, E: Exec> {
    base: NonNull<ExpansionBase>,
    exec: &'a E,
    mount_list: ExecMountList<'a, E>,
}

impl<E: Exec> ExpansionLibrary<'_, E> {
    pub fn base(&self) -> NonNull<ExpansionBase> {
        self.base
    }
}

impl<'a, E: Exec> ExpansionService for ExpansionLibrary<'a, E> {
    type List = ExecMountList<'a, E>;

    fn mount_list(&mut self) -> &mut ExecMountList<'a, E> {
        &mut self.mount_list
    }
}

impl<E: Exec> Drop for ExpansionLibrary<'_, E> {
    fn drop(&mut self) {
        // SAFETY: base came from open_library and is closed exactly once
        unsafe { self.exec.close_library(self.base.cast()) };
    }
}

/// The running machine, reached through exec
pub struct AmigaHost<E: Exec> {
    exec: E,
}

impl<E: Exec> AmigaHost<E> {
    /// # Safety
    /// Whatever `exec.open_library` returns for expansion.library must be a
    /// live `ExpansionBase` whose mount list satisfies [`ExecMountList::new`].
    pub unsafe fn new(exec: E) -> Self {
        Self { exec }
    }

    pub fn exec(&self) -> &E {
        &self.exec
    }
}

impl<E: Exec> Host for AmigaHost<E> {
    type Expansion<'a> = ExpansionLibrary<'a, E> where Self: 'a;

    fn kickstart_version(&self) -> u16 {
        self.exec.soft_ver()
    }

    fn open_expansion(&mut self, min_version: u32) -> Result<ExpansionLibrary<'_, E>, HostError> {
        let base = self
            .exec
            .open_library(EXPANSION_LIBRARY, min_version)
            .ok_or(HostError::LibraryUnavailable {
                name: EXPANSION_NAME,
                min_version,
            })?
            .cast::<ExpansionBase>();

        // SAFETY: base is a live ExpansionBase per AmigaHost::new
        let mount_list = unsafe {
            let list = NonNull::new_unchecked(addr_of_mut!((*base.as_ptr()).mount_list));
            ExecMountList::new(list, &self.exec)
        };

        Ok(ExpansionLibrary {
            base,
            exec: &self.exec,
            mount_list,
        })
    }
}
