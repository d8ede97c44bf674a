//! Host services around a selection pass
//!
//! The pass needs two things from the machine: the running Kickstart version
//! and an open expansion.library to reach the mount list. [`run`] opens the
//! library, selects, and lets the handle close itself when it drops.

use core::fmt;

use crate::mount::MountList;
use crate::roles::RoleTable;
use crate::select::{select, Outcome, Policy};

/// Library that owns the mount list
pub const EXPANSION_NAME: &str = "expansion.library";

/// Any version will do
pub const EXPANSION_MIN_VERSION: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// OpenLibrary returned NULL
    LibraryUnavailable {
        name: &'static str,
        min_version: u32,
    },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LibraryUnavailable { name, min_version } => {
                write!(f, "cannot open {} v{}", name, min_version)
            }
        }
    }
}

/// An open expansion.library
///
/// Implementors close the library in `Drop`.
pub trait ExpansionService {
    type List: MountList + ?Sized;

    fn mount_list(&mut self) -> &mut Self::List;
}

/// The machine the pass runs on
pub trait Host {
    type Expansion<'a>: ExpansionService
    where
        Self: 'a;

    /// exec's `SoftVer`
    fn kickstart_version(&self) -> u16;

    /// Open [`EXPANSION_NAME`] with at least `min_version`
    fn open_expansion(&mut self, min_version: u32) -> Result<Self::Expansion<'_>, HostError>;
}

/// Open expansion.library, run one selection pass, close it again
///
/// Never fails: a missing library just means the boot continues with the
/// default selection.
pub fn run<H: Host + ?Sized>(host: &mut H, roles: &RoleTable, policy: &Policy) -> Outcome {
    let kick_version = host.kickstart_version();

    let mut expansion = match host.open_expansion(EXPANSION_MIN_VERSION) {
        Ok(expansion) => expansion,
        Err(err) => {
            log::warn!("{}, leaving boot order alone", err);
            return Outcome::Unavailable;
        }
    };

    log::debug!("Kickstart {}, {} roles", kick_version, roles.len());
    select(expansion.mount_list(), roles, kick_version, policy)
}
