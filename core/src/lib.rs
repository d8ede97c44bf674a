//! Workbench boot partition selection
//!
//! Picks which Workbench partition stays bootable for the running Kickstart.
//! Partitions are recognised by device name against a fixed [`roles::RoleTable`];
//! when more than one generation is present, every recognised partition whose
//! required Kickstart version differs from the running one is demoted to boot
//! priority -128 so the strap module skips it.
//!
//! The crate knows nothing about exec structure layouts. Hosts plug in through
//! [`mount::MountList`] and [`host::Host`]; the `bootselect-rom` crate does that
//! for the real machine, [`mount::MemMountList`] does it for tests.

#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

pub mod bstr;
pub mod demote;
pub mod host;
pub mod logger;
pub mod mount;
pub mod roles;
pub mod select;

pub use bstr::BStr;
pub use demote::{demote, NEVER_BOOT};
pub use host::{run, ExpansionService, Host, HostError, EXPANSION_MIN_VERSION, EXPANSION_NAME};
pub use mount::{MountList, PartitionHandle};
pub use roles::{Role, RoleTable, CLASSIC_PAIR, WORKBENCH};
pub use select::{scan, select, ExclusionScope, Outcome, Policy, SurvivorPolicy};
