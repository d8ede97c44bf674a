//! BootSelectWB resident module
//!
//! Glue between the Kickstart environment and `bootselect-core`: exec structure
//! layouts, BCPL pointers, the mount list adapter and the romtag the ROM
//! scanner finds at cold start.
//!
//! Only the exec call bindings and the cold start entry are m68k-specific;
//! everything else builds and is tested on the development host.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "m68k", feature(asm_experimental_arch))]

pub mod arch;
pub mod bptr;
pub mod exec;
pub mod expansion;
pub mod layout;
pub mod mount_list;
pub mod romtag;

#[cfg(test)]
mod testing;

use bootselect_core::{ExclusionScope, Policy, RoleTable, SurvivorPolicy};

/// Role table compiled into this build
#[cfg(not(feature = "classic-pair"))]
pub const ROLES: RoleTable = bootselect_core::WORKBENCH;

/// Role table compiled into this build
#[cfg(feature = "classic-pair")]
pub const ROLES: RoleTable = bootselect_core::CLASSIC_PAIR;

/// Selection policy compiled into this build
pub const POLICY: Policy = Policy {
    exclusion: if cfg!(feature = "whole-pass-forbid") {
        ExclusionScope::WholePass
    } else {
        ExclusionScope::PerDemotion
    },
    survivors: SurvivorPolicy::AllMatching,
};
