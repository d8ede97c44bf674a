//! Boot partition selection
//!
//! One pass over the mount list: classify every boot node against the role
//! table, then, if more than one Workbench generation is installed, demote
//! each one that does not belong to the running Kickstart.

use crate::demote::demote;
use crate::mount::{nodes, Forbidden, MountList, PartitionHandle};
use crate::roles::{RoleTable, MAX_ROLES};

/// How long the forbid bracket is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionScope {
    /// Only around each remove/write/enqueue sequence
    PerDemotion,
    /// Across the whole scan and every demotion
    WholePass,
}

/// Which matching roles stay bootable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurvivorPolicy {
    /// Every installed role whose version equals the running Kickstart
    AllMatching,
    /// Only the first such role in table order
    FirstMatching,
}

/// Selection settings, fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub exclusion: ExclusionScope,
    pub survivors: SurvivorPolicy,
}

impl Policy {
    pub const DEFAULT: Policy = Policy {
        exclusion: ExclusionScope::PerDemotion,
        survivors: SurvivorPolicy::AllMatching,
    };
}

impl Default for Policy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What a selection pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// expansion.library could not be opened; the list was not looked at
    Unavailable,
    /// At most one Workbench partition installed, nothing was touched
    NothingToArbitrate { matched: usize },
    /// More than one installed; `demoted` of them were made non-bootable
    Arbitrated { matched: usize, demoted: usize },
}

impl Outcome {
    pub fn demoted(&self) -> usize {
        match *self {
            Outcome::Arbitrated { demoted, .. } => demoted,
            _ => 0,
        }
    }
}

/// Boot nodes found for each role, indexed like the role table
#[derive(Debug, Clone, Copy)]
pub struct Candidates<N> {
    slots: [Option<N>; MAX_ROLES],
    matched: usize,
}

impl<N: Copy> Candidates<N> {
    fn new() -> Self {
        Self {
            slots: [None; MAX_ROLES],
            matched: 0,
        }
    }

    pub fn get(&self, role: usize) -> Option<N> {
        self.slots.get(role).copied().flatten()
    }

    /// Number of roles with a boot node
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// `(role index, node)` for every filled slot
    pub fn iter(&self) -> impl Iterator<Item = (usize, N)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(role, slot)| slot.map(|node| (role, node)))
    }
}

/// Classify every node in `list` against `roles`
///
/// A role keeps the first node that matched it; later nodes with the same
/// name are left out. Nodes that match no role are skipped.
pub fn scan<L: MountList + ?Sized>(list: &L, roles: &RoleTable) -> Candidates<L::Node> {
    let mut found = Candidates::new();

    for node in nodes(list) {
        let Some(name) = list.partition(node).name() else {
            continue;
        };
        let Some(role) = roles.classify(&name) else {
            continue;
        };

        let slot = &mut found.slots[role];
        if slot.is_none() {
            *slot = Some(node);
            found.matched += 1;
            log::debug!("found {} for role {}", name, roles.get(role).map_or("?", |r| r.id));
        } else {
            log::debug!("ignoring duplicate {}", name);
        }
    }

    found
}

/// Run one selection pass over `list`
pub fn select<L: MountList + ?Sized>(
    list: &mut L,
    roles: &RoleTable,
    kick_version: u16,
    policy: &Policy,
) -> Outcome {
    match policy.exclusion {
        ExclusionScope::PerDemotion => arbitrate(list, roles, kick_version, policy),
        ExclusionScope::WholePass => {
            let mut list = Forbidden::enter(list);
            arbitrate(&mut *list, roles, kick_version, policy)
        }
    }
}

fn arbitrate<L: MountList + ?Sized>(
    list: &mut L,
    roles: &RoleTable,
    kick_version: u16,
    policy: &Policy,
) -> Outcome {
    let found = scan(list, roles);
    let matched = found.matched();

    if matched <= 1 {
        log::info!("{} Workbench partition(s), nothing to select", matched);
        return Outcome::NothingToArbitrate { matched };
    }

    let mut kept = false;
    let mut demoted = 0;

    for (index, role) in roles.iter().enumerate() {
        let Some(node) = found.get(index) else {
            continue;
        };

        let survives = role.kick_version == kick_version
            && (policy.survivors == SurvivorPolicy::AllMatching || !kept);
        if survives {
            kept = true;
            log::info!("keeping WB {} for Kickstart {}", role.id, kick_version);
            continue;
        }

        demote(list, node);
        demoted += 1;
        log::info!("demoted WB {} (wants Kickstart {})", role.id, role.kick_version);
    }

    Outcome::Arbitrated { matched, demoted }
}
