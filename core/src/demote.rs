//! Partition demotion
//!
//! A demoted boot node gets priority -128 in both places the boot code looks:
//! the node's `ln_Pri` and the environment vector's `de_BootPri`. The strap
//! module never auto-boots a node at -128.

use crate::mount::{Forbidden, MountList, PartitionHandle};

/// Boot priority that excludes a node from automatic boot selection
pub const NEVER_BOOT: i8 = -128;

/// Demote `node` and move it to its new place in the list
///
/// Remove, the two priority writes and the re-insertion happen inside one
/// forbid bracket, so nobody sees the node detached. Demoting an already
/// demoted node leaves it at -128.
pub fn demote<L: MountList + ?Sized>(list: &mut L, node: L::Node) {
    let mut list = Forbidden::enter(list);

    list.remove(node);
    let part = list.partition_mut(node);
    part.set_priority(NEVER_BOOT);
    part.set_boot_priority(NEVER_BOOT as i32);
    list.enqueue(node);
}
