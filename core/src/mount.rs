//! Mount list abstraction
//!
//! The expansion library owns the mount list; this crate only walks it and,
//! under exclusion, moves nodes around. Hosts expose their list through
//! [`MountList`] and each boot node through [`PartitionHandle`], so the
//! selection logic never sees exec structure layouts.

use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::bstr::BStr;

/// What the selector needs from one boot node
pub trait PartitionHandle {
    /// Device name, or `None` if the node carries no usable name
    fn name(&self) -> Option<BStr<'_>>;

    /// Node priority (`ln_Pri`)
    fn priority(&self) -> i8;

    /// Boot priority from the filesystem environment vector, if the node has one
    fn boot_priority(&self) -> Option<i32>;

    fn set_priority(&mut self, pri: i8);

    /// No-op when the node has no environment vector
    fn set_boot_priority(&mut self, pri: i32);
}

/// An ordered list of boot nodes owned by someone else
///
/// `remove`/`enqueue` and writes through `partition_mut` must only happen
/// between `forbid` and `permit`; use [`Forbidden`] rather than calling the
/// pair by hand.
pub trait MountList {
    /// Cheap reference to a node in this list
    type Node: Copy + PartialEq + fmt::Debug;
    type Partition: PartitionHandle + ?Sized;

    fn head(&self) -> Option<Self::Node>;

    /// Next node, `None` at the tail sentinel
    fn successor(&self, node: Self::Node) -> Option<Self::Node>;

    fn partition(&self, node: Self::Node) -> &Self::Partition;

    fn partition_mut(&mut self, node: Self::Node) -> &mut Self::Partition;

    /// Unlink `node`. It must currently be in the list.
    fn remove(&mut self, node: Self::Node);

    /// Insert `node` ordered by priority: ahead of the first node with a
    /// strictly lower priority, behind every node of equal priority.
    fn enqueue(&mut self, node: Self::Node);

    /// Stop every other task from running. Calls nest.
    fn forbid(&mut self);

    fn permit(&mut self);
}

/// Scoped exclusion over a mount list
///
/// Forbids on entry, permits on drop, whatever path leaves the scope.
pub struct Forbidden<'a, L: MountList + ?Sized> {
    list: &'a mut L,
}

impl<'a, L: MountList + ?Sized> Forbidden<'a, L> {
    pub fn enter(list: &'a mut L) -> Self {
        list.forbid();
        Self { list }
    }
}

impl<L: MountList + ?Sized> Drop for Forbidden<'_, L> {
    fn drop(&mut self) {
        self.list.permit();
    }
}

impl<L: MountList + ?Sized> Deref for Forbidden<'_, L> {
    type Target = L;

    fn deref(&self) -> &L {
        self.list
    }
}

impl<L: MountList + ?Sized> DerefMut for Forbidden<'_, L> {
    fn deref_mut(&mut self) -> &mut L {
        self.list
    }
}

/// Iterator over the nodes of a mount list, head to tail
pub struct Nodes<'a, L: MountList + ?Sized> {
    list: &'a L,
    next: Option<L::Node>,
}

impl<L: MountList + ?Sized> Iterator for Nodes<'_, L> {
    type Item = L::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = self.list.successor(node);
        Some(node)
    }
}

pub fn nodes<L: MountList + ?Sized>(list: &L) -> Nodes<'_, L> {
    Nodes {
        next: list.head(),
        list,
    }
}

#[cfg(any(test, feature = "alloc"))]
pub use mem::{MemMountList, MemNode, MemPartition};

#[cfg(any(test, feature = "alloc"))]
mod mem {
    use core::cell::Cell;

    use super::{MountList, PartitionHandle};
    use crate::bstr::{BStr, MAX_LEN};

    use alloc::string::String;
    use alloc::vec::Vec;

    /// One partition held by [`MemMountList`]
    #[derive(Debug, Clone)]
    pub struct MemPartition {
        name: Vec<u8>,
        priority: i8,
        boot_priority: i32,
    }

    impl MemPartition {
        /// Partition whose boot priority mirrors its node priority
        ///
        /// # Panics
        /// If `name` is longer than a BSTR can hold.
        pub fn new(name: &str, priority: i8) -> Self {
            assert!(name.len() <= MAX_LEN, "device name too long for a BSTR");
            let mut raw = Vec::with_capacity(name.len() + 1);
            raw.push(name.len() as u8);
            raw.extend_from_slice(name.as_bytes());
            Self {
                name: raw,
                priority,
                boot_priority: priority as i32,
            }
        }

        pub fn with_boot_priority(mut self, boot_priority: i32) -> Self {
            self.boot_priority = boot_priority;
            self
        }

        pub fn name_lossy(&self) -> String {
            String::from_utf8_lossy(&self.name[1..]).into_owned()
        }
    }

    impl PartitionHandle for MemPartition {
        fn name(&self) -> Option<BStr<'_>> {
            BStr::from_prefixed(&self.name)
        }

        fn priority(&self) -> i8 {
            self.priority
        }

        fn boot_priority(&self) -> Option<i32> {
            Some(self.boot_priority)
        }

        fn set_priority(&mut self, pri: i8) {
            self.priority = pri;
        }

        fn set_boot_priority(&mut self, pri: i32) {
            self.boot_priority = pri;
        }
    }

    /// Index of a partition in a [`MemMountList`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MemNode(usize);

    /// In-memory mount list with exec list ordering semantics
    ///
    /// Partitions live in an arena and never move; the list order is kept
    /// separately so removal and re-insertion behave like exec's `Remove` and
    /// `Enqueue`. Reads and mutations made outside a forbid bracket are
    /// counted separately.
    #[derive(Debug, Default)]
    pub struct MemMountList {
        arena: Vec<MemPartition>,
        order: Vec<usize>,
        forbid_depth: usize,
        unguarded: usize,
        unguarded_reads: Cell<usize>,
    }

    impl MemMountList {
        pub fn new() -> Self {
            Self::default()
        }

        /// Build a list in exactly the given order
        pub fn from_partitions<I: IntoIterator<Item = MemPartition>>(parts: I) -> Self {
            let mut list = Self::new();
            for part in parts {
                list.push(part);
            }
            list
        }

        /// Append at the tail regardless of priority
        pub fn push(&mut self, part: MemPartition) -> MemNode {
            let idx = self.arena.len();
            self.arena.push(part);
            self.order.push(idx);
            MemNode(idx)
        }

        pub fn len(&self) -> usize {
            self.order.len()
        }

        pub fn is_empty(&self) -> bool {
            self.order.is_empty()
        }

        pub fn get(&self, node: MemNode) -> &MemPartition {
            &self.arena[node.0]
        }

        /// Device names in list order
        pub fn names(&self) -> Vec<String> {
            self.order.iter().map(|&i| self.arena[i].name_lossy()).collect()
        }

        /// Find a partition by exact device name
        pub fn find(&self, name: &str) -> Option<MemNode> {
            self.order
                .iter()
                .copied()
                .find(|&i| &self.arena[i].name[1..] == name.as_bytes())
                .map(MemNode)
        }

        pub fn forbid_depth(&self) -> usize {
            self.forbid_depth
        }

        /// Number of mutations made while no forbid was held
        pub fn unguarded_mutations(&self) -> usize {
            self.unguarded
        }

        /// Number of list walks and partition reads made while no forbid was held
        pub fn unguarded_reads(&self) -> usize {
            self.unguarded_reads.get()
        }

        fn note_read(&self) {
            if self.forbid_depth == 0 {
                self.unguarded_reads.set(self.unguarded_reads.get() + 1);
            }
        }

        fn note_mutation(&mut self) {
            if self.forbid_depth == 0 {
                self.unguarded += 1;
            }
        }

        fn position(&self, node: MemNode) -> Option<usize> {
            self.order.iter().position(|&i| i == node.0)
        }
    }

    impl MountList for MemMountList {
        type Node = MemNode;
        type Partition = MemPartition;

        fn head(&self) -> Option<MemNode> {
            self.note_read();
            self.order.first().copied().map(MemNode)
        }

        fn successor(&self, node: MemNode) -> Option<MemNode> {
            self.note_read();
            let pos = self.position(node)?;
            self.order.get(pos + 1).copied().map(MemNode)
        }

        fn partition(&self, node: MemNode) -> &MemPartition {
            self.note_read();
            &self.arena[node.0]
        }

        fn partition_mut(&mut self, node: MemNode) -> &mut MemPartition {
            self.note_mutation();
            &mut self.arena[node.0]
        }

        fn remove(&mut self, node: MemNode) {
            self.note_mutation();
            let pos = self.position(node);
            debug_assert!(pos.is_some(), "removing a node that is not linked");
            if let Some(pos) = pos {
                self.order.remove(pos);
            }
        }

        fn enqueue(&mut self, node: MemNode) {
            self.note_mutation();
            debug_assert!(self.position(node).is_none(), "enqueueing a linked node");
            let pri = self.arena[node.0].priority;
            let pos = self
                .order
                .iter()
                .position(|&i| self.arena[i].priority < pri)
                .unwrap_or(self.order.len());
            self.order.insert(pos, node.0);
        }

        fn forbid(&mut self) {
            self.forbid_depth += 1;
        }

        fn permit(&mut self) {
            debug_assert!(self.forbid_depth > 0, "permit without forbid");
            self.forbid_depth = self.forbid_depth.saturating_sub(1);
        }
    }
}
