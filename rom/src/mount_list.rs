//! `ExpansionBase->MountList` as a [`MountList`]
//!
//! Boot nodes are reached through three levels of indirection for their boot
//! priority: `bn_DeviceNode -> dn_Startup (BPTR) -> fssm_Environ (BPTR) ->
//! de_BootPri`. Any missing link makes the node nameless (never recognised)
//! or leaves its boot priority alone.

use core::marker::PhantomData;
use core::ptr::NonNull;
use core::slice;

use bootselect_core::{BStr, MountList, PartitionHandle};

use crate::exec::Exec;
use crate::layout::{BootNode, DeviceNode, DosEnvec, FileSysStartupMsg, List, DE_BOOTPRI};

/// A boot node known to be linked into a live mount list
///
/// Only handed out by [`ExecMountList`], whose constructor carries the
/// promise that every pointer reachable from the node is valid.
#[repr(transparent)]
pub struct MountedNode(BootNode);

impl MountedNode {
    fn device(&self) -> Option<&DeviceNode> {
        // SAFETY: ExecMountList::new guarantees a valid or NULL device node
        unsafe { self.0.bn_device_node.as_ref() }
    }

    fn envec(&self) -> Option<NonNull<DosEnvec>> {
        let device = self.device()?;
        // SAFETY: dn_Startup of a boot node is a FileSysStartupMsg or NULL
        let fssm = unsafe { device.dn_startup.to_ptr::<FileSysStartupMsg>().as_ref()? };
        let envec = NonNull::new(fssm.fssm_environ.to_ptr::<DosEnvec>())?;

        // Short tables end before de_BootPri
        // SAFETY: fssm_Environ points at a DosEnvec of at least one longword
        if unsafe { envec.as_ref().de_table_size } < DE_BOOTPRI {
            return None;
        }
        Some(envec)
    }

    pub fn boot_node(&self) -> &BootNode {
        &self.0
    }
}

impl PartitionHandle for MountedNode {
    fn name(&self) -> Option<BStr<'_>> {
        let name = self.device()?.dn_name.to_ptr::<u8>();
        if name.is_null() {
            return None;
        }
        // SAFETY: dn_Name is a BSTR: one length byte plus that many bytes
        let raw = unsafe { slice::from_raw_parts(name, *name as usize + 1) };
        BStr::from_prefixed(raw)
    }

    fn priority(&self) -> i8 {
        self.0.bn_node.ln_pri
    }

    fn boot_priority(&self) -> Option<i32> {
        // SAFETY: envec() only returns tables long enough to hold de_BootPri
        self.envec().map(|envec| unsafe { envec.as_ref().de_boot_pri })
    }

    fn set_priority(&mut self, pri: i8) {
        self.0.bn_node.ln_pri = pri;
    }

    fn set_boot_priority(&mut self, pri: i32) {
        if let Some(mut envec) = self.envec() {
            // SAFETY: as above; the envec belongs to this node's device
            unsafe { envec.as_mut().de_boot_pri = pri };
        }
    }
}

/// The expansion mount list, walked and edited through exec
pub struct ExecMountList<'a, E: Exec> {
    list: NonNull<List>,
    exec: &'a E,
    _list: PhantomData<&'a mut List>,
}

impl<'a, E: Exec> ExecMountList<'a, E> {
    /// # Safety
    /// `list` must be an initialised exec list of `BootNode`s that stays valid
    /// for `'a`, and every device node, startup message, environment vector and
    /// name reachable from it must be valid or NULL. Nobody else may edit the
    /// list outside a `Forbid()`.
    pub unsafe fn new(list: NonNull<List>, exec: &'a E) -> Self {
        Self {
            list,
            exec,
            _list: PhantomData,
        }
    }

    /// Boot node behind `node`, or `None` for the tail sentinel
    fn real_node(&self, node: *mut crate::layout::Node) -> Option<NonNull<MountedNode>> {
        let node = NonNull::new(node)?;
        // SAFETY: every ln_Succ in a valid list is a node or the tail
        // sentinel; the sentinel's own ln_Succ (lh_Tail) is NULL
        if unsafe { node.as_ref().ln_succ.is_null() } {
            return None;
        }
        Some(node.cast())
    }
}

impl<E: Exec> MountList for ExecMountList<'_, E> {
    type Node = NonNull<MountedNode>;
    type Partition = MountedNode;

    fn head(&self) -> Option<Self::Node> {
        // SAFETY: list is valid per new()
        self.real_node(unsafe { self.list.as_ref().lh_head })
    }

    fn successor(&self, node: Self::Node) -> Option<Self::Node> {
        // SAFETY: node came from this list
        self.real_node(unsafe { node.as_ref().0.bn_node.ln_succ })
    }

    fn partition(&self, node: Self::Node) -> &MountedNode {
        // SAFETY: node came from this list, which outlives the borrow
        unsafe { node.as_ref() }
    }

    fn partition_mut(&mut self, mut node: Self::Node) -> &mut MountedNode {
        // SAFETY: as above, and &mut self keeps other borrows of the list out
        unsafe { node.as_mut() }
    }

    fn remove(&mut self, node: Self::Node) {
        // SAFETY: node is linked into self.list
        unsafe { self.exec.remove(node.cast()) }
    }

    fn enqueue(&mut self, node: Self::Node) {
        // SAFETY: callers only enqueue a node they just removed
        unsafe { self.exec.enqueue(self.list, node.cast()) }
    }

    fn forbid(&mut self) {
        self.exec.forbid();
    }

    fn permit(&mut self) {
        self.exec.permit();
    }
}
