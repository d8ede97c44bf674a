//! Host-side stand-ins for exec and the expansion mount list
//!
//! `SoftExec` performs exec's list operations in Rust and counts what it is
//! asked to do; `MountFixture` lays out boot nodes, device nodes, startup
//! messages and environment vectors the way the expansion library would.

use core::cell::Cell;
use core::ffi::CStr;
use core::mem;
use core::ptr::{self, addr_of, addr_of_mut, NonNull};

use crate::bptr::Bptr;
use crate::exec::{Exec, EXPANSION_LIBRARY};
use crate::layout::{
    BootNode, DeviceNode, DosEnvec, ExpansionBase, FileSysStartupMsg, Library, List, Node,
    DE_BOOTPRI, NT_BOOTNODE,
};

/// `NewList()`
pub unsafe fn new_list(list: *mut List) {
    (*list).lh_head = addr_of_mut!((*list).lh_tail).cast();
    (*list).lh_tail = ptr::null_mut();
    (*list).lh_tail_pred = addr_of_mut!((*list).lh_head).cast();
}

/// `AddTail()`
pub unsafe fn add_tail(list: *mut List, node: *mut Node) {
    let tail: *mut Node = addr_of_mut!((*list).lh_tail).cast();
    let pred = (*list).lh_tail_pred;
    (*node).ln_succ = tail;
    (*node).ln_pred = pred;
    (*pred).ln_succ = node;
    (*list).lh_tail_pred = node;
}

/// `Remove()`
pub unsafe fn remove(node: *mut Node) {
    let succ = (*node).ln_succ;
    let pred = (*node).ln_pred;
    (*pred).ln_succ = succ;
    (*succ).ln_pred = pred;
}

/// `Enqueue()`
pub unsafe fn enqueue(list: *mut List, node: *mut Node) {
    let pri = (*node).ln_pri;
    let mut next = (*list).lh_head;
    while !(*next).ln_succ.is_null() {
        if (*next).ln_pri < pri {
            break;
        }
        next = (*next).ln_succ;
    }
    let pred = (*next).ln_pred;
    (*node).ln_succ = next;
    (*node).ln_pred = pred;
    (*pred).ln_succ = node;
    (*next).ln_pred = node;
}

/// exec done in software
pub struct SoftExec {
    soft_ver: u16,
    library: Option<NonNull<Library>>,
    forbid_depth: Cell<usize>,
    max_forbid_depth: Cell<usize>,
    unguarded: Cell<usize>,
    opened: Cell<usize>,
    closed: Cell<usize>,
    requested_version: Cell<Option<u32>>,
}

impl SoftExec {
    /// exec without expansion.library
    pub fn new(soft_ver: u16) -> Self {
        Self {
            soft_ver,
            library: None,
            forbid_depth: Cell::new(0),
            max_forbid_depth: Cell::new(0),
            unguarded: Cell::new(0),
            opened: Cell::new(0),
            closed: Cell::new(0),
            requested_version: Cell::new(None),
        }
    }

    pub fn with_expansion(soft_ver: u16, base: NonNull<Library>) -> Self {
        Self {
            library: Some(base),
            ..Self::new(soft_ver)
        }
    }

    pub fn forbid_depth(&self) -> usize {
        self.forbid_depth.get()
    }

    /// Deepest Forbid() nesting seen so far
    pub fn max_forbid_depth(&self) -> usize {
        self.max_forbid_depth.get()
    }

    /// List edits made without a Forbid() held
    pub fn unguarded_edits(&self) -> usize {
        self.unguarded.get()
    }

    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn closed(&self) -> usize {
        self.closed.get()
    }

    pub fn requested_version(&self) -> Option<u32> {
        self.requested_version.get()
    }

    fn note_edit(&self) {
        if self.forbid_depth.get() == 0 {
            self.unguarded.set(self.unguarded.get() + 1);
        }
    }
}

impl Exec for SoftExec {
    fn forbid(&self) {
        let depth = self.forbid_depth.get() + 1;
        self.forbid_depth.set(depth);
        self.max_forbid_depth.set(self.max_forbid_depth.get().max(depth));
    }

    fn permit(&self) {
        assert!(self.forbid_depth.get() > 0, "Permit() without Forbid()");
        self.forbid_depth.set(self.forbid_depth.get() - 1);
    }

    unsafe fn remove(&self, node: NonNull<Node>) {
        self.note_edit();
        remove(node.as_ptr());
    }

    unsafe fn enqueue(&self, list: NonNull<List>, node: NonNull<Node>) {
        self.note_edit();
        enqueue(list.as_ptr(), node.as_ptr());
    }

    fn open_library(&self, name: &CStr, version: u32) -> Option<NonNull<Library>> {
        self.requested_version.set(Some(version));
        if name != EXPANSION_LIBRARY {
            return None;
        }
        let library = self.library?;
        self.opened.set(self.opened.get() + 1);
        Some(library)
    }

    unsafe fn close_library(&self, library: NonNull<Library>) {
        assert_eq!(Some(library), self.library, "closing a library that was never opened");
        self.closed.set(self.closed.get() + 1);
    }

    fn soft_ver(&self) -> u16 {
        self.soft_ver
    }
}

/// One partition for [`MountFixture`]
#[derive(Clone, Copy)]
pub struct PartSpec {
    name: Option<&'static str>,
    pri: i8,
    boot_pri: i32,
    table_size: u32,
    startup: bool,
}

impl PartSpec {
    /// Fully wired partition, boot priority mirroring the node priority
    pub fn new(name: &'static str, pri: i8) -> Self {
        Self {
            name: Some(name),
            pri,
            boot_pri: pri as i32,
            table_size: DE_BOOTPRI + 1,
            startup: true,
        }
    }

    /// Boot node without a device node
    pub fn detached(pri: i8) -> Self {
        Self {
            name: None,
            startup: false,
            ..Self::new("", pri)
        }
    }

    pub fn boot_priority(mut self, boot_pri: i32) -> Self {
        self.boot_pri = boot_pri;
        self
    }

    pub fn table_size(mut self, table_size: u32) -> Self {
        self.table_size = table_size;
        self
    }

    /// Device node with dn_Startup left NULL
    pub fn no_startup(mut self) -> Self {
        self.startup = false;
        self
    }
}

#[repr(C, align(4))]
struct NameBuf([u8; 256]);

#[repr(C)]
struct PartStorage {
    node: BootNode,
    device: DeviceNode,
    fssm: FileSysStartupMsg,
    envec: DosEnvec,
    name: NameBuf,
}

struct Part {
    spec: PartSpec,
    storage: Box<PartStorage>,
}

/// An ExpansionBase with a populated mount list
pub struct MountFixture {
    expansion: Box<ExpansionBase>,
    parts: Vec<Part>,
}

impl MountFixture {
    /// Boot nodes are added with `AddTail()` in the given order
    pub fn new(specs: &[PartSpec]) -> Self {
        // SAFETY: all-zero is a valid ExpansionBase (NULL pointers, zero counts)
        let mut expansion: Box<ExpansionBase> = Box::new(unsafe { mem::zeroed() });
        let list = addr_of_mut!(expansion.mount_list);
        unsafe { new_list(list) };

        let mut parts = Vec::with_capacity(specs.len());
        for spec in specs {
            // SAFETY: as above
            let mut storage: Box<PartStorage> = Box::new(unsafe { mem::zeroed() });
            let p: *mut PartStorage = &mut *storage;

            unsafe {
                (*p).node.bn_node.ln_type = NT_BOOTNODE;
                (*p).node.bn_node.ln_pri = spec.pri;

                if let Some(name) = spec.name {
                    (*p).name.0[0] = name.len() as u8;
                    (&mut (*p).name.0)[1..=name.len()].copy_from_slice(name.as_bytes());
                    (*p).device.dn_name = Bptr::from_ptr(addr_of!((*p).name)).unwrap();
                    (*p).node.bn_device_node = addr_of_mut!((*p).device);
                }

                if spec.startup {
                    (*p).device.dn_startup = Bptr::from_ptr(addr_of!((*p).fssm)).unwrap();
                    (*p).fssm.fssm_environ = Bptr::from_ptr(addr_of!((*p).envec)).unwrap();
                }
                (*p).envec.de_table_size = spec.table_size;
                (*p).envec.de_boot_pri = spec.boot_pri;

                add_tail(list, addr_of_mut!((*p).node.bn_node));
            }

            parts.push(Part {
                spec: *spec,
                storage,
            });
        }

        Self { expansion, parts }
    }

    pub fn mount_list(&mut self) -> NonNull<List> {
        NonNull::from(&mut self.expansion.mount_list)
    }

    pub fn library(&mut self) -> NonNull<Library> {
        NonNull::from(&mut *self.expansion).cast()
    }

    fn part(&self, name: &str) -> &Part {
        self.parts
            .iter()
            .find(|p| p.spec.name == Some(name))
            .unwrap_or_else(|| panic!("no partition {}", name))
    }

    /// `(ln_Pri, de_BootPri)`, the latter only where the chain reaches it
    pub fn priorities(&self, name: &str) -> (i8, Option<i32>) {
        let part = self.part(name);
        let envec = &part.storage.envec;
        let boot = (part.spec.startup && envec.de_table_size >= DE_BOOTPRI)
            .then_some(envec.de_boot_pri);
        (part.storage.node.bn_node.ln_pri, boot)
    }

    /// `de_BootPri` as stored, regardless of table size
    pub fn raw_boot_pri(&self, name: &str) -> i32 {
        self.part(name).storage.envec.de_boot_pri
    }

    /// Device names in list order, read straight off the exec list
    pub fn order(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut node = self.expansion.mount_list.lh_head;
        unsafe {
            while !(*node).ln_succ.is_null() {
                let boot = node as *const BootNode;
                let name = self
                    .parts
                    .iter()
                    .find(|p| ptr::eq(&p.storage.node, boot))
                    .and_then(|p| p.spec.name)
                    .unwrap_or("<none>");
                names.push(name.to_string());
                node = (*node).ln_succ;
            }
        }
        names
    }
}
