//! exec, expansion and DOS structure layouts
//!
//! Only the leading fields this module touches are declared; every struct is
//! a prefix of the real one and is only ever reached through a pointer the
//! system handed out. Field names follow the include files.
//!
//! On m68k, longwords and pointers are word aligned, so `repr(C)` reproduces
//! the include file layouts exactly. On other targets the structs are only
//! built by tests.

use core::ffi::c_void;

use crate::bptr::Bptr;

/// `NT_BOOTNODE`
pub const NT_BOOTNODE: u8 = 16;

/// `DE_BOOTPRI`: `de_TableSize` must be at least this for `de_BootPri` to exist
pub const DE_BOOTPRI: u32 = 15;

/// `struct Node`
#[repr(C)]
pub struct Node {
    pub ln_succ: *mut Node,
    pub ln_pred: *mut Node,
    pub ln_type: u8,
    pub ln_pri: i8,
    pub ln_name: *const u8,
}

/// `struct List`
///
/// `lh_head`/`lh_tail` and `lh_tail`/`lh_tail_pred` double as the head and
/// tail sentinel nodes, so the field order must match [`Node`].
#[repr(C)]
pub struct List {
    pub lh_head: *mut Node,
    pub lh_tail: *mut Node,
    pub lh_tail_pred: *mut Node,
    pub lh_type: u8,
    pub l_pad: u8,
}

/// `struct Library`
#[repr(C)]
pub struct Library {
    pub lib_node: Node,
    pub lib_flags: u8,
    pub lib_pad: u8,
    pub lib_neg_size: u16,
    pub lib_pos_size: u16,
    pub lib_version: u16,
    pub lib_revision: u16,
    pub lib_id_string: *const u8,
    pub lib_sum: u32,
    pub lib_open_cnt: u16,
}

/// `struct ExecBase`, up to `SoftVer`
#[repr(C)]
pub struct ExecBase {
    pub lib_node: Library,
    /// Kickstart release
    pub soft_ver: u16,
}

/// `struct CurrentBinding`
#[repr(C)]
pub struct CurrentBinding {
    pub cb_config_dev: *mut c_void,
    pub cb_file_name: *mut u8,
    pub cb_product_string: *mut u8,
    pub cb_tool_types: *mut *mut u8,
}

/// `struct ExpansionBase`, up to `MountList`
#[repr(C)]
pub struct ExpansionBase {
    pub lib_node: Library,
    pub flags: u8,
    pub eb_private01: u8,
    pub eb_private02: u32,
    pub eb_private03: u32,
    pub eb_private04: CurrentBinding,
    pub eb_private05: List,
    pub mount_list: List,
}

/// `struct BootNode`
#[repr(C)]
pub struct BootNode {
    pub bn_node: Node,
    pub bn_flags: u16,
    pub bn_device_node: *mut DeviceNode,
}

/// `struct DeviceNode`
#[repr(C)]
pub struct DeviceNode {
    pub dn_next: Bptr,
    pub dn_type: u32,
    pub dn_task: *mut c_void,
    pub dn_lock: Bptr,
    pub dn_handler: Bptr,
    pub dn_stack_size: u32,
    pub dn_priority: i32,
    pub dn_startup: Bptr,
    pub dn_seg_list: Bptr,
    pub dn_global_vec: Bptr,
    /// BSTR
    pub dn_name: Bptr,
}

/// `struct FileSysStartupMsg`
#[repr(C)]
pub struct FileSysStartupMsg {
    pub fssm_unit: u32,
    pub fssm_device: Bptr,
    pub fssm_environ: Bptr,
    pub fssm_flags: u32,
}

/// `struct DosEnvec`, up to `de_BootPri`
#[repr(C)]
pub struct DosEnvec {
    /// Number of longwords that follow
    pub de_table_size: u32,
    pub de_size_block: u32,
    pub de_sec_org: u32,
    pub de_surfaces: u32,
    pub de_sectors_per_block: u32,
    pub de_blocks_per_track: u32,
    pub de_reserved: u32,
    pub de_pre_alloc: u32,
    pub de_interleave: u32,
    pub de_low_cyl: u32,
    pub de_high_cyl: u32,
    pub de_num_buffers: u32,
    pub de_buf_mem_type: u32,
    pub de_max_transfer: u32,
    pub de_mask: u32,
    pub de_boot_pri: i32,
}

#[cfg(target_arch = "m68k")]
const _: () = {
    use core::mem::size_of;
    assert!(size_of::<Node>() == 14);
    assert!(size_of::<List>() == 14);
    assert!(size_of::<Library>() == 34);
    assert!(size_of::<ExecBase>() == 36);
    assert!(size_of::<ExpansionBase>() == 88);
    assert!(size_of::<BootNode>() == 20);
    assert!(size_of::<DeviceNode>() == 44);
    assert!(size_of::<FileSysStartupMsg>() == 16);
    assert!(size_of::<DosEnvec>() == 64);
};
