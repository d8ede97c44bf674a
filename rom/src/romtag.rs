//! Resident structure the Kickstart scanner finds at cold start
//!
//! The module runs once, after romboot.library has built the mount list
//! (priority -40) and before strap picks a boot device from it (priority -60).

use core::ffi::c_void;
use core::ptr;

/// `RTC_MATCHWORD` (`ILLEGAL`)
pub const RTC_MATCHWORD: u16 = 0x4AFC;
/// `RTF_COLDSTART`
pub const RTF_COLDSTART: u8 = 1 << 0;
/// `NT_UNKNOWN`
pub const NT_UNKNOWN: u8 = 0;

pub const MOD_VERSION: u8 = 40;
pub const MOD_PRIORITY: i8 = -50;

/// romboot.library, which fills the mount list
pub const ROMBOOT_PRIORITY: i8 = -40;
/// strap, which boots from it
pub const STRAP_PRIORITY: i8 = -60;

pub static MODULE_NAME: [u8; 13] = *b"bootselectwb\0";
pub static ID_STRING: [u8; 20] = *b"bootselectwb 40.1\r\n\0";

/// `struct Resident`
#[repr(C)]
pub struct Resident {
    pub rt_match_word: u16,
    pub rt_match_tag: *const Resident,
    pub rt_end_skip: *const c_void,
    pub rt_flags: u8,
    pub rt_version: u8,
    pub rt_type: u8,
    pub rt_pri: i8,
    pub rt_name: *const u8,
    pub rt_id_string: *const u8,
    pub rt_init: Option<unsafe extern "C" fn() -> *mut c_void>,
}

// SAFETY: the romtag is immutable and only holds addresses of statics
unsafe impl Sync for Resident {}

#[cfg(target_arch = "m68k")]
extern "C" {
    /// First byte after this module in the ROM image, placed by `romtag.ld`
    static __bootselect_end: u8;
}

#[used]
#[no_mangle]
pub static ROMTAG: Resident = Resident {
    rt_match_word: RTC_MATCHWORD,
    rt_match_tag: &ROMTAG,
    // SAFETY: only the address is taken
    #[cfg(target_arch = "m68k")]
    rt_end_skip: unsafe { ptr::addr_of!(__bootselect_end).cast() },
    // Off target there is no module image to skip; one past the end of ROMTAG
    #[cfg(not(target_arch = "m68k"))]
    rt_end_skip: unsafe { (&ROMTAG as *const Resident).add(1).cast() },
    rt_flags: RTF_COLDSTART,
    rt_version: MOD_VERSION,
    rt_type: NT_UNKNOWN,
    rt_pri: MOD_PRIORITY,
    rt_name: MODULE_NAME.as_ptr(),
    rt_id_string: ID_STRING.as_ptr(),
    rt_init: Some(init),
};

#[cfg(target_arch = "m68k")]
const _: () = assert!(core::mem::size_of::<Resident>() == 26);

#[cfg(target_arch = "m68k")]
use crate::arch::m68k::bootselect_init as init;

/// Init vector off target: there is no exec to run against
#[cfg(not(target_arch = "m68k"))]
unsafe extern "C" fn init() -> *mut c_void {
    ptr::null_mut()
}
