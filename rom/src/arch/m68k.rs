//! exec.library calls and the cold start entry for the 68000 family
//!
//! Library calls go through the jump table below the base pointer with the
//! base in a6. a6 doubles as the frame pointer here, so it is saved and
//! restored around each call instead of being named as an operand.

use core::arch::asm;
use core::ffi::{c_void, CStr};
use core::ptr::NonNull;

use bootselect_core::run;

use crate::exec::Exec;
use crate::expansion::AmigaHost;
use crate::layout::{ExecBase, Library, List, Node};
use crate::{POLICY, ROLES};

/// `AbsExecBase`
const ABS_EXEC_BASE: usize = 4;

const LVO_FORBID: i16 = -132;
const LVO_PERMIT: i16 = -138;
const LVO_REMOVE: i16 = -252;
const LVO_ENQUEUE: i16 = -270;
const LVO_CLOSE_LIBRARY: i16 = -414;
const LVO_OPEN_LIBRARY: i16 = -552;

/// exec.library as found at `AbsExecBase`
pub struct AmigaExec {
    sys_base: NonNull<ExecBase>,
}

impl AmigaExec {
    /// Reads `SysBase` from address 4
    ///
    /// # Safety
    /// Only valid on a running Kickstart, once exec has initialised itself.
    pub unsafe fn from_abs_exec_base() -> Option<Self> {
        let sys_base = *(ABS_EXEC_BASE as *const *mut ExecBase);
        NonNull::new(sys_base).map(|sys_base| Self { sys_base })
    }

    fn base(&self) -> *mut ExecBase {
        self.sys_base.as_ptr()
    }
}

impl Exec for AmigaExec {
    fn forbid(&self) {
        // SAFETY: Forbid() takes no arguments and only bumps TDNestCnt
        unsafe {
            asm!(
                "move.l %a6, -(%sp)",
                "move.l {base}, %a6",
                "jsr {lvo}(%a6)",
                "move.l (%sp)+, %a6",
                base = in(reg_addr) self.base(),
                lvo = const LVO_FORBID,
                out("d0") _, out("d1") _, out("a0") _, out("a1") _,
            );
        }
    }

    fn permit(&self) {
        // SAFETY: as Forbid()
        unsafe {
            asm!(
                "move.l %a6, -(%sp)",
                "move.l {base}, %a6",
                "jsr {lvo}(%a6)",
                "move.l (%sp)+, %a6",
                base = in(reg_addr) self.base(),
                lvo = const LVO_PERMIT,
                out("d0") _, out("d1") _, out("a0") _, out("a1") _,
            );
        }
    }

    unsafe fn remove(&self, node: NonNull<Node>) {
        asm!(
            "move.l %a6, -(%sp)",
            "move.l {base}, %a6",
            "jsr {lvo}(%a6)",
            "move.l (%sp)+, %a6",
            base = in(reg_addr) self.base(),
            lvo = const LVO_REMOVE,
            inout("a1") node.as_ptr() => _,
            out("d0") _, out("d1") _, out("a0") _,
        );
    }

    unsafe fn enqueue(&self, list: NonNull<List>, node: NonNull<Node>) {
        asm!(
            "move.l %a6, -(%sp)",
            "move.l {base}, %a6",
            "jsr {lvo}(%a6)",
            "move.l (%sp)+, %a6",
            base = in(reg_addr) self.base(),
            lvo = const LVO_ENQUEUE,
            inout("a0") list.as_ptr() => _,
            inout("a1") node.as_ptr() => _,
            out("d0") _, out("d1") _,
        );
    }

    fn open_library(&self, name: &CStr, version: u32) -> Option<NonNull<Library>> {
        let library: *mut Library;
        // SAFETY: name is NUL-terminated and outlives the call
        unsafe {
            asm!(
                "move.l %a6, -(%sp)",
                "move.l {base}, %a6",
                "jsr {lvo}(%a6)",
                "move.l (%sp)+, %a6",
                base = in(reg_addr) self.base(),
                lvo = const LVO_OPEN_LIBRARY,
                inout("a1") name.as_ptr() => _,
                inout("d0") version => library,
                out("d1") _, out("a0") _,
            );
        }
        NonNull::new(library)
    }

    unsafe fn close_library(&self, library: NonNull<Library>) {
        asm!(
            "move.l %a6, -(%sp)",
            "move.l {base}, %a6",
            "jsr {lvo}(%a6)",
            "move.l (%sp)+, %a6",
            base = in(reg_addr) self.base(),
            lvo = const LVO_CLOSE_LIBRARY,
            inout("a1") library.as_ptr() => _,
            out("d0") _, out("d1") _, out("a0") _,
        );
    }

    fn soft_ver(&self) -> u16 {
        // SAFETY: SysBase stays valid for the life of the system
        unsafe { (*self.base()).soft_ver }
    }
}

/// One selection pass, run from the romtag's init vector
#[no_mangle]
pub extern "C" fn bootselect_cold_start() {
    #[cfg(feature = "ram-log")]
    // SAFETY: cold start is single-threaded, nothing has logged yet
    unsafe {
        bootselect_core::logger::init_racy(log::LevelFilter::Info)
    };

    // SAFETY: init vectors run after exec is up
    let Some(exec) = (unsafe { AmigaExec::from_abs_exec_base() }) else {
        return;
    };

    // SAFETY: expansion.library hands out a live ExpansionBase, and its mount
    // list is only edited under Forbid() this early in the boot
    let mut host = unsafe { AmigaHost::new(exec) };
    let outcome = run(&mut host, &ROLES, &POLICY);
    log::info!("{:?}", outcome);
}

/// `TDNestCnt` in `struct ExecBase`
const TD_NEST_CNT: usize = 0x127;

/// Marks the init vector's frame so a panic can find its way back to it
const RECOVERY_COOKIE: u32 = u32::from_be_bytes(*b"BSWB");

// Init vector: saves the callee-saved registers and exec's Forbid() nesting,
// leaves a cookie on the stack and runs the pass. bootselect_recover unwinds to
// that cookie, restores TDNestCnt and returns to InitCode() as if the pass had
// finished.
core::arch::global_asm!(
    ".text",
    ".even",
    ".globl bootselect_init",
    "bootselect_init:",
    "    movem.l %d2-%d7/%a2-%a6, -(%sp)",
    "    move.l #4, %a0",
    "    move.l (%a0), %a6",
    "    moveq #0, %d0",
    "    move.b {nest}(%a6), %d0",
    "    move.l %d0, -(%sp)",
    "    move.l #{cookie}, -(%sp)",
    "    jsr bootselect_cold_start",
    "bootselect_leave:",
    "    addq.l #8, %sp",
    "    movem.l (%sp)+, %d2-%d7/%a2-%a6",
    "    moveq #0, %d0",
    "    rts",
    "",
    ".globl bootselect_recover",
    "bootselect_recover:",
    "    move.l %sp, %a0",
    "1:  cmp.l #{cookie}, (%a0)",
    "    beq.s 2f",
    "    addq.l #2, %a0",
    "    bra.s 1b",
    "2:  move.l %a0, %sp",
    "    move.l #4, %a0",
    "    move.l (%a0), %a6",
    "    move.l 4(%sp), %d0",
    "    move.b %d0, {nest}(%a6)",
    "    bra.s bootselect_leave",
    nest = const TD_NEST_CNT,
    cookie = const RECOVERY_COOKIE,
);

extern "C" {
    /// Entry stored in the romtag
    pub fn bootselect_init() -> *mut c_void;
    fn bootselect_recover() -> !;
}

/// Abandon the pass and return from the init vector
///
/// expansion.library stays open; the mount list is left as the pass left it.
#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    // SAFETY: every panic in this crate happens below bootselect_init's frame
    unsafe { bootselect_recover() }
}
