//! BCPL pointers
//!
//! DOS structures point at each other with BPTRs: a longword address divided
//! by four. `BADDR()` multiplies it back.

use core::fmt;

/// A BCPL pointer
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Bptr(usize);

impl Bptr {
    pub const NULL: Bptr = Bptr(0);

    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `MKBADDR()`; `None` unless `ptr` is longword aligned
    pub fn from_ptr<T>(ptr: *const T) -> Option<Self> {
        let addr = ptr as usize;
        if addr & 3 != 0 {
            return None;
        }
        Some(Self(addr >> 2))
    }

    /// `BADDR()`
    pub fn to_ptr<T>(self) -> *mut T {
        (self.0 << 2) as *mut T
    }
}

impl fmt::Debug for Bptr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BPTR({:#x})", self.0 << 2)
    }
}
