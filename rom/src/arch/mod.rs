//! Target-specific bindings
//!
//! Only m68k has a real exec to talk to. Other targets build the adapter for
//! testing and never reach the cold start path.

#[cfg(target_arch = "m68k")]
pub mod m68k;
