//! Core data types: the architecture table and the on-disk layout.

pub mod arch;
pub mod layout;

pub use arch::{Arch, ARCHS};
pub use layout::Layout;
