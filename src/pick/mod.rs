//! Package selection
//!
//! This module decides which of a release's published packages fits the host:
//! platform detection on one side, the portal's per-OS package lists on the
//! other.

mod picker;
mod platform;

pub use picker::{DefaultPackagePicker, PackagePicker};
pub use platform::{Arch, Host, System};
