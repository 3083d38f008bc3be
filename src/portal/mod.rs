//! Vendor download-portal access.
//!
//! The portal publishes every J-Link release on a single HTML page: a
//! `<select>` of version names and, per version, blocks of package links
//! grouped by operating system. This module fetches that page and exposes it
//! as typed data.

mod client;
mod page;
mod types;

pub use client::{FetchPortal, Portal, SEGGER_PORTAL_URL};
pub use page::PortalPage;
pub use types::{PackageCatalog, PackageInfo, VersionEntry, find_version_index};

#[cfg(test)]
pub use client::MockFetchPortal;
