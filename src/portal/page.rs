//! Parsing of the portal's download page.

use anyhow::{Result, anyhow};
use log::debug;
use scraper::{ElementRef, Html, Selector};

use super::types::{PackageCatalog, PackageInfo, VersionEntry};

/// A fetched copy of the portal's download page.
///
/// Holds the raw HTML and parses on demand, so the type stays `Send` and can
/// cross the async seam (the parsed DOM cannot).
#[derive(Debug, Clone)]
pub struct PortalPage {
    html: String,
}

impl PortalPage {
    pub fn new(html: String) -> Self {
        Self { html }
    }

    /// The versions listed in the page's `select.version` element, in
    /// document order. The portal puts the newest release first, at index
    /// `"0"`. An absent selector yields an empty list.
    pub fn versions(&self) -> Result<Vec<VersionEntry>> {
        let document = Html::parse_document(&self.html);
        let select = selector("select.version option")?;

        let mut versions = Vec::new();
        for option in document.select(&select) {
            let Some(index) = option.value().attr("value") else {
                continue;
            };
            let name = element_text(&option);
            if name.is_empty() {
                continue;
            }
            versions.push(VersionEntry {
                index: index.to_string(),
                name,
            });
        }
        Ok(versions)
    }

    /// The packages published for the version at the given index, grouped by
    /// the page's OS headers. A missing links block yields an empty catalog.
    pub fn packages(&self, index: &str) -> Result<PackageCatalog> {
        if !index.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(anyhow!("Invalid version index: {:?}", index));
        }

        let document = Html::parse_document(&self.html);
        let links_block = selector(&format!("div.links.v{}", index))?;
        let entries = selector("p.os-name, div.linkbox-link")?;
        let anchors = selector("a")?;

        let mut catalog = PackageCatalog::new();
        let Some(block) = document.select(&links_block).next() else {
            debug!("No links block for version index {}", index);
            return Ok(catalog);
        };

        let mut current_os: Option<String> = None;
        for element in block.select(&entries) {
            if has_class(&element, "os-name") {
                current_os = Some(element_text(&element));
            } else if let Some(os) = &current_os {
                // A linkbox carries an icon anchor and a text anchor; the
                // second one names the package and links to the file.
                let links: Vec<_> = element.select(&anchors).collect();
                if links.len() < 2 {
                    continue;
                }
                let name = element_text(&links[1]);
                let Some(path) = links[1].value().attr("href") else {
                    continue;
                };
                if name.is_empty() || path.is_empty() {
                    continue;
                }
                catalog.add(
                    os,
                    PackageInfo {
                        name,
                        path: path.to_string(),
                    },
                );
            }
        }

        Ok(catalog)
    }
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("Invalid selector {:?}: {}", s, e))
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
