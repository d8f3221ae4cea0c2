//! Shell context-menu entries derived from the registry.
//!
//! Installers need one cascading "Convert with LiteSwitch" menu per source
//! extension with one item per reachable target. The entries are computed
//! from the same registry the dispatcher uses, so the menu can never offer a
//! conversion the CLI would reject. Writing them into the Windows registry
//! or desktop files is left to the installer.

use crate::format::Format;
use crate::registry::Registry;
use serde::Serialize;

pub const MENU_TITLE: &str = "Convert with LiteSwitch";

/// Placeholder the shell replaces with the selected file.
pub const FILE_PLACEHOLDER: &str = "%1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    /// Source extension the menu is attached to.
    pub source: Format,
    pub title: String,
    pub entries: Vec<MenuEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub target: Format,
    /// "to PDF"
    pub label: String,
    /// Registry key name, e.g. `LiteSwitch_to_pdf`.
    pub verb: String,
    /// Command line with [`FILE_PLACEHOLDER`] standing in for the file.
    pub command: Vec<String>,
}

/// One group per source format, sorted by source; entries in registry order.
pub fn menu_entries(registry: &Registry, program: &str) -> Vec<MenuGroup> {
    registry
        .sources()
        .filter_map(|source| {
            let targets = registry.lookup(source)?;
            let entries = targets
                .into_iter()
                .map(|target| MenuEntry {
                    label: format!("to {}", target.label()),
                    verb: format!("LiteSwitch_to_{}", target.as_str()),
                    command: vec![
                        program.to_string(),
                        FILE_PLACEHOLDER.to_string(),
                        "--to".to_string(),
                        target.as_str().to_string(),
                    ],
                    target,
                })
                .collect();
            Some(MenuGroup {
                source: source.clone(),
                title: MENU_TITLE.to_string(),
                entries,
            })
        })
        .collect()
}
