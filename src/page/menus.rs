use tracing::warn;

use super::Page;
use crate::menu::{MenuEntry, PageMenus, build_page_menus, has_descendant};

impl Page {
    /// Menu entries declared by this page, keyed by menu name
    pub fn menus(&self) -> &PageMenus {
        self.menus.get_or_init(|| {
            let Some(decl) = &self.menu_decl else {
                return PageMenus::new();
            };

            let url = self.rel_permalink().unwrap_or_else(|e| {
                warn!(file = %self.source.path(), error = %e, "Menu entries have no URL");
                String::new()
            });
            let defaults = MenuEntry {
                name: self.link_title().to_string(),
                weight: self.weight,
                url,
                ..Default::default()
            };
            build_page_menus(decl, &defaults)
        })
    }

    /// Whether `entry` is this page's own entry in `menu`
    pub fn is_menu_current(&self, menu: &str, entry: &MenuEntry) -> bool {
        self.menus().get(menu).is_some_and(|own| own.is_equal(entry))
    }

    /// Whether this page lives somewhere below `entry` in `menu`.
    ///
    /// Pages without an entry of their own in the section pages menu belong
    /// to the entry whose identifier is their section.
    pub fn has_menu_current(&self, menu: &str, entry: &MenuEntry) -> bool {
        let own = self.menus().get(menu);

        let section_menu = &self.site.build().section_pages_menu;
        if own.is_none()
            && !section_menu.is_empty()
            && section_menu == menu
            && !self.section().is_empty()
            && self.section() == entry.identifier
        {
            return true;
        }

        match own {
            Some(own) if entry.has_children() => has_descendant(entry, own),
            _ => false,
        }
    }
}
