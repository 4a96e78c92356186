//! Menu declarations in front matter and the entries they produce.
//!
//! The `menu` key accepts three shapes:
//!
//! ```yaml
//! menu: main
//! menu: [main, footer]
//! menu:
//!   main:
//!     weight: 10
//!     parent: docs
//!   footer: ~
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::value::{self, FrontMatter};

/// Descendant levels searched by [`has_descendant`]
pub const MAX_MENU_DEPTH: usize = 64;

/// A page's menu entries keyed by menu name
pub type PageMenus = BTreeMap<String, MenuEntry>;

/// The normalized `menu` front-matter value
#[derive(Debug, Clone, PartialEq)]
pub enum MenuDecl {
    Single(String),
    List(Vec<String>),
    /// Menu name to optional field overrides
    Entries(BTreeMap<String, Option<FrontMatter>>),
}

impl MenuDecl {
    /// Classify a raw `menu` value; `None` for shapes that name no menu
    pub fn from_value(value: &Value) -> Option<MenuDecl> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                Some(MenuDecl::Single(value::to_string(value)))
            }
            Value::Array(_) => value::try_to_string_list(value).map(MenuDecl::List),
            Value::Object(map) => {
                let entries = map
                    .iter()
                    .map(|(name, entry)| {
                        let overrides = match entry {
                            Value::Object(fields) => Some(fields.clone()),
                            Value::Null => None,
                            other => {
                                tracing::error!(menu = %name, value = %other, "Menu entry is not a map, using defaults");
                                None
                            }
                        };
                        (name.clone(), overrides)
                    })
                    .collect();
                Some(MenuDecl::Entries(entries))
            }
            Value::Null => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MenuEntry {
    pub url: String,
    pub name: String,
    pub menu: String,
    pub identifier: String,
    pub pre: String,
    pub post: String,
    pub weight: i64,
    pub parent: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    /// Two entries point at the same thing when URL and name agree
    pub fn is_equal(&self, other: &MenuEntry) -> bool {
        self.url == other.url && self.name == other.name
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Apply structured overrides; keys are matched ignoring case
    fn apply(&mut self, overrides: &FrontMatter) {
        for (key, value) in overrides {
            match key.to_lowercase().as_str() {
                "url" => self.url = value::to_string(value),
                "name" => self.name = value::to_string(value),
                "weight" => self.weight = value::to_int(value),
                "identifier" => self.identifier = value::to_string(value),
                "pre" => self.pre = value::to_string(value),
                "post" => self.post = value::to_string(value),
                "parent" => self.parent = value::to_string(value),
                _ => {}
            }
        }
    }
}

/// Build one entry per declared menu, starting each from `defaults`
pub fn build_page_menus(decl: &MenuDecl, defaults: &MenuEntry) -> PageMenus {
    let entry_for = |menu: &str| MenuEntry {
        menu: menu.to_string(),
        ..defaults.clone()
    };

    match decl {
        MenuDecl::Single(name) => PageMenus::from([(name.clone(), entry_for(name))]),
        MenuDecl::List(names) => names
            .iter()
            .map(|name| (name.clone(), entry_for(name)))
            .collect(),
        MenuDecl::Entries(entries) => entries
            .iter()
            .map(|(name, overrides)| {
                let mut entry = entry_for(name);
                if let Some(overrides) = overrides {
                    entry.apply(overrides);
                }
                (name.clone(), entry)
            })
            .collect(),
    }
}

/// Whether `target` is among the descendants of `entry`, searching at most
/// [`MAX_MENU_DEPTH`] levels down
pub fn has_descendant(entry: &MenuEntry, target: &MenuEntry) -> bool {
    let mut stack: Vec<(&MenuEntry, usize)> = entry.children.iter().map(|c| (c, 1)).collect();
    while let Some((child, depth)) = stack.pop() {
        if child.is_equal(target) {
            return true;
        }
        if depth < MAX_MENU_DEPTH {
            stack.extend(child.children.iter().map(|c| (c, depth + 1)));
        }
    }
    false
}
