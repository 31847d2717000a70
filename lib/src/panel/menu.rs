use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::app::App;
use crate::computed::Computed;
use crate::dict;
use crate::error::Result;
use crate::value::{Dict, Value};

use super::area::{Area, Areas, CurrentFn, CurrentSetting, MenuState, Permissions};

/// How separators are written in `panel.menu` and serialized in the menu.
pub const SEPARATOR: &str = "-";

/// Areas listed first by default, in this order, when registered.
const DEFAULT_AREAS: &[&str] = &["site", "languages", "users", "system"];

/// A menu line: a separator or an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuItem<T = MenuEntry> {
    Separator,
    Entry(T),
}

impl<T: Serialize> Serialize for MenuItem<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MenuItem::Separator => serializer.serialize_str(SEPARATOR),
            MenuItem::Entry(entry) => entry.serialize(serializer),
        }
    }
}

/// A rendered menu entry. Unset and falsy keys are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MenuEntry {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawer: Option<Arc<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Arc<str>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(flatten)]
    pub extra: Dict,
}

impl MenuEntry {
    /// Overwrites keys with those in `overrides`. Unknown keys are kept as
    /// extras.
    pub fn apply(&mut self, overrides: &Dict) {
        for (key, value) in overrides {
            let text = || value.as_str().map(Arc::from);
            match &**key {
                "current" => self.current = value.is_truthy(),
                "disabled" => self.disabled = value.is_truthy(),
                "icon" => self.icon = text(),
                "link" => self.link = text(),
                "dialog" => self.dialog = text(),
                "drawer" => self.drawer = text(),
                "text" => self.text = text(),
                _ => { self.extra.insert(key.clone(), value.clone()); }
            }
        }
    }

    /// Drops every falsy key.
    fn compact(mut self) -> Self {
        for key in [&mut self.icon, &mut self.link, &mut self.dialog, &mut self.drawer, &mut self.text] {
            if key.as_deref().map_or(false, str::is_empty) {
                *key = None;
            }
        }

        self.extra.retain(|_, value| value.is_truthy());
        self
    }
}

/// One item of the `panel.menu` option.
#[derive(Debug, Clone)]
pub enum MenuConfig {
    Separator,
    Area(Arc<str>),
    Custom(Area),
}

impl MenuConfig {
    /// Parses a `panel.menu` item: `"-"`, an area id, or a table with an `id`
    /// and any area keys. Anything else is `None`.
    pub fn parse(value: &Value) -> Option<MenuConfig> {
        match value {
            Value::String(s) if &**s == SEPARATOR => Some(MenuConfig::Separator),
            Value::String(id) => Some(MenuConfig::Area(id.clone())),
            Value::Dict(_) => value.deserialize_into::<Area>()
                .map_err(|e| tracing::debug!("ignoring invalid custom menu entry:\n{e}"))
                .ok()
                .map(MenuConfig::Custom),
            _ => None,
        }
    }
}

/// Builds the panel's main menu for one request.
///
/// ```rust
/// use atrium::app::{App, Request, Settings};
/// use atrium::panel::{Area, Areas, Menu, MenuItem, MenuState, Permissions};
///
/// let app = App::new(Settings::default(), Request::new("/panel/site"));
/// let areas: Areas = [
///     Area::new("site").label("Site").icon("home").link("site").menu(MenuState::Visible),
///     Area::new("users").label("Users").icon("users").link("users").menu(MenuState::Visible),
/// ].into_iter().collect();
///
/// let permissions = Permissions::default();
/// let menu = Menu::new(&app, &areas, &permissions, Some("site"));
/// let entries = menu.entries().unwrap();
///
/// let MenuItem::Entry(site) = &entries[0] else { panic!("expected an entry") };
/// assert!(site.current);
/// assert_eq!(site.text.as_deref(), Some("Site"));
/// assert_eq!(entries[2], MenuItem::Separator);
/// assert_eq!(entries.len(), 6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Menu<'a> {
    app: &'a App,
    areas: &'a Areas,
    permissions: &'a Permissions,
    current: Option<&'a str>,
}

impl<'a> Menu<'a> {
    pub fn new(
        app: &'a App,
        areas: &'a Areas,
        permissions: &'a Permissions,
        current: Option<&'a str>,
    ) -> Self {
        Menu { app, areas, permissions, current }
    }

    /// The areas in menu order, as configured by `panel.menu`.
    pub fn areas(&self) -> Result<Vec<MenuItem<Area>>> {
        let config = match self.app.option("panel.menu") {
            None | Some(Value::Null) => self.default_config(),
            Some(Value::Array(items)) => items.iter()
                .filter_map(|item| {
                    let config = MenuConfig::parse(item);
                    if config.is_none() {
                        tracing::debug!(kind = item.kind(), "dropping panel.menu item");
                    }

                    config
                })
                .collect(),
            Some(other) => return err! {
                "invalid panel.menu option",
                "expected" => "a list of areas, separators, and custom entries",
                "found" => other.kind(),
            },
        };

        Ok(self.custom_entries(config))
    }

    fn default_config(&self) -> Vec<MenuConfig> {
        let rest = self.areas.ids().filter(|id| !DEFAULT_AREAS.contains(id));
        DEFAULT_AREAS.iter()
            .copied()
            .chain(rest)
            .map(|id| MenuConfig::Area(id.into()))
            .collect()
    }

    /// Resolves configured menu items against the registered areas.
    pub fn custom_entries(&self, config: Vec<MenuConfig>) -> Vec<MenuItem<Area>> {
        config.into_iter()
            .filter_map(|item| match item {
                MenuConfig::Separator => Some(MenuItem::Separator),
                MenuConfig::Area(id) => match self.areas.get(&id) {
                    Some(area) => Some(MenuItem::Entry(area.clone())),
                    None => {
                        tracing::debug!(%id, "dropping unknown menu area");
                        None
                    }
                },
                MenuConfig::Custom(mut custom) => {
                    if custom.current.is_none() {
                        if let Some(link) = custom.link.clone() {
                            let path: Arc<str> = self.app.request().path().into();
                            let current: Arc<CurrentFn> = Arc::new(move |_: Option<&str>| path.contains(&*link));
                            custom.current = Some(Computed::Callback(current));
                        }
                    }

                    let mut area = self.areas.get(&custom.id)
                        .cloned()
                        .unwrap_or_else(|| Area::new(custom.id.clone()));

                    area.menu = Some(MenuState::Visible.into());
                    area.overlay(custom);
                    Some(MenuItem::Entry(area))
                }
            })
            .collect()
    }

    /// The menu entry for `area`, or `None` if it is not shown.
    pub fn entry(&self, area: &Area) -> Option<MenuEntry> {
        if !self.has_permission(&area.id) {
            tracing::trace!(id = %area.id, "menu area denied");
            return None;
        }

        let state = match &area.menu {
            Some(menu) => menu.resolve_with(|f| f(self.areas, self.permissions, self.current)),
            None => MenuState::Hidden,
        };

        let overrides = match state {
            MenuState::Hidden => return None,
            MenuState::Visible => Dict::new(),
            MenuState::Disabled => dict! { "disabled" => true },
            MenuState::Override(overrides) => overrides,
        };

        let mut entry = MenuEntry {
            current: self.is_current(&area.id, area.current.as_ref()),
            icon: area.icon.clone(),
            link: area.link.clone(),
            dialog: area.dialog.clone(),
            drawer: area.drawer.clone(),
            text: area.label.as_deref().map(|label| self.app.translate(label).into()),
            ..MenuEntry::default()
        };

        entry.apply(&overrides);
        // Any dialog or drawer, even an empty one, replaces the link.
        if entry.dialog.is_some() || entry.drawer.is_some() {
            entry.link = None;
        }

        Some(entry.compact())
    }

    /// The full menu: area entries, a separator, then the account options.
    pub fn entries(&self) -> Result<Vec<MenuItem>> {
        let mut entries: Vec<MenuItem> = self.areas()?
            .into_iter()
            .filter_map(|item| match item {
                MenuItem::Separator => Some(MenuItem::Separator),
                MenuItem::Entry(area) => self.entry(&area).map(MenuItem::Entry),
            })
            .collect();

        entries.push(MenuItem::Separator);
        entries.extend(self.options().into_iter().map(MenuItem::Entry));
        Ok(entries)
    }

    /// Whether the user may access `id`. Access is granted unless explicitly
    /// denied.
    pub fn has_permission(&self, id: &str) -> bool {
        self.permissions.access(id).unwrap_or(true)
    }

    pub fn is_current(&self, id: &str, current: Option<&CurrentSetting>) -> bool {
        match current {
            Some(current) => current.resolve_with(|f| f(self.current)),
            None => self.current == Some(id),
        }
    }

    /// The fixed entries closing the menu.
    pub fn options(&self) -> Vec<MenuEntry> {
        let text = |key: &str| Some(Arc::from(self.app.translate(key)));
        vec![
            MenuEntry {
                icon: Some("edit-line".into()),
                dialog: Some("changes".into()),
                text: text("changes"),
                ..MenuEntry::default()
            },
            MenuEntry {
                current: self.is_current("account", None),
                icon: Some("account".into()),
                link: Some("account".into()),
                disabled: !self.has_permission("account"),
                text: text("view.account"),
                ..MenuEntry::default()
            },
            MenuEntry {
                icon: Some("logout".into()),
                link: Some("logout".into()),
                text: text("logout"),
                ..MenuEntry::default()
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Request, Settings};

    fn app(url: &str) -> App {
        App::new(Settings::default(), Request::new(url))
    }

    fn registry() -> Areas {
        [
            Area::new("site").label("Site").icon("home").link("site").menu(MenuState::Visible),
            Area::new("system").label("System").icon("settings").link("system").menu(MenuState::Visible),
            Area::new("users").label("Users").icon("users").link("users").menu(MenuState::Visible),
            Area::new("hidden").label("Hidden").link("hidden"),
            Area::new("stats").label("Stats").link("stats").menu(MenuState::Disabled),
        ].into_iter().collect()
    }

    fn ids(items: &[MenuItem<Area>]) -> Vec<&str> {
        items.iter()
            .map(|item| match item {
                MenuItem::Separator => SEPARATOR,
                MenuItem::Entry(area) => &*area.id,
            })
            .collect()
    }

    fn entry(items: &[MenuItem], i: usize) -> &MenuEntry {
        match &items[i] {
            MenuItem::Entry(entry) => entry,
            MenuItem::Separator => panic!("item {i} is a separator"),
        }
    }

    #[test]
    fn default_order() {
        let (app, areas, permissions) = (app("/panel"), registry(), Permissions::default());
        let menu = Menu::new(&app, &areas, &permissions, None);
        assert_eq!(ids(&menu.areas().unwrap()), ["site", "users", "system", "hidden", "stats"]);

        let entries = menu.entries().unwrap();
        let texts: Vec<_> = entries.iter()
            .map(|item| match item {
                MenuItem::Separator => SEPARATOR,
                MenuItem::Entry(e) => e.text.as_deref().unwrap_or_default(),
            })
            .collect();

        assert_eq!(texts, ["Site", "Users", "System", "Stats", "-", "Changes", "Your account", "Log out"]);
        assert!(entry(&entries, 3).disabled);
    }

    #[test]
    fn configured_menu() {
        let mut app = app("/panel/pages/notes");
        app.set_option("panel.menu", vec![
            Value::from("users"),
            Value::from("-"),
            Value::from("nope"),
            Value::from(42u8),
            Value::from(dict! { "label" => "no id" }),
            Value::from(dict! { "id" => "notes", "label" => "Notes", "link" => "pages/notes" }),
            Value::from(dict! { "id" => "site", "icon" => "globe" }),
        ]);

        let (areas, permissions) = (registry(), Permissions::default());
        let menu = Menu::new(&app, &areas, &permissions, Some("site"));
        assert_eq!(ids(&menu.areas().unwrap()), ["users", "-", "notes", "site"]);

        let entries = menu.entries().unwrap();
        let notes = entry(&entries, 2);
        assert!(notes.current);
        assert_eq!(notes.link.as_deref(), Some("pages/notes"));

        let site = entry(&entries, 3);
        assert!(site.current);
        assert_eq!(site.icon.as_deref(), Some("globe"));
        assert_eq!(site.text.as_deref(), Some("Site"));

        assert_eq!(entries.len(), 8);
        assert_eq!(entries[4], MenuItem::Separator);
        assert_eq!(entry(&entries, 5).dialog.as_deref(), Some("changes"));
        assert_eq!(entry(&entries, 6).link.as_deref(), Some("account"));
        assert_eq!(entry(&entries, 7).link.as_deref(), Some("logout"));
    }

    #[test]
    fn invalid_menu_option() {
        let mut app = app("/panel");
        app.set_option("panel.menu", "site");
        let (areas, permissions) = (registry(), Permissions::default());
        let error = Menu::new(&app, &areas, &permissions, None).areas().unwrap_err();
        assert_eq!(error.message(), "invalid panel.menu option");
    }

    #[test]
    fn computed_menu_option() {
        let mut app = app("/panel");
        app.set_option_with("panel.menu", |_| Value::from(vec!["system", "site"]));
        let (areas, permissions) = (registry(), Permissions::default());
        let menu = Menu::new(&app, &areas, &permissions, None);
        assert_eq!(ids(&menu.areas().unwrap()), ["system", "site"]);
    }

    #[test]
    fn permissions_default_to_granted() {
        let (app, areas) = (app("/panel"), registry());
        let mut permissions = Permissions::default();
        permissions.set_access("users", false).set_access("account", false);

        let menu = Menu::new(&app, &areas, &permissions, None);
        assert!(menu.has_permission("site"));
        assert!(!menu.has_permission("users"));
        assert!(menu.entry(areas.get("users").unwrap()).is_none());
        assert!(menu.entry(areas.get("site").unwrap()).is_some());
        assert!(menu.options()[1].disabled);
    }

    #[test]
    fn menu_states() {
        let (app, permissions) = (app("/panel"), Permissions::default());
        let areas = registry();
        let menu = Menu::new(&app, &areas, &permissions, None);

        assert!(menu.entry(areas.get("hidden").unwrap()).is_none());
        assert!(menu.entry(&Area::new("x").menu(MenuState::Hidden)).is_none());
        assert!(menu.entry(areas.get("stats").unwrap()).unwrap().disabled);

        let computed = Area::new("x").link("x").menu_with(|areas, _, current| {
            match current.is_none() && areas.get("site").is_some() {
                true => MenuState::Override(dict! { "badge" => 3u8, "empty" => "" }),
                false => MenuState::Hidden,
            }
        });

        let entry = menu.entry(&computed).unwrap();
        assert_eq!(entry.extra, dict! { "badge" => 3u8 });
        assert_eq!(entry.link.as_deref(), Some("x"));
    }

    #[test]
    fn overlays_replace_links() {
        let (app, areas, permissions) = (app("/panel"), registry(), Permissions::default());
        let menu = Menu::new(&app, &areas, &permissions, None);

        let dialog = Area::new("license").link("license").dialog("registration").menu(MenuState::Visible);
        let entry = menu.entry(&dialog).unwrap();
        assert_eq!(entry.link, None);
        assert_eq!(entry.dialog.as_deref(), Some("registration"));

        let drawer = Area::new("help").link("help").menu(MenuState::Override(dict! { "drawer" => "help" }));
        assert_eq!(menu.entry(&drawer).unwrap().link, None);

        let empty = Area::new("empty").link("empty").menu(MenuState::Override(dict! { "dialog" => "" }));
        let entry = menu.entry(&empty).unwrap();
        assert_eq!((entry.link, entry.dialog), (None, None));

        let unset = Area::new("unset").link("unset").dialog("x").menu(MenuState::Override(dict! { "dialog" => () }));
        assert_eq!(menu.entry(&unset).unwrap().link.as_deref(), Some("unset"));
    }

    #[test]
    fn current_areas() {
        let (app, areas, permissions) = (app("/panel"), registry(), Permissions::default());
        let menu = Menu::new(&app, &areas, &permissions, Some("users"));

        assert!(menu.is_current("users", None));
        assert!(!menu.is_current("site", None));

        let always: Arc<CurrentFn> = Arc::new(|_: Option<&str>| true);
        let always: CurrentSetting = Computed::Callback(always);
        assert!(menu.is_current("site", Some(&always)));
        assert!(!menu.is_current("users", Some(&Computed::Value(false))));
    }

    #[test]
    fn serialized_entries_omit_falsy_keys() {
        let (app, areas, permissions) = (app("/panel"), registry(), Permissions::default());
        let menu = Menu::new(&app, &areas, &permissions, Some("site"));
        let json = serde_json::to_value(menu.entries().unwrap()).unwrap();

        assert_eq!(json[0], serde_json::json!({
            "current": true,
            "icon": "home",
            "link": "site",
            "text": "Site",
        }));

        assert_eq!(json[4], serde_json::json!("-"));
        assert_eq!(json[5], serde_json::json!({
            "icon": "edit-line",
            "dialog": "changes",
            "text": "Changes",
        }));
    }
}
