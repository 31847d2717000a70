use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::computed::Computed;
use crate::value::{Dict, Value};

/// Computes an area's menu state from the registry, the permissions, and the
/// current area id.
pub type MenuFn = dyn Fn(&Areas, &Permissions, Option<&str>) -> MenuState + Send + Sync;

/// Decides whether an area is current given the current area id.
pub type CurrentFn = dyn Fn(Option<&str>) -> bool + Send + Sync;

pub type MenuSetting = Computed<MenuState, MenuFn>;
pub type CurrentSetting = Computed<bool, CurrentFn>;

/// How an area shows up in the menu.
///
/// In configuration: `false`, `true`, `"disabled"`, or a table of entry keys
/// to override.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum MenuState {
    Hidden,
    Visible,
    Disabled,
    Override(Dict),
}

impl TryFrom<Value> for MenuState {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(false) => Ok(MenuState::Hidden),
            Value::Bool(true) => Ok(MenuState::Visible),
            Value::String(s) if &*s == "disabled" => Ok(MenuState::Disabled),
            Value::Dict(dict) => Ok(MenuState::Override((*dict).clone())),
            other => Err(format!("invalid menu setting of type {}", other.kind())),
        }
    }
}

/// A section of the panel, as registered by the host or declared in the
/// `panel.menu` option.
#[derive(Debug, Clone, Deserialize)]
pub struct Area {
    pub id: Arc<str>,
    #[serde(default)]
    pub label: Option<Arc<str>>,
    #[serde(default)]
    pub icon: Option<Arc<str>>,
    #[serde(default)]
    pub link: Option<Arc<str>>,
    #[serde(default)]
    pub dialog: Option<Arc<str>>,
    #[serde(default)]
    pub drawer: Option<Arc<str>>,
    #[serde(default)]
    pub menu: Option<MenuSetting>,
    #[serde(default)]
    pub current: Option<CurrentSetting>,
}

impl Area {
    pub fn new<I: Into<Arc<str>>>(id: I) -> Area {
        Area {
            id: id.into(),
            label: None,
            icon: None,
            link: None,
            dialog: None,
            drawer: None,
            menu: None,
            current: None,
        }
    }

    pub fn label<S: Into<Arc<str>>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn icon<S: Into<Arc<str>>>(mut self, icon: S) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn link<S: Into<Arc<str>>>(mut self, link: S) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn dialog<S: Into<Arc<str>>>(mut self, dialog: S) -> Self {
        self.dialog = Some(dialog.into());
        self
    }

    pub fn drawer<S: Into<Arc<str>>>(mut self, drawer: S) -> Self {
        self.drawer = Some(drawer.into());
        self
    }

    pub fn menu(mut self, state: MenuState) -> Self {
        self.menu = Some(Computed::Value(state));
        self
    }

    pub fn menu_with<F>(mut self, f: F) -> Self
        where F: Fn(&Areas, &Permissions, Option<&str>) -> MenuState + Send + Sync + 'static
    {
        let f: Arc<MenuFn> = Arc::new(f);
        self.menu = Some(Computed::Callback(f));
        self
    }

    pub fn current(mut self, current: bool) -> Self {
        self.current = Some(Computed::Value(current));
        self
    }

    pub fn current_with<F>(mut self, f: F) -> Self
        where F: Fn(Option<&str>) -> bool + Send + Sync + 'static
    {
        let f: Arc<CurrentFn> = Arc::new(f);
        self.current = Some(Computed::Callback(f));
        self
    }

    /// Overwrites every key of `self` that `other` sets, including `id`.
    pub fn overlay(&mut self, other: Area) {
        macro_rules! take {
            ($($field:ident),*) => ($(
                if other.$field.is_some() {
                    self.$field = other.$field;
                }
            )*)
        }

        self.id = other.id;
        take!(label, icon, link, dialog, drawer, menu, current);
    }
}

/// The host's registered areas, in registration order.
#[derive(Debug, Clone, Default, Deserialize, derive_more::Deref)]
#[serde(transparent)]
pub struct Areas(Vec<Area>);

impl Areas {
    pub fn new() -> Self {
        Areas::default()
    }

    /// Registers `area`, replacing any area with the same id in place.
    pub fn register(&mut self, area: Area) {
        match self.0.iter_mut().find(|a| a.id == area.id) {
            Some(existing) => *existing = area,
            None => self.0.push(area),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Area> {
        self.0.iter().find(|area| &*area.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|area| &*area.id)
    }
}

impl FromIterator<Area> for Areas {
    fn from_iter<T: IntoIterator<Item = Area>>(iter: T) -> Self {
        let mut areas = Areas::new();
        iter.into_iter().for_each(|area| areas.register(area));
        areas
    }
}

/// What the current user may do, as far as the menu is concerned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub access: FxHashMap<Arc<str>, bool>,
}

impl Permissions {
    /// Whether access to `id` was explicitly granted or denied.
    pub fn access(&self, id: &str) -> Option<bool> {
        self.access.get(id).copied()
    }

    pub fn set_access<I: Into<Arc<str>>>(&mut self, id: I, allowed: bool) -> &mut Self {
        self.access.insert(id.into(), allowed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict;
    use crate::value::{Format, Toml};

    #[test]
    fn menu_states_from_values() {
        assert_eq!(MenuState::try_from(Value::from(false)), Ok(MenuState::Hidden));
        assert_eq!(MenuState::try_from(Value::from(true)), Ok(MenuState::Visible));
        assert_eq!(MenuState::try_from(Value::from("disabled")), Ok(MenuState::Disabled));

        let dict = dict! { "badge" => 3u8 };
        assert_eq!(MenuState::try_from(Value::from(dict.clone())), Ok(MenuState::Override(dict)));
        assert!(MenuState::try_from(Value::from("shown")).is_err());
    }

    #[test]
    fn areas_from_toml() {
        #[derive(Deserialize)]
        struct Config { areas: Areas, permissions: Permissions }

        let config: Config = Toml::read(String::from(r#"
            [[areas]]
            id = "site"
            label = "Site"
            icon = "home"
            link = "site"
            menu = true

            [[areas]]
            id = "system"
            label = "System"
            menu = "disabled"

            [permissions.access]
            users = false
        "#)).unwrap();

        let site = config.areas.get("site").unwrap();
        assert_eq!(site.icon.as_deref(), Some("home"));
        assert_eq!(site.menu.as_ref().and_then(|m| m.as_value()), Some(&MenuState::Visible));

        let system = config.areas.get("system").unwrap();
        assert_eq!(system.menu.as_ref().and_then(|m| m.as_value()), Some(&MenuState::Disabled));
        assert!(system.current.is_none());

        assert_eq!(config.areas.ids().collect::<Vec<_>>(), ["site", "system"]);
        assert_eq!(config.permissions.access("users"), Some(false));
        assert_eq!(config.permissions.access("site"), None);
    }

    #[test]
    fn overlay_keeps_unset_keys() {
        let mut area = Area::new("site").label("Site").icon("home").link("site");
        area.overlay(Area::new("site").icon("globe").dialog("site/settings"));

        assert_eq!(area.label.as_deref(), Some("Site"));
        assert_eq!(area.icon.as_deref(), Some("globe"));
        assert_eq!(area.link.as_deref(), Some("site"));
        assert_eq!(area.dialog.as_deref(), Some("site/settings"));
    }

    #[test]
    fn registering_replaces_in_place() {
        let mut areas: Areas = [Area::new("site"), Area::new("users")].into_iter().collect();
        areas.register(Area::new("site").label("Home"));
        areas.register(Area::new("system"));

        assert_eq!(areas.ids().collect::<Vec<_>>(), ["site", "users", "system"]);
        assert_eq!(areas[0].label.as_deref(), Some("Home"));
    }
}
