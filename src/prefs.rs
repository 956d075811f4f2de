//! User preferences and theme resolution
//!
//! Preferences are a read-only key-value view. The viewer reads them from the
//! request's cookies, the CLI from the config file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Preference key holding the theme name
pub const THEME_KEY: &str = "theme";

/// Read-only key-value preference store
pub trait Preferences {
    fn get(&self, key: &str) -> Option<String>;
}

impl Preferences for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// No stored preferences
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreferences;

impl Preferences for NoPreferences {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Preferences parsed from an HTTP `Cookie` header
#[derive(Debug, Clone, Default)]
pub struct CookiePreferences {
    cookies: HashMap<String, String>,
}

impl CookiePreferences {
    /// Parse `name=value; name2=value2`
    pub fn parse(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().trim_matches('"').to_string()))
            })
            .collect();
        Self { cookies }
    }
}

impl Preferences for CookiePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.cookies.get(key).cloned()
    }
}

/// Tree widget theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "default-dark")]
    DefaultDark,
}

impl Theme {
    /// `"night"` selects the dark variant, anything else the default one
    pub fn from_preference(value: Option<&str>) -> Self {
        match value {
            Some("night") => Theme::DefaultDark,
            _ => Theme::Default,
        }
    }

    pub fn resolve(prefs: &dyn Preferences) -> Self {
        Self::from_preference(prefs.get(THEME_KEY).as_deref())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::DefaultDark => "default-dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::DefaultDark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_preference() {
        assert_eq!(Theme::from_preference(Some("night")), Theme::DefaultDark);
        assert_eq!(Theme::from_preference(Some("day")), Theme::Default);
        assert_eq!(Theme::from_preference(Some("Night")), Theme::Default);
        assert_eq!(Theme::from_preference(None), Theme::Default);
    }

    #[test]
    fn test_theme_names() {
        assert_eq!(Theme::Default.name(), "default");
        assert_eq!(Theme::DefaultDark.name(), "default-dark");
        assert_eq!(serde_json::to_string(&Theme::DefaultDark).unwrap(), "\"default-dark\"");
    }

    #[test]
    fn test_cookie_parsing() {
        let prefs = CookiePreferences::parse("session=abc; theme=night ;csrftoken=\"x=y\"");
        assert_eq!(prefs.get("theme").as_deref(), Some("night"));
        assert_eq!(prefs.get("session").as_deref(), Some("abc"));
        assert_eq!(prefs.get("csrftoken").as_deref(), Some("x=y"));
        assert_eq!(Theme::resolve(&prefs), Theme::DefaultDark);
    }

    #[test]
    fn test_cookie_parsing_tolerates_garbage() {
        let prefs = CookiePreferences::parse(";;=novalue; flag; theme=");
        assert_eq!(prefs.get("theme").as_deref(), Some(""));
        assert_eq!(prefs.get("flag"), None);
        assert_eq!(Theme::resolve(&prefs), Theme::Default);
    }

    #[test]
    fn test_map_and_empty_preferences() {
        let mut map = HashMap::new();
        map.insert(THEME_KEY.to_string(), "night".to_string());
        assert_eq!(Theme::resolve(&map), Theme::DefaultDark);
        assert_eq!(Theme::resolve(&NoPreferences), Theme::Default);
    }
}
