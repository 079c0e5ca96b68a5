//! Theme selection and color token resolution.
//!
//! Colors are never hard-coded in chart configs: every render asks the
//! current [`PresentationContext`] for its tokens, which come from the CSS
//! custom properties of the dashboard stylesheet for the active theme.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const THEME_STORAGE_KEY: &str = "theme";

const THEME_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Semantic colors used by the chart renderers. Unresolved tokens are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeTokens {
    pub primary: String,
    pub danger: String,
    pub warning: String,
    pub success: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub border: String,
    pub surface: String,
}

/// Custom properties declared by the dashboard stylesheet, split into the
/// `:root` defaults and the `[data-theme="dark"]` overrides.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    root: BTreeMap<String, String>,
    dark: BTreeMap<String, String>,
}

impl Stylesheet {
    pub fn parse(css: &str) -> Self {
        let sheet = Self {
            root: custom_properties(css, ":root"),
            dark: custom_properties(css, "[data-theme=\"dark\"]"),
        };
        debug!(
            root = sheet.root.len(),
            dark = sheet.dark.len(),
            "parsed stylesheet custom properties"
        );
        sheet
    }

    fn property(&self, theme: Theme, name: &str) -> &str {
        let overridden = match theme {
            Theme::Dark => self.dark.get(name),
            Theme::Light => None,
        };
        overridden
            .or_else(|| self.root.get(name))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn custom_properties(css: &str, selector: &str) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();
    let mut rest = css;

    while let Some(start) = rest.find(selector) {
        let after = &rest[start + selector.len()..];
        let Some(open) = after.find('{') else { break };
        if !after[..open].trim().is_empty() {
            rest = after;
            continue;
        }
        let body = &after[open + 1..];
        let Some(close) = body.find('}') else { break };

        for declaration in body[..close].split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                if let Some(name) = name.trim().strip_prefix("--") {
                    props.insert(name.to_string(), value.trim().to_string());
                }
            }
        }
        rest = &body[close + 1..];
    }

    props
}

/// The theme attribute plus the stylesheet it selects colors from.
#[derive(Debug, Clone)]
pub struct PresentationContext {
    theme: Theme,
    stylesheet: Arc<Stylesheet>,
}

impl PresentationContext {
    pub fn new(theme: Theme, stylesheet: Arc<Stylesheet>) -> Self {
        Self { theme, stylesheet }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn color_tokens(&self) -> ThemeTokens {
        let get = |name: &str| self.stylesheet.property(self.theme, name).to_string();
        ThemeTokens {
            primary: get("color-primary"),
            danger: get("color-danger"),
            warning: get("color-warning"),
            success: get("color-success"),
            text_primary: get("color-text-primary"),
            text_secondary: get("color-text-secondary"),
            border: get("color-border"),
            surface: get("color-surface"),
        }
    }
}

/// Key-value storage for user preferences that outlive a page load.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Preferences carried in the request `Cookie` header. Writes are collected
/// and turned into `Set-Cookie` values for the response.
#[derive(Debug, Clone, Default)]
pub struct CookiePreferences {
    values: BTreeMap<String, String>,
    pending: BTreeMap<String, String>,
}

impl CookiePreferences {
    pub fn parse(header: &str) -> Self {
        let values = header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self {
            values,
            pending: BTreeMap::new(),
        }
    }

    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|(name, value)| {
                format!("{name}={value}; Path=/; Max-Age={THEME_COOKIE_MAX_AGE}; SameSite=Lax")
            })
            .collect()
    }
}

impl PreferenceStore for CookiePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.pending.get(key).or_else(|| self.values.get(key)).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.pending.insert(key.to_string(), value.to_string());
    }
}

/// Emitted whenever the active theme is applied; consumers re-render after
/// swapping their presentation context to `theme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChanged {
    pub theme: Theme,
}

pub struct ThemeController<S> {
    store: S,
    current: Theme,
}

impl<S: PreferenceStore> ThemeController<S> {
    /// Picks the persisted theme, falling back to the system preference.
    pub fn init(store: S, system_prefers_dark: bool) -> Self {
        let current = store
            .get(THEME_STORAGE_KEY)
            .and_then(|value| Theme::parse(&value))
            .unwrap_or(if system_prefers_dark {
                Theme::Dark
            } else {
                Theme::Light
            });
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn apply(&mut self, theme: Theme) -> ThemeChanged {
        self.current = theme;
        self.store.set(THEME_STORAGE_KEY, theme.as_str());
        debug!(theme = theme.as_str(), "theme applied");
        ThemeChanged { theme }
    }

    pub fn toggle(&mut self) -> ThemeChanged {
        self.apply(self.current.toggled())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSS: &str = r#"
        :root {
          --color-primary: #1a73e8;
          --color-danger: #d93025;
          --color-surface: #ffffff;
        }
        body { color: var(--color-primary); }
        [data-theme="dark"] {
          --color-primary: #8ab4f8;
          --color-surface: #202124;
        }
    "#;

    fn context(theme: Theme) -> PresentationContext {
        PresentationContext::new(theme, Arc::new(Stylesheet::parse(CSS)))
    }

    #[test]
    fn light_theme_reads_root_properties() {
        let tokens = context(Theme::Light).color_tokens();
        assert_eq!(tokens.primary, "#1a73e8");
        assert_eq!(tokens.surface, "#ffffff");
        assert_eq!(tokens.danger, "#d93025");
    }

    #[test]
    fn dark_theme_overrides_and_falls_back_to_root() {
        let tokens = context(Theme::Dark).color_tokens();
        assert_eq!(tokens.primary, "#8ab4f8");
        assert_eq!(tokens.surface, "#202124");
        assert_eq!(tokens.danger, "#d93025");
    }

    #[test]
    fn missing_properties_resolve_empty() {
        let tokens = context(Theme::Dark).color_tokens();
        assert_eq!(tokens.warning, "");
        assert_eq!(tokens.text_secondary, "");
    }

    #[test]
    fn tokens_follow_theme_switch() {
        let mut ctx = context(Theme::Light);
        let before = ctx.color_tokens();
        ctx.set_theme(Theme::Dark);
        assert_ne!(before, ctx.color_tokens());
    }

    #[derive(Default)]
    struct MemoryStore(BTreeMap<String, String>);

    impl PreferenceStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) {
            self.0.insert(key.to_string(), value.to_string());
        }
    }

    #[test]
    fn persisted_choice_beats_system_preference() {
        let mut store = MemoryStore::default();
        store.set(THEME_STORAGE_KEY, "light");
        let controller = ThemeController::init(store, true);
        assert_eq!(controller.current(), Theme::Light);
    }

    #[test]
    fn system_preference_used_without_persisted_choice() {
        let controller = ThemeController::init(MemoryStore::default(), true);
        assert_eq!(controller.current(), Theme::Dark);
        let controller = ThemeController::init(MemoryStore::default(), false);
        assert_eq!(controller.current(), Theme::Light);
    }

    #[test]
    fn toggle_persists_and_reports_new_theme() {
        let mut controller = ThemeController::init(MemoryStore::default(), false);
        let changed = controller.toggle();
        assert_eq!(changed.theme, Theme::Dark);
        assert_eq!(controller.store().get(THEME_STORAGE_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn cookie_store_reads_header_and_emits_set_cookie() {
        let mut cookies = CookiePreferences::parse("session=abc; theme=dark");
        assert_eq!(cookies.get(THEME_STORAGE_KEY).as_deref(), Some("dark"));
        assert!(cookies.set_cookie_headers().is_empty());

        cookies.set(THEME_STORAGE_KEY, "light");
        assert_eq!(cookies.get(THEME_STORAGE_KEY).as_deref(), Some("light"));
        let headers = cookies.set_cookie_headers();
        assert_eq!(headers.len(), 1);
        assert!(headers[0].starts_with("theme=light; Path=/"));
    }
}
