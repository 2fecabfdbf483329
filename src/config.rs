use std::env;

/// Presentation variant for the entry area. One render-tree shape feeds both;
/// only the terminal adapter differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Cards,
    List,
}

impl Layout {
    pub fn toggled(self) -> Self {
        match self {
            Layout::Cards => Layout::List,
            Layout::List => Layout::Cards,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Layout::Cards => "CARDS",
            Layout::List => "LIST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub layout: Layout,
    pub demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let base_url = opt_env("POSTWATCH_BASE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        let layout = match opt_env("POSTWATCH_LAYOUT").as_deref() {
            Some("list") | Some("LIST") => Layout::List,
            _ => Layout::Cards,
        };
        let demo = opt_env("POSTWATCH_DEMO")
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            base_url,
            layout,
            demo,
        }
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
}
