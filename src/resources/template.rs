use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

/// A URI template with `{name}` placeholders. Each placeholder captures one
/// non-empty path segment, verbatim.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: &'static str,
    pattern: Regex,
    names: Vec<String>,
}

impl UriTemplate {
    pub fn parse(template: &'static str) -> Result<Self> {
        let mut pattern = String::from("^");
        let mut names = Vec::new();
        let mut last = 0;
        for captures in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            pattern.push_str(&regex::escape(&template[last..whole.start()]));
            pattern.push_str("([^/]+)");
            names.push(name.as_str().to_string());
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&template[last..]));
        pattern.push('$');

        let pattern = Regex::new(&pattern)
            .map_err(|e| anyhow!("invalid uri template '{template}': {e}"))?;
        Ok(Self {
            template,
            pattern,
            names,
        })
    }

    pub fn as_str(&self) -> &'static str {
        self.template
    }

    /// Placeholder values keyed by name, in template order.
    pub fn extract(&self, uri: &str) -> Option<IndexMap<String, String>> {
        let captures = self.pattern.captures(uri)?;
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                captures
                    .get(i + 1)
                    .map(|value| (name.clone(), value.as_str().to_string()))
            })
            .collect()
    }
}
