//! Message templates keyed by localization key.

use std::collections::BTreeMap;

/// Catalog of `{param}` templates for one language.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MessageCatalog {
    templates: BTreeMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Renders `key` with its parameters substituted.
    ///
    /// Unknown keys render as the key itself followed by the parameters, so a
    /// missing translation stays readable in the log.
    pub fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        let Some(template) = self.templates.get(key) else {
            if params.is_empty() {
                return key.to_owned();
            }
            let rendered: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            return format!("{key} ({})", rendered.join(", "));
        };

        params
            .iter()
            .fold(template.clone(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_named_parameters() {
        let catalog = MessageCatalog::new().with("battle.attack", "{attacker} hits {target} for {damage}");
        let text = catalog.translate(
            "battle.attack",
            &[
                ("attacker", "Rin".to_string()),
                ("target", "Slime".to_string()),
                ("damage", "4".to_string()),
            ],
        );
        assert_eq!(text, "Rin hits Slime for 4");
    }

    #[test]
    fn missing_key_falls_back_to_key_and_params() {
        let catalog = MessageCatalog::new();
        assert_eq!(catalog.translate("battle.defeat", &[]), "battle.defeat");
        assert_eq!(
            catalog.translate("battle.died", &[("name", "Rin".to_string())]),
            "battle.died (name=Rin)"
        );
    }
}
