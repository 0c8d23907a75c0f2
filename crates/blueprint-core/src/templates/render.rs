//! Placeholder substitution for file templates

use std::path::Path;

/// Ordered placeholder → value pairs; applied in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replacements {
    pairs: Vec<(String, String)>,
}

impl Replacements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a placeholder, keeping its original position
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(t, _)| *t == token) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((token, value)),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    /// Replace every occurrence of every placeholder in `text`
    pub fn apply(&self, text: &str) -> String {
        self.pairs
            .iter()
            .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Replacements {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut replacements = Replacements::new();
        for (token, value) in iter {
            replacements.insert(token, value);
        }
        replacements
    }
}

/// A template file's content, rendered with [`Replacements`]
#[derive(Debug, Clone)]
pub struct FileTemplate {
    content: String,
}

impl FileTemplate {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub async fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(tokio::fs::read_to_string(path).await?))
    }

    pub fn render(&self, replacements: &Replacements) -> String {
        replacements.apply(&self.content)
    }
}
