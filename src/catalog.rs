//! Message catalog
//!
//! Operator-facing text is looked up by its English form. Translations come
//! from the `[messages]` table of the configuration file; anything missing
//! is shown as-is.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn new(messages: HashMap<String, String>) -> Self {
        Self { messages }
    }

    /// Localized text for `msgid`
    pub fn tr<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.messages
            .get(msgid)
            .map(String::as_str)
            .unwrap_or(msgid)
    }
}
