//! Style compilation: reset prepending and duplicate-rule removal.

use indexmap::IndexSet;

use super::tokenizer::{tokenize, Token};
use crate::config::{RuntimeConfig, DEFAULT_STYLE_RESET};

/// Options for [`compile_styles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOptions {
    /// CSS prepended to the component's styles. Empty for none.
    pub reset: String,
    /// Drop repeated top-level rule blocks.
    pub dedupe: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            reset: DEFAULT_STYLE_RESET.to_owned(),
            dedupe: true,
        }
    }
}

impl StyleOptions {
    /// Default reset with deduplication.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options derived from the runtime config.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            reset: config.style_reset.clone(),
            ..Self::default()
        }
    }

    /// Use a different reset block.
    pub fn with_reset(mut self, css: impl Into<String>) -> Self {
        self.reset = css.into();
        self
    }

    /// Prepend nothing.
    pub fn without_reset(mut self) -> Self {
        self.reset.clear();
        self
    }

    /// Enable or disable deduplication.
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }
}

/// Split CSS into top-level rule blocks and statements.
///
/// Each entry is one `selector { ... }` block (nested blocks included) or
/// one `@statement;`. Comments are dropped and whitespace runs collapse to
/// a single space, so blocks that differ only in formatting compare equal.
pub fn split_rules(css: &str) -> Vec<String> {
    let mut rules = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for (token, text) in tokenize(css) {
        match token {
            Token::Comment => continue,
            Token::Whitespace => {
                if !current.is_empty() && !current.ends_with(' ') {
                    current.push(' ');
                }
                continue;
            }
            Token::BraceOpen => depth += 1,
            Token::BraceClose => depth = depth.saturating_sub(1),
            _ => {}
        }
        current.push_str(text);
        let closes_rule = match token {
            Token::BraceClose => depth == 0,
            Token::Semicolon => depth == 0,
            _ => false,
        };
        if closes_rule {
            push_rule(&mut rules, &mut current);
        }
    }
    push_rule(&mut rules, &mut current);
    rules
}

fn push_rule(rules: &mut Vec<String>, current: &mut String) {
    let rule = current.trim();
    if !rule.is_empty() && rule != ";" {
        rules.push(rule.to_owned());
    }
    current.clear();
}

/// Compile a component's CSS for mounting in its shadow root.
///
/// The reset block comes first. With `dedupe`, a rule block identical to
/// an earlier one (including one from the reset) is dropped; first
/// occurrences keep their order.
pub fn compile_styles(css: &str, options: &StyleOptions) -> String {
    let rules = split_rules(&options.reset)
        .into_iter()
        .chain(split_rules(css));
    if options.dedupe {
        let unique: IndexSet<String> = rules.collect();
        unique.into_iter().collect::<Vec<_>>().join("\n")
    } else {
        rules.collect::<Vec<_>>().join("\n")
    }
}
