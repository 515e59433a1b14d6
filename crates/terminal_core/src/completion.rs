//! Prefix-cycling autocomplete over registry names.

use terminal_parser::tokenize;

/// Cycle state for repeated completion requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutocompleteState {
    base: Option<String>,
    candidates: Vec<String>,
    index: usize,
}

impl AutocompleteState {
    /// Returns the next candidate for `prefix`, cycling through `pool` entries that start with
    /// it.
    ///
    /// A prefix different from the previous call rebuilds the candidate list and restarts the
    /// cycle. Returns `None` when nothing matches.
    pub fn next(&mut self, prefix: &str, pool: &[String]) -> Option<String> {
        if self.base.as_deref() != Some(prefix) {
            self.candidates = pool
                .iter()
                .filter(|name| name.starts_with(prefix))
                .cloned()
                .collect();
            self.base = Some(prefix.to_string());
            self.index = 0;
        }
        if self.candidates.is_empty() {
            return None;
        }
        let pick = self.candidates[self.index % self.candidates.len()].clone();
        self.index = self.index.wrapping_add(1);
        Some(pick)
    }

    /// Completes the first token of `input`, keeping the remaining tokens.
    ///
    /// Returns the replacement input text; the caret belongs at its end.
    pub fn complete_input(&mut self, input: &str, pool: &[String]) -> Option<String> {
        let tokens = tokenize(input);
        let prefix = tokens.first().map(String::as_str).unwrap_or_default();
        let pick = self.next(prefix, pool)?;
        Some(replace_head(&pick, tokens.get(1..).unwrap_or_default()))
    }

    /// Returns the current candidate list.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }
}

fn replace_head(head: &str, rest: &[String]) -> String {
    if rest.is_empty() {
        head.to_string()
    } else {
        format!("{head} {}", rest.join(" "))
    }
}
