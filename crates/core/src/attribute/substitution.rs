use std::sync::LazyLock;

use regex::Regex;

static FORMAT_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("%(d|s)").unwrap_or_else(|e| unreachable!("invalid format verb pattern: {e}"))
});

/// Replaces `%s`/`%d` formatting verbs in `s` with a `$(variable)` make-variable reference.
///
/// Returns the new string and whether anything changed.
pub fn try_variable_substitution(s: &str, variable: &str) -> (String, bool) {
    let replacement = format!("$({variable})");
    let substituted = FORMAT_VERB
        .replace_all(s, regex::NoExpand(&replacement))
        .into_owned();
    let changed = substituted != s;
    (substituted, changed)
}

/// Applies [`try_variable_substitution`] to every string in `items`.
pub fn try_variable_substitutions(items: &[String], variable: &str) -> (Vec<String>, bool) {
    let mut changed = false;
    let substituted = items
        .iter()
        .map(|item| {
            let (s, item_changed) = try_variable_substitution(item, variable);
            changed |= item_changed;
            s
        })
        .collect();
    (substituted, changed)
}
