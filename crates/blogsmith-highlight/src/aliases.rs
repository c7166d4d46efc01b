//! Short language names accepted in code fences

/// `(alias, canonical)` pairs. Each canonical name appears in one group.
pub const ALIASES: &[(&str, &str)] = &[
    ("ts", "typescript"),
    ("js", "javascript"),
    ("py", "python"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("yml", "yaml"),
    ("md", "markdown"),
];

/// Resolve an alias to its canonical name
///
/// Lookup is exact and case-sensitive; unknown names are returned unchanged.
pub fn resolve(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Aliases that resolve to `canonical`
pub fn aliases_of(canonical: &str) -> Vec<&'static str> {
    ALIASES
        .iter()
        .filter(|(_, c)| *c == canonical)
        .map(|(alias, _)| *alias)
        .collect()
}
