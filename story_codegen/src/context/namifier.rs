//! Legal, collision-free identifiers for generated code.

use std::collections::HashSet;

const UNNAMED: &str = "unnamed";

/// Hands out identifiers that are unique within one generation pass.
///
/// Uniqueness is case-insensitive, since some target languages fold case.
#[derive(Debug, Default)]
pub struct Namifier {
    taken: HashSet<String>,
}

impl Namifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A legal identifier for `text`, suffixed with `_N` if already handed out.
    pub fn unique_name(&mut self, text: &str) -> String {
        let base = legal_name(text);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while !self.taken.insert(candidate.to_ascii_lowercase()) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        candidate
    }
}

/// Replace everything that is not an ASCII letter, digit or `_` with `_`.
///
/// Empty names become `unnamed`; names starting with a digit get a `_` prefix.
pub fn legal_name(text: &str) -> String {
    let name: String = text
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    match name.chars().next() {
        None => UNNAMED.to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{name}"),
        Some(_) => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_name() {
        assert_eq!(legal_name("Open the Gate"), "Open_the_Gate");
        assert_eq!(legal_name("  "), "unnamed");
        assert_eq!(legal_name("3 wishes"), "_3_wishes");
        assert_eq!(legal_name("hero's_sword"), "hero_s_sword");
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let mut namifier = Namifier::new();
        assert_eq!(namifier.unique_name("Guard"), "Guard");
        assert_eq!(namifier.unique_name("guard"), "guard_1");
        assert_eq!(namifier.unique_name("Guard"), "Guard_2");
        assert_eq!(namifier.unique_name("guard_1"), "guard_1_1");
        assert_eq!(namifier.unique_name(""), "unnamed");
    }
}
