//! Path alias handling (`@` → `src`).

use std::path::PathBuf;

use indexmap::IndexMap;

/// Rewrite an aliased specifier to a root-relative path.
///
/// An alias matches the whole specifier or a prefix followed by `/`, so
/// `@` matches `@/a` but not the scoped package `@scope/pkg`.
pub fn resolve_alias(specifier: &str, aliases: &IndexMap<String, PathBuf>) -> Option<PathBuf> {
    aliases.iter().find_map(|(alias, target)| {
        if specifier == alias {
            return Some(target.clone());
        }
        let rest = specifier.strip_prefix(alias.as_str())?.strip_prefix('/')?;
        Some(target.join(rest))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> IndexMap<String, PathBuf> {
        IndexMap::from([
            ("@".to_string(), PathBuf::from("src")),
            ("~assets".to_string(), PathBuf::from("src/assets")),
        ])
    }

    #[test]
    fn matches_alias_prefix() {
        assert_eq!(resolve_alias("@/a/b", &aliases()), Some(PathBuf::from("src/a/b")));
        assert_eq!(resolve_alias("@", &aliases()), Some(PathBuf::from("src")));
        assert_eq!(
            resolve_alias("~assets/logo.png", &aliases()),
            Some(PathBuf::from("src/assets/logo.png"))
        );
    }

    #[test]
    fn scoped_packages_are_not_aliases() {
        assert_eq!(resolve_alias("@scope/pkg", &aliases()), None);
        assert_eq!(resolve_alias("react", &aliases()), None);
    }
}
