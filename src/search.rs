// src/search.rs

//! Registry search with literal-query filtering
//!
//! The registry already matches substrings server-side; the local filter
//! re-checks each result name for case-insensitive containment of the
//! literal query. Regex metacharacters in the query are escaped first, so
//! a query like `c++` matches the package named `c++` instead of being
//! interpreted as a pattern.

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::system::SystemQuery;
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Search the registry and print matching packages.
///
/// With `names_only` set, one name per line; otherwise name, version, a
/// local-install annotation, and an indented description. The annotation
/// costs one system query per matching result.
pub fn run_search<R, S>(registry: &R, system: &S, query: &str, names_only: bool) -> Result<()>
where
    R: Registry + ?Sized,
    S: SystemQuery + ?Sized,
{
    let results = registry.search(query);
    if results.is_empty() {
        println!("No packages found.");
        return Ok(());
    }

    let filter = containment_filter(query)?;
    let mut matched = 0usize;

    for package in results.iter().filter(|p| filter.is_match(&p.name)) {
        matched += 1;

        if names_only {
            println!("{}", package.name);
            continue;
        }

        let annotation = if system.is_installed(&package.name) {
            " (installed)"
        } else {
            ""
        };
        println!("{} {}{}", package.name, package.version, annotation);
        println!("    {}", package.description);
    }

    debug!("{} of {} results matched {:?}", matched, results.len(), query);
    if matched == 0 {
        println!("No packages found.");
    }

    Ok(())
}

/// Build a case-insensitive containment filter that treats the query as a
/// literal string.
fn containment_filter(query: &str) -> Result<Regex> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Usage(format!("unusable search query {:?}: {}", query, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_is_case_insensitive_containment() {
        let filter = containment_filter("grep").unwrap();

        assert!(filter.is_match("ripgrep-git"));
        assert!(filter.is_match("RipGREP"));
        assert!(!filter.is_match("ack"));
    }

    #[test]
    fn test_metacharacters_match_literally() {
        let filter = containment_filter("c++").unwrap();

        assert!(filter.is_match("c++"));
        assert!(filter.is_match("gcc-c++"));
        assert!(!filter.is_match("cxx"), "Escaped '+' must not act as a quantifier");
    }

    #[test]
    fn test_dots_do_not_match_any_character() {
        let filter = containment_filter("lib.so").unwrap();

        assert!(filter.is_match("lib.so-tools"));
        assert!(!filter.is_match("libxso"));
    }
}
