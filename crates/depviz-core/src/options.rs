//! Visibility option flags.
//!
//! Options arrive as a list of string flags (from the command line, a config
//! file, or the page that embeds the renderer). Each flag turns one boolean on;
//! absent flags are off. Unrecognized flags are ignored and handed back so the
//! caller can report them.
//!
//! | field                  | canonical      | aliases                    |
//! |------------------------|----------------|----------------------------|
//! | `show_issues`          | `issues`       | `showIssues`, `JIRA`       |
//! | `show_all_issues`      | `all-issues`   | `showAllIssues`, `JIRA-all`|
//! | `show_review_requests` | `reviews`      | `showReviewRequests`, `pull`|
//! | `show_refs`            | `refs`         | `showRefs`, `branches`     |
//! | `show_merged_refs`     | `merged`       | `showMergedRefs`           |
//! | `show_conflicts`       | `conflicts`    | `showConflicts`            |
//! | `hide_orphans`         | `hide-orphans` | `hideOrphans`              |

use serde::{Deserialize, Serialize};

/// The recognized visibility switches.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewOptions {
    pub show_issues: bool,
    pub show_all_issues: bool,
    pub show_review_requests: bool,
    pub show_refs: bool,
    pub show_merged_refs: bool,
    pub show_conflicts: bool,
    pub hide_orphans: bool,
}

/// Result of parsing a flag list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedOptions {
    pub options: ViewOptions,
    /// Flags that matched nothing, in input order.
    pub unknown: Vec<String>,
}

impl ViewOptions {
    /// Every flag on.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            show_issues: true,
            show_all_issues: true,
            show_review_requests: true,
            show_refs: true,
            show_merged_refs: true,
            show_conflicts: true,
            hide_orphans: true,
        }
    }

    /// Parse a flag list. Unknown flags are collected, not rejected.
    pub fn parse<I, S>(flags: I) -> ParsedOptions
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = ParsedOptions::default();
        for flag in flags {
            let flag = flag.as_ref().trim();
            if flag.is_empty() {
                continue;
            }
            if !parsed.options.set(flag) {
                parsed.unknown.push(flag.to_string());
            }
        }
        parsed
    }

    /// Convenience for callers that do not care about unknown flags.
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse(flags).options
    }

    /// Turn on the switch named by `flag`. Returns false if the flag is unknown.
    pub fn set(&mut self, flag: &str) -> bool {
        let slot = match flag {
            "issues" | "showIssues" | "JIRA" => &mut self.show_issues,
            "all-issues" | "showAllIssues" | "JIRA-all" => &mut self.show_all_issues,
            "reviews" | "showReviewRequests" | "pull" => &mut self.show_review_requests,
            "refs" | "showRefs" | "branches" => &mut self.show_refs,
            "merged" | "showMergedRefs" => &mut self.show_merged_refs,
            "conflicts" | "showConflicts" => &mut self.show_conflicts,
            "hide-orphans" | "hideOrphans" => &mut self.hide_orphans,
            _ => return false,
        };
        *slot = true;
        true
    }

    /// Canonical flag names for the switches that are on.
    #[must_use]
    pub fn to_flags(&self) -> Vec<&'static str> {
        [
            (self.show_issues, "issues"),
            (self.show_all_issues, "all-issues"),
            (self.show_review_requests, "reviews"),
            (self.show_refs, "refs"),
            (self.show_merged_refs, "merged"),
            (self.show_conflicts, "conflicts"),
            (self.hide_orphans, "hide-orphans"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_and_alias_flags() {
        let a = ViewOptions::from_flags(["issues", "refs", "hide-orphans"]);
        let b = ViewOptions::from_flags(["JIRA", "branches", "hideOrphans"]);
        let c = ViewOptions::from_flags(["showIssues", "showRefs", "hideOrphans"]);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(a.show_issues && a.show_refs && a.hide_orphans);
        assert!(!a.show_all_issues && !a.show_conflicts);
    }

    #[test]
    fn unknown_flags_are_collected() {
        let parsed = ViewOptions::parse(["refs", "sparkles", "", "  merged  "]);
        assert_eq!(parsed.unknown, vec!["sparkles".to_string()]);
        assert!(parsed.options.show_refs);
        assert!(parsed.options.show_merged_refs);
    }

    #[test]
    fn flags_round_trip() {
        let opts = ViewOptions::all();
        assert_eq!(ViewOptions::from_flags(opts.to_flags()), opts);
        assert!(ViewOptions::default().to_flags().is_empty());
    }
}
