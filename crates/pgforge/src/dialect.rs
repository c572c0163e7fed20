//! Identifier quoting rules.
//!
//! A [`Dialect`] is an explicit value threaded through rendering, not ambient
//! global state: bind one at process start (or per call in tests) and every
//! render is deterministic.
//!
//! - Dotted names quote each segment independently: `u.id` -> `"u"."id"`
//! - The literal token `*` is never quoted
//! - Embedded quote characters are escaped by doubling

use crate::fragment::Fragment;

/// Case folding applied to identifier segments before quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseFold {
    /// Fold segments to lowercase.
    Lower,
    /// Fold segments to uppercase.
    Upper,
    /// Leave segments as written.
    #[default]
    None,
}

/// Identifier-quoting configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Character wrapped around each identifier segment.
    pub quote_char: char,
    /// Case folding applied before quoting.
    pub case_fold: CaseFold,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            quote_char: '"',
            case_fold: CaseFold::None,
        }
    }
}

impl Dialect {
    /// Create a dialect with an explicit quote character and case fold.
    pub fn new(quote_char: char, case_fold: CaseFold) -> Self {
        Self {
            quote_char,
            case_fold,
        }
    }

    /// Quote a single identifier segment.
    ///
    /// `*` passes through untouched.
    pub fn quote_segment(&self, segment: &str) -> String {
        if segment == "*" {
            return segment.to_string();
        }
        let folded = match self.case_fold {
            CaseFold::Lower => segment.to_lowercase(),
            CaseFold::Upper => segment.to_uppercase(),
            CaseFold::None => segment.to_string(),
        };
        let mut out = String::with_capacity(folded.len() + 2);
        out.push(self.quote_char);
        for ch in folded.chars() {
            if ch == self.quote_char {
                out.push(ch);
            }
            out.push(ch);
        }
        out.push(self.quote_char);
        out
    }

    /// Quote a possibly dotted qualified name into a text-only [`Fragment`].
    ///
    /// Each `.`-separated segment is quoted independently, so `u.id` becomes
    /// `"u"."id"`.
    pub fn qname(&self, name: &str) -> Fragment {
        let text = name
            .split('.')
            .map(|segment| self.quote_segment(segment))
            .collect::<Vec<_>>()
            .join(".");
        Fragment::raw(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_simple() {
        let d = Dialect::default();
        assert_eq!(d.qname("users").text, "\"users\"");
    }

    #[test]
    fn qname_dotted() {
        let d = Dialect::default();
        assert_eq!(d.qname("u.id").text, "\"u\".\"id\"");
    }

    #[test]
    fn qname_three_parts() {
        let d = Dialect::default();
        assert_eq!(d.qname("public.users.id").text, "\"public\".\"users\".\"id\"");
    }

    #[test]
    fn qname_has_no_params() {
        let d = Dialect::default();
        assert!(d.qname("u.id").params.is_empty());
    }

    #[test]
    fn star_is_never_quoted() {
        let d = Dialect::default();
        assert_eq!(d.qname("*").text, "*");
        assert_eq!(d.qname("u.*").text, "\"u\".*");
    }

    #[test]
    fn case_fold_lower() {
        let d = Dialect::new('"', CaseFold::Lower);
        assert_eq!(d.qname("Users.ID").text, "\"users\".\"id\"");
    }

    #[test]
    fn case_fold_upper() {
        let d = Dialect::new('"', CaseFold::Upper);
        assert_eq!(d.qname("users").text, "\"USERS\"");
    }

    #[test]
    fn custom_quote_char() {
        let d = Dialect::new('`', CaseFold::None);
        assert_eq!(d.qname("u.id").text, "`u`.`id`");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        let d = Dialect::default();
        assert_eq!(d.qname("we\"ird").text, "\"we\"\"ird\"");
    }
}
