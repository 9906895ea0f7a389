//! SQL identifiers and their normalization.

use std::fmt;

/// An identifier as written in the query.
///
/// Unquoted identifiers are case-insensitive and fold to lower case;
/// quoted identifiers are taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    /// The identifier text, without quotes.
    pub value: String,
    /// Whether the identifier was quoted.
    pub quoted: bool,
}

impl Name {
    /// Creates an unquoted identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), quoted: false }
    }

    /// Creates a quoted identifier.
    #[must_use]
    pub fn quoted(value: impl Into<String>) -> Self {
        Self { value: value.into(), quoted: true }
    }

    /// Returns the name used for lookups.
    #[must_use]
    pub fn normalize(&self) -> String {
        if self.quoted {
            self.value.clone()
        } else {
            normalize_name(&self.value)
        }
    }
}

/// Folds a stored column or alias name for comparison with a normalized
/// identifier.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.value.replace('"', "\"\""))
        } else {
            write!(f, "{}", self.value)
        }
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<sqlparser::ast::Ident> for Name {
    fn from(ident: sqlparser::ast::Ident) -> Self {
        Self { value: ident.value, quoted: ident.quote_style.is_some() }
    }
}

/// A comma-separated list of names, as in `USING (a, b)`.
#[derive(Debug, Clone, Copy)]
pub struct NameList<'a>(pub &'a [Name]);

impl fmt::Display for NameList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_names_fold() {
        assert_eq!(Name::new("UserId").normalize(), "userid");
        assert_eq!(Name::quoted("UserId").normalize(), "UserId");
    }

    #[test]
    fn name_list_display() {
        let names = vec![Name::new("a"), Name::quoted("B")];
        assert_eq!(NameList(&names).to_string(), "a, \"B\"");
    }

    #[test]
    fn from_sqlparser_ident() {
        let name = Name::from(sqlparser::ast::Ident::with_quote('"', "Mixed"));
        assert!(name.quoted);
        assert_eq!(name.normalize(), "Mixed");
    }
}
