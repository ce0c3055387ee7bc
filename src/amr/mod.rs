//! # AMR Text Grammar
//!
//! Parser for the bracketed AMR serialization:
//!
//! ```text
//! CONCEPT  := "(" INSTANCE RELATION* ")"
//! INSTANCE := TOKEN "/" TOKEN
//! RELATION := ROLE TAIL
//! TAIL     := TOKEN | QUOTED | CONCEPT
//! ```
//!
//! Pure functions: no graph construction and no alignment. Turning the tree
//! into a shared-node graph is [`crate::model::AmrGraph::from_tree`].

pub mod ast;
pub mod lexer;
pub mod parser;

use crate::Result;
use ast::Instance;

/// Parse AMR text into its root instance.
///
/// Comment lines (starting with `#`) must already be stripped; see
/// [`strip_comments`].
pub fn parse(text: &str) -> Result<Instance> {
    let tokens = lexer::tokenize(text)?;
    parser::parse_root(&tokens)
}

/// Split AMR text into (comment lines, graph body).
pub fn strip_comments(text: &str) -> (Vec<&str>, String) {
    let (comments, body): (Vec<&str>, Vec<&str>) =
        text.lines().partition(|line| line.starts_with('#'));
    (comments, body.join("\n"))
}

/// Tokens of the `# ::snt` metadata line, if any.
pub fn sentence_tokens(comments: &[&str]) -> Option<Vec<String>> {
    comments
        .iter()
        .find_map(|line| line.strip_prefix("# ::snt"))
        .map(|snt| snt.split_whitespace().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments() {
        let text = "# ::id 1\n# ::snt The dog barked .\n(b / bark-01\n   :ARG0 (d / dog))";
        let (comments, body) = strip_comments(text);
        assert_eq!(comments.len(), 2);
        assert_eq!(body, "(b / bark-01\n   :ARG0 (d / dog))");
        assert_eq!(
            sentence_tokens(&comments),
            Some(vec!["The".into(), "dog".into(), "barked".into(), ".".into()])
        );
    }

    #[test]
    fn test_no_snt_metadata() {
        let (comments, _) = strip_comments("# ::id 7\n(a / and)");
        assert_eq!(sentence_tokens(&comments), None);
    }
}
