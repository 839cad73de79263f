//! logos-based CSS tokenizer.
//!
//! Only the structure matters for rule splitting, so the token set is
//! coarse: braces, semicolons, comments, strings and everything else as
//! opaque chunks. Strings and comments are single tokens so braces inside
//! them never count toward nesting.

use logos::Logos;

/// CSS token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    // ── Compound tokens ──────────────────────────────────────────────

    /// `/* ... */` comment. An unterminated comment runs to end of input.
    #[token("/*", block_comment)]
    Comment,

    /// Double-quoted string literal (backslash escapes allowed).
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleString,

    /// Single-quoted string literal (backslash escapes allowed).
    #[regex(r"'([^'\\]|\\.)*'")]
    SingleString,

    /// Run of whitespace.
    #[regex(r"[ \t\n\r\f]+")]
    Whitespace,

    /// Anything else up to the next structural character.
    #[regex(r#"[^{};"'/ \t\n\r\f]+"#)]
    Chunk,

    // ── Single-character punctuation ─────────────────────────────────

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `/` outside a comment.
    #[token("/")]
    Slash,
}

/// Skip to the first `*/` after the opening `/*`.
fn block_comment(lex: &mut logos::Lexer<Token>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(lex.remainder().len()),
    }
    true
}

/// Tokenize CSS into `(Token, &str)` pairs.
///
/// Text that fails to lex (an unterminated string, say) is kept as a
/// [`Token::Chunk`] so no input is lost.
pub fn tokenize(input: &str) -> Vec<(Token, &str)> {
    Token::lexer(input)
        .spanned()
        .map(|(result, span)| (result.unwrap_or(Token::Chunk), &input[span]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|(t, _)| t).collect()
    }

    // ── Punctuation ──────────────────────────────────────────────────

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokens("{};/"),
            vec![Token::BraceOpen, Token::BraceClose, Token::Semicolon, Token::Slash]
        );
    }

    // ── Rules ────────────────────────────────────────────────────────

    #[test]
    fn test_simple_rule() {
        assert_eq!(
            tokens(":host{display:block}"),
            vec![
                Token::Chunk,
                Token::BraceOpen,
                Token::Chunk,
                Token::BraceClose
            ]
        );
    }

    #[test]
    fn test_whitespace_runs() {
        let result = tokenize("a  \n b");
        assert_eq!(result[1], (Token::Whitespace, "  \n "));
    }

    // ── Comments and strings ─────────────────────────────────────────

    #[test]
    fn test_comment_is_one_token() {
        let result = tokenize("/* { not a brace } */");
        assert_eq!(result, vec![(Token::Comment, "/* { not a brace } */")]);
    }

    #[test]
    fn test_comment_with_stars() {
        assert_eq!(tokens("/** doc **/"), vec![Token::Comment]);
    }

    #[test]
    fn test_comment_ends_at_first_close() {
        let result = tokenize("/* a } b */ .x /* c */");
        assert_eq!(result[0], (Token::Comment, "/* a } b */"));
        assert_eq!(result[1], (Token::Whitespace, " "));
        assert_eq!(result[2], (Token::Chunk, ".x"));
        assert_eq!(result[4], (Token::Comment, "/* c */"));
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        assert_eq!(
            tokenize(".a /* open { "),
            vec![
                (Token::Chunk, ".a"),
                (Token::Whitespace, " "),
                (Token::Comment, "/* open { ")
            ]
        );
    }

    #[test]
    fn test_strings_hide_braces() {
        assert_eq!(
            tokens(r#"content:"}" 'a;b'"#),
            vec![
                Token::Chunk,
                Token::DoubleString,
                Token::Whitespace,
                Token::SingleString
            ]
        );
    }

    #[test]
    fn test_unterminated_string_kept() {
        let text: String = tokenize("a \"b").into_iter().map(|(_, s)| s).collect();
        assert_eq!(text, "a \"b");
    }
}
