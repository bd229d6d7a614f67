//! Regex-based lexer: turns source text into a finite stream of tokens
//! terminated by an end-of-input sentinel. Keywords are matched with
//! word-boundary anchors so `integers` lexes as an identifier rather
//! than colliding with the `integer` type keyword; comment tokens are
//! elided before a token is ever yielded.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt;

use transpiler_symbols::{terminals, Symbol, Token};

/// `(terminal index, capture-group tag, pattern)`. Order is priority:
/// keyword/type rules must precede the identifier rule, and multi-
/// character operators must precede their single-character prefixes.
const LEXER_RULES: &[(u32, &str, &str)] = &[
    (terminals::T_INTEGER, "T_INTEGER", r"\binteger\b"),
    (terminals::T_REAL, "T_REAL", r"\breal\b"),
    (terminals::T_BOOLEAN, "T_BOOLEAN", r"\bboolean\b"),
    (terminals::T_CHAR, "T_CHAR", r"\bchar\b"),
    (terminals::T_STRING, "T_STRING", r"\bstring\b"),
    (terminals::TRUE, "TRUE", r"\btrue\b"),
    (terminals::FALSE, "FALSE", r"\bfalse\b"),
    (terminals::VAR, "VAR", r"\bvar\b"),
    (terminals::IF, "IF", r"\bif\b"),
    (terminals::THEN, "THEN", r"\bthen\b"),
    (terminals::ELSE, "ELSE", r"\belse\b"),
    (terminals::FOR, "FOR", r"\bfor\b"),
    (terminals::WHILE, "WHILE", r"\bwhile\b"),
    (terminals::REPEAT, "REPEAT", r"\brepeat\b"),
    (terminals::UNTIL, "UNTIL", r"\buntil\b"),
    (terminals::DOWNTO, "DOWNTO", r"\bdownto\b"),
    (terminals::TO, "TO", r"\bto\b"),
    (terminals::DO, "DO", r"\bdo\b"),
    (terminals::BEGIN, "BEGIN", r"\bbegin\b"),
    (terminals::END, "END", r"\bend\b"),
    (terminals::AND, "AND", r"\band\b"),
    (terminals::OR, "OR", r"\bor\b"),
    (terminals::NOT, "NOT", r"\bnot\b"),
    (terminals::XOR, "XOR", r"\bxor\b"),
    (terminals::REAL_LIT, "REAL_LIT", r"\d+\.\d+"),
    (terminals::INT_LIT, "INT_LIT", r"\d+"),
    (terminals::STRING_LIT, "STRING_LIT", r"'[^']*'"),
    (terminals::ID, "ID", r"[A-Za-z_][A-Za-z0-9_]*"),
    (terminals::PLUS_ASSIGN, "PLUS_ASSIGN", r"\+="),
    (terminals::MINUS_ASSIGN, "MINUS_ASSIGN", r"-="),
    (terminals::STAR_ASSIGN, "STAR_ASSIGN", r"\*="),
    (terminals::SLASH_ASSIGN, "SLASH_ASSIGN", r"/="),
    (terminals::ASSIGN, "ASSIGN", r":="),
    (terminals::LE, "LE", r"<="),
    (terminals::NE, "NE", r"<>"),
    (terminals::GE, "GE", r">="),
    (terminals::EQ, "EQ", r"="),
    (terminals::LT, "LT", r"<"),
    (terminals::GT, "GT", r">"),
    (terminals::PLUS, "PLUS", r"\+"),
    (terminals::MINUS, "MINUS", r"-"),
    (terminals::STAR, "STAR", r"\*"),
    (terminals::SLASH, "SLASH", r"/"),
    (terminals::LPAREN, "LPAREN", r"\("),
    (terminals::RPAREN, "RPAREN", r"\)"),
    (terminals::SEMI, "SEMI", r";"),
    (terminals::COLON, "COLON", r":"),
    (terminals::COMMA, "COMMA", r","),
    (terminals::DOT, "DOT", r"\."),
];

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    let alternation = LEXER_RULES
        .iter()
        .map(|(_, tag, pattern)| format!("(?P<{tag}>{pattern})"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)^(?:{alternation})")).expect("lexer rule alternation must compile")
});

fn terminal_for_tag(tag: &str) -> u32 {
    LEXER_RULES
        .iter()
        .find(|(_, t, _)| *t == tag)
        .map(|(idx, _, _)| *idx)
        .expect("matched capture group name must be a known tag")
}

/// Free-form terminals whose lexeme is the matched surface form rather
/// than a fixed canonical spelling.
fn is_free_form(terminal: u32) -> bool {
    terminal == terminals::ID
        || terminal == terminals::INT_LIT
        || terminal == terminals::REAL_LIT
        || terminal == terminals::STRING_LIT
}

fn lexeme_for(terminal: u32, matched: &str) -> String {
    if is_free_form(terminal) {
        matched.to_string()
    } else {
        terminals::ALL
            .iter()
            .find(|(idx, _)| *idx == terminal)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| matched.to_string())
    }
}

#[derive(Debug, PartialEq)]
pub enum LexerError {
    UnexpectedToken {
        ch: char,
        line: u32,
        path: Option<String>,
    },
    UnterminatedComment {
        line: u32,
        path: Option<String>,
    },
}

impl Error for LexerError {}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedToken { ch, line, path } => {
                write!(f, "{ch} at line {line}")?;
                if let Some(path) = path {
                    write!(f, " ({path}:{line})")?;
                }
                Ok(())
            }
            LexerError::UnterminatedComment { line, path } => {
                write!(f, "{{ at line {line}")?;
                if let Some(path) = path {
                    write!(f, " ({path}:{line})")?;
                }
                Ok(())
            }
        }
    }
}

/// Scans `source` one token at a time. Implements `Iterator` so callers
/// can drive the parser directly off it; the sequence ends with a single
/// `Symbol::End` token and then yields `None`.
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    line: u32,
    path: Option<String>,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            pos: 0,
            line: 1,
            path: None,
            done: false,
        }
    }

    pub fn with_path(source: &'src str, path: impl Into<String>) -> Self {
        Lexer {
            path: Some(path.into()),
            ..Lexer::new(source)
        }
    }

    fn advance_past(&mut self, matched: &str) {
        self.line += matched.matches('\n').count() as u32;
        self.pos += matched.len();
    }

    /// Skips whitespace and comments, reporting unterminated block
    /// comments at the line of their opening brace. Returns `Ok(())`
    /// once `self.pos` sits at the next real token (or at end of input).
    fn skip_trivia(&mut self) -> Result<(), LexerError> {
        loop {
            let rest = &self.source[self.pos..];
            if rest.is_empty() {
                return Ok(());
            }
            let next_char = rest.chars().next().unwrap();
            if next_char.is_whitespace() {
                self.advance_past(&rest[..next_char.len_utf8()]);
                continue;
            }
            if let Some(comment) = rest.strip_prefix("//") {
                let line_len = comment.find('\n').unwrap_or(comment.len());
                self.advance_past(&rest[..2 + line_len]);
                continue;
            }
            if rest.starts_with('{') {
                let brace_line = self.line;
                match rest[1..].find('}') {
                    Some(offset) => self.advance_past(&rest[..1 + offset + 1]),
                    None => {
                        return Err(LexerError::UnterminatedComment {
                            line: brace_line,
                            path: self.path.clone(),
                        })
                    }
                }
                continue;
            }
            return Ok(());
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Err(e) = self.skip_trivia() {
            self.done = true;
            return Some(Err(e));
        }
        let rest = &self.source[self.pos..];
        if rest.is_empty() {
            self.done = true;
            return Some(Ok(Token::new(Symbol::End, "", self.pos, self.line)));
        }
        match TOKEN_REGEX.captures(rest) {
            Some(caps) => {
                let (tag, matched) = LEXER_RULES
                    .iter()
                    .find_map(|(_, tag, _)| caps.name(tag).map(|m| (*tag, m.as_str())))
                    .expect("regex matched but no named group captured");
                let terminal = terminal_for_tag(tag);
                let lexeme = lexeme_for(terminal, matched);
                let token = Token::new(Symbol::Terminal(terminal), lexeme, self.pos, self.line);
                self.advance_past(matched);
                Some(Ok(token))
            }
            None => {
                let ch = rest.chars().next().unwrap();
                self.done = true;
                Some(Err(LexerError::UnexpectedToken {
                    ch,
                    line: self.line,
                    path: self.path.clone(),
                }))
            }
        }
    }
}

/// Convenience wrapper collecting the whole token stream, useful for
/// tests and for the parser which consumes a finished stream.
pub fn lex(source: &str) -> Result<Vec<Token>, LexerError> {
    match Lexer::new(source).collect::<Result<Vec<Token>, LexerError>>() {
        Ok(tokens) => {
            log::debug!("lexed {} tokens from {} bytes", tokens.len(), source.len());
            Ok(tokens)
        }
        Err(e) => {
            log::warn!("{e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_ok(source: &str) -> Vec<Token> {
        lex(source).expect("expected lex to succeed")
    }

    #[test]
    fn keyword_boundary_does_not_swallow_identifier_prefix() {
        let tokens = lex_ok("integers");
        assert_eq!(tokens[0].terminal, Symbol::Terminal(terminals::ID));
        assert_eq!(tokens[0].lexeme, "integers");
    }

    #[test]
    fn keyword_is_tagged_as_its_type_terminal() {
        let tokens = lex_ok("integer");
        assert_eq!(tokens[0].terminal, Symbol::Terminal(terminals::T_INTEGER));
    }

    #[test]
    fn multi_char_operators_beat_their_prefixes() {
        let tokens = lex_ok(":= <= <> >=");
        let expected = [
            terminals::ASSIGN,
            terminals::LE,
            terminals::NE,
            terminals::GE,
        ];
        for (tok, exp) in tokens.iter().zip(expected) {
            assert_eq!(tok.terminal, Symbol::Terminal(exp));
        }
    }

    #[test]
    fn line_comment_is_elided() {
        let tokens = lex_ok("var // a comment\nx");
        assert_eq!(tokens[0].terminal, Symbol::Terminal(terminals::VAR));
        assert_eq!(tokens[1].terminal, Symbol::Terminal(terminals::ID));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn block_comment_is_elided() {
        let tokens = lex_ok("var { skip\nme } x");
        assert_eq!(tokens[0].terminal, Symbol::Terminal(terminals::VAR));
        assert_eq!(tokens[1].terminal, Symbol::Terminal(terminals::ID));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_block_comment_reports_opening_brace_line() {
        let err = lex("x\n{ never closes").unwrap_err();
        assert_eq!(
            err,
            LexerError::UnterminatedComment {
                line: 2,
                path: None
            }
        );
        assert_eq!(err.to_string(), "{ at line 2");
    }

    #[test]
    fn stray_character_is_reported_with_its_line() {
        let err = lex("var x\n%").unwrap_err();
        assert_eq!(err.to_string(), "% at line 2");
    }

    #[test]
    fn stream_ends_with_end_of_input_token() {
        let tokens = lex_ok("var");
        assert_eq!(tokens.last().unwrap().terminal, Symbol::End);
    }

    #[test]
    fn string_literal_has_no_escapes() {
        let tokens = lex_ok("'hello world'");
        assert_eq!(tokens[0].terminal, Symbol::Terminal(terminals::STRING_LIT));
        assert_eq!(tokens[0].lexeme, "'hello world'");
    }

    #[test]
    fn real_literal_requires_fractional_digits() {
        let tokens = lex_ok("3.14 7");
        assert_eq!(tokens[0].terminal, Symbol::Terminal(terminals::REAL_LIT));
        assert_eq!(tokens[1].terminal, Symbol::Terminal(terminals::INT_LIT));
    }
}
