//! Character-driven tokenizer for Dragon-Lang source text.
//!
//! Whitespace is skipped; `/* ... */` block comments and `#` line comments
//! are discarded; string literals are emitted quote-included; two-character
//! operators are recognized atomically before falling back to their
//! single-character prefix.

use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::lexeme::{keyword, Lexeme, TWO_CHAR_SYMBOLS};
use crate::span::{Span, Spanned};

pub(crate) struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    file_id: u16,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c as u32 >= 0x00C0
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

impl<'src> Lexer<'src> {
    pub(crate) fn new(source: &'src str, file_id: u16) -> Self {
        // Strip a UTF-8 BOM if present, per the CLI contract in §6.2.
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            source,
            bytes: source.as_bytes(),
            file_id,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = matches!(tok.node, Lexeme::Eof);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn error(&mut self, message: String, start: usize, end: usize) {
        self.diagnostics.push(Diagnostic::error(
            ErrorKind::Lexical,
            message,
            Span::new(self.file_id, start as u32, end as u32),
        ));
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, byte_offset: usize) -> Option<char> {
        self.source.get(self.pos + byte_offset..)?.chars().next()
    }

    fn advance_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance_char();
                }
                Some('#') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.pos;
                    self.advance_char();
                    self.advance_char();
                    loop {
                        match self.peek_char() {
                            None => {
                                self.error(
                                    "unterminated block comment".to_string(),
                                    start,
                                    self.pos,
                                );
                                return;
                            }
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.advance_char();
                                self.advance_char();
                                break;
                            }
                            Some(_) => {
                                self.advance_char();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Spanned::new(Lexeme::Eof, Span::new(self.file_id, start as u32, start as u32));
        };

        if is_ident_start(c) {
            return self.scan_ident_or_keyword(start);
        }
        if c.is_ascii_digit() {
            return self.scan_number(start);
        }
        if c == '"' {
            return self.scan_string(start);
        }
        self.scan_symbol(start)
    }

    fn scan_ident_or_keyword(&mut self, start: usize) -> Spanned<Lexeme> {
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                self.advance_char();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let lexeme = match keyword(text) {
            Some(kw) => Lexeme::Keyword(kw),
            None => Lexeme::Ident(text.to_string()),
        };
        Spanned::new(lexeme, Span::new(self.file_id, start as u32, self.pos as u32))
    }

    fn scan_number(&mut self, start: usize) -> Spanned<Lexeme> {
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.advance_char();
        }
        let mut is_float = false;
        if self.peek_char() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit())
        {
            is_float = true;
            self.advance_char();
            while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                self.advance_char();
            }
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(lookahead), Some('+') | Some('-')) {
                lookahead += 1;
            }
            if matches!(self.peek_at(lookahead), Some(c) if c.is_ascii_digit()) {
                is_float = true;
                self.advance_char();
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    self.advance_char();
                }
                while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                    self.advance_char();
                }
            }
        }
        let text = self.source[start..self.pos].to_string();
        let lexeme = if is_float {
            Lexeme::Float(text)
        } else {
            Lexeme::Int(text)
        };
        Spanned::new(lexeme, Span::new(self.file_id, start as u32, self.pos as u32))
    }

    fn scan_string(&mut self, start: usize) -> Spanned<Lexeme> {
        self.advance_char(); // opening quote
        let mut content = String::new();
        loop {
            match self.peek_char() {
                None => {
                    self.error("unterminated string literal".to_string(), start, self.pos);
                    return Spanned::new(
                        Lexeme::Str(content),
                        Span::new(self.file_id, start as u32, self.pos as u32),
                    );
                }
                Some('\n') => {
                    self.error(
                        "string literal contains a raw newline".to_string(),
                        start,
                        self.pos,
                    );
                    return Spanned::new(
                        Lexeme::Str(content),
                        Span::new(self.file_id, start as u32, self.pos as u32),
                    );
                }
                Some('"') => {
                    self.advance_char();
                    break;
                }
                Some(c) => {
                    content.push(c);
                    self.advance_char();
                }
            }
        }
        Spanned::new(
            Lexeme::Str(content),
            Span::new(self.file_id, start as u32, self.pos as u32),
        )
    }

    fn scan_symbol(&mut self, start: usize) -> Spanned<Lexeme> {
        for (prefix, sym) in TWO_CHAR_SYMBOLS {
            if self.source[self.pos..].starts_with(prefix) {
                self.pos += prefix.len();
                return Spanned::new(
                    Lexeme::Symbol(sym),
                    Span::new(self.file_id, start as u32, self.pos as u32),
                );
            }
        }
        let c = self.advance_char().expect("checked by caller");
        let sym: &'static str = match c {
            '+' => "+",
            '-' => "-",
            '*' => "*",
            '/' => "/",
            '%' => "%",
            '=' => "=",
            '<' => "<",
            '>' => ">",
            '!' => "!",
            '(' => "(",
            ')' => ")",
            '{' => "{",
            '}' => "}",
            ';' => ";",
            ',' => ",",
            other => {
                self.error(format!("unexpected character '{}'", other), start, self.pos);
                return self.next_token();
            }
        };
        Spanned::new(Lexeme::Symbol(sym), Span::new(self.file_id, start as u32, self.pos as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Lexeme> {
        let (toks, diags) = Lexer::new(src, 0).tokenize();
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
        toks.into_iter().map(|t| t.node).collect()
    }

    #[test]
    fn lexes_keywords_and_idents() {
        let toks = lex("func main() { return 0; }");
        assert_eq!(
            toks,
            vec![
                Lexeme::Keyword("func"),
                Lexeme::Ident("main".to_string()),
                Lexeme::Symbol("("),
                Lexeme::Symbol(")"),
                Lexeme::Symbol("{"),
                Lexeme::Keyword("return"),
                Lexeme::Int("0".to_string()),
                Lexeme::Symbol(";"),
                Lexeme::Symbol("}"),
                Lexeme::Eof,
            ]
        );
    }

    #[test]
    fn lexes_two_char_operators_atomically() {
        let toks = lex("a == b && c != d");
        assert!(toks.contains(&Lexeme::Symbol("==")));
        assert!(toks.contains(&Lexeme::Symbol("&&")));
        assert!(toks.contains(&Lexeme::Symbol("!=")));
    }

    #[test]
    fn lexes_float_with_exponent() {
        let toks = lex("1.5e10");
        assert_eq!(toks[0], Lexeme::Float("1.5e10".to_string()));
    }

    #[test]
    fn lexes_string_literal() {
        let toks = lex("\"hola, mundo\"");
        assert_eq!(toks[0], Lexeme::Str("hola, mundo".to_string()));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let toks = lex("# a comment\n1 /* block\ncomment */ 2");
        assert_eq!(toks[0], Lexeme::Int("1".to_string()));
        assert_eq!(toks[1], Lexeme::Int("2".to_string()));
    }

    #[test]
    fn unterminated_string_is_lexical_error() {
        let (_, diags) = Lexer::new("\"abc", 0).tokenize();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ErrorKind::Lexical);
    }

    #[test]
    fn newline_in_string_is_lexical_error() {
        let (_, diags) = Lexer::new("\"abc\ndef\"", 0).tokenize();
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn accepts_unicode_identifiers() {
        let toks = lex("café");
        assert_eq!(toks[0], Lexeme::Ident("café".to_string()));
    }
}
