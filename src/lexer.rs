use std::borrow::Cow;
use std::{iter::Peekable, str::CharIndices};

use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::{LexError, LexResult};

/// Two-character operators, tried before the single-character table.
const MULTI_CHAR_OPERATORS: [(&str, TokenKind<'static>); 9] = [
    ("==", TokenKind::EqualEqual),
    ("!=", TokenKind::BangEqual),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("->", TokenKind::Arrow),
];

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 0,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        self.skip_whitespace_and_comments();

        let (start_idx, ch) = match self.chars.peek() {
            Some(&(idx, c)) => (idx, c),
            None => {
                let index = self.input.len();
                return Ok(Token::new(
                    TokenKind::EOF,
                    Span {
                        start: index,
                        end: index,
                        line: self.line,
                        column: self.column,
                    },
                ));
            }
        };

        let start_line = self.line;
        let start_column = self.column;
        let span = |len: usize| Span {
            start: start_idx,
            end: start_idx + len,
            line: start_line,
            column: start_column,
        };

        let rest = &self.input[start_idx..];
        for (text, kind) in &MULTI_CHAR_OPERATORS {
            if rest.starts_with(text) {
                self.advance_char();
                self.advance_char();
                return Ok(Token::new(kind.clone(), span(2)));
            }
        }

        let single = match ch {
            '\n' => Some(TokenKind::Newline),
            '=' => Some(TokenKind::Assign),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '!' => Some(TokenKind::Bang),
            '<' => Some(TokenKind::Less),
            '>' => Some(TokenKind::Greater),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            ';' => Some(TokenKind::Semicolon),
            '.' => Some(TokenKind::Dot),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance_char();
            return Ok(Token::new(kind, span(1)));
        }

        match ch {
            '"' | '\'' => self.read_string(ch, start_idx, start_line, start_column),
            c if c.is_alphabetic() || c == '_' => {
                Ok(self.read_identifier(start_idx, start_line, start_column))
            }
            c if c.is_ascii_digit() => self.read_number(start_idx, start_line, start_column),
            _ => Err(LexError::UnexpectedCharacter {
                character: ch,
                line: start_line,
                column: start_column,
            }),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.chars.peek() {
                Some(&(_, ' ' | '\t' | '\r')) => {
                    self.advance_char();
                }
                Some(&(idx, '/')) if self.input[idx..].starts_with("//") => {
                    // The newline itself still terminates the statement.
                    while let Some(&(_, c)) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first char
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let ident = &self.input[start..end_idx];
        let kind = TokenKind::keyword(ident).unwrap_or(TokenKind::Identifier(ident));
        Token::new(
            kind,
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        )
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        let mut seen_dot = false;
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.advance_char();
            } else if c == '.' {
                while let Some(&(_, c)) = self.chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        self.advance_char();
                    } else {
                        break;
                    }
                }
                let end_idx = self.current_index();
                return Err(LexError::MalformedNumber {
                    literal: self.input[start..end_idx].to_string(),
                    line,
                });
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let literal = &self.input[start..end_idx];
        let kind = if seen_dot {
            literal.parse::<f64>().map(TokenKind::Float).ok()
        } else {
            literal.parse::<i64>().map(TokenKind::Integer).ok()
        }
        .ok_or_else(|| LexError::InvalidNumber {
            literal: literal.to_string(),
            line,
        })?;

        Ok(Token::new(
            kind,
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        ))
    }

    fn read_string(
        &mut self,
        quote: char,
        start: usize,
        line: usize,
        column: usize,
    ) -> LexResult<Token<'a>> {
        let input = self.input;
        self.advance_char(); // Consume opening quote
        let content_start = start + quote.len_utf8();
        // Stays borrowed until the first escape forces an owned copy.
        let mut owned: Option<String> = None;

        while let Some((idx, c)) = self.advance_char() {
            if c == quote {
                let value = match owned {
                    Some(text) => Cow::Owned(text),
                    None => Cow::Borrowed(&input[content_start..idx]),
                };
                return Ok(Token::new(
                    TokenKind::String(value),
                    Span {
                        start,
                        end: idx + c.len_utf8(),
                        line,
                        column,
                    },
                ));
            }

            if c == '\\' {
                let text = owned.get_or_insert_with(|| input[content_start..idx].to_string());
                let Some((_, escaped)) = self.advance_char() else {
                    break;
                };
                match escaped {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    '\\' | '"' | '\'' => text.push(escaped),
                    other => {
                        text.push('\\');
                        text.push(other);
                    }
                }
                continue;
            }

            if let Some(text) = owned.as_mut() {
                text.push(c);
            }
        }

        Err(LexError::UnterminatedString { line })
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

pub fn tokenize<'a>(input: &'a str) -> LexResult<Vec<Token<'a>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::EOF);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        tokenize(input)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn tokenizes_simple_assignment() {
        assert_eq!(
            kinds("x = 10\n"),
            vec![
                TokenKind::Identifier("x"),
                TokenKind::Assign,
                TokenKind::Integer(10),
                TokenKind::Newline,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn test_function_program() {
        let input = indoc! {"
            function add(x: int, y: int) -> int {
                return x + y;
            }
            call add(5, 3)
        "};
        let expected_tokens = vec![
            TokenKind::Function,
            TokenKind::Identifier("add"),
            TokenKind::LParen,
            TokenKind::Identifier("x"),
            TokenKind::Colon,
            TokenKind::Identifier("int"),
            TokenKind::Comma,
            TokenKind::Identifier("y"),
            TokenKind::Colon,
            TokenKind::Identifier("int"),
            TokenKind::RParen,
            TokenKind::Arrow,
            TokenKind::Identifier("int"),
            TokenKind::LBrace,
            TokenKind::Newline,
            TokenKind::Return,
            TokenKind::Identifier("x"),
            TokenKind::Plus,
            TokenKind::Identifier("y"),
            TokenKind::Semicolon,
            TokenKind::Newline,
            TokenKind::RBrace,
            TokenKind::Newline,
            TokenKind::Call,
            TokenKind::Identifier("add"),
            TokenKind::LParen,
            TokenKind::Integer(5),
            TokenKind::Comma,
            TokenKind::Integer(3),
            TokenKind::RParen,
            TokenKind::Newline,
            TokenKind::EOF,
        ];
        assert_eq!(kinds(input), expected_tokens);
    }

    #[test]
    fn prefers_longest_operator() {
        assert_eq!(
            kinds("a <= b == c != d >= e && f || !g -> --h++"),
            vec![
                TokenKind::Identifier("a"),
                TokenKind::LessEqual,
                TokenKind::Identifier("b"),
                TokenKind::EqualEqual,
                TokenKind::Identifier("c"),
                TokenKind::BangEqual,
                TokenKind::Identifier("d"),
                TokenKind::GreaterEqual,
                TokenKind::Identifier("e"),
                TokenKind::AndAnd,
                TokenKind::Identifier("f"),
                TokenKind::OrOr,
                TokenKind::Bang,
                TokenKind::Identifier("g"),
                TokenKind::Arrow,
                TokenKind::MinusMinus,
                TokenKind::Identifier("h"),
                TokenKind::PlusPlus,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn reads_integer_and_float_literals() {
        assert_eq!(
            kinds("7 3.25 10."),
            vec![
                TokenKind::Integer(7),
                TokenKind::Float(3.25),
                TokenKind::Float(10.0),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn errors_on_second_decimal_point() {
        let err = tokenize("x = 1.2.3\n").expect_err("expected malformed number");
        assert_eq!(
            err,
            LexError::MalformedNumber {
                literal: "1.2.3".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn processes_string_escapes() {
        let tokens = kinds(r#"'it\'s' "a\tb\n" "q\"x" "back\\slash" "\d""#);
        assert_eq!(
            tokens,
            vec![
                TokenKind::String(Cow::Borrowed("it's")),
                TokenKind::String(Cow::Borrowed("a\tb\n")),
                TokenKind::String(Cow::Borrowed("q\"x")),
                TokenKind::String(Cow::Borrowed("back\\slash")),
                TokenKind::String(Cow::Borrowed("\\d")),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn maps_keywords_and_keeps_type_names_as_identifiers() {
        assert_eq!(
            kinds("print if else while for def method class return call true false null float"),
            vec![
                TokenKind::Print,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::For,
                TokenKind::Def,
                TokenKind::Method,
                TokenKind::Class,
                TokenKind::Return,
                TokenKind::Call,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Identifier("float"),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn drops_line_comments_but_keeps_newline() {
        assert_eq!(
            kinds("x = 1 // set x\n// whole line\ny = \"a // b\""),
            vec![
                TokenKind::Identifier("x"),
                TokenKind::Assign,
                TokenKind::Integer(1),
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Identifier("y"),
                TokenKind::Assign,
                TokenKind::String(Cow::Borrowed("a // b")),
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens = tokenize("a\n\nb = 2\n").expect("tokenize should succeed");
        let b = tokens
            .iter()
            .find(|token| token.kind == TokenKind::Identifier("b"))
            .expect("b token");
        assert_eq!(b.line(), 3);
        assert_eq!(tokens.last().map(Token::line), Some(4));
    }

    #[test]
    fn errors_on_invalid_character() {
        let err = tokenize("x = 1 @ 2\n").expect_err("expected lexing failure");
        assert!(err.to_string().contains("Unexpected character '@'"));
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn errors_on_unterminated_string() {
        let err = tokenize("x = 1\ns = \"open\n").expect_err("expected unterminated string");
        assert_eq!(err, LexError::UnterminatedString { line: 2 });
    }

    #[test]
    fn errors_on_integer_overflow() {
        let err = tokenize("n = 99999999999999999999999999\n").expect_err("expected overflow");
        assert!(err.to_string().contains("Invalid number literal"));
    }
}
