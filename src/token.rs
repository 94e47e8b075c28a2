use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    Identifier(&'a str),
    Integer(i64),
    Float(f64),
    String(Cow<'a, str>),
    True,
    False,
    Null,

    // Keywords
    Print,
    If,
    Else,
    While,
    For,
    Def,
    Function,
    Method,
    Class,
    Return,
    Call,

    // Operators
    Assign,       // =
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Bang,         // !
    Less,         // <
    Greater,      // >
    EqualEqual,   // ==
    BangEqual,    // !=
    LessEqual,    // <=
    GreaterEqual, // >=
    AndAnd,       // &&
    OrOr,         // ||
    PlusPlus,     // ++
    MinusMinus,   // --
    Arrow,        // ->

    // Delimiters
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    Dot,       // .

    // Structural
    Newline,
    EOF,
}

impl TokenKind<'_> {
    pub fn keyword(ident: &str) -> Option<TokenKind<'static>> {
        let kind = match ident {
            "print" => TokenKind::Print,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "def" => TokenKind::Def,
            "function" => TokenKind::Function,
            "method" => TokenKind::Method,
            "class" => TokenKind::Class,
            "return" => TokenKind::Return,
            "call" => TokenKind::Call,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this token ends a simple statement.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::EOF
        )
    }
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenKind::Integer(value) => write!(f, "integer {value}"),
            TokenKind::Float(value) => write!(f, "float {value:?}"),
            TokenKind::String(value) => write!(f, "string \"{value}\""),
            TokenKind::True => f.write_str("'true'"),
            TokenKind::False => f.write_str("'false'"),
            TokenKind::Null => f.write_str("'null'"),
            TokenKind::Print => f.write_str("'print'"),
            TokenKind::If => f.write_str("'if'"),
            TokenKind::Else => f.write_str("'else'"),
            TokenKind::While => f.write_str("'while'"),
            TokenKind::For => f.write_str("'for'"),
            TokenKind::Def => f.write_str("'def'"),
            TokenKind::Function => f.write_str("'function'"),
            TokenKind::Method => f.write_str("'method'"),
            TokenKind::Class => f.write_str("'class'"),
            TokenKind::Return => f.write_str("'return'"),
            TokenKind::Call => f.write_str("'call'"),
            TokenKind::Assign => f.write_str("'='"),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Slash => f.write_str("'/'"),
            TokenKind::Bang => f.write_str("'!'"),
            TokenKind::Less => f.write_str("'<'"),
            TokenKind::Greater => f.write_str("'>'"),
            TokenKind::EqualEqual => f.write_str("'=='"),
            TokenKind::BangEqual => f.write_str("'!='"),
            TokenKind::LessEqual => f.write_str("'<='"),
            TokenKind::GreaterEqual => f.write_str("'>='"),
            TokenKind::AndAnd => f.write_str("'&&'"),
            TokenKind::OrOr => f.write_str("'||'"),
            TokenKind::PlusPlus => f.write_str("'++'"),
            TokenKind::MinusMinus => f.write_str("'--'"),
            TokenKind::Arrow => f.write_str("'->'"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Semicolon => f.write_str("';'"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::EOF => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn kind(&self) -> &TokenKind<'a> {
        &self.kind
    }

    pub fn line(&self) -> usize {
        self.span.line
    }
}
