//! Syntax tree shared by the parser and the evaluator.
//!
//! Nodes are built once by the parser and only read afterwards. Function and
//! class definitions keep their full header so later passes can re-walk them
//! without re-parsing.

use std::fmt;

/// Annotation accepted for variables, parameters and return values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Int,
    Float,
    String,
    Bool,
    Void,
}

impl DeclaredType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            "bool" => Some(Self::Bool),
            "void" => Some(Self::Void),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Variable(String),
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Call {
        name: String,
        args: Vec<Expression>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    /// Binding strength used by precedence climbing; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Equal | Self::NotEqual => 3,
            Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div => 6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div)
    }
}

/// A node paired with the source line it started on.
#[derive(Debug, PartialEq, Clone)]
pub struct Spanned<T> {
    pub node: T,
    pub line: usize,
}

impl<T> Spanned<T> {
    pub fn new(node: T, line: usize) -> Self {
        Self { node, line }
    }
}

pub type Block = Vec<Spanned<Statement>>;

#[derive(Debug, PartialEq, Clone)]
pub struct Parameter {
    pub name: String,
    pub declared: DeclaredType,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: DeclaredType,
    pub body: Block,
    pub is_method: bool,
}

impl FunctionDef {
    /// Header rendering used in registration notices, e.g. `add(x: int) -> int`.
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|param| format!("{}: {}", param.name, param.declared))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({params}) -> {}", self.name, self.return_type)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassDef {
    pub name: String,
    pub methods: Vec<FunctionDef>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    /// `type name = value` when `declared` is set, plain `name = value` otherwise.
    Assign {
        name: String,
        declared: Option<DeclaredType>,
        value: Expression,
    },
    Print(Expression),
    /// The `call name(args)` statement, which reports non-void results.
    Call {
        name: String,
        args: Vec<Expression>,
    },
    If {
        condition: Expression,
        then_body: Block,
        else_body: Option<Block>,
    },
    While {
        condition: Expression,
        body: Block,
    },
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Return(Option<Expression>),
    Expr(Expression),
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Block,
    /// Malformed definition headers that were skipped during parsing.
    pub diagnostics: Vec<crate::parser::SyntaxError>,
}

impl Program {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.statements.iter().filter_map(|statement| match &statement.node {
            Statement::FunctionDef(function) => Some(function),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.statements.iter().filter_map(|statement| match &statement.node {
            Statement::ClassDef(class) => Some(class),
            _ => None,
        })
    }
}
