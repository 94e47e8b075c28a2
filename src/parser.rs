use crate::ast::{
    BinaryOperator, Block, ClassDef, DeclaredType, Expression, FunctionDef, Parameter, Program,
    Spanned, Statement, UnaryOperator,
};
use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::{ParseResult, SyntaxError};

/// Deepest combined nesting of expressions, unary operators and blocks the
/// parser accepts before giving up with [`SyntaxError::NestingTooDeep`].
pub const MAX_NESTING_DEPTH: usize = 128;

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    depth: usize,
    diagnostics: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if !matches!(tokens.last().map(Token::kind), Some(TokenKind::EOF)) {
            let span = tokens.last().map(|token| token.span).unwrap_or(Span {
                line: 1,
                ..Span::default()
            });
            tokens.push(Token::new(TokenKind::EOF, span));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.at(TokenKind::EOF) {
                break;
            }
            if let Some(statement) = self.parse_statement()? {
                statements.push(statement);
            }
        }
        Ok(Program {
            statements,
            diagnostics: self.diagnostics,
        })
    }

    /// Parses one statement. Returns `None` when a malformed definition was skipped.
    fn parse_statement(&mut self) -> ParseResult<Option<Spanned<Statement>>> {
        let line = self.line();
        let kind = self.current().kind.clone();
        let statement = match kind {
            TokenKind::Def | TokenKind::Function | TokenKind::Method => {
                let is_method = kind == TokenKind::Method;
                let definition = self.parse_function_def(is_method)?;
                return Ok(definition.map(|def| Spanned::new(Statement::FunctionDef(def), line)));
            }
            TokenKind::Class => {
                let class = self.parse_class()?;
                return Ok(class.map(|class| Spanned::new(Statement::ClassDef(class), line)));
            }
            TokenKind::If => return Ok(Some(Spanned::new(self.parse_if()?, line))),
            TokenKind::While => {
                self.advance();
                let condition = self.parse_expression()?;
                let body = self.parse_block()?;
                return Ok(Some(Spanned::new(
                    Statement::While { condition, body },
                    line,
                )));
            }
            TokenKind::For => {
                return Err(SyntaxError::Unsupported {
                    construct: "for",
                    line,
                });
            }
            TokenKind::Print => {
                self.advance();
                Statement::Print(self.parse_expression()?)
            }
            TokenKind::Call => {
                self.advance();
                let name = self.expect_identifier("function name")?.to_string();
                let args = self.parse_arguments()?;
                Statement::Call { name, args }
            }
            TokenKind::Return => {
                self.advance();
                if self.at_statement_end() {
                    Statement::Return(None)
                } else {
                    Statement::Return(Some(self.parse_expression()?))
                }
            }
            TokenKind::Identifier(_) => match (self.peek_kind(1), self.peek_kind(2)) {
                (TokenKind::Identifier(_), TokenKind::Assign) => self.parse_declaration()?,
                (TokenKind::Assign, _) => self.parse_assignment()?,
                (TokenKind::PlusPlus | TokenKind::MinusMinus, _) => self.parse_increment()?,
                _ => Statement::Expr(self.parse_expression()?),
            },
            _ => Statement::Expr(self.parse_expression()?),
        };
        self.expect_statement_end()?;
        Ok(Some(Spanned::new(statement, line)))
    }

    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        let line = self.line();
        let type_name = self.expect_identifier("type name")?;
        let name = self.expect_identifier("variable name")?.to_string();
        let declared = DeclaredType::from_name(type_name).ok_or_else(|| {
            SyntaxError::UnknownType {
                name: type_name.to_string(),
                line,
            }
        })?;
        if declared == DeclaredType::Void {
            return Err(SyntaxError::VoidVariable { name, line });
        }
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        Ok(Statement::Assign {
            name,
            declared: Some(declared),
            value,
        })
    }

    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        let name = self.expect_identifier("variable name")?.to_string();
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        Ok(Statement::Assign {
            name,
            declared: None,
            value,
        })
    }

    /// `x++` and `x--` desugar to `x = x + 1` and `x = x - 1`.
    fn parse_increment(&mut self) -> ParseResult<Statement> {
        let name = self.expect_identifier("variable name")?.to_string();
        let op = if self.at(TokenKind::PlusPlus) {
            BinaryOperator::Add
        } else {
            BinaryOperator::Sub
        };
        self.advance();
        Ok(Statement::Assign {
            value: Expression::Binary {
                left: Box::new(Expression::Variable(name.clone())),
                op,
                right: Box::new(Expression::Integer(1)),
            },
            name,
            declared: None,
        })
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.advance(); // if
        let condition = self.parse_expression()?;
        let then_body = self.parse_block()?;

        if !self.else_follows() {
            return Ok(Statement::If {
                condition,
                then_body,
                else_body: None,
            });
        }
        self.skip_newlines();
        self.advance(); // else

        let else_body = if self.at(TokenKind::If) {
            let line = self.line();
            vec![Spanned::new(self.parse_if()?, line)]
        } else {
            self.parse_block()?
        };
        Ok(Statement::If {
            condition,
            then_body,
            else_body: Some(else_body),
        })
    }

    fn parse_function_def(&mut self, is_method: bool) -> ParseResult<Option<FunctionDef>> {
        let header_start = self.pos;
        let (name, params, return_type) = match self.parse_function_header() {
            Ok(header) => header,
            Err(error) => {
                self.diagnostics.push(error);
                self.skip_definition(header_start)?;
                return Ok(None);
            }
        };
        let body = self.parse_block()?;
        Ok(Some(FunctionDef {
            name,
            params,
            return_type,
            body,
            is_method,
        }))
    }

    /// `keyword name ( p : type , ... ) -> type`, stopping in front of the `{`.
    fn parse_function_header(&mut self) -> ParseResult<(String, Vec<Parameter>, DeclaredType)> {
        self.advance(); // def | function | method
        let name = self.expect_identifier("function name")?.to_string();
        self.expect(TokenKind::LParen, "'('")?;

        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let line = self.line();
                let param = self.expect_identifier("parameter name")?.to_string();
                if !self.at(TokenKind::Colon) {
                    return Err(SyntaxError::MissingParameterType { param, line });
                }
                self.advance();
                let declared = self.expect_type()?;
                params.push(Parameter {
                    name: param,
                    declared,
                });
                if self.at(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        if !self.at(TokenKind::Arrow) {
            return Err(SyntaxError::MissingReturnType {
                name,
                line: self.line(),
            });
        }
        self.advance();
        let return_type = self.expect_type()?;
        if !self.at(TokenKind::LBrace) {
            return Err(self.error("'{'"));
        }
        Ok((name, params, return_type))
    }

    fn parse_class(&mut self) -> ParseResult<Option<ClassDef>> {
        let header_start = self.pos;
        self.advance(); // class
        let name = match self.expect_identifier("class name") {
            Ok(name) => name.to_string(),
            Err(error) => {
                self.diagnostics.push(error);
                self.skip_definition(header_start)?;
                return Ok(None);
            }
        };
        if !self.at(TokenKind::LBrace) {
            let error = self.error("'{'");
            self.diagnostics.push(error);
            self.skip_definition(header_start)?;
            return Ok(None);
        }

        let open_line = self.line();
        self.advance();
        let mut methods = Vec::new();
        loop {
            self.skip_separators();
            let kind = self.current().kind.clone();
            match kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::EOF => return Err(SyntaxError::UnterminatedBlock { line: open_line }),
                TokenKind::Method | TokenKind::Function | TokenKind::Def => {
                    if let Some(method) = self.parse_function_def(true)? {
                        methods.push(method);
                    }
                }
                // Only method headers matter inside a class body.
                _ => self.skip_class_statement(open_line)?,
            }
        }
        Ok(Some(ClassDef { name, methods }))
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let open_line = self.line();
        self.expect(TokenKind::LBrace, "'{'")?;
        self.nested(|parser| {
            let mut body = Vec::new();
            loop {
                parser.skip_separators();
                if parser.at(TokenKind::RBrace) {
                    parser.advance();
                    return Ok(body);
                }
                if parser.at(TokenKind::EOF) {
                    return Err(SyntaxError::UnterminatedBlock { line: open_line });
                }
                if let Some(statement) = parser.parse_statement()? {
                    body.push(statement);
                }
            }
        })
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.nested(|parser| parser.parse_binary(1))
    }

    /// Precedence climbing: the right operand of a level-P operator is parsed
    /// at P + 1, which makes every binary operator left-associative.
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;
        while let Some(op) = binary_operator(&self.current().kind) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let op = match self.current().kind {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::MinusMinus => {
                self.advance();
                let operand = self.nested(Self::parse_unary)?;
                return Ok(negate(negate(operand)));
            }
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let kind = self.current().kind.clone();
        let expr = match kind {
            TokenKind::Integer(value) => Expression::Integer(value),
            TokenKind::Float(value) => Expression::Float(value),
            TokenKind::String(value) => Expression::String(value.into_owned()),
            TokenKind::True => Expression::Boolean(true),
            TokenKind::False => Expression::Boolean(false),
            TokenKind::Null => Expression::Null,
            TokenKind::Identifier(name) => {
                self.advance();
                if self.at(TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    return Ok(Expression::Call {
                        name: name.to_string(),
                        args,
                    });
                }
                return Ok(Expression::Variable(name.to_string()));
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                return Ok(expr);
            }
            _ => return Err(self.error("expression")),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if self.at(TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.at(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    /// Skips a malformed definition starting at `header_start`: the brace-balanced
    /// body when the header line opens one, otherwise just the header line.
    fn skip_definition(&mut self, header_start: usize) -> ParseResult<()> {
        self.pos = header_start;
        while !matches!(
            self.current().kind,
            TokenKind::LBrace | TokenKind::Newline | TokenKind::EOF
        ) {
            self.advance();
        }
        if !self.at(TokenKind::LBrace) {
            return Ok(());
        }

        let open_line = self.line();
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                TokenKind::EOF => return Err(SyntaxError::UnterminatedBlock { line: open_line }),
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips one non-method statement inside a class body, leaving a closing
    /// `}` of the class in place.
    fn skip_class_statement(&mut self, open_line: usize) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace if depth == 0 => return Ok(()),
                TokenKind::RBrace => depth -= 1,
                TokenKind::Newline | TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::EOF => return Err(SyntaxError::UnterminatedBlock { line: open_line }),
                _ => {}
            }
            self.advance();
        }
    }

    fn else_follows(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .find(|token| token.kind != TokenKind::Newline)
            .is_some_and(|token| token.kind == TokenKind::Else)
    }

    fn at_statement_end(&self) -> bool {
        let kind = &self.current().kind;
        kind.is_terminator() || *kind == TokenKind::RBrace
    }

    fn expect_statement_end(&mut self) -> ParseResult<()> {
        match self.current().kind {
            TokenKind::Newline | TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::EOF | TokenKind::RBrace => Ok(()),
            _ => Err(self.error("end of statement")),
        }
    }

    fn skip_separators(&mut self) {
        while matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<&'a str> {
        if let TokenKind::Identifier(name) = self.current().kind {
            self.advance();
            Ok(name)
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_type(&mut self) -> ParseResult<DeclaredType> {
        let line = self.line();
        let name = self.expect_identifier("type name")?;
        DeclaredType::from_name(name).ok_or_else(|| SyntaxError::UnknownType {
            name: name.to_string(),
            line,
        })
    }

    fn expect(&mut self, kind: TokenKind<'_>, expected: &str) -> ParseResult<()> {
        if self.at(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    /// Runs `parse` one nesting level deeper; the level is released whether
    /// or not it succeeds.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                line: self.line(),
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn at(&self, kind: TokenKind<'_>) -> bool {
        self.current().kind == kind
    }

    fn current(&self) -> &Token<'a> {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind<'a> {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn line(&self) -> usize {
        self.current().line()
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn error(&self, expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current().kind.to_string(),
            line: self.line(),
        }
    }
}

fn binary_operator(kind: &TokenKind<'_>) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::OrOr => BinaryOperator::Or,
        TokenKind::AndAnd => BinaryOperator::And,
        TokenKind::EqualEqual => BinaryOperator::Equal,
        TokenKind::BangEqual => BinaryOperator::NotEqual,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEqual => BinaryOperator::LessEqual,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        _ => return None,
    };
    Some(op)
}

fn negate(operand: Expression) -> Expression {
    Expression::Unary {
        op: UnaryOperator::Negate,
        operand: Box::new(operand),
    }
}

pub fn parse_tokens(tokens: Vec<Token<'_>>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse(input: &str) -> ParseResult<Program> {
        parse_tokens(tokenize(input).expect("tokenize should succeed"))
    }

    fn parse_expr(input: &str) -> Expression {
        let program = parse(input).expect("parse failed");
        match program.statements.into_iter().next().map(|s| s.node) {
            Some(Statement::Expr(expr)) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn nodes(program: Program) -> Vec<Statement> {
        program.statements.into_iter().map(|s| s.node).collect()
    }

    fn int(value: i64) -> Box<Expression> {
        Box::new(Expression::Integer(value))
    }

    fn var(name: &str) -> Box<Expression> {
        Box::new(Expression::Variable(name.to_string()))
    }

    fn binary(left: Box<Expression>, op: BinaryOperator, right: Box<Expression>) -> Box<Expression> {
        Box::new(Expression::Binary { left, op, right })
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse_expr("1 + 2 * 3"),
            *binary(int(1), BinaryOperator::Add, binary(int(2), BinaryOperator::Mul, int(3)))
        );
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(
            parse_expr("10 - 4 - 3"),
            *binary(binary(int(10), BinaryOperator::Sub, int(4)), BinaryOperator::Sub, int(3))
        );
        assert_eq!(
            parse_expr("8 / 4 / 2"),
            *binary(binary(int(8), BinaryOperator::Div, int(4)), BinaryOperator::Div, int(2))
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            parse_expr("(1 + 2) * 3"),
            *binary(binary(int(1), BinaryOperator::Add, int(2)), BinaryOperator::Mul, int(3))
        );
    }

    #[test]
    fn full_precedence_ladder() {
        // a || (b && (c == (d < (e + (f * g)))))
        let expected = binary(
            var("a"),
            BinaryOperator::Or,
            binary(
                var("b"),
                BinaryOperator::And,
                binary(
                    var("c"),
                    BinaryOperator::Equal,
                    binary(
                        var("d"),
                        BinaryOperator::Less,
                        binary(var("e"), BinaryOperator::Add, binary(var("f"), BinaryOperator::Mul, var("g"))),
                    ),
                ),
            ),
        );
        assert_eq!(parse_expr("a || b && c == d < e + f * g"), *expected);
    }

    #[test]
    fn unary_operators_bind_tightest_and_nest() {
        assert_eq!(
            parse_expr("-2 * 3"),
            *binary(
                Box::new(Expression::Unary {
                    op: UnaryOperator::Negate,
                    operand: int(2)
                }),
                BinaryOperator::Mul,
                int(3)
            )
        );
        assert_eq!(parse_expr("--x"), negate(negate(Expression::Variable("x".to_string()))));
        assert_eq!(
            parse_expr("!!flag"),
            Expression::Unary {
                op: UnaryOperator::Not,
                operand: Box::new(Expression::Unary {
                    op: UnaryOperator::Not,
                    operand: var("flag"),
                }),
            }
        );
    }

    #[test]
    fn parses_calls_in_expressions() {
        assert_eq!(
            parse_expr("add(1, x * 2) + f()"),
            *binary(
                Box::new(Expression::Call {
                    name: "add".to_string(),
                    args: vec![Expression::Integer(1), *binary(var("x"), BinaryOperator::Mul, int(2))],
                }),
                BinaryOperator::Add,
                Box::new(Expression::Call {
                    name: "f".to_string(),
                    args: vec![],
                })
            )
        );
    }

    #[test]
    fn parses_minimal_arithmetic_language() {
        let program = parse(indoc! {"
            x = 10
            y = x + 2 * 3
            print y
        "})
        .expect("parse failed");
        assert_eq!(
            nodes(program),
            vec![
                Statement::Assign {
                    name: "x".to_string(),
                    declared: None,
                    value: Expression::Integer(10),
                },
                Statement::Assign {
                    name: "y".to_string(),
                    declared: None,
                    value: *binary(var("x"), BinaryOperator::Add, binary(int(2), BinaryOperator::Mul, int(3))),
                },
                Statement::Print(Expression::Variable("y".to_string())),
            ]
        );
    }

    #[test]
    fn parses_typed_declarations_and_records_lines() {
        let program = parse(indoc! {"
            int a = 1
            // comment line
            string s = 'hi'; bool b = true
        "})
        .expect("parse failed");
        let lines = program.statements.iter().map(|s| s.line).collect::<Vec<_>>();
        assert_eq!(lines, vec![1, 3, 3]);
        assert_eq!(
            program.statements[1].node,
            Statement::Assign {
                name: "s".to_string(),
                declared: Some(DeclaredType::String),
                value: Expression::String("hi".to_string()),
            }
        );
    }

    #[test]
    fn rejects_unknown_and_void_declarations() {
        assert_eq!(
            parse("integer x = 5\n").expect_err("expected unknown type"),
            SyntaxError::UnknownType {
                name: "integer".to_string(),
                line: 1
            }
        );
        assert_eq!(
            parse("void x = 5\n").expect_err("expected void error"),
            SyntaxError::VoidVariable {
                name: "x".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn desugars_increment_and_decrement() {
        let program = parse("n++\nn--\n").expect("parse failed");
        assert_eq!(
            nodes(program),
            vec![
                Statement::Assign {
                    name: "n".to_string(),
                    declared: None,
                    value: *binary(var("n"), BinaryOperator::Add, int(1)),
                },
                Statement::Assign {
                    name: "n".to_string(),
                    declared: None,
                    value: *binary(var("n"), BinaryOperator::Sub, int(1)),
                },
            ]
        );
    }

    #[test]
    fn parses_single_line_function_and_call_statement() {
        let program = parse(indoc! {"
            function add(x: int, y: int) -> int { return x + y; }
            call add(5, 3)
        "})
        .expect("parse failed");

        assert_eq!(
            nodes(program),
            vec![
                Statement::FunctionDef(FunctionDef {
                    name: "add".to_string(),
                    params: vec![
                        Parameter {
                            name: "x".to_string(),
                            declared: DeclaredType::Int,
                        },
                        Parameter {
                            name: "y".to_string(),
                            declared: DeclaredType::Int,
                        },
                    ],
                    return_type: DeclaredType::Int,
                    body: vec![Spanned::new(
                        Statement::Return(Some(*binary(var("x"), BinaryOperator::Add, var("y")))),
                        1
                    )],
                    is_method: false,
                }),
                Statement::Call {
                    name: "add".to_string(),
                    args: vec![Expression::Integer(5), Expression::Integer(3)],
                },
            ]
        );
    }

    #[test]
    fn exposes_definition_headers() {
        let program = parse(indoc! {"
            def greet(name: string) -> void {
                print name
                return
            }
            method helper() -> float {
                return 1.5
            }
        "})
        .expect("parse failed");
        let signatures = program
            .functions()
            .map(|function| (function.signature(), function.is_method, function.body.len()))
            .collect::<Vec<_>>();
        assert_eq!(
            signatures,
            vec![
                ("greet(name: string) -> void".to_string(), false, 2),
                ("helper() -> float".to_string(), true, 1),
            ]
        );
    }

    #[test]
    fn skips_definition_with_unknown_parameter_type() {
        let program = parse(indoc! {"
            function bad(x: integer) -> int {
                return x
            }
            int y = 1
        "})
        .expect("parse failed");
        assert_eq!(
            program.diagnostics,
            vec![SyntaxError::UnknownType {
                name: "integer".to_string(),
                line: 1
            }]
        );
        assert_eq!(program.functions().count(), 0);
        assert_eq!(program.statements.len(), 1);
        assert_eq!(program.statements[0].line, 4);
    }

    #[test]
    fn skips_definition_without_return_type_or_parameter_type() {
        let program = parse(indoc! {"
            function noarrow(x: int) {
                return x
            }
            function untyped(x) -> int {
                return 1
            }
            function ok() -> int {
                return 2
            }
        "})
        .expect("parse failed");
        assert_eq!(
            program.diagnostics,
            vec![
                SyntaxError::MissingReturnType {
                    name: "noarrow".to_string(),
                    line: 1
                },
                SyntaxError::MissingParameterType {
                    param: "x".to_string(),
                    line: 4
                },
            ]
        );
        let names = program.functions().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["ok"]);
    }

    #[test]
    fn unterminated_block_is_fatal() {
        let err = parse(indoc! {"
            function f() -> int {
                return 1
        "})
        .expect_err("expected unterminated block");
        assert_eq!(err, SyntaxError::UnterminatedBlock { line: 1 });
    }

    #[test]
    fn collects_class_methods_and_ignores_other_statements() {
        let program = parse(indoc! {"
            class Point {
                int x = 0
                method area(w: float, h: float) -> float {
                    return w * h
                }
                if x { print x }
                method broken(w) -> int {
                    return 0
                }
                method name() -> string { return \"point\" }
            }
        "})
        .expect("parse failed");

        let classes = program.classes().collect::<Vec<_>>();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "Point");
        let methods = classes[0]
            .methods
            .iter()
            .map(FunctionDef::signature)
            .collect::<Vec<_>>();
        assert_eq!(
            methods,
            vec![
                "area(w: float, h: float) -> float".to_string(),
                "name() -> string".to_string(),
            ]
        );
        assert!(classes[0].methods.iter().all(|method| method.is_method));
        assert_eq!(program.diagnostics.len(), 1);
    }

    #[test]
    fn parses_if_else_chain_and_while() {
        let program = parse(indoc! {"
            if x < 1 {
                print x
            }
            else if x < 2 {
                print y
            } else {
                print z
            }
            while n > 0 { n-- }
        "})
        .expect("parse failed");
        let statements = nodes(program);
        assert_eq!(statements.len(), 2);

        let Statement::If {
            then_body,
            else_body: Some(else_body),
            ..
        } = &statements[0]
        else {
            panic!("expected if statement, got {:?}", statements[0]);
        };
        assert_eq!(then_body.len(), 1);
        assert!(matches!(
            &else_body[0].node,
            Statement::If {
                else_body: Some(_),
                ..
            }
        ));

        let Statement::While { condition, body } = &statements[1] else {
            panic!("expected while statement");
        };
        assert_eq!(*condition, *binary(var("n"), BinaryOperator::Greater, int(0)));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn reports_expected_and_found_tokens() {
        let err = parse("x = (1 + 2\n").expect_err("expected syntax error");
        assert_eq!(
            err,
            SyntaxError::UnexpectedToken {
                expected: "')'".to_string(),
                found: "newline".to_string(),
                line: 1
            }
        );

        let err = parse("print 1 2\n").expect_err("expected syntax error");
        assert!(err.to_string().contains("Expected end of statement, found integer 2"));
    }

    #[test]
    fn for_loops_are_rejected() {
        let err = parse("for i\n").expect_err("expected unsupported");
        assert_eq!(
            err,
            SyntaxError::Unsupported {
                construct: "for",
                line: 1
            }
        );
    }

    #[test]
    fn accepts_nesting_below_the_limit() {
        let depth = MAX_NESTING_DEPTH / 2;
        let source = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        let program = parse(&source).expect("parse failed");
        assert!(matches!(
            &program.statements[0].node,
            Statement::Assign { value: Expression::Integer(1), .. }
        ));
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let depth = 200_000;
        let parens = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        let negations = format!("x = {}1\n", "- ".repeat(depth));
        let nots = format!("\nb = {}true\n", "!".repeat(depth));

        for source in [parens, negations] {
            let err = parse(&source).expect_err("expected nesting error");
            assert_eq!(
                err,
                SyntaxError::NestingTooDeep {
                    limit: MAX_NESTING_DEPTH,
                    line: 1
                }
            );
        }
        let err = parse(&nots).expect_err("expected nesting error");
        assert_eq!(err.line(), 2);
        assert!(err.to_string().contains("nested more than 128 levels deep"));
    }

    #[test]
    fn deeply_nested_blocks_are_a_syntax_error() {
        let depth = MAX_NESTING_DEPTH + 1;
        let source = format!("{}print 1\n{}", "if true {\n".repeat(depth), "}\n".repeat(depth));
        let err = parse(&source).expect_err("expected nesting error");
        assert!(matches!(err, SyntaxError::NestingTooDeep { .. }));
    }
}
