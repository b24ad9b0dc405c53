//! Parser implementation for MiniJ
//!
//! A recursive descent parser that turns the token stream into a [`Program`].
//! Syntax errors are fatal: the first one aborts the parse.

use super::{
    error::ParseError,
    lexer::{Lexer, LexicalToken, Token},
};
use crate::ast::*;
use crate::consts::ENTRY_METHOD;
use crate::error::Result;

type PResult<T> = std::result::Result<T, ParseError>;

/// Parser for MiniJ
pub struct Parser {
    tokens: Vec<LexicalToken>,
    current: usize,
}

impl Parser {
    /// Create a new parser from source code
    pub fn new(source: &str) -> Result<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    pub fn from_tokens(tokens: Vec<LexicalToken>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse the source code into a program
    pub fn parse(mut self) -> Result<Program> {
        let program = self.parse_program()?;
        log::debug!(
            "parse complete: main={}, classes={}",
            program.main.name,
            program.classes.len()
        );
        Ok(program)
    }

    fn parse_program(&mut self) -> PResult<Program> {
        let main = self.parse_main_class()?;
        let mut classes = Vec::new();
        while !self.is_at_end() {
            classes.push(self.parse_class_decl()?);
        }
        Ok(Program { main, classes })
    }

    // Helper methods
    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&LexicalToken> {
        self.tokens.get(self.current)
    }

    fn peek_at(&self, offset: usize) -> Option<&LexicalToken> {
        self.tokens.get(self.current + offset)
    }

    fn check(&self, token_type: &Token) -> bool {
        self.peek().map_or(false, |t| t.is(token_type))
    }

    fn check_at(&self, offset: usize, token_type: &Token) -> bool {
        self.peek_at(offset).map_or(false, |t| t.is(token_type))
    }

    fn advance(&mut self) -> Option<&LexicalToken> {
        let token = self.tokens.get(self.current);
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    fn match_token(&mut self, token_type: &Token) -> bool {
        if self.check(token_type) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Location of the current token, or just past the last one at end of input
    fn location(&self) -> Location {
        match self.peek() {
            Some(token) => token.location,
            None => self.tokens.last().map(|t| t.location).unwrap_or(Location::new(1, 1, 0)),
        }
    }

    fn line(&self) -> usize {
        self.location().line
    }

    fn error_here(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::unexpected_token(expected, &format!("'{}'", token.lexeme), token.location),
            None => ParseError::unexpected_end_of_input(expected, self.location()),
        }
    }

    fn consume(&mut self, token_type: &Token, expected: &str) -> PResult<&LexicalToken> {
        if self.check(token_type) {
            let index = self.current;
            self.current += 1;
            Ok(&self.tokens[index])
        } else {
            Err(self.error_here(expected))
        }
    }

    fn consume_identifier(&mut self, expected: &str) -> PResult<Identifier> {
        let token = self.consume(&Token::Identifier, expected)?;
        Ok(Identifier::new(token.lexeme.clone(), token.location.line))
    }

    /// Consume an identifier whose text must be exactly `word`
    fn consume_word(&mut self, word: &str) -> PResult<()> {
        let found = self
            .peek()
            .map_or(false, |t| t.is(&Token::Identifier) && t.lexeme == word);
        if found {
            self.current += 1;
            Ok(())
        } else {
            Err(self.error_here(&format!("'{}'", word)))
        }
    }

    // Declarations

    fn parse_main_class(&mut self) -> PResult<MainClass> {
        self.match_token(&Token::Public);
        let line = self.line();
        self.consume(&Token::Class, "'class'")?;
        let name = self.consume_identifier("class name")?;
        self.consume(&Token::LBrace, "'{'")?;

        self.match_token(&Token::Public);
        self.consume(&Token::Static, "'static'")?;
        self.consume(&Token::Void, "'void'")?;
        self.consume_word(ENTRY_METHOD)?;
        self.consume(&Token::LParen, "'('")?;
        self.consume_word("String")?;
        self.consume(&Token::LBracket, "'['")?;
        self.consume(&Token::RBracket, "']'")?;
        let args = self.consume_identifier("parameter name")?;
        self.consume(&Token::RParen, "')'")?;
        self.consume(&Token::LBrace, "'{'")?;

        let vars = self.parse_var_decls()?;
        let body = self.parse_statements_until_brace()?;
        self.consume(&Token::RBrace, "'}'")?;
        self.consume(&Token::RBrace, "'}'")?;

        Ok(MainClass { name, args, vars, body, line })
    }

    fn parse_class_decl(&mut self) -> PResult<ClassDecl> {
        self.match_token(&Token::Public);
        let line = self.line();
        self.consume(&Token::Class, "'class'")?;
        let name = self.consume_identifier("class name")?;
        let parent = if self.match_token(&Token::Extends) {
            Some(self.consume_identifier("superclass name")?)
        } else {
            None
        };
        self.consume(&Token::LBrace, "'{'")?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            if self.is_method_start() {
                methods.push(self.parse_method_decl()?);
            } else if methods.is_empty() {
                fields.push(self.parse_var_decl()?);
            } else {
                return Err(self.error_here("method declaration"));
            }
        }
        self.consume(&Token::RBrace, "'}'")?;

        Ok(ClassDecl { name, parent, fields, methods, line })
    }

    /// Number of tokens the type starting `offset` tokens ahead spans
    fn type_len_at(&self, offset: usize) -> Option<usize> {
        if self.check_at(offset, &Token::Int) {
            if self.check_at(offset + 1, &Token::LBracket) && self.check_at(offset + 2, &Token::RBracket) {
                Some(3)
            } else {
                Some(1)
            }
        } else if self.check_at(offset, &Token::Identifier) {
            Some(1)
        } else {
            None
        }
    }

    fn is_method_start(&self) -> bool {
        if self.check(&Token::Public) {
            return true;
        }
        match self.type_len_at(0) {
            Some(len) => self.check_at(len, &Token::Identifier) && self.check_at(len + 1, &Token::LParen),
            None => false,
        }
    }

    fn is_var_decl_start(&self) -> bool {
        match self.type_len_at(0) {
            Some(len) => self.check_at(len, &Token::Identifier),
            None => false,
        }
    }

    fn parse_type(&mut self) -> PResult<Type> {
        if self.match_token(&Token::Int) {
            if self.match_token(&Token::LBracket) {
                self.consume(&Token::RBracket, "']'")?;
                Ok(Type::IntArray)
            } else {
                Ok(Type::Int)
            }
        } else if self.check(&Token::Identifier) {
            let name = self.consume_identifier("type")?;
            Ok(Type::Class(name.name))
        } else {
            Err(self.error_here("type"))
        }
    }

    fn parse_var_decls(&mut self) -> PResult<Vec<VarDecl>> {
        let mut vars = Vec::new();
        while self.is_var_decl_start() {
            vars.push(self.parse_var_decl()?);
        }
        Ok(vars)
    }

    fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let line = self.line();
        let ty = self.parse_type()?;
        let name = self.consume_identifier("variable name")?;
        let init = if self.match_token(&Token::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume(&Token::Semicolon, "';'")?;
        Ok(VarDecl { ty, name, init, line })
    }

    fn parse_method_decl(&mut self) -> PResult<MethodDecl> {
        self.match_token(&Token::Public);
        let line = self.line();
        let return_type = self.parse_type()?;
        let name = self.consume_identifier("method name")?;
        self.consume(&Token::LParen, "'('")?;

        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let param_line = self.line();
                let ty = self.parse_type()?;
                let param_name = self.consume_identifier("parameter name")?;
                params.push(Param { ty, name: param_name, line: param_line });
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RParen, "')'")?;
        self.consume(&Token::LBrace, "'{'")?;

        let vars = self.parse_var_decls()?;
        let mut body = Vec::new();
        while !self.check(&Token::Return) {
            if self.is_at_end() || self.check(&Token::RBrace) {
                return Err(self.error_here("'return'"));
            }
            body.push(self.parse_statement()?);
        }
        self.consume(&Token::Return, "'return'")?;
        let return_expr = self.parse_expression()?;
        self.consume(&Token::Semicolon, "';'")?;
        self.consume(&Token::RBrace, "'}'")?;

        Ok(MethodDecl { return_type, name, params, vars, body, return_expr, line })
    }

    // Statements

    fn parse_statements_until_brace(&mut self) -> PResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(self.error_here("'}'"));
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let line = self.line();
        let token = match self.peek() {
            Some(token) => token.token.clone(),
            None => return Err(self.error_here("statement")),
        };

        match token {
            Token::LBrace => {
                self.advance();
                let statements = self.parse_statements_until_brace()?;
                self.consume(&Token::RBrace, "'}'")?;
                Ok(Stmt::Block(BlockStmt { statements, line }))
            }
            Token::If => {
                self.advance();
                self.consume(&Token::LParen, "'('")?;
                let condition = self.parse_expression()?;
                self.consume(&Token::RParen, "')'")?;
                let then_branch = Box::new(self.parse_statement()?);
                let else_branch = if self.match_token(&Token::Else) {
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };
                Ok(Stmt::If(IfStmt { condition, then_branch, else_branch, line }))
            }
            Token::While => {
                self.advance();
                self.consume(&Token::LParen, "'('")?;
                let condition = self.parse_expression()?;
                self.consume(&Token::RParen, "')'")?;
                let body = Box::new(self.parse_statement()?);
                Ok(Stmt::While(WhileStmt { condition, body, line }))
            }
            Token::Println => {
                self.advance();
                self.consume(&Token::LParen, "'('")?;
                let value = self.parse_expression()?;
                self.consume(&Token::RParen, "')'")?;
                self.consume(&Token::Semicolon, "';'")?;
                Ok(Stmt::Print(PrintStmt { value, line }))
            }
            Token::Identifier => {
                let target = self.consume_identifier("identifier")?;
                if self.match_token(&Token::LBracket) {
                    let index = self.parse_expression()?;
                    self.consume(&Token::RBracket, "']'")?;
                    self.consume(&Token::Assign, "'='")?;
                    let value = self.parse_expression()?;
                    self.consume(&Token::Semicolon, "';'")?;
                    Ok(Stmt::ArrayAssign(ArrayAssignStmt { target, index, value, line }))
                } else {
                    self.consume(&Token::Assign, "'=' or '['")?;
                    let value = self.parse_expression()?;
                    self.consume(&Token::Semicolon, "';'")?;
                    Ok(Stmt::Assign(AssignStmt { target, value, line }))
                }
            }
            _ => Err(self.error_here("statement")),
        }
    }

    // Expressions, lowest precedence first

    fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_logical_or()
    }

    fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
        let line = left.line();
        Expr::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            line,
        })
    }

    fn parse_logical_or(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_logical_and()?;
        while self.match_token(&Token::PipePipe) {
            let right = self.parse_logical_and()?;
            expr = Self::binary(expr, BinaryOp::Or, right);
        }
        Ok(expr)
    }

    fn parse_logical_and(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_equality()?;
        while self.match_token(&Token::AndAnd) {
            let right = self.parse_equality()?;
            expr = Self::binary(expr, BinaryOp::And, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_relational()?;
        loop {
            let operator = if self.match_token(&Token::EqEq) {
                BinaryOp::Eq
            } else if self.match_token(&Token::Ne) {
                BinaryOp::Ne
            } else {
                break;
            };
            let right = self.parse_relational()?;
            expr = Self::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_additive()?;
        loop {
            let operator = if self.match_token(&Token::Lt) {
                BinaryOp::Lt
            } else if self.match_token(&Token::Gt) {
                BinaryOp::Gt
            } else {
                break;
            };
            let right = self.parse_additive()?;
            expr = Self::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let operator = if self.match_token(&Token::Plus) {
                BinaryOp::Add
            } else if self.match_token(&Token::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            expr = Self::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_postfix()?;
        loop {
            let operator = if self.match_token(&Token::Star) {
                BinaryOp::Mul
            } else if self.match_token(&Token::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let right = self.parse_postfix()?;
            expr = Self::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.match_token(&Token::LBracket) {
                let line = expr.line();
                let index = self.parse_expression()?;
                self.consume(&Token::RBracket, "']'")?;
                expr = Expr::ArrayLookup(ArrayLookupExpr {
                    array: Box::new(expr),
                    index: Box::new(index),
                    line,
                });
            } else if self.match_token(&Token::Dot) {
                let line = expr.line();
                if self.match_token(&Token::Length) {
                    expr = Expr::ArrayLength(ArrayLengthExpr { array: Box::new(expr), line });
                } else {
                    let method = self.consume_identifier("method name or 'length'")?;
                    self.consume(&Token::LParen, "'('")?;
                    let mut args = Vec::new();
                    if !self.check(&Token::RParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if !self.match_token(&Token::Comma) {
                                break;
                            }
                        }
                    }
                    self.consume(&Token::RParen, "')'")?;
                    expr = Expr::Call(CallExpr {
                        receiver: Box::new(expr),
                        method,
                        args,
                        line,
                    });
                }
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let (token, lexeme, location) = match self.peek() {
            Some(t) => (t.token.clone(), t.lexeme.clone(), t.location),
            None => return Err(self.error_here("expression")),
        };
        let line = location.line;

        match token {
            Token::IntegerLiteral => {
                self.advance();
                let value = lexeme.parse::<i32>().map_err(|_| {
                    ParseError::invalid_syntax(&format!("integer literal {} out of range", lexeme), location)
                })?;
                Ok(Expr::IntLiteral(IntLiteral { value, line }))
            }
            Token::Identifier => {
                self.advance();
                Ok(Expr::Identifier(Identifier::new(lexeme, line)))
            }
            Token::This => {
                self.advance();
                Ok(Expr::This(ThisExpr { line }))
            }
            Token::New => {
                self.advance();
                if self.match_token(&Token::Int) {
                    self.consume(&Token::LBracket, "'['")?;
                    let size = self.parse_expression()?;
                    self.consume(&Token::RBracket, "']'")?;
                    Ok(Expr::NewArray(NewArrayExpr { size: Box::new(size), line }))
                } else {
                    let class = self.consume_identifier("class name")?;
                    self.consume(&Token::LParen, "'('")?;
                    self.consume(&Token::RParen, "')'")?;
                    Ok(Expr::NewObject(NewObjectExpr { class, line }))
                }
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(&Token::RParen, "')'")?;
                Ok(expr)
            }
            Token::Bang => Err(ParseError::invalid_syntax("operator '!' is not supported", location)),
            _ => Err(self.error_here("expression")),
        }
    }
}

/// Parse MiniJ source code into a program
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source)?.parse()
}
