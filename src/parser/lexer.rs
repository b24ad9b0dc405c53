use logos::Logos;

use super::error::ParseError;
use crate::ast::Location;

/// Token types for MiniJ
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token {
    // Keywords
    #[token("class")]
    Class,
    #[token("public")]
    Public,
    #[token("static")]
    Static,
    #[token("void")]
    Void,
    #[token("extends")]
    Extends,
    #[token("return")]
    Return,
    #[token("int")]
    Int,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("length")]
    Length,
    #[token("System.out.println")]
    Println,

    // Operators
    #[token("&&")]
    AndAnd,
    #[token("||")]
    PipePipe,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Assign,
    #[token("!")]
    Bang,

    // Separators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    // Literals
    #[regex(r"[0-9]+")]
    IntegerLiteral,

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // Comments and whitespace
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", priority = 2)]
    BlockComment,
    #[regex(r"[ \t\n\r\f]+", priority = 2)]
    Whitespace,
}

impl Token {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Class
                | Token::Public
                | Token::Static
                | Token::Void
                | Token::Extends
                | Token::Return
                | Token::Int
                | Token::If
                | Token::Else
                | Token::While
                | Token::New
                | Token::This
                | Token::Length
                | Token::Println
        )
    }

    /// Tokens dropped before parsing
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::LineComment | Token::BlockComment | Token::Whitespace)
    }
}

/// Lexical token with location information
#[derive(Debug, Clone)]
pub struct LexicalToken {
    pub token: Token,
    pub lexeme: String,
    pub location: Location,
}

impl LexicalToken {
    pub fn new(token: Token, lexeme: String, location: Location) -> Self {
        Self { token, lexeme, location }
    }

    pub fn token_type(&self) -> &Token {
        &self.token
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Check if this token matches the given token type
    pub fn is(&self, token_type: &Token) -> bool {
        std::mem::discriminant(&self.token) == std::mem::discriminant(token_type)
    }
}

/// Lexer for MiniJ
pub struct Lexer<'a> {
    lexer: logos::Lexer<'a, Token>,
    current_line: usize,
    current_column: usize,
    current_offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Token::lexer(source),
            current_line: 1,
            current_column: 1,
            current_offset: 0,
        }
    }

    /// Get the next token, trivia included
    pub fn next_token(&mut self) -> Option<Result<LexicalToken, ParseError>> {
        let token = self.lexer.next()?;
        let lexeme = self.lexer.slice().to_string();
        let location = Location::new(self.current_line, self.current_column, self.current_offset);
        self.update_position(&lexeme);

        match token {
            Ok(token) => Some(Ok(LexicalToken::new(token, lexeme, location))),
            Err(()) => Some(Err(ParseError::lexical_error(
                &format!("unexpected character sequence '{}'", lexeme),
                location,
            ))),
        }
    }

    fn update_position(&mut self, lexeme: &str) {
        for ch in lexeme.chars() {
            match ch {
                '\n' => {
                    self.current_line += 1;
                    self.current_column = 1;
                }
                '\r' => {}
                _ => self.current_column += 1,
            }
            self.current_offset += ch.len_utf8();
        }
    }

    /// Get all significant tokens from the source
    pub fn tokenize(mut self) -> Result<Vec<LexicalToken>, ParseError> {
        let mut tokens = Vec::new();

        while let Some(result) = self.next_token() {
            let token = result?;
            if !token.token.is_trivia() {
                tokens.push(token);
            }
        }

        Ok(tokens)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<LexicalToken, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .expect("Failed to tokenize")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_lexer_keywords() {
        assert_eq!(
            kinds("public class Fac extends Base"),
            vec![Token::Public, Token::Class, Token::Identifier, Token::Extends, Token::Identifier]
        );
    }

    #[test]
    fn test_lexer_print_is_one_token() {
        assert_eq!(
            kinds("System.out.println(1);"),
            vec![Token::Println, Token::LParen, Token::IntegerLiteral, Token::RParen, Token::Semicolon]
        );
    }

    #[test]
    fn test_lexer_identifier_prefixed_by_keyword() {
        let tokens = Lexer::new("intx length lengths").tokenize().unwrap();
        assert!(tokens[0].is(&Token::Identifier));
        assert_eq!(tokens[0].lexeme(), "intx");
        assert!(tokens[1].is(&Token::Length));
        assert!(tokens[2].is(&Token::Identifier));
    }

    #[test]
    fn test_lexer_operators() {
        assert_eq!(
            kinds("&& || < > == != + - * / = !"),
            vec![
                Token::AndAnd,
                Token::PipePipe,
                Token::Lt,
                Token::Gt,
                Token::EqEq,
                Token::Ne,
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Assign,
                Token::Bang,
            ]
        );
    }

    #[test]
    fn test_lexer_comments_are_dropped() {
        let source = "// line comment\nint /* block\n comment */ x;";
        assert_eq!(kinds(source), vec![Token::Int, Token::Identifier, Token::Semicolon]);
    }

    #[test]
    fn test_lexer_locations() {
        let tokens = Lexer::new("int x;\n  x = 1;").tokenize().unwrap();
        assert_eq!(tokens[0].location(), Location::new(1, 1, 0));
        assert_eq!(tokens[1].location().column, 5);
        assert_eq!(tokens[3].location().line, 2);
        assert_eq!(tokens[3].location().column, 3);
    }

    #[test]
    fn test_lexer_rejects_unknown_input() {
        let err = Lexer::new("int x = #;").tokenize().unwrap_err();
        match err {
            ParseError::LexicalError { location, .. } => {
                assert_eq!(location.line, 1);
                assert_eq!(location.column, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
