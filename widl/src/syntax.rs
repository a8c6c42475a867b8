use std::fmt;

use crate::builtins::MULTI_WORD_TYPES;
use crate::error::IdlError;
use crate::idl_type::{IdlType, UnionType};

/// A lexical token of the fragment grammar.
///
/// Multi-word primitive names (`unsigned long long`) are merged into a
/// single identifier token by the tokenizer, so the parsers never deal with
/// them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Identifier(String),
    StringLit(String),
    Integer(i64),
    Float(f64),
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Less,
    Greater,
    Comma,
    Semicolon,
    Colon,
    Question,
    Equals,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "`{name}`"),
            Self::StringLit(value) => write!(f, "{value:?}"),
            Self::Integer(value) => write!(f, "`{value}`"),
            Self::Float(value) => write!(f, "`{value}`"),
            Self::LeftParen => f.write_str("`(`"),
            Self::RightParen => f.write_str("`)`"),
            Self::LeftBrace => f.write_str("`{`"),
            Self::RightBrace => f.write_str("`}`"),
            Self::LeftBracket => f.write_str("`[`"),
            Self::RightBracket => f.write_str("`]`"),
            Self::Less => f.write_str("`<`"),
            Self::Greater => f.write_str("`>`"),
            Self::Comma => f.write_str("`,`"),
            Self::Semicolon => f.write_str("`;`"),
            Self::Colon => f.write_str("`:`"),
            Self::Question => f.write_str("`?`"),
            Self::Equals => f.write_str("`=`"),
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace and `//` / `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            if self.peek_char().is_some_and(char::is_whitespace) {
                self.bump();
            } else if self.rest().starts_with("//") {
                while self.peek_char().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else if self.rest().starts_with("/*") {
                self.pos += 2;
                while !self.rest().starts_with("*/") && self.peek_char().is_some() {
                    self.bump();
                }
                self.pos = (self.pos + 2).min(self.source.len());
            } else {
                return;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let start = self.pos;
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        self.source[start..self.pos].to_string()
    }

    fn read_identifier(&mut self) -> Token {
        let mut word = self.read_word();
        // Greedily extend to the longest known multi-word primitive name.
        // Every longer spelling has a shorter spelling as an exact prefix
        // ("unsigned long" before "unsigned long long"), so extending one
        // exact match at a time is sufficient.
        loop {
            let mark = self.pos;
            self.skip_trivia();
            if !self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
                self.pos = mark;
                break;
            }
            let next = self.read_word();
            let candidate = format!("{word} {next}");
            if MULTI_WORD_TYPES.contains(&candidate.as_str()) {
                word = candidate;
            } else {
                self.pos = mark;
                break;
            }
        }
        Token::Identifier(word)
    }

    fn read_string(&mut self) -> Result<Token, IdlError> {
        // Opening quote already consumed by the caller. Enumeration values
        // and dictionary defaults do not use escapes, so none are handled.
        let start = self.pos;
        while self.peek_char().is_some_and(|c| c != '"') {
            self.bump();
        }
        if self.peek_char().is_none() {
            return Err(IdlError::UnexpectedEnd {
                context: "a string literal",
            });
        }
        let value = self.source[start..self.pos].to_string();
        self.bump();
        Ok(Token::StringLit(value))
    }

    fn read_number(&mut self) -> Result<Token, IdlError> {
        let start = self.pos;
        if self.peek_char() == Some('-') {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek_char() {
            match c {
                '0'..='9' => {
                    self.bump();
                }
                '.' | 'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek_char(), Some('+') | Some('-')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        let text = &self.source[start..self.pos];
        if is_float {
            text.parse()
                .map(Token::Float)
                .map_err(|_| IdlError::UnexpectedToken {
                    expected: "a number",
                    found: format!("`{text}`"),
                })
        } else {
            text.parse()
                .map(Token::Integer)
                .map_err(|_| IdlError::UnexpectedToken {
                    expected: "a number",
                    found: format!("`{text}`"),
                })
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, IdlError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let Some(c) = self.peek_char() else {
                return Ok(tokens);
            };
            let token = match c {
                'a'..='z' | 'A'..='Z' | '_' => self.read_identifier(),
                '0'..='9' | '-' => self.read_number()?,
                '"' => {
                    self.bump();
                    self.read_string()?
                }
                _ => {
                    self.bump();
                    match c {
                        '(' => Token::LeftParen,
                        ')' => Token::RightParen,
                        '{' => Token::LeftBrace,
                        '}' => Token::RightBrace,
                        '[' => Token::LeftBracket,
                        ']' => Token::RightBracket,
                        '<' => Token::Less,
                        '>' => Token::Greater,
                        ',' => Token::Comma,
                        ';' => Token::Semicolon,
                        ':' => Token::Colon,
                        '?' => Token::Question,
                        '=' => Token::Equals,
                        other => {
                            return Err(IdlError::UnexpectedToken {
                                expected: "a Web IDL token",
                                found: format!("`{other}`"),
                            })
                        }
                    }
                }
            };
            tokens.push(token);
        }
    }
}

/// Token cursor shared by the type-expression and declaration parsers.
pub(crate) struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub(crate) fn new(source: &str) -> Result<Self, IdlError> {
        Ok(Self {
            tokens: Lexer::new(source).tokenize()?,
            pos: 0,
        })
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consumes the next token if it equals `token`.
    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the next token if it is the identifier `keyword`.
    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Identifier(name)) if name == keyword => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), IdlError> {
        match self.advance() {
            Some(found) if &found == token => Ok(()),
            Some(found) => Err(IdlError::UnexpectedToken {
                expected,
                found: found.to_string(),
            }),
            None => Err(IdlError::UnexpectedEnd { context: expected }),
        }
    }

    pub(crate) fn expect_identifier(&mut self, expected: &'static str) -> Result<String, IdlError> {
        match self.advance() {
            Some(Token::Identifier(name)) => Ok(name),
            Some(found) => Err(IdlError::UnexpectedToken {
                expected,
                found: found.to_string(),
            }),
            None => Err(IdlError::UnexpectedEnd { context: expected }),
        }
    }
}

/// Parses one type expression from the stream: a parenthesized union, a
/// `sequence<...>`, or a bare name, followed by any number of `?` and `[]`
/// suffixes applied in source order.
pub(crate) fn parse_type(stream: &mut TokenStream) -> Result<IdlType, IdlError> {
    let mut ty = if stream.eat(&Token::LeftParen) {
        let mut member_types = vec![parse_type(stream)?];
        while stream.eat_keyword("or") {
            member_types.push(parse_type(stream)?);
        }
        stream.expect(&Token::RightParen, "`)` closing a union type")?;
        IdlType::Union(UnionType::parsed(member_types)?)
    } else {
        let name = stream.expect_identifier("a type name")?;
        if name == "sequence" {
            stream.expect(&Token::Less, "`<` after `sequence`")?;
            let element_type = parse_type(stream)?;
            stream.expect(&Token::Greater, "`>` closing a sequence type")?;
            IdlType::sequence(element_type)
        } else {
            IdlType::Basic(name)
        }
    };
    loop {
        if stream.eat(&Token::Question) {
            ty = IdlType::nullable(ty);
        } else if stream.eat(&Token::LeftBracket) {
            stream.expect(&Token::RightBracket, "`]` closing an array type")?;
            ty = IdlType::array(ty);
        } else {
            return Ok(ty);
        }
    }
}

impl IdlType {
    /// Parses a standalone type expression, e.g. `sequence<long?>` or
    /// `(Node or DOMString)`.
    pub fn parse(source: &str) -> Result<Self, IdlError> {
        let mut stream = TokenStream::new(source)?;
        let ty = parse_type(&mut stream)?;
        match stream.advance() {
            None => Ok(ty),
            Some(found) => Err(IdlError::UnexpectedToken {
                expected: "end of the type expression",
                found: found.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_multi_word_names() {
        assert_eq!(IdlType::parse("long").unwrap(), IdlType::basic("long"));
        assert_eq!(
            IdlType::parse("unsigned long long").unwrap(),
            IdlType::basic("unsigned long long")
        );
        assert_eq!(
            IdlType::parse("unrestricted double").unwrap(),
            IdlType::basic("unrestricted double")
        );
    }

    #[test]
    fn parses_sequences_and_suffixes() {
        let ty = IdlType::parse("sequence<long?>").unwrap();
        assert_eq!(
            ty,
            IdlType::sequence(IdlType::nullable(IdlType::basic("long")))
        );

        let ty = IdlType::parse("Foo[]").unwrap();
        assert_eq!(ty, IdlType::array(IdlType::basic("Foo")));

        // Suffixes apply in source order.
        let ty = IdlType::parse("long?[]").unwrap();
        assert_eq!(
            ty,
            IdlType::array(IdlType::nullable(IdlType::basic("long")))
        );
        let ty = IdlType::parse("long[]?").unwrap();
        assert_eq!(
            ty,
            IdlType::nullable(IdlType::array(IdlType::basic("long")))
        );
    }

    #[test]
    fn parses_union_types() {
        let ty = IdlType::parse("(Node or DOMString)").unwrap();
        assert_eq!(ty.to_string(), "(Node or DOMString)");
        assert_eq!(ty.type_name(), "NodeOrString");

        let ty = IdlType::parse("(Node or DOMString)?").unwrap();
        assert!(ty.is_nullable());
        assert!(ty.is_union_type());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            IdlType::parse("sequence<long"),
            Err(IdlError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            IdlType::parse("(long)"),
            Err(IdlError::TooFewUnionMembers)
        ));
        assert!(matches!(
            IdlType::parse("long extra"),
            Err(IdlError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            IdlType::parse("((A or B) or C)"),
            Err(IdlError::NestedUnion { .. })
        ));
    }

    #[test]
    fn comments_are_trivia() {
        let ty = IdlType::parse("sequence< /* element */ long > // trailing").unwrap();
        assert_eq!(ty, IdlType::sequence(IdlType::basic("long")));
    }

    #[test]
    fn multi_word_merge_stops_at_non_type_words() {
        // `unsigned` followed by something that is not part of a primitive
        // name stays a lone identifier.
        let mut stream = TokenStream::new("unsigned foo").unwrap();
        assert_eq!(
            stream.advance(),
            Some(Token::Identifier("unsigned".to_string()))
        );
        assert_eq!(stream.advance(), Some(Token::Identifier("foo".to_string())));
    }
}
