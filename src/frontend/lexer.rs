use super::token::{Token, TokenKind};

/// Scanner over a source string.
///
/// Never fails: malformed input becomes `TokenKind::Error` tokens carrying a
/// message, and the parser reports them like any other unexpected token.
pub struct Lexer<'src> {
    source: &'src str,
    /// Byte offset where the current token starts.
    start: usize,
    /// Byte offset of the next unread character.
    current: usize,
    line: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            start: 0,
            current: 0,
            line: 1,
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn current_char(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.current += ch.len_utf8();
        Some(ch)
    }

    /// Consumes the next character if it is `expected`.
    fn match_char(&mut self, expected: char) -> bool {
        if self.current_char() == Some(expected) {
            self.current += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        Token {
            kind,
            lexeme: &self.source[self.start..self.current],
            line: self.line,
        }
    }

    fn error_token(&self, message: &'static str) -> Token<'src> {
        Token {
            kind: TokenKind::Error,
            lexeme: message,
            line: self.line,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.line += 1;
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn skip_digits(&mut self) {
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn read_number(&mut self) -> Token<'src> {
        self.skip_digits();

        if self.match_char('.') {
            self.skip_digits();
            // `f` suffix is part of the lexeme; the parser drops it
            self.match_char('f');
            return self.make_token(TokenKind::FloatLiteral);
        }

        self.make_token(TokenKind::IntLiteral)
    }

    fn read_string(&mut self) -> Token<'src> {
        while let Some(ch) = self.current_char() {
            if ch == '"' {
                break;
            }
            if ch == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return self.error_token("unterminated string");
        }

        self.advance(); // closing quote
        self.make_token(TokenKind::StringLiteral)
    }

    fn read_identifier(&mut self) -> Token<'src> {
        while self
            .current_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind)
    }

    /// Picks `with_equal` if the next character is `=`, otherwise `single`.
    fn one_or_two(&mut self, with_equal: TokenKind, single: TokenKind) -> Token<'src> {
        let kind = if self.match_char('=') {
            with_equal
        } else {
            single
        };
        self.make_token(kind)
    }

    fn next_token(&mut self) -> Token<'src> {
        self.skip_whitespace();
        self.start = self.current;

        let Some(ch) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match ch {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            '[' => self.make_token(TokenKind::LeftBracket),
            ']' => self.make_token(TokenKind::RightBracket),
            ',' => self.make_token(TokenKind::Comma),
            '.' => self.make_token(TokenKind::Dot),
            ';' => self.make_token(TokenKind::Semicolon),
            ':' => self.one_or_two(TokenKind::ColonEqual, TokenKind::Colon),
            '=' => self.one_or_two(TokenKind::EqualEqual, TokenKind::Equal),
            '!' => self.one_or_two(TokenKind::BangEqual, TokenKind::Bang),
            '>' => self.one_or_two(TokenKind::GreaterEqual, TokenKind::Greater),
            '<' => self.one_or_two(TokenKind::LessEqual, TokenKind::Less),
            '+' => self.one_or_two(TokenKind::PlusEqual, TokenKind::Plus),
            '-' => self.one_or_two(TokenKind::MinusEqual, TokenKind::Minus),
            '*' => self.one_or_two(TokenKind::StarEqual, TokenKind::Star),
            '/' => self.one_or_two(TokenKind::SlashEqual, TokenKind::Slash),
            '"' => self.read_string(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier(),
            _ => self.error_token("unexpected character"),
        }
    }

    /// Scans the whole source.
    ///
    /// The returned sequence always ends with exactly one `TokenKind::Eof`.
    pub fn tokenize(mut self) -> Vec<Token<'src>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    fn lexemes(source: &str) -> Vec<&str> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.lexeme)
            .collect()
    }

    #[test]
    fn test_arithmetic() {
        let t = kinds("-10 + 20 * 3 / 4");
        assert_eq!(
            t,
            vec![
                TokenKind::Minus,
                TokenKind::IntLiteral,
                TokenKind::Plus,
                TokenKind::IntLiteral,
                TokenKind::Star,
                TokenKind::IntLiteral,
                TokenKind::Slash,
                TokenKind::IntLiteral,
            ]
        );
        assert_eq!(lexemes("-10 + 20"), vec!["-", "10", "+", "20"]);
    }

    #[test]
    fn test_punctuation() {
        let t = kinds("( ) { } [ ] , . ; :");
        assert_eq!(
            t,
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Semicolon,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        let t = kinds("== != >= <= += -= *= /= :=");
        assert_eq!(
            t,
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessEqual,
                TokenKind::PlusEqual,
                TokenKind::MinusEqual,
                TokenKind::StarEqual,
                TokenKind::SlashEqual,
                TokenKind::ColonEqual,
            ]
        );
    }

    #[test]
    fn test_one_char_operators_without_equal() {
        let t = kinds("= ! > < + - * /");
        assert_eq!(
            t,
            vec![
                TokenKind::Equal,
                TokenKind::Bang,
                TokenKind::Greater,
                TokenKind::Less,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42"), vec![TokenKind::IntLiteral]);
        assert_eq!(kinds("3.14"), vec![TokenKind::FloatLiteral]);
        assert_eq!(lexemes("3.14 2.5f 7."), vec!["3.14", "2.5f", "7."]);
        assert_eq!(
            kinds("2.5f 7."),
            vec![TokenKind::FloatLiteral, TokenKind::FloatLiteral]
        );
    }

    #[test]
    fn test_int_followed_by_identifier_f() {
        // the `f` suffix only exists on floats
        assert_eq!(
            kinds("3f"),
            vec![TokenKind::IntLiteral, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_string_literal() {
        let tokens = Lexer::new(r#""hello" 1"#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].lexeme, "\"hello\"");
        assert_eq!(tokens[1].kind, TokenKind::IntLiteral);
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = Lexer::new("\"abc\n def").tokenize();
        assert_eq!(tokens.len(), 2, "tokens: {:?}", tokens);
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].lexeme, "unterminated string");
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_keyword_vs_identifier() {
        let t = kinds("int integer float floaty true truex _true bool");
        assert_eq!(
            t,
            vec![
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::Float,
                TokenKind::Identifier,
                TokenKind::True,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Bool,
            ]
        );
    }

    #[test]
    fn test_all_keywords() {
        let t = kinds(
            "and bool class const else false float for func if int null or print return this true var while",
        );
        assert_eq!(t.len(), 19);
        assert!(t.iter().all(|k| k.is_keyword()), "kinds: {:?}", t);
    }

    #[test]
    fn test_unexpected_character() {
        let tokens = Lexer::new("1 @ 2").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].lexeme, "unexpected character");
        assert_eq!(tokens[2].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[2].lexeme, "2");
    }

    #[test]
    fn test_multibyte_unexpected_character() {
        let tokens = Lexer::new("é1").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[1].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[1].lexeme, "1");
    }

    #[test]
    fn test_lines() {
        let tokens = Lexer::new("1\n+\r\n\t2").tokenize();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 3]);
    }

    #[test]
    fn test_exactly_one_eof() {
        for source in ["", "   ", "1 + 2", "\"open", "@@"] {
            let tokens = Lexer::new(source).tokenize();
            let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
            assert_eq!(eofs, 1, "source {:?}", source);
            assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        }
    }
}
