#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Delimiters
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Comma,
    Dot,
    Semicolon,
    Colon,
    ColonEqual, // :=

    // Comparison / assignment
    Equal,
    EqualEqual,
    Bang,
    BangEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Arithmetic
    Plus,
    PlusEqual,
    Minus,
    MinusEqual,
    Star,
    StarEqual,
    Slash,
    SlashEqual,

    // Literals
    Identifier,
    IntLiteral,
    FloatLiteral,
    StringLiteral,

    // Keywords
    And,
    Bool,
    Class,
    Const,
    Else,
    False,
    Float,
    For,
    Func,
    If,
    Int,
    Null,
    Or,
    Print,
    Return,
    This,
    True,
    Var,
    While,

    // Special
    /// Lexical error; the token's lexeme holds the message.
    Error,
    Eof,
}

/// Reserved words, matched exactly against a scanned identifier.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("and", TokenKind::And),
    ("bool", TokenKind::Bool),
    ("class", TokenKind::Class),
    ("const", TokenKind::Const),
    ("else", TokenKind::Else),
    ("false", TokenKind::False),
    ("float", TokenKind::Float),
    ("for", TokenKind::For),
    ("func", TokenKind::Func),
    ("if", TokenKind::If),
    ("int", TokenKind::Int),
    ("null", TokenKind::Null),
    ("or", TokenKind::Or),
    ("print", TokenKind::Print),
    ("return", TokenKind::Return),
    ("this", TokenKind::This),
    ("true", TokenKind::True),
    ("var", TokenKind::Var),
    ("while", TokenKind::While),
];

impl TokenKind {
    /// Looks up `ident` in the keyword table.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(word, _)| *word == ident)
            .map(|(_, kind)| *kind)
    }

    /// Returns true if this token names a value type (`bool`, `int`, `float`).
    pub fn is_type_keyword(&self) -> bool {
        matches!(self, TokenKind::Bool | TokenKind::Int | TokenKind::Float)
    }

    pub fn is_keyword(&self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| kind == self)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some((word, _)) = KEYWORDS.iter().find(|(_, kind)| kind == self) {
            return write!(f, "{}", word);
        }
        let s = match self {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::ColonEqual => ":=",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Plus => "+",
            TokenKind::PlusEqual => "+=",
            TokenKind::Minus => "-",
            TokenKind::MinusEqual => "-=",
            TokenKind::Star => "*",
            TokenKind::StarEqual => "*=",
            TokenKind::Slash => "/",
            TokenKind::SlashEqual => "/=",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::IntLiteral => "INT_LITERAL",
            TokenKind::FloatLiteral => "FLOAT_LITERAL",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::Error => "ERROR",
            TokenKind::Eof => "EOF",
            _ => "KEYWORD",
        };
        write!(f, "{}", s)
    }
}

/// A lexed token.
///
/// `lexeme` borrows the token's text from the source, except for
/// `TokenKind::Error` where it holds the diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub line: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_is_exact() {
        assert_eq!(TokenKind::keyword("float"), Some(TokenKind::Float));
        assert_eq!(TokenKind::keyword("true"), Some(TokenKind::True));
        assert_eq!(TokenKind::keyword("floats"), None);
        assert_eq!(TokenKind::keyword("flo"), None);
        assert_eq!(TokenKind::keyword("Int"), None);
    }

    #[test]
    fn test_type_keywords() {
        assert!(TokenKind::Bool.is_type_keyword());
        assert!(TokenKind::Int.is_type_keyword());
        assert!(TokenKind::Float.is_type_keyword());
        assert!(!TokenKind::True.is_type_keyword());
        assert!(!TokenKind::Identifier.is_type_keyword());
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::ColonEqual.to_string(), ":=");
        assert_eq!(TokenKind::While.to_string(), "while");
        assert_eq!(TokenKind::IntLiteral.to_string(), "INT_LITERAL");
        assert_eq!(TokenKind::Eof.to_string(), "EOF");
    }
}
