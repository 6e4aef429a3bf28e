use std::io::Write;

use crate::frontend::token::{Token, TokenKind};

/// Prints a token stream one token per line, for `--tokens`.
pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints the lexeme instead of the Debug token
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const RED: &'static str = "\x1b[31m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump<W: Write>(&self, tokens: &[Token<'_>], out: &mut W) -> std::io::Result<()> {
        for token in tokens {
            self.write_one(token, out)?;
        }
        Ok(())
    }

    fn write_one<W: Write>(&self, token: &Token<'_>, out: &mut W) -> std::io::Result<()> {
        let kind = Self::kind(token.kind);
        let colr = if self.color { Self::color(token.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        if self.show_debug_repr {
            writeln!(
                out,
                "[{:02}] {}{:<8} {:?} {:?}{}",
                token.line, colr, kind, token.kind, token.lexeme, reset
            )
        } else {
            match token.kind {
                TokenKind::Eof => writeln!(out, "[{:02}] {}{:<8}{}", token.line, colr, kind, reset),
                TokenKind::Error => writeln!(
                    out,
                    "[{:02}] {}{:<8} ERROR: {}{}",
                    token.line, colr, kind, token.lexeme, reset
                ),
                _ => writeln!(
                    out,
                    "[{:02}] {}{:<8} {}{}",
                    token.line, colr, kind, token.lexeme, reset
                ),
            }
        }
    }

    fn kind(kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => "EOF",
            Error => "ERROR",

            // literals
            IntLiteral => "INT",
            FloatLiteral => "FLOAT",
            StringLiteral => "STRING",
            True | False => "BOOL",

            // names
            Identifier => "IDENT",

            // structure
            LeftParen | RightParen => "PAREN",
            LeftBracket | RightBracket => "BRACKET",
            LeftBrace | RightBrace => "BRACE",
            Comma | Dot | Semicolon | Colon => "PUNCT",

            // ops / comparisons
            Plus | Minus | Star | Slash | Bang => "OP",
            PlusEqual | MinusEqual | StarEqual | SlashEqual | Equal | ColonEqual => "ASSIGN",
            EqualEqual | BangEqual | Less | LessEqual | Greater | GreaterEqual => "CMP",

            // everything else = keyword
            _ => "KEYWORD",
        }
    }

    fn color(kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => Self::DIM,
            Error => Self::RED,
            StringLiteral => Self::GRN,
            IntLiteral | FloatLiteral | True | False => Self::CYN,
            Identifier => Self::YEL,
            Plus | Minus | Star | Slash | Bang => Self::MAG,
            EqualEqual | BangEqual | Less | LessEqual | Greater | GreaterEqual => Self::MAG,
            _ => Self::RESET,
        }
    }
}
