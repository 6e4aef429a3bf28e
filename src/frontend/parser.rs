use crate::diagnostic::{Diagnostic, Diagnostics, Location};
use crate::frontend::token::{Token, TokenKind};
use crate::lang::{BinaryOp, Node, UnaryOp, Value, ValueType};

/// Deepest nesting of parentheses, casts and prefix operators the parser
/// accepts before reporting an error.
pub const MAX_NESTING: usize = 256;

/// Tallest operator chain the parser will build. Later passes walk the tree
/// recursively, so a flat `1+1+...+1` has to be bounded here as well.
pub const MAX_HEIGHT: usize = 512;

/// Precedence-climbing parser for a single expression.
///
/// Grammar:
///
/// ```text
/// expression := term EOF
/// term       := factor (('+' | '-') factor)*
/// factor     := unary (('*' | '/') unary)*
/// unary      := ('-' | '!') cast | cast
/// cast       := '(' ('bool' | 'int' | 'float') ')' cast | primary
/// primary    := INT | FLOAT | 'true' | 'false' | '(' term ')'
/// ```
///
/// Errors do not abort parsing. The first one is recorded and the rest of
/// the pass runs in panic mode, substituting placeholder nodes where a
/// subexpression could not be built.
pub struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    depth: usize,
    diagnostics: Diagnostics,
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        _ => None,
    }
}

fn cast_target(kind: TokenKind) -> Option<ValueType> {
    match kind {
        TokenKind::Bool => Some(ValueType::Bool),
        TokenKind::Int => Some(ValueType::Int),
        TokenKind::Float => Some(ValueType::Float),
        _ => None,
    }
}

impl<'src> Parser<'src> {
    /// Creates a parser over lexer output.
    ///
    /// A missing trailing `Eof` is appended so the cursor always has a token
    /// to look at.
    pub fn new(mut tokens: Vec<Token<'src>>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: "",
                line,
            });
        }
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    fn current(&self) -> Token<'src> {
        self.tokens[self.pos]
    }

    fn peek_next(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos + 1).copied()
    }

    /// Consumes the current token. The cursor never moves past `Eof`.
    fn advance(&mut self) -> Token<'src> {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consumes the current token if it is one of `kinds`.
    fn match_any(&mut self, kinds: &[TokenKind]) -> Option<Token<'src>> {
        let token = self.current();
        if kinds.contains(&token.kind) {
            self.advance();
            Some(token)
        } else {
            None
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current().kind == kind {
            self.advance();
        } else {
            self.error_at(self.current(), message);
        }
    }

    /// Reports an error located at `token`.
    ///
    /// Lexical error tokens carry their own message, which replaces `message`.
    fn error_at(&mut self, token: Token<'src>, message: &str) {
        let diagnostic = match token.kind {
            TokenKind::Eof => Diagnostic::new(token.line, Location::End, message),
            TokenKind::Error => Diagnostic::at_line(token.line, token.lexeme),
            _ => Diagnostic::new(
                token.line,
                Location::Lexeme(token.lexeme.to_string()),
                message,
            ),
        };
        self.diagnostics.report(diagnostic);
    }

    fn placeholder(line: usize) -> Node {
        Node::literal(Value::None, line)
    }

    /// Parses the whole token sequence as one expression.
    ///
    /// Returns the first syntax error if any was reported, even when a tree
    /// could still be assembled.
    pub fn parse(mut self) -> Result<Node, Diagnostic> {
        let root = self.parse_term();

        let trailing = self.current();
        if trailing.kind != TokenKind::Eof {
            self.error_at(trailing, "expected end of expression");
        }

        if !self.diagnostics.had_error() {
            tracing::debug!(nodes = root.count(), "parsed expression");
        }
        self.diagnostics.finish(root)
    }

    fn parse_term(&mut self) -> Node {
        let mut left = self.parse_factor();
        let mut height = left.height();
        while let Some(token) = self.match_any(&[TokenKind::Plus, TokenKind::Minus]) {
            let right = self.parse_factor();
            self.extend_chain(&mut left, &mut height, token, right);
        }
        left
    }

    fn parse_factor(&mut self) -> Node {
        let mut left = self.parse_unary();
        let mut height = left.height();
        while let Some(token) = self.match_any(&[TokenKind::Star, TokenKind::Slash]) {
            let right = self.parse_unary();
            self.extend_chain(&mut left, &mut height, token, right);
        }
        left
    }

    /// Folds `right` into the left-leaning chain `left`, whose height is
    /// tracked in `height`.
    ///
    /// Past [`MAX_HEIGHT`] the chain stops growing: the error is reported
    /// once and the remaining operands are parsed and dropped.
    fn extend_chain(
        &mut self,
        left: &mut Node,
        height: &mut usize,
        token: Token<'src>,
        right: Node,
    ) {
        let Some(op) = binary_op(token.kind) else {
            return;
        };
        let joined = 1 + (*height).max(right.height());
        if joined > MAX_HEIGHT {
            if !self.diagnostics.had_error() {
                self.error_at(token, "expression nested too deeply");
            }
            return;
        }
        let lhs = std::mem::replace(left, Self::placeholder(token.line));
        *left = Node::binary(op, lhs, right, token.line);
        *height = joined;
    }

    fn parse_unary(&mut self) -> Node {
        if let Some(token) = self.match_any(&[TokenKind::Minus, TokenKind::Bang]) {
            let op = if token.kind == TokenKind::Minus {
                UnaryOp::Negate
            } else {
                UnaryOp::Not
            };
            let operand = self.parse_cast();
            return Node::unary(op, operand, token.line);
        }
        self.parse_cast()
    }

    /// Every nested construct passes through here, so this is where the
    /// nesting limit is enforced.
    fn parse_cast(&mut self) -> Node {
        if self.depth >= MAX_NESTING {
            let token = self.current();
            self.error_at(token, "expression nested too deeply");
            return Self::placeholder(token.line);
        }

        self.depth += 1;
        let node = self.parse_cast_inner();
        self.depth -= 1;
        node
    }

    fn parse_cast_inner(&mut self) -> Node {
        if self.current().kind == TokenKind::LeftParen {
            // `(` only opens a cast when a type keyword follows directly
            if let Some(target) = self.peek_next().and_then(|t| cast_target(t.kind)) {
                let paren = self.advance();
                self.advance(); // type keyword
                self.consume(TokenKind::RightParen, "expected ')' after cast type");
                let operand = self.parse_cast();
                return Node::cast(target, operand, paren.line);
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Node {
        let token = self.current();
        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                match token.lexeme.parse::<i32>() {
                    Ok(n) => Node::literal(Value::Int(n), token.line),
                    Err(_) => {
                        self.error_at(token, "integer literal out of range");
                        Self::placeholder(token.line)
                    }
                }
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let digits = token.lexeme.strip_suffix('f').unwrap_or(token.lexeme);
                match digits.parse::<f32>() {
                    Ok(n) => Node::literal(Value::Float(n), token.line),
                    Err(_) => {
                        self.error_at(token, "invalid float literal");
                        Self::placeholder(token.line)
                    }
                }
            }
            TokenKind::True => {
                self.advance();
                Node::literal(Value::Bool(true), token.line)
            }
            TokenKind::False => {
                self.advance();
                Node::literal(Value::Bool(false), token.line)
            }
            TokenKind::LeftParen => {
                self.advance();
                let inside = self.parse_term();
                self.consume(TokenKind::RightParen, "expected ')' after expression");
                inside
            }
            _ => {
                self.error_at(token, "expected expression");
                Self::placeholder(token.line)
            }
        }
    }
}
