use super::value::{Value, ValueType};

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
        }
    }
}

/// Prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation: `-x`.
    Negate,
    /// Logical not: `!x`.
    Not,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

/// The shape of an expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // ───────────────────────────── Operators ─────────────────────────────
    /// `left op right`
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `op operand`
    Unary { op: UnaryOp, operand: Box<Node> },

    // ───────────────────────────── Leaves ────────────────────────────────
    /// Integer, float or boolean literal.
    Literal(Value),

    // ───────────────────────────── Conversions ───────────────────────────
    /// Conversion of `operand` to `target`.
    ///
    /// Written explicitly as `(float) x`, or inserted by semantic analysis
    /// when an int meets a float in arithmetic.
    Cast {
        target: ValueType,
        operand: Box<Node>,
    },
}

/// Expression tree node.
///
/// Each node owns its children. `line` is the source line of the token that
/// defined the node; `ty` stays `ValueType::None` until the semantic pass
/// assigns the inferred type.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
    pub ty: ValueType,
}

impl Node {
    pub fn binary(op: BinaryOp, left: Node, right: Node, line: usize) -> Self {
        Self::untyped(
            NodeKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            line,
        )
    }

    pub fn unary(op: UnaryOp, operand: Node, line: usize) -> Self {
        Self::untyped(
            NodeKind::Unary {
                op,
                operand: Box::new(operand),
            },
            line,
        )
    }

    pub fn literal(value: Value, line: usize) -> Self {
        Self::untyped(NodeKind::Literal(value), line)
    }

    pub fn cast(target: ValueType, operand: Node, line: usize) -> Self {
        Self::untyped(
            NodeKind::Cast {
                target,
                operand: Box::new(operand),
            },
            line,
        )
    }

    fn untyped(kind: NodeKind, line: usize) -> Self {
        Node {
            kind,
            line,
            ty: ValueType::None,
        }
    }

    /// Replaces the node in `slot` with a typed cast of itself to `target`.
    ///
    /// The cast takes the line of the wrapped node.
    pub fn wrap_in_cast(slot: &mut Box<Node>, target: ValueType) {
        let line = slot.line;
        let inner = std::mem::replace(slot, Box::new(Node::literal(Value::None, line)));
        let mut cast = Node::cast(target, *inner, line);
        cast.ty = target;
        **slot = cast;
    }

    /// Number of nodes in the tree rooted here.
    pub fn count(&self) -> usize {
        1 + match &self.kind {
            NodeKind::Binary { left, right, .. } => left.count() + right.count(),
            NodeKind::Unary { operand, .. } | NodeKind::Cast { operand, .. } => operand.count(),
            NodeKind::Literal(_) => 0,
        }
    }

    /// Longest root-to-leaf path, counting both ends. A lone literal has height 1.
    pub fn height(&self) -> usize {
        1 + match &self.kind {
            NodeKind::Binary { left, right, .. } => left.height().max(right.height()),
            NodeKind::Unary { operand, .. } | NodeKind::Cast { operand, .. } => operand.height(),
            NodeKind::Literal(_) => 0,
        }
    }

    fn fmt_indented(&self, f: &mut std::fmt::Formatter<'_>, indent: usize) -> std::fmt::Result {
        write!(f, "{}", "  ".repeat(indent))?;
        match &self.kind {
            NodeKind::Binary { op, .. } => write!(f, "Binary: {}", op)?,
            NodeKind::Unary { op, .. } => write!(f, "Unary: {}", op)?,
            NodeKind::Literal(value) => write!(f, "Literal: {}", value)?,
            NodeKind::Cast { target, .. } => write!(f, "Cast: {}", target)?,
        }
        if self.ty != ValueType::None {
            write!(f, " ({})", self.ty)?;
        }
        writeln!(f)?;

        match &self.kind {
            NodeKind::Binary { left, right, .. } => {
                left.fmt_indented(f, indent + 1)?;
                right.fmt_indented(f, indent + 1)
            }
            NodeKind::Unary { operand, .. } | NodeKind::Cast { operand, .. } => {
                operand.fmt_indented(f, indent + 1)
            }
            NodeKind::Literal(_) => Ok(()),
        }
    }
}

impl std::fmt::Display for Node {
    /// Renders the tree one node per line, children indented by two spaces.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_indented(f, 0)
    }
}
