use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::lang::{Node, NodeKind, UnaryOp, ValueType};

/// Type inference over an expression tree.
///
/// Walks the tree post-order, storing the inferred type in every node's
/// `ty`. Where an int meets a float in arithmetic, the int side is wrapped in
/// a `Cast` to float. The walk always completes; only the first error is
/// kept.
pub struct Analyzer {
    diagnostics: Diagnostics,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer {
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn analyze(mut self, root: &mut Node) -> Result<(), Diagnostic> {
        let ty = self.visit(root);
        if !self.diagnostics.had_error() {
            tracing::debug!(%ty, "analysis complete");
        }
        self.diagnostics.finish(())
    }

    fn error(&mut self, line: usize, message: &str) {
        self.diagnostics.report(Diagnostic::at_line(line, message));
    }

    fn visit(&mut self, node: &mut Node) -> ValueType {
        let line = node.line;
        let ty = match &mut node.kind {
            NodeKind::Literal(value) => value.value_type(),

            NodeKind::Cast { target, operand } => {
                self.visit(operand);
                *target
            }

            NodeKind::Unary { op, operand } => {
                let operand_ty = self.visit(operand);
                match op {
                    UnaryOp::Not => {
                        if operand_ty != ValueType::Bool {
                            self.error(line, "incompatible type for '!' operator");
                        }
                        ValueType::Bool
                    }
                    UnaryOp::Negate => {
                        if !operand_ty.is_numeric() {
                            self.error(line, "incompatible type for '-' operator");
                        }
                        operand_ty
                    }
                }
            }

            NodeKind::Binary { left, right, .. } => {
                let left_ty = self.visit(left);
                let right_ty = self.visit(right);
                match (left_ty, right_ty) {
                    (ValueType::Int, ValueType::Int) => ValueType::Int,
                    (ValueType::Float, ValueType::Float) => ValueType::Float,
                    (ValueType::Int, ValueType::Float) => {
                        Node::wrap_in_cast(left, ValueType::Float);
                        ValueType::Float
                    }
                    (ValueType::Float, ValueType::Int) => {
                        Node::wrap_in_cast(right, ValueType::Float);
                        ValueType::Float
                    }
                    _ => {
                        self.error(line, "incompatible types for binary operation");
                        left_ty
                    }
                }
            }
        };
        node.ty = ty;
        ty
    }
}
