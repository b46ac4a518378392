use crate::ast::Symbol;

use std::fmt::{self, Display};

/// The connectives of zeroth-order logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// `~`
    Not,
    /// `/\`
    And,
    /// `\/`
    Or,
    /// `->`
    Implies,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Not,
        Operator::And,
        Operator::Or,
        Operator::Implies,
    ];

    pub fn arity(self) -> usize {
        match self {
            Operator::Not => 1,
            Operator::And | Operator::Or | Operator::Implies => 2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Not => "~",
            Operator::And => "/\\",
            Operator::Or => "\\/",
            Operator::Implies => "->",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Binding strength used by the printer and the parser.
    /// Higher binds tighter.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Operator::Not => 4,
            Operator::And => 3,
            Operator::Or => 2,
            Operator::Implies => 1,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A propositional formula.
///
/// Two expressions are equal exactly when their trees are equal: same
/// variant, same identifier or line number, same operator and pairwise
/// equal operands in the same order. `A /\ B` and `B /\ A` are different
/// expressions; no normalization is ever applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Prop(Symbol),
    /// A line number written inside a formula.
    Ref(usize),
    /// An operator applied to exactly `operator.arity()` operands.
    Nary(Operator, Vec<Expr>),
}

impl Expr {
    pub fn prop(name: impl Into<Symbol>) -> Self {
        Expr::Prop(name.into())
    }

    pub fn reference(line_number: usize) -> Self {
        Expr::Ref(line_number)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Expr) -> Self {
        Expr::Nary(Operator::Not, vec![operand])
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::Nary(Operator::And, vec![left, right])
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Nary(Operator::Or, vec![left, right])
    }

    pub fn implies(left: Expr, right: Expr) -> Self {
        Expr::Nary(Operator::Implies, vec![left, right])
    }

    /// Builds an operator node, or returns `None` if the number of operands
    /// does not match the operator's arity.
    pub fn nary(op: Operator, operands: Vec<Expr>) -> Option<Self> {
        (operands.len() == op.arity()).then_some(Expr::Nary(op, operands))
    }

    /// The operands of this expression if its head is `op` with the right arity.
    pub fn operands_of(&self, op: Operator) -> Option<&[Expr]> {
        match self {
            Expr::Nary(head, operands) if *head == op && operands.len() == op.arity() => {
                Some(operands)
            }
            _ => None,
        }
    }

    pub fn as_negation(&self) -> Option<&Expr> {
        match self.operands_of(Operator::Not)? {
            [operand] => Some(operand),
            _ => None,
        }
    }

    pub fn as_binary(&self, op: Operator) -> Option<(&Expr, &Expr)> {
        match self.operands_of(op)? {
            [left, right] => Some((left, right)),
            _ => None,
        }
    }

    /// Whether every operator node in the tree has as many operands as its arity.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Expr::Prop(_) | Expr::Ref(_) => true,
            Expr::Nary(op, operands) => {
                operands.len() == op.arity() && operands.iter().all(Expr::is_well_formed)
            }
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, prec: u8) -> fmt::Result {
        match self {
            Expr::Prop(name) => Display::fmt(name, f),
            Expr::Ref(line_number) => Display::fmt(line_number, f),
            Expr::Nary(op, operands) => {
                let own = op.precedence();
                let parens = prec > own;
                if parens {
                    f.write_str("(")?;
                }
                match operands.as_slice() {
                    [operand] if *op == Operator::Not => {
                        f.write_str(op.symbol())?;
                        operand.fmt_prec(f, own)?;
                    }
                    // right associative: only a left operand of equal strength needs parentheses
                    [left, right] if op.arity() == 2 => {
                        left.fmt_prec(f, own + 1)?;
                        write!(f, " {op} ")?;
                        right.fmt_prec(f, own)?;
                    }
                    _ => {
                        write!(f, "{op}[")?;
                        for (i, operand) in operands.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            operand.fmt_prec(f, 0)?;
                        }
                        f.write_str("]")?;
                    }
                }
                if parens {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}
