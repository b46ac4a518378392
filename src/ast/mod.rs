mod expr;
pub mod parse;

pub use expr::*;
pub use parse::*;
pub use symbol_table::GlobalSymbol as Symbol;

use smallvec::SmallVec;
use std::fmt::{self, Display};

/// A rule argument: an explicit 0-based index of an earlier line, or
/// `None` when the checker should search for a suitable line.
pub type RuleArg = Option<usize>;

pub type RuleArgs = SmallVec<[RuleArg; 3]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Introduction,
    Elimination,
}

impl RuleKind {
    pub fn keyword(self) -> &'static str {
        match self {
            RuleKind::Introduction => "introduce",
            RuleKind::Elimination => "eliminate",
        }
    }

    /// How many lines a rule of this kind refers to for `op`.
    pub fn slot_count(self, op: Operator) -> usize {
        match (self, op) {
            (RuleKind::Introduction, Operator::Not) => 1,
            (RuleKind::Introduction, Operator::And) => 2,
            (RuleKind::Introduction, Operator::Or) => 1,
            (RuleKind::Introduction, Operator::Implies) => 2,
            (RuleKind::Elimination, Operator::Not) => 2,
            (RuleKind::Elimination, Operator::And) => 1,
            (RuleKind::Elimination, Operator::Or) => 3,
            (RuleKind::Elimination, Operator::Implies) => 2,
        }
    }
}

/// The justification of a proof line.
///
/// Argument lists may be shorter than the operator's slot count, in which
/// case the missing slots are searched for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    Premise,
    Introduction(Operator, RuleArgs),
    Elimination(Operator, RuleArgs),
}

impl Rule {
    pub fn introduction(op: Operator, args: impl IntoIterator<Item = RuleArg>) -> Self {
        Rule::Introduction(op, args.into_iter().collect())
    }

    pub fn elimination(op: Operator, args: impl IntoIterator<Item = RuleArg>) -> Self {
        Rule::Elimination(op, args.into_iter().collect())
    }

    pub fn kind(&self) -> Option<RuleKind> {
        match self {
            Rule::Premise => None,
            Rule::Introduction(..) => Some(RuleKind::Introduction),
            Rule::Elimination(..) => Some(RuleKind::Elimination),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            Rule::Premise => None,
            Rule::Introduction(op, _) | Rule::Elimination(op, _) => Some(*op),
        }
    }

    pub fn args(&self) -> &[RuleArg] {
        match self {
            Rule::Premise => &[],
            Rule::Introduction(_, args) | Rule::Elimination(_, args) => args,
        }
    }

    /// The argument in `slot`, `None` if the slot was left open.
    pub fn arg(&self, slot: usize) -> RuleArg {
        self.args().get(slot).copied().flatten()
    }

    pub fn slot_count(&self) -> usize {
        match self {
            Rule::Premise => 0,
            Rule::Introduction(op, _) => RuleKind::Introduction.slot_count(*op),
            Rule::Elimination(op, _) => RuleKind::Elimination.slot_count(*op),
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(kind), Some(op)) = (self.kind(), self.operator()) else {
            return f.write_str("premise");
        };
        write!(f, "{} {op}", kind.keyword())?;
        let args = self.args();
        let shown = args.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        if shown > 0 {
            f.write_str(" with ")?;
            for (i, arg) in args[..shown].iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                match arg {
                    Some(index) => write!(f, "{}", crate::util::line_number(*index))?,
                    None => f.write_str("_")?,
                }
            }
        }
        Ok(())
    }
}

/// One line of a proof as written: a formula and the rule justifying it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProofLine {
    pub expr: Expr,
    pub rule: Rule,
}

impl ProofLine {
    pub fn new(expr: Expr, rule: Rule) -> Self {
        Self { expr, rule }
    }
}

impl Display for ProofLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.expr, self.rule)
    }
}

/// A proof as written, indexed by position.
pub type Proof = Vec<ProofLine>;
