//! Checking a single proof line against the lines before it.
//!
//! Each rule either produces the dependency set of the new line or fails
//! the whole line; there is no partial rule application. Elimination rules
//! destructure the lines they refer to by matching them against the
//! operator's template (see [`crate::unify`]).

use crate::{
    ast::*,
    resolve::Resolver,
    unify::match_binary,
    util::line_number,
    InternalProof, InternalProofLine, Premises,
};
use smallvec::SmallVec;
use thiserror::Error;

/// Why a line, or a whole proof, was rejected.
///
/// `line` and `referenced` are 0-based indices; the messages number lines
/// from 1 and so do argument positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("line {}: `{conclusion}` cannot be concluded by `{rule}`", .line + 1)]
    MalformedConclusion {
        line: usize,
        conclusion: Expr,
        rule: Rule,
    },
    #[error("line {}: {}", .line + 1, describe_unresolved(.slot, .arg))]
    UnresolvedArgument {
        line: usize,
        slot: usize,
        arg: RuleArg,
    },
    #[error(
        "line {}: argument {} refers to line {}, and `{found}` does not fit the rule",
        .line + 1, .slot + 1, .referenced + 1
    )]
    StructuralMismatch {
        line: usize,
        slot: usize,
        referenced: usize,
        found: Expr,
    },
    #[error("line {}: the rule takes {expected} arguments, found {found}", .line + 1)]
    TooManyArguments {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("the proof has no lines")]
    EmptyProof,
    #[error("line {}: the proof still rests on the assumptions {premises}", .line + 1)]
    UndischargedAssumptions { line: usize, premises: Premises },
    #[error("line {}: the proof concludes `{found}`, not `{goal}`", .line + 1)]
    GoalMismatch { line: usize, goal: Expr, found: Expr },
}

fn describe_unresolved(slot: &usize, arg: &RuleArg) -> String {
    match arg {
        Some(index) => format!(
            "argument {} refers to line {}, which is not an earlier line",
            slot + 1,
            line_number(*index)
        ),
        None => format!("no earlier line fits argument {}", slot + 1),
    }
}

/// The kind of a [`CheckError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckErrorKind {
    MalformedConclusion,
    UnresolvedArgument,
    StructuralMismatch,
    TooManyArguments,
    EmptyProof,
    UndischargedAssumptions,
    GoalMismatch,
}

impl CheckError {
    pub fn kind(&self) -> CheckErrorKind {
        match self {
            CheckError::MalformedConclusion { .. } => CheckErrorKind::MalformedConclusion,
            CheckError::UnresolvedArgument { .. } => CheckErrorKind::UnresolvedArgument,
            CheckError::StructuralMismatch { .. } => CheckErrorKind::StructuralMismatch,
            CheckError::TooManyArguments { .. } => CheckErrorKind::TooManyArguments,
            CheckError::EmptyProof => CheckErrorKind::EmptyProof,
            CheckError::UndischargedAssumptions { .. } => CheckErrorKind::UndischargedAssumptions,
            CheckError::GoalMismatch { .. } => CheckErrorKind::GoalMismatch,
        }
    }

    /// The 0-based index of the offending line.
    pub fn line(&self) -> Option<usize> {
        match self {
            CheckError::MalformedConclusion { line, .. }
            | CheckError::UnresolvedArgument { line, .. }
            | CheckError::StructuralMismatch { line, .. }
            | CheckError::TooManyArguments { line, .. }
            | CheckError::UndischargedAssumptions { line, .. }
            | CheckError::GoalMismatch { line, .. } => Some(*line),
            CheckError::EmptyProof => None,
        }
    }
}

/// Checks `line` as the next line of `proof`.
///
/// The result is the line together with the assumptions it depends on.
/// `proof` is not modified; see [`InternalProof::check_line`] for the
/// appending version.
pub fn check_proof_line(
    proof: &InternalProof,
    line: &ProofLine,
) -> Result<InternalProofLine, CheckError> {
    let checker = LineChecker {
        resolver: Resolver::new(proof, &line.rule),
        conclusion: &line.expr,
        rule: &line.rule,
    };
    let premises = checker.premises()?;
    log::debug!(
        "line {}: {} | {} rests on {premises}",
        line_number(checker.resolver.line()),
        line.expr,
        line.rule
    );
    Ok(InternalProofLine {
        expr: line.expr.clone(),
        rule: line.rule.clone(),
        premises,
    })
}

/// An argument slot together with the argument currently filling it.
///
/// Slots keep their written position even when arguments are reordered,
/// so errors point at what the author wrote.
type Slots = SmallVec<[(usize, RuleArg); 3]>;

struct LineChecker<'a> {
    resolver: Resolver<'a>,
    conclusion: &'a Expr,
    rule: &'a Rule,
}

impl<'a> LineChecker<'a> {
    fn premises(&self) -> Result<Premises, CheckError> {
        let expected = self.rule.slot_count();
        if self.rule.args().len() > expected {
            return Err(CheckError::TooManyArguments {
                line: self.resolver.line(),
                expected,
                found: self.rule.args().len(),
            });
        }
        // only reachable for lines built in code; the parser checks arity
        if !self.conclusion.is_well_formed() {
            return Err(self.malformed());
        }
        match self.rule {
            Rule::Premise => Ok(Premises::singleton(self.resolver.line())),
            Rule::Introduction(op, _) => self.introduction(*op),
            Rule::Elimination(op, _) => self.elimination(*op),
        }
    }

    fn malformed(&self) -> CheckError {
        CheckError::MalformedConclusion {
            line: self.resolver.line(),
            conclusion: self.conclusion.clone(),
            rule: self.rule.clone(),
        }
    }

    /// Accepts `line` if its formula is `expected`, yielding its premises.
    fn expect(
        &self,
        slot: usize,
        index: usize,
        line: &'a InternalProofLine,
        expected: &Expr,
    ) -> Result<&'a Premises, CheckError> {
        if line.expr == *expected {
            Ok(&line.premises)
        } else {
            Err(self.resolver.mismatch(slot, index))
        }
    }

    fn introduction(&self, op: Operator) -> Result<Premises, CheckError> {
        let operands = self
            .conclusion
            .operands_of(op)
            .ok_or_else(|| self.malformed())?;
        match (op, operands) {
            (Operator::Not, [assumption]) => self.negation_introduction(assumption),
            (Operator::And, [left, right]) => self.conjunction_introduction(left, right),
            (Operator::Or, [left, right]) => self.disjunction_introduction(left, right),
            (Operator::Implies, [left, right]) => self.implication_introduction(left, right),
            _ => Err(self.malformed()),
        }
    }

    /// `~P` from an assumption `P` that a contradiction rests on.
    ///
    /// A contradiction is a later line derived by negation elimination whose
    /// premises include the assumption, which is discharged from them.
    fn negation_introduction(&self, assumption: &Expr) -> Result<Premises, CheckError> {
        let (_, premises) = self.resolver.resolve(0, self.rule.arg(0), |i, line| {
            self.expect(0, i, line, assumption)?;
            self.contradiction_resting_on(i)
                .ok_or_else(|| self.resolver.mismatch(0, i))
        })?;
        Ok(premises)
    }

    /// The discharged premises of the contradiction to use for `assumption`:
    /// the one contained in every other candidate, or else the latest.
    fn contradiction_resting_on(&self, assumption: usize) -> Option<Premises> {
        let candidates: Vec<Premises> = self
            .resolver
            .proof()
            .lines()
            .iter()
            .skip(assumption + 1)
            .filter(|line| {
                matches!(line.rule, Rule::Elimination(Operator::Not, _))
                    && line.premises.contains(assumption)
            })
            .map(|line| line.premises.without(assumption))
            .collect();
        let smallest = candidates
            .iter()
            .position(|c| candidates.iter().all(|other| c.is_subset(other)));
        match smallest {
            Some(k) => candidates.into_iter().nth(k),
            None => candidates.into_iter().last(),
        }
    }

    fn conjunction_introduction(&self, left: &Expr, right: &Expr) -> Result<Premises, CheckError> {
        let (_, l) = self
            .resolver
            .resolve(0, self.rule.arg(0), |i, line| self.expect(0, i, line, left))?;
        let (_, r) = self
            .resolver
            .resolve(1, self.rule.arg(1), |i, line| self.expect(1, i, line, right))?;
        Ok(l.union(r))
    }

    fn disjunction_introduction(&self, left: &Expr, right: &Expr) -> Result<Premises, CheckError> {
        let (_, premises) = self.resolver.resolve(0, self.rule.arg(0), |i, line| {
            self.expect(0, i, line, left)
                .or_else(|_| self.expect(0, i, line, right))
        })?;
        Ok(premises.clone())
    }

    /// `L -> R` from a line `R` resting on an assumption `L`, which is discharged.
    fn implication_introduction(&self, left: &Expr, right: &Expr) -> Result<Premises, CheckError> {
        let (_, premises) = self.resolver.resolve(1, self.rule.arg(1), |j, line| {
            let consequent = self.expect(1, j, line, right)?;
            let (i, _) =
                self.resolver
                    .resolve_premise(0, self.rule.arg(0), consequent, |i, assumption| {
                        self.expect(0, i, assumption, left)
                    })?;
            Ok(consequent.without(i))
        })?;
        Ok(premises)
    }

    fn elimination(&self, op: Operator) -> Result<Premises, CheckError> {
        match op {
            Operator::Not => self.negation_elimination(),
            Operator::And => self.conjunction_elimination(),
            Operator::Or => self.disjunction_elimination(&self.promoted_slots(op)),
            Operator::Implies => self.implication_elimination(&self.promoted_slots(op)),
        }
    }

    /// Any formula from a line and its negation.
    fn negation_elimination(&self) -> Result<Premises, CheckError> {
        let (_, premises) = self.resolver.resolve(0, self.rule.arg(0), |_, first| {
            let (_, second) = self.resolver.resolve(1, self.rule.arg(1), |j, second| {
                if contradicts(&first.expr, &second.expr) {
                    Ok(&second.premises)
                } else {
                    Err(self.resolver.mismatch(1, j))
                }
            })?;
            Ok(first.premises.union(second))
        })?;
        Ok(premises)
    }

    fn conjunction_elimination(&self) -> Result<Premises, CheckError> {
        let (_, premises) = self.resolver.resolve(0, self.rule.arg(0), |i, line| {
            match match_binary(Operator::And, &line.expr) {
                Some((left, right)) if left == self.conclusion || right == self.conclusion => {
                    Ok(line.premises.clone())
                }
                _ => Err(self.resolver.mismatch(0, i)),
            }
        })?;
        Ok(premises)
    }

    /// The rule's slots, with the first explicit argument of shape `op`
    /// moved to the front when the first slot does not have that shape.
    fn promoted_slots(&self, op: Operator) -> Slots {
        let mut slots: Slots = (0..self.rule.slot_count())
            .map(|slot| (slot, self.rule.arg(slot)))
            .collect();
        let has_shape = |arg: RuleArg| {
            arg.and_then(|i| self.resolver.get(i))
                .is_some_and(|line| line.expr.as_binary(op).is_some())
        };
        let misplaced = slots[0]
            .1
            .and_then(|i| self.resolver.get(i))
            .is_some_and(|line| line.expr.as_binary(op).is_none());
        if !misplaced {
            return slots;
        }
        if let Some(k) = (1..slots.len()).find(|&k| has_shape(slots[k].1)) {
            let promoted = slots.remove(k);
            log::debug!(
                "line {}: argument {} is the {op}, trying it first",
                line_number(self.resolver.line()),
                promoted.0 + 1
            );
            slots.insert(0, promoted);
        }
        slots
    }

    /// `C` from `X \/ Y`, a line `C` resting on `X` and a line `C` resting
    /// on `Y`; each case assumption is discharged from its case line.
    fn disjunction_elimination(&self, slots: &Slots) -> Result<Premises, CheckError> {
        let [(s0, a0), (s1, a1), (s2, a2)] = slots[..] else {
            return Err(self.malformed());
        };
        let (_, premises) = self.resolver.resolve(s0, a0, |i, line| {
            let (left, right) =
                match_binary(Operator::Or, &line.expr).ok_or_else(|| self.resolver.mismatch(s0, i))?;
            let cases = |first: &Expr, second: &Expr| {
                Ok::<_, CheckError>((self.case(s1, a1, first)?, self.case(s2, a2, second)?))
            };
            let (first, second) = match cases(left, right) {
                Ok(found) => found,
                Err(err) if left == right => return Err(err),
                Err(err) => cases(right, left).map_err(|_| err)?,
            };
            Ok(line.premises.union(&first).union(&second))
        })?;
        Ok(premises)
    }

    /// A line in `slot` that concludes this line's formula while resting on
    /// the case `assumption`, with the assumption discharged.
    fn case(&self, slot: usize, arg: RuleArg, assumption: &Expr) -> Result<Premises, CheckError> {
        let (_, premises) = self.resolver.resolve(slot, arg, |j, line| {
            let premises = self.expect(slot, j, line, self.conclusion)?;
            let (k, _) = self
                .resolver
                .resolve_premise(slot, None, premises, |k, case| {
                    self.expect(slot, k, case, assumption)
                })
                .map_err(|_| self.resolver.mismatch(slot, j))?;
            Ok(premises.without(k))
        })?;
        Ok(premises)
    }

    /// `Y` from `X -> Y` and `X`.
    fn implication_elimination(&self, slots: &Slots) -> Result<Premises, CheckError> {
        let [(s0, a0), (s1, a1)] = slots[..] else {
            return Err(self.malformed());
        };
        let (_, premises) = self.resolver.resolve(s0, a0, |i, line| {
            let (antecedent, consequent) = match_binary(Operator::Implies, &line.expr)
                .filter(|(_, consequent)| *consequent == self.conclusion)
                .ok_or_else(|| self.resolver.mismatch(s0, i))?;
            let (_, minor) = self
                .resolver
                .resolve(s1, a1, |j, minor| self.expect(s1, j, minor, antecedent))?;
            Ok(line.premises.union(minor))
        })?;
        Ok(premises)
    }
}

/// Whether one formula is the negation of the other.
fn contradicts(first: &Expr, second: &Expr) -> bool {
    second.as_negation() == Some(first) || first.as_negation() == Some(second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_lines;

    fn check(text: &str) -> Result<InternalProof, CheckError> {
        check_lines(&parse_proof(None, text).unwrap())
    }

    fn last_premises(text: &str) -> Vec<usize> {
        let proof = check(text).unwrap();
        proof.lines().last().unwrap().premises.iter().collect()
    }

    #[test]
    fn premise_rests_on_itself() {
        assert_eq!(last_premises("A | premise\nB | premise"), vec![1]);
    }

    #[test]
    fn conjunction() {
        assert_eq!(
            last_premises("A | premise\nB | premise\nA /\\ B | introduce /\\ with 1, 2"),
            vec![0, 1]
        );
        assert_eq!(
            last_premises("A /\\ B | premise\nB | eliminate /\\ with 1"),
            vec![0]
        );
        let err = check("A /\\ B | premise\nC | eliminate /\\ with 1").unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::StructuralMismatch);
        // not commutative
        let err = check("A | premise\nB | premise\nB /\\ A | introduce /\\ with 1, 2").unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::StructuralMismatch);
    }

    #[test]
    fn disjunction_introduction_accepts_either_side() {
        assert_eq!(last_premises("B | premise\nA \\/ B | introduce \\/ with 1"), vec![0]);
        assert_eq!(last_premises("A | premise\nA \\/ B | introduce \\/"), vec![0]);
        let err = check("C | premise\nA \\/ B | introduce \\/ with 1").unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::StructuralMismatch);
    }

    #[test]
    fn implication_discharges_its_assumption() {
        assert_eq!(
            last_premises(
                "A | premise\nB | premise\nA /\\ B | introduce /\\ with 1, 2\nA -> A /\\ B | introduce -> with 1, 3"
            ),
            vec![1]
        );
        assert_eq!(last_premises("A | premise\nA -> A | introduce ->"), Vec::<usize>::new());
        // the assumption must be one the consequent rests on
        let err = check("A | premise\nB | premise\nB -> A | introduce -> with 2, 1").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.kind(), CheckErrorKind::StructuralMismatch);
    }

    #[test]
    fn implication_elimination() {
        assert_eq!(
            last_premises("A -> B | premise\nA | premise\nB | eliminate -> with 1, 2"),
            vec![0, 1]
        );
        // arguments may be given in either order
        assert_eq!(
            last_premises("A -> B | premise\nA | premise\nB | eliminate -> with 2, 1"),
            vec![0, 1]
        );
        assert_eq!(
            last_premises("A | premise\nA -> B | premise\nB | eliminate -> with 2"),
            vec![0, 1]
        );
        let err = check("A -> B | premise\nA | premise\nA | eliminate -> with 1, 2").unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::StructuralMismatch);
    }

    #[test]
    fn negation_elimination_concludes_anything() {
        assert_eq!(
            last_premises("A | premise\n~A | premise\nC | eliminate ~ with 1, 2"),
            vec![0, 1]
        );
        assert_eq!(
            last_premises("~A | premise\nA | premise\nC | eliminate ~ with 1, 2"),
            vec![0, 1]
        );
        assert_eq!(
            last_premises("A | premise\n~A | premise\nC | eliminate ~"),
            vec![0, 1]
        );
        let err = check("A | premise\n~B | premise\nC | eliminate ~ with 1, 2").unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::StructuralMismatch);
    }

    #[test]
    fn disjunction_elimination() {
        let proof = "A \\/ B | premise
A | premise
B \\/ A | introduce \\/ with 2
B | premise
B \\/ A | introduce \\/ with 4
B \\/ A | eliminate \\/ with 1, 3, 5";
        assert_eq!(last_premises(proof), vec![0]);

        // case lines in either order
        let swapped = proof.replace("with 1, 3, 5", "with 1, 5, 3");
        assert_eq!(last_premises(&swapped), vec![0]);

        let searched = proof.replace("with 1, 3, 5", "with 1");
        assert_eq!(last_premises(&searched), vec![0]);
    }

    #[test]
    fn disjunction_elimination_finds_the_disjunction_in_any_slot() {
        let proof = "A \\/ B | premise
A -> C | premise
B -> C | premise
A | premise
C | eliminate -> with 2, 4
B | premise
C | eliminate -> with 3, 6
C | eliminate \\/ with 1, 5, 7";
        assert_eq!(last_premises(proof), vec![0, 1, 2]);
        for args in ["with 5, 1, 7", "with 5, 7, 1", "with 1, 7, 5", "with 1", "with"] {
            let reordered = proof.replace("with 1, 5, 7", args);
            assert_eq!(last_premises(&reordered), vec![0, 1, 2], "{args}");
        }
    }

    #[test]
    fn disjunction_elimination_cases_must_agree() {
        let err = check(
            "A \\/ B | premise
A | premise
A \\/ C | introduce \\/ with 2
B | premise
C \\/ B | introduce \\/ with 4
A \\/ C | eliminate \\/ with 1, 3, 5",
        )
        .unwrap_err();
        assert_eq!(err.line(), Some(5));
        assert_eq!(err.kind(), CheckErrorKind::StructuralMismatch);
    }

    #[test]
    fn conclusion_shape_must_match_introduction() {
        let err = check("A | premise\nA | introduce /\\ with 1, 1").unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::MalformedConclusion);
        let err = check("A | premise\nA \\/ A | introduce /\\ with 1, 1").unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::MalformedConclusion);
        let err = check("A | premise\n~A | introduce -> with 1, 1").unwrap_err();
        assert_eq!(err.kind(), CheckErrorKind::MalformedConclusion);
    }

    #[test]
    fn out_of_range_arguments_are_unresolved() {
        for text in [
            "A | premise\nA /\\ A | introduce /\\ with 1, 9",
            "A | premise\nA -> A | introduce -> with 9, 1",
            "A | premise\nA | eliminate /\\ with 2",
            "A | premise\nB | eliminate ~ with 1, 7",
            "A -> B | premise\nB | eliminate -> with 1, 3",
            "A \\/ B | premise\nB | eliminate \\/ with 1, 4, 5",
            "A | premise\n~A | introduce ~ with 5",
            "A | premise\nA \\/ B | introduce \\/ with 4",
        ] {
            let err = check(text).unwrap_err();
            assert_eq!(err.kind(), CheckErrorKind::UnresolvedArgument, "{text}");
            assert_eq!(err.line(), Some(1), "{text}");
        }
    }

    #[test]
    fn searches_report_the_rejected_explicit_argument() {
        let mismatch = |text: &str| match check(text).unwrap_err() {
            CheckError::StructuralMismatch {
                line,
                slot,
                referenced,
                ..
            } => (line, slot, referenced),
            err => panic!("{text}: {err:?}"),
        };
        assert_eq!(
            mismatch("A -> B | premise\nC | premise\nB | eliminate -> with _, 2"),
            (2, 1, 1)
        );
        assert_eq!(
            mismatch("A | premise\nB | premise\nB -> A | introduce -> with 2"),
            (2, 0, 1)
        );
        assert_eq!(
            mismatch("A | premise\n~B | premise\nC | eliminate ~ with _, 2"),
            (2, 1, 1)
        );
    }

    #[test]
    fn searches_still_try_later_candidates() {
        let text = "A | premise
B | premise
A /\\ B | introduce /\\ with 1, 2
A | eliminate /\\ with 3
B -> A | introduce -> with 2";
        // the first `A` does not rest on `B`, the second does
        assert_eq!(last_premises(text), vec![0]);
    }

    #[test]
    fn too_many_arguments() {
        let proof = InternalProof::new();
        let line = ProofLine::new(Expr::prop("A"), Rule::elimination(Operator::And, [Some(0), Some(0)]));
        assert_eq!(
            check_proof_line(&proof, &line),
            Err(CheckError::TooManyArguments {
                line: 0,
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn built_conclusions_must_have_operator_arity() {
        let proof = InternalProof::new();
        let lopsided = Expr::Nary(Operator::Or, vec![Expr::prop("A")]);
        for rule in [Rule::Premise, Rule::introduction(Operator::Or, [Some(0)])] {
            let line = ProofLine::new(lopsided.clone(), rule);
            let err = check_proof_line(&proof, &line).unwrap_err();
            assert_eq!(err.kind(), CheckErrorKind::MalformedConclusion);
        }
    }

    #[test]
    fn messages_number_lines_from_one() {
        let err = check("A | premise\nA /\\ A | introduce /\\ with 1, 9").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 2: argument 2 refers to line 9, which is not an earlier line"
        );
    }
}
