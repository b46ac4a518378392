//! Turning rule arguments into earlier proof lines.
//!
//! An explicit argument names exactly one candidate and is never retried
//! elsewhere. An open argument scans the candidates in increasing index
//! order and takes the first one the rule accepts. When none is accepted
//! and some candidate was turned down by an explicit argument of another
//! slot, that rejection is reported instead of the open slot.

use crate::{
    ast::{Rule, RuleArg},
    CheckError, InternalProof, InternalProofLine, Premises,
};

pub(crate) struct Resolver<'a> {
    proof: &'a InternalProof,
    rule: &'a Rule,
    /// Index of the line being checked.
    line: usize,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(proof: &'a InternalProof, rule: &'a Rule) -> Self {
        Self {
            proof,
            rule,
            line: proof.len(),
        }
    }

    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn proof(&self) -> &'a InternalProof {
        self.proof
    }

    /// The earlier line at `index`, if there is one.
    pub(crate) fn get(&self, index: usize) -> Option<&'a InternalProofLine> {
        self.proof.get(index)
    }

    /// Resolves the argument in `slot` to an earlier line accepted by `cond`.
    pub(crate) fn resolve<T>(
        &self,
        slot: usize,
        arg: RuleArg,
        cond: impl Fn(usize, &'a InternalProofLine) -> Result<T, CheckError>,
    ) -> Result<(usize, T), CheckError> {
        match arg {
            Some(index) => {
                let candidate = self.get(index).ok_or_else(|| self.unresolved(slot, arg))?;
                cond(index, candidate).map(|t| (index, t))
            }
            None => self.search(slot, 0..self.proof.len(), cond),
        }
    }

    /// Like [`Resolver::resolve`], restricted to the assumptions in `premises`.
    pub(crate) fn resolve_premise<T>(
        &self,
        slot: usize,
        arg: RuleArg,
        premises: &Premises,
        cond: impl Fn(usize, &'a InternalProofLine) -> Result<T, CheckError>,
    ) -> Result<(usize, T), CheckError> {
        match arg {
            Some(index) => {
                let candidate = self.get(index).ok_or_else(|| self.unresolved(slot, arg))?;
                if !premises.contains(index) {
                    return Err(self.mismatch(slot, index));
                }
                cond(index, candidate).map(|t| (index, t))
            }
            None => self.search(slot, premises.iter(), cond),
        }
    }

    fn search<T>(
        &self,
        slot: usize,
        candidates: impl Iterator<Item = usize>,
        cond: impl Fn(usize, &'a InternalProofLine) -> Result<T, CheckError>,
    ) -> Result<(usize, T), CheckError> {
        let mut rejected_explicit = None;
        for index in candidates {
            let Some(candidate) = self.get(index) else {
                break;
            };
            match cond(index, candidate) {
                Ok(t) => return Ok((index, t)),
                Err(err) => {
                    log::trace!("slot {slot} skips line {index}: {err}");
                    if rejected_explicit.is_none() && self.blames_explicit_slot(slot, &err) {
                        rejected_explicit = Some(err);
                    }
                }
            }
        }
        Err(rejected_explicit.unwrap_or_else(|| self.unresolved(slot, None)))
    }

    /// Whether `err` is about a slot other than `searched` that the rule
    /// fills explicitly.
    fn blames_explicit_slot(&self, searched: usize, err: &CheckError) -> bool {
        match err {
            CheckError::UnresolvedArgument { slot, .. }
            | CheckError::StructuralMismatch { slot, .. } => {
                *slot != searched && self.rule.arg(*slot).is_some()
            }
            _ => false,
        }
    }

    pub(crate) fn unresolved(&self, slot: usize, arg: RuleArg) -> CheckError {
        CheckError::UnresolvedArgument {
            line: self.line,
            slot,
            arg,
        }
    }

    /// The line at `referenced` does not have the shape the rule needs.
    ///
    /// `referenced` must be an earlier line.
    pub(crate) fn mismatch(&self, slot: usize, referenced: usize) -> CheckError {
        CheckError::StructuralMismatch {
            line: self.line,
            slot,
            referenced,
            found: self.proof[referenced].expr.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::check_lines;

    fn proof(text: &str) -> InternalProof {
        check_lines(&parse_proof(None, text).unwrap()).unwrap()
    }

    #[test]
    fn explicit_arguments_are_not_retried() {
        let proof = proof("A | premise\nB | premise\nA | premise");
        let resolver = Resolver::new(&proof, &Rule::Premise);
        let want_a = |i, line: &InternalProofLine| {
            if line.expr == Expr::prop("A") {
                Ok(())
            } else {
                Err(resolver.mismatch(0, i))
            }
        };
        assert_eq!(resolver.resolve(0, Some(2), want_a), Ok((2, ())));
        assert!(matches!(
            resolver.resolve(0, Some(1), want_a),
            Err(CheckError::StructuralMismatch { referenced: 1, .. })
        ));
    }

    #[test]
    fn open_arguments_take_the_lowest_index() {
        let proof = proof("B | premise\nA | premise\nA | premise");
        let resolver = Resolver::new(&proof, &Rule::Premise);
        let found = resolver.resolve(1, None, |i, line: &InternalProofLine| {
            if line.expr == Expr::prop("A") {
                Ok(i)
            } else {
                Err(resolver.mismatch(1, i))
            }
        });
        assert_eq!(found, Ok((1, 1)));
    }

    #[test]
    fn out_of_range_and_unsatisfied() {
        let proof = proof("A | premise");
        let resolver = Resolver::new(&proof, &Rule::Premise);
        let any = |_: usize, _: &InternalProofLine| Ok::<(), CheckError>(());
        assert_eq!(
            resolver.resolve(0, Some(1), any),
            Err(CheckError::UnresolvedArgument {
                line: 1,
                slot: 0,
                arg: Some(1)
            })
        );
        let none = |i, _: &InternalProofLine| Err::<(), _>(resolver.mismatch(0, i));
        assert_eq!(
            resolver.resolve(0, None, none),
            Err(CheckError::UnresolvedArgument {
                line: 1,
                slot: 0,
                arg: None
            })
        );
    }

    #[test]
    fn open_slots_report_rejected_explicit_arguments() {
        let proof = proof("A | premise\nB | premise");
        let rule = Rule::elimination(Operator::Not, [None, Some(1)]);
        let resolver = Resolver::new(&proof, &rule);
        let found = resolver.resolve(0, None, |_, _: &InternalProofLine| {
            Err::<(), _>(resolver.mismatch(1, 1))
        });
        assert!(matches!(
            found,
            Err(CheckError::StructuralMismatch { slot: 1, referenced: 1, .. })
        ));

        // a wildcard in the other slot is just another failed search
        let rule = Rule::elimination(Operator::Not, [None, None]);
        let resolver = Resolver::new(&proof, &rule);
        let found = resolver.resolve(0, None, |_, _: &InternalProofLine| {
            Err::<(), _>(resolver.unresolved(1, None))
        });
        assert_eq!(
            found,
            Err(CheckError::UnresolvedArgument {
                line: 2,
                slot: 0,
                arg: None
            })
        );
    }

    #[test]
    fn premise_arguments_must_be_open_assumptions() {
        let proof = proof("A | premise\nA | premise");
        let resolver = Resolver::new(&proof, &Rule::Premise);
        let premises = Premises::singleton(1);
        let any = |_: usize, _: &InternalProofLine| Ok::<(), CheckError>(());
        assert_eq!(resolver.resolve_premise(0, None, &premises, any), Ok((1, ())));
        assert!(matches!(
            resolver.resolve_premise(0, Some(0), &premises, any),
            Err(CheckError::StructuralMismatch { referenced: 0, .. })
        ));
        assert!(matches!(
            resolver.resolve_premise(0, Some(5), &premises, any),
            Err(CheckError::UnresolvedArgument { arg: Some(5), .. })
        ));
    }
}
