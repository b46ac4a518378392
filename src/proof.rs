//! Checked proofs and the whole-proof checker.

use crate::{ast::*, check_proof_line, util::line_number, CheckError, Premises};
use std::fmt::{self, Display};
use std::ops::Index;

/// A proof line that has been checked, together with the assumptions it
/// rests on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalProofLine {
    pub expr: Expr,
    pub rule: Rule,
    pub premises: Premises,
}

impl InternalProofLine {
    pub fn to_proof_line(&self) -> ProofLine {
        ProofLine::new(self.expr.clone(), self.rule.clone())
    }
}

/// The checked prefix of a proof.
///
/// Line `i` is always the result of checking input line `i`. Lines are
/// only ever appended, and only after they check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternalProof {
    lines: Vec<InternalProofLine>,
}

impl InternalProof {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[InternalProofLine] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&InternalProofLine> {
        self.lines.get(index)
    }

    pub fn last(&self) -> Option<&InternalProofLine> {
        self.lines.last()
    }

    /// Checks `line` against the current lines and appends it if it checks.
    ///
    /// On failure the proof is left as it was.
    pub fn check_line(&mut self, line: &ProofLine) -> Result<&InternalProofLine, CheckError> {
        let checked = check_proof_line(self, line)?;
        self.lines.push(checked);
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Requires the proof to have a last line that rests on no assumption.
    pub fn validate(&self) -> Result<&InternalProofLine, CheckError> {
        let last = self.last().ok_or(CheckError::EmptyProof)?;
        if !last.premises.is_empty() {
            return Err(CheckError::UndischargedAssumptions {
                line: self.len() - 1,
                premises: last.premises.clone(),
            });
        }
        Ok(last)
    }

    /// Like [`InternalProof::validate`], and the last line must also
    /// conclude `goal`.
    pub fn validate_goal(&self, goal: &Expr) -> Result<&InternalProofLine, CheckError> {
        let last = self.validate()?;
        if last.expr != *goal {
            return Err(CheckError::GoalMismatch {
                line: self.len() - 1,
                goal: goal.clone(),
                found: last.expr.clone(),
            });
        }
        Ok(last)
    }

    /// The input lines this proof was checked from.
    pub fn to_proof(&self) -> Proof {
        self.lines.iter().map(InternalProofLine::to_proof_line).collect()
    }
}

impl Index<usize> for InternalProof {
    type Output = InternalProofLine;

    fn index(&self, index: usize) -> &InternalProofLine {
        &self.lines[index]
    }
}

impl<'a> IntoIterator for &'a InternalProof {
    type Item = &'a InternalProofLine;
    type IntoIter = std::slice::Iter<'a, InternalProofLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// One row per line: number, premises, formula and rule, in aligned columns.
impl Display for InternalProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<[String; 4]> = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                [
                    format!("{}.", line_number(i)),
                    line.premises.to_string(),
                    line.expr.to_string(),
                    line.rule.to_string(),
                ]
            })
            .collect();
        let width = |col: usize| rows.iter().map(|row| row[col].len()).max().unwrap_or(0);
        let (number, premises, expr) = (width(0), width(1), width(2));
        for (i, [n, p, e, r]) in rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{n:>number$} {p:<premises$} |- {e:<expr$} | {r}")?;
        }
        Ok(())
    }
}

/// Checks every line in order, stopping at the first that fails.
///
/// Unlike [`check_proof`], the last line may still rest on assumptions.
pub fn check_lines(proof: &[ProofLine]) -> Result<InternalProof, CheckError> {
    proof
        .iter()
        .try_fold(InternalProof::new(), |mut checked, line| {
            checked.check_line(line)?;
            Ok(checked)
        })
}

/// Checks a complete proof: every line must check and the last line must
/// rest on no assumption.
pub fn check_proof(proof: &[ProofLine]) -> Result<InternalProof, CheckError> {
    let checked = check_lines(proof)?;
    checked.validate()?;
    Ok(checked)
}

/// Like [`check_proof`], and the proof must conclude `goal`.
pub fn check_proof_of(proof: &[ProofLine], goal: &Expr) -> Result<InternalProof, CheckError> {
    let checked = check_lines(proof)?;
    checked.validate_goal(goal)?;
    Ok(checked)
}
