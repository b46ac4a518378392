//! # zeroth
//! zeroth checks natural-deduction proofs in propositional logic.
//!
//! A proof is a sequence of lines, each a formula justified by a rule:
//! `premise`, or the introduction or elimination rule of one of the
//! connectives `~`, `/\`, `\/` and `->`. Checking a line computes the set of
//! assumptions it rests on; a proof is complete when its last line rests on
//! none.
//!
//! ```
//! let proof = zeroth::parse_proof(None, "
//! A /\\ B      | premise
//! A           | eliminate /\\ with 1
//! A /\\ B -> A | introduce -> with 1, 2
//! ").unwrap();
//! let checked = zeroth::check_proof(&proof).unwrap();
//! assert!(checked.last().unwrap().premises.is_empty());
//! ```
//!
//! Rule arguments may be left out, in which case the checker searches for
//! the earliest line that fits.
pub mod ast;
mod checker;
mod cli;
mod premises;
mod proof;
mod resolve;
pub mod unify;
pub mod util;

pub use ast::{
    parse_expr, parse_proof, parse_proof_line, Expr, Operator, ParseError, Proof, ProofLine, Rule,
    RuleArg, Symbol,
};
pub use checker::{check_proof_line, CheckError, CheckErrorKind};
#[cfg(feature = "bin")]
pub use cli::bin::*;
pub use cli::*;
pub use premises::Premises;
pub use proof::{check_lines, check_proof, check_proof_of, InternalProof, InternalProofLine};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error(transparent)]
    CheckError(#[from] CheckError),
}

/// Parses a proof and checks that it is complete.
pub fn parse_and_check_proof(filename: Option<String>, input: &str) -> Result<InternalProof, Error> {
    let proof = parse_proof(filename, input)?;
    Ok(check_proof(&proof)?)
}

/// Parses a proof and checks that it is complete and concludes `goal`.
pub fn parse_and_check_proof_of(
    filename: Option<String>,
    input: &str,
    goal: &Expr,
) -> Result<InternalProof, Error> {
    let proof = parse_proof(filename, input)?;
    Ok(check_proof_of(&proof, goal)?)
}
