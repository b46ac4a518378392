//! One-way matching of an expression against a template.
//!
//! Every proposition in the template is a meta-variable that binds to the
//! subexpression at the same position in the concrete expression.

use crate::{ast::*, util::IndexMap};

/// Meta-variable bindings, in order of first occurrence in the template.
pub type Substitution<'a> = IndexMap<Symbol, &'a Expr>;

/// Matches `concrete` against `pattern`, returning the bindings of the
/// pattern's meta-variables.
///
/// A meta-variable that occurs more than once must bind to structurally
/// equal subexpressions each time.
pub fn unify<'a>(pattern: &Expr, concrete: &'a Expr) -> Option<Substitution<'a>> {
    let mut constraints: Vec<(Symbol, &'a Expr)> = Vec::new();
    let mut tasks = vec![(pattern, concrete)];

    while let Some((p, c)) = tasks.pop() {
        match (p, c) {
            (Expr::Prop(var), _) => constraints.push((*var, c)),
            (Expr::Ref(n), Expr::Ref(m)) if n == m => {}
            (Expr::Nary(p_op, p_args), Expr::Nary(c_op, c_args))
                if p_op == c_op && p_args.len() == c_args.len() =>
            {
                // reversed so the left operand is visited first
                tasks.extend(p_args.iter().zip(c_args.iter()).rev());
            }
            _ => return None,
        }
    }

    let mut subst = Substitution::default();
    for (var, expr) in constraints {
        match subst.get(&var) {
            None => {
                subst.insert(var, expr);
            }
            Some(bound) if *bound == expr => {}
            Some(_) => return None,
        }
    }
    Some(subst)
}

pub fn unifiable(pattern: &Expr, concrete: &Expr) -> bool {
    unify(pattern, concrete).is_some()
}

/// The template `L <op> R` for a binary operator.
pub(crate) fn binary_template(op: Operator) -> Expr {
    Expr::Nary(op, vec![Expr::prop(LEFT), Expr::prop(RIGHT)])
}

pub(crate) const LEFT: &str = "L";
pub(crate) const RIGHT: &str = "R";

/// The two operands bound by matching `expr` against [`binary_template`].
pub(crate) fn match_binary(op: Operator, expr: &Expr) -> Option<(&Expr, &Expr)> {
    let subst = unify(&binary_template(op), expr)?;
    let left = subst.get(&Symbol::from(LEFT)).copied()?;
    let right = subst.get(&Symbol::from(RIGHT)).copied()?;
    Some((left, right))
}
