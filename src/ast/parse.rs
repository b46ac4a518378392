//! Parse proofs written as text.
//!
//! Each non-blank line is `<expression> | <rule>`. Spaces and tabs separate
//! tokens, newlines separate proof lines and `;` comments out the rest of a
//! line. Line numbers in rule arguments are 1-based in the text and 0-based
//! once parsed.

use crate::ast::*;

use std::fmt::{self, Display};
use std::sync::Arc;
use thiserror::Error;

pub fn parse_proof(filename: Option<String>, input: &str) -> Result<Proof, ParseError> {
    let (out, rest) = proof(&Context::new(filename, input))?;
    rest.expect_end()?;
    Ok(out)
}

pub fn parse_proof_line(filename: Option<String>, input: &str) -> Result<ProofLine, ParseError> {
    let ctx = Context::new(filename, input);
    let (out, rest) = proof_line(&ctx)?;
    skip_newlines(&rest).expect_end()?;
    Ok(out)
}

pub fn parse_expr(filename: Option<String>, input: &str) -> Result<Expr, ParseError> {
    let ctx = Context::new(filename, input);
    let (out, rest) = expr(&ctx)?;
    skip_newlines(&rest).expect_end()?;
    Ok(out)
}

/// A [`Span`] contains the file name and a pair of offsets representing the start and the end.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span(Arc<SrcFile>, usize, usize);

impl Span {
    pub fn string(&self) -> &str {
        &self.0.contents[self.1..self.2]
    }

    /// The 1-based line of the source the span starts on.
    pub fn line(&self) -> usize {
        self.0.get_location(self.1).line
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct SrcFile {
    name: Option<String>,
    contents: String,
}

struct Location {
    line: usize,
    col: usize,
}

impl SrcFile {
    fn get_location(&self, offset: usize) -> Location {
        let mut line = 1;
        let mut col = 1;
        for (i, c) in self.contents.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Location { line, col }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.0.get_location(self.1);
        let end = self.0.get_location(self.2.saturating_sub(1).max(self.1));
        let quote = self.string();
        match (&self.0.name, start.line == end.line) {
            (Some(filename), true) => write!(
                f,
                "In {}:{}-{} of {filename}: {quote}",
                start.line, start.col, end.col
            ),
            (Some(filename), false) => write!(
                f,
                "In {}:{}-{}:{} of {filename}: {quote}",
                start.line, start.col, end.line, end.col
            ),
            (None, false) => write!(
                f,
                "In {}:{}-{}:{}: {quote}",
                start.line, start.col, end.line, end.col
            ),
            (None, true) => write!(f, "In {}:{}-{}: {quote}", start.line, start.col, end.col),
        }
    }
}

#[derive(Clone, Debug)]
struct Context {
    source: Arc<SrcFile>,
    index: usize,
}

impl Context {
    fn new(name: Option<String>, contents: &str) -> Context {
        let mut next = Context {
            source: Arc::new(SrcFile {
                name,
                contents: contents.to_string(),
            }),
            index: 0,
        };
        next.advance_past_whitespace();
        next
    }

    fn rest(&self) -> &str {
        &self.source.contents[self.index..]
    }

    fn span(&self, start: usize) -> Span {
        Span(self.source.clone(), start, self.index)
    }

    /// An empty span at the current position, widened to the rest of the
    /// physical line so errors quote what was found.
    fn here(&self) -> Span {
        let len = self.rest().find('\n').unwrap_or(self.rest().len());
        Span(self.source.clone(), self.index, self.index + len)
    }

    fn advance_text(&self, s: &str) -> Option<(Span, Context)> {
        if self.rest().starts_with(s) {
            let mut next = self.clone();
            next.index += s.len();
            let span = next.span(self.index);
            next.advance_past_whitespace();
            Some((span, next))
        } else {
            None
        }
    }

    /// Skips spaces, tabs and comments, but never a newline.
    fn advance_past_whitespace(&mut self) {
        let mut iter = self.rest().char_indices();
        let mut in_comment = false;
        let end = loop {
            match iter.next() {
                Some((i, '\n')) => break i,
                Some((_, ';')) => in_comment = true,
                Some((_, c)) if in_comment || c == ' ' || c == '\t' || c == '\r' => {}
                Some((i, _)) => break i,
                None => break self.rest().len(),
            }
        };
        self.index += end;
    }

    fn is_at_end(&self) -> bool {
        self.index == self.source.contents.len()
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput(self.here()))
        }
    }
}

type Res<T> = Result<(T, Context), ParseError>;

trait Parser<T>: Fn(&Context) -> Res<T> + Clone {}
impl<T, F: Fn(&Context) -> Res<T> + Clone> Parser<T> for F {}

fn text(s: &str) -> impl Parser<Span> + '_ {
    move |ctx| {
        ctx.advance_text(s)
            .ok_or_else(|| ParseError::ExpectedText(ctx.here(), s.to_string()))
    }
}

fn repeat<T>(parser: impl Parser<T>) -> impl Parser<Vec<T>> {
    move |ctx| {
        let mut vec = Vec::new();
        let mut next = ctx.clone();
        while let Ok((x, rest)) = parser(&next) {
            vec.push(x);
            next = rest;
        }
        Ok((vec, next))
    }
}

fn choice<T>(a: impl Parser<T>, b: impl Parser<T>) -> impl Parser<T> {
    move |ctx| a(ctx).or_else(|_| b(ctx))
}

fn map<T, U>(parser: impl Parser<T>, f: impl Fn(T) -> U + Clone) -> impl Parser<U> {
    move |ctx| {
        let (x, next) = parser(ctx)?;
        Ok((f(x), next))
    }
}

fn sequence<T, U>(a: impl Parser<T>, b: impl Parser<U>) -> impl Parser<(T, U)> {
    move |ctx| {
        let (x, next) = a(ctx)?;
        let (y, next) = b(&next)?;
        Ok(((x, y), next))
    }
}

fn sequence3<T, U, V>(
    a: impl Parser<T>,
    b: impl Parser<U>,
    c: impl Parser<V>,
) -> impl Parser<(T, U, V)> {
    move |ctx| {
        let (x, next) = a(ctx)?;
        let (y, next) = b(&next)?;
        let (z, next) = c(&next)?;
        Ok(((x, y, z), next))
    }
}

fn option<T>(parser: impl Parser<T>) -> impl Parser<Option<T>> {
    move |ctx| match parser(ctx) {
        Ok((x, next)) => Ok((Some(x), next)),
        Err(_) => Ok((None, ctx.clone())),
    }
}

fn skip_newlines(ctx: &Context) -> Context {
    let mut next = ctx.clone();
    while let Some((_, rest)) = next.advance_text("\n") {
        next = rest;
    }
    next
}

fn proof(ctx: &Context) -> Res<Proof> {
    let mut lines = Vec::new();
    let mut next = skip_newlines(ctx);
    while !next.is_at_end() {
        let (line, rest) = proof_line(&next)?;
        lines.push(line);
        if !rest.is_at_end() {
            let (_, rest) = text("\n")(&rest)?;
            next = skip_newlines(&rest);
        } else {
            next = rest;
        }
    }
    Ok((lines, next))
}

fn proof_line(ctx: &Context) -> Res<ProofLine> {
    map(sequence3(expr, text("|"), rule), |(expr, _, rule)| {
        ProofLine::new(expr, rule)
    })(ctx)
}

fn expr(ctx: &Context) -> Res<Expr> {
    right_assoc(Operator::Implies, disjunction)(ctx)
}

fn disjunction(ctx: &Context) -> Res<Expr> {
    right_assoc(Operator::Or, conjunction)(ctx)
}

fn conjunction(ctx: &Context) -> Res<Expr> {
    right_assoc(Operator::And, unary)(ctx)
}

/// `operand (op operand)*`, grouped to the right.
fn right_assoc(op: Operator, operand: impl Parser<Expr>) -> impl Parser<Expr> {
    move |ctx| {
        let (first, mut next) = operand(ctx)?;
        let mut rest = Vec::new();
        while let Some((_, after_op)) = next.advance_text(op.symbol()) {
            let (x, after_operand) = operand(&after_op)?;
            rest.push(x);
            next = after_operand;
        }
        let expr = match rest.pop() {
            None => first,
            Some(last) => {
                let right = rest
                    .into_iter()
                    .rev()
                    .fold(last, |acc, x| Expr::Nary(op, vec![x, acc]));
                Expr::Nary(op, vec![first, right])
            }
        };
        Ok((expr, next))
    }
}

fn unary(ctx: &Context) -> Res<Expr> {
    match ctx.advance_text(Operator::Not.symbol()) {
        Some((_, next)) => map(unary, Expr::not)(&next),
        None => atom(ctx),
    }
}

fn atom(ctx: &Context) -> Res<Expr> {
    match ctx.rest().chars().next() {
        Some('(') => map(sequence3(text("("), expr, text(")")), |(_, e, _)| e)(ctx),
        Some(c) if c.is_ascii_digit() => map(unum, |(_, n)| Expr::reference(n))(ctx),
        Some(c) if is_ident_start(c) => map(ident, Expr::Prop)(ctx),
        _ => Err(ParseError::ExpectedExpr(ctx.here())),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '\''
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\''
}

fn ident(ctx: &Context) -> Res<Symbol> {
    let rest = ctx.rest();
    if !rest.chars().next().is_some_and(is_ident_start) {
        return Err(ParseError::ExpectedIdent(ctx.here()));
    }
    let len = rest.find(|c| !is_ident_continue(c)).unwrap_or(rest.len());
    let mut next = ctx.clone();
    next.index += len;
    let span = next.span(ctx.index);
    next.advance_past_whitespace();
    Ok((Symbol::from(span.string()), next))
}

fn unum(ctx: &Context) -> Res<(Span, usize)> {
    let rest = ctx.rest();
    let len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if len == 0 {
        return Err(ParseError::ExpectedUint(ctx.here()));
    }
    let mut next = ctx.clone();
    next.index += len;
    let span = next.span(ctx.index);
    let n = span
        .string()
        .parse()
        .map_err(|_| ParseError::ExpectedUint(span.clone()))?;
    next.advance_past_whitespace();
    Ok(((span, n), next))
}

fn operator(ctx: &Context) -> Res<Operator> {
    Operator::ALL
        .into_iter()
        .find_map(|op| ctx.advance_text(op.symbol()).map(|(_, next)| (op, next)))
        .ok_or_else(|| ParseError::ExpectedOperator(ctx.here()))
}

fn rule(ctx: &Context) -> Res<Rule> {
    if let Some((_, next)) = ctx.advance_text("premise") {
        return Ok((Rule::Premise, next));
    }
    match [RuleKind::Introduction, RuleKind::Elimination]
        .into_iter()
        .find(|kind| ctx.rest().starts_with(kind.keyword()))
    {
        Some(kind) => rule_of_kind(kind)(ctx),
        None => Err(ParseError::ExpectedRule(ctx.here())),
    }
}

fn rule_of_kind(kind: RuleKind) -> impl Parser<Rule> {
    move |ctx| {
        let (_, next) = text(kind.keyword())(ctx)?;
        let (op, next) = operator(&next)?;
        let (args, next) = option(sequence(text("with"), option(args)))(&next)?;
        let args = args.and_then(|(_, args)| args).unwrap_or_default();

        let expected = kind.slot_count(op);
        if args.len() > expected {
            let ((first, _), (last, _)) = (&args[0], &args[args.len() - 1]);
            return Err(ParseError::TooManyArguments {
                span: Span(first.0.clone(), first.1, last.2),
                rule: format!("{} {op}", kind.keyword()),
                expected,
                found: args.len(),
            });
        }

        let mut rule_args = RuleArgs::new();
        for (span, arg) in args {
            rule_args.push(match arg {
                Some(0) => return Err(ParseError::ZeroLineNumber(span)),
                Some(n) => Some(n - 1),
                None => None,
            });
        }
        let rule = match kind {
            RuleKind::Introduction => Rule::Introduction(op, rule_args),
            RuleKind::Elimination => Rule::Elimination(op, rule_args),
        };
        Ok((rule, next))
    }
}

/// A comma separated list of 1-based line numbers or `_`.
fn args(ctx: &Context) -> Res<Vec<(Span, Option<usize>)>> {
    map(
        sequence(arg, repeat(map(sequence(text(","), arg), |(_, a)| a))),
        |(first, mut rest)| {
            rest.insert(0, first);
            rest
        },
    )(ctx)
}

fn arg(ctx: &Context) -> Res<(Span, Option<usize>)> {
    choice(
        map(text("_"), |span| (span, None)),
        map(unum, |(span, n)| (span, Some(n))),
    )(ctx)
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}\nexpected {1:?}")]
    ExpectedText(Span, String),
    #[error("{0}\nexpected expression")]
    ExpectedExpr(Span),
    #[error("{0}\nexpected identifier")]
    ExpectedIdent(Span),
    #[error("{0}\nexpected unsigned integer")]
    ExpectedUint(Span),
    #[error("{0}\nexpected one of ~ /\\ \\/ ->")]
    ExpectedOperator(Span),
    #[error("{0}\nexpected `premise`, `introduce <op> with ...` or `eliminate <op> with ...`")]
    ExpectedRule(Span),
    #[error("{0}\nline numbers start at 1")]
    ZeroLineNumber(Span),
    #[error("{span}\n`{rule}` takes at most {expected} arguments, found {found}")]
    TooManyArguments {
        span: Span,
        rule: String,
        expected: usize,
        found: usize,
    },
    #[error("{0}\nunexpected trailing input")]
    TrailingInput(Span),
}

impl ParseError {
    pub fn span(&self) -> &Span {
        match self {
            ParseError::ExpectedText(span, _)
            | ParseError::ExpectedExpr(span)
            | ParseError::ExpectedIdent(span)
            | ParseError::ExpectedUint(span)
            | ParseError::ExpectedOperator(span)
            | ParseError::ExpectedRule(span)
            | ParseError::ZeroLineNumber(span)
            | ParseError::TrailingInput(span) => span,
            ParseError::TooManyArguments { span, .. } => span,
        }
    }
}
