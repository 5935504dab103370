use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, one_of};
use nom::combinator::{all_consuming, opt, recognize};
use nom::error::{ErrorKind, ParseError, VerboseError};
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

use crate::error::{CalcError, Result};
use crate::numeric::value::Value;

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Evaluate a preprocessed expression string. The grammar runs lowest to
/// highest precedence: add/sub, mul/div, power, unary sign, primary.
pub fn parse_value(input: &str) -> Result<Value> {
    match all_consuming(parse_add_sub)(input) {
        Ok((_, value)) => Ok(value),
        Err(e) => Err(CalcError::Parse(format!("{e:?}"))),
    }
}

fn parse_add_sub(input: &str) -> PResult<'_, Value> {
    let (rest, init) = parse_mul_div(input)?;
    fold_many0(
        pair(alt((char('+'), char('-'))), parse_mul_div),
        move || init,
        |acc, (op, rhs)| match op {
            '+' => acc.add(rhs),
            '-' => acc.sub(rhs),
            _ => unreachable!(),
        },
    )(rest)
}

fn parse_mul_div(input: &str) -> PResult<'_, Value> {
    let (rest, init) = parse_pow(input)?;
    fold_many0(
        pair(alt((char('*'), char('/'))), parse_pow),
        move || init,
        |acc, (op, rhs)| match op {
            '*' => acc.mul(rhs),
            '/' => acc.div(rhs),
            _ => unreachable!(),
        },
    )(rest)
}

fn parse_pow(input: &str) -> PResult<'_, Value> {
    let (rest, base) = parse_unary(input)?;
    // right-associative; the right side re-enters unary so 2^-3 works
    if let Ok((next, exp)) = preceded(char('^'), parse_pow)(rest) {
        Ok((next, base.pow(exp)))
    } else {
        Ok((rest, base))
    }
}

fn parse_unary(input: &str) -> PResult<'_, Value> {
    if let Ok((rest, value)) = preceded(char('-'), parse_unary)(input) {
        return Ok((rest, value.neg()));
    }
    if let Ok((rest, value)) = preceded(char('+'), parse_unary)(input) {
        return Ok((rest, value));
    }
    parse_primary(input)
}

fn parse_primary(input: &str) -> PResult<'_, Value> {
    alt((parse_parens, parse_function, parse_imaginary, parse_number))(input)
}

fn parse_parens(input: &str) -> PResult<'_, Value> {
    let (rest, value) = delimited(char('('), parse_add_sub, char(')'))(input)?;
    let (rest, percent) = opt(char('%'))(rest)?;
    Ok((
        rest,
        if percent.is_some() {
            value.with_percent()
        } else {
            value
        },
    ))
}

fn parse_function(input: &str) -> PResult<'_, Value> {
    let (rest, name) = parse_function_name(input)?;
    // a name counts as a call only when a parenthesized argument follows
    let (rest, arg) = delimited(char('('), parse_add_sub, char(')'))(rest)?;
    Ok((rest, arg.apply(name)))
}

fn parse_function_name(input: &str) -> PResult<'_, &str> {
    alt((
        alt((
            tag("asinh"),
            tag("acosh"),
            tag("atanh"),
            tag("asin"),
            tag("acos"),
            tag("atan"),
        )),
        alt((
            tag("sinh"),
            tag("cosh"),
            tag("tanh"),
            tag("sin"),
            tag("cos"),
            tag("tan"),
        )),
        alt((
            tag("sqrt"),
            tag("sgn"),
            tag("abs"),
            tag("arg"),
            tag("exp"),
            tag("log"),
            tag("ln"),
            tag("re"),
            tag("im"),
        )),
    ))(input)
}

/// Standalone imaginary unit: `i` not glued to another identifier.
fn parse_imaginary(input: &str) -> PResult<'_, Value> {
    let (rest, _) = char('i')(input)?;
    if rest.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(nom::Err::Error(VerboseError::from_error_kind(
            input,
            ErrorKind::Char,
        )));
    }
    Ok((rest, Value::i()))
}

/// Numeric literal: digits, optional fraction, optional scientific suffix,
/// optional trailing `i` (pure imaginary) or `%` (percent tag).
fn parse_number(input: &str) -> PResult<'_, Value> {
    let (rest, digits) = recognize(tuple((
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((char('E'), opt(one_of("+-")), digit1))),
    )))(input)?;
    let magnitude: f64 = digits.parse().unwrap_or(f64::NAN);

    if let Some(after) = rest.strip_prefix('i') {
        if !after.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Ok((after, Value::imaginary(magnitude)));
        }
    }
    let (rest, percent) = opt(char('%'))(rest)?;
    Ok((
        rest,
        if percent.is_some() {
            Value::real(magnitude).with_percent()
        } else {
            Value::real(magnitude)
        },
    ))
}
