//! Text preprocessing ahead of the numeric grammar.
//!
//! The pipeline rewrites the display-oriented input into plain operator
//! notation, in a fixed order: whitespace and glyph normalization, angle
//! suffixes, named constants, iterated constructs (Σ, Π, derivative,
//! integral), counting calls, factorials, and finally implicit
//! multiplication.

use num_complex::Complex64;

use crate::error::{CalcError, Result};
use crate::numeric::evaluate_value;

/// Iteration cap for Σ/Π loops.
const FOLD_LIMIT: i64 = 100_000;
/// Simpson's rule subdivisions for numeric integration.
const INTEGRAL_STEPS: usize = 200;
/// Step for the symmetric difference quotient.
const DERIVATIVE_STEP: f64 = 1e-6;
/// Factorials above this overflow f64 anyway.
const FACTORIAL_LIMIT: i64 = 170;

pub fn preprocess(input: &str) -> Result<String> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let s = normalize_glyphs(&stripped);
    let s = expand_angle_suffixes(&s);
    let s = expand_constants(&s);
    let s = expand_iterated_calls(&s)?;
    let s = expand_counting_calls(&s)?;
    let s = expand_factorials(&s)?;
    Ok(insert_implicit_mul(&s))
}

fn normalize_glyphs(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '×' | '·' => '*',
            '÷' => '/',
            'ᴇ' => 'E',
            '−' => '-',
            other => other,
        })
        .collect()
}

/// `°` multiplies by π/180; `rad` is its inverse.
fn expand_angle_suffixes(s: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '°' {
            out.push_str("*(π/180)");
            i += 1;
            continue;
        }
        if chars[i] == 'r'
            && chars.get(i + 1) == Some(&'a')
            && chars.get(i + 2) == Some(&'d')
            && (i == 0 || !chars[i - 1].is_ascii_alphabetic())
            && chars.get(i + 3).map_or(true, |c| !c.is_ascii_alphabetic())
        {
            out.push_str("*(180/π)");
            i += 3;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Replace named constants with parenthesized numeric literals. Adjacency to
/// the surrounding text is repaired later by the implicit-multiplication
/// pass, so a bare substitution suffices here.
fn expand_constants(s: &str) -> String {
    let mut out = String::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            'π' => out.push_str("(3.141592653589793)"),
            'φ' => out.push_str("(1.618033988749895)"),
            'ε' if chars.get(i + 1) == Some(&'₀') => {
                out.push_str("(8.8541878128E-12)");
                i += 1;
            }
            'μ' if chars.get(i + 1) == Some(&'₀') => {
                out.push_str("(1.25663706212E-6)");
                i += 1;
            }
            'c' if chars.get(i + 1) == Some(&'₀') => {
                out.push_str("(299792458)");
                i += 1;
            }
            'e' if chars.get(i + 1) == Some(&'⁻') => {
                out.push_str("(1.602176634E-19)");
                i += 1;
            }
            'e' => {
                let prev_letter = i > 0 && chars[i - 1].is_ascii_alphabetic();
                let next_letter = chars
                    .get(i + 1)
                    .map_or(false, |c| c.is_ascii_alphabetic());
                if prev_letter || next_letter {
                    out.push('e');
                } else {
                    out.push_str("(2.718281828459045)");
                }
            }
            other => out.push(other),
        }
        i += 1;
    }
    out
}

/// Σ, Π, numeric derivative, and numeric integral calls, expanded by
/// recursively evaluating their bodies with the loop variable substituted.
fn expand_iterated_calls(s: &str) -> Result<String> {
    const NAMES: [&str; 4] = ["sum", "prod", "deriv", "integ"];
    let mut text = s.to_string();
    loop {
        let Some((name, start)) = find_call(&text, &NAMES) else {
            return Ok(text);
        };
        let open = start + name.len();
        let close = matching_paren(&text, open)?;
        let args = split_args(&text[open + 1..close]);
        let replacement = match name {
            "sum" => eval_fold(&args, false)?,
            "prod" => eval_fold(&args, true)?,
            "deriv" => eval_derivative(&args)?,
            _ => eval_integral(&args)?,
        };
        text.replace_range(start..=close, &replacement);
    }
}

fn eval_fold(args: &[String], is_product: bool) -> Result<String> {
    let [var, lower, upper, body] = four_args(args)?;
    let lo = eval_integer(lower)?;
    let hi = eval_integer(upper)?;
    if hi - lo >= FOLD_LIMIT {
        return Err(CalcError::Unsupported("iteration bound too large".into()));
    }
    let mut acc = Complex64::new(if is_product { 1.0 } else { 0.0 }, 0.0);
    let mut k = lo;
    while k <= hi {
        let step = evaluate_value(&substitute_ident(body, var, &format!("({k})")))?.resolved();
        if is_product {
            acc *= step;
        } else {
            acc += step;
        }
        k += 1;
    }
    value_literal(acc)
}

fn eval_derivative(args: &[String]) -> Result<String> {
    if args.len() != 3 {
        return Err(CalcError::Parse("deriv expects 3 arguments".into()));
    }
    let (var, at, body) = (&args[0], &args[1], &args[2]);
    let a = eval_real(at)?;
    let h = DERIVATIVE_STEP;
    let hi = evaluate_value(&substitute_ident(body, var, &real_literal(a + h)))?.resolved();
    let lo = evaluate_value(&substitute_ident(body, var, &real_literal(a - h)))?.resolved();
    value_literal((hi - lo) / (2.0 * h))
}

/// Composite Simpson's rule over a fixed subdivision count.
fn eval_integral(args: &[String]) -> Result<String> {
    let [var, lower, upper, body] = four_args(args)?;
    let a = eval_real(lower)?;
    let b = eval_real(upper)?;
    let h = (b - a) / INTEGRAL_STEPS as f64;
    let sample = |x: f64| -> Result<Complex64> {
        Ok(evaluate_value(&substitute_ident(body, var, &real_literal(x)))?.resolved())
    };
    let mut acc = sample(a)? + sample(b)?;
    for step in 1..INTEGRAL_STEPS {
        let weight = if step % 2 == 1 { 4.0 } else { 2.0 };
        acc += weight * sample(a + step as f64 * h)?;
    }
    value_literal(acc * h / 3.0)
}

fn four_args(args: &[String]) -> Result<[&String; 4]> {
    if let [a, b, c, d] = args {
        Ok([a, b, c, d])
    } else {
        Err(CalcError::Parse("expected 4 arguments".into()))
    }
}

/// `perm(n, r)` and `comb(n, r)`, with both arguments evaluated recursively
/// so nested parentheses and expressions work, not just literals.
fn expand_counting_calls(s: &str) -> Result<String> {
    const NAMES: [&str; 2] = ["perm", "comb"];
    let mut text = s.to_string();
    loop {
        let Some((name, start)) = find_call(&text, &NAMES) else {
            return Ok(text);
        };
        let open = start + name.len();
        let close = matching_paren(&text, open)?;
        let args = split_args(&text[open + 1..close]);
        if args.len() != 2 {
            return Err(CalcError::Parse(format!("{name} expects 2 arguments")));
        }
        let n = eval_integer(&args[0])?;
        let r = eval_integer(&args[1])?;
        if r < 0 || r > n {
            return Err(CalcError::Unsupported(format!("{name}({n}, {r})")));
        }
        let mut value = 1.0f64;
        for step in 0..r {
            value *= (n - step) as f64;
        }
        if name == "comb" {
            for step in 1..=r {
                value /= step as f64;
            }
        }
        let replacement = value_literal(Complex64::new(value, 0.0))?;
        text.replace_range(start..=close, &replacement);
    }
}

/// `n!` over integer operands: the operand is the parenthesized group or
/// number run directly before the bang.
fn expand_factorials(s: &str) -> Result<String> {
    let mut text = s.to_string();
    while let Some(pos) = text.find('!') {
        let head = &text[..pos];
        let start = if head.ends_with(')') {
            matching_open(head)?
        } else {
            let trailing: usize = head
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .map(char::len_utf8)
                .sum();
            pos - trailing
        };
        if start == pos {
            return Err(CalcError::Parse("factorial without operand".into()));
        }
        let n = eval_integer(&text[start..pos])?;
        if !(0..=FACTORIAL_LIMIT).contains(&n) {
            return Err(CalcError::Unsupported(format!("{n}!")));
        }
        let mut value = 1.0f64;
        for step in 2..=n {
            value *= step as f64;
        }
        let replacement = value_literal(Complex64::new(value, 0.0))?;
        text.replace_range(start..=pos, &replacement);
    }
    Ok(text)
}

/// Insert `*` between adjacent value-end / value-start characters: a digit or
/// `)` before `(`, a function name, or `i`; `)` before a digit. The sweep is
/// idempotent, so serialized strings that already ran it are unaffected.
pub fn insert_implicit_mul(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && needs_star(chars[i - 1], c) {
            out.push('*');
        }
        out.push(c);
    }
    out
}

fn needs_star(prev: char, next: char) -> bool {
    if prev == 'i' {
        return next == '(';
    }
    if !(prev.is_ascii_digit() || prev == ')') {
        return false;
    }
    match next {
        '(' => true,
        'E' => false,
        c if c.is_ascii_digit() => prev == ')',
        c if c.is_ascii_alphabetic() => true,
        _ => false,
    }
}

/// Find the first call site `name(` whose name is not the tail of a longer
/// identifier.
fn find_call<'a>(text: &str, names: &[&'a str]) -> Option<(&'a str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for &name in names {
        let mut from = 0;
        while let Some(rel) = text[from..].find(name) {
            let pos = from + rel;
            let before_ok = pos == 0
                || !text[..pos]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_ascii_alphanumeric());
            let after = &text[pos + name.len()..];
            if before_ok && after.starts_with('(') {
                if best.map_or(true, |(_, b)| pos < b) {
                    best = Some((name, pos));
                }
                break;
            }
            from = pos + name.len();
        }
    }
    best
}

/// Index of the `)` matching the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Result<usize> {
    let mut depth = 0i32;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + offset);
                }
            }
            _ => {}
        }
    }
    Err(CalcError::Parse("missing closing parenthesis".into()))
}

/// Start index of the `(` matching a trailing `)`.
fn matching_open(head: &str) -> Result<usize> {
    let mut depth = 0i32;
    for (idx, c) in head.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(idx);
                }
            }
            _ => {}
        }
    }
    Err(CalcError::Parse("missing opening parenthesis".into()))
}

/// Split on top-level commas.
fn split_args(body: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for c in body.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                args.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    args.push(current);
    args
}

/// Replace standalone occurrences of `name` (letter-run boundaries on both
/// sides) with `replacement`.
fn substitute_ident(body: &str, name: &str, replacement: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    let pattern: Vec<char> = name.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let matches = chars[i..].starts_with(&pattern[..])
            && (i == 0 || !chars[i - 1].is_ascii_alphanumeric())
            && chars
                .get(i + pattern.len())
                .map_or(true, |c| !c.is_ascii_alphanumeric());
        if matches {
            out.push_str(replacement);
            i += pattern.len();
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn eval_real(text: &str) -> Result<f64> {
    let z = evaluate_value(text)?.resolved();
    if z.im != 0.0 || !z.re.is_finite() {
        return Err(CalcError::Unsupported("expected a real value".into()));
    }
    Ok(z.re)
}

fn eval_integer(text: &str) -> Result<i64> {
    let x = eval_real(text)?;
    let rounded = x.round();
    if (x - rounded).abs() > 1e-9 || rounded.abs() > 9e15 {
        return Err(CalcError::Unsupported("expected an integer".into()));
    }
    Ok(rounded as i64)
}

/// Format a value back into source text. Rust's float display never uses
/// exponent notation, so the output re-parses under the number grammar.
fn value_literal(z: Complex64) -> Result<String> {
    if !z.re.is_finite() || !z.im.is_finite() {
        return Err(CalcError::Unsupported("non-finite intermediate".into()));
    }
    if z.im == 0.0 {
        return Ok(real_literal(z.re));
    }
    let sign = if z.im < 0.0 { '-' } else { '+' };
    Ok(format!(
        "({}{}{}*i)",
        z.re,
        sign,
        z.im.abs()
    ))
}

fn real_literal(x: f64) -> String {
    format!("({x})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_expand_with_adjacency() {
        let out = preprocess("2π").unwrap();
        assert_eq!(out, "2*(3.141592653589793)");
    }

    #[test]
    fn euler_inside_function_names_survives() {
        let out = preprocess("exp(1)").unwrap();
        assert_eq!(out, "exp(1)");
    }

    #[test]
    fn factorial_expands_in_place() {
        let out = preprocess("5!").unwrap();
        assert_eq!(out, "(120)");
    }

    #[test]
    fn implicit_multiplication_patterns() {
        assert_eq!(insert_implicit_mul("3(4)"), "3*(4)");
        assert_eq!(insert_implicit_mul("(1)(2)"), "(1)*(2)");
        assert_eq!(insert_implicit_mul("(2)3"), "(2)*3");
        assert_eq!(insert_implicit_mul("2sqrt(2)"), "2*sqrt(2)");
        assert_eq!(insert_implicit_mul("1E3"), "1E3");
    }

    #[test]
    fn counting_calls_accept_expressions() {
        let out = preprocess("perm(3+2,2)").unwrap();
        assert_eq!(out, "(20)");
    }
}
