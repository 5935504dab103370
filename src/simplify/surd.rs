use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::expr::{prod_from, Expr};

use super::rules::simplify_div;

/// Radicands past this bound are left unreduced; trial division stays cheap.
const FACTOR_LIMIT: u64 = 1_000_000_000_000;

/// Surd extraction. For an integer radicand the prime factorization is split
/// into the part that leaves the radical and the part that stays; rational
/// radicands are rationalized first.
pub fn simplify_root(radicand: Expr, index: Expr) -> Expr {
    if index.is_one() {
        return radicand;
    }

    if let (Some(n), Some(k)) = (radicand.as_int(), index_value(&index)) {
        return reduce_integer_root(n, k, index);
    }

    if let Expr::Frac(r) = &radicand {
        if let Some(k) = index_value(&index) {
            if k == 2 {
                // √(a/b) = √(ab)/b
                let ab = r.numer() * r.denom();
                let den = r.denom().clone();
                return simplify_div(
                    reduce_integer_root(ab, 2, index),
                    Expr::Int(den),
                );
            }
            // higher indices fall back to a quotient of roots
            return simplify_div(
                reduce_integer_root(r.numer().clone(), k, index.clone()),
                reduce_integer_root(r.denom().clone(), k, index),
            );
        }
    }

    Expr::Root(radicand.boxed(), index.boxed())
}

fn index_value(index: &Expr) -> Option<u32> {
    let k = index.as_int()?.to_u32()?;
    (k >= 2).then_some(k)
}

fn reduce_integer_root(n: BigInt, k: u32, index: Expr) -> Expr {
    if n.is_zero() {
        return Expr::int(0);
    }
    let negative = n.is_negative();
    if negative && k % 2 == 0 {
        // even root of a negative radicand is not in the supported domain
        return Expr::Root(Expr::Int(n).boxed(), index.boxed());
    }

    let Some(mut m) = n.abs().to_u64() else {
        return Expr::Root(Expr::Int(n).boxed(), index.boxed());
    };
    if m > FACTOR_LIMIT {
        return Expr::Root(Expr::Int(n).boxed(), index.boxed());
    }

    let mut outside: u64 = 1;
    let mut inside: u64 = 1;
    let mut p: u64 = 2;
    while (p as u128) * (p as u128) <= m as u128 {
        if m % p == 0 {
            let mut e = 0u32;
            while m % p == 0 {
                m /= p;
                e += 1;
            }
            outside *= p.pow(e / k);
            inside *= p.pow(e % k);
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if m > 1 {
        // leftover prime factor with exponent 1
        inside *= m;
    }

    let mut outer = BigInt::from(outside);
    if negative {
        outer = -outer;
    }
    if inside == 1 {
        return Expr::Int(outer);
    }
    let root = Expr::Root(
        Expr::Int(BigInt::from(inside)).boxed(),
        index.boxed(),
    );
    if outer == BigInt::from(1) {
        return root;
    }
    prod_from(vec![Expr::Int(outer), root])
}
