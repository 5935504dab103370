use num_complex::Complex64;

/// Imaginary parts below this are rounding noise and demote to a real.
pub const DEMOTE_EPS: f64 = 1e-10;

/// A numeric value mid-evaluation: a complex payload plus a percent tag.
/// Reals are complex numbers with a zero imaginary part; promotion and
/// demotion are automatic at every operation boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value {
    num: Complex64,
    percent: bool,
}

impl Value {
    pub fn real(x: f64) -> Self {
        Value {
            num: Complex64::new(x, 0.0),
            percent: false,
        }
    }

    pub fn imaginary(x: f64) -> Self {
        Value {
            num: Complex64::new(0.0, x),
            percent: false,
        }
    }

    pub fn i() -> Self {
        Value::imaginary(1.0)
    }

    pub fn complex(z: Complex64) -> Self {
        Value {
            num: demote(z),
            percent: false,
        }
    }

    pub fn with_percent(mut self) -> Self {
        self.percent = true;
        self
    }

    pub fn is_real(&self) -> bool {
        self.num.im == 0.0
    }

    /// Drop the percent tag, dividing by 100: the meaning of a percent value
    /// everywhere except as the right operand of `+`/`-`.
    fn unwrapped(self) -> Complex64 {
        if self.percent {
            self.num / 100.0
        } else {
            self.num
        }
    }

    /// Final payload: percent unwrapped, near-real demoted.
    pub fn resolved(self) -> Complex64 {
        demote(self.unwrapped())
    }

    pub fn add(self, rhs: Value) -> Value {
        // a + b% reads as "a plus b percent of a", from either side
        if rhs.percent && !self.percent {
            let a = self.num;
            return Value::complex(a + a * rhs.num / 100.0);
        }
        if self.percent && !rhs.percent {
            let b = rhs.num;
            return Value::complex(b + b * self.num / 100.0);
        }
        Value::complex(self.unwrapped() + rhs.unwrapped())
    }

    pub fn sub(self, rhs: Value) -> Value {
        if rhs.percent && !self.percent {
            let a = self.num;
            return Value::complex(a - a * rhs.num / 100.0);
        }
        Value::complex(self.unwrapped() - rhs.unwrapped())
    }

    pub fn mul(self, rhs: Value) -> Value {
        Value::complex(self.unwrapped() * rhs.unwrapped())
    }

    pub fn div(self, rhs: Value) -> Value {
        let a = demote(self.unwrapped());
        let b = demote(rhs.unwrapped());
        // real ÷ real keeps IEEE semantics: 0/0 is NaN, x/0 signed infinity
        if a.im == 0.0 && b.im == 0.0 {
            return Value::real(a.re / b.re);
        }
        Value::complex(a / b)
    }

    pub fn pow(self, rhs: Value) -> Value {
        let base = demote(self.unwrapped());
        let exp = demote(rhs.unwrapped());
        if base.im == 0.0 && exp.im == 0.0 {
            return Value::real(base.re.powf(exp.re));
        }
        if base.norm() == 0.0 {
            return Value::real(0.0);
        }
        // z^w = e^(w·ln z); an Euler-number base reduces to Euler's formula
        Value::complex((exp * base.ln()).exp())
    }

    pub fn neg(self) -> Value {
        Value {
            num: -self.num,
            percent: self.percent,
        }
    }

    /// Apply a named function. The name set is fixed by the grammar; unknown
    /// names never reach here.
    pub fn apply(self, name: &str) -> Value {
        let z = demote(self.unwrapped());
        let real = z.im == 0.0;
        match name {
            "sqrt" => {
                if real {
                    if z.re < 0.0 {
                        Value::imaginary((-z.re).sqrt())
                    } else {
                        Value::real(z.re.sqrt())
                    }
                } else {
                    Value::complex(z.sqrt())
                }
            }
            "abs" => Value::real(if real { z.re.abs() } else { z.norm() }),
            "arg" => Value::real(z.arg()),
            "re" => Value::real(z.re),
            "im" => Value::real(z.im),
            "sgn" => {
                if real {
                    Value::real(if z.re == 0.0 { 0.0 } else { z.re.signum() })
                } else if z.norm() == 0.0 {
                    Value::real(0.0)
                } else {
                    Value::complex(z / z.norm())
                }
            }
            "exp" => apply_split(z, real, f64::exp, Complex64::exp),
            "ln" => apply_split(z, real, f64::ln, Complex64::ln),
            "log" => apply_split(z, real, f64::log10, |w| w.ln() / 10f64.ln()),
            "sin" => apply_split(z, real, f64::sin, Complex64::sin),
            "cos" => apply_split(z, real, f64::cos, Complex64::cos),
            "tan" => apply_split(z, real, f64::tan, Complex64::tan),
            "asin" => apply_split(z, real, f64::asin, Complex64::asin),
            "acos" => apply_split(z, real, f64::acos, Complex64::acos),
            "atan" => apply_split(z, real, f64::atan, Complex64::atan),
            "sinh" => apply_split(z, real, f64::sinh, Complex64::sinh),
            "cosh" => apply_split(z, real, f64::cosh, Complex64::cosh),
            "tanh" => apply_split(z, real, f64::tanh, Complex64::tanh),
            "asinh" => apply_split(z, real, f64::asinh, Complex64::asinh),
            "acosh" => apply_split(z, real, f64::acosh, Complex64::acosh),
            "atanh" => apply_split(z, real, f64::atanh, Complex64::atanh),
            _ => Value::real(f64::NAN),
        }
    }
}

/// Real inputs stay on the f64 path so domain violations surface as NaN
/// rather than silently going complex; complex inputs use the complex form.
fn apply_split(
    z: Complex64,
    real: bool,
    real_fn: fn(f64) -> f64,
    complex_fn: impl Fn(Complex64) -> Complex64,
) -> Value {
    if real {
        Value::real(real_fn(z.re))
    } else {
        Value::complex(complex_fn(z))
    }
}

fn demote(z: Complex64) -> Complex64 {
    if z.im.abs() < DEMOTE_EPS {
        Complex64::new(z.re, 0.0)
    } else {
        z
    }
}
