//! `printf`-style formatting.
//!
//! Supports the flags `-+ 0#`, width and precision (including `*`),
//! length modifiers (ignored) and the conversions `d i u x X o c s f F e E
//! g G %`.

use std::iter::Peekable;
use std::slice::Iter;
use std::str::Chars;

use cinder_ir::StringInterner;

use crate::errors::format_error;
use crate::{EvalError, Value};

pub(crate) fn format_printf(
    fmt: &str,
    args: &[Value],
    interner: &StringInterner,
) -> Result<String, EvalError> {
    let mut out = String::with_capacity(fmt.len());
    let mut args = args.iter();
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let spec = Spec::parse(&mut chars, &mut args)?;
        if spec.conv == '%' {
            out.push('%');
            continue;
        }
        let arg = args
            .next()
            .ok_or_else(|| format_error(format!("missing argument for `%{}`", spec.conv)))?;
        let rendered = spec.render(*arg, interner)?;
        spec.pad(&mut out, &rendered);
    }
    let extra = args.as_slice().len();
    if extra != 0 {
        tracing::debug!(extra, "printf ignored surplus arguments");
    }
    Ok(out)
}

/// Largest width or precision accepted.
const MAX_FIELD: usize = u16::MAX as usize;

#[derive(Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
    conv: char,
}

/// A converted argument before padding.
struct Rendered {
    sign: &'static str,
    prefix: &'static str,
    body: String,
    numeric: bool,
}

impl Rendered {
    fn text(body: String) -> Self {
        Rendered {
            sign: "",
            prefix: "",
            body,
            numeric: false,
        }
    }
}

impl Spec {
    fn parse(chars: &mut Peekable<Chars<'_>>, args: &mut Iter<'_, Value>) -> Result<Spec, EvalError> {
        let mut spec = Spec::default();
        while let Some(&c) = chars.peek() {
            match c {
                '-' => spec.left = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                '#' => spec.alt = true,
                _ => break,
            }
            chars.next();
        }

        if chars.next_if_eq(&'*').is_some() {
            let width = star_arg(args)?;
            spec.left |= width < 0;
            spec.width = usize::try_from(width.unsigned_abs()).unwrap_or(usize::MAX);
        } else {
            spec.width = digits(chars);
        }

        if chars.next_if_eq(&'.').is_some() {
            spec.precision = if chars.next_if_eq(&'*').is_some() {
                // A negative precision is taken as omitted.
                usize::try_from(star_arg(args)?).ok()
            } else {
                Some(digits(chars))
            };
        }

        if spec.width > MAX_FIELD || spec.precision.is_some_and(|p| p > MAX_FIELD) {
            return Err(format_error(format!(
                "field width and precision are limited to {MAX_FIELD}"
            )));
        }

        while chars
            .next_if(|c| matches!(c, 'h' | 'l' | 'L' | 'q' | 'j' | 'z' | 't'))
            .is_some()
        {}

        spec.conv = chars
            .next()
            .ok_or_else(|| format_error("incomplete format specifier at end of string"))?;
        Ok(spec)
    }

    fn render(&self, arg: Value, interner: &StringInterner) -> Result<Rendered, EvalError> {
        match self.conv {
            'd' | 'i' => {
                let i = self.int_arg(arg)?;
                Ok(self.integer(i < 0, i.unsigned_abs().to_string(), ""))
            }
            'u' => {
                let u = u64::from_ne_bytes(self.int_arg(arg)?.to_ne_bytes());
                Ok(self.integer(false, u.to_string(), ""))
            }
            'x' | 'X' | 'o' => {
                let u = u64::from_ne_bytes(self.int_arg(arg)?.to_ne_bytes());
                let (body, prefix) = match self.conv {
                    'x' => (format!("{u:x}"), "0x"),
                    'X' => (format!("{u:X}"), "0X"),
                    _ => (format!("{u:o}"), "0"),
                };
                let prefix = if self.alt && u != 0 { prefix } else { "" };
                Ok(self.integer(false, body, prefix))
            }
            'c' => {
                let c = match arg {
                    Value::Char(c) => c,
                    other => self
                        .int_arg(other)
                        .ok()
                        .and_then(|i| u32::try_from(i).ok())
                        .and_then(char::from_u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER),
                };
                Ok(Rendered::text(c.to_string()))
            }
            's' => {
                let Value::Str(name) = arg else {
                    return Err(self.mismatch("a string", arg));
                };
                let s = interner.lookup(name);
                let body = match self.precision {
                    Some(p) => s.chars().take(p).collect(),
                    None => s.to_owned(),
                };
                Ok(Rendered::text(body))
            }
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
                let f = arg.as_f64().ok_or_else(|| self.mismatch("a number", arg))?;
                Ok(self.float(f))
            }
            other => Err(format_error(format!("unsupported conversion `%{other}`"))),
        }
    }

    fn int_arg(&self, arg: Value) -> Result<i64, EvalError> {
        arg.as_int().ok_or_else(|| self.mismatch("an integer", arg))
    }

    fn mismatch(&self, expected: &str, arg: Value) -> EvalError {
        format_error(format!(
            "`%{}` expects {expected}, got {}",
            self.conv,
            arg.type_name()
        ))
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        }
    }

    fn integer(&self, negative: bool, mut body: String, prefix: &'static str) -> Rendered {
        let signed = matches!(self.conv, 'd' | 'i');
        if let Some(p) = self.precision {
            if p == 0 && body == "0" {
                body.clear();
            } else if body.len() < p {
                body.insert_str(0, &"0".repeat(p - body.len()));
            }
        }
        Rendered {
            sign: if signed { self.sign(negative) } else { "" },
            prefix,
            body,
            // Zero padding is disabled by an explicit precision.
            numeric: self.precision.is_none(),
        }
    }

    fn float(&self, f: f64) -> Rendered {
        let upper = self.conv.is_ascii_uppercase();
        let sign = self.sign(f.is_sign_negative() && !f.is_nan());
        let v = f.abs();
        if v.is_infinite() || v.is_nan() {
            let word = if v.is_nan() { "nan" } else { "inf" };
            return Rendered {
                sign,
                prefix: "",
                body: if upper { word.to_uppercase() } else { word.to_owned() },
                numeric: false,
            };
        }
        let p = self.precision.unwrap_or(6);
        let body = match self.conv {
            'f' | 'F' => format!("{v:.p$}"),
            'e' | 'E' => exponential(v, p, upper),
            _ => general(v, p, upper, self.alt),
        };
        Rendered {
            sign,
            prefix: "",
            body,
            numeric: true,
        }
    }

    fn pad(&self, out: &mut String, r: &Rendered) {
        let len = r.sign.len() + r.prefix.len() + r.body.chars().count();
        let fill = self.width.saturating_sub(len);
        if self.left {
            out.push_str(r.sign);
            out.push_str(r.prefix);
            out.push_str(&r.body);
            out.extend(std::iter::repeat(' ').take(fill));
        } else if self.zero && r.numeric {
            out.push_str(r.sign);
            out.push_str(r.prefix);
            out.extend(std::iter::repeat('0').take(fill));
            out.push_str(&r.body);
        } else {
            out.extend(std::iter::repeat(' ').take(fill));
            out.push_str(r.sign);
            out.push_str(r.prefix);
            out.push_str(&r.body);
        }
    }
}

fn digits(chars: &mut Peekable<Chars<'_>>) -> usize {
    let mut n = 0usize;
    while let Some(d) = chars.next_if(char::is_ascii_digit) {
        let d = d.to_digit(10).unwrap_or(0) as usize;
        n = n.saturating_mul(10).saturating_add(d);
    }
    n
}

fn star_arg(args: &mut Iter<'_, Value>) -> Result<i64, EvalError> {
    args.next()
        .and_then(Value::as_int)
        .ok_or_else(|| format_error("`*` expects an integer argument"))
}

/// `%e` body for a non-negative finite value: at least two exponent digits.
fn exponential(v: f64, precision: usize, upper: bool) -> String {
    let s = format!("{v:.precision$e}");
    let (mantissa, exp) = s.split_once('e').unwrap_or((&s, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    format!(
        "{mantissa}{}{}{:02}",
        if upper { 'E' } else { 'e' },
        if exp < 0 { '-' } else { '+' },
        exp.unsigned_abs()
    )
}

/// `%g` body: `%e` or `%f` depending on the exponent, trailing zeros removed.
fn general(v: f64, precision: usize, upper: bool, alt: bool) -> String {
    let p = precision.max(1);
    let exp = if v == 0.0 {
        0
    } else {
        let s = format!("{v:.prec$e}", prec = p - 1);
        s.split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };
    let p_i32 = i32::try_from(p).unwrap_or(i32::MAX);
    let body = if exp < -4 || exp >= p_i32 {
        exponential(v, p - 1, upper)
    } else {
        let decimals = usize::try_from(p_i32 - 1 - exp).unwrap_or(0);
        format!("{v:.decimals$}")
    };
    if alt {
        return body;
    }
    let split = body.find(['e', 'E']).unwrap_or(body.len());
    let (mantissa, exponent) = body.split_at(split);
    if mantissa.contains('.') {
        let trimmed = mantissa.trim_end_matches('0').trim_end_matches('.');
        format!("{trimmed}{exponent}")
    } else {
        body
    }
}
