//! Positional-argument interpolation.
//!
//! Specifiers follow `%[index$][flags][width][.precision]conversion`. A `%` that
//! does not begin a complete specifier is copied through untouched, so text
//! such as `"100% done"` survives interpolation.

use core::fmt;

use super::error::FormatError;

/// Platform line terminator emitted for `%n`.
pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

const CONVERSIONS: &[u8] = b"sSdxXofeEcbBn%";

/// A positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Bool(bool),
}

impl Arg {
    /// Captures any displayable value as a string argument.
    pub fn display(value: &impl fmt::Display) -> Self {
        Arg::Str(value.to_string())
    }

    fn kind(&self) -> &'static str {
        match self {
            Arg::Str(_) => "string",
            Arg::Int(_) | Arg::UInt(_) => "integer",
            Arg::Float(_) => "float",
            Arg::Char(_) => "char",
            Arg::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.write_str(s),
            Arg::Int(v) => write!(f, "{v}"),
            Arg::UInt(v) => write!(f, "{v}"),
            Arg::Float(v) => f.write_str(&float_text(*v)),
            Arg::Char(c) => write!(f, "{c}"),
            Arg::Bool(b) => write!(f, "{b}"),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Arg {
                fn from(value: $source) -> Self {
                    Arg::$variant(value as $target)
                }
            }
        )+
    };
}

impl_from!(Int as i64: i8, i16, i32, i64, isize);
impl_from!(UInt as u64: u8, u16, u32, u64, usize);
impl_from!(Float as f64: f32, f64);

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Str(value.clone())
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

/// Builds an array of [`Arg`] from heterogeneous values.
///
/// ```
/// use ezlogger::{args, Arg};
///
/// let args = args![3, "x", 1.5];
/// assert_eq!(args[1], Arg::Str("x".to_string()));
/// ```
#[macro_export]
macro_rules! args {
    () => {{
        let empty: [$crate::Arg; 0] = [];
        empty
    }};
    ($($arg:expr),+ $(,)?) => {
        [$($crate::Arg::from($arg)),+]
    };
}

#[derive(Debug, Default)]
struct Flags {
    left: bool,
    alternate: bool,
    plus: bool,
    zero: bool,
    grouping: bool,
}

#[derive(Debug)]
struct Specifier<'a> {
    text: &'a str,
    index: Option<usize>,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: u8,
}

/// Replaces every specifier in `format` with the matching entry of `args`.
pub fn interpolate(format: &str, args: &[Arg]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(format.len() + 16);
    let mut next_arg = 0;
    let mut rest = format;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match Specifier::parse(tail) {
            Some(spec) => {
                rest = &tail[spec.text.len()..];
                spec.render(&mut out, args, &mut next_arg)?;
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn scan_digits(bytes: &[u8], from: usize) -> usize {
    let mut end = from;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    end
}

impl<'a> Specifier<'a> {
    fn parse(tail: &'a str) -> Option<Self> {
        let bytes = tail.as_bytes();
        let mut i = 1;

        let mut index = None;
        let end = scan_digits(bytes, i);
        if end > i && bytes.get(end) == Some(&b'$') {
            index = Some(tail[i..end].parse().ok()?);
            i = end + 1;
        }

        let mut flags = Flags::default();
        while let Some(b) = bytes.get(i) {
            match b {
                b'-' => flags.left = true,
                b'#' => flags.alternate = true,
                b'+' => flags.plus = true,
                b'0' => flags.zero = true,
                b',' => flags.grouping = true,
                _ => break,
            }
            i += 1;
        }

        let mut width = None;
        let end = scan_digits(bytes, i);
        if end > i {
            width = Some(tail[i..end].parse().ok()?);
            i = end;
        }

        let mut precision = None;
        if bytes.get(i) == Some(&b'.') {
            let end = scan_digits(bytes, i + 1);
            if end == i + 1 {
                return None;
            }
            precision = Some(tail[i + 1..end].parse().ok()?);
            i = end;
        }

        let conversion = *bytes.get(i)?;
        if !CONVERSIONS.contains(&conversion) {
            return None;
        }

        Some(Self {
            text: &tail[..=i],
            index,
            flags,
            width,
            precision,
            conversion,
        })
    }

    fn render(
        &self,
        out: &mut String,
        args: &[Arg],
        next_arg: &mut usize,
    ) -> Result<(), FormatError> {
        match self.conversion {
            b'n' => {
                out.push_str(LINE_SEPARATOR);
                return Ok(());
            }
            b'%' => {
                self.pad(out, "%");
                return Ok(());
            }
            _ => {}
        }

        let arg = match self.index {
            Some(index) => index.checked_sub(1).and_then(|i| args.get(i)),
            None => {
                let arg = args.get(*next_arg);
                *next_arg += 1;
                arg
            }
        }
        .ok_or_else(|| FormatError::MissingArgument {
            specifier: self.text.to_string(),
        })?;

        match (self.conversion, arg) {
            (b's' | b'S', arg) => {
                let mut text = arg.to_string();
                if let Some(precision) = self.precision {
                    text = text.chars().take(precision).collect();
                }
                if self.conversion == b'S' {
                    text = text.to_uppercase();
                }
                self.pad(out, &text);
            }
            (b'd', Arg::Int(v)) => {
                let digits = self.group(v.unsigned_abs().to_string());
                self.push_number(out, self.sign(*v < 0), digits, "");
            }
            (b'd', Arg::UInt(v)) => {
                let digits = self.group(v.to_string());
                self.push_number(out, self.sign(false), digits, "");
            }
            (b'x' | b'X' | b'o', Arg::Int(v)) => self.push_radix(out, *v as u64),
            (b'x' | b'X' | b'o', Arg::UInt(v)) => self.push_radix(out, *v),
            (b'f' | b'e' | b'E', Arg::Float(v)) if !v.is_finite() => {
                if v.is_nan() {
                    self.pad(out, "NaN");
                } else if *v > 0.0 {
                    self.pad(out, "Infinity");
                } else {
                    self.pad(out, "-Infinity");
                }
            }
            (b'f' | b'e' | b'E', Arg::Float(v)) => {
                let precision = self.precision.unwrap_or(6);
                let magnitude = v.abs();
                let digits = match self.conversion {
                    b'f' => format!("{magnitude:.precision$}"),
                    b'e' => scientific(magnitude, precision),
                    _ => scientific(magnitude, precision).to_uppercase(),
                };
                self.push_number(out, self.sign(v.is_sign_negative()), digits, "");
            }
            (b'c', Arg::Char(c)) => self.pad(out, &c.to_string()),
            (b'c', Arg::Int(v)) => self.push_code_point(out, u32::try_from(*v).ok(), arg)?,
            (b'c', Arg::UInt(v)) => self.push_code_point(out, u32::try_from(*v).ok(), arg)?,
            (b'b' | b'B', arg) => {
                let text = match arg {
                    Arg::Bool(b) => b.to_string(),
                    _ => "true".to_string(),
                };
                if self.conversion == b'B' {
                    self.pad(out, &text.to_uppercase());
                } else {
                    self.pad(out, &text);
                }
            }
            (_, arg) => return Err(self.illegal(arg)),
        }

        Ok(())
    }

    fn illegal(&self, arg: &Arg) -> FormatError {
        FormatError::IllegalConversion {
            specifier: self.text.to_string(),
            kind: arg.kind(),
        }
    }

    fn group(&self, digits: String) -> String {
        if !self.flags.grouping {
            return digits;
        }

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        grouped
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.flags.plus {
            "+"
        } else {
            ""
        }
    }

    fn push_radix(&self, out: &mut String, bits: u64) {
        let (digits, prefix) = match self.conversion {
            b'o' => (format!("{bits:o}"), "0"),
            b'x' => (format!("{bits:x}"), "0x"),
            _ => (format!("{bits:X}"), "0X"),
        };
        let prefix = if self.flags.alternate { prefix } else { "" };
        self.push_number(out, "", digits, prefix);
    }

    fn push_code_point(
        &self,
        out: &mut String,
        code: Option<u32>,
        arg: &Arg,
    ) -> Result<(), FormatError> {
        let c = code
            .and_then(char::from_u32)
            .ok_or_else(|| self.illegal(arg))?;
        self.pad(out, &c.to_string());
        Ok(())
    }

    fn push_number(&self, out: &mut String, sign: &str, digits: String, prefix: &str) {
        let len = sign.len() + prefix.len() + digits.len();
        match self.width {
            Some(width) if self.flags.zero && !self.flags.left && width > len => {
                out.push_str(sign);
                out.push_str(prefix);
                out.extend(std::iter::repeat('0').take(width - len));
                out.push_str(&digits);
            }
            _ => self.pad(out, &format!("{sign}{prefix}{digits}")),
        }
    }

    fn pad(&self, out: &mut String, text: &str) {
        let len = text.chars().count();
        let fill = self.width.map_or(0, |w| w.saturating_sub(len));

        if self.flags.left {
            out.push_str(text);
            out.extend(std::iter::repeat(' ').take(fill));
        } else {
            out.extend(std::iter::repeat(' ').take(fill));
            out.push_str(text);
        }
    }
}

/// Shortest text that reads back as `value`: plain decimal with at least one
/// fraction digit between 10^-3 and 10^7, `1.0E20` style outside that range.
fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();
        return if text.contains('.') {
            text
        } else {
            format!("{text}.0")
        };
    }

    let text = format!("{value:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => text,
    }
}

/// `1.500000e+02` style notation.
fn scientific(value: f64, precision: usize) -> String {
    let formatted = format!("{value:.precision$e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}
