//! Rendering of a single attribute as ` key=value`.

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeDelta};
use std::io::Write;
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

use crate::color::{self, Color};
use crate::value::{Attr, Value};

/// Dotted key prefix in effect for an attribute.
///
/// `Scope` holds a prefix that is already dotted (`"g1.g2."`, or empty);
/// `Group` chains a nested group key on top of its parent. Keys are written
/// piecewise so rendering nested groups never concatenates strings.
#[derive(Clone, Copy, Debug)]
pub enum KeyPrefix<'a> {
    Scope(&'a str),
    Group(&'a KeyPrefix<'a>, &'a str),
}

impl<'a> KeyPrefix<'a> {
    pub const EMPTY: KeyPrefix<'a> = KeyPrefix::Scope("");

    fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            KeyPrefix::Scope(dotted) => buf.extend_from_slice(dotted.as_bytes()),
            KeyPrefix::Group(parent, name) => {
                parent.write_to(buf);
                buf.extend_from_slice(name.as_bytes());
                buf.push(b'.');
            }
        }
    }
}

/// Write ` key=value` for `attr` into `buf`.
///
/// Lazy values are resolved first. The empty attribute writes nothing,
/// not even the separator. Groups write one ` key=value` per (non-empty)
/// child with the group key folded into the child's prefix.
pub fn write_attr(buf: &mut Vec<u8>, colorize: bool, prefix: KeyPrefix<'_>, attr: &Attr) {
    let value = attr.value.clone().resolve();
    if attr.key.is_empty() && matches!(value, Value::Empty) {
        return;
    }

    if let Value::Group(children) = &value {
        let nested = KeyPrefix::Group(&prefix, &*attr.key);
        for child in children {
            write_attr(buf, colorize, nested, child);
        }
        return;
    }

    let (key_color, value_color) = if value.is_error() {
        (Color::RED, Color::LIGHT_RED)
    } else {
        (Color::CYAN, Color::WHITE)
    };

    buf.push(b' ');
    color::write_code(colorize, buf, key_color);
    prefix.write_to(buf);
    buf.extend_from_slice(attr.key.as_bytes());
    buf.push(b'=');
    color::write_code(colorize, buf, Color::RESET);

    color::write_code(colorize, buf, value_color);
    write_value(buf, &value);
    color::write_code(colorize, buf, Color::RESET);
}

/// Append the text encoding of an already resolved value.
pub fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Int64(v) => {
            let _ = write!(buf, "{v}");
        }
        Value::Uint64(v) => {
            let _ = write!(buf, "{v}");
        }
        Value::Float64(v) => write_float(buf, *v),
        Value::Bool(v) => buf.extend_from_slice(if *v { &b"true"[..] } else { &b"false"[..] }),
        Value::Duration(d) => write_duration(buf, *d),
        Value::Time(t) => write_time(buf, t),
        Value::String(s) => write_quoted(buf, s),
        Value::Any(v) => write_quoted(buf, &v.to_string()),
        Value::Error(e) => write_quoted(buf, &e.to_string()),
        Value::Empty => write_quoted(buf, "<nil>"),
        // Unreachable after resolve(); rendered like any other opaque value.
        Value::Group(_) | Value::Lazy(_) => write_quoted(buf, &format!("{value:?}")),
    }
}

/// Shortest round-trip float in `%g` layout: exponent form once the decimal
/// exponent is below -4 or at least 6, e.g. `0.25`, `123456`, `1e+06`, `1e-05`.
pub fn write_float(buf: &mut Vec<u8>, v: f64) {
    if v.is_nan() {
        buf.extend_from_slice(b"NaN");
        return;
    }
    if v.is_infinite() {
        buf.extend_from_slice(if v > 0.0 { b"+Inf" } else { b"-Inf" });
        return;
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.2345e-7".
    let sci = format!("{v:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if negative {
        buf.push(b'-');
    }

    if v == 0.0 {
        buf.push(b'0');
    } else if exp < -4 || exp >= 6 {
        buf.extend_from_slice(mantissa.as_bytes());
        let _ = write!(buf, "e{}{:02}", if exp < 0 { '-' } else { '+' }, exp.unsigned_abs());
    } else if exp < 0 {
        buf.extend_from_slice(b"0.");
        buf.extend(std::iter::repeat(b'0').take((-exp - 1) as usize));
        buf.extend_from_slice(digits.as_bytes());
    } else {
        let int_len = exp as usize + 1;
        if digits.len() <= int_len {
            buf.extend_from_slice(digits.as_bytes());
            buf.extend(std::iter::repeat(b'0').take(int_len - digits.len()));
        } else {
            buf.extend_from_slice(digits[..int_len].as_bytes());
            buf.push(b'.');
            buf.extend_from_slice(digits[int_len..].as_bytes());
        }
    }
}

/// Human duration such as `1h2m3.5s`, `1.5s`, `250ms`, `1.2µs` or `0s`.
pub fn write_duration(buf: &mut Vec<u8>, d: TimeDelta) {
    let nanos = d.num_nanoseconds().unwrap_or(if d < TimeDelta::zero() {
        i64::MIN
    } else {
        i64::MAX
    });
    if nanos == 0 {
        buf.extend_from_slice(b"0s");
        return;
    }
    if nanos < 0 {
        buf.push(b'-');
    }
    let u = nanos.unsigned_abs();

    if u < 1_000_000_000 {
        let (prec, unit) = match u {
            0..=999 => (0, "ns"),
            1_000..=999_999 => (3, "µs"),
            _ => (6, "ms"),
        };
        write_scaled(buf, u, prec);
        buf.extend_from_slice(unit.as_bytes());
        return;
    }

    let secs = u / 1_000_000_000;
    let (hours, minutes) = (secs / 3600, secs / 60 % 60);
    if hours > 0 {
        let _ = write!(buf, "{hours}h");
    }
    if secs >= 60 {
        let _ = write!(buf, "{minutes}m");
    }
    write_scaled(buf, u % 60_000_000_000, 9);
    buf.push(b's');
}

/// Write `v / 10^prec` with the fraction's trailing zeros (and a bare
/// decimal point) removed.
fn write_scaled(buf: &mut Vec<u8>, v: u64, prec: u32) {
    let scale = 10u64.pow(prec);
    let _ = write!(buf, "{}", v / scale);
    let frac = v % scale;
    if frac == 0 {
        return;
    }
    let mut digits = format!("{frac:0width$}", width = prec as usize);
    while digits.ends_with('0') {
        digits.pop();
    }
    buf.push(b'.');
    buf.extend_from_slice(digits.as_bytes());
}

/// RFC 3339 at second precision; UTC is written as `Z`.
pub fn write_time(buf: &mut Vec<u8>, t: &DateTime<FixedOffset>) {
    buf.extend_from_slice(t.to_rfc3339_opts(SecondsFormat::Secs, true).as_bytes());
}

/// Whether `c` is written as-is inside quotes: letters, marks, numbers,
/// punctuation, symbols and the ASCII space.
fn is_printable(c: char) -> bool {
    if c.is_ascii() {
        return (' '..='~').contains(&c);
    }
    !matches!(
        c.general_category_group(),
        GeneralCategoryGroup::Separator | GeneralCategoryGroup::Other
    )
}

/// Double-quote `s`, escaping quotes, backslashes and every character
/// that is not printable.
pub fn write_quoted(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for c in s.chars() {
        match c {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\x07' => buf.extend_from_slice(b"\\a"),
            '\x08' => buf.extend_from_slice(b"\\b"),
            '\x0c' => buf.extend_from_slice(b"\\f"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            '\x0b' => buf.extend_from_slice(b"\\v"),
            c if c < ' ' || c == '\x7f' => {
                let _ = write!(buf, "\\x{:02x}", c as u32);
            }
            c if !is_printable(c) && (c as u32) < 0x10000 => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c if !is_printable(c) => {
                let _ = write!(buf, "\\U{:08x}", c as u32);
            }
            c => {
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    buf.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fmt;

    fn render(attr: Attr) -> String {
        let mut buf = Vec::new();
        write_attr(&mut buf, false, KeyPrefix::EMPTY, &attr);
        String::from_utf8(buf).unwrap()
    }

    fn float(v: f64) -> String {
        let mut buf = Vec::new();
        write_float(&mut buf, v);
        String::from_utf8(buf).unwrap()
    }

    fn duration(nanos: i64) -> String {
        let mut buf = Vec::new();
        write_duration(&mut buf, TimeDelta::nanoseconds(nanos));
        String::from_utf8(buf).unwrap()
    }

    fn quoted(s: &str) -> String {
        let mut buf = Vec::new();
        write_quoted(&mut buf, s);
        String::from_utf8(buf).unwrap()
    }

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn scalar_encodings() {
        assert_eq!(render(Attr::new("n", -42)), " n=-42");
        assert_eq!(render(Attr::new("u", u64::MAX)), " u=18446744073709551615");
        assert_eq!(render(Attr::new("ok", false)), " ok=false");
        assert_eq!(render(Attr::new("s", "hello world")), " s=\"hello world\"");
        assert_eq!(render(Attr::new("d", TimeDelta::nanoseconds(1_500_000_000))), " d=1.5s");
        assert_eq!(render(Attr::new("v", Value::Empty)), " v=\"<nil>\"");
        assert_eq!(render(Attr::any("addr", "127.0.0.1:80")), " addr=\"127.0.0.1:80\"");
    }

    #[test]
    fn time_is_rfc3339() {
        let utc = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(render(Attr::new("at", utc)), " at=2024-01-15T10:30:00Z");

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap();
        assert_eq!(render(Attr::new("at", local)), " at=2024-01-15T12:30:00+02:00");
    }

    #[test]
    fn float_encodings() {
        assert_eq!(float(0.0), "0");
        assert_eq!(float(-0.0), "-0");
        assert_eq!(float(1.0), "1");
        assert_eq!(float(3.25), "3.25");
        assert_eq!(float(-2.5), "-2.5");
        assert_eq!(float(0.1), "0.1");
        assert_eq!(float(0.0001), "0.0001");
        assert_eq!(float(0.00001), "1e-05");
        assert_eq!(float(123456.0), "123456");
        assert_eq!(float(1e6), "1e+06");
        assert_eq!(float(123456789.0), "1.23456789e+08");
        assert_eq!(float(1e21), "1e+21");
        assert_eq!(float(1.5e300), "1.5e+300");
        assert_eq!(float(f64::INFINITY), "+Inf");
        assert_eq!(float(f64::NEG_INFINITY), "-Inf");
        assert_eq!(float(f64::NAN), "NaN");
    }

    #[test]
    fn duration_encodings() {
        assert_eq!(duration(0), "0s");
        assert_eq!(duration(1), "1ns");
        assert_eq!(duration(1_100), "1.1µs");
        assert_eq!(duration(250_000_000), "250ms");
        assert_eq!(duration(1_500_000), "1.5ms");
        assert_eq!(duration(1_500_000_000), "1.5s");
        assert_eq!(duration(90_000_000_000), "1m30s");
        assert_eq!(duration(3_600_000_000_000), "1h0m0s");
        assert_eq!(duration(3_723_500_000_000), "1h2m3.5s");
        assert_eq!(duration(-2_000_000), "-2ms");
    }

    #[test]
    fn quoting_escapes_controls() {
        assert_eq!(quoted("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(quoted("tab\there\nnew"), r#""tab\there\nnew""#);
        assert_eq!(quoted("\x01\x7f"), r#""\x01\x7f""#);
        assert_eq!(quoted("\u{85}"), r#""\u0085""#);
        assert_eq!(quoted("héllo ✓"), "\"héllo ✓\"");
    }

    #[test]
    fn quoting_escapes_format_and_separator_characters() {
        assert_eq!(
            quoted("a\u{202e}b\u{a0}c\u{200b}"),
            r#""a\u202eb\u00a0c\u200b""#
        );
        assert_eq!(quoted("\u{2028}\u{feff}"), r#""\u2028\ufeff""#);
        assert_eq!(quoted("\u{e0001}"), r#""\U000e0001""#);
        assert_eq!(quoted("日本 😀"), "\"日本 😀\"");
    }

    #[test]
    fn empty_attr_writes_nothing() {
        assert_eq!(render(Attr::default()), "");
        assert_eq!(render(Attr::new("", 3)), " =3");
    }

    #[test]
    fn groups_flatten_with_dotted_keys() {
        let attr = Attr::group(
            "req",
            vec![
                Attr::new("id", 7),
                Attr::default(),
                Attr::group("peer", vec![Attr::new("port", 443u16)]),
            ],
        );
        assert_eq!(render(attr), " req.id=7 req.peer.port=443");
        assert_eq!(render(Attr::group("empty", Vec::new())), "");
    }

    #[test]
    fn lazy_values_are_resolved() {
        let attr = Attr::lazy("user", || Value::group(vec![Attr::new("id", 1)]));
        assert_eq!(render(attr), " user.id=1");
    }

    #[test]
    fn errors_use_red_family() {
        let mut buf = Vec::new();
        write_attr(&mut buf, true, KeyPrefix::EMPTY, &Attr::error("err", Boom));
        assert_eq!(buf, b" \x1b[31merr=\x1b[0m\x1b[91m\"boom\"\x1b[0m");

        buf.clear();
        write_attr(&mut buf, true, KeyPrefix::Scope("g."), &Attr::new("n", 1));
        assert_eq!(buf, b" \x1b[36mg.n=\x1b[0m\x1b[38:5:15m1\x1b[0m");
    }
}
