// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line Protocol escaping rules.
//!
//! | Context | Escaped | Wrapping |
//! |---|---|---|
//! | measurement | `,` and space | none |
//! | tag key, tag value, field key | `,` `=` and space | none |
//! | string field value | `\` and `"` | double quotes |
//!
//! See: <https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/#special-characters>

const MEASUREMENT_SPECIAL: &[char] = &[',', ' '];
const KEY_SPECIAL: &[char] = &[',', '=', ' '];
const STRING_FIELD_SPECIAL: &[char] = &['\\', '"'];

/// Append `s` to `out`, prefixing every char of `special` with a backslash.
fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Escape a measurement name. Commas and spaces are escaped.
pub fn escape_measurement(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s, MEASUREMENT_SPECIAL);
    out
}

/// Escape a tag key, tag value or field key.
/// Commas, equals signs and spaces are escaped.
pub fn escape_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s, KEY_SPECIAL);
    out
}

/// Quote a string field value, escaping backslashes and double quotes.
pub fn quote_string_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    escape_into(&mut out, s, STRING_FIELD_SPECIAL);
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inverse of `escape_into`, as a line protocol parser would apply it.
    fn unescape(s: &str, special: &[char]) -> String {
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(&next) = chars.peek() {
                    if special.contains(&next) {
                        out.push(next);
                        chars.next();
                        continue;
                    }
                }
            }
            out.push(c);
        }
        out
    }

    fn random_string(rng: &mut fastrand::Rng) -> String {
        const ALPHABET: &[char] = &['a', 'Z', '0', ',', '=', ' ', '"', '\\', 'é', '_'];
        let len = rng.usize(0..24);
        (0..len)
            .map(|_| ALPHABET[rng.usize(..ALPHABET.len())])
            .collect()
    }

    #[test]
    fn test_escape_measurement() {
        assert_eq!(escape_measurement("escape measurement"), "escape\\ measurement");
        assert_eq!(escape_measurement("cpu,load"), "cpu\\,load");
        assert_eq!(escape_measurement("a=b"), "a=b");
    }

    #[test]
    fn test_escape_key() {
        assert_eq!(escape_key("tag2=key2"), "tag2\\=key2");
        assert_eq!(escape_key("ex,value2"), "ex\\,value2");
        assert_eq!(escape_key("tag key"), "tag\\ key");
        assert_eq!(escape_key("plain"), "plain");
    }

    #[test]
    fn test_quote_string_field() {
        assert_eq!(quote_string_field("long string"), "\"long string\"");
        assert_eq!(quote_string_field("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_string_field("C:\\temp"), "\"C:\\\\temp\"");
        assert_eq!(quote_string_field(""), "\"\"");
    }

    #[test]
    fn test_quote_string_field_leaves_key_chars() {
        assert_eq!(quote_string_field("a,b=c d"), "\"a,b=c d\"");
    }

    #[test]
    fn test_escaping_is_reversible() {
        let mut rng = fastrand::Rng::with_seed(0x1f1u64);
        for _ in 0..2000 {
            let s = random_string(&mut rng);

            assert_eq!(unescape(&escape_measurement(&s), MEASUREMENT_SPECIAL), s);
            assert_eq!(unescape(&escape_key(&s), KEY_SPECIAL), s);

            let quoted = quote_string_field(&s);
            assert!(quoted.starts_with('"') && quoted.ends_with('"'));
            let inner = &quoted[1..quoted.len() - 1];
            assert_eq!(unescape(inner, STRING_FIELD_SPECIAL), s);
        }
    }

    #[test]
    fn test_escaped_key_has_no_bare_separators() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..2000 {
            let escaped = escape_key(&random_string(&mut rng));
            let mut prev = None;
            for c in escaped.chars() {
                if KEY_SPECIAL.contains(&c) {
                    assert_eq!(prev, Some('\\'), "bare {c:?} in {escaped:?}");
                }
                prev = Some(c);
            }
        }
    }
}
