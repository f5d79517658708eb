//! Lenient JSON repair.
//!
//! Models asked for "JSON only" routinely return almost-JSON: trailing
//! commas, single quotes, unquoted keys, Python literals, comments, unescaped
//! inner quotes or a reply cut off by the token limit. [`repair_parse`] reads
//! such text with a forgiving recursive-descent parser and builds the closest
//! `serde_json::Value`. It is only used after a strict parse has failed.

use serde_json::{Map, Number, Value};

/// Containers nested deeper than this are dropped.
const MAX_DEPTH: usize = 128;

/// Parse `input` leniently.
///
/// Returns `None` when the input holds no value at all. Trailing text after
/// the first complete top-level value is ignored.
pub fn repair_parse(input: &str) -> Option<Value> {
    let mut repairer = Repairer {
        chars: input.chars().collect(),
        pos: 0,
    };
    repairer.parse_value(0)
}

struct Repairer {
    chars: Vec<char>,
    pos: usize,
}

fn is_opening_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201c}')
}

fn ends_bare_word(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | ',' | ':' | '"' | '\n' | '\r')
}

fn is_ellipsis(word: &str) -> bool {
    word == "..." || word == "\u{2026}"
}

impl Repairer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.pos += 1;
            }
            match (self.peek(), self.peek_at(1)) {
                (Some('#'), _) | (Some('/'), Some('/')) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    while self.pos < self.chars.len()
                        && !(self.peek() == Some('*') && self.peek_at(1) == Some('/'))
                    {
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(self.chars.len());
                }
                _ => break,
            }
        }
    }

    /// Parse one value. `None` means there was nothing to parse: end of input
    /// or a placeholder such as `...`.
    fn parse_value(&mut self, depth: usize) -> Option<Value> {
        if depth > MAX_DEPTH {
            self.pos = self.chars.len();
            return None;
        }
        self.skip_whitespace_and_comments();
        while matches!(self.peek(), Some(',') | Some(':')) {
            self.pos += 1;
            self.skip_whitespace_and_comments();
        }
        match self.peek()? {
            '{' => Some(self.parse_object(depth + 1)),
            '[' => Some(self.parse_array(depth + 1)),
            c if is_opening_quote(c) => Some(Value::String(self.parse_string())),
            // Stray closers are handled by the enclosing container.
            '}' | ']' => None,
            _ => {
                let word = self.parse_bare_word();
                if is_ellipsis(&word) || word.is_empty() {
                    None
                } else {
                    Some(literal(&word))
                }
            }
        }
    }

    fn parse_object(&mut self, depth: usize) -> Value {
        // Opening brace.
        self.pos += 1;
        let mut map = Map::new();

        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => break,
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(']') => break,
                Some(',') | Some(':') => {
                    self.pos += 1;
                }
                Some(_) => {
                    let Some(key) = self.parse_key(depth) else {
                        continue;
                    };
                    self.skip_whitespace_and_comments();
                    let value = if self.peek() == Some(':') {
                        self.pos += 1;
                        self.parse_value(depth).unwrap_or(Value::Null)
                    } else {
                        Value::Null
                    };
                    map.insert(key, value);
                }
            }
        }

        Value::Object(map)
    }

    /// Read an object key. Containers in key position are consumed and
    /// dropped; placeholders yield `None`.
    fn parse_key(&mut self, depth: usize) -> Option<String> {
        match self.peek()? {
            c if is_opening_quote(c) => Some(self.parse_string()),
            '{' | '[' => {
                self.parse_value(depth);
                None
            }
            _ => {
                let word = self.parse_bare_word();
                if is_ellipsis(&word) || word.is_empty() {
                    None
                } else {
                    Some(word)
                }
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> Value {
        // Opening bracket.
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => break,
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some('}') => break,
                Some(',') | Some(':') => {
                    self.pos += 1;
                }
                Some(_) => {
                    if let Some(value) = self.parse_value(depth) {
                        items.push(value);
                    }
                }
            }
        }

        Value::Array(items)
    }

    /// Read a quoted string starting at the opening quote.
    ///
    /// A closing quote only ends the string when it is followed by a
    /// structural character, a line break, end of input, or whitespace and
    /// then another opening quote (a missing comma). Otherwise it is kept as
    /// an unescaped inner quote. Unterminated strings run to the end
    /// of input.
    fn parse_string(&mut self) -> String {
        let Some(open) = self.peek() else {
            return String::new();
        };
        self.pos += 1;
        let mut out = String::new();

        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => self.parse_escape(&mut out),
                c if closes(open, c) => {
                    if self.quote_ends_string() {
                        return out;
                    }
                    out.push(c);
                }
                c => out.push(c),
            }
        }

        out
    }

    fn quote_ends_string(&self) -> bool {
        let mut offset = 0;
        loop {
            match self.peek_at(offset) {
                None => return true,
                Some('\n') | Some('\r') => return true,
                Some(c) if c.is_whitespace() => offset += 1,
                Some(c) if offset > 0 && is_opening_quote(c) => return true,
                Some(c) => return matches!(c, ',' | '}' | ']' | ':'),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) {
        let Some(c) = self.peek() else {
            return;
        };
        self.pos += 1;
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000c}'),
            'u' => {
                let Some(high) = self.read_hex4() else {
                    out.push_str("\\u");
                    return;
                };
                if (0xD800..0xDC00).contains(&high)
                    && self.peek() == Some('\\')
                    && self.peek_at(1) == Some('u')
                {
                    self.pos += 2;
                    if let Some(low) = self.read_hex4() {
                        let combined =
                            0x10000 + ((high - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF);
                        out.push(char::from_u32(combined).unwrap_or('\u{fffd}'));
                        return;
                    }
                }
                out.push(char::from_u32(high).unwrap_or('\u{fffd}'));
            }
            other => out.push(other),
        }
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let digits: String = self.chars.get(self.pos..self.pos + 4)?.iter().collect();
        let value = u32::from_str_radix(&digits, 16).ok()?;
        self.pos += 4;
        Some(value)
    }

    fn parse_bare_word(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| !ends_bare_word(c)) {
            self.pos += 1;
        }
        if self.pos == start {
            // Guarantee progress on an unexpected delimiter.
            self.pos += 1;
            return String::new();
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .trim()
            .to_string()
    }
}

fn closes(open: char, c: char) -> bool {
    match open {
        '\u{201c}' => c == '\u{201d}' || c == '"',
        _ => c == open,
    }
}

/// Interpret an unquoted word: JSON and Python literals, numbers, otherwise text.
fn literal(word: &str) -> Value {
    match word {
        "true" | "True" => return Value::Bool(true),
        "false" | "False" => return Value::Bool(false),
        "null" | "None" | "undefined" => return Value::Null,
        _ => {}
    }
    if let Ok(n) = word.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = word.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_json_is_unchanged() {
        let input = r#"{"topic": "x", "questions": [1, 2.5, true, null]}"#;
        assert_eq!(
            repair_parse(input),
            Some(json!({"topic": "x", "questions": [1, 2.5, true, null]}))
        );
    }

    #[test]
    fn trailing_commas() {
        assert_eq!(
            repair_parse(r#"{"a": [1, 2, 3,], "b": "c",}"#),
            Some(json!({"a": [1, 2, 3], "b": "c"}))
        );
    }

    #[test]
    fn single_quotes_and_bare_keys() {
        assert_eq!(
            repair_parse("{topic: 'Capybaras', right_option: c}"),
            Some(json!({"topic": "Capybaras", "right_option": "c"}))
        );
    }

    #[test]
    fn python_literals() {
        assert_eq!(
            repair_parse("[True, False, None]"),
            Some(json!([true, false, null]))
        );
    }

    #[test]
    fn missing_closers_at_end_of_input() {
        assert_eq!(
            repair_parse(r#"{"questions": [{"question": "Why?", "options": ["a. x", "b. y"#),
            Some(json!({"questions": [{"question": "Why?", "options": ["a. x", "b. y"]}]}))
        );
    }

    #[test]
    fn comments_are_skipped() {
        let input = r#"{
            // the topic
            "topic": "x", # python style
            /* block */ "n": 1
        }"#;
        assert_eq!(repair_parse(input), Some(json!({"topic": "x", "n": 1})));
    }

    #[test]
    fn unescaped_inner_quotes() {
        assert_eq!(
            repair_parse(r#"{"question": "What does "capybara" mean?", "n": 1}"#),
            Some(json!({"question": "What does \"capybara\" mean?", "n": 1}))
        );
    }

    #[test]
    fn missing_commas_between_members() {
        assert_eq!(
            repair_parse("{\"a\": 1 \"b\": 2}\n"),
            Some(json!({"a": 1, "b": 2}))
        );
        assert_eq!(
            repair_parse(r#"[{"a": 1} {"b": 2}]"#),
            Some(json!([{"a": 1}, {"b": 2}]))
        );
        assert_eq!(
            repair_parse(r#"{"a": "x" "b": "y"}"#),
            Some(json!({"a": "x", "b": "y"}))
        );
        assert_eq!(
            repair_parse(r#"{"right_option": "c" "question": "Why?", "options": ["a. x" "b. y"]}"#),
            Some(json!({"right_option": "c", "question": "Why?", "options": ["a. x", "b. y"]}))
        );
    }

    #[test]
    fn ellipsis_placeholders_are_dropped() {
        assert_eq!(
            repair_parse(r#"[{"a": 1}, ...]"#),
            Some(json!([{"a": 1}]))
        );
    }

    #[test]
    fn escapes_are_decoded() {
        assert_eq!(
            repair_parse(r#"['line\nbreak', "\u00e9\ud83d\ude00"]"#),
            Some(json!(["line\nbreak", "é😀"]))
        );
    }

    #[test]
    fn curly_quotes() {
        assert_eq!(
            repair_parse("{\u{201c}topic\u{201d}: \u{201c}x\u{201d}}"),
            Some(json!({"topic": "x"}))
        );
    }

    #[test]
    fn key_without_value_is_null() {
        assert_eq!(repair_parse(r#"{"a"}"#), Some(json!({"a": null})));
    }

    #[test]
    fn mismatched_closer_ends_container() {
        assert_eq!(repair_parse(r#"{"a": [1, 2}"#), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn empty_input_has_no_value() {
        assert_eq!(repair_parse(""), None);
        assert_eq!(repair_parse("   // nothing here"), None);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let input = "[".repeat(10_000);
        assert!(repair_parse(&input).is_some());
    }
}
