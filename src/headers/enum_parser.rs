//! Extraction of C++ enum definitions, with their doc comments, from header text.
//!
//! Handles the shapes found in the OpenZWave headers:
//!
//! ```text
//! enum ValueGenre
//! {
//!     ValueGenre_Basic = 0,   /**< The 'level' as controlled by basic commands. */
//!     ValueGenre_User,        /**< Basic values an ordinary user would be
//!                                  interested in. */
//!     /** Leading doc comment */
//!     ValueGenre_Config,
//!     ValueGenre_Count = ValueGenre_Config + 1
//! };
//! ```

use super::HeaderParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub name: String,
    pub value: u32,
    pub description: String,
}

#[derive(Debug, Default)]
struct PendingEntry {
    name: String,
    expr: String,
    description: Option<String>,
}

/// Parses the body of `enum <enum_name> { ... }` found anywhere in `source`.
pub fn parse_enum(source: &str, enum_name: &str) -> Result<Vec<EnumEntry>, HeaderParseError> {
    let open = find_enum_body(source, enum_name)
        .ok_or_else(|| HeaderParseError::MissingEnum(enum_name.to_string()))?;
    EnumBodyParser::new(source, open, enum_name).run()
}

/// Byte offset just past the `{` that opens the named enum.
fn find_enum_body(source: &str, enum_name: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut search_from = 0;

    while let Some(found) = source[search_from..].find("enum") {
        let start = search_from + found;
        search_from = start + "enum".len();

        if start > 0 && is_ident_byte(bytes[start - 1]) {
            continue;
        }
        let rest = &source[search_from..];
        let after_ws = rest.trim_start();
        if after_ws.len() == rest.len() {
            // "enum" is a prefix of a longer identifier
            continue;
        }
        let Some(tail) = after_ws.strip_prefix(enum_name) else {
            continue;
        };
        if tail.as_bytes().first().is_some_and(|b| is_ident_byte(*b)) {
            continue;
        }
        let tail = tail.trim_start();
        // forward declarations and `enum X : type` without a body are skipped
        if let Some(brace) = tail.find('{') {
            if tail[..brace].contains(';') {
                continue;
            }
            let offset = source.len() - tail.len();
            return Some(offset + brace + 1);
        }
    }
    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

enum Comment {
    /// `/**< */`, `//!< ` and friends: documents the entry before it.
    Trailing(String),
    /// `/** */`, `///`: documents the entry after it.
    Leading(String),
    Plain,
}

fn classify_comment(body: &str) -> Comment {
    for marker in ["*<", "!<", "/<"] {
        if let Some(text) = body.strip_prefix(marker) {
            return Comment::Trailing(clean_doc(text));
        }
    }
    for marker in ['*', '!', '/'] {
        if let Some(text) = body.strip_prefix(marker) {
            if !text.is_empty() {
                return Comment::Leading(clean_doc(text));
            }
        }
    }
    Comment::Plain
}

/// Collapses a doc comment to one line, dropping the `*` gutters of block comments.
fn clean_doc(text: &str) -> String {
    text.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .flat_map(|line| line.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

struct EnumBodyParser<'a> {
    source: &'a str,
    pos: usize,
    enum_name: &'a str,
    entries: Vec<EnumEntry>,
    current: Option<PendingEntry>,
    leading_doc: Option<String>,
}

impl<'a> EnumBodyParser<'a> {
    fn new(source: &'a str, pos: usize, enum_name: &'a str) -> Self {
        Self {
            source,
            pos,
            enum_name,
            entries: Vec::new(),
            current: None,
            leading_doc: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn run(mut self) -> Result<Vec<EnumEntry>, HeaderParseError> {
        loop {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                return Err(HeaderParseError::UnterminatedEnum(self.enum_name.to_string()));
            };

            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else if rest.starts_with("/*") {
                let end = rest[2..].find("*/").ok_or_else(|| {
                    HeaderParseError::UnterminatedEnum(self.enum_name.to_string())
                })?;
                let comment = classify_comment(&rest[2..2 + end]);
                self.pos += 2 + end + 2;
                self.attach(comment);
            } else if rest.starts_with("//") {
                let end = rest.find('\n').unwrap_or(rest.len());
                let comment = classify_comment(&rest[2..end]);
                self.pos += end;
                self.attach(comment);
            } else if c == '#' {
                // preprocessor line
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if c == ',' {
                self.pos += 1;
                self.finish_entry()?;
            } else if c == '}' {
                self.finish_entry()?;
                return Ok(self.entries);
            } else if c.is_ascii() && is_ident_byte(c as u8) {
                let len = rest
                    .bytes()
                    .position(|b| !is_ident_byte(b))
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                self.pos += len;
                self.push_word(word)?;
            } else if c == '=' && self.current.is_some() {
                self.pos += 1;
            } else if let Some(entry) = self.current.as_mut() {
                entry.expr.push(c);
                self.pos += c.len_utf8();
            } else {
                return Err(HeaderParseError::UnexpectedToken {
                    enum_name: self.enum_name.to_string(),
                    token: c.to_string(),
                });
            }
        }
    }

    fn push_word(&mut self, word: &str) -> Result<(), HeaderParseError> {
        match self.current.as_mut() {
            Some(entry) => {
                entry.expr.push_str(word);
                Ok(())
            }
            None if word.as_bytes()[0].is_ascii_digit() => Err(HeaderParseError::UnexpectedToken {
                enum_name: self.enum_name.to_string(),
                token: word.to_string(),
            }),
            None => {
                self.current = Some(PendingEntry {
                    name: word.to_string(),
                    expr: String::new(),
                    description: self.leading_doc.take(),
                });
                Ok(())
            }
        }
    }

    fn attach(&mut self, comment: Comment) {
        match comment {
            Comment::Trailing(text) => {
                if let Some(entry) = self.current.as_mut() {
                    entry.description = Some(text);
                } else if let Some(entry) = self.entries.last_mut() {
                    entry.description = text;
                }
            }
            Comment::Leading(text) => self.leading_doc = Some(text),
            Comment::Plain => {}
        }
    }

    fn finish_entry(&mut self) -> Result<(), HeaderParseError> {
        let Some(pending) = self.current.take() else {
            return Ok(());
        };
        let value = self.evaluate(&pending)?;
        self.entries.push(EnumEntry {
            name: pending.name,
            value,
            description: pending.description.unwrap_or_default(),
        });
        Ok(())
    }

    fn evaluate(&self, pending: &PendingEntry) -> Result<u32, HeaderParseError> {
        let expr: String = pending.expr.split_whitespace().collect();
        if expr.is_empty() {
            return Ok(self
                .entries
                .last()
                .map_or(0, |previous| previous.value.wrapping_add(1)));
        }

        let unsupported = || HeaderParseError::UnsupportedValue {
            enum_name: self.enum_name.to_string(),
            entry: pending.name.clone(),
            expr: expr.clone(),
        };

        // `Name + 1` style offsets
        let (base, offset) = match expr.split_once('+') {
            Some((base, offset)) => (base, Some(offset)),
            None => (expr.as_str(), None),
        };
        let mut value = self.term(base).ok_or_else(unsupported)?;
        if let Some(offset) = offset {
            let offset = self.term(offset).ok_or_else(unsupported)?;
            value = value.checked_add(offset).ok_or_else(unsupported)?;
        }
        Ok(value)
    }

    fn term(&self, text: &str) -> Option<u32> {
        let text = text.trim_matches(['(', ')']);
        if let Some(previous) = self.entries.iter().find(|entry| entry.name == text) {
            return Some(previous.value);
        }
        let literal = text.trim_end_matches(['u', 'U', 'l', 'L']);
        if let Some(hex) = literal
            .strip_prefix("0x")
            .or_else(|| literal.strip_prefix("0X"))
        {
            u32::from_str_radix(hex, 16).ok()
        } else {
            literal.parse().ok()
        }
    }
}
