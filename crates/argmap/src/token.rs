//! Classification of raw argument strings.
//!
//! Word characters are ASCII `[A-Za-z0-9_]`. Attached values must be
//! non-empty and may not contain line terminators.

/// Shape of one raw argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `-abc` (one or more names, no value) or `-x=value` (one name).
    Short {
        names: &'a str,
        value: Option<&'a str>,
    },
    /// `--name` or `--name=value`.
    Long {
        name: &'a str,
        value: Option<&'a str>,
    },
    /// Anything that is neither.
    Other,
}

pub fn classify(arg: &str) -> Token<'_> {
    short(arg).or_else(|| long(arg)).unwrap_or(Token::Other)
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_attached_value(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
}

fn short(arg: &str) -> Option<Token<'_>> {
    let body = arg.strip_prefix('-')?;
    let bytes = body.as_bytes();

    if !bytes.is_empty() && bytes.iter().copied().all(is_word) {
        return Some(Token::Short {
            names: body,
            value: None,
        });
    }

    if bytes.len() >= 3 && is_word(bytes[0]) && bytes[1] == b'=' {
        let value = &body[2..];
        if is_attached_value(value) {
            return Some(Token::Short {
                names: &body[..1],
                value: Some(value),
            });
        }
    }

    None
}

fn long(arg: &str) -> Option<Token<'_>> {
    let body = arg.strip_prefix("--")?;
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };

    let bytes = name.as_bytes();
    let valid_name = bytes.len() >= 2
        && is_word(bytes[0])
        && is_word(bytes[bytes.len() - 1])
        && bytes.iter().all(|&b| is_word(b) || b == b'-');
    if !valid_name || value.is_some_and(|v| !is_attached_value(v)) {
        return None;
    }

    Some(Token::Long { name, value })
}
