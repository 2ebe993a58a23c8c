//! Text codec.
//!
//! A message is written as four double-quoted fields separated by single
//! spaces and terminated by `\n`:
//!
//! ```text
//! "put" "" "color" "dark ""blue"""
//! ```
//!
//! A double quote inside a field is written twice. Decoding accepts exactly
//! four quoted segments; anything else is a format error.

use crate::error::{Result, StreamingError};
use crate::protocol::{Header, Message, Status};

/// Frame terminator.
pub const DELIMITER: u8 = b'\n';

const FIELDS: usize = 4;

/// Encode a message, including the trailing newline.
pub fn encode(msg: &Message) -> String {
    let status = msg.status.map(Status::as_str).unwrap_or("");
    let mut out = String::with_capacity(msg.key.len() + msg.value.len() + 32);
    for (i, field) in [msg.header.as_str(), status, msg.key.as_str(), msg.value.as_str()]
        .into_iter()
        .enumerate()
    {
        if i > 0 {
            out.push(' ');
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push(DELIMITER as char);
    out
}

/// Decode one frame. A trailing newline, if present, is ignored.
pub fn decode(frame: &str) -> Result<Message> {
    let fields = split_fields(frame.trim_end_matches(&['\n', '\r'][..]))?;
    let [header, status, key, value]: [String; FIELDS] = fields
        .try_into()
        .map_err(|v: Vec<String>| {
            StreamingError::Format(format!("expected {FIELDS} fields, found {}", v.len()))
        })?;

    let header = header.parse::<Header>()?;
    let status = if status.is_empty() {
        None
    } else {
        Some(status.parse::<Status>()?)
    };

    Ok(Message {
        header,
        status,
        key,
        value,
    })
}

fn split_fields(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::with_capacity(FIELDS);
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' => continue,
            '"' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(other) => field.push(other),
                        None => {
                            return Err(StreamingError::Format("unterminated field".into()));
                        }
                    }
                }
                fields.push(field);
            }
            other => {
                return Err(StreamingError::Format(format!(
                    "unexpected {other:?} outside quotes"
                )));
            }
        }
    }

    Ok(fields)
}
