//! Byte-level scanning helpers for the Go subset Mortar understands.
//!
//! The scanner never builds tokens. It only answers "where does this thing
//! end?" questions (a comment, a string literal, a bracketed group, a
//! statement) so the parser can slice the original text without losing a
//! single byte.

use super::parser::ParseError;

/// How members of an aggregate are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberStyle {
    /// One member per line (struct fields, interface methods, const and
    /// import specs). A `;` also ends a member.
    Lines,
    /// Comma separated call arguments (validation checks).
    Commas,
}

pub(crate) struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
        }
    }

    pub(crate) fn src(&self) -> &'a str {
        self.src
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn byte(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    pub(crate) fn error(&self, pos: usize, message: impl Into<String>) -> ParseError {
        ParseError::at(self.src, pos, message)
    }

    /// Skip whitespace (newlines included) and comments.
    pub(crate) fn skip_trivia(&self, mut pos: usize) -> Result<usize, ParseError> {
        loop {
            match self.byte(pos) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => pos += 1,
                Some(b'/') => match self.comment_end(pos)? {
                    Some(end) => pos = end,
                    None => return Ok(pos),
                },
                _ => return Ok(pos),
            }
        }
    }

    /// Skip spaces and tabs only.
    pub(crate) fn skip_inline_space(&self, mut pos: usize) -> usize {
        while matches!(self.byte(pos), Some(b' ' | b'\t')) {
            pos += 1;
        }
        pos
    }

    /// If a comment starts at `pos`, return the position right after it.
    /// Line comments end before their newline.
    pub(crate) fn comment_end(&self, pos: usize) -> Result<Option<usize>, ParseError> {
        if self.byte(pos) != Some(b'/') {
            return Ok(None);
        }
        match self.byte(pos + 1) {
            Some(b'/') => {
                let end = self.src[pos..]
                    .find('\n')
                    .map_or(self.len(), |offset| pos + offset);
                Ok(Some(end))
            }
            Some(b'*') => match self.src[pos + 2..].find("*/") {
                Some(offset) => Ok(Some(pos + 2 + offset + 2)),
                None => Err(self.error(pos, "unterminated block comment")),
            },
            _ => Ok(None),
        }
    }

    /// Read an identifier starting at `pos`.
    pub(crate) fn ident(&self, pos: usize) -> Option<(&'a str, usize)> {
        let start = pos;
        let mut end = pos;
        for (offset, ch) in self.src[pos..].char_indices() {
            let ok = if offset == 0 {
                ch == '_' || ch.is_alphabetic()
            } else {
                ch == '_' || ch.is_alphanumeric()
            };
            if !ok {
                break;
            }
            end = pos + offset + ch.len_utf8();
        }
        (end > start).then(|| (&self.src[start..end], end))
    }

    /// True if `keyword` starts at `pos` and is not a prefix of a longer identifier.
    pub(crate) fn keyword_at(&self, pos: usize, keyword: &str) -> bool {
        matches!(self.ident(pos), Some((word, _)) if word == keyword)
    }

    /// Skip a string, raw string or rune literal starting at `pos`.
    pub(crate) fn skip_string(&self, pos: usize) -> Result<usize, ParseError> {
        let quote = self.bytes[pos];
        let mut i = pos + 1;
        while let Some(b) = self.byte(i) {
            match b {
                b'\\' if quote != b'`' => i += 2,
                b'\n' if quote != b'`' => break,
                b if b == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }
        Err(self.error(pos, "unterminated literal"))
    }

    /// Skip a bracketed group starting at `pos` (`(`, `[` or `{`) and return
    /// the position right after its matching close.
    pub(crate) fn skip_balanced(&self, pos: usize) -> Result<usize, ParseError> {
        let mut stack: Vec<u8> = Vec::new();
        let mut i = pos;
        while let Some(b) = self.byte(i) {
            match b {
                b'"' | b'\'' | b'`' => {
                    i = self.skip_string(i)?;
                    continue;
                }
                b'/' => {
                    if let Some(end) = self.comment_end(i)? {
                        i = end;
                        continue;
                    }
                }
                b'(' => stack.push(b')'),
                b'[' => stack.push(b']'),
                b'{' => stack.push(b'}'),
                b')' | b']' | b'}' => {
                    if stack.pop() != Some(b) {
                        return Err(self.error(i, format!("unexpected `{}`", b as char)));
                    }
                    if stack.is_empty() {
                        return Ok(i + 1);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        Err(self.error(pos, "unclosed bracket"))
    }

    /// End of a newline-terminated statement starting at `pos`.
    ///
    /// Returns the index of the terminating newline (exclusive), the position
    /// after a `;`, or the end of input. Brackets, literals and block comments
    /// may span lines.
    pub(crate) fn statement_end(&self, pos: usize) -> Result<usize, ParseError> {
        self.member_end(pos, MemberStyle::Lines, None)
    }

    /// End of one aggregate member starting at `pos`.
    ///
    /// `close` is the delimiter that ends the enclosing aggregate; hitting it
    /// at depth zero ends the member without consuming it.
    pub(crate) fn member_end(
        &self,
        pos: usize,
        style: MemberStyle,
        close: Option<u8>,
    ) -> Result<usize, ParseError> {
        let mut i = pos;
        while let Some(b) = self.byte(i) {
            if Some(b) == close {
                return Ok(i);
            }
            match b {
                b'\n' if style == MemberStyle::Lines => return Ok(i),
                b';' if style == MemberStyle::Lines => return Ok(i + 1),
                b',' if style == MemberStyle::Commas => return self.after_separator(i + 1),
                b'"' | b'\'' | b'`' => i = self.skip_string(i)?,
                b'(' | b'[' | b'{' => i = self.skip_balanced(i)?,
                b')' | b']' | b'}' => {
                    return Err(self.error(i, format!("unexpected `{}`", b as char)));
                }
                b'/' => match self.comment_end(i)? {
                    Some(end) if style == MemberStyle::Lines && self.byte(i + 1) == Some(b'/') => {
                        return Ok(end);
                    }
                    Some(end) => i = end,
                    None => i += 1,
                },
                _ => i += 1,
            }
        }
        Ok(i)
    }

    /// Index of the next `,` or `close` at depth zero, starting at `pos`.
    pub(crate) fn separator(&self, pos: usize, close: u8) -> Result<usize, ParseError> {
        let mut i = pos;
        while let Some(b) = self.byte(i) {
            match b {
                b',' => return Ok(i),
                b if b == close => return Ok(i),
                b'"' | b'\'' | b'`' => i = self.skip_string(i)?,
                b'(' | b'[' | b'{' => i = self.skip_balanced(i)?,
                b')' | b']' | b'}' => {
                    return Err(self.error(i, format!("unexpected `{}`", b as char)));
                }
                b'/' => match self.comment_end(i)? {
                    Some(end) => i = end,
                    None => i += 1,
                },
                _ => i += 1,
            }
        }
        Err(self.error(pos, "unclosed argument list"))
    }

    /// After a separating comma, keep a same-line trailing comment with the
    /// member it follows.
    fn after_separator(&self, pos: usize) -> Result<usize, ParseError> {
        let next = self.skip_inline_space(pos);
        if self.byte(next) == Some(b'/') && self.byte(next + 1) == Some(b'/') {
            if let Some(end) = self.comment_end(next)? {
                return Ok(end);
            }
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_whitespace() {
        let sc = Scanner::new("  // one\n /* two */\n\ttype");
        let pos = sc.skip_trivia(0).unwrap();
        assert!(sc.keyword_at(pos, "type"));
    }

    #[test]
    fn keyword_requires_word_boundary() {
        let sc = Scanner::new("types");
        assert!(!sc.keyword_at(0, "type"));
    }

    #[test]
    fn balanced_group_ignores_brackets_in_literals() {
        let src = r#"{ a := "}"; b := '}'; c := `}` }"#;
        let sc = Scanner::new(src);
        assert_eq!(sc.skip_balanced(0).unwrap(), src.len());
    }

    #[test]
    fn balanced_group_reports_unclosed() {
        let sc = Scanner::new("{ (");
        assert!(sc.skip_balanced(0).is_err());
    }

    #[test]
    fn line_member_keeps_trailing_comment() {
        let src = "Name string // display name\n}";
        let sc = Scanner::new(src);
        let end = sc.member_end(0, MemberStyle::Lines, Some(b'}')).unwrap();
        assert_eq!(&src[..end], "Name string // display name");
    }

    #[test]
    fn comma_member_spans_nested_calls() {
        let src = "validation.Field(&w.Name, validation.Required, validation.Length(1, 5)),\n\t)";
        let sc = Scanner::new(src);
        let end = sc.member_end(0, MemberStyle::Commas, Some(b')')).unwrap();
        assert!(src[..end].ends_with("5)),"));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let sc = Scanner::new("\"abc\n");
        assert!(sc.skip_string(0).is_err());
    }
}
