use super::{read_utf, write_utf, Element, ElementKind, TextCursor};
use crate::error::Result;
use crate::patch::Patch;
use crate::serialization::PatchInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::io::{self, Read, Write};
use tracing::warn;

const NEWLINE: &str = "\n";
const COMMENT_END: &str = "*/";

// Alternatives are tried in order at each position, so earlier ones win.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<line_comment>//.*)",
        r"|(?P<block_comment>/\*)",
        r#"|(?P<string>".*?")"#,
        r"|(?P<char>'.+?')",
        r"|(?P<word>[A-Za-z0-9_$]+)",
        r"|(?P<operator>==|&&|\|\||>>>?|<<|\+=|-=|\*=|/=|%=|&=|\|=|\^=|>>>?=|<<=|->|::|!=|<=|>=|\+\+|--)",
        r"|(?P<single>[^A-Za-z0-9_\s])",
        r"|(?P<space>\s+)",
    ))
    .expect("token pattern is valid")
});

/// Lexical category of a [`Token`], derived from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Newline,
    Whitespace,
    Word,
    Operator,
    Punctuation,
    StringLiteral,
    CharLiteral,
    LineComment,
    BlockComment,
}

/// One lexical unit of source code. Two tokens are equal when their text is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    value: String,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Token {
            value: value.into(),
        }
    }

    pub fn newline() -> Self {
        Token::new(NEWLINE)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_newline(&self) -> bool {
        self.value == NEWLINE
    }

    pub fn is_whitespace(&self) -> bool {
        !self.value.is_empty() && self.value.chars().all(char::is_whitespace)
    }

    pub fn category(&self) -> TokenCategory {
        let v = self.value.as_str();
        if self.is_newline() {
            TokenCategory::Newline
        } else if v.starts_with("//") {
            TokenCategory::LineComment
        } else if v.starts_with("/*") {
            TokenCategory::BlockComment
        } else if v.starts_with('"') && v.len() > 1 {
            TokenCategory::StringLiteral
        } else if v.starts_with('\'') && v.len() > 1 {
            TokenCategory::CharLiteral
        } else if self.is_whitespace() {
            TokenCategory::Whitespace
        } else if !v.is_empty()
            && v.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        {
            TokenCategory::Word
        } else if v.chars().count() == 1 {
            TokenCategory::Punctuation
        } else {
            TokenCategory::Operator
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category() {
            TokenCategory::Newline => write!(f, "<newline>"),
            TokenCategory::Whitespace => write!(f, "<whitespace> {:?}", self.value),
            _ => write!(f, "<token> {}", self.value),
        }
    }
}

/// Whether the byte at `index` is escaped: it is when an odd number of
/// backslashes directly precede it.
fn is_escaped(text: &str, index: usize) -> bool {
    text.as_bytes()[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

/// Splits source text into tokens, one physical line at a time.
///
/// Block comments may span lines; an open comment is carried between calls
/// to [`Lexer::feed_line`] and ends up as a single token holding the
/// embedded line breaks. Every line that does not end inside a comment is
/// followed by a newline token.
pub struct Lexer {
    tokens: Vec<Token>,
    pending_comment: Option<String>,
    limit: usize,
}

impl Lexer {
    /// A lexer that stops after `limit` tokens, though a block comment that
    /// is already open is always finished.
    pub fn new(limit: usize) -> Self {
        Lexer {
            tokens: vec![],
            pending_comment: None,
            limit,
        }
    }

    fn is_full(&self) -> bool {
        self.tokens.len() >= self.limit
    }

    /// Whether another line should be fed.
    pub fn wants_line(&self) -> bool {
        !self.is_full() || self.pending_comment.is_some()
    }

    pub fn feed_line(&mut self, line: &str) {
        let mut pos = 0;

        if let Some(mut comment) = self.pending_comment.take() {
            match line.find(COMMENT_END) {
                Some(at) => {
                    pos = at + COMMENT_END.len();
                    comment.push_str(&line[..pos]);
                    self.tokens.push(Token::new(comment));
                    if self.is_full() {
                        return;
                    }
                }
                None => {
                    comment.push_str(line);
                    comment.push('\n');
                    self.pending_comment = Some(comment);
                    return;
                }
            }
        }

        while !self.is_full() && pos < line.len() {
            let Some(caps) = TOKEN_PATTERN.captures_at(line, pos) else {
                break;
            };
            let Some(found) = caps.get(0) else {
                break;
            };
            let start = found.start();
            let mut end = found.end();

            if caps.name("string").is_some() || caps.name("char").is_some() {
                let quote = &line[start..start + 1];
                while is_escaped(line, end - 1) {
                    match line[end..].find(quote) {
                        Some(at) => end += at + 1,
                        None => {
                            warn!(line = line, "unterminated literal runs to end of line");
                            end = line.len();
                            break;
                        }
                    }
                }
            } else if caps.name("block_comment").is_some() {
                match line[end..].find(COMMENT_END) {
                    Some(at) => end += at + COMMENT_END.len(),
                    None => {
                        let mut comment = line[start..].to_string();
                        comment.push('\n');
                        self.pending_comment = Some(comment);
                        return;
                    }
                }
            }

            self.tokens.push(Token::new(&line[start..end]));
            pos = end;
        }

        if !self.is_full() {
            self.tokens.push(Token::newline());
        }
    }

    /// Drops the line break a final blank line added to a block comment
    /// that is still open.
    fn drop_trailing_blank_line(&mut self) {
        if let Some(comment) = self.pending_comment.as_mut() {
            if comment.ends_with("\n\n") {
                comment.pop();
            }
        }
    }

    /// Returns the tokens read so far. A block comment still open at this
    /// point becomes a token of its own.
    pub fn finish(mut self) -> Vec<Token> {
        if let Some(comment) = self.pending_comment.take() {
            warn!("block comment is never closed");
            self.tokens.push(Token::new(comment));
        }
        self.tokens
    }
}

/// Tokenizes a whole source text.
///
/// ```
/// use seqpatch::element::{tokenize, Token};
///
/// let tokens = tokenize("a+=1;");
/// let values: Vec<_> = tokens.iter().map(Token::value).collect();
/// assert_eq!(values, ["a", "+=", "1", ";", "\n"]);
/// ```
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut cursor = TextCursor::new(source);
    lex(&mut cursor, usize::MAX).finish()
}

fn lex(cursor: &mut TextCursor<'_>, limit: usize) -> Lexer {
    let mut lexer = Lexer::new(limit);
    while lexer.wants_line() {
        match cursor.next_line() {
            Some(line) => lexer.feed_line(line),
            None => break,
        }
    }
    lexer
}

impl Element for Token {
    const KIND: ElementKind = ElementKind::Token;

    fn read_source<R: Read>(mut input: R) -> Result<Vec<Self>> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        Ok(tokenize(&text))
    }

    /// A comment left open runs to the end of the patch file, whose closing
    /// blank line is not part of it.
    fn read_patch_text(cursor: &mut TextCursor<'_>, count: usize) -> Result<Vec<Self>> {
        let mut lexer = lex(cursor, count);
        lexer.drop_trailing_blank_line();
        Ok(lexer.finish())
    }

    fn print_patch_text<W: Write>(elements: &[Self], out: &mut W) -> io::Result<()> {
        Self::write_work(elements, out)?;
        match elements.last() {
            Some(last) if !last.value().ends_with('\n') => writeln!(out),
            _ => Ok(()),
        }
    }

    fn write_work<W: Write>(elements: &[Self], out: &mut W) -> io::Result<()> {
        for token in elements {
            out.write_all(token.value().as_bytes())?;
        }
        Ok(())
    }

    fn serialize<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_utf(&self.value, out)
    }

    fn deserialize<R: Read>(input: &mut R) -> io::Result<Self> {
        read_utf(input).map(Token::new)
    }

    fn into_info(patch: Patch<Self>) -> PatchInfo {
        PatchInfo::Token(patch)
    }
}
