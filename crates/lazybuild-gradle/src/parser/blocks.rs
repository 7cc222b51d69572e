//! Structural scanner for Gradle scripts.
//!
//! Splits a script into a tree of `header { body }` blocks and, for each
//! block, the statements that belong to it directly. Braces and statement
//! separators inside strings and comments are ignored, so a `{` in
//! `"${version}"` or a `;` in a comment never changes the structure.

use crate::error::{GradleError, Result};

/// One statement of a block, with comments removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub code: String,
    /// Byte offset of the first character of `code`.
    pub start: usize,
    /// Byte offset just past the last character of `code`.
    pub end: usize,
    /// Trailing `// comment` on the statement's last line.
    pub comment: Option<String>,
}

/// A `header { ... }` block.
///
/// The header of a child block is also recorded as a statement of its
/// parent, so `implementation("a:b:1") { exclude(..) }` is still seen as a
/// dependency declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub header: String,
    pub start: usize,
    pub statements: Vec<Statement>,
    pub children: Vec<Block>,
}

impl Block {
    /// Children whose header is exactly `header`.
    pub fn named<'s>(&'s self, header: &'s str) -> impl Iterator<Item = &'s Block> + 's {
        self.children.iter().filter(move |b| b.header == header)
    }

    pub fn child(&self, header: &str) -> Option<&Block> {
        self.children.iter().find(|b| b.header == header)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str { quote: char, triple: bool },
}

#[derive(Default)]
struct Pending {
    buf: String,
    start: Option<usize>,
    end: usize,
    comment: Option<String>,
}

impl Pending {
    fn push(&mut self, pos: usize, c: char) {
        if self.start.is_none() {
            if c.is_whitespace() {
                return;
            }
            self.start = Some(pos);
        }
        self.buf.push(c);
        if !c.is_whitespace() {
            self.end = pos + c.len_utf8();
        }
    }

    fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    fn take(&mut self) -> Option<Statement> {
        let pending = std::mem::take(self);
        let start = pending.start?;
        Some(Statement {
            code: pending.buf.trim().to_string(),
            start,
            end: pending.end,
            comment: pending.comment,
        })
    }
}

struct Frame {
    block: Block,
    brace: usize,
    parens: usize,
}

impl Frame {
    fn new(header: String, start: usize, brace: usize) -> Self {
        Self {
            block: Block {
                header,
                start,
                ..Block::default()
            },
            brace,
            parens: 0,
        }
    }
}

/// 1-based line number of byte `offset`.
pub fn line_of(content: &str, offset: usize) -> usize {
    content.as_bytes()[..offset.min(content.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// Scans `content` into its block tree. The returned root has an empty
/// header and holds the top-level statements.
///
/// # Errors
///
/// Returns an error on unbalanced braces and unterminated strings or
/// block comments.
pub fn scan(content: &str) -> Result<Block> {
    let chars: Vec<(usize, char)> = content.char_indices().collect();
    let at = |i: usize| chars.get(i).map(|(_, c)| *c);

    let mut stack = vec![Frame::new(String::new(), 0, 0)];
    let mut pending = Pending::default();
    let mut state = State::Code;
    let mut state_start = 0;
    let mut comment_start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        match state {
            State::Code => match c {
                '/' if at(i + 1) == Some('/') => {
                    state = State::LineComment;
                    comment_start = pos + 2;
                    i += 2;
                    continue;
                }
                '/' if at(i + 1) == Some('*') => {
                    state = State::BlockComment;
                    state_start = pos;
                    i += 2;
                    continue;
                }
                '"' | '\'' | '`' => {
                    let triple = c != '`' && at(i + 1) == Some(c) && at(i + 2) == Some(c);
                    let width = if triple { 3 } else { 1 };
                    for k in 0..width {
                        pending.push(chars[i + k].0, c);
                    }
                    state = State::Str { quote: c, triple };
                    state_start = pos;
                    i += width;
                    continue;
                }
                '(' | '[' => {
                    if let Some(top) = stack.last_mut() {
                        top.parens += 1;
                    }
                    pending.push(pos, c);
                }
                ')' | ']' => {
                    if let Some(top) = stack.last_mut() {
                        top.parens = top.parens.saturating_sub(1);
                    }
                    pending.push(pos, c);
                }
                '\n' | ';' if stack.last().is_some_and(|f| f.parens == 0) => {
                    finish(&mut stack, &mut pending);
                }
                '{' => {
                    let header = pending.take();
                    let (text, start) = header
                        .as_ref()
                        .map_or((String::new(), pos), |s| (s.code.clone(), s.start));
                    if let (Some(statement), Some(top)) = (header, stack.last_mut()) {
                        top.block.statements.push(statement);
                    }
                    stack.push(Frame::new(text, start, pos));
                }
                '}' => {
                    finish(&mut stack, &mut pending);
                    if stack.len() == 1 {
                        return Err(GradleError::UnbalancedBrace {
                            brace: '}',
                            line: line_of(content, pos),
                        });
                    }
                    if let Some(frame) = stack.pop()
                        && let Some(parent) = stack.last_mut()
                    {
                        parent.block.children.push(frame.block);
                    }
                }
                _ => pending.push(pos, c),
            },
            State::LineComment => {
                if c == '\n' {
                    set_comment(&mut pending, &content[comment_start..pos]);
                    state = State::Code;
                    // the newline still terminates the statement
                    continue;
                }
            }
            State::BlockComment => {
                if c == '*' && at(i + 1) == Some('/') {
                    state = State::Code;
                    if !pending.is_empty() {
                        pending.push(pos, ' ');
                    }
                    i += 2;
                    continue;
                }
            }
            State::Str { quote, triple } => {
                if c == '\n' && !triple && quote != '`' {
                    return Err(GradleError::Unterminated {
                        what: "string",
                        line: line_of(content, state_start),
                    });
                }
                pending.push(pos, c);
                if c == '\\' && !triple && quote != '`' {
                    if let Some((next_pos, next)) = chars.get(i + 1).copied() {
                        pending.push(next_pos, next);
                    }
                    i += 2;
                    continue;
                }
                if c == quote {
                    if !triple {
                        state = State::Code;
                    } else if at(i + 1) == Some(quote) && at(i + 2) == Some(quote) {
                        pending.push(chars[i + 1].0, quote);
                        pending.push(chars[i + 2].0, quote);
                        state = State::Code;
                        i += 3;
                        continue;
                    }
                }
            }
        }
        i += 1;
    }

    match state {
        State::LineComment => set_comment(&mut pending, &content[comment_start..]),
        State::BlockComment => {
            return Err(GradleError::Unterminated {
                what: "block comment",
                line: line_of(content, state_start),
            });
        }
        State::Str { .. } => {
            return Err(GradleError::Unterminated {
                what: "string",
                line: line_of(content, state_start),
            });
        }
        State::Code => {}
    }
    finish(&mut stack, &mut pending);

    if stack.len() > 1 {
        let brace = stack.last().map_or(0, |f| f.brace);
        return Err(GradleError::UnbalancedBrace {
            brace: '{',
            line: line_of(content, brace),
        });
    }
    Ok(stack.pop().map(|f| f.block).unwrap_or_default())
}

fn finish(stack: &mut [Frame], pending: &mut Pending) {
    if let Some(statement) = pending.take()
        && let Some(top) = stack.last_mut()
    {
        top.block.statements.push(statement);
    }
}

fn set_comment(pending: &mut Pending, text: &str) {
    let text = text.trim();
    if !pending.is_empty() && !text.is_empty() {
        pending.comment = Some(text.to_string());
    }
}
