//! Input validator.
//!
//! Decides whether the lines typed so far form a complete chunk. Tracks
//! open `{ ( [`, string and character literals, and block comments across
//! lines. It never rejects input: a closer that does not match the
//! innermost opener makes the chunk ready so the compiler reports it.

/// Whether buffered input can be submitted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValidationResult {
    Ready,
    /// More lines are needed; `indent` is the current nesting depth.
    NeedsMore { indent: usize },
}

/// Literal or comment left open at the end of a line.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Open {
    Code,
    Literal(char),
    BlockComment,
}

/// Line buffer with bracket and literal state.
#[derive(Clone, Debug)]
pub struct InputValidator {
    buffer: String,
    stack: Vec<char>,
    open: Open,
    continuation: bool,
    mismatched: bool,
}

impl Default for InputValidator {
    fn default() -> Self {
        InputValidator {
            buffer: String::new(),
            stack: Vec::new(),
            open: Open::Code,
            continuation: false,
            mismatched: false,
        }
    }
}

impl InputValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer `line` and report whether the chunk is complete.
    pub fn validate(&mut self, line: &str) -> ValidationResult {
        self.buffer.push_str(line);
        self.buffer.push('\n');
        self.scan(line);

        if self.mismatched {
            return ValidationResult::Ready;
        }
        if self.stack.is_empty() && self.open == Open::Code && !self.continuation {
            ValidationResult::Ready
        } else {
            ValidationResult::NeedsMore {
                indent: self.stack.len(),
            }
        }
    }

    fn scan(&mut self, line: &str) {
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match self.open {
                Open::BlockComment => {
                    if c == '*' && chars.next_if_eq(&'/').is_some() {
                        self.open = Open::Code;
                    }
                }
                Open::Literal(quote) => {
                    if c == '\\' {
                        chars.next();
                    } else if c == quote {
                        self.open = Open::Code;
                    }
                }
                Open::Code => match c {
                    '/' if chars.next_if_eq(&'/').is_some() => break,
                    '/' if chars.next_if_eq(&'*').is_some() => self.open = Open::BlockComment,
                    '"' | '\'' => self.open = Open::Literal(c),
                    '{' | '(' | '[' => self.stack.push(c),
                    '}' | ')' | ']' => {
                        if self.stack.last() == Some(&opener(c)) {
                            self.stack.pop();
                        } else {
                            self.mismatched = true;
                        }
                    }
                    _ => {}
                },
            }
        }
        self.continuation = line.ends_with('\\');
    }

    /// Take the buffered chunk and start over.
    pub fn take_input(&mut self) -> String {
        let mut input = std::mem::take(&mut self.buffer);
        if input.ends_with('\n') {
            input.pop();
        }
        self.reset();
        input
    }

    /// Drop buffered input (cancel).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current bracket nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// No input is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn opener(closer: char) -> char {
    match closer {
        '}' => '{',
        ')' => '(',
        _ => '[',
    }
}

#[cfg(test)]
mod tests;
