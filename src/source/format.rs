use super::token::Token;

/// Lays tokens out as source text: single spaces between words, one statement per
/// line, and block bodies indented one level deeper than their braces.
pub(crate) struct Formatter {
    indent_width: usize,
    lines: Vec<String>,
    line: String,
    depth: usize,
    pad_next: bool,
}

impl Formatter {
    pub(crate) fn new(indent_width: usize) -> Self {
        Self {
            indent_width,
            lines: Vec::new(),
            line: String::new(),
            depth: 0,
            pad_next: false,
        }
    }

    pub(crate) fn format(mut self, tokens: &[Token]) -> String {
        for token in tokens {
            match token {
                Token::Keyword(keyword) => {
                    self.space_if_needed();
                    self.line.push_str(keyword);
                    self.pad_next = true;
                }
                Token::Name(name) if name.contains('\n') => self.inline(name),
                Token::Name(name) => {
                    if self.pad_next {
                        self.space_if_needed();
                    }
                    self.line.push_str(name);
                    self.pad_next = false;
                }
                Token::Space => {
                    if !self.line.is_empty() && !self.line.ends_with(' ') {
                        self.line.push(' ');
                    }
                    self.pad_next = false;
                }
                Token::OpenParen => {
                    if self.pad_next {
                        self.space_if_needed();
                    }
                    self.line.push('(');
                    self.pad_next = false;
                }
                Token::CloseParen => {
                    self.trim_line();
                    self.line.push(')');
                    self.pad_next = true;
                }
                Token::Comma => {
                    self.trim_line();
                    self.line.push_str(", ");
                    self.pad_next = false;
                }
                Token::Equal => {
                    self.trim_line();
                    self.line.push_str(" = ");
                    self.pad_next = false;
                }
                Token::Arrow => {
                    self.trim_line();
                    self.line.push_str(" => ");
                    self.pad_next = false;
                }
                Token::OpenBrace => {
                    self.trim_line();
                    if !self.line.is_empty() {
                        self.line.push(' ');
                    }
                    self.line.push('{');
                    self.flush();
                    self.depth += 1;
                    self.pad_next = false;
                }
                Token::CloseBrace => {
                    self.flush();
                    self.depth = self.depth.saturating_sub(1);
                    self.line.push('}');
                    self.pad_next = true;
                }
                Token::EndOfStatement => {
                    self.trim_line();
                    self.line.push(';');
                    self.flush();
                    self.pad_next = false;
                }
                Token::Newline => {
                    self.flush();
                    self.pad_next = false;
                }
                Token::Inline(text) => self.inline(text),
                Token::Block(text) => {
                    self.flush();
                    for line in text.lines() {
                        self.line.push_str(line);
                        self.flush();
                    }
                    self.pad_next = false;
                }
            }
        }
        self.flush();
        self.lines.join("\n")
    }

    fn inline(&mut self, text: &str) {
        let mut parts = text.lines();
        if let Some(first) = parts.next() {
            self.space_if_needed();
            self.line.push_str(first.trim_start());
        }
        for part in parts {
            self.flush();
            self.line.push_str(part);
        }
        self.pad_next = true;
    }

    fn space_if_needed(&mut self) {
        if !self.line.is_empty() && !self.line.ends_with(|c: char| matches!(c, ' ' | '(' | '[')) {
            self.line.push(' ');
        }
    }

    fn trim_line(&mut self) {
        let trimmed = self.line.trim_end().len();
        self.line.truncate(trimmed);
    }

    fn flush(&mut self) {
        self.trim_line();
        if !self.line.trim().is_empty() {
            let indent = " ".repeat(self.depth * self.indent_width);
            self.lines.push(format!("{}{}", indent, self.line));
        }
        self.line.clear();
    }
}
