use super::format::Formatter;
use crate::model::Property;

/// One unit of generated source. Spacing and line breaks are decided by the
/// formatter, so builders only state what they emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Keyword(String),
    Name(String),
    Space,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Comma,
    Equal,
    Arrow,
    EndOfStatement,
    Newline,
    /// Text continuing the current line; later lines keep their relative indentation.
    Inline(String),
    /// Text placed on its own lines at the current depth.
    Block(String),
}

/// Accumulates tokens for a single edit.
#[derive(Debug, Clone, Default)]
pub struct TokenBuilder {
    tokens: Vec<Token>,
}

impl TokenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(&mut self, keyword: &str) -> &mut Self {
        self.tokens.push(Token::Keyword(keyword.to_string()));
        self
    }

    pub fn name(&mut self, name: impl AsRef<str>) -> &mut Self {
        let name = name.as_ref();
        if !name.is_empty() {
            self.tokens.push(Token::Name(name.to_string()));
        }
        self
    }

    /// Emits the source form of a property, or its placeholder when empty.
    pub fn expression(&mut self, property: &Property) -> &mut Self {
        self.name(property.to_source())
    }

    /// `<type> <name>`
    pub fn typed_binding(&mut self, type_name: &str, variable: &str) -> &mut Self {
        self.name(type_name).whitespace().name(variable)
    }

    pub fn whitespace(&mut self) -> &mut Self {
        self.tokens.push(Token::Space);
        self
    }

    pub fn open_brace(&mut self) -> &mut Self {
        self.tokens.push(Token::OpenBrace);
        self
    }

    pub fn close_brace(&mut self) -> &mut Self {
        self.tokens.push(Token::CloseBrace);
        self
    }

    pub fn open_paren(&mut self) -> &mut Self {
        self.tokens.push(Token::OpenParen);
        self
    }

    pub fn close_paren(&mut self) -> &mut Self {
        self.tokens.push(Token::CloseParen);
        self
    }

    pub fn comma(&mut self) -> &mut Self {
        self.tokens.push(Token::Comma);
        self
    }

    pub fn equal(&mut self) -> &mut Self {
        self.tokens.push(Token::Equal);
        self
    }

    pub fn right_double_arrow(&mut self) -> &mut Self {
        self.tokens.push(Token::Arrow);
        self
    }

    pub fn end_of_statement(&mut self) -> &mut Self {
        self.tokens.push(Token::EndOfStatement);
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.tokens.push(Token::Newline);
        self
    }

    pub fn inline(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.tokens.push(Token::Inline(text));
        }
        self
    }

    pub fn block(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.tokens.push(Token::Block(text));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Formats the tokens gathered so far and resets the builder.
    pub fn take(&mut self, indent_width: usize) -> String {
        let tokens = std::mem::take(&mut self.tokens);
        Formatter::new(indent_width).format(&tokens)
    }
}
