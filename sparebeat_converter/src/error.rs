use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertErrorKind {
    Input,
    Render,
}

impl ConvertErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            // Input
            "E1001" | "E1002" => Self::Input,

            // Render
            "E2001" => Self::Render,

            _ => Self::Input,
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct ConvertError {
    pub code: &'static str,
    pub kind: ConvertErrorKind,
    pub message: String,

    pub line: Option<usize>,
    pub context: Option<String>,
}

impl ConvertError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: ConvertErrorKind::from_code(code),
            message: message.into(),

            line: None,
            context: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
