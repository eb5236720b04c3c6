use thiserror::Error;

/// A parameter that deserialized fine but is still unusable.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvalidParamsError {
    tool: &'static str,
    message: String,
    field: Option<&'static str>,
}

impl InvalidParamsError {
    pub fn new(tool: &'static str, message: impl Into<String>) -> Self {
        Self {
            tool,
            message: message.into(),
            field: None,
        }
    }

    pub fn at(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn describe(&self) -> String {
        match self.field {
            Some(field) => format!("invalid {} params at {field}: {}", self.tool, self.message),
            None => format!("invalid {} params: {}", self.tool, self.message),
        }
    }
}
