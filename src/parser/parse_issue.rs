use std::fmt::Display;

/// A fragment the converter could not turn into conditions.
///
/// Issues never escape the conversion pipeline; the driver logs them and
/// moves on, which is what keeps [`crate::SqlConverter::convert`] total.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    pub message: String,
    pub fragment: String,
}

impl ParseIssue {
    pub fn new(message: &str, fragment: &str) -> Self {
        Self {
            message: message.to_string(),
            fragment: fragment.to_string(),
        }
    }

    pub fn err<T>(self) -> Result<T, ParseIssue> {
        Err(self)
    }
}

impl Display for ParseIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParseIssue: {} -> '{}'", self.message, self.fragment)
    }
}
