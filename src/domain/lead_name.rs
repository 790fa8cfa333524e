use crate::domain::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadName(String);

impl LeadName {
    /// Rejects inputs that are empty after trimming whitespace. The stored
    /// value keeps its original spelling.
    pub fn parse(s: String) -> Result<LeadName, ValidationError> {
        if s.trim().is_empty() {
            Err(ValidationError::EmptyField)
        } else {
            Ok(Self(s))
        }
    }
}

impl AsRef<str> for LeadName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
