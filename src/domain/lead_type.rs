/// Free-form description of the lead category. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadType(String);

impl From<String> for LeadType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for LeadType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
