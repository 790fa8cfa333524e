use validator::validate_email;

use crate::domain::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadEmail(String);

impl LeadEmail {
    /// Accepts addresses shaped like `local@domain.tld`. No network
    /// verification is attempted.
    pub fn parse(s: String) -> Result<LeadEmail, ValidationError> {
        // `validate_email` allows dotless domains ("user@localhost"), which
        // the webhook does not accept.
        let has_dotted_domain = s
            .rsplit_once('@')
            .map_or(false, |(_, domain)| domain.contains('.'));
        if validate_email(&s) && has_dotted_domain {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidEmail)
        }
    }
}

impl AsRef<str> for LeadEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LeadEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
