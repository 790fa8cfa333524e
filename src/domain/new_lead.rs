use crate::controller::LeadDraft;

use super::{LeadEmail, LeadName, LeadType, ValidationError};

/// A lead that has passed validation. The submission client only accepts
/// this type, so an unvalidated draft can never reach the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub email: LeadEmail,
    pub name: LeadName,
    pub lead_type: LeadType,
}

impl TryFrom<LeadDraft> for NewLead {
    type Error = Vec<ValidationError>;

    /// Collects every violated rule so the caller can surface all of them
    /// in one pass.
    fn try_from(draft: LeadDraft) -> Result<Self, Self::Error> {
        let name = LeadName::parse(draft.name);
        let email = LeadEmail::parse(draft.email);
        let lead_type = LeadType::from(draft.lead_type);

        match (name, email) {
            (Ok(name), Ok(email)) => Ok(Self {
                email,
                name,
                lead_type,
            }),
            (name, email) => Err(name.err().into_iter().chain(email.err()).collect()),
        }
    }
}
