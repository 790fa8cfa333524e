mod lead_email;
mod lead_name;
mod lead_type;
mod new_lead;

pub use lead_email::LeadEmail;
pub use lead_name::LeadName;
pub use lead_type::LeadType;
pub use new_lead::NewLead;

/// User-correctable problems with a lead draft, surfaced inline by the UI
/// layer.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyField,
    #[error("email must look like local@domain.tld")]
    InvalidEmail,
}
