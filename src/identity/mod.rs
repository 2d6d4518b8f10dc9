//! Azure AD sign-in and Microsoft Graph group membership.

pub mod azure_ad;

pub use azure_ad::{logout_url, AzureAdClient, TokenResponse};
