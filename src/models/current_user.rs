use serde::{Deserialize, Serialize};

/// The signed-in operator, as shown in the page header.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurrentUser {
    pub display_name: String,
}
