// Form and query handling
pub mod url_encoding;
pub mod query_string;

// Parsing utilities
pub mod parse_flag;

// Presentation helpers
pub mod status_formatter;

pub use url_encoding::{first_value, parse_urlencoded_body};
pub use query_string::build_query_string;
pub use parse_flag::parse_flag;
pub use status_formatter::status_class;
