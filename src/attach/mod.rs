pub mod discovery;
pub mod properties;
pub mod socket;

pub use discovery::{display_name_from_cmdline, list_java_processes};
pub use properties::parse_properties;
pub use socket::{AttachClient, encode_request};
