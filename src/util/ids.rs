use uuid::Uuid;

/// Allocate a fresh record identity.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// An identity is well-formed when it parses as a UUID.
pub fn is_valid_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}
