use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path id. Entities are keyed by UUID, so anything else is a
/// client error rather than a lookup miss.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim())
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a valid id", id.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_and_simple_forms() {
        let id = Uuid::new_v4();
        assert_eq!(valid_uuid(&id.to_string()).unwrap(), id);
        assert_eq!(valid_uuid(&id.simple().to_string()).unwrap(), id);
    }

    #[test]
    fn rejects_other_ids() {
        assert!(matches!(valid_uuid("project-1"), Err(AppError::InvalidInput(_))));
        assert!(matches!(valid_uuid(""), Err(AppError::InvalidInput(_))));
    }
}
