//! User entity backing the bundled `users` table binding.

use super::identity::UniquelyIdentified;
use serde::{Deserialize, Serialize};

/// One row of the `users` table.
///
/// Field names match column names so serialized users line up with rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

impl UniquelyIdentified for User {
    fn unique_key(&self) -> &str {
        &self.email
    }
}

#[cfg(test)]
mod tests {
    use super::User;
    use crate::model::identity::UniquelyIdentified;

    #[test]
    fn unique_key_is_the_email() {
        let user = User::new(7, "Ada", "Lovelace", "ada@example.com");
        assert_eq!(user.unique_key(), "ada@example.com");
    }

    #[test]
    fn serialized_field_names_match_columns() {
        let user = User::new(1, "Test", "Test", "test.test@test.com");
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["first_name"], "Test");
        assert_eq!(json["last_name"], "Test");
        assert_eq!(json["email"], "test.test@test.com");
    }
}
