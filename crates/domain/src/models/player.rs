//! Player domain model.

use serde::{Deserialize, Serialize};

/// A person on one or more team rosters.
///
/// `email` and `phone` are unique across players. The phone is stored as a
/// 10-digit number without country code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<i64>,
}

impl Player {
    /// E.164 address for SMS delivery, if the player has a phone number.
    pub fn sms_address(&self) -> Option<String> {
        self.phone.map(shared::phone::to_e164)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_address() {
        let mut player = Player {
            id: 1,
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: Some(5035550100),
        };
        assert_eq!(player.sms_address().as_deref(), Some("+15035550100"));

        player.phone = None;
        assert!(player.sms_address().is_none());
    }

    #[test]
    fn test_serialization_camel_case() {
        let player = Player {
            id: 7,
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            phone: None,
        };
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json["phone"].is_null());
    }
}
