use serde::{Deserialize, Serialize};

/// Identity payload pushed by the session provider on sign-in.
///
/// Taken as given: the subject is the provider's stable user reference and
/// the optional fields mirror whatever the provider currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub subject_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub image_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_uses_camel_case_wire_names() {
        let identity = SessionIdentity {
            subject_id: "user_1".into(),
            display_name: Some("Rabin".into()),
            email: None,
            image_ref: None,
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["subjectId"], "user_1");
        assert_eq!(json["displayName"], "Rabin");
        assert!(json["imageRef"].is_null());
    }
}
