use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::users::repo_types::{calendar_date, Gender, KycStatus, User};

/// Body of `POST /create-user`. Every field is optional at the wire level so
/// that missing ones are reported as validation errors rather than parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "calendar_date::option")]
    pub dob: Option<Date>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub kyc_status: Option<KycStatus>,
    #[serde(default)]
    pub bank_details: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub photos: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
}

/// Body of `PUT /users/:user_id`. `user_id` and `createdOn` are not part of it,
/// so they are dropped if a client sends them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        with = "calendar_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub dob: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyc_status: Option<KycStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

impl UserPatch {
    /// Writes every present field onto `user`. Returns whether anything changed.
    pub fn apply_to(&self, user: &mut User) -> bool {
        let before = user.clone();
        if let Some(v) = &self.name {
            user.name = v.clone();
        }
        if let Some(v) = self.dob {
            user.dob = v;
        }
        if let Some(v) = self.gender {
            user.gender = v;
        }
        if let Some(v) = &self.mobile {
            user.mobile = v.clone();
        }
        if let Some(v) = &self.email {
            user.email = v.clone();
        }
        if let Some(v) = &self.city {
            user.city = v.clone();
        }
        if let Some(v) = &self.state {
            user.state = v.clone();
        }
        if let Some(v) = self.kyc_status {
            user.kyc_status = v;
        }
        if let Some(v) = &self.bank_details {
            user.bank_details = v.clone();
        }
        if let Some(v) = &self.photos {
            user.photos = Some(v.clone());
        }
        if let Some(v) = &self.product_type {
            user.product_type = v.clone();
        }
        *user != before
    }
}

/// Outcome of an update: counts only, never the document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn stored() -> User {
        User {
            user_id: "u-1".into(),
            name: "John Doe".into(),
            dob: date!(1990 - 01 - 01),
            gender: Gender::Male,
            mobile: "1234567890".into(),
            email: "johndoe@example.com".into(),
            city: "New York".into(),
            state: "NY".into(),
            kyc_status: KycStatus::Pending,
            bank_details: BTreeMap::new(),
            photos: None,
            product_type: "Product A".into(),
            created_on: datetime!(2024-06-01 12:00 UTC),
        }
    }

    #[test]
    fn new_user_parses_the_documented_example() {
        let body = r#"{
            "name": "John Doe", "dob": "1990-01-01", "gender": "Male",
            "mobile": "1234567890", "email": "johndoe@example.com",
            "city": "New York", "state": "NY", "kyc_status": "pending",
            "bank_details": {}, "photos": "https://example.com/photo.jpg",
            "product_type": "Product A"
        }"#;
        let new: NewUser = serde_json::from_str(body).expect("parse");
        assert_eq!(new.user_id, None);
        assert_eq!(new.dob, Some(date!(1990 - 01 - 01)));
        assert_eq!(new.gender, Some(Gender::Male));
        assert_eq!(new.kyc_status, Some(KycStatus::Pending));
        assert_eq!(new.bank_details, Some(BTreeMap::new()));
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(serde_json::from_str::<NewUser>(r#"{"gender":"male"}"#).is_err());
        assert!(serde_json::from_str::<NewUser>(r#"{"kyc_status":"Done"}"#).is_err());
        assert!(serde_json::from_str::<UserPatch>(r#"{"dob":"01/01/1990"}"#).is_err());
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = UserPatch {
            city: Some("Pune".into()),
            dob: Some(date!(2000 - 02 - 29)),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(value, serde_json::json!({ "city": "Pune", "dob": "2000-02-29" }));
    }

    #[test]
    fn patch_ignores_immutable_fields() {
        let patch: UserPatch =
            serde_json::from_str(r#"{"user_id":"other","createdOn":"2020-01-01T00:00:00Z"}"#)
                .expect("parse");
        let mut user = stored();
        assert!(!patch.apply_to(&mut user));
        assert_eq!(user, stored());
    }

    #[test]
    fn apply_reports_change_only_when_values_differ() {
        let mut user = stored();
        let same = UserPatch {
            city: Some("New York".into()),
            ..Default::default()
        };
        assert!(!same.apply_to(&mut user));

        let changed = UserPatch {
            kyc_status: Some(KycStatus::Done),
            photos: Some("https://example.com/p.png".into()),
            ..Default::default()
        };
        assert!(changed.apply_to(&mut user));
        assert_eq!(user.kyc_status, KycStatus::Done);
        assert_eq!(user.photos.as_deref(), Some("https://example.com/p.png"));
        assert_eq!(user.user_id, "u-1");
    }

    #[test]
    fn result_shapes_use_camel_case() {
        let upd = UpdateResult {
            acknowledged: true,
            matched_count: 1,
            modified_count: 0,
        };
        assert_eq!(
            serde_json::to_value(upd).expect("serialize"),
            serde_json::json!({ "acknowledged": true, "matchedCount": 1, "modifiedCount": 0 })
        );
        let del = DeleteResult {
            acknowledged: true,
            deleted_count: 0,
        };
        assert_eq!(
            serde_json::to_value(del).expect("serialize"),
            serde_json::json!({ "acknowledged": true, "deletedCount": 0 })
        );
    }

    #[test]
    fn user_serializes_created_on_and_omits_missing_photos() {
        let value = serde_json::to_value(stored()).expect("serialize");
        assert_eq!(value["createdOn"], "2024-06-01T12:00:00Z");
        assert_eq!(value["dob"], "1990-01-01");
        assert_eq!(value["kyc_status"], "pending");
        assert!(value.get("photos").is_none());
        let back: User = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, stored());
    }
}
