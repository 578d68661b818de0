use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::AppError,
    users::{
        dto::{DeleteResult, NewUser, UpdateResult, UserPatch},
        repo::UserStore,
        repo_types::User,
        validation::FieldErrors,
    },
};

/// Validates a create body and turns it into a full record. An absent or empty
/// `user_id` is replaced with a fresh v4 UUID.
pub fn build_user(new: NewUser, now: OffsetDateTime) -> Result<User, AppError> {
    let user_id = new
        .user_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut errs = FieldErrors::new();
    let name = errs.require_text("name", new.name);
    let dob = errs.require("dob", new.dob);
    let gender = errs.require("gender", new.gender);
    let mobile = errs.require_text("mobile", new.mobile);
    errs.mobile(mobile.as_deref());
    let email = errs.require_text("email", new.email);
    errs.email(email.as_deref());
    let city = errs.require_text("city", new.city);
    let state = errs.require_text("state", new.state);
    let kyc_status = errs.require("kyc_status", new.kyc_status);
    let bank_details = errs.require("bank_details", new.bank_details);
    let product_type = errs.require_text("product_type", new.product_type);
    errs.finish()?;

    match (
        name, dob, gender, mobile, email, city, state, kyc_status, bank_details, product_type,
    ) {
        (
            Some(name),
            Some(dob),
            Some(gender),
            Some(mobile),
            Some(email),
            Some(city),
            Some(state),
            Some(kyc_status),
            Some(bank_details),
            Some(product_type),
        ) => Ok(User {
            user_id,
            name,
            dob,
            gender,
            mobile,
            email,
            city,
            state,
            kyc_status,
            bank_details,
            photos: new.photos,
            product_type,
            created_on: now,
        }),
        _ => Err(AppError::Validation("User validation failed".into())),
    }
}

/// Every present field must still satisfy its constraint after the merge.
pub fn validate_patch(patch: &UserPatch) -> Result<(), AppError> {
    let mut errs = FieldErrors::new();
    errs.non_empty("name", patch.name.as_deref());
    errs.non_empty("mobile", patch.mobile.as_deref());
    errs.mobile(patch.mobile.as_deref());
    errs.non_empty("email", patch.email.as_deref());
    errs.email(patch.email.as_deref());
    errs.non_empty("city", patch.city.as_deref());
    errs.non_empty("state", patch.state.as_deref());
    errs.non_empty("product_type", patch.product_type.as_deref());
    errs.finish()
}

pub async fn create_user(store: &dyn UserStore, new: NewUser) -> Result<User, AppError> {
    let user = build_user(new, OffsetDateTime::now_utc())?;
    debug!(user_id = %user.user_id, "inserting user");
    Ok(store.insert(user).await?)
}

pub async fn list_users(store: &dyn UserStore) -> Result<Vec<User>, AppError> {
    Ok(store.list().await?)
}

pub async fn find_users_by_id(store: &dyn UserStore, user_id: &str) -> Result<Vec<User>, AppError> {
    Ok(store.find_by_user_id(user_id).await?)
}

pub async fn update_user(
    store: &dyn UserStore,
    user_id: &str,
    patch: UserPatch,
) -> Result<UpdateResult, AppError> {
    validate_patch(&patch)?;
    Ok(store.update_by_user_id(user_id, &patch).await?)
}

pub async fn delete_user(store: &dyn UserStore, user_id: &str) -> Result<DeleteResult, AppError> {
    Ok(store.delete_by_user_id(user_id).await?)
}
