use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, RegisteredUser, TokenResponse},
        jwt::JwtKeys,
        password,
        repo::User,
    },
    error::ApiError,
};

// Unknown email and wrong password are deliberately indistinguishable.
const WRONG_CREDENTIALS: &str = "Wrong credentials, please check your email and password again";

pub async fn register(db: &PgPool, mut input: RegisterRequest) -> Result<RegisteredUser, ApiError> {
    input.validate()?;

    if User::find_by_email(db, &input.email).await?.is_some() {
        warn!(email = %input.email, "registration with a taken email");
        return Err(ApiError::conflict("A user already exists with this email"));
    }

    let hash = password::hash(&input.password).map_err(|e| ApiError::internal(e.to_string()))?;
    let user = User::create(db, &input.name, &input.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(RegisteredUser {
        id: user.id,
        name: user.name,
    })
}

pub async fn login(
    db: &PgPool,
    keys: &JwtKeys,
    mut input: LoginRequest,
) -> Result<TokenResponse, ApiError> {
    input.validate()?;

    let Some(user) = User::find_by_email(db, &input.email).await? else {
        warn!(email = %input.email, "login with an unknown email");
        return Err(ApiError::not_found(WRONG_CREDENTIALS));
    };

    let ok = password::verify(&input.password, &user.password_hash)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !ok {
        warn!(user_id = %user.id, "login with a wrong password");
        return Err(ApiError::not_found(WRONG_CREDENTIALS));
    }

    let token = keys.sign(user.id).map_err(|e| ApiError::internal(e.to_string()))?;
    info!(user_id = %user.id, "user logged in");
    Ok(TokenResponse { token })
}
