//! [`User`]-related definitions.

use axum::Json;
use axum_extra::extract::WithRejection;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{command, domain, query, Command as _, Query as _};
use uuid::Uuid;

use crate::{define_error, AsError, Context, Error};

/// A `User` of the system, as returned by the API.
///
/// Never carries any password material.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier of this `User`.
    pub id: Uuid,

    /// Name of this `User`.
    pub name: String,

    /// Email of this `User`.
    pub email: String,

    /// `DateTime` when this `User` was created, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        let domain::User {
            id,
            name,
            email,
            password_hash: _,
            created_at,
        } = user;
        Self {
            id: id.into(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: created_at.coerce::<()>().to_rfc3339(),
        }
    }
}

/// Response of the authentication endpoints.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Indicator whether the operation succeeded.
    pub success: bool,

    /// `User` the operation applies to.
    pub user: User,

    /// Access token of the created `Session`, if one was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// `DateTime` when the created `Session` expires, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl From<domain::User> for AuthResponse {
    fn from(user: domain::User) -> Self {
        Self {
            success: true,
            user: user.into(),
            token: None,
            expires_at: None,
        }
    }
}

impl From<command::create_user_session::Output> for AuthResponse {
    fn from(output: command::create_user_session::Output) -> Self {
        let command::create_user_session::Output {
            token,
            user,
            expires_at,
        } = output;
        Self {
            success: true,
            user: user.into(),
            token: Some(token.to_string()),
            expires_at: Some(expires_at.coerce::<()>().to_rfc3339()),
        }
    }
}

/// Body of the `POST /register` endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct RegisterRequest {
    /// Name of the `User` to register.
    pub name: Option<String>,

    /// Email of the `User` to register.
    pub email: Option<String>,

    /// Password of the `User` to register.
    pub password: Option<String>,
}

/// Handles the `POST /register` endpoint.
///
/// Creates a new `User` and issues a `Session` for it right away.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELDS`, `INVALID_NAME`, `INVALID_EMAIL`, `INVALID_PASSWORD` -
///   the provided input is not valid;
/// - `EMAIL_OCCUPIED` - the provided email is used by another `User`.
#[tracing::instrument(skip_all, fields(rest.name = "register"))]
pub async fn register(
    ctx: Context,
    body: WithRejection<Json<RegisterRequest>, Error>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let WithRejection(Json(body), _) = body;

    let (Some(name), Some(email), Some(password)) =
        (body.name, body.email, body.password)
    else {
        return Err(ValidationError::MissingFields.into());
    };
    let name = domain::user::Name::new(name).ok_or(ValidationError::Name)?;
    let email =
        domain::user::Email::new(email).ok_or(ValidationError::Email)?;
    let password = domain::user::Password::new(password)
        .ok_or(ValidationError::Password)?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            name,
            email,
            password: secrecy::SecretBox::init_with(move || password),
        })
        .await
        .map_err(AsError::into_error)?;
    let output = ctx
        .service()
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

/// Body of the `POST /login` endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    /// Email of the `User` to log in as.
    pub email: Option<String>,

    /// Password of the `User` to log in as.
    pub password: Option<String>,
}

/// Handles the `POST /login` endpoint.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELDS`, `INVALID_EMAIL` - the provided input is not valid;
/// - `WRONG_CREDENTIALS` - the provided credentials do not match any `User`.
#[tracing::instrument(skip_all, fields(rest.name = "login"))]
pub async fn login(
    ctx: Context,
    body: WithRejection<Json<LoginRequest>, Error>,
) -> Result<Json<AuthResponse>, Error> {
    let WithRejection(Json(body), _) = body;

    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ValidationError::MissingFields.into());
    };
    let email =
        domain::user::Email::new(email).ok_or(ValidationError::Email)?;
    // A password of invalid format cannot match any stored hash.
    let password = domain::user::Password::new(password)
        .ok_or(CredentialsError::WrongCredentials)?;

    let output = ctx
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: secrecy::SecretBox::init_with(move || password),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(output.into()))
}

/// Handles the `GET /me` endpoint.
///
/// Returns the currently authenticated `User`.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
/// - `USER_NOT_FOUND` - the authenticated `User` does not exist anymore.
#[tracing::instrument(skip_all, fields(rest.name = "me"))]
pub async fn me(ctx: Context) -> Result<Json<AuthResponse>, Error> {
    let my_id = ctx.current_session().await?.user_id;

    ctx.service()
        .execute(query::user::ById::by(my_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| UserError::NotExists.into())
        .map(|user| Json(user.into()))
}

/// Body of the `PUT /me/name` endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateNameRequest {
    /// New name of the `User`.
    pub name: Option<String>,
}

/// Handles the `PUT /me/name` endpoint.
///
/// Renames the currently authenticated `User`.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELDS`, `INVALID_NAME` - the provided input is not valid;
/// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
#[tracing::instrument(skip_all, fields(rest.name = "updateName"))]
pub async fn update_name(
    ctx: Context,
    body: WithRejection<Json<UpdateNameRequest>, Error>,
) -> Result<Json<AuthResponse>, Error> {
    let WithRejection(Json(body), _) = body;

    let Some(name) = body.name else {
        return Err(ValidationError::MissingFields.into());
    };
    let name = domain::user::Name::new(name).ok_or(ValidationError::Name)?;

    let my_id = ctx.current_session().await?.user_id;
    ctx.service()
        .execute(command::UpdateUserName {
            user_id: my_id,
            name,
        })
        .await
        .map_err(AsError::into_error)
        .map(|user| Json(user.into()))
}

/// Body of the `PUT /me/password` endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// Current password of the `User`.
    pub old_password: Option<String>,

    /// New password of the `User`.
    pub new_password: Option<String>,
}

/// Handles the `PUT /me/password` endpoint.
///
/// # Errors
///
/// Possible error codes:
/// - `MISSING_FIELDS`, `INVALID_PASSWORD` - the provided input is not valid;
/// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
/// - `WRONG_PASSWORD` - the provided old password does not match the current
///   one.
#[tracing::instrument(skip_all, fields(rest.name = "updatePassword"))]
pub async fn update_password(
    ctx: Context,
    body: WithRejection<Json<UpdatePasswordRequest>, Error>,
) -> Result<Json<AuthResponse>, Error> {
    let WithRejection(Json(body), _) = body;

    let (Some(old_password), Some(new_password)) =
        (body.old_password, body.new_password)
    else {
        return Err(ValidationError::MissingFields.into());
    };
    let new_password = domain::user::Password::new(new_password)
        .ok_or(ValidationError::Password)?;
    // The old password only needs to compare against the stored hash.
    let old_password = domain::user::Password::new(old_password)
        .ok_or(PasswordError::WrongPassword)?;

    let my_id = ctx.current_session().await?.user_id;
    ctx.service()
        .execute(command::UpdateUserPassword {
            user_id: my_id,
            new_password,
            old_password,
        })
        .await
        .map_err(AsError::into_error)
        .map(|user| Json(user.into()))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(CredentialsError::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::update_user_name::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::update_user_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PasswordHash(_) | Self::UserNotExists(_) => None,
            Self::WrongPassword => Some(PasswordError::WrongPassword.into()),
        }
    }
}

define_error! {
    enum ValidationError {
        #[code = "MISSING_FIELDS"]
        #[status = BAD_REQUEST]
        #[message = "Required fields are missing"]
        MissingFields,

        #[code = "INVALID_NAME"]
        #[status = BAD_REQUEST]
        #[message = "Invalid `UserName` format"]
        Name,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Invalid `UserEmail` format"]
        Email,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "`UserPassword` must be between 6 and 128 characters \
                     long"]
        Password,
    }
}

define_error! {
    enum CredentialsError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Provided credentials do not match any `User`"]
        WrongCredentials,
    }
}

define_error! {
    enum PasswordError {
        #[code = "WRONG_PASSWORD"]
        #[status = UNAUTHORIZED]
        #[message = "Provided old password does not match the current `User` \
                     password"]
        WrongPassword,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        NotExists,
    }
}
