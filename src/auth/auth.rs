use crate::config::Config;
use crate::model::role::{Actor, Role};
use crate::models::Claims;
use crate::auth::jwt::verify_token;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorForbidden,
    error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub role: Role,

    /// Present only if this account is linked to a worker record
    pub worker_id: Option<u64>,
    pub manager_id: Option<u64>,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Result<Self, &'static str> {
        let role = Role::from_id(claims.role).ok_or("Invalid role")?;
        Ok(AuthUser {
            email: claims.sub,
            role,
            worker_id: claims.worker_id,
            manager_id: claims.manager_id,
        })
    }

    /// The workflow actor for this account.
    pub fn actor(&self) -> actix_web::Result<Actor> {
        match self.role {
            Role::Worker => self
                .worker_id
                .map(Actor::worker)
                .ok_or_else(|| ErrorForbidden("Account is not linked to a worker record")),
            Role::Manager => self
                .manager_id
                .map(Actor::manager)
                .ok_or_else(|| ErrorForbidden("Account is not linked to a manager record")),
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Already verified by the middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        ready(AuthUser::from_claims(claims).map_err(ErrorUnauthorized))
    }
}
