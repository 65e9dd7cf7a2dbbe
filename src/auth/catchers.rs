//! Catchers that turn guard short-circuits into the fixed JSON bodies the
//! wire contract promises. Rocket guard failures carry a status but no body,
//! so the failing guard's error is read back out of the request-local cache.

use rocket::Request;
use rocket::serde::json::Json;

use crate::auth::AuthError;
use crate::auth::guards::DecodedToken;
use crate::auth::responses::ErrorBody;

#[catch(401)]
pub fn unauthorized(request: &Request<'_>) -> Json<ErrorBody> {
    let DecodedToken(decoded) =
        request.local_cache(|| DecodedToken(Err(AuthError::TokenMissing)));
    let message = match decoded {
        Err(err) => err.client_message(),
        Ok(_) => AuthError::InvalidCredentials.client_message(),
    };
    Json(ErrorBody { message })
}

#[catch(403)]
pub fn forbidden(_request: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody {
        message: AuthError::Forbidden.client_message(),
    })
}
