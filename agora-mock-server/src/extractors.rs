use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{self, request},
};

use crate::error::Error;

/// Bearer token of the request, not yet checked against any session
pub struct Bearer(pub String);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for Bearer {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<Bearer, Error> {
        let auth = req
            .headers
            .get(http::header::AUTHORIZATION)
            .ok_or_else(Error::permission_denied)?
            .to_str()
            .map_err(|_| Error::permission_denied())?;
        let mut auth = auth.split(' ');
        if !auth
            .next()
            .ok_or_else(Error::permission_denied)?
            .eq_ignore_ascii_case("bearer")
        {
            return Err(Error::permission_denied());
        }
        let token = auth.next().ok_or_else(Error::permission_denied)?;
        if auth.next().is_some() || token.is_empty() {
            return Err(Error::permission_denied());
        }
        Ok(Bearer(String::from(token)))
    }
}
