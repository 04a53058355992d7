// cashbak/storefront/src/web/extractors.rs

use crate::errors::AppError;
use actix_web::{FromRequest, HttpRequest};
use tracing::warn;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// Caller identity, taken from the `X-User-ID` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let parsed = req
      .headers()
      .get(USER_ID_HEADER)
      .and_then(|value| value.to_str().ok())
      .and_then(|raw| Uuid::parse_str(raw.trim()).ok());

    match parsed {
      Some(user_id) => futures_util::future::ready(Ok(AuthenticatedUser { user_id })),
      None => {
        warn!("AuthenticatedUser extractor: Missing or invalid X-User-ID header.");
        futures_util::future::ready(Err(AppError::Auth(
          "User identification required. Missing or invalid X-User-ID header.".to_string(),
        )))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[actix_web::test]
  async fn reads_user_from_header() {
    let user_id = Uuid::new_v4();
    let req = TestRequest::default()
      .insert_header((USER_ID_HEADER, user_id.to_string()))
      .to_http_request();
    let user = AuthenticatedUser::extract(&req).await.unwrap();
    assert_eq!(user.user_id, user_id);
  }

  #[actix_web::test]
  async fn rejects_missing_or_malformed_header() {
    let req = TestRequest::default().to_http_request();
    assert!(matches!(AuthenticatedUser::extract(&req).await, Err(AppError::Auth(_))));

    let req = TestRequest::default().insert_header((USER_ID_HEADER, "nobody")).to_http_request();
    assert!(matches!(AuthenticatedUser::extract(&req).await, Err(AppError::Auth(_))));
  }
}
