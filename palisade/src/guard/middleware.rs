// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header;
use actix_web::{Error, HttpMessage, HttpResponse};

use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use super::decision::decide;
use crate::config::GuardConfig;

/// Auth redirect middleware factory.
///
/// Reads the configured access-token cookie to classify the request as
/// authenticated or not, then applies the guard decision: 307 redirect or
/// pass-through. The cookie value itself is never inspected beyond presence;
/// token verification belongs to the handlers behind the guard.
pub struct AuthRedirects {
    config: Arc<GuardConfig>,
}

impl AuthRedirects {
    pub fn new(config: Arc<GuardConfig>) -> Self {
        AuthRedirects { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthRedirects
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthRedirectsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthRedirectsMiddleware {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct AuthRedirectsMiddleware<S> {
    service: Rc<S>,
    config: Arc<GuardConfig>,
}

impl<S, B> Service<ServiceRequest> for AuthRedirectsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            // An empty cookie value counts as unauthenticated.
            let authenticated = req
                .cookie(&config.cookie_name)
                .map(|cookie| !cookie.value().is_empty())
                .unwrap_or(false);

            if let Some(target) = decide(&config, req.path(), authenticated) {
                log::debug!(
                    "Redirecting {} to {} (authenticated: {})",
                    req.path(),
                    target,
                    authenticated
                );
                let response = HttpResponse::TemporaryRedirect()
                    .insert_header((header::LOCATION, target))
                    .finish();
                return Ok(req.into_response(response).map_into_right_body());
            }

            service
                .call(req)
                .await
                .map(|res| res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, Result, test, web};

    async fn test_endpoint() -> Result<HttpResponse> {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    }

    #[actix_web::test]
    async fn test_pass_through_keeps_handler_response() {
        let config = Arc::new(GuardConfig::default());
        let app = test::init_service(
            App::new()
                .wrap(AuthRedirects::new(config))
                .route("/about-us", web::get().to(test_endpoint)),
        )
        .await;

        let req = test::TestRequest::get().uri("/about-us").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_empty_cookie_value_is_unauthenticated() {
        let config = Arc::new(GuardConfig::default());
        let app = test::init_service(
            App::new()
                .wrap(AuthRedirects::new(config))
                .route("/dashboard", web::get().to(test_endpoint)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/dashboard")
            .cookie(Cookie::new("access_token", ""))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[actix_web::test]
    async fn test_custom_cookie_name_is_honored() {
        let config = Arc::new(GuardConfig {
            cookie_name: "dxh_access_token".to_string(),
            ..GuardConfig::default()
        });
        let app = test::init_service(
            App::new()
                .wrap(AuthRedirects::new(config))
                .route("/dashboard", web::get().to(test_endpoint)),
        )
        .await;

        // A cookie under the default name no longer authenticates.
        let req = test::TestRequest::get()
            .uri("/dashboard")
            .cookie(Cookie::new("access_token", "token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

        let req = test::TestRequest::get()
            .uri("/dashboard")
            .cookie(Cookie::new("dxh_access_token", "token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
