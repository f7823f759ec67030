// This file is part of the product Palisade.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{
    CONTENT_SECURITY_POLICY, HeaderName, HeaderValue, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use actix_web::{Error, HttpMessage};

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use crate::security::generate_csp_nonce;

const PERMISSIONS_POLICY: &str = "accelerometer=(), camera=(), geolocation=(), gyroscope=(), magnetometer=(), microphone=(), payment=(), usb=(), xr-spatial-tracking=()";

/// The per-request CSP nonce, available from request extensions for handlers
/// that render inline scripts or styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspNonce(pub String);

/// Nonce-based policy applied to every response that does not set its own.
pub fn strict_csp_policy(nonce: &str) -> String {
    format!(
        "default-src 'self'; img-src 'self' data:; style-src 'self' 'nonce-{}'; script-src 'self' 'nonce-{}'; object-src 'none'; frame-ancestors 'self'; base-uri 'self'; form-action 'self';",
        nonce, nonce
    )
}

/// Security headers middleware: generates a CSP nonce per request, publishes
/// it via `CspNonce` in request extensions, and stamps standard security
/// headers on the response. Headers a handler already set are left alone.
pub struct SecurityHeaders;

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct SecurityHeadersMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let nonce = generate_csp_nonce();
        req.extensions_mut().insert(CspNonce(nonce.clone()));

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let headers = res.headers_mut();

            if !headers.contains_key(CONTENT_SECURITY_POLICY) {
                match HeaderValue::from_str(&strict_csp_policy(&nonce)) {
                    Ok(value) => {
                        headers.insert(CONTENT_SECURITY_POLICY, value);
                    }
                    Err(_) => log::warn!("Failed to build CSP header value"),
                }
            }

            if !headers.contains_key(X_CONTENT_TYPE_OPTIONS) {
                headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
            }

            if !headers.contains_key(X_FRAME_OPTIONS) {
                headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
            }

            if !headers.contains_key("referrer-policy") {
                headers.insert(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                );
            }

            if !headers.contains_key("permissions-policy") {
                headers.insert(
                    HeaderName::from_static("permissions-policy"),
                    HeaderValue::from_static(PERMISSIONS_POLICY),
                );
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_embeds_the_nonce_for_scripts_and_styles() {
        let policy = strict_csp_policy("abc123");
        assert!(policy.contains("script-src 'self' 'nonce-abc123'"));
        assert!(policy.contains("style-src 'self' 'nonce-abc123'"));
        assert!(policy.contains("object-src 'none'"));
        assert!(policy.starts_with("default-src 'self';"));
    }
}
