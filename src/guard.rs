//! Resource existence guard.
//!
//! `ResourceGuard` is attached with `wrap` to the routes whose path references
//! other entities. It is configured with an ordered list of
//! `(path parameter, EntityKind)` pairs and, before the handler runs, performs
//! one existence lookup per pair. The first missing entity aborts the request
//! with `404 <Entity> not found`; the handler is never invoked. Rejections are
//! rendered into responses here so outer middleware (CORS, logging) sees them.
//!
//! ```ignore
//! #[get("/{id}", wrap = "ResourceGuard::new().require(\"id\", EntityKind::User)")]
//! async fn find_user(/* ... */) { /* ... */ }
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::Lookup;

/// The kind of entity a path parameter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A user addressed by UUID.
    User,
    /// A user addressed by email.
    UserEmail,
    Project,
}

impl EntityKind {
    fn label(self) -> &'static str {
        match self {
            EntityKind::User | EntityKind::UserEmail => "User",
            EntityKind::Project => "Project",
        }
    }

    fn lookup(self, param: &str, raw: &str) -> Result<Lookup, AppError> {
        let parse_id = || {
            Uuid::parse_str(raw).map_err(|_| {
                AppError::BadRequest(format!("Invalid {}: expected a UUID", param))
            })
        };
        Ok(match self {
            EntityKind::User => Lookup::UserId(parse_id()?),
            EntityKind::UserEmail => Lookup::UserEmail(raw.to_string()),
            EntityKind::Project => Lookup::Project(parse_id()?),
        })
    }
}

/// Middleware that checks referenced entities exist before the handler runs.
///
/// With no declared checks it is a pass-through.
#[derive(Debug, Clone, Default)]
pub struct ResourceGuard {
    checks: Vec<(&'static str, EntityKind)>,
}

impl ResourceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that path parameter `param` must reference an existing `kind`.
    /// Checks run in declaration order.
    pub fn require(mut self, param: &'static str, kind: EntityKind) -> Self {
        self.checks.push((param, kind));
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for ResourceGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ResourceGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ResourceGuardService {
            service: Rc::new(service),
            checks: Rc::new(self.checks.clone()),
        }))
    }
}

pub struct ResourceGuardService<S> {
    service: Rc<S>,
    checks: Rc<Vec<(&'static str, EntityKind)>>,
}

impl<S, B> Service<ServiceRequest> for ResourceGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let checks = Rc::clone(&self.checks);

        Box::pin(async move {
            let checked = check_entities(&req, &checks).await;
            if let Err(err) = checked {
                return Ok(req.error_response(err).map_into_right_body());
            }
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

async fn check_entities(
    req: &ServiceRequest,
    checks: &[(&'static str, EntityKind)],
) -> Result<(), AppError> {
    if checks.is_empty() {
        return Ok(());
    }

    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("Application state missing".into()))?;

    // `match_info()` values are only partially decoded (`%2B` stays encoded);
    // go through `web::Path` so the guard sees what the handler will see.
    let params = web::Path::<HashMap<String, String>>::extract(req.request())
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid path parameter: {}", err)))?
        .into_inner();

    for &(param, kind) in checks {
        let lookup = match params.get(param) {
            Some(raw) => kind.lookup(param, raw)?,
            None => {
                log::warn!(
                    "guard on {} declares `{}` but the route has no such parameter",
                    req.path(),
                    param
                );
                continue;
            }
        };

        if !state.store.exists(&lookup).await? {
            log::info!("{} {}: {:?} not found", req.method(), req.path(), lookup);
            return Err(AppError::not_found(kind.label()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, ProjectInput, UserRole};
    use crate::store::{MemoryStore, ProjectStore, UserStore};
    use actix_web::body::{self, MessageBody};
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Status and JSON body (`Null` when empty) of the response to `req`.
    async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
        B: MessageBody + 'static,
    {
        let response = match app.call(req).await {
            Ok(res) => res.into_parts().1.map_into_boxed_body(),
            Err(err) => err.error_response(),
        };
        let status = response.status();
        let bytes = body::to_bytes(response.into_body())
            .await
            .unwrap_or_default();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn seeded_state() -> (AppState, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(NewUser {
                name: "John Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                password_hash: "$2b$10$unused".to_string(),
                avatar: None,
                role: UserRole::User,
            })
            .await
            .unwrap();
        let project = store
            .create_project(
                ProjectInput {
                    name: "Project 1".to_string(),
                    description: None,
                },
                user.id,
            )
            .await
            .unwrap();
        let state = AppState::new(store, "secret".to_string(), None);
        (state, user.id, project.id)
    }

    fn counting_handler(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn() -> futures::future::Ready<HttpResponse> + Clone + 'static {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            ready(HttpResponse::Ok().finish())
        }
    }

    #[actix_rt::test]
    async fn test_existing_entities_pass_through() {
        let (state, user_id, project_id) = seeded_state().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::resource("/projects/{projectId}/members/{userId}")
                    .wrap(
                        ResourceGuard::new()
                            .require("projectId", EntityKind::Project)
                            .require("userId", EntityKind::User),
                    )
                    .route(web::get().to(counting_handler(calls.clone()))),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/projects/{}/members/{}", project_id, user_id))
            .to_request();
        let (status, _) = send(&app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_rt::test]
    async fn test_missing_entity_short_circuits_the_handler() {
        let (state, user_id, project_id) = seeded_state().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::resource("/projects/{projectId}/members/{userId}")
                    .wrap(
                        ResourceGuard::new()
                            .require("projectId", EntityKind::Project)
                            .require("userId", EntityKind::User),
                    )
                    .route(web::get().to(counting_handler(calls.clone()))),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/projects/{}/members/{}", Uuid::new_v4(), user_id))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Project not found");

        let req = test::TestRequest::get()
            .uri(&format!("/projects/{}/members/{}", project_id, Uuid::new_v4()))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn test_user_lookup_by_email() {
        let (state, _, _) = seeded_state().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::resource("/users/email/{email}")
                    .wrap(ResourceGuard::new().require("email", EntityKind::UserEmail))
                    .route(web::get().to(counting_handler(calls.clone()))),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users/email/john.doe@example.com")
            .to_request();
        assert_eq!(send(&app, req).await.0, StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/users/email/nobody@example.com")
            .to_request();
        assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_rt::test]
    async fn test_percent_encoded_email_is_decoded_before_lookup() {
        let (state, _, _) = seeded_state().await;
        state
            .store
            .create_user(NewUser {
                name: "John Doe".to_string(),
                email: "john+doe@example.com".to_string(),
                password_hash: "$2b$10$unused".to_string(),
                avatar: None,
                role: UserRole::User,
            })
            .await
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::resource("/users/email/{email}")
                    .wrap(ResourceGuard::new().require("email", EntityKind::UserEmail))
                    .route(web::get().to(counting_handler(calls.clone()))),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users/email/john%2Bdoe%40example.com")
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_rt::test]
    async fn test_rejection_is_a_rendered_response() {
        let (state, _, _) = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::resource("/projects/{projectId}")
                    .wrap(ResourceGuard::new().require("projectId", EntityKind::Project))
                    .route(web::get().to(counting_handler(Arc::new(AtomicUsize::new(0))))),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/projects/{}", Uuid::new_v4()))
            .to_request();
        let res = app.call(req).await.expect("guard rejections are responses");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_malformed_uuid_is_a_bad_request() {
        let (state, _, _) = seeded_state().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::resource("/projects/{projectId}")
                    .wrap(ResourceGuard::new().require("projectId", EntityKind::Project))
                    .route(web::get().to(counting_handler(calls.clone()))),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/projects/not-a-uuid")
            .to_request();
        assert_eq!(send(&app, req).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn test_without_checks_the_guard_is_permissive() {
        let calls = Arc::new(AtomicUsize::new(0));
        // No AppState registered: an empty guard never touches the store.
        let app = test::init_service(
            App::new().service(
                web::resource("/projects/{projectId}")
                    .wrap(ResourceGuard::new())
                    .route(web::get().to(counting_handler(calls.clone()))),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/projects/{}", Uuid::new_v4()))
            .to_request();
        assert_eq!(send(&app, req).await.0, StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_rt::test]
    async fn test_undeclared_route_parameter_is_skipped() {
        let (state, _, _) = seeded_state().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::resource("/projects")
                    .wrap(ResourceGuard::new().require("projectId", EntityKind::Project))
                    .route(web::get().to(counting_handler(calls.clone()))),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/projects").to_request();
        assert_eq!(send(&app, req).await.0, StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
