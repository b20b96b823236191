//! OpenAPI documentation configuration.
//!
//! Aggregates every handler's `utoipa::path` annotation into a single
//! document served at `/api-docs/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::models::{
    auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    navers::{NaverCreate, NaverCreateResponse, NaverDetailResponse, NaverReplace, NaverResponse, NaverUpdate},
    projects::{ProjectCreate, ProjectCreateResponse, ProjectDetailResponse, ProjectReplace, ProjectResponse, ProjectUpdate},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::navers::list_navers,
        crate::api::handlers::navers::create_naver,
        crate::api::handlers::navers::get_naver,
        crate::api::handlers::navers::update_naver,
        crate::api::handlers::navers::replace_naver,
        crate::api::handlers::navers::delete_naver,
        crate::api::handlers::projects::list_projects,
        crate::api::handlers::projects::create_project,
        crate::api::handlers::projects::get_project,
        crate::api::handlers::projects::update_project,
        crate::api::handlers::projects::replace_project,
        crate::api::handlers::projects::delete_project,
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        NaverCreate,
        NaverUpdate,
        NaverReplace,
        NaverResponse,
        NaverCreateResponse,
        NaverDetailResponse,
        ProjectCreate,
        ProjectUpdate,
        ProjectReplace,
        ProjectResponse,
        ProjectCreateResponse,
        ProjectDetailResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Registration and login"),
        (name = "navers", description = "Employee records owned by the caller"),
        (name = "projects", description = "Projects owned by the caller"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}
