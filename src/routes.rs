//! Navigation guard for the admin route table.
//!
//! Each route declares whether it is guest-only, requires authentication,
//! and which roles may enter. `guard` turns the session state and a target
//! route into a navigation decision; rendering and history handling are the
//! caller's concern.

use crate::auth::SessionStore;
use crate::models::roles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    MisRecibos,
    ReciboDetalle,
    BuscarRecibos,
    Liquidaciones,
    NuevaLiquidacion,
    Personal,
    Usuarios,
    NuevoUsuario,
    EditarUsuario,
    Perfil,
    NotFound,
}

/// Access requirements of a route. An empty `allowed_roles` means any
/// authenticated user may enter.
#[derive(Debug, Clone, Copy)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub guest_only: bool,
    pub allowed_roles: &'static [&'static str],
}

const PUBLIC: RouteMeta = RouteMeta {
    requires_auth: false,
    guest_only: false,
    allowed_roles: &[],
};

const GUEST: RouteMeta = RouteMeta {
    requires_auth: false,
    guest_only: true,
    allowed_roles: &[],
};

const AUTHENTICATED: RouteMeta = RouteMeta {
    requires_auth: true,
    guest_only: false,
    allowed_roles: &[],
};

const fn restricted(allowed_roles: &'static [&'static str]) -> RouteMeta {
    RouteMeta {
        requires_auth: true,
        guest_only: false,
        allowed_roles,
    }
}

impl Route {
    pub fn meta(&self) -> RouteMeta {
        match self {
            Route::Login => GUEST,
            Route::Dashboard | Route::MisRecibos | Route::ReciboDetalle | Route::Perfil => {
                AUTHENTICATED
            }
            Route::BuscarRecibos => restricted(&[
                roles::ADMINISTRADOR,
                roles::MESA_AYUDA,
                roles::GERENCIAL,
            ]),
            Route::Liquidaciones => restricted(&[
                roles::ADMINISTRADOR,
                roles::LIQUIDACIONES,
                roles::MESA_AYUDA,
                roles::GERENCIAL,
            ]),
            Route::NuevaLiquidacion => {
                restricted(&[roles::ADMINISTRADOR, roles::LIQUIDACIONES])
            }
            Route::Personal => restricted(&[
                roles::ADMINISTRADOR,
                roles::MESA_AYUDA,
                roles::LIQUIDACIONES,
                roles::GERENCIAL,
            ]),
            Route::Usuarios | Route::EditarUsuario => {
                restricted(&[roles::ADMINISTRADOR, roles::MESA_AYUDA])
            }
            Route::NuevoUsuario => restricted(&[roles::ADMINISTRADOR]),
            Route::NotFound => PUBLIC,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::MisRecibos => "/mis-recibos",
            Route::ReciboDetalle => "/recibos/:id",
            Route::BuscarRecibos => "/recibos/buscar",
            Route::Liquidaciones => "/liquidaciones",
            Route::NuevaLiquidacion => "/liquidaciones/nueva",
            Route::Personal => "/personal",
            Route::Usuarios => "/usuarios",
            Route::NuevoUsuario => "/usuarios/nuevo",
            Route::EditarUsuario => "/usuarios/:id",
            Route::Perfil => "/perfil",
            Route::NotFound => "/404",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDecision {
    Proceed,
    RedirectToLogin,
    RedirectToDashboard,
}

/// Decide whether the session may navigate to `target`.
///
/// On a cold start (persisted token but no profile yet) the profile is
/// hydrated first so role checks see the real role.
pub async fn guard(session: &mut SessionStore, target: Route) -> NavDecision {
    if session.is_authenticated() && session.user.is_none() {
        session.initialize().await;
    }

    let meta = target.meta();

    if meta.guest_only && session.is_authenticated() {
        return NavDecision::RedirectToDashboard;
    }

    if meta.requires_auth && !session.is_authenticated() {
        return NavDecision::RedirectToLogin;
    }

    if !meta.allowed_roles.is_empty() && !session.has_role(meta.allowed_roles) {
        return NavDecision::RedirectToDashboard;
    }

    NavDecision::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::{MemoryTokenStore, TokenStore};
    use crate::models::User;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(uri: &str) -> SessionStore {
        let store = Arc::new(MemoryTokenStore::new());
        let api =
            ApiClient::new(uri, store as Arc<dyn TokenStore>).expect("failed to build client");
        SessionStore::new(api)
    }

    fn user_with_role(role: &str) -> User {
        User {
            id: 1,
            username: "user".to_string(),
            email: "user@test.com".to_string(),
            role: Some(role.to_string()),
            legajo: None,
            nombre: None,
            activo: Some(1),
            created: None,
            modified: None,
        }
    }

    fn authenticated_session(role: &str) -> SessionStore {
        let mut session = session_for("http://localhost");
        session.tokens().store_access_token("T1");
        session.user = Some(user_with_role(role));
        session
    }

    #[tokio::test]
    async fn test_anonymous_user_is_sent_to_login() {
        let mut session = session_for("http://localhost");
        assert_eq!(
            guard(&mut session, Route::Dashboard).await,
            NavDecision::RedirectToLogin
        );
        assert_eq!(
            guard(&mut session, Route::Login).await,
            NavDecision::Proceed
        );
        assert_eq!(
            guard(&mut session, Route::NotFound).await,
            NavDecision::Proceed
        );
    }

    #[tokio::test]
    async fn test_authenticated_user_skips_login_page() {
        let mut session = authenticated_session(roles::GERENCIAL);
        assert_eq!(
            guard(&mut session, Route::Login).await,
            NavDecision::RedirectToDashboard
        );
        assert_eq!(
            guard(&mut session, Route::MisRecibos).await,
            NavDecision::Proceed
        );
    }

    #[tokio::test]
    async fn test_role_gate_redirects_to_dashboard() {
        let mut session = authenticated_session(roles::GERENCIAL);
        assert_eq!(
            guard(&mut session, Route::NuevoUsuario).await,
            NavDecision::RedirectToDashboard
        );
        assert_eq!(
            guard(&mut session, Route::BuscarRecibos).await,
            NavDecision::Proceed
        );

        let mut admin = authenticated_session(roles::ADMINISTRADOR);
        assert_eq!(
            guard(&mut admin, Route::NuevoUsuario).await,
            NavDecision::Proceed
        );
    }

    #[tokio::test]
    async fn test_cold_start_hydrates_profile_before_role_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1, "username": "admin", "email": "admin@test.com", "role": "administrador"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = session_for(&server.uri());
        session.tokens().store_access_token("T1");

        assert_eq!(
            guard(&mut session, Route::Usuarios).await,
            NavDecision::Proceed
        );
        assert!(session.user.is_some());
    }
}
