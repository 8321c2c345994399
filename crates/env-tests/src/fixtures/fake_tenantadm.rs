//! Fake tenantadm service.
//!
//! In the multi-tenant setup useradm asks tenantadm which tenant a user
//! belongs to when logging in. This fixture answers those lookups from an
//! in-memory `tenant -> [email]` map, for as long as the handle is alive.

use serde_json::json;
use std::collections::HashMap;
use std::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Path of the tenantadm lookup queried by useradm.
pub const TENANTADM_TENANTS_PATH: &str = "/api/internal/v1/tenantadm/tenants";

/// Answers `GET /tenants?username=<email>` with the user's tenant, or an
/// empty list for unknown users.
struct UserTenantsResponder {
    tenant_by_user: HashMap<String, String>,
}

impl Respond for UserTenantsResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let tenant = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "username")
            .and_then(|(_, username)| self.tenant_by_user.get(&*username));

        let body = match tenant {
            Some(tenant) => json!([{ "id": tenant, "name": tenant, "tenant_token": "" }]),
            None => json!([]),
        };

        ResponseTemplate::new(200).set_body_json(body)
    }
}

/// Running fake tenantadm; stops when dropped.
pub struct FakeTenantadm {
    server: MockServer,
}

impl FakeTenantadm {
    /// Start listening on `addr` with the given `tenant -> [email]` map.
    pub async fn start(
        addr: &str,
        users_db: &HashMap<String, Vec<String>>,
    ) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(addr)?;
        let server = MockServer::builder().listener(listener).start().await;

        Self::mount(&server, users_db).await;

        tracing::info!(
            target: "env_tests.tenantadm",
            uri = %server.uri(),
            tenants = users_db.len(),
            "Fake tenantadm started"
        );

        Ok(Self { server })
    }

    /// Start on a random local port (for tests of the fixture itself).
    pub async fn start_local(users_db: &HashMap<String, Vec<String>>) -> Self {
        let server = MockServer::start().await;
        Self::mount(&server, users_db).await;
        Self { server }
    }

    async fn mount(server: &MockServer, users_db: &HashMap<String, Vec<String>>) {
        let tenant_by_user = users_db
            .iter()
            .flat_map(|(tenant, emails)| {
                emails
                    .iter()
                    .map(move |email| (email.clone(), tenant.clone()))
            })
            .collect();

        Mock::given(method("GET"))
            .and(path(TENANTADM_TENANTS_PATH))
            .respond_with(UserTenantsResponder { tenant_by_user })
            .mount(server)
            .await;
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Number of tenant lookups served so far.
    pub async fn lookups(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
