//! Fixed test IDs for deterministic tests
//!
//! Tenants, subject labels and passwords used by the scenario tests, so
//! that seeded users and forged identities line up across fixtures.

// Tenants
pub const TEST_TENANT_1: &str = "tenant1id";
pub const TEST_TENANT_2: &str = "tenant2id";
pub const TEST_TENANTS: [&str; 2] = [TEST_TENANT_1, TEST_TENANT_2];

// Subject labels (derived to UUIDs by the forge)
pub const TEST_SUBJECT_FOO: &str = "foo";

// Users created by the CLI
pub const TEST_EMAIL: &str = "foo@bar.com";
pub const TEST_PASSWORD: &str = "1234youseeme";
pub const TEST_USER_ID: &str = "123456";

/// Password of every seeded user.
pub const SEED_PASSWORD: &str = "correcthorsebatterystaple";

/// Number of users created per seeding call.
pub const SEED_USER_COUNT: usize = 5;

/// Email of the `index`-th seeded user, optionally scoped to a tenant.
///
/// `seed_email(0, None)` is `user-0@foo.com`,
/// `seed_email(0, Some("tenant1id"))` is `user-0-tenant1id@foo.com`.
pub fn seed_email(index: usize, tenant: Option<&str>) -> String {
    match tenant {
        Some(tenant) => format!("user-{index}-{tenant}@foo.com"),
        None => format!("user-{index}@foo.com"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_email() {
        assert_eq!(seed_email(3, None), "user-3@foo.com");
        assert_eq!(seed_email(0, Some(TEST_TENANT_2)), "user-0-tenant2id@foo.com");
    }
}
