//! Integration tests for the Tenant repository using in-memory
//! SurrealDB.

use opsdesk_core::error::OpsError;
use opsdesk_core::models::tenant::{AccountKind, CreateTenant, UpdateTenant};
use opsdesk_core::models::tool::ToolKey;
use opsdesk_core::repository::TenantRepository;
use opsdesk_db::repository::SurrealTenantRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    opsdesk_db::run_migrations(&db).await.unwrap();
    db
}

fn org_input(name: &str) -> CreateTenant {
    CreateTenant {
        name: name.into(),
        plan: "pro".into(),
        active_tools: vec![ToolKey::new("crm").unwrap(), ToolKey::new("helpdesk").unwrap()],
        logo_url: None,
        timezone: "Europe/London".into(),
        account_kind: AccountKind::Organization,
    }
}

#[tokio::test]
async fn create_and_get_tenant() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(org_input("Acme")).await.unwrap();
    assert_eq!(tenant.name, "Acme");
    assert_eq!(tenant.account_type, "organization");
    assert_eq!(tenant.active_tools, vec!["crm", "helpdesk"]);

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.plan, "pro");
    assert_eq!(fetched.timezone, "Europe/London");
    assert!(fetched.logo_url.is_none());
}

#[tokio::test]
async fn get_missing_tenant_is_not_found() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, OpsError::NotFound { .. }));
}

#[tokio::test]
async fn update_tenant_fields() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(org_input("Before")).await.unwrap();

    let updated = repo
        .update(
            tenant.id,
            UpdateTenant {
                name: Some("After".into()),
                active_tools: Some(vec![ToolKey::new("invoicing").unwrap()]),
                logo_url: Some(Some("https://cdn.example.com/logo.png".into())),
                account_kind: Some(AccountKind::Personal),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "After");
    assert_eq!(updated.plan, "pro");
    assert_eq!(updated.active_tools, vec!["invoicing"]);
    assert_eq!(updated.logo_url.as_deref(), Some("https://cdn.example.com/logo.png"));
    assert_eq!(updated.account_type, "personal");

    let cleared = repo
        .update(
            tenant.id,
            UpdateTenant {
                logo_url: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.logo_url.is_none());
}

#[tokio::test]
async fn find_for_user_returns_only_member_tenants() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let acme = repo.create(org_input("Acme")).await.unwrap();
    let _other = repo.create(org_input("Other")).await.unwrap();
    let user_id = Uuid::new_v4();

    assert!(repo.find_for_user(user_id).await.unwrap().is_empty());

    repo.add_member(acme.id, user_id).await.unwrap();
    let found = repo.find_for_user(user_id).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, acme.id);
    assert_eq!(found[0].name, "Acme");
}

#[tokio::test]
async fn find_for_user_reports_every_membership() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let first = repo.create(org_input("First")).await.unwrap();
    let second = repo.create(org_input("Second")).await.unwrap();
    let user_id = Uuid::new_v4();

    repo.add_member(first.id, user_id).await.unwrap();
    repo.add_member(second.id, user_id).await.unwrap();

    let found = repo.find_for_user(user_id).await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn remove_member_detaches_user() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(org_input("Acme")).await.unwrap();
    let user_id = Uuid::new_v4();

    repo.add_member(tenant.id, user_id).await.unwrap();
    repo.remove_member(tenant.id, user_id).await.unwrap();

    assert!(repo.find_for_user(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_member_to_missing_tenant_fails() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let err = repo
        .add_member(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::NotFound { .. }));
}

#[tokio::test]
async fn unknown_account_type_is_returned_raw() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db.clone());

    let tenant = repo.create(org_input("Legacy")).await.unwrap();
    db.query("UPDATE type::record('tenant', $id) SET account_type = 'team'")
        .bind(("id", tenant.id.to_string()))
        .await
        .unwrap()
        .check()
        .unwrap();

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.account_type, "team");
}
