use cucumber::then;

use rbac_lib::errors_service::RbacServiceError;
use rbac_lib::repository::traits::RoleRepositoryTrait;
use rbac_lib::seed::PERMISSION_CATALOG;

use crate::support::world::{sorted, split_names, TestWorld};

#[then(expr = "the role should have exactly the permissions {string}")]
pub async fn role_has_exact_permissions(world: &mut TestWorld, expected: String) {
    let role = match world.role_result.as_ref() {
        Some(Ok(role)) => role.clone(),
        _ => world
            .service()
            .find_by_id(world.role_id())
            .await
            .expect("role should exist"),
    };
    let actual: Vec<String> = role.permissions.iter().map(|p| p.name.clone()).collect();
    assert_eq!(sorted(actual), sorted(split_names(&expected)));
}

#[then(expr = "the role {string} should have exactly the permissions {string}")]
pub async fn named_role_has_exact_permissions(world: &mut TestWorld, name: String, expected: String) {
    let row = world
        .role_repo()
        .get_role_by_name(&name)
        .await
        .expect("lookup should succeed")
        .expect("role should exist");
    let role = world
        .service()
        .find_by_id(row.id.parse().expect("stored id should be a uuid"))
        .await
        .expect("role should load");
    let actual: Vec<String> = role.permissions.iter().map(|p| p.name.clone()).collect();
    assert_eq!(sorted(actual), sorted(split_names(&expected)));
}

#[then(expr = "the role {string} should hold every catalog permission")]
pub async fn role_holds_catalog(world: &mut TestWorld, name: String) {
    let expected: Vec<String> = PERMISSION_CATALOG
        .iter()
        .map(|(name, _)| name.to_string())
        .collect();
    named_role_has_exact_permissions(world, name, expected.join(", ")).await;
}

#[then("the request should fail with a conflict")]
pub async fn fails_with_conflict(world: &mut TestWorld) {
    assert!(
        matches!(world.failure(), Some(RbacServiceError::RoleNameAlreadyExists)),
        "expected conflict, got {:?}",
        world.failure()
    );
}

#[then("the request should fail with a bad request")]
pub async fn fails_with_bad_request(world: &mut TestWorld) {
    assert!(
        matches!(
            world.failure(),
            Some(
                RbacServiceError::InvalidPermissionIds(_)
                    | RbacServiceError::RoleInUse(_)
                    | RbacServiceError::Validation(_)
            )
        ),
        "expected bad request, got {:?}",
        world.failure()
    );
}

#[then("the request should fail with not found")]
pub async fn fails_with_not_found(world: &mut TestWorld) {
    assert!(
        matches!(world.failure(), Some(RbacServiceError::NotFound)),
        "expected not found, got {:?}",
        world.failure()
    );
}

#[then("the deletion should succeed")]
pub async fn deletion_succeeds(world: &mut TestWorld) {
    assert!(matches!(world.delete_result, Some(Ok(()))));
}

#[then(expr = "no role named {string} should exist")]
pub async fn role_absent(world: &mut TestWorld, name: String) {
    let row = world
        .role_repo()
        .get_role_by_name(&name)
        .await
        .expect("lookup should succeed");
    assert!(row.is_none());
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_permissions")
        .fetch_one(&world.pool())
        .await
        .expect("count should succeed");
    assert_eq!(count, 0);
}

#[then("the role listing should show the same permissions for the role")]
pub async fn listing_matches_lookup(world: &mut TestWorld) {
    let role_id = world.role_id();
    let single = world.service().find_by_id(role_id).await.expect("role should exist");
    let listed = world
        .service()
        .find_all()
        .await
        .expect("listing should succeed")
        .into_iter()
        .find(|r| r.id == role_id)
        .expect("role should be listed");
    assert_eq!(single.permissions, listed.permissions);
}

#[then(expr = "the permission catalog should list {int} permissions in name order")]
pub async fn catalog_listing(world: &mut TestWorld, count: usize) {
    let permissions = world
        .service()
        .get_permissions()
        .await
        .expect("listing should succeed");
    assert_eq!(permissions.len(), count);
    let names: Vec<String> = permissions.into_iter().map(|p| p.name).collect();
    assert_eq!(names.clone(), sorted(names));
}
