use cucumber::when;
use uuid::Uuid;

use rbac_lib::entities::{CreateRole, UpdateRole};
use rbac_lib::repository::traits::UserRoleRepositoryTrait;
use rbac_lib::seed::seed_catalog;

use crate::support::world::TestWorld;

#[when(expr = "I create a role {string} with permissions {string}")]
pub async fn create_role(world: &mut TestWorld, name: String, permissions: String) {
    let input = CreateRole {
        name,
        description: Some("created from a scenario".to_string()),
        permission_ids: world.ids_for(&permissions),
    };
    let result = world.service().create(input).await;
    world.record_role(result);
}

#[when(expr = "I create a role {string} with an unknown permission")]
pub async fn create_role_with_unknown_permission(world: &mut TestWorld, name: String) {
    let mut permission_ids: Vec<Uuid> = world.permission_ids.values().copied().collect();
    permission_ids.push(Uuid::new_v4());

    let input = CreateRole {
        name,
        description: None,
        permission_ids,
    };
    let result = world.service().create(input).await;
    world.record_role(result);
}

#[when(expr = "I replace the role permissions with {string}")]
pub async fn replace_permissions(world: &mut TestWorld, permissions: String) {
    let input = UpdateRole {
        permission_ids: Some(world.ids_for(&permissions)),
        ..UpdateRole::default()
    };
    let result = world.service().update(world.role_id(), input).await;
    world.record_role(result);
}

#[when(expr = "I rename the role to {string}")]
pub async fn rename_role(world: &mut TestWorld, name: String) {
    let input = UpdateRole {
        name: Some(name),
        ..UpdateRole::default()
    };
    let result = world.service().update(world.role_id(), input).await;
    world.record_role(result);
}

#[when("I delete the role")]
pub async fn delete_role(world: &mut TestWorld) {
    let result = world.service().delete(world.role_id()).await;
    world.error = None;
    world.delete_result = Some(result);
}

#[when(expr = "the role is removed from user {string}")]
pub async fn unassign_role(world: &mut TestWorld, email: String) {
    let user_id = *world.user_ids.get(&email).expect("user should exist");
    world
        .user_role_repo()
        .unassign_role(&user_id.to_string(), &world.role_id().to_string())
        .await
        .expect("unassignment should succeed");
}

#[when("I look up the role")]
pub async fn look_up_role(world: &mut TestWorld) {
    let role_id = world.role_id();
    let result = world.service().find_by_id(role_id).await;
    world.record_role(result);
    // A failed lookup must not lose track of the role under test.
    world.current_role_id = Some(role_id);
}

#[when("the default catalog is seeded")]
pub async fn seed_default_catalog(world: &mut TestWorld) {
    seed_catalog(&world.role_repo(), &world.permission_repo())
        .await
        .expect("seeding should succeed");
}
