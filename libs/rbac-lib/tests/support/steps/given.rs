use cucumber::given;

use rbac_lib::entities::CreateRole;
use rbac_lib::repository::traits::{
    PermissionRepositoryTrait, UserRepositoryTrait, UserRoleRepositoryTrait,
};

use crate::support::world::{split_names, TestWorld};

#[given("a clean rbac database")]
pub async fn clean_database(world: &mut TestWorld) {
    world.reset().await;
}

#[given(expr = "the permissions {string} exist")]
pub async fn permissions_exist(world: &mut TestWorld, names: String) {
    let repo = world.permission_repo();
    for name in split_names(&names) {
        let row = repo
            .upsert_permission(&name, &format!("{name} access"))
            .await
            .expect("permission upsert should succeed");
        world
            .permission_ids
            .insert(row.name, row.id.parse().expect("stored id should be a uuid"));
    }
}

#[given(expr = "a role {string} exists with permissions {string}")]
pub async fn role_exists(world: &mut TestWorld, name: String, permissions: String) {
    let input = CreateRole {
        name,
        description: None,
        permission_ids: world.ids_for(&permissions),
    };
    let role = world
        .service()
        .create(input)
        .await
        .expect("role creation should succeed");
    world.current_role_id = Some(role.id);
}

#[given(expr = "a user {string} holds the role")]
pub async fn user_holds_role(world: &mut TestWorld, email: String) {
    let role_id = world.role_id();
    let user = world
        .user_repo()
        .create_user(&email, "not-a-real-hash", "Test User")
        .await
        .expect("user creation should succeed");
    world
        .user_role_repo()
        .assign_role(&user.id, &role_id.to_string())
        .await
        .expect("role assignment should succeed");
    world
        .user_ids
        .insert(email, user.id.parse().expect("stored id should be a uuid"));
}
