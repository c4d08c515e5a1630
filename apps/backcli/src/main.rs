// apps/backcli/src/main.rs

mod rbac_setup;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rbac_lib::seed::RootUserConfig;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::rbac_setup::RbacSetup;

fn build_cli() -> Command {
    Command::new("backcli")
        .about("RBAC admin CLI utility")
        .arg(
            Arg::new("migrations")
                .long("migrations")
                .action(ArgAction::SetTrue)
                .help("Execute database migrations"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .action(ArgAction::SetTrue)
                .help("Upsert the permission catalog and the default roles"),
        )
        .arg(
            Arg::new("root-user")
                .long("root-user")
                .action(ArgAction::SetTrue)
                .help("Create the root user from ROOT_USER_* variables and grant it the admin role"),
        )
        .arg(
            Arg::new("assign")
                .long("assign")
                .value_name("EMAIL")
                .requires("role")
                .conflicts_with("unassign")
                .help("Assign --role to the user with this email"),
        )
        .arg(
            Arg::new("unassign")
                .long("unassign")
                .value_name("EMAIL")
                .requires("role")
                .help("Remove --role from the user with this email"),
        )
        .arg(
            Arg::new("role")
                .long("role")
                .value_name("NAME")
                .help("Role name used by --assign / --unassign"),
        )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = build_cli().get_matches();

    if let Err(e) = run(&matches).await {
        eprintln!("{}", e);
        process::exit(1);
    }
}

async fn run(matches: &ArgMatches) -> Result<(), String> {
    let setup = RbacSetup::from_env().await?;

    if matches.get_flag("migrations") {
        println!("Running migrations for rbac-lib...");
        setup.run_migrations().await?;
        println!("Migrations applied successfully.");
    }

    if matches.get_flag("seed") {
        let summary = setup.seed().await?;
        println!(
            "Seeded {} permissions and {} default roles.",
            summary.permissions, summary.roles
        );
    }

    if matches.get_flag("root-user") {
        let config = RootUserConfig::from_env()?;
        let user = setup.root_user(&config).await?;
        println!("Root user {} ({}) holds the admin role.", user.email, user.id);
    }

    let role = matches.get_one::<String>("role");

    if let (Some(email), Some(role)) = (matches.get_one::<String>("assign"), role) {
        if setup.assign(email, role).await? {
            println!("Assigned role {} to {}.", role, email);
        } else {
            println!("{} already has role {}.", email, role);
        }
    }

    if let (Some(email), Some(role)) = (matches.get_one::<String>("unassign"), role) {
        setup.unassign(email, role).await?;
        println!("Removed role {} from {}.", role, email);
    }

    Ok(())
}
