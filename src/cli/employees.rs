use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::core::store::types::PresenceStatus;
use crate::core::store::{Store, valid_employee_code};
use crate::core::terminal::{GuideSection, print_error, print_status, print_success};

fn print_employee_help() {
    GuideSection::new("Roster Management")
        .command("employee add <name>", "Register an employee (--code, --device)")
        .command("employee list", "Show the roster")
        .command("employee rotate-key <code>", "Issue a fresh agent API key")
        .command("employee remove <code>", "Delete an employee and their records")
        .print();
}

async fn open_store() -> Result<Store> {
    let config = Config::load(None)?;
    Store::open(config.db_path()).await
}

pub(crate) async fn run_employee_command(args: &[String]) -> Result<()> {
    let sub_cmd = if args.len() > 2 { args[2].as_str() } else { "" };
    match sub_cmd {
        "add" => add_employee(args).await,
        "list" => list_employees().await,
        "rotate-key" => rotate_key(args).await,
        "remove" => remove_employee(args).await,
        _ => {
            print_error("Unknown or missing employee command. Expected: add, list, rotate-key, remove");
            print_employee_help();
            Ok(())
        }
    }
}

async fn add_employee(args: &[String]) -> Result<()> {
    let mut name = String::new();
    let mut code = String::new();
    let mut device: Option<String> = None;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--code" | "-c" => {
                if i + 1 < args.len() {
                    code = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--device" | "-d" => {
                if i + 1 < args.len() {
                    device = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => {
                if name.is_empty() {
                    name = args[i].clone();
                }
                i += 1;
            }
        }
    }

    if name.is_empty() || code.is_empty() {
        print_error("Usage: vigil employee add <name> --code <code> [--device <label>]");
        return Ok(());
    }
    if !valid_employee_code(&code) {
        print_error("Employee code must contain only alphanumeric characters, hyphens, and underscores.");
        return Ok(());
    }

    let store = open_store().await?;
    if store.get_employee_by_code(&code).await?.is_some() {
        print_error(&format!("Employee code '{}' is already in use.", code));
        return Ok(());
    }

    let employee = store.create_employee(&name, &code, device.as_deref()).await?;
    print_success(&format!("Employee '{}' registered as {}.", name, code));
    print_status("API key", &format!("{}", style(&employee.api_key).bold().yellow()));
    println!(
        "  Configure the agent with this key; rotate it with 'vigil employee rotate-key {}'.",
        code
    );
    Ok(())
}

async fn list_employees() -> Result<()> {
    let store = open_store().await?;
    let employees = store.list_employees().await?;
    if employees.is_empty() {
        print_status("Roster", "no employees registered");
        return Ok(());
    }

    let mut section = GuideSection::new("Roster");
    for emp in &employees {
        let presence = match emp.status {
            PresenceStatus::Online => style("online").green(),
            PresenceStatus::Idle => style("idle").yellow(),
            PresenceStatus::Offline => style("offline").dim(),
        };
        section = section.status(
            &emp.employee_code,
            &format!(
                "{} [{}] last seen {}",
                emp.name,
                presence,
                emp.last_seen.as_deref().unwrap_or("never")
            ),
        );
    }
    section.print();
    Ok(())
}

async fn rotate_key(args: &[String]) -> Result<()> {
    let Some(code) = args.get(3) else {
        print_error("Usage: vigil employee rotate-key <code>");
        return Ok(());
    };
    let store = open_store().await?;
    let Some(employee) = store.get_employee_by_code(code).await? else {
        print_error(&format!("No employee with code '{}'.", code));
        return Ok(());
    };
    match store.rotate_api_key(&employee.id).await? {
        Some(api_key) => {
            print_success(&format!("API key rotated for {}.", code));
            print_status(
                "New API key",
                &format!("{}", style(&api_key).bold().yellow()),
            );
        }
        None => print_error(&format!("No employee with code '{}'.", code)),
    }
    Ok(())
}

async fn remove_employee(args: &[String]) -> Result<()> {
    let Some(code) = args.get(3) else {
        print_error("Usage: vigil employee remove <code>");
        return Ok(());
    };
    let store = open_store().await?;
    let Some(employee) = store.get_employee_by_code(code).await? else {
        print_error(&format!("No employee with code '{}'.", code));
        return Ok(());
    };
    store.delete_employee(&employee.id).await?;
    print_success(&format!(
        "Employee '{}' removed along with their activity, screenshots, and requests.",
        code
    ));
    Ok(())
}
