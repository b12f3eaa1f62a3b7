use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, FarmFilter, FarmSortBy, sort_farms};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "farmfolio_admin")]
#[command(about = "Admin utilities for Farmfolio (bootstrap users, inspect farms)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./farmfolio.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Farm(Farm),
    /// Print the dashboard of a user.
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Farm {
    #[command(subcommand)]
    command: FarmCommand,
}

#[derive(Subcommand, Debug)]
enum FarmCommand {
    List(FarmListArgs),
}

#[derive(Args, Debug)]
struct FarmListArgs {
    #[arg(long)]
    user: String,
    /// Substring of the farm name or village.
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "")]
    crop_category: String,
    #[arg(long, default_value = "")]
    season: String,
    /// `farmName`, `createdAt` or `totalArea`.
    #[arg(long, default_value = "farmName")]
    sort_by: String,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    #[arg(long)]
    user: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Farm(Farm {
            command: FarmCommand::List(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let filter = FarmFilter {
                search: args.search,
                crop_category: args.crop_category,
                season: args.season,
            };
            let mut farms = filter.apply(&engine.list_farms(&args.user).await?);
            sort_farms(&mut farms, FarmSortBy::from_key(&args.sort_by));

            for farm in farms {
                let area = farm.area.map(|a| a.to_string()).unwrap_or_default();
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    farm.id, farm.name, farm.village, farm.crop_type, farm.season, area
                );
            }
        }
        Command::Dashboard(args) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let dashboard = engine.dashboard(&args.user).await?;

            println!("farms:    {}", dashboard.stats.total_farms);
            println!("total:    {}", dashboard.stats.total_expenses);
            println!("paid:     {}", dashboard.stats.paid_amount);
            println!("pending:  {}", dashboard.stats.pending_amount);
            println!("recent expenses:");
            for expense in dashboard.recent_expenses {
                println!(
                    "  {}\t{}\t{}\t{}\t{}",
                    expense.date.format("%Y-%m-%d"),
                    expense.farm_name,
                    expense.category,
                    expense.amount,
                    expense.payment_status
                );
            }
        }
    }

    Ok(())
}
