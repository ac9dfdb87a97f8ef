//! # CLI Layer
//!
//! The only place that knows about terminal I/O, logging setup and exit codes.
//!
//! 1. **Argument parsing**: shell arguments become typed commands via clap
//! 2. **Context setup**: data directory, config and warehouse via `init::initialize`
//! 3. **Authentication**: log in with `--user`/`--password` for the role a command needs
//!    (changing settings needs an admin)
//! 4. **API dispatch**: call the matching `DepotApi` method
//! 5. **Output**: render the `CmdResult` and print it
//!
//! Business rules are not tested here; that is the command layer's job.

use super::menu::Menu;
use super::render::{
    print_messages, render_config, render_invoice, render_orders, render_products, render_report,
};
use super::setup::{
    Cli, Commands, ConfigArgs, ConfigCommands, OrderCommands, ProductCommands, UpdateArgs,
};
use chrono::Utc;
use clap::Parser;
use console::Term;
use depot::api::{ConfigAction, DepotApi};
use depot::error::{DepotError, Result};
use depot::init::{initialize, DepotContext};
use depot::model::{ProductUpdate, Role, Session};
use depot::report::TimeFrame;
use depot::store::fs_backend::FsBackend;
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: DepotApi<FsBackend>,
    user: Option<String>,
    password: Option<String>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        None | Some(Commands::Menu) => handle_menu(&mut ctx),
        Some(Commands::Register { role, username }) => {
            handle_register(&mut ctx, role.into(), username)
        }
        Some(Commands::Product(cmd)) => match cmd {
            ProductCommands::Add {
                id,
                name,
                quantity,
                price,
            } => handle_product_add(&mut ctx, id, name, quantity, price),
            ProductCommands::Update(args) => handle_product_update(&mut ctx, args),
            ProductCommands::Remove { id } => handle_product_remove(&mut ctx, id),
        },
        Some(Commands::Inventory { search, role }) => {
            handle_inventory(&mut ctx, search, role.into())
        }
        Some(Commands::Order(cmd)) => match cmd {
            OrderCommands::Place { items } => handle_order_place(&mut ctx, items),
            OrderCommands::List => handle_order_list(&mut ctx),
        },
        Some(Commands::Report { timeframe }) => handle_report(&mut ctx, timeframe.into()),
        Some(Commands::Config(args)) => handle_config(&mut ctx, args),
    }
}

/// Logs go to stderr. `RUST_LOG` wins; otherwise warnings, or debug with `-v`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let DepotContext {
        api, load_report, ..
    } = initialize(&cwd, cli.data_dir.as_deref())?;

    if !load_report.is_clean() {
        eprintln!(
            "Warning: skipped {} malformed record(s) and {} duplicate product(s) while loading",
            load_report.skipped.len(),
            load_report.duplicate_products.len()
        );
    }

    Ok(AppContext {
        api,
        user: cli.user.clone(),
        password: cli.password.clone(),
    })
}

/// Logs in as `role` with the global `--user` and `--password`.
fn authenticate(ctx: &mut AppContext, role: Role) -> Result<Session> {
    let user = ctx.user.clone().ok_or_else(|| {
        DepotError::InvalidInput(format!("--user is required to log in as {}", role))
    })?;
    let password = match ctx.password.clone() {
        Some(p) => p,
        None => read_password(&format!("Password for {} '{}': ", role, user))?,
    };
    let session = ctx.api.authenticate(role, &user, &password)?;
    debug!(username = %session.username, %role, "authenticated");
    Ok(session)
}

/// Reads a password without echo from the terminal, or the first line of piped stdin.
fn read_password(prompt: &str) -> Result<String> {
    if std::io::stdin().is_terminal() {
        let term = Term::stderr();
        term.write_str(prompt)?;
        return Ok(term.read_secure_line()?);
    }
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn handle_menu(ctx: &mut AppContext) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Menu::new(&mut ctx.api, stdin.lock(), stdout.lock())
        .with_terminal_secrets(interactive)
        .run()
}

fn handle_register(ctx: &mut AppContext, role: Role, username: String) -> Result<()> {
    let password = match ctx.password.clone() {
        Some(p) => p,
        None => read_password(&format!("Password for new {} '{}': ", role, username))?,
    };
    let result = ctx.api.register(role, &username, &password)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_product_add(
    ctx: &mut AppContext,
    id: String,
    name: String,
    quantity: u32,
    price: f64,
) -> Result<()> {
    authenticate(ctx, Role::Admin)?;
    let result = ctx.api.add_product(&id, &name, quantity, price)?;
    ctx.api.save()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_product_update(ctx: &mut AppContext, args: UpdateArgs) -> Result<()> {
    authenticate(ctx, Role::Admin)?;
    let mut update = ProductUpdate::default();
    if let Some(name) = args.name {
        update = update.name(name);
    }
    if let Some(quantity) = args.quantity {
        update = update.quantity(quantity);
    }
    if let Some(price) = args.price {
        update = update.price(price);
    }
    let result = ctx.api.update_product(&args.id, &update)?;
    ctx.api.save()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_product_remove(ctx: &mut AppContext, id: String) -> Result<()> {
    authenticate(ctx, Role::Admin)?;
    let result = ctx.api.remove_product(&id)?;
    ctx.api.save()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_inventory(ctx: &mut AppContext, search: Option<String>, role: Role) -> Result<()> {
    authenticate(ctx, role)?;
    let result = match search {
        Some(term) => ctx.api.search_products(&term)?,
        None => ctx.api.list_products()?,
    };
    print!("{}", render_products(&result.listed_products));
    print_messages(&result.messages);
    Ok(())
}

fn handle_order_place(ctx: &mut AppContext, items: Vec<String>) -> Result<()> {
    authenticate(ctx, Role::Customer)?;
    let result = ctx.api.place_order(items.as_slice())?;
    ctx.api.save()?;
    if let Some(invoice) = &result.invoice {
        print!("{}", render_invoice(invoice));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_order_list(ctx: &mut AppContext) -> Result<()> {
    authenticate(ctx, Role::Admin)?;
    let result = ctx.api.list_orders()?;
    print!("{}", render_orders(&result.listed_orders, Utc::now()));
    print_messages(&result.messages);
    Ok(())
}

fn handle_report(ctx: &mut AppContext, timeframe: TimeFrame) -> Result<()> {
    authenticate(ctx, Role::Admin)?;
    let result = ctx.api.sales_report(timeframe)?;
    if let Some(report) = &result.report {
        print!("{}", render_report(report));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, args: ConfigArgs) -> Result<()> {
    let action = match args.action {
        None => ConfigAction::ShowAll,
        Some(ConfigCommands::Get { key }) => ConfigAction::ShowKey(key),
        Some(ConfigCommands::Set { key, value }) => {
            authenticate(ctx, Role::Admin)?;
            ConfigAction::Set(key, value)
        }
    };
    let result = ctx.api.config(action)?;
    if let (Some(config), true) = (&result.config, result.messages.is_empty()) {
        print!("{}", render_config(config));
    }
    print_messages(&result.messages);
    Ok(())
}
