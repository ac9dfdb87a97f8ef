//! # Interactive Menu
//!
//! Numbered menus read from any `BufRead` and written to any `Write`, so the
//! whole flow runs in tests against in-memory buffers.
//!
//! ```text
//! Main menu ──login admin────▶ Admin menu ──logout──▶ Main menu
//!           ──login customer─▶ Customer menu ──logout──▶ Main menu
//!           ──exit───────────▶ save, quit
//! ```
//!
//! Failed operations print their error and return to the current menu.
//! End of input anywhere behaves like choosing exit: unsaved changes are saved.

use super::render::{
    render_invoice, render_messages, render_orders, render_products, render_report,
};
use chrono::Utc;
use colored::Colorize;
use console::Term;
use depot::api::{CmdResult, DepotApi};
use depot::error::Result;
use depot::model::{OrderLine, ProductUpdate, Role, Session};
use depot::report::TimeFrame;
use depot::store::StorageBackend;
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::debug;

enum Flow {
    Stay,
    Back,
    Quit,
}

/// Reads a line or leaves the current handler with `Flow::Quit` on end of input.
macro_rules! ask {
    ($self:ident, $label:expr) => {
        match $self.prompt($label)? {
            Some(answer) => answer,
            None => return Ok(Flow::Quit),
        }
    };
}

pub(super) struct Menu<'a, B: StorageBackend, R: BufRead, W: Write> {
    api: &'a mut DepotApi<B>,
    input: R,
    output: W,
    secrets_from_terminal: bool,
}

impl<'a, B: StorageBackend, R: BufRead, W: Write> Menu<'a, B, R, W> {
    pub fn new(api: &'a mut DepotApi<B>, input: R, output: W) -> Self {
        Self {
            api,
            input,
            output,
            secrets_from_terminal: false,
        }
    }

    /// Read passwords from the terminal without echo instead of from `input`.
    pub fn with_terminal_secrets(mut self, enabled: bool) -> Self {
        self.secrets_from_terminal = enabled;
        self
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            let flow = self.main_menu()?;
            if let Flow::Quit = flow {
                break;
            }
        }

        if let Some(result) = self.api.save_if_dirty()? {
            self.show_messages(&result)?;
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    fn main_menu(&mut self) -> Result<Flow> {
        self.heading("Main menu")?;
        self.options(&[
            "Register admin",
            "Login admin",
            "Register customer",
            "Login customer",
            "Exit",
        ])?;
        let choice = ask!(self, "Choice: ");
        match choice.trim() {
            "1" => self.register(Role::Admin),
            "2" => self.login(Role::Admin),
            "3" => self.register(Role::Customer),
            "4" => self.login(Role::Customer),
            "5" => Ok(Flow::Quit),
            other => self.invalid_choice(other),
        }
    }

    fn register(&mut self, role: Role) -> Result<Flow> {
        let username = ask!(self, "Username: ");
        let password = match self.prompt_secret("Password: ")? {
            Some(p) => p,
            None => return Ok(Flow::Quit),
        };
        let result = self.api.register(role, &username, &password);
        if let Some(result) = self.check(result)? {
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    fn login(&mut self, role: Role) -> Result<Flow> {
        let username = ask!(self, "Username: ");
        let password = match self.prompt_secret("Password: ")? {
            Some(p) => p,
            None => return Ok(Flow::Quit),
        };
        let result = self.api.login(role, &username, &password);
        let Some(result) = self.check(result)? else {
            return Ok(Flow::Stay);
        };
        self.show_messages(&result)?;
        let Some(session) = result.session else {
            return Ok(Flow::Stay);
        };

        let flow = match session.role {
            Role::Admin => self.admin_menu(&session)?,
            Role::Customer => self.customer_menu(&session)?,
        };
        debug!(username = %session.username, "session ended");
        Ok(match flow {
            Flow::Quit => Flow::Quit,
            _ => Flow::Stay,
        })
    }

    // --- Admin ---

    fn admin_menu(&mut self, session: &Session) -> Result<Flow> {
        loop {
            self.heading(&format!("Admin menu ({})", session.username))?;
            self.options(&[
                "Add product",
                "Update product",
                "Remove product",
                "View inventory",
                "View orders",
                "Sales report",
                "Save",
                "Logout",
            ])?;
            let choice = ask!(self, "Choice: ");
            let flow = match choice.trim() {
                "1" => self.add_product()?,
                "2" => self.update_product()?,
                "3" => self.remove_product()?,
                "4" => self.view_inventory()?,
                "5" => self.view_orders()?,
                "6" => self.sales_report()?,
                "7" => self.save()?,
                "8" => Flow::Back,
                other => self.invalid_choice(other)?,
            };
            match flow {
                Flow::Stay => continue,
                other => return Ok(other),
            }
        }
    }

    fn add_product(&mut self) -> Result<Flow> {
        let id = ask!(self, "Product id: ");
        let name = ask!(self, "Name: ");
        let raw = ask!(self, "Quantity: ");
        let Some(quantity) = self.parse_number::<u32>("quantity", &raw)? else {
            return Ok(Flow::Stay);
        };
        let raw = ask!(self, "Price: ");
        let Some(price) = self.parse_number::<f64>("price", &raw)? else {
            return Ok(Flow::Stay);
        };

        let result = self.api.add_product(&id, &name, quantity, price);
        if let Some(result) = self.check(result)? {
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    fn update_product(&mut self) -> Result<Flow> {
        let id = ask!(self, "Product id: ");
        let current = self.api.warehouse().inventory().get(id.trim()).cloned();
        let Some(current) = self.check(current)? else {
            return Ok(Flow::Stay);
        };
        write!(self.output, "{}", render_products(std::slice::from_ref(&current)))?;

        self.options(&["Name", "Quantity", "Price"])?;
        let field = ask!(self, "Field to update: ");
        let update = match field.trim() {
            "1" => ProductUpdate::default().name(ask!(self, "New name: ")),
            "2" => {
                let raw = ask!(self, "New quantity: ");
                match self.parse_number::<u32>("quantity", &raw)? {
                    Some(q) => ProductUpdate::default().quantity(q),
                    None => return Ok(Flow::Stay),
                }
            }
            "3" => {
                let raw = ask!(self, "New price: ");
                match self.parse_number::<f64>("price", &raw)? {
                    Some(p) => ProductUpdate::default().price(p),
                    None => return Ok(Flow::Stay),
                }
            }
            other => return self.invalid_choice(other),
        };

        let result = self.api.update_product(&current.id, &update);
        if let Some(result) = self.check(result)? {
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    fn remove_product(&mut self) -> Result<Flow> {
        let id = ask!(self, "Product id: ");
        let result = self.api.remove_product(&id);
        if let Some(result) = self.check(result)? {
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    fn view_orders(&mut self) -> Result<Flow> {
        let result = self.api.list_orders();
        if let Some(result) = self.check(result)? {
            write!(
                self.output,
                "{}",
                render_orders(&result.listed_orders, Utc::now())
            )?;
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    fn sales_report(&mut self) -> Result<Flow> {
        self.options(&["Last week", "Last month", "Last year"])?;
        let choice = ask!(self, "Time frame: ");
        let timeframe = match choice.trim() {
            "1" => TimeFrame::LastWeek,
            "2" => TimeFrame::LastMonth,
            "3" => TimeFrame::LastYear,
            other => match TimeFrame::from_str(other) {
                Ok(frame) => frame,
                Err(_) => return self.invalid_choice(other),
            },
        };

        let result = self.api.sales_report(timeframe);
        if let Some(result) = self.check(result)? {
            if let Some(report) = &result.report {
                write!(self.output, "{}", render_report(report))?;
            }
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    fn save(&mut self) -> Result<Flow> {
        let result = self.api.save();
        if let Some(result) = self.check(result)? {
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    // --- Customer ---

    fn customer_menu(&mut self, session: &Session) -> Result<Flow> {
        loop {
            self.heading(&format!("Customer menu ({})", session.username))?;
            self.options(&["View inventory", "Place order", "Logout"])?;
            let choice = ask!(self, "Choice: ");
            let flow = match choice.trim() {
                "1" => self.view_inventory()?,
                "2" => self.place_order()?,
                "3" => Flow::Back,
                other => self.invalid_choice(other)?,
            };
            match flow {
                Flow::Stay => continue,
                other => return Ok(other),
            }
        }
    }

    fn place_order(&mut self) -> Result<Flow> {
        let mut draft = self.api.new_draft();
        writeln!(
            self.output,
            "{}",
            "Add items one at a time. Leave the product id empty to finish.".dimmed()
        )?;
        loop {
            let id = ask!(self, "Product id: ");
            let id = id.trim();
            if id.is_empty() {
                break;
            }
            let raw = ask!(self, "Quantity: ");
            let Some(quantity) = self.parse_number::<u32>("quantity", &raw)? else {
                continue;
            };
            let added = self.api.add_to_draft(&mut draft, OrderLine::new(id, quantity));
            if self.check(added)?.is_some() {
                writeln!(self.output, "{}", format!("Added {} x{}", id, quantity).green())?;
            }
        }

        if draft.is_empty() {
            writeln!(self.output, "{}", "No items, order cancelled.".yellow())?;
            return Ok(Flow::Stay);
        }

        let result = self.api.place_draft(draft);
        if let Some(result) = self.check(result)? {
            if let Some(invoice) = &result.invoice {
                write!(self.output, "{}", render_invoice(invoice))?;
            }
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    // --- Shared ---

    fn view_inventory(&mut self) -> Result<Flow> {
        let term = ask!(self, "Search (leave empty for all): ");
        let result = if term.trim().is_empty() {
            self.api.list_products()
        } else {
            self.api.search_products(&term)
        };
        if let Some(result) = self.check(result)? {
            write!(self.output, "{}", render_products(&result.listed_products))?;
            self.show_messages(&result)?;
        }
        Ok(Flow::Stay)
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", title.bold())?;
        Ok(())
    }

    fn options(&mut self, labels: &[&str]) -> Result<()> {
        for (i, label) in labels.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, label)?;
        }
        Ok(())
    }

    fn invalid_choice(&mut self, choice: &str) -> Result<Flow> {
        writeln!(
            self.output,
            "{}",
            format!("Invalid choice: '{}'", choice).red()
        )?;
        Ok(Flow::Stay)
    }

    /// `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt_secret(&mut self, label: &str) -> Result<Option<String>> {
        if !self.secrets_from_terminal {
            return self.prompt(label);
        }
        let term = Term::stderr();
        term.write_str(label)?;
        Ok(Some(term.read_secure_line()?))
    }

    fn parse_number<T: FromStr>(&mut self, label: &str, raw: &str) -> Result<Option<T>> {
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(
                    self.output,
                    "{}",
                    format!("Invalid {}: '{}'", label, raw.trim()).red()
                )?;
                Ok(None)
            }
        }
    }

    /// Prints a failed operation's error and carries on; only output failures propagate.
    fn check<T>(&mut self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                writeln!(self.output, "{}", format!("Error: {}", e).red())?;
                Ok(None)
            }
        }
    }

    fn show_messages(&mut self, result: &CmdResult) -> Result<()> {
        write!(self.output, "{}", render_messages(&result.messages))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot::config::DepotConfig;
    use depot::store::memory::InMemoryWarehouse;
    use depot::store::mem_backend::MemBackend;
    use depot::store::DataFile;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn api() -> (DepotApi<MemBackend>, TempDir) {
        colored::control::set_override(false);
        let temp = TempDir::new().unwrap();
        let api = DepotApi::new(
            InMemoryWarehouse::new(),
            DepotConfig::default(),
            temp.path().to_path_buf(),
        );
        (api, temp)
    }

    fn run_script(api: &mut DepotApi<MemBackend>, lines: &[&str]) -> String {
        let mut script = lines.join("\n");
        script.push('\n');
        let mut output = Vec::new();
        Menu::new(api, Cursor::new(script), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn admin_adds_product_and_exit_saves() {
        let (mut api, _temp) = api();
        let out = run_script(
            &mut api,
            &[
                "1", "root", "pw", // register admin
                "2", "root", "pw", // login admin
                "1", "P1", "Widget", "10", "2.50", // add product
                "4", "", // view inventory
                "8", // logout
                "5", // exit
            ],
        );

        assert!(out.contains("Registered admin 'root'."));
        assert!(out.contains("Welcome, root."));
        assert!(out.contains("Product added: Widget (P1)"));
        assert!(out.contains("Widget"));
        assert!(out.contains("Goodbye."));
        assert_eq!(
            api.warehouse()
                .backend()
                .contents(DataFile::Inventory)
                .unwrap(),
            "P1,Widget,10,2.5\n"
        );
    }

    #[test]
    fn customer_places_order_with_invoice() {
        let (mut api, _temp) = api();
        api.add_product("P1", "Widget", 10, 2.5).unwrap();
        api.register(Role::Customer, "sam", "pw").unwrap();

        let out = run_script(
            &mut api,
            &[
                "4", "sam", "pw", // login customer
                "2", // place order
                "P1", "20", // too many, skipped
                "NOPE", "1", // unknown, skipped
                "P1", "x", // not a number
                "P1", "3", // fits
                "", // finish
                "3", // logout
                "5", // exit
            ],
        );

        assert!(out.contains("Insufficient stock for P1"));
        assert!(out.contains("Product not found: NOPE"));
        assert!(out.contains("Invalid quantity: 'x'"));
        assert!(out.contains("Added P1 x3"));
        assert!(out.contains("Invoice for order O1"));
        assert!(out.contains("Order O1 placed: 3 units, total 7.50"));

        let inventory = api
            .warehouse()
            .backend()
            .contents(DataFile::Inventory)
            .unwrap();
        assert_eq!(inventory, "P1,Widget,7,2.5\n");
        let orders = api.warehouse().backend().contents(DataFile::Orders).unwrap();
        assert!(orders.starts_with("O1,"));
    }

    #[test]
    fn empty_order_is_cancelled() {
        let (mut api, _temp) = api();
        api.register(Role::Customer, "sam", "pw").unwrap();
        let out = run_script(&mut api, &["4", "sam", "pw", "2", "", "3", "5"]);
        assert!(out.contains("No items, order cancelled."));
        assert!(api.list_orders().unwrap().listed_orders.is_empty());
    }

    #[test]
    fn repeated_failures_lock_the_account() {
        let (mut api, _temp) = api();
        api.register(Role::Admin, "root", "pw").unwrap();
        let out = run_script(
            &mut api,
            &[
                "2", "root", "bad", //
                "2", "root", "bad", //
                "2", "root", "bad", //
                "2", "root", "pw", // still locked
                "5",
            ],
        );
        assert!(out.contains("2 attempts left"));
        assert!(out.contains("1 attempts left"));
        assert_eq!(out.matches("Account locked until").count(), 2);
        assert!(!out.contains("Welcome"));
    }

    #[test]
    fn admin_update_remove_orders_and_report() {
        let (mut api, _temp) = api();
        api.add_product("P1", "Widget", 10, 2.5).unwrap();
        api.add_product("P2", "Gadget", 5, 1.0).unwrap();
        api.place_order(&["P1:4"]).unwrap();
        api.register(Role::Admin, "root", "pw").unwrap();

        let out = run_script(
            &mut api,
            &[
                "2", "root", "pw", //
                "2", "P2", "3", "1.75", // update price
                "3", "P2", // remove
                "5", // view orders
                "6", "1", // weekly report
                "9", // invalid
                "7", // save
                "8", "5",
            ],
        );

        assert!(out.contains("Product updated: Gadget (P2), 5 in stock at 1.75"));
        assert!(out.contains("Product removed: Gadget (P2)"));
        assert!(out.contains("(4 units)"));
        assert!(out.contains("Sales report: last week"));
        assert!(out.contains("Total units sold:  4"));
        assert!(out.contains("Invalid choice: '9'"));
        assert!(out.contains("Saved 1 products"));
        assert!(!api.has_unsaved_changes());
    }

    #[test]
    fn end_of_input_saves() {
        let (mut api, _temp) = api();
        api.register(Role::Admin, "root", "pw").unwrap();
        // Input stops in the middle of adding a product
        let out = run_script(&mut api, &["2", "root", "pw", "1", "P9", "Bolt", "3", "0.1"]);
        assert!(out.contains("Product added: Bolt (P9)"));
        assert!(out.contains("Goodbye."));
        assert!(api
            .warehouse()
            .backend()
            .contents(DataFile::Inventory)
            .unwrap()
            .contains("P9,Bolt,3,0.1"));
    }

    #[test]
    fn customer_searches_inventory() {
        let (mut api, _temp) = api();
        api.add_product("P1", "Widget", 10, 2.5).unwrap();
        api.add_product("P2", "Gadget", 5, 1.0).unwrap();
        api.register(Role::Customer, "sam", "pw").unwrap();
        let out = run_script(&mut api, &["4", "sam", "pw", "1", "gadg", "1", "zzz", "3", "5"]);
        assert!(out.contains("Gadget"));
        assert!(out.contains("No products match 'zzz'."));
    }
}
