use crate::error::{DepotError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters that separate fields in the record files. Text fields may not contain them.
pub const DELIMITERS: [char; 2] = [',', '|'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Checks the fields the record format cannot represent.
    pub fn validate(&self) -> Result<()> {
        validate_field("product id", &self.id)?;
        validate_field("product name", &self.name)?;
        validate_price(self.price)
    }
}

/// Field-wise change to an existing product. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<f64>,
}

impl ProductUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.price.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

impl FromStr for OrderLine {
    type Err = DepotError;

    /// Parses the `ID:QTY` form used on the command line.
    fn from_str(s: &str) -> Result<Self> {
        let (id, qty) = s
            .rsplit_once(':')
            .ok_or_else(|| DepotError::InvalidInput(format!("expected ID:QTY, got '{}'", s)))?;
        let quantity = qty
            .trim()
            .parse::<u32>()
            .map_err(|_| DepotError::InvalidInput(format!("invalid quantity in '{}'", s)))?;
        Ok(OrderLine::new(id.trim(), quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            lines: Vec::new(),
        }
    }

    pub fn with_line(mut self, product_id: impl Into<String>, quantity: u32) -> Self {
        self.lines.push(OrderLine::new(product_id, quantity));
        self
    }

    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DepotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(DepotError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub checksum: String,
}

/// Failed-login bookkeeping for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutState {
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_failure: Option<DateTime<Utc>>,
}

impl LockoutState {
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Nothing left to enforce: not locked, and no failures within `window`.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if self.is_locked(now) {
            return false;
        }
        self.failed_attempts == 0 || self.last_failure.map_or(true, |at| now - at >= window)
    }
}

/// An authenticated user. Handed back by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

pub fn validate_field(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DepotError::InvalidInput(format!("{} cannot be empty", label)));
    }
    if value.contains(DELIMITERS) {
        return Err(DepotError::InvalidInput(format!(
            "{} cannot contain ',' or '|': {}",
            label, value
        )));
    }
    // Records are one per line
    if value.contains(char::is_control) {
        return Err(DepotError::InvalidInput(format!(
            "{} cannot contain line breaks or control characters: {:?}",
            label, value
        )));
    }
    if value.trim() != value {
        return Err(DepotError::InvalidInput(format!(
            "{} cannot start or end with spaces: {:?}",
            label, value
        )));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(DepotError::InvalidInput(format!(
            "price must be a non-negative number, got {}",
            price
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_line_argument() {
        let line: OrderLine = "P1:3".parse().unwrap();
        assert_eq!(line, OrderLine::new("P1", 3));
    }

    #[test]
    fn rejects_order_line_without_quantity() {
        assert!("P1".parse::<OrderLine>().is_err());
        assert!("P1:x".parse::<OrderLine>().is_err());
    }

    #[test]
    fn product_with_delimiter_in_name_is_invalid() {
        let product = Product::new("P1", "Nuts, Bolts", 1, 1.0);
        assert!(matches!(
            product.validate(),
            Err(DepotError::InvalidInput(_))
        ));
    }

    #[test]
    fn line_breaks_and_control_characters_are_invalid() {
        for value in ["Wid\nget", "eve\nroot", "cr\r", "tab\there", "nul\0"] {
            assert!(
                matches!(validate_field("name", value), Err(DepotError::InvalidInput(_))),
                "{:?}",
                value
            );
        }
        assert!(Product::new("P1", "Wid\nget", 1, 1.0).validate().is_err());
        assert!(Product::new("P\r1", "Widget", 1, 1.0).validate().is_err());
    }

    #[test]
    fn surrounding_spaces_are_invalid() {
        assert!(validate_field("name", " Widget").is_err());
        assert!(validate_field("name", "Widget ").is_err());
        validate_field("name", "Big Widget").unwrap();
    }

    #[test]
    fn negative_price_is_invalid() {
        assert!(Product::new("P1", "Widget", 1, -0.5).validate().is_err());
        assert!(Product::new("P1", "Widget", 1, f64::NAN).validate().is_err());
    }

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Customer.to_string(), "customer");
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn lock_expires() {
        let now = Utc::now();
        let state = LockoutState {
            failed_attempts: 0,
            locked_until: Some(now + Duration::minutes(1)),
            last_failure: None,
        };
        assert!(state.is_locked(now));
        assert!(!state.is_locked(now + Duration::minutes(2)));
    }

    #[test]
    fn stale_lockout_states() {
        let now = Utc::now();
        let window = Duration::minutes(15);
        let locked = LockoutState {
            failed_attempts: 0,
            locked_until: Some(now + Duration::minutes(1)),
            last_failure: Some(now),
        };
        assert!(!locked.is_stale(now, window));
        assert!(locked.is_stale(now + Duration::minutes(1), window));

        let recent = LockoutState {
            failed_attempts: 2,
            locked_until: None,
            last_failure: Some(now - Duration::minutes(5)),
        };
        assert!(!recent.is_stale(now, window));
        assert!(recent.is_stale(now + Duration::minutes(10), window));
        assert!(LockoutState::default().is_stale(now, window));
    }
}
