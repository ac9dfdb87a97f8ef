use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepotError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product already exists: {0}")]
    DuplicateProduct(String),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid username or password ({attempts_left} attempts left)")]
    AuthFailed { attempts_left: u32 },

    #[error("Account locked until {}", until.format("%Y-%m-%d %H:%M:%S UTC"))]
    AccountLocked { until: DateTime<Utc> },

    #[error("User already registered: {0}")]
    DuplicateUser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, DepotError>;
