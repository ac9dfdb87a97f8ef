use crate::auth::{account_key, checksum, LockoutPolicy};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DepotError, Result};
use crate::model::{validate_field, Credential, LockoutState, Role, Session};
use crate::store::warehouse::Warehouse;
use crate::store::StorageBackend;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub fn register<B: StorageBackend>(
    warehouse: &Warehouse<B>,
    role: Role,
    username: &str,
    password: &str,
) -> Result<CmdResult> {
    let username = username.trim();
    let password = password.trim();
    validate_field("username", username)?;
    validate_field("password", password)?;

    let existing = warehouse.credentials(role)?;
    if existing.records.iter().any(|c| c.username == username) {
        return Err(DepotError::DuplicateUser(username.to_string()));
    }

    warehouse.append_credential(
        role,
        &Credential {
            username: username.to_string(),
            checksum: checksum(password),
        },
    )?;
    info!(%role, username, "user registered");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Registered {} '{}'.",
        role, username
    )));
    Ok(result)
}

/// Checks a username/password pair against the role's credential file.
///
/// Failed attempts are counted per account and persisted after every attempt.
/// Reaching the policy's limit locks the account for the lock duration and
/// starts the count over. Entries with nothing left to enforce (an expired
/// lock, or failures older than the lock duration) are pruned on every save.
pub fn login<B: StorageBackend>(
    warehouse: &Warehouse<B>,
    role: Role,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
    policy: &LockoutPolicy,
) -> Result<CmdResult> {
    let username = username.trim();
    let password = password.trim();
    let key = account_key(role, username);

    let mut lockouts = warehouse.load_lockouts()?;
    let before = lockouts.len();
    lockouts.retain(|_, state| !state.is_stale(now, policy.lock_duration));
    let pruned = lockouts.len() != before;
    if pruned {
        debug!(removed = before - lockouts.len(), "pruned stale lockout entries");
    }

    let mut state = lockouts.get(&key).cloned().unwrap_or_default();
    if let Some(until) = state.locked_until.filter(|_| state.is_locked(now)) {
        if pruned {
            warehouse.save_lockouts(&lockouts)?;
        }
        warn!(account = %key, %until, "login refused, account locked");
        return Err(DepotError::AccountLocked { until });
    }

    let sum = checksum(password);
    let matched = warehouse
        .credentials(role)?
        .records
        .iter()
        .any(|c| c.username == username && c.checksum == sum);

    if matched {
        if lockouts.remove(&key).is_some() || pruned {
            warehouse.save_lockouts(&lockouts)?;
        }
        info!(%role, username, "login succeeded");
        let session = Session {
            username: username.to_string(),
            role,
        };
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::success(format!("Welcome, {}.", username)));
        return Ok(result.with_session(session));
    }

    state.failed_attempts += 1;
    state.last_failure = Some(now);
    let outcome = if state.failed_attempts >= policy.max_failed_attempts {
        let until = now + policy.lock_duration;
        state = LockoutState {
            failed_attempts: 0,
            locked_until: Some(until),
            last_failure: Some(now),
        };
        warn!(account = %key, %until, "too many failed attempts, account locked");
        DepotError::AccountLocked { until }
    } else {
        warn!(account = %key, attempts = state.failed_attempts, "login failed");
        DepotError::AuthFailed {
            attempts_left: policy.max_failed_attempts - state.failed_attempts,
        }
    };
    lockouts.insert(key, state);
    warehouse.save_lockouts(&lockouts)?;
    Err(outcome)
}
