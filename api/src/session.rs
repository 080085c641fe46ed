//! Admin login and the session check that gates every mutation.

use crate::LeagueError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "admin_session";
pub const SESSION_TTL_HOURS: i64 = 24;
pub const ADMIN_ROLE: &str = "super_admin";

pub const ADMIN_EMAIL_ENV: &str = "LEAGUE_ADMIN_EMAIL";
pub const ADMIN_PASSWORD_ENV: &str = "LEAGUE_ADMIN_PASSWORD";
pub const ADMIN_NAME_ENV: &str = "LEAGUE_ADMIN_NAME";

pub fn session_ttl() -> Duration {
    Duration::hours(SESSION_TTL_HOURS)
}

/// Decides whether an email/password pair may administer the league.
pub trait CredentialVerifier {
    fn verify(&self, email: &str, password: &str) -> bool;

    /// Display name for a known admin email.
    fn lookup(&self, email: &str) -> Option<String>;
}

/// A single configured admin account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl StaticCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>, name: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into(), name: name.into() }
    }

    /// Reads the account from the environment. Returns `None` unless both
    /// email and password are set, in which case nobody can log in.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var(ADMIN_EMAIL_ENV).ok().filter(|v| !v.trim().is_empty())?;
        let password = std::env::var(ADMIN_PASSWORD_ENV).ok().filter(|v| !v.is_empty())?;
        let name = std::env::var(ADMIN_NAME_ENV).unwrap_or_else(|_| "League Admin".to_owned());
        Some(Self::new(email.trim(), password, name))
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, email: &str, password: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.email) && password == self.password
    }

    fn lookup(&self, email: &str) -> Option<String> {
        email.eq_ignore_ascii_case(&self.email).then(|| self.name.clone())
    }
}

/// Rejects every login. Used when no admin account is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialVerifier for NoCredentials {
    fn verify(&self, _email: &str, _password: &str) -> bool {
        false
    }

    fn lookup(&self, _email: &str) -> Option<String> {
        None
    }
}

impl<V: CredentialVerifier + ?Sized> CredentialVerifier for Box<V> {
    fn verify(&self, email: &str, password: &str) -> bool {
        (**self).verify(email, password)
    }

    fn lookup(&self, email: &str) -> Option<String> {
        (**self).lookup(email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub email: String,
    pub name: String,
    pub role: String,
    pub login_time: DateTime<Utc>,
}

impl AdminSession {
    /// Cookie value: `role|unix-seconds|email`.
    pub fn token(&self) -> String {
        format!("{}|{}|{}", self.role, self.login_time.timestamp(), self.email)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.login_time + session_ttl()
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.role == ADMIN_ROLE && now >= self.login_time && now - self.login_time <= session_ttl()
    }
}

pub struct SessionGuard<V> {
    verifier: V,
}

impl<V: CredentialVerifier> SessionGuard<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminSession, LeagueError> {
        if !self.verifier.verify(email, password) {
            warn!("rejected admin login for {email}");
            return Err(LeagueError::InvalidCredentials);
        }
        let email = email.trim().to_owned();
        let name = self.verifier.lookup(&email).unwrap_or_else(|| email.clone());
        info!("admin {email} logged in");
        Ok(AdminSession {
            email,
            name,
            role: ADMIN_ROLE.to_owned(),
            // Tokens carry whole seconds.
            login_time: Utc.timestamp_opt(now.timestamp(), 0).single().unwrap_or(now),
        })
    }

    /// Decode a token back into the session it was issued for.
    pub fn parse_token(&self, token: &str) -> Option<AdminSession> {
        let mut parts = token.splitn(3, '|');
        let role = parts.next()?;
        let secs: i64 = parts.next()?.parse().ok()?;
        let email = parts.next()?;
        let name = self.verifier.lookup(email)?;
        let login_time = Utc.timestamp_opt(secs, 0).single()?;
        Some(AdminSession {
            email: email.to_owned(),
            name,
            role: role.to_owned(),
            login_time,
        })
    }

    pub fn is_admin_session(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.parse_token(token).is_some_and(|s| s.is_valid_at(now))
    }

    pub fn authorize(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<(), LeagueError> {
        match token {
            Some(token) if self.is_admin_session(token, now) => Ok(()),
            _ => Err(LeagueError::UnauthorizedMutation),
        }
    }
}

/// Pull the session token out of a `Cookie` header.
pub fn session_token_from_cookies(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}
