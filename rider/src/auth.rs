use colored::Color;
use common::errors::RiderError;
use common::logger::Logger;
use common::network::RiderGateway;
use common::session::{Session, SessionStore};
use std::sync::Arc;

/// Owns the session lifecycle: login, restore on start-up, logout.
pub struct AuthFlow {
    gateway: Arc<dyn RiderGateway>,
    sessions: SessionStore,
    logger: Logger,
}

impl AuthFlow {
    pub fn new(gateway: Arc<dyn RiderGateway>, sessions: SessionStore) -> Self {
        Self {
            gateway,
            sessions,
            logger: Logger::new("Session", Color::Magenta),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Logs in and mirrors the new session into the store.
    pub async fn login(&self, phone: &str, password: &str) -> Result<Session, RiderError> {
        let phone = phone.trim();
        if phone.is_empty() || password.is_empty() {
            return Err(RiderError::Validation(
                "phone and password are required".to_string(),
            ));
        }
        let response = self.gateway.login(phone, password).await?;
        let session = Session {
            token: response.token,
            profile: response.rider,
        };
        self.sessions.save(&session)?;
        self.logger
            .info(format!("Logged in as {}", session.profile.name));
        Ok(session)
    }

    pub fn restore(&self) -> Result<Option<Session>, RiderError> {
        let session = self.sessions.load()?;
        if let Some(session) = &session {
            self.logger
                .info(format!("Restored session of {}", session.profile.name));
        }
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), RiderError> {
        self.sessions.clear()?;
        self.logger.info("Logged out");
        Ok(())
    }
}
