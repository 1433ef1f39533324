//! Session fixtures.
//!
//! [`BrowserFixture`] owns the browser session a test runs against. Each
//! test calls `setup` before it starts and `teardown` after it ends; with
//! [`BrowserMode::Reuse`] one session serves every test and is reset to the
//! initial URL in between, with [`BrowserMode::New`] every test gets a fresh
//! one. Wrap a fixture in a [`FixtureScope`] to have teardown run on drop.

use crate::config::{BrowserMode, SessionConfig};
use crate::driver::Session;
use crate::result::{PagewaitError, PagewaitResult};
use std::ops::{Deref, DerefMut};
use std::time::Instant;
use uuid::Uuid;

/// Something with per-test setup and teardown
pub trait Fixture {
    /// Prepare for the next test.
    ///
    /// # Errors
    ///
    /// Whatever prevented setup.
    fn setup(&mut self) -> PagewaitResult<()>;

    /// Clean up after a test.
    ///
    /// # Errors
    ///
    /// Whatever prevented teardown.
    fn teardown(&mut self) -> PagewaitResult<()>;

    /// Fixture name for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<X: Fixture + ?Sized> Fixture for &mut X {
    fn setup(&mut self) -> PagewaitResult<()> {
        (**self).setup()
    }

    fn teardown(&mut self) -> PagewaitResult<()> {
        (**self).teardown()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Opens browser sessions for a configuration.
///
/// Any `Fn(&SessionConfig) -> PagewaitResult<S>` closure is a factory.
pub trait SessionFactory {
    /// Session type produced
    type Session: Session;

    /// Open a session.
    ///
    /// # Errors
    ///
    /// Whatever prevented the browser from starting.
    fn create(&self, config: &SessionConfig) -> PagewaitResult<Self::Session>;
}

impl<S, F> SessionFactory for F
where
    S: Session,
    F: Fn(&SessionConfig) -> PagewaitResult<S>,
{
    type Session = S;

    fn create(&self, config: &SessionConfig) -> PagewaitResult<S> {
        self(config)
    }
}

#[derive(Debug, Clone, Copy)]
struct TestRun {
    id: Uuid,
    started: Instant,
}

/// Per-test browser session management
pub struct BrowserFixture<F: SessionFactory> {
    factory: F,
    config: SessionConfig,
    session: Option<F::Session>,
    run: Option<TestRun>,
    sessions_created: usize,
}

impl<F: SessionFactory> std::fmt::Debug for BrowserFixture<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserFixture")
            .field("browser", &self.config.browser)
            .field("mode", &self.config.mode)
            .field("has_session", &self.session.is_some())
            .field("sessions_created", &self.sessions_created)
            .finish_non_exhaustive()
    }
}

impl<F: SessionFactory> BrowserFixture<F> {
    /// Create a fixture; no session is opened until `setup`
    #[must_use]
    pub const fn new(factory: F, config: SessionConfig) -> Self {
        Self {
            factory,
            config,
            session: None,
            run: None,
            sessions_created: 0,
        }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The current session.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::FixtureError`] before the first `setup`.
    pub fn session(&self) -> PagewaitResult<&F::Session> {
        self.session.as_ref().ok_or_else(|| PagewaitError::FixtureError {
            message: "no browser session; call setup first".to_string(),
        })
    }

    /// Correlation id of the running test, if one is running
    #[must_use]
    pub fn run_id(&self) -> Option<Uuid> {
        self.run.map(|run| run.id)
    }

    /// Number of sessions opened so far
    #[must_use]
    pub const fn sessions_created(&self) -> usize {
        self.sessions_created
    }

    /// Quit the session, if one is open.
    ///
    /// # Errors
    ///
    /// Session errors from quitting.
    pub fn close(&mut self) -> PagewaitResult<()> {
        if let Some(session) = self.session.take() {
            tracing::info!(session_id = %session.session_id(), "closing browser session");
            session.quit()?;
        }
        Ok(())
    }

    fn open_session(&mut self) -> PagewaitResult<()> {
        if let Some(previous) = self.session.take() {
            if let Err(err) = previous.quit() {
                tracing::warn!(error = %err, "failed to quit previous browser session");
            }
        }
        let started = Instant::now();
        let session = self.factory.create(&self.config)?;
        self.sessions_created += 1;
        tracing::info!(
            browser = %self.config.browser,
            version = self.config.browser_version.as_deref().unwrap_or("any"),
            platform = self.config.platform.as_deref().unwrap_or("any"),
            remote = self.config.is_remote(),
            session_id = %session.session_id(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "browser session created"
        );
        self.session = Some(session);
        Ok(())
    }
}

impl<F: SessionFactory> Fixture for BrowserFixture<F> {
    fn setup(&mut self) -> PagewaitResult<()> {
        let run = TestRun {
            id: Uuid::new_v4(),
            started: Instant::now(),
        };
        tracing::info!(run_id = %run.id, mode = %self.config.mode, "test setup");

        match (&self.session, self.config.mode) {
            (Some(session), BrowserMode::Reuse) => {
                session.navigate(&self.config.initial_url)?;
            }
            _ => self.open_session()?,
        }
        self.run = Some(run);
        Ok(())
    }

    fn teardown(&mut self) -> PagewaitResult<()> {
        if let Some(run) = self.run.take() {
            tracing::info!(
                run_id = %run.id,
                elapsed_ms = u64::try_from(run.started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "test teardown"
            );
        }
        if let (Some(hub), Some(session)) = (&self.config.hub_uri, &self.session) {
            tracing::info!(session_id = %session.session_id(), %hub, "remote session finished test");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "BrowserFixture"
    }
}

impl<F: SessionFactory> Drop for BrowserFixture<F> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::debug!(error = %err, "ignoring quit failure on drop");
        }
    }
}

/// Runs `setup` on creation and `teardown` on drop
#[derive(Debug)]
pub struct FixtureScope<X: Fixture> {
    fixture: X,
    torn_down: bool,
}

impl<X: Fixture> FixtureScope<X> {
    /// Set the fixture up and guard it.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::FixtureError`] wrapping the setup failure.
    pub fn new(mut fixture: X) -> PagewaitResult<Self> {
        fixture.setup().map_err(|e| PagewaitError::FixtureError {
            message: format!("Fixture '{}' setup failed: {e}", fixture.name()),
        })?;
        Ok(Self {
            fixture,
            torn_down: false,
        })
    }

    /// Tear down now, reporting failure instead of logging it.
    ///
    /// # Errors
    ///
    /// [`PagewaitError::FixtureError`] wrapping the teardown failure.
    pub fn finish(mut self) -> PagewaitResult<()> {
        self.torn_down = true;
        self.fixture.teardown().map_err(|e| PagewaitError::FixtureError {
            message: format!("Fixture '{}' teardown failed: {e}", self.fixture.name()),
        })
    }
}

impl<X: Fixture> Deref for FixtureScope<X> {
    type Target = X;

    fn deref(&self) -> &X {
        &self.fixture
    }
}

impl<X: Fixture> DerefMut for FixtureScope<X> {
    fn deref_mut(&mut self) -> &mut X {
        &mut self.fixture
    }
}

impl<X: Fixture> Drop for FixtureScope<X> {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }
        if let Err(err) = self.fixture.teardown() {
            tracing::warn!(fixture = self.fixture.name(), error = %err, "teardown failed during drop");
        }
    }
}
