use super::Dispatcher;
use crate::{
    bindings::{JsHost, SessionId},
    session::{
        ConfigurationError, EngineConfiguration, PlaybackConfiguration, PlaybackHost,
        PlaybackSession,
    },
    utils::url::{ManifestUrlError, Url},
    Logger,
};

/// The session playing the attached content, if one, and the identifier routing
/// asynchronous answers to it.
pub(crate) struct SessionSlot<H: PlaybackHost> {
    session: Option<PlaybackSession<H>>,

    /// Identifier of the last session created. Answers carrying another one belong to a
    /// disposed session.
    current_session_id: SessionId,
}

impl<H: PlaybackHost> SessionSlot<H> {
    pub(crate) fn new() -> Self {
        Self {
            session: None,
            current_session_id: 0,
        }
    }

    /// Dispose of the current session if one, then start a new one playing `manifest_url`
    /// on the host built by `new_host` for the new `SessionId`.
    ///
    /// The URL is validated first: if it is rejected, the current session keeps playing.
    pub(crate) fn attach(
        &mut self,
        manifest_url: &str,
        config: &PlaybackConfiguration,
        engine_config: EngineConfiguration,
        new_host: impl FnOnce(SessionId) -> H,
    ) -> Result<SessionId, ManifestUrlError> {
        let url = Url::parse_manifest(manifest_url)?;
        self.detach();
        self.current_session_id = self.current_session_id.wrapping_add(1);
        let session_id = self.current_session_id;
        Logger::lazy_info(&|| format!("Dispatcher: attaching {} (session {})", url, session_id));
        let mut session =
            PlaybackSession::new(new_host(session_id), url, config.clone(), engine_config);
        session.start();
        self.session = Some(session);
        Ok(session_id)
    }

    /// Completely stop playback of the current session if one and free all its associated
    /// resources.
    pub(crate) fn detach(&mut self) {
        if let Some(mut session) = self.session.take() {
            Logger::lazy_info(&|| format!("Dispatcher: detaching {}", session.manifest_url()));
            session.dispose();
        }
    }

    pub(crate) fn current(&self) -> Option<&PlaybackSession<H>> {
        self.session.as_ref()
    }

    /// The current session, for events identified by their engine or timer rather than by
    /// session.
    pub(crate) fn current_mut(&mut self) -> Option<&mut PlaybackSession<H>> {
        self.session.as_mut()
    }

    /// The current session, if `session_id` designates it.
    pub(crate) fn session_for(&mut self, session_id: SessionId) -> Option<&mut PlaybackSession<H>> {
        if session_id != self.current_session_id {
            Logger::lazy_debug(&|| {
                format!("Dispatcher: ignoring event of former session {}", session_id)
            });
            return None;
        }
        self.session.as_mut()
    }
}

impl Dispatcher {
    pub(super) fn attach_core(&mut self, manifest_url: &str) -> Result<SessionId, ManifestUrlError> {
        self.sessions
            .attach(manifest_url, &self.config, self.engine_config, JsHost::new)
    }

    /// Apply `update` to the configuration if the result is valid, for the next sessions and
    /// the current one.
    pub(super) fn update_config(
        &mut self,
        update: impl FnOnce(&mut PlaybackConfiguration),
    ) -> Result<(), ConfigurationError> {
        let mut config = self.config.clone();
        update(&mut config);
        if let Err(err) = config.validate() {
            Logger::lazy_warn(&|| format!("Dispatcher: configuration rejected: {}", err));
            return Err(err);
        }
        if let Some(session) = self.sessions.current_mut() {
            session.update_configuration(config.clone());
        }
        self.config = config;
        Ok(())
    }
}
