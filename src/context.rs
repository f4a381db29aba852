use std::path::PathBuf;
use std::rc::Rc;

use tracing::info;

use crate::cache::TicketCache;
use crate::config::Settings;
use crate::error::AppResult;
use crate::fence::FenceRenderer;
use crate::infra::shortcut::{DEFAULT_BASE_URL, TicketClient};
use crate::inline::InlineDecorations;
use crate::render::Presenter;
use crate::services::HttpTransport;

/// Everything the editor extension shares between its renderers.
///
/// The cache lives as long as the context; the client, presenter and
/// renderers are rebuilt when the API token changes.
pub struct PluginContext {
    settings: Settings,
    settings_path: PathBuf,
    transport: Rc<dyn HttpTransport>,
    base_url: String,
    cache: Rc<TicketCache>,
    client: Rc<TicketClient>,
    presenter: Rc<Presenter>,
    fence: FenceRenderer,
    inline: InlineDecorations,
}

impl PluginContext {
    /// Must be called from inside a `tokio::task::LocalSet`.
    pub fn load(settings: Settings, settings_path: PathBuf, transport: Rc<dyn HttpTransport>) -> Self {
        Self::with_base_url(settings, settings_path, transport, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        settings: Settings,
        settings_path: PathBuf,
        transport: Rc<dyn HttpTransport>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        let cache = Rc::new(TicketCache::new());
        let client = TicketClient::connect_to(base_url.as_str(), settings.api_token(), Rc::clone(&transport));
        let presenter = Rc::new(Presenter::new(Rc::clone(&client)));
        let fence = FenceRenderer::new(Rc::clone(&presenter), Rc::clone(&client), Rc::clone(&cache));
        let inline = InlineDecorations::new(Rc::clone(&presenter), Rc::clone(&client), Rc::clone(&cache));

        Self {
            settings,
            settings_path,
            transport,
            base_url,
            cache,
            client,
            presenter,
            fence,
            inline,
        }
    }

    /// Stores a new token and rebinds every renderer to a fresh client.
    pub fn update_api_token(&mut self, token: impl Into<String>) -> AppResult<()> {
        self.settings.shortcut_api_key = token.into();
        self.settings.save_to(&self.settings_path)?;
        self.reconnect();
        info!("api token updated, renderers rebuilt");
        Ok(())
    }

    fn reconnect(&mut self) {
        self.client = TicketClient::connect_to(
            self.base_url.as_str(),
            self.settings.api_token(),
            Rc::clone(&self.transport),
        );
        self.presenter = Rc::new(Presenter::new(Rc::clone(&self.client)));
        self.fence = FenceRenderer::new(
            Rc::clone(&self.presenter),
            Rc::clone(&self.client),
            Rc::clone(&self.cache),
        );
        self.inline.rebuild(
            Rc::clone(&self.presenter),
            Rc::clone(&self.client),
            Rc::clone(&self.cache),
        );
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &Rc<TicketCache> {
        &self.cache
    }

    pub fn client(&self) -> &Rc<TicketClient> {
        &self.client
    }

    pub fn presenter(&self) -> &Rc<Presenter> {
        &self.presenter
    }

    pub fn fence(&self) -> &FenceRenderer {
        &self.fence
    }

    pub fn inline(&self) -> &InlineDecorations {
        &self.inline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedTicket;
    use crate::render::{Node, NodeHandle};
    use crate::test_support::{StubTransport, run_local, sample_ticket, settle};

    #[tokio::test]
    async fn token_update_persists_and_reaches_new_requests() {
        run_local(async {
            let dir = tempfile::tempdir().expect("tempdir");
            let path = dir.path().join("settings.json");
            let transport = Rc::new(StubTransport::new());
            let settings = Settings {
                shortcut_api_key: "old".to_string(),
                token_override: None,
            };
            let mut ctx =
                PluginContext::with_base_url(settings, path.clone(), transport.clone(), "https://api.test");
            ctx.cache()
                .add("5", CachedTicket::Ticket(sample_ticket("5", 1)));

            ctx.update_api_token("new").expect("update token");
            assert_eq!(Settings::load_from(&path).expect("load").shortcut_api_key, "new");
            assert!(ctx.cache().get("5").is_some());

            let target = NodeHandle::new(Node::div("block"));
            ctx.fence().render("5\n6", &target);
            settle().await;

            let story_calls: Vec<_> = transport
                .calls()
                .into_iter()
                .filter(|request| request.url.contains("/stories/"))
                .collect();
            assert_eq!(story_calls.len(), 1);
            assert!(story_calls[0].url.ends_with("/stories/6"));
            assert_eq!(story_calls[0].header_value("Shortcut-Token"), Some("new"));
        })
        .await;
    }
}
