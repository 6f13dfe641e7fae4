//! Telegram bot root module

mod cmd;
mod config;
mod owner;
mod quiz;
mod session;

use crate::prelude::*;
use crate::util::DynResult;
use crate::{gemini, ErrorKind, Result};
use dptree::di::DependencyMap;
use futures::future::BoxFuture;
use futures::prelude::*;
use metrics::increment_counter;
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::adaptors::{CacheMe, Throttle, Trace};
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{UpdateKind, User};
use teloxide::update_listeners::{webhooks, UpdateListener as _};
use teloxide::utils::command::BotCommands;

pub(crate) use config::*;

pub(crate) type Bot = Trace<CacheMe<Throttle<teloxide::Bot>>>;

/// Downloads are only implemented by the bare bot, not by the adaptors
fn bare_bot(bot: &Bot) -> &teloxide::Bot {
    bot.inner().inner().inner()
}

fn create_bot(token: String) -> Bot {
    teloxide::Bot::new(token)
        .throttle(Default::default())
        .cache_me()
        .trace(teloxide::adaptors::trace::Settings::all())
}

pub(crate) struct Ctx {
    bot: Bot,
    cfg: Arc<Config>,
    gemini: gemini::Client,
    sessions: SessionStore,
}

pub(crate) struct RunBotOptions {
    pub(crate) tg_cfg: Config,
    pub(crate) gemini: gemini::Client,
}

pub(crate) async fn run_bot(opts: RunBotOptions) -> Result {
    let mut di = DependencyMap::new();

    let bot = create_bot(opts.tg_cfg.token.clone());

    let cfg = Arc::new(opts.tg_cfg);

    di.insert(Arc::new(Ctx {
        bot: bot.clone(),
        cfg: cfg.clone(),
        gemini: opts.gemini,
        sessions: SessionStore::default(),
    }));

    info!("Starting bot...");

    bot.set_my_commands(cmd::Cmd::bot_commands()).await?;

    // The owner check goes first, so that the rest of the branches
    // are only ever reached by the owner
    let messages = Update::filter_message()
        .branch(dptree::filter(owner::filter_not_owner).endpoint(endpoint(owner::refuse)))
        .branch(
            dptree::entry()
                .filter_command::<cmd::Cmd>()
                .endpoint(cmd::handle()),
        )
        .branch(dptree::filter(quiz::filter_document).endpoint(endpoint(quiz::handle_document)))
        .branch(
            dptree::filter(quiz::filter_text)
                .branch(
                    dptree::filter(quiz::filter_pending)
                        .endpoint(endpoint(quiz::handle_question_count)),
                )
                .branch(dptree::endpoint(endpoint(quiz::handle_stray_text))),
        );

    let handler = dptree::entry()
        .inspect(|update: Update| {
            increment_counter!("tg_updates_total", "kind" => update_kind(&update));
        })
        .branch(messages);

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(di)
        // Stickers, photos and other kinds of updates are ignored
        .default_handler(|_| std::future::ready(()))
        .enable_ctrlc_handler()
        .build();

    match &cfg.webhook_url {
        None => {
            info!("Receiving updates via long polling");
            dispatcher.dispatch().await;
        }
        Some(base_url) => {
            let url = webhook_endpoint(base_url);
            let address: SocketAddr = ([0, 0, 0, 0], cfg.webhook_port).into();

            info!(%url, %address, "Receiving updates via webhook");

            let server = axum::Server::try_bind(&address)
                .fatal_ctx(|| format!("Failed to bind the webhook server to {address}"))?;

            let (mut listener, stop_flag, router) =
                webhooks::axum_to_router(bot, webhooks::Options::new(address, url)).await?;

            let stop_token = listener.stop_token();
            let app = with_liveness_route(router);

            tokio::spawn(async move {
                let result = server
                    .serve(app.into_make_service())
                    .with_graceful_shutdown(stop_flag)
                    .await;

                if let Err(err) = result {
                    error!(err = tracing_err(&err), "Webhook server failed");
                    stop_token.stop();
                }
            });

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    info!("Bot stopped");

    Ok(())
}

/// Wraps a message handler with a logging span and error reporting
fn endpoint<F, Fut>(handler: F) -> impl Fn(Arc<Ctx>, Message) -> BoxFuture<'static, DynResult>
where
    F: Fn(Arc<Ctx>, Message) -> Fut + Send + Sync + Copy + 'static,
    Fut: Future<Output = Result> + Send + 'static,
{
    move |ctx, msg| {
        let span = info_span!(
            "handle_message",
            sender = msg.from().map(User::debug_id).as_deref(),
            chat = %msg.chat.debug_id(),
        );

        let fut = async move {
            let result = handler(ctx.clone(), msg.clone()).await;
            report_error(&ctx, &msg, result).await
        };

        Box::pin(fut.instrument(span))
    }
}

/// Tells the user that something went wrong, so that they can look up the
/// error in the logs by its id.
async fn report_error(ctx: &Ctx, msg: &Message, result: Result) -> DynResult {
    let Err(err) = &result else {
        return Ok(());
    };

    let span = warn_span!("err", err = tracing_err(err), id = err.id());

    async {
        warn!("Message handler returned an error");

        let what = match err.kind() {
            ErrorKind::Tg { .. } | ErrorKind::TgDownload { .. } => "Telegram request failed",
            _ => "Something went wrong",
        };

        let reply = format!("{what}, the request was aborted. Error id: {}", err.id());

        if let Err(err) = ctx.bot.reply_to(msg, reply).await {
            warn!(
                err = tracing_err(&err),
                "Failed to reply with the error message to the user"
            );
        }
    }
    .instrument(span)
    .await;

    result.map_err(Into::into)
}

fn update_kind(update: &Update) -> &'static str {
    match &update.kind {
        UpdateKind::Message(_) => "message",
        UpdateKind::EditedMessage(_) => "edited_message",
        UpdateKind::ChannelPost(_) => "channel_post",
        UpdateKind::CallbackQuery(_) => "callback_query",
        UpdateKind::MyChatMember(_) => "my_chat_member",
        _ => "other",
    }
}

/// Lets the hosting platform check that the bot is up
fn with_liveness_route(router: axum::Router) -> axum::Router {
    router.route(
        "/",
        axum::routing::get(|| async { "Bot is alive and running!" }),
    )
}

/// Updates are served under the `webhook` path of the public URL
fn webhook_endpoint(base_url: &url::Url) -> url::Url {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("webhook");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn bare_bot_is_reachable_through_adaptors() {
        let bot = create_bot("123:secret".to_owned());
        assert_eq!(bare_bot(&bot).token(), "123:secret");
    }

    #[test_log::test(tokio::test)]
    async fn liveness_route() {
        let server = axum::Server::try_bind(&([127, 0, 0, 1], 0).into())
            .unwrap()
            .serve(with_liveness_route(axum::Router::new()).into_make_service());

        let url = format!("http://{}/", server.local_addr());
        tokio::spawn(server);

        let response = reqwest::get(url).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "Bot is alive and running!");
    }

    #[test]
    fn webhook_endpoint_url() {
        let check = |base: &str, expected: &str| {
            let actual = webhook_endpoint(&base.parse().unwrap());
            assert_eq!(actual.as_str(), expected);
        };

        check("https://quiz.example.com", "https://quiz.example.com/webhook");
        check("https://quiz.example.com/", "https://quiz.example.com/webhook");
        check("https://example.com/bot/", "https://example.com/bot/webhook");
        check("https://example.com:8443/bot", "https://example.com:8443/bot/webhook");
    }
}
