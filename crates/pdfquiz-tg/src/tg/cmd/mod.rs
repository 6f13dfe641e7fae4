use crate::prelude::*;
use crate::util::DynResult;
use crate::{tg, Result};
use futures::future::BoxFuture;
use itertools::Itertools;
use std::sync::Arc;
use teloxide::macros::BotCommands;
use teloxide::prelude::*;
use teloxide::types::User;

#[derive(BotCommands, Clone, Debug)]
#[command(
    rename_rule = "snake_case",
    description = "Send me a PDF document, and I'll turn it into quiz polls.\n\nCommands:"
)]
pub(crate) enum Cmd {
    #[command(description = "start working with the bot")]
    Start,

    #[command(description = "show this help")]
    Help,

    #[command(description = "forget the PDF that waits for the number of questions")]
    Cancel,

    #[command(description = "display version info")]
    Version,
}

impl Cmd {
    async fn handle(self, ctx: &tg::Ctx, msg: &Message) -> Result {
        match self {
            Cmd::Start => {
                let name = msg
                    .from()
                    .map(|user| user.first_name.as_str())
                    .unwrap_or("there");

                ctx.bot
                    .reply_to(msg, format!("Hi, {name}! Send me a PDF document."))
                    .await?;
            }
            Cmd::Help => {
                ctx.bot.reply_help::<Cmd>(msg).await?;
            }
            Cmd::Cancel => {
                let cancelled = msg
                    .from()
                    .map_or(false, |sender| ctx.sessions.cancel(sender.id));

                let reply = if cancelled {
                    "Cancelled."
                } else {
                    "There is nothing to cancel."
                };

                ctx.bot.reply_to(msg, reply).await?;
            }
            Cmd::Version => {
                ctx.bot.reply_to(msg, version_info()).await?;
            }
        }

        Ok(())
    }
}

fn version_info() -> String {
    /// Generate the key-value pairs with vergen metadata
    macro_rules! vergen_meta {
        ( $($meta_name:literal),* $(,)? ) => {
            [$( ($meta_name, env!(concat!("VERGEN_", $meta_name))) ),*]
        }
    }

    let meta = [("VERSION", env!("CARGO_PKG_VERSION"))]
        .into_iter()
        .chain(vergen_meta![
            "BUILD_TIMESTAMP",
            "RUSTC_CHANNEL",
            "RUSTC_COMMIT_DATE",
            "RUSTC_COMMIT_HASH",
            "RUSTC_HOST_TRIPLE",
            "RUSTC_LLVM_VERSION",
            "RUSTC_SEMVER",
            "CARGO_TARGET_TRIPLE",
            "CARGO_DEBUG",
            "CARGO_OPT_LEVEL",
        ]);

    let max_name_len = meta.clone().map(|(name, _)| name.len()).max().unwrap_or(0);

    meta.format_with("\n", |(name, val), f| {
        let name = name.to_lowercase();
        f(&format_args!("{name:<max_name_len$} = {val}"))
    })
    .to_string()
}

pub(crate) fn handle() -> impl Fn(Arc<tg::Ctx>, Message, Cmd) -> BoxFuture<'static, DynResult> {
    move |ctx, msg, cmd| {
        let span = info_span!(
            "handle_command",
            sender = msg.from().map(User::debug_id).as_deref(),
            chat = %msg.chat.debug_id(),
            cmd = ?cmd,
        );

        let fut = async move {
            debug!("Processing command");
            let result = cmd.handle(&ctx, &msg).await;
            tg::report_error(&ctx, &msg, result).await
        };

        Box::pin(fut.instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::utils::command::BotCommands as _;

    #[test]
    fn parse() {
        assert!(matches!(Cmd::parse("/start", "bot"), Ok(Cmd::Start)));
        assert!(matches!(Cmd::parse("/cancel", "bot"), Ok(Cmd::Cancel)));
        assert!(matches!(Cmd::parse("/version@bot", "bot"), Ok(Cmd::Version)));
        assert!(Cmd::parse("/unknown", "bot").is_err());
    }

    #[test]
    fn version_info_lists_the_package_version() {
        let info = version_info();
        assert!(info.starts_with("version "), "{info}");
        assert!(info.contains(env!("CARGO_PKG_VERSION")), "{info}");
        assert_eq!(info.lines().count(), 11);
    }
}
