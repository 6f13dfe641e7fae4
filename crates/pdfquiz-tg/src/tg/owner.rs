//! The bot serves a single user. Every message from anyone else ends up here.
use crate::prelude::*;
use crate::tg;
use crate::Result;
use std::sync::Arc;
use teloxide::prelude::*;

const REFUSAL: &str = "Sorry, this bot works exclusively for its owner.";

pub(crate) fn is_owner(cfg: &tg::Config, msg: &Message) -> bool {
    matches!(msg.from(), Some(sender) if sender.id == cfg.owner)
}

pub(crate) fn filter_not_owner(ctx: Arc<tg::Ctx>, msg: Message) -> bool {
    !is_owner(&ctx.cfg, &msg)
}

pub(crate) async fn refuse(ctx: Arc<tg::Ctx>, msg: Message) -> Result {
    info!("Refusing a message from a stranger");
    ctx.bot.reply_to(&msg, REFUSAL).await?;
    Ok(())
}
