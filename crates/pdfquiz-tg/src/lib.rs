mod config;
mod error;
mod gemini;
mod http;
mod observability;
mod pdf;
mod tg;
mod util;

pub use crate::error::*;
pub use config::*;
pub use observability::*;

#[allow(unused_imports)]
mod prelude {
    pub(crate) use crate::error::prelude::*;
    pub(crate) use crate::http::prelude::*;
    pub(crate) use crate::observability::logging::prelude::*;
    pub(crate) use crate::util::prelude::*;
    pub(crate) use crate::util::temp_file::NamedTempFileExt as _;
}

/// Run the telegram bot processing loop until it is stopped with Ctrl+C
pub async fn run(config: Config) -> Result {
    let gemini = gemini::Client::new(config.gemini);

    let opts = tg::RunBotOptions {
        tg_cfg: config.tg,
        gemini,
    };

    tg::run_bot(opts).await
}
