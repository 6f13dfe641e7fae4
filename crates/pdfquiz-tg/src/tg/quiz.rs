//! The PDF → quiz conversation: a PDF document, then the number of questions.
use crate::prelude::*;
use crate::util::temp_file::create_temp_file;
use crate::{pdf, tg, Result};
use metrics::increment_counter;
use std::sync::Arc;
use std::time::Duration;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Document, PollType, UserId};
use crate::tg::session::SessionStore;
use tokio::io::AsyncWriteExt;

/// Pause between consecutive polls not to hit the telegram rate limits
const POLL_DELAY: Duration = Duration::from_millis(500);

pub(crate) fn filter_document(msg: Message) -> bool {
    msg.document().is_some()
}

pub(crate) fn filter_text(msg: Message) -> bool {
    msg.text().is_some()
}

/// Text messages are treated as the question count only while a PDF is pending
pub(crate) fn filter_pending(ctx: Arc<tg::Ctx>, msg: Message) -> bool {
    msg.from()
        .map_or(false, |sender| ctx.sessions.is_pending(sender.id))
}

pub(crate) async fn handle_document(ctx: Arc<tg::Ctx>, msg: Message) -> Result {
    let sender = msg.from().fatal_ctx(|| "Document without a sender")?.id;
    let document = msg.document().fatal_ctx(|| "Expected a document")?;

    if !is_pdf(
        document.mime_type.as_ref().map(|mime| mime.essence_str()),
        document.file_name.as_deref(),
    ) {
        ctx.bot
            .reply_to(&msg, "Please send the document in PDF format.")
            .await?;
        return Ok(());
    }

    increment_counter!("quiz_pdfs_received_total");

    ctx.bot
        .reply_to(&msg, "PDF received. Extracting the text...")
        .await?;

    let text = download_and_extract(&ctx, document).await?;

    let Some(chars) = accept_extracted_text(&ctx.sessions, sender, text) else {
        ctx.bot
            .reply_to(&msg, "I couldn't extract any text from this PDF.")
            .await?;
        return Ok(());
    };

    ctx.bot
        .reply_to(
            &msg,
            format!(
                "Extracted {chars} characters of text. How many questions do you want? \
                Send /cancel to abort."
            ),
        )
        .await?;

    Ok(())
}

async fn download_and_extract(ctx: &tg::Ctx, document: &Document) -> Result<String> {
    let file = ctx.bot.get_file(document.file.id.clone()).await?;

    let (mut file_handle, path) = create_temp_file(".pdf").await?.into_tokio();

    tg::bare_bot(&ctx.bot)
        .download_file(&file.path, &mut file_handle)
        .with_duration_log("Downloaded PDF document")
        .await?;

    file_handle
        .flush()
        .await
        .fatal_ctx(|| "Failed to flush the downloaded PDF to disk")?;
    drop(file_handle);

    // The file is deleted once `path` is dropped, even if extraction panics
    Ok(pdf::extract_text(&path).await)
}

pub(crate) async fn handle_question_count(ctx: Arc<tg::Ctx>, msg: Message) -> Result {
    let sender = msg.from().fatal_ctx(|| "Text message without a sender")?.id;

    let Some(count) = msg.text().and_then(parse_question_count) else {
        ctx.bot
            .reply_to(&msg, "Please send a positive whole number.")
            .await?;
        return Ok(());
    };

    let Some(pdf_text) = ctx.sessions.take(sender) else {
        ctx.bot
            .reply_to(&msg, "The PDF text is gone. Please send the PDF again.")
            .await?;
        return Ok(());
    };

    ctx.bot
        .reply_to(&msg, format!("Generating {count} questions..."))
        .await?;

    let blob = ctx.gemini.generate_mcqs(&pdf_text, count).await;

    if blob.is_empty() {
        ctx.bot
            .reply_to(&msg, "Failed to generate questions. Please try again later.")
            .await?;
        return Ok(());
    }

    let output = mcq::parse_blob_verbose(&blob);

    for rejected in &output.rejected {
        increment_counter!("quiz_blocks_rejected_total");
        debug!(
            reason = %rejected.reason,
            block = rejected.block,
            "Dropping a malformed question block"
        );
    }

    let total = output.questions.len();

    info!(
        requested = count,
        parsed = total,
        rejected = output.rejected.len(),
        "Parsed generated questions"
    );

    if total == 0 {
        ctx.bot
            .reply_to(
                &msg,
                "The generated text didn't contain any well-formed questions. Please try again.",
            )
            .await?;
        return Ok(());
    }

    ctx.bot
        .reply_to(&msg, format!("Generated {total} questions. Sending the quizzes..."))
        .await?;

    let sent = send_polls(&ctx, msg.chat.id, &output.questions).await;

    ctx.bot
        .reply_to(&msg, format!("Done. Sent {sent} of {total} quizzes."))
        .await?;

    Ok(())
}

/// A text message with no pending PDF
pub(crate) async fn handle_stray_text(ctx: Arc<tg::Ctx>, msg: Message) -> Result {
    ctx.bot
        .reply_to(&msg, "Send me a PDF document first.")
        .await?;
    Ok(())
}

/// Sends the questions one by one, returns the number of polls that were sent.
/// A failed poll doesn't stop the rest.
async fn send_polls(ctx: &tg::Ctx, chat_id: ChatId, questions: &[mcq::ParsedQuestion]) -> usize {
    let mut sent = 0;

    for (i, question) in questions.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(POLL_DELAY).await;
        }

        let result = ctx
            .bot
            .send_poll(chat_id, question.question.clone(), question.options.to_vec())
            .type_(PollType::Quiz)
            .correct_option_id(question.correct_index)
            .await;

        match result {
            Ok(_) => {
                sent += 1;
                increment_counter!("quiz_polls_sent_total");
            }
            Err(err) => {
                increment_counter!("quiz_polls_failed_total");
                error!(
                    err = tracing_err(&err),
                    question = %question.question,
                    "Error creating poll"
                );
            }
        }
    }

    sent
}

/// Starts the session if the text isn't blank and returns its length in chars.
/// A previously pending PDF is only replaced by one that has some text.
fn accept_extracted_text(sessions: &SessionStore, sender: UserId, text: String) -> Option<usize> {
    if text.trim().is_empty() {
        return None;
    }

    let chars = text.chars().count();
    if sessions.begin(sender, text) {
        info!("Replaced the previously pending PDF");
    }

    Some(chars)
}

fn is_pdf(mime_type: Option<&str>, file_name: Option<&str>) -> bool {
    if mime_type == Some("application/pdf") {
        return true;
    }
    file_name.map_or(false, |name| name.to_lowercase().ends_with(".pdf"))
}

fn parse_question_count(text: &str) -> Option<u32> {
    text.trim().parse().ok().filter(|&count| count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_count() {
        assert_eq!(parse_question_count("5"), Some(5));
        assert_eq!(parse_question_count("  12\n"), Some(12));
        assert_eq!(parse_question_count("+3"), Some(3));
        assert_eq!(parse_question_count("0"), None);
        assert_eq!(parse_question_count("-2"), None);
        assert_eq!(parse_question_count("2.5"), None);
        assert_eq!(parse_question_count("five"), None);
        assert_eq!(parse_question_count(""), None);
        assert_eq!(parse_question_count("99999999999"), None);
    }

    #[test]
    fn blank_pdf_keeps_the_pending_one() {
        let sessions = SessionStore::default();
        let owner = UserId(7);

        assert_eq!(accept_extracted_text(&sessions, owner, "Первый".to_owned()), Some(6));

        assert_eq!(accept_extracted_text(&sessions, owner, " \n\n ".to_owned()), None);
        assert!(sessions.is_pending(owner));

        assert_eq!(accept_extracted_text(&sessions, owner, "Second".to_owned()), Some(6));
        assert_eq!(sessions.take(owner).as_deref(), Some("Second"));
    }

    #[test]
    fn pdf_detection() {
        assert!(is_pdf(Some("application/pdf"), None));
        assert!(is_pdf(None, Some("Lecture 1.PDF")));
        assert!(is_pdf(Some("application/octet-stream"), Some("notes.pdf")));
        assert!(!is_pdf(Some("image/png"), Some("scan.png")));
        assert!(!is_pdf(None, None));
    }
}
