use crate::{err_ctx, IoError, Result};
use easy_ext::ext;
use tempfile::NamedTempFile;

/// Creates a temporary file with the given suffix (e.g. `.pdf`).
/// The file is deleted once the returned value or its [`tempfile::TempPath`]
/// is dropped.
pub(crate) async fn create_temp_file(suffix: &'static str) -> Result<NamedTempFile> {
    crate::util::tokio::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix("pdfquiz-")
            .suffix(suffix)
            .tempfile()
            .map_err(err_ctx!(IoError::CreateTempFile))
    })
    .await
}

#[ext(NamedTempFileExt)]
pub(crate) impl NamedTempFile {
    fn into_tokio(self) -> (tokio::fs::File, tempfile::TempPath) {
        let (file, path) = self.into_parts();
        (tokio::fs::File::from_std(file), path)
    }
}
