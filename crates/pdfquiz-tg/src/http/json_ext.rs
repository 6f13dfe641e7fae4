use super::HttpClientError;
use crate::prelude::*;
use crate::{err, Result};
use async_trait::async_trait;
use easy_ext::ext;
use reqwest_middleware::RequestBuilder;
use serde::{de::DeserializeOwned, Serialize};

/// Undecodable responses are logged with at most this many bytes of the body
const MAX_LOGGED_BODY_LEN: usize = 2048;

#[ext(RequestBuilderJsonExt)]
#[async_trait]
pub(crate) impl RequestBuilder {
    /// Sends the payload as a JSON body and decodes the JSON response
    async fn send_and_read_json<Req, Res>(self, payload: &Req) -> Result<Res>
    where
        Req: Serialize + Sync + ?Sized,
        Res: DeserializeOwned,
    {
        let bytes = self.json(payload).read_bytes().await?;
        decode_json(&bytes)
    }
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| {
        let logged = &bytes[..bytes.len().min(MAX_LOGGED_BODY_LEN)];
        warn!(
            err = tracing_err(&source),
            body_len = bytes.len(),
            body = %String::from_utf8_lossy(logged),
            "Response body is not the expected JSON"
        );
        err!(HttpClientError::UnexpectedResponseJsonShape { source })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        text: String,
    }

    #[test]
    fn decodes_expected_shape() {
        let reply: Reply = decode_json(br#"{"text":"ok","extra":1}"#).unwrap();
        assert_eq!(reply, Reply { text: "ok".to_owned() });
    }

    #[test_log::test]
    fn unexpected_shape() {
        let body = "<html>".repeat(1000);
        let err = decode_json::<Reply>(body.as_bytes()).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::ErrorKind::HttpClient {
                source: HttpClientError::UnexpectedResponseJsonShape { .. }
            }
        ));
    }
}
