use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::{ready, Stream};
use hex::FromHex;
use pin_project_lite::pin_project;
use sha1::{Digest, Sha1};
use tracing::trace;

pin_project! {
    /// Wraps a stream of body chunks, passing them through unchanged while feeding them to a
    ///  number of validators that need the entire body (e.g. checksums).
    ///
    /// When the wrapped stream is drained, all validators are checked. If one of them fails, a
    ///  final chunk with the error is appended. After an error was returned, the stream ends and
    ///  does not poll upstream again.
    pub struct ValidatingBody<S> {
        #[pin]
        inner: S,
        validators: Vec<Box<dyn BodyValidator>>,
        is_done: bool,
    }
}
impl <S> ValidatingBody<S> {
    pub fn new(inner: S, validators: Vec<Box<dyn BodyValidator>>) -> ValidatingBody<S> {
        ValidatingBody {
            inner,
            validators,
            is_done: false,
        }
    }
}

impl <S, E> Stream for ValidatingBody<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<anyhow::Error>,
{
    type Item = anyhow::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.is_done {
            return Poll::Ready(None);
        }

        match ready!(this.inner.poll_next(cx)) {
            Some(Ok(data)) => {
                for validator in this.validators.iter_mut() {
                    validator.add_data(&data);
                }
                Poll::Ready(Some(Ok(data)))
            }
            None => {
                *this.is_done = true;
                for validator in this.validators.iter() {
                    if let Err(msg) = validator.validate() {
                        return Poll::Ready(Some(Err(anyhow::Error::msg(msg))));
                    }
                }
                Poll::Ready(None)
            }
            Some(Err(e)) => {
                *this.is_done = true;
                Poll::Ready(Some(Err(e.into())))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_done {
            (0, Some(0))
        }
        else {
            // one more chunk if validation fails
            let (lower, upper) = self.inner.size_hint();
            (lower, upper.and_then(|n| n.checked_add(1)))
        }
    }
}

pub trait BodyValidator: Send {
    fn add_data(&mut self, data: &Bytes);

    /// Err contains a human readable description of the failure
    fn validate(&self) -> Result<(), String>;
}

pub struct Sha1BodyValidator {
    hasher: Sha1,
    expected_hash: [u8; 20],
}
impl Sha1BodyValidator {
    pub fn new(expected_hash: [u8; 20]) -> Sha1BodyValidator {
        Sha1BodyValidator {
            hasher: Default::default(),
            expected_hash,
        }
    }
}
impl BodyValidator for Sha1BodyValidator {
    fn add_data(&mut self, data: &Bytes) {
        self.hasher.update(data);
    }

    fn validate(&self) -> Result<(), String> {
        let hash = self.hasher.clone().finalize();
        trace!("validating SHA1 hash");
        if hash.as_slice() == &self.expected_hash[..] {
            Ok(())
        }
        else {
            Err(format!("SHA1 mismatch: expected {}, got {}", hex::encode(self.expected_hash), hex::encode(hash)))
        }
    }
}

pub struct Md5BodyValidator {
    context: md5::Context,
    expected_hash: [u8; 16],
}
impl Md5BodyValidator {
    pub fn new(expected_hash: [u8; 16]) -> Md5BodyValidator {
        Md5BodyValidator {
            context: md5::Context::new(),
            expected_hash,
        }
    }
}
impl BodyValidator for Md5BodyValidator {
    fn add_data(&mut self, data: &Bytes) {
        self.context.consume(data);
    }

    fn validate(&self) -> Result<(), String> {
        let hash = self.context.clone().compute().0;
        trace!("validating MD5 hash");
        if hash == self.expected_hash {
            Ok(())
        }
        else {
            Err(format!("MD5 mismatch: expected {}, got {}", hex::encode(self.expected_hash), hex::encode(hash)))
        }
    }
}

/// Parses a hex encoded SHA1 hash as found in checksum files and headers. Surrounding quotes
///  (ETag) and anything after the first whitespace (`sha1sum` output) are ignored.
pub fn parse_sha1(text: &str) -> Option<[u8; 20]> {
    <[u8; 20]>::from_hex(first_token(text)).ok()
}

pub fn parse_md5(text: &str) -> Option<[u8; 16]> {
    <[u8; 16]>::from_hex(first_token(text)).ok()
}

fn first_token(text: &str) -> &str {
    text.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches('"')
}

#[cfg(test)]
mod test {
    use futures::StreamExt;
    use rstest::*;
    use super::*;

    const HELLO_SHA1: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";
    const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        futures::stream::iter(parts.iter().map(|p| Ok::<_, std::io::Error>(Bytes::from_static(p.as_bytes()))).collect::<Vec<_>>())
    }

    async fn drain(body: ValidatingBody<impl Stream<Item = Result<Bytes, std::io::Error>>>) -> Vec<anyhow::Result<Bytes>> {
        body.collect().await
    }

    #[tokio::test]
    async fn test_valid_checksums_pass_data_through() {
        let validators: Vec<Box<dyn BodyValidator>> = vec![
            Box::new(Sha1BodyValidator::new(parse_sha1(HELLO_SHA1).unwrap())),
            Box::new(Md5BodyValidator::new(parse_md5(HELLO_MD5).unwrap())),
        ];
        let result = drain(ValidatingBody::new(chunks(&["he", "llo"]), validators)).await;

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_mismatch_appends_error() {
        let validators: Vec<Box<dyn BodyValidator>> = vec![
            Box::new(Sha1BodyValidator::new(parse_sha1(HELLO_SHA1).unwrap())),
        ];
        let result = drain(ValidatingBody::new(chunks(&["hallo"]), validators)).await;

        assert_eq!(result.len(), 2);
        assert!(result[0].is_ok());
        let msg = result[1].as_ref().unwrap_err().to_string();
        assert!(msg.contains("SHA1 mismatch"), "{}", msg);
    }

    #[tokio::test]
    async fn test_upstream_error_ends_stream() {
        let upstream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"a")),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "connection reset")),
            Ok(Bytes::from_static(b"b")),
        ]);
        let result = drain(ValidatingBody::new(upstream, vec![])).await;

        assert_eq!(result.len(), 2);
        assert!(result[1].is_err());
    }

    #[rstest]
    #[case::plain(HELLO_SHA1, true)]
    #[case::sha1sum_output("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d  hello.txt\n", true)]
    #[case::etag("\"aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d\"", true)]
    #[case::too_short("aaf4c61ddcc5e8a2", false)]
    #[case::not_hex("zzf4c61ddcc5e8a2dabede0f3b482cd9aea9434d", false)]
    #[case::empty("", false)]
    fn test_parse_sha1(#[case] text: &str, #[case] is_valid: bool) {
        assert_eq!(parse_sha1(text).is_some(), is_valid);
    }
}
