//! Certificate encoding for header transport.
//!
//! DER bytes are rendered either as a single base64 string or as a PEM block,
//! and optionally query-escaped so the PEM line feeds survive as `%0A`.

use base64::{engine::general_purpose::STANDARD, Engine};
use pem::{EncodeConfig, LineEnding, Pem};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped by query-component encoding.
///
/// Space is left out of the set because it is rewritten to `+` afterwards.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b' ');

/// PEM label used for every forwarded certificate.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// How a certificate is rendered into a header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CertEncoding {
    /// Wrap the DER bytes in a PEM envelope instead of bare base64.
    pub pem: bool,
    /// Query-escape the rendered string.
    pub url_escape: bool,
}

impl CertEncoding {
    pub fn new(pem: bool, url_escape: bool) -> Self {
        Self { pem, url_escape }
    }
}

/// Encode raw DER certificate bytes into a header-ready string.
///
/// Escaping is applied after the base64/PEM step, never before. The bytes are
/// not parsed, so malformed or truncated input is encoded as-is.
pub fn encode_certificate(der: &[u8], encoding: CertEncoding) -> String {
    let rendered = if encoding.pem {
        let block = Pem::new(CERTIFICATE_LABEL, der.to_vec());
        pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
    } else {
        STANDARD.encode(der)
    };

    if encoding.url_escape {
        query_escape(&rendered)
    } else {
        rendered
    }
}

/// Escape a string for use as a URL query component (space as `+`).
pub fn query_escape(input: &str) -> String {
    utf8_percent_encode(input, QUERY_COMPONENT)
        .to_string()
        .replace(' ', "+")
}
