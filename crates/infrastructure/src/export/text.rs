//! Plain text renderings of captured transactions.
//!
//! None of these functions can fail; unreadable bodies render as a
//! placeholder and a missing response renders as a fixed marker line.

use netexport_domain::HttpTransaction;

use crate::http::decode_body;

/// HTTP version written on request and status lines.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Written instead of a response block when no response was recorded.
pub const NO_RESPONSE_MARKER: &str = "[No response: request pending or failed]";

/// Separates the request block from the response block.
pub const RESPONSE_SEPARATOR: &str =
    "----------------------------------------------------------------";

/// Separates transactions in a multi-transaction raw export.
pub const TRANSACTION_SEPARATOR: &str =
    "================================================================";

/// Renders the request line, headers and body.
#[must_use]
pub fn request_string(transaction: &HttpTransaction) -> String {
    let mut out = format!("{} {} {HTTP_VERSION}\n", transaction.method, transaction.url);
    for header in &transaction.request_headers {
        out.push_str(&format!("{}: {}\n", header.name, header.value));
    }
    out.push('\n');

    let body = decode_body(
        transaction.request_body.as_deref(),
        transaction.request_content_type(),
    );
    out.push_str(&body.text_or_placeholder());
    out
}

/// Renders the status line, headers and body.
///
/// A transaction without a response renders [`NO_RESPONSE_MARKER`],
/// followed by the transport error when one was recorded.
#[must_use]
pub fn response_string(transaction: &HttpTransaction) -> String {
    let Some(status) = transaction.status_code else {
        let mut out = format!("{NO_RESPONSE_MARKER}\n");
        if let Some(error) = &transaction.error {
            out.push_str(&format!("Error: {error}\n"));
        }
        return out;
    };

    let reason = transaction.reason_phrase();
    let mut out = if reason.is_empty() {
        format!("{HTTP_VERSION} {status}\n")
    } else {
        format!("{HTTP_VERSION} {status} {reason}\n")
    };
    for header in &transaction.response_headers {
        out.push_str(&format!("{}: {}\n", header.name, header.value));
    }
    out.push('\n');

    let body = decode_body(
        transaction.response_body.as_deref(),
        transaction.response_content_type(),
    );
    out.push_str(&body.text_or_placeholder());
    out
}

/// Renders the request block, a separator line, then the response block.
#[must_use]
pub fn raw_string(transaction: &HttpTransaction) -> String {
    let mut out = request_string(transaction);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(RESPONSE_SEPARATOR);
    out.push_str("\n\n");
    out.push_str(&response_string(transaction));
    out
}

/// Renders every transaction's raw block in the order given.
#[must_use]
pub fn raw_string_for_transactions<'a, I>(transactions: I) -> String
where
    I: IntoIterator<Item = &'a HttpTransaction>,
{
    join_blocks(transactions.into_iter().map(raw_string))
}

/// Renders every transaction's request block in the order given.
#[must_use]
pub fn request_string_for_transactions<'a, I>(transactions: I) -> String
where
    I: IntoIterator<Item = &'a HttpTransaction>,
{
    join_blocks(transactions.into_iter().map(request_string))
}

/// Renders every transaction's response block in the order given.
#[must_use]
pub fn response_string_for_transactions<'a, I>(transactions: I) -> String
where
    I: IntoIterator<Item = &'a HttpTransaction>,
{
    join_blocks(transactions.into_iter().map(response_string))
}

fn join_blocks(blocks: impl Iterator<Item = String>) -> String {
    let mut out = String::new();
    for (index, block) in blocks.enumerate() {
        if index > 0 {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(TRANSACTION_SEPARATOR);
            out.push_str("\n\n");
        }
        out.push_str(&block);
    }
    out
}
