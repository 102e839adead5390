//! Percent-escaping rules for the two URL-encoding dialects.
//!
//! # Design
//! Query strings and form bodies escape differently: a GET query keeps the
//! RFC 3986 query-allowed characters (`:@/?` and the sub-delims) literal
//! and writes spaces as `%20`, while a form body keeps only the unreserved
//! set (`A-Za-z0-9-._~`) and writes spaces as `+`. The form routine splits
//! on literal spaces before escaping so a space can never leak out as
//! `%20`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in a URL query component: everything outside the
/// RFC 3986 query-allowed set (unreserved, sub-delims, `:@/?`).
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@')
    .remove(b'/')
    .remove(b'?');

/// Characters escaped in a form-encoded segment: everything outside the
/// RFC 3986 unreserved set. Space stays in the escape set so it can only
/// be produced as `+` by `url_form_encode`, never as `%20`.
const FORM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Escape a string for use in a URL query component.
pub(crate) fn url_query_encode(input: &str) -> String {
    utf8_percent_encode(input, QUERY).to_string()
}

/// Escape a string per `application/x-www-form-urlencoded`: each
/// space-separated segment is percent-escaped, then segments are rejoined
/// with literal `+`.
pub(crate) fn url_form_encode(input: &str) -> String {
    input
        .split(' ')
        .map(|segment| utf8_percent_encode(segment, FORM).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reverse of `url_form_encode`, for round-trip checks. Literal `+` in
    /// the source becomes `%2B` when encoded, so replacing `+` with a space
    /// before percent-decoding is unambiguous.
    fn url_form_decode(input: &str) -> String {
        let spaced = input.replace('+', " ");
        percent_encoding::percent_decode_str(&spaced)
            .decode_utf8()
            .unwrap()
            .into_owned()
    }

    #[test]
    fn form_encoding_escapes_spaces_as_plus() {
        assert_eq!(
            url_form_encode("happy days! 🕺🏽"),
            "happy+days%21+%F0%9F%95%BA%F0%9F%8F%BD"
        );
    }

    #[test]
    fn form_encoding_escapes_reserved_characters() {
        assert_eq!(
            url_form_encode("http://my.website/?param1=1&param2=2"),
            "http%3A%2F%2Fmy.website%2F%3Fparam1%3D1%26param2%3D2"
        );
    }

    #[test]
    fn form_encoding_keeps_unreserved_characters() {
        assert_eq!(url_form_encode("a-b.c_d~e"), "a-b.c_d~e");
    }

    #[test]
    fn query_encoding_keeps_query_allowed_characters() {
        assert_eq!(
            url_query_encode("http://host.com/?test=[]#fragment"),
            "http://host.com/?test=%5B%5D%23fragment"
        );
    }

    #[test]
    fn query_encoding_escapes_spaces_as_percent_20() {
        assert_eq!(url_query_encode("a b"), "a%20b");
    }

    #[test]
    fn form_encoding_round_trips() {
        let original = "reserved :/?#[]@!$&'()*+,;= spaced é🙂";
        assert_eq!(url_form_decode(&url_form_encode(original)), original);
    }
}
