//! Private-addressing convention.
//!
//! The message field is a single line of free text. A recipient is carried
//! inline as `:priv <target>: <body>`. Everything else is a broadcast.
//!
//! Decoding splits the text at the tag into at most three `:`-separated
//! segments: the empty segment before the tag, `priv <target>`, and the body.
//! Colons inside the body stay in the body.
//!
//! # Invariants
//!
//! - `decode(&encode(t, b))` is `Private(t)` with body `" " + b` for any
//!   target without spaces or colons. The separator space is part of the
//!   body on the wire.
//! - `retarget` replaces the target and keeps the body: retargeting twice is
//!   the same as retargeting once with the last target.
//! - Malformed addressing never fails. It degrades to a broadcast.

/// Tag that switches the message field into private mode.
pub const PRIVATE_TAG: &str = ":priv";

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Every participant.
    Broadcast,
    /// One named participant.
    Private(String),
}

impl Route {
    /// Wire value of the `to` field. Empty for a broadcast.
    pub fn target(&self) -> &str {
        match self {
            Self::Broadcast => "",
            Self::Private(target) => target,
        }
    }
}

/// Message field content split into route and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addressed {
    /// Recipient.
    pub route: Route,
    /// Text to send, verbatim.
    pub body: String,
    /// The field carried the private tag, well-formed or not.
    pub tagged: bool,
}

impl Addressed {
    /// Whether there is nothing worth sending.
    ///
    /// Tagged content whose body is only the separator space after the tag
    /// counts as empty, even when the target is missing.
    pub fn is_empty(&self) -> bool {
        if self.tagged { strip_separator(&self.body).is_empty() } else { self.body.is_empty() }
    }
}

/// Split message field content into route and body.
pub fn decode(input: &str) -> Addressed {
    let Some(start) = input.find(PRIVATE_TAG) else {
        return Addressed { route: Route::Broadcast, body: input.to_owned(), tagged: false };
    };

    // "[before]:priv bob: body" -> ["", "priv bob", " body"]
    let mut segments = input[start..].splitn(3, ':').skip(1);
    let header = segments.next().unwrap_or_default();
    let body = segments.next().unwrap_or_default();

    let route = match header.split(' ').nth(1) {
        Some(target) if !target.is_empty() => Route::Private(target.to_owned()),
        _ => {
            tracing::debug!(%header, "no target after private tag, sending as broadcast");
            Route::Broadcast
        },
    };

    Addressed { route, body: body.to_owned(), tagged: true }
}

/// Format a private message as message field content.
pub fn encode(target: &str, body: &str) -> String {
    format!("{PRIVATE_TAG} {target}: {body}")
}

/// Address the message field content to `target`, keeping its body.
pub fn retarget(input: &str, target: &str) -> String {
    if input.contains(PRIVATE_TAG) {
        let addressed = decode(input);
        encode(target, strip_separator(&addressed.body))
    } else {
        encode(target, input)
    }
}

fn strip_separator(body: &str) -> &str {
    body.strip_prefix(' ').unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn private(target: &str, body: &str) -> Addressed {
        Addressed { route: Route::Private(target.into()), body: body.into(), tagged: true }
    }

    #[test]
    fn plain_text_is_broadcast() {
        assert_eq!(decode("hello all"), Addressed {
            route: Route::Broadcast,
            body: "hello all".into(),
            tagged: false,
        });
    }

    #[test]
    fn private_body_keeps_leading_space() {
        assert_eq!(decode(":priv dave: hi there"), private("dave", " hi there"));
    }

    #[test]
    fn colons_in_body_are_kept() {
        assert_eq!(decode(":priv bob: time is 10:30"), private("bob", " time is 10:30"));
    }

    #[test]
    fn missing_target_degrades_to_broadcast() {
        for input in [":priv: hi", ":priv : hi", ":privbob: hi"] {
            let addressed = decode(input);
            assert_eq!(addressed.route, Route::Broadcast, "input: {input:?}");
            assert_eq!(addressed.body, " hi");
        }
    }

    #[test]
    fn tag_without_body_is_empty() {
        assert!(decode(":priv bob").is_empty());
        assert!(decode(":priv bob:").is_empty());
        assert!(decode(":priv bob: ").is_empty());
        assert!(decode("").is_empty());
        assert!(!decode(":priv bob:  ").is_empty());
        assert!(!decode(" ").is_empty());
    }

    #[test]
    fn tag_without_target_or_body_is_empty() {
        for input in [":priv: ", ":priv : ", ":priv:", ":priv"] {
            let addressed = decode(input);
            assert_eq!(addressed.route, Route::Broadcast, "input: {input:?}");
            assert!(addressed.is_empty(), "input: {input:?}");
        }
        assert!(!decode(":priv: hi").is_empty());
    }

    #[test]
    fn text_before_tag_is_ignored() {
        assert_eq!(decode("oops :priv bob: hi"), private("bob", " hi"));
    }

    #[test]
    fn route_target_is_wire_to_field() {
        assert_eq!(Route::Broadcast.target(), "");
        assert_eq!(Route::Private("bob".into()).target(), "bob");
    }

    #[test]
    fn retarget_replaces_target_and_keeps_body() {
        assert_eq!(retarget(":priv bob: hello", "carol"), ":priv carol: hello");
    }

    #[test]
    fn retarget_prepends_to_plain_text() {
        assert_eq!(retarget("hello", "carol"), ":priv carol: hello");
        assert_eq!(retarget("", "carol"), ":priv carol: ");
    }

    #[test]
    fn retarget_repairs_malformed_tag() {
        assert_eq!(retarget(":priv: hello", "carol"), ":priv carol: hello");
    }

    #[test]
    fn prop_encode_decode_preserves_route_and_body() {
        proptest!(|(target in "[^ :]{1,16}", body in any::<String>())| {
            let addressed = decode(&encode(&target, &body));

            prop_assert_eq!(addressed.route, Route::Private(target));
            prop_assert_eq!(addressed.body, format!(" {body}"));
        });
    }

    #[test]
    fn prop_retarget_last_target_wins() {
        proptest!(|(
            input in "[^:]{0,32}",
            first in "[a-z]{1,8}",
            second in "[a-z]{1,8}",
        )| {
            let twice = retarget(&retarget(&input, &first), &second);
            prop_assert_eq!(twice, retarget(&input, &second));
        });
    }

    #[test]
    fn prop_decode_never_panics() {
        proptest!(|(input in any::<String>())| {
            let _ = decode(&input);
        });
    }
}
