//! Content negotiation.
//!
//! # Responsibilities
//! - Parse the `Accept` header into media ranges with quality values
//! - Decide whether the adapter's single representation is acceptable
//!
//! # Design Decisions
//! - No `Accept` header means the client takes anything
//! - The most specific matching range decides (exact > `type/*` > `*/*`),
//!   so `application/json;q=0, */*` rejects JSON
//! - Media types compare case-insensitively; parameters other than `q`
//!   are ignored

use axum::http::{header, HeaderMap};

/// The representation every adapter produces.
pub const APPLICATION_JSON: &str = "application/json";

/// Outcome of negotiating a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    Accepted,
    NotAcceptable,
}

impl Negotiation {
    pub fn is_accepted(self) -> bool {
        self == Negotiation::Accepted
    }
}

/// Matches `Accept` headers against one supported media type.
#[derive(Debug, Clone, Copy)]
pub struct Negotiator {
    kind: &'static str,
    subtype: &'static str,
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::json()
    }
}

impl Negotiator {
    /// Negotiator for `application/json`.
    pub const fn json() -> Self {
        Self {
            kind: "application",
            subtype: "json",
        }
    }

    /// Decide from the request headers.
    pub fn negotiate(&self, headers: &HeaderMap) -> Negotiation {
        let ranges: Vec<MediaRange<'_>> = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .filter_map(MediaRange::parse)
            .collect();

        if ranges.is_empty() {
            return Negotiation::Accepted;
        }

        let best = ranges
            .iter()
            .filter_map(|r| r.specificity(self.kind, self.subtype).map(|s| (s, r.quality)))
            .max_by_key(|(specificity, _)| *specificity);

        match best {
            Some((_, quality)) if quality > 0.0 => Negotiation::Accepted,
            _ => Negotiation::NotAcceptable,
        }
    }

    /// Decide from a single `Accept` value.
    pub fn accepts(&self, accept: &str) -> bool {
        let mut headers = HeaderMap::new();
        match accept.parse() {
            Ok(value) => {
                headers.insert(header::ACCEPT, value);
                self.negotiate(&headers).is_accepted()
            }
            Err(_) => false,
        }
    }
}

#[derive(Debug)]
struct MediaRange<'a> {
    kind: &'a str,
    subtype: &'a str,
    quality: f32,
}

impl<'a> MediaRange<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let mut parts = raw.split(';');
        let range = parts.next()?.trim();
        if range.is_empty() {
            return None;
        }
        let (kind, subtype) = range.split_once('/')?;

        let mut quality = 1.0;
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value.trim().parse().unwrap_or(0.0);
                }
            }
        }

        Some(Self {
            kind: kind.trim(),
            subtype: subtype.trim(),
            quality,
        })
    }

    /// How specifically this range names `kind/subtype`, if at all.
    fn specificity(&self, kind: &str, subtype: &str) -> Option<u8> {
        let kind_matches = self.kind.eq_ignore_ascii_case(kind);
        let subtype_matches = self.subtype.eq_ignore_ascii_case(subtype);

        match (self.kind, self.subtype) {
            ("*", "*") => Some(0),
            (_, "*") if kind_matches => Some(1),
            _ if kind_matches && subtype_matches => Some(2),
            _ => None,
        }
    }
}
