//! Negotiator - Accept / Content-Type ヘッダから codec を 1 つ選ぶ
//!
//! # アルゴリズム
//! 1. ヘッダを media range `(type, subtype, q, position)` に分解
//! 2. 登録済み token ごとに最も具体的な range を探す（exact=2, type/*=1, */*=0）
//! 3. q 最大 → fitness 大 → ヘッダ内で先 → 登録順で先、の順に比較
//! 4. q > 0 の候補が無ければ registry の default
//!
//! 純関数。失敗しない（空の registry を除く）。

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::format::content_type::ContentType;
use crate::format::registry::FormatRegistry;
use crate::ports::Codec;

/// One parsed media range from a header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub main: String,
    pub sub: String,
    pub quality: f32,
    pub position: usize,
}

impl MediaRange {
    /// How specifically this range matches `main/sub`; `None` when it does not.
    fn fitness(&self, main: &str, sub: &str) -> Option<u8> {
        match (self.main.as_str(), self.sub.as_str()) {
            ("*", "*") => Some(0),
            (m, "*") if m == main => Some(1),
            (m, s) if m == main && s == sub => Some(2),
            _ => None,
        }
    }
}

/// Split a header into media ranges. Entries that are not `type/subtype` are skipped.
pub fn parse_media_ranges(header: &str) -> Vec<MediaRange> {
    header
        .split(',')
        .enumerate()
        .filter_map(|(position, entry)| {
            let mut parts = entry.split(';');
            let mut media = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
            if media == "*" {
                media = "*/*".to_string();
            }
            let (main, sub) = media.split_once('/')?;
            let (main, sub) = (main.trim(), sub.trim());
            if main.is_empty() || sub.is_empty() || sub.contains('/') {
                return None;
            }

            let quality = parts
                .filter_map(|param| param.split_once('='))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
                .and_then(|(_, value)| value.trim().parse::<f32>().ok())
                .filter(|q| (0.0..=1.0).contains(q))
                .unwrap_or(1.0);

            Some(MediaRange {
                main: main.to_string(),
                sub: sub.to_string(),
                quality,
                position,
            })
        })
        .collect()
}

/// Pick the response format for an `Accept` header.
///
/// Returns `None` only when the registry has no encoder at all.
pub fn negotiate(
    header: Option<&str>,
    registry: &FormatRegistry,
) -> Option<(ContentType, Arc<dyn Codec>)> {
    select(header, registry, |codec| codec.can_encode())
}

/// Pick the decoder for a request `Content-Type` header.
pub fn negotiate_decoder(
    header: Option<&str>,
    registry: &FormatRegistry,
) -> Option<(ContentType, Arc<dyn Codec>)> {
    select(header, registry, |codec| codec.can_decode())
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    quality: f32,
    fitness: u8,
    position: usize,
    registration: usize,
}

impl Candidate {
    /// `Greater` means `self` wins.
    fn rank(&self, other: &Candidate) -> Ordering {
        self.quality
            .partial_cmp(&other.quality)
            .unwrap_or(Ordering::Equal)
            .then(self.fitness.cmp(&other.fitness))
            .then(other.position.cmp(&self.position))
            .then(other.registration.cmp(&self.registration))
    }
}

fn select(
    header: Option<&str>,
    registry: &FormatRegistry,
    usable: impl Fn(&Arc<dyn Codec>) -> bool,
) -> Option<(ContentType, Arc<dyn Codec>)> {
    let Some(header) = header else {
        return registry.default_codec();
    };
    let ranges = parse_media_ranges(header);

    let mut best: Option<(Candidate, &str, &Arc<dyn Codec>)> = None;
    for (registration, (token, codec)) in registry.entries().enumerate() {
        if !usable(codec) {
            continue;
        }
        let Some((main, sub)) = token.split_once('/') else {
            continue;
        };
        // most specific range, earliest on ties
        let matched = ranges
            .iter()
            .filter_map(|range| range.fitness(main, sub).map(|fitness| (fitness, range)))
            .max_by(|(fa, ra), (fb, rb)| fa.cmp(fb).then(rb.position.cmp(&ra.position)));
        let Some((fitness, range)) = matched else {
            continue;
        };
        if range.quality <= 0.0 {
            continue;
        }

        let candidate = Candidate {
            quality: range.quality,
            fitness,
            position: range.position,
            registration,
        };
        let wins = best
            .as_ref()
            .is_none_or(|(current, _, _)| candidate.rank(current) == Ordering::Greater);
        if wins {
            best = Some((candidate, token, codec));
        }
    }

    match best {
        Some((candidate, token, codec)) => Some((
            ContentType::new(token).with_quality(candidate.quality),
            codec.clone(),
        )),
        None => {
            debug!(header, "no acceptable format, falling back to default");
            registry.default_codec()
        }
    }
}
