//! Parse free-text model replies into insights
//!
//! The prompts ask for blocks of `KEY: value` lines:
//!
//! ```text
//! TYPE: opportunity
//! TITLE: ...
//! DESCRIPTION: ...
//! IMPACT: high
//! CONFIDENCE: 85%
//! ```
//!
//! Models drift from that format (markdown bold, numbering, Indonesian keys,
//! wrapped descriptions), so matching is lenient. A block starts at a `TYPE`
//! line, or at a `TITLE` line when the current block already has a title or
//! description.

use std::sync::LazyLock;

use regex::Regex;
use shared::models::{Insight, InsightImpact, InsightType};

/// Used when a block carries no parsable confidence
pub const DEFAULT_CONFIDENCE: u8 = 50;

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\s>#*_-]*(?:\d+[.)]\s*)?[*_]*\s*(type|tipe|jenis|title|judul|description|deskripsi|impact|dampak|confidence|kepercayaan|keyakinan)\s*[*_]*\s*:\s*[*_]*\s*(.*?)[*_\s]*$",
    )
    .expect("field pattern is valid")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)?)\s*(%?)").expect("number pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Type,
    Title,
    Description,
    Impact,
    Confidence,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "type" | "tipe" | "jenis" => Some(Field::Type),
            "title" | "judul" => Some(Field::Title),
            "description" | "deskripsi" => Some(Field::Description),
            "impact" | "dampak" => Some(Field::Impact),
            "confidence" | "kepercayaan" | "keyakinan" => Some(Field::Confidence),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Draft {
    kind: Option<String>,
    title: Option<String>,
    description: Option<String>,
    impact: Option<String>,
    confidence: Option<String>,
}

impl Draft {
    fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.impact.is_none()
            && self.confidence.is_none()
    }

    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Type => &mut self.kind,
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Impact => &mut self.impact,
            Field::Confidence => &mut self.confidence,
        };
        *slot = Some(value);
    }

    /// Blocks without a title or description are dropped
    fn finish(self) -> Option<Insight> {
        let title = self.title.filter(|t| !t.is_empty())?;
        let description = self.description.filter(|d| !d.is_empty())?;
        Some(Insight {
            kind: parse_type(self.kind.as_deref().unwrap_or_default()),
            title,
            description,
            impact: parse_impact(self.impact.as_deref().unwrap_or_default()),
            confidence: self
                .confidence
                .as_deref()
                .and_then(parse_confidence)
                .unwrap_or(DEFAULT_CONFIDENCE),
        })
    }
}

pub fn parse_insights(reply: &str) -> Vec<Insight> {
    let mut insights = Vec::new();
    let mut draft = Draft::default();
    let mut last: Option<Field> = None;

    for line in reply.lines() {
        if let Some(caps) = FIELD.captures(line) {
            let Some(field) = Field::from_key(&caps[1]) else {
                continue;
            };
            let starts_block = field == Field::Type
                || (field == Field::Title
                    && (draft.title.is_some() || draft.description.is_some()));
            if starts_block && !draft.is_empty() {
                insights.extend(std::mem::take(&mut draft).finish());
            }
            draft.set(field, caps[2].trim().to_string());
            last = Some(field);
            continue;
        }

        let text = line.trim();
        if text.is_empty() || text.chars().all(|c| matches!(c, '-' | '=' | '*' | '_')) {
            last = None;
            continue;
        }
        // Wrapped description
        if last == Some(Field::Description) {
            if let Some(description) = draft.description.as_mut() {
                if !description.is_empty() {
                    description.push(' ');
                }
                description.push_str(text);
            }
        }
    }
    insights.extend(draft.finish());
    insights
}

pub fn parse_type(value: &str) -> InsightType {
    let value = value.to_lowercase();
    if value.contains("opportunit") || value.contains("peluang") {
        InsightType::Opportunity
    } else if value.contains("warning") || value.contains("peringatan") {
        InsightType::Warning
    } else if value.contains("trend") || value.contains("tren") {
        InsightType::Trend
    } else {
        InsightType::Recommendation
    }
}

pub fn parse_impact(value: &str) -> InsightImpact {
    let value = value.to_lowercase();
    if value.contains("high") || value.contains("tinggi") {
        InsightImpact::High
    } else if value.contains("low") || value.contains("rendah") {
        InsightImpact::Low
    } else {
        InsightImpact::Medium
    }
}

/// `85`, `85%`, `85.5 %`, `0.85` → 0..=100
pub fn parse_confidence(value: &str) -> Option<u8> {
    let caps = NUMBER.captures(value)?;
    let raw = &caps[1];
    let mut number: f64 = raw.replace(',', ".").parse().ok()?;
    let fractional = raw.contains(['.', ',']);
    if caps[2].is_empty() && fractional && number <= 1.0 {
        number *= 100.0;
    }
    Some(number.round().clamp(0.0, 100.0) as u8)
}
