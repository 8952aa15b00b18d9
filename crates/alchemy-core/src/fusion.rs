//! Fusion result model.
//!
//! [`FusionResult`] is the structured outcome the provider is asked to
//! produce. [`HistoryEntry`] adds the metadata the session controller
//! attaches once a result is accepted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{AlchemyError, Result};
use crate::symbol::Symbol;

pub const MIN_POWER_LEVEL: u8 = 1;
pub const MAX_POWER_LEVEL: u8 = 100;

/// Wire names of the seven required fields, in schema order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "description",
    "category",
    "rarity",
    "powerLevel",
    "colorHex",
    "funFact",
];

const FALLBACK_NAME: &str = "不稳定的物质";
const FALLBACK_DESCRIPTION: &str = "融合失败了，只留下一堆灰色的残渣。";
const FALLBACK_CATEGORY: &str = "废弃物";
const FALLBACK_COLOR: &str = "#555555";
const FALLBACK_FUN_FACT: &str = "或许你可以稍后再试。";

static COLOR_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern is valid"));

/// Rarity tier of a creation.
///
/// The ordering is presentational only. On the wire each tier is carried as
/// the Simplified Chinese label the prompt asks for; the English variant
/// names are accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythical,
}

impl Rarity {
    /// Label used in prompts, schemas and output.
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "普通",
            Rarity::Rare => "稀有",
            Rarity::Epic => "史诗",
            Rarity::Legendary => "传说",
            Rarity::Mythical => "神话",
        }
    }

    fn english(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythical => "Mythical",
        }
    }

    /// All tiers, lowest first.
    pub fn all() -> impl Iterator<Item = Rarity> {
        Self::iter()
    }

    pub fn labels() -> Vec<&'static str> {
        Self::all().map(Rarity::label).collect()
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Rarity {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value = s.trim();
        Self::all()
            .find(|r| r.label() == value || r.english().eq_ignore_ascii_case(value))
            .ok_or_else(|| ValidationError::UnknownRarity(s.to_string()))
    }
}

impl Serialize for Rarity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Rarity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A broken invariant in a provider payload.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("missing or empty field `{0}`")]
    MissingField(String),

    #[error("powerLevel {0} is not an integer")]
    PowerLevelNotInteger(f64),

    #[error("powerLevel {0} is outside 1..=100")]
    PowerLevelOutOfRange(i64),

    #[error("colorHex {0:?} is not #RRGGBB")]
    InvalidColorHex(String),

    #[error("rarity {0:?} is not one of the known tiers")]
    UnknownRarity(String),
}

/// The structured outcome of one fusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionResult {
    pub name: String,
    pub description: String,
    pub category: String,
    pub rarity: Rarity,
    pub power_level: u8,
    pub color_hex: String,
    pub fun_fact: String,
}

impl FusionResult {
    /// The fixed result substituted whenever a real fusion fails.
    pub fn fallback() -> Self {
        Self {
            name: FALLBACK_NAME.to_string(),
            description: FALLBACK_DESCRIPTION.to_string(),
            category: FALLBACK_CATEGORY.to_string(),
            rarity: Rarity::Common,
            power_level: MIN_POWER_LEVEL,
            color_hex: FALLBACK_COLOR.to_string(),
            fun_fact: FALLBACK_FUN_FACT.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    /// Parses and validates a provider payload.
    ///
    /// Tolerates a surrounding markdown code fence; everything else about
    /// the payload must satisfy the result invariants.
    pub fn from_json(text: &str) -> Result<Self> {
        let body = strip_code_fence(text);
        if body.is_empty() {
            return Err(AlchemyError::Serialization {
                format: "JSON".to_string(),
                message: "empty payload".to_string(),
            });
        }
        let raw: RawFusionResult = serde_json::from_str(body)?;
        Ok(Self::try_from(raw)?)
    }

    /// Checks every invariant of an already-typed result.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let text_fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
            ("colorHex", &self.color_hex),
            ("funFact", &self.fun_fact),
        ];
        for (field, value) in text_fields {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field.to_string()));
            }
        }
        if !(MIN_POWER_LEVEL..=MAX_POWER_LEVEL).contains(&self.power_level) {
            return Err(ValidationError::PowerLevelOutOfRange(i64::from(
                self.power_level,
            )));
        }
        validate_color(&self.color_hex)
    }

    /// The color as an RGB triple.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        if !COLOR_HEX.is_match(&self.color_hex) {
            return None;
        }
        let hex = &self.color_hex[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }

    /// Response schema handed to the provider, mirroring this struct.
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING", "description": "创造物的创意名称 (中文)" },
                "description": { "type": "STRING", "description": "简短且富有氛围感的描述 (中文，不超过2句话)" },
                "category": { "type": "STRING", "description": "例如：神器、生物、事件、概念" },
                "rarity": { "type": "STRING", "enum": Rarity::labels() },
                "powerLevel": { "type": "NUMBER", "description": "1 到 100 之间" },
                "colorHex": { "type": "STRING", "description": "代表该物品的十六进制颜色代码" },
                "funFact": { "type": "STRING", "description": "关于它的一个简短、机智或神秘的趣闻 (中文)" }
            },
            "required": REQUIRED_FIELDS,
        })
    }
}

/// Payload exactly as the provider sent it, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFusionResult {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    rarity: Option<String>,
    power_level: Option<f64>,
    color_hex: Option<String>,
    fun_fact: Option<String>,
}

impl TryFrom<RawFusionResult> for FusionResult {
    type Error = ValidationError;

    fn try_from(raw: RawFusionResult) -> std::result::Result<Self, Self::Error> {
        let rarity = required(raw.rarity, "rarity")?.trim().parse::<Rarity>()?;
        let power_level = power_level(raw.power_level)?;
        let color_hex = required(raw.color_hex, "colorHex")?.trim().to_string();
        validate_color(&color_hex)?;

        Ok(Self {
            name: required(raw.name, "name")?,
            description: required(raw.description, "description")?,
            category: required(raw.category, "category")?,
            rarity,
            power_level,
            color_hex,
            fun_fact: required(raw.fun_fact, "funFact")?,
        })
    }
}

/// Blank-only text counts as missing; non-blank text is kept as sent.
fn required(value: Option<String>, field: &str) -> std::result::Result<String, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn power_level(value: Option<f64>) -> std::result::Result<u8, ValidationError> {
    let value = value.ok_or_else(|| ValidationError::MissingField("powerLevel".to_string()))?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ValidationError::PowerLevelNotInteger(value));
    }
    let whole = value as i64;
    if !(i64::from(MIN_POWER_LEVEL)..=i64::from(MAX_POWER_LEVEL)).contains(&whole) {
        return Err(ValidationError::PowerLevelOutOfRange(whole));
    }
    Ok(whole as u8)
}

fn validate_color(value: &str) -> std::result::Result<(), ValidationError> {
    if COLOR_HEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColorHex(value.to_string()))
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// A fusion result accepted into the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// The two inputs, first selected first.
    pub input_pair: [Symbol; 2],
    #[serde(flatten)]
    pub result: FusionResult,
}

impl HistoryEntry {
    pub fn new(result: FusionResult, input_pair: [Symbol; 2]) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input_pair,
            result,
        }
    }
}
