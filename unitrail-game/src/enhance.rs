//! Optional narrative enhancement of tile landings.
//!
//! An [`Enhancer`] may return a title, a short story and up to three
//! player-choosable options, each carrying its own effect ranges. The engine
//! never depends on it: every failure collapses to "no enhancement" and the
//! default tile outcome applies.
use crate::board::TileKind;
use crate::constants::MAX_ENHANCEMENT_OPTIONS;
use crate::data::ReferenceLists;
use crate::numbers::{round_f64_to_i32, saturate_i64_to_i32};
use crate::stats::{Delta, Quantity};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Inclusive range sampled uniformly when an option is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRange {
    pub min: i32,
    pub max: i32,
}

impl EffectRange {
    /// Build a range, swapping the ends if they arrive reversed.
    #[must_use]
    pub const fn new(a: i32, b: i32) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Draw a value; inverted ends are read in either order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        rng.gen_range(self.min.min(self.max)..=self.min.max(self.max))
    }
}

/// Effect ranges of one option, keyed by quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct OptionEffects(pub BTreeMap<Quantity, EffectRange>);

impl OptionEffects {
    #[must_use]
    pub fn with(mut self, quantity: Quantity, range: EffectRange) -> Self {
        self.0.insert(quantity, range);
        self
    }

    /// Draw a concrete delta; credits never come out negative.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Delta {
        let mut delta = Delta::default();
        for (quantity, range) in &self.0 {
            delta.set(*quantity, range.sample(rng));
        }
        delta.credits = delta.credits.max(0);
        delta
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementOption {
    pub label: String,
    /// `None` when the service sent no usable effects; choosing it applies nothing.
    #[serde(default)]
    pub effects: Option<OptionEffects>,
}

/// Narrative overlay for one landing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Enhancement {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub options: Vec<EnhancementOption>,
}

impl Enhancement {
    /// A story or at least one option; a bare title is not enough.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.story.is_some() || !self.options.is_empty()
    }

    #[must_use]
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Context handed to the enhancement service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementRequest {
    pub tile: TileKind,
    pub tile_label: String,
    /// Bounded excerpt of the reference lists.
    pub context: ReferenceLists,
}

const PROMPT_INSTRUCTION: &str = "Write a short title and a story (at most 4-5 sentences) for a \
student-life board game event of the given tile type. Use the provided context lists (classes, \
food and drinks, hangouts, study, transport) where relevant. Optionally propose 2-3 options for \
the player; for each option give effects as [min,max] ranges for intelligence, energy, luck, \
money and credits. Credits can only be earned on class tiles; otherwise credits must be [0,0] \
and they are never negative. Intelligence rises with study and falls with skipping or cheating. \
Energy rises with rest and falls with intense study or sleepless nights. Money rises with jobs \
or scholarships and falls with spending. Do not add any text outside the JSON.";

const PROMPT_FORMAT: &str = r#"{"title":"string","story":"string","options":[{"label":"string","effects":{"intelligence":[min,max],"energy":[min,max],"luck":[min,max],"money":[min,max],"credits":[min,max]}}]}"#;

impl EnhancementRequest {
    #[must_use]
    pub fn new(tile: TileKind, tile_label: impl Into<String>, refs: &ReferenceLists) -> Self {
        Self {
            tile,
            tile_label: tile_label.into(),
            context: refs.excerpt(),
        }
    }

    /// Render the request as a text-generation prompt.
    #[must_use]
    pub fn prompt(&self) -> String {
        let context = serde_json::to_string(&self.context).unwrap_or_default();
        format!(
            "<Prompt>\n<SystemInstruction>{PROMPT_INSTRUCTION} Tile type: \"{label}\".</SystemInstruction>\n<context>{context}</context>\n<tile>{label}</tile>\n<format>{PROMPT_FORMAT}</format>\n</Prompt>",
            label = self.tile_label
        )
    }
}

#[derive(Debug, Error)]
pub enum EnhancementError {
    #[error("enhancement service unavailable: {0}")]
    Unavailable(String),
    #[error("enhancement service timed out")]
    Timeout,
    #[error("enhancement response malformed: {0}")]
    Malformed(String),
    #[error("enhancement service failed: {0}")]
    Service(String),
}

/// Narrow port to the narrative service.
pub trait Enhancer {
    /// Produce an enhancement for a landing.
    ///
    /// # Errors
    ///
    /// Any [`EnhancementError`]; callers treat it as "no enhancement".
    fn enhance(&self, request: &EnhancementRequest)
    -> Result<Option<Enhancement>, EnhancementError>;
}

impl<F> Enhancer for F
where
    F: Fn(&EnhancementRequest) -> Result<Option<Enhancement>, EnhancementError>,
{
    fn enhance(
        &self,
        request: &EnhancementRequest,
    ) -> Result<Option<Enhancement>, EnhancementError> {
        self(request)
    }
}

/// Enhancer that never offers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnhancement;

impl Enhancer for NoEnhancement {
    fn enhance(
        &self,
        _request: &EnhancementRequest,
    ) -> Result<Option<Enhancement>, EnhancementError> {
        Ok(None)
    }
}

/// Opaque text-generation service (a hosted language model, for instance).
pub trait TextGenerator {
    /// Generate text for a prompt.
    ///
    /// # Errors
    ///
    /// Returns an [`EnhancementError`] when the service cannot answer.
    fn generate(&self, prompt: &str) -> Result<String, EnhancementError>;
}

/// Adapts a [`TextGenerator`] into an [`Enhancer`] by parsing its reply.
#[derive(Debug, Clone)]
pub struct TextEnhancer<G> {
    generator: G,
}

impl<G: TextGenerator> TextEnhancer<G> {
    pub const fn new(generator: G) -> Self {
        Self { generator }
    }
}

impl<G: TextGenerator> Enhancer for TextEnhancer<G> {
    fn enhance(
        &self,
        request: &EnhancementRequest,
    ) -> Result<Option<Enhancement>, EnhancementError> {
        let text = self.generator.generate(&request.prompt())?;
        Ok(parse_enhancement(&text))
    }
}

/// Ask the enhancer, swallowing errors and unusable replies.
pub fn enhance_or_default(
    enhancer: &dyn Enhancer,
    request: &EnhancementRequest,
) -> Option<Enhancement> {
    usable_or_log(enhancer.enhance(request))
}

fn usable_or_log(result: Result<Option<Enhancement>, EnhancementError>) -> Option<Enhancement> {
    match result {
        Ok(Some(enhancement)) if enhancement.is_usable() => Some(enhancement),
        Ok(_) => None,
        Err(err) => {
            log::warn!("falling back to default tile outcome: {err}");
            None
        }
    }
}

/// Parse a service reply into an enhancement.
///
/// Markdown code fences are stripped; when the remainder is not JSON the
/// outermost `{...}` slice is tried. Anything else yields `None`.
#[must_use]
pub fn parse_enhancement(text: &str) -> Option<Enhancement> {
    let cleaned = strip_code_fence(text);
    if cleaned.is_empty() {
        return None;
    }
    let value = serde_json::from_str::<Value>(cleaned).ok().or_else(|| {
        let open = cleaned.find('{')?;
        let close = cleaned.rfind('}')?;
        (close > open)
            .then(|| serde_json::from_str::<Value>(&cleaned[open..=close]).ok())
            .flatten()
    })?;
    let enhancement = enhancement_from_value(&value)?;
    enhancement.is_usable().then_some(enhancement)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .get(..4)
        .filter(|tag| tag.eq_ignore_ascii_case("json"))
        .map_or(rest, |_| &rest[4..]);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn enhancement_from_value(value: &Value) -> Option<Enhancement> {
    let object = value.as_object()?;
    let title = non_empty_string(object.get("title"));
    let story = ["story", "description", "content", "text"]
        .iter()
        .find_map(|key| non_empty_string(object.get(*key)));
    let options = object
        .get("options")
        .and_then(Value::as_array)
        .or_else(|| object.get("choices").and_then(Value::as_array))
        .map(|raw| {
            raw.iter()
                .take(MAX_ENHANCEMENT_OPTIONS)
                .enumerate()
                .map(|(idx, option)| option_from_value(idx, option))
                .collect()
        })
        .unwrap_or_default();
    Some(Enhancement {
        title,
        story,
        options,
    })
}

fn option_from_value(idx: usize, value: &Value) -> EnhancementOption {
    let label =
        non_empty_string(value.get("label")).unwrap_or_else(|| format!("Option {}", idx + 1));
    let effects = value
        .get("effects")
        .and_then(Value::as_object)
        .map(|raw| {
            Quantity::ALL
                .iter()
                .filter_map(|quantity| {
                    raw.get(quantity.as_str())
                        .and_then(range_from_value)
                        .map(|range| (*quantity, range))
                })
                .collect::<BTreeMap<_, _>>()
        })
        .filter(|ranges| !ranges.is_empty())
        .map(OptionEffects);
    EnhancementOption { label, effects }
}

fn number_from_value(value: &Value) -> Option<i32> {
    value
        .as_i64()
        .map(saturate_i64_to_i32)
        .or_else(|| value.as_f64().map(round_f64_to_i32))
}

fn range_from_value(value: &Value) -> Option<EffectRange> {
    match value.as_array()?.as_slice() {
        [a, b] => Some(EffectRange::new(
            number_from_value(a)?,
            number_from_value(b)?,
        )),
        _ => None,
    }
}

#[cfg(feature = "async")]
mod asynchronous {
    use super::{Enhancement, EnhancementError, EnhancementRequest, usable_or_log};
    use std::future::Future;
    use std::time::Duration;

    /// Asynchronous form of [`super::Enhancer`] for services behind a network hop.
    pub trait AsyncEnhancer {
        fn enhance(
            &self,
            request: &EnhancementRequest,
        ) -> impl Future<Output = Result<Option<Enhancement>, EnhancementError>>;
    }

    /// Await the enhancer for at most `timeout`; slow or failing services yield `None`.
    pub async fn enhance_with_timeout<E: AsyncEnhancer>(
        enhancer: &E,
        request: &EnhancementRequest,
        timeout: Duration,
    ) -> Option<Enhancement> {
        let result = tokio::time::timeout(timeout, enhancer.enhance(request))
            .await
            .unwrap_or(Err(EnhancementError::Timeout));
        usable_or_log(result)
    }
}

#[cfg(feature = "async")]
pub use asynchronous::{AsyncEnhancer, enhance_with_timeout};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const FULL_REPLY: &str = r#"```json
{
  "title": "Lab marathon",
  "story": "The lab runs late.",
  "options": [
    {"label": "Stay", "effects": {"intelligence": [2, 4], "energy": [-6, -3], "credits": [1, 2]}},
    {"label": "Leave", "effects": {"energy": [1, 3], "credits": [-5, -1]}},
    {"effects": "nope"},
    {"label": "Ignored"}
  ]
}
```"#;

    #[test]
    fn parses_fenced_reply_with_options() {
        let enhancement = parse_enhancement(FULL_REPLY).unwrap();
        assert_eq!(enhancement.title.as_deref(), Some("Lab marathon"));
        assert_eq!(enhancement.story.as_deref(), Some("The lab runs late."));
        assert_eq!(enhancement.options.len(), MAX_ENHANCEMENT_OPTIONS);
        assert_eq!(enhancement.options[2].label, "Option 3");
        assert!(enhancement.options[2].effects.is_none());

        let stay = enhancement.options[0].effects.as_ref().unwrap();
        assert_eq!(stay.0.get(&Quantity::Energy), Some(&EffectRange::new(-6, -3)));
        assert!(!stay.0.contains_key(&Quantity::Luck));
    }

    #[test]
    fn sampled_credits_never_go_negative() {
        let enhancement = parse_enhancement(FULL_REPLY).unwrap();
        let leave = enhancement.options[1].effects.as_ref().unwrap();
        for seed in 0..50 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let delta = leave.sample(&mut rng);
            assert_eq!(delta.credits, 0);
            assert!((1..=3).contains(&delta.energy));
            assert_eq!(delta.money, 0);
        }
    }

    #[test]
    fn inverted_ranges_sample_without_panicking() {
        let effects: OptionEffects =
            serde_json::from_str(r#"{"luck": {"min": 3, "max": -3}}"#).unwrap();
        for seed in 0..20 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            assert!((-3..=3).contains(&effects.sample(&mut rng).luck));
        }
        let direct = EffectRange { min: 5, max: 5 };
        assert_eq!(direct.sample(&mut ChaCha20Rng::seed_from_u64(1)), 5);
    }

    #[test]
    fn extracts_json_embedded_in_prose() {
        let reply = "Sure! Here it is: {\"description\": \"Rainy day.\", \"choices\": []} Enjoy.";
        let enhancement = parse_enhancement(reply).unwrap();
        assert_eq!(enhancement.story.as_deref(), Some("Rainy day."));
        assert!(!enhancement.has_options());
    }

    #[test]
    fn malformed_replies_are_none() {
        for reply in [
            "",
            "no json here",
            "{broken",
            "[1, 2]",
            "{\"title\": \"   \"}",
            "{\"title\": \"Only a title\"}",
            "```\n```",
        ] {
            assert!(parse_enhancement(reply).is_none(), "{reply:?} parsed");
        }
    }

    #[test]
    fn ranges_accept_reversed_and_float_bounds() {
        let reply = r#"{"options":[{"label":"x","effects":{"money":[50, -10.6],"luck":[1]}}]}"#;
        let enhancement = parse_enhancement(reply).unwrap();
        let effects = enhancement.options[0].effects.as_ref().unwrap();
        assert_eq!(effects.0.get(&Quantity::Money), Some(&EffectRange::new(-11, 50)));
        assert!(!effects.0.contains_key(&Quantity::Luck));
    }

    #[test]
    fn prompt_carries_label_and_bounded_context() {
        let refs = ReferenceLists {
            foods: (0..40).map(|i| format!("food-{i}")).collect(),
            ..ReferenceLists::empty()
        };
        let request = EnhancementRequest::new(TileKind::Food, "Cafeteria", &refs);
        assert_eq!(request.context.foods.len(), 20);
        let prompt = request.prompt();
        assert!(prompt.contains("<tile>Cafeteria</tile>"));
        assert!(prompt.contains("food-19"));
        assert!(!prompt.contains("food-20"));
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> Result<String, EnhancementError> {
            Err(EnhancementError::Unavailable("no api key".to_string()))
        }
    }

    struct CannedGenerator(&'static str);

    impl TextGenerator for CannedGenerator {
        fn generate(&self, _prompt: &str) -> Result<String, EnhancementError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn failures_and_garbage_fall_back_to_none() {
        let request = EnhancementRequest::new(TileKind::Class, "Faculty", &ReferenceLists::empty());
        assert!(enhance_or_default(&TextEnhancer::new(FailingGenerator), &request).is_none());
        assert!(enhance_or_default(&TextEnhancer::new(CannedGenerator("???")), &request).is_none());
        assert!(enhance_or_default(&NoEnhancement, &request).is_none());
        let canned = TextEnhancer::new(CannedGenerator(FULL_REPLY));
        assert!(enhance_or_default(&canned, &request).is_some());
    }

    #[test]
    fn closures_act_as_enhancers() {
        let request = EnhancementRequest::new(TileKind::Neutral, "N", &ReferenceLists::empty());
        let empty = |_: &EnhancementRequest| Ok::<_, EnhancementError>(Some(Enhancement::default()));
        assert!(enhance_or_default(&empty, &request).is_none());
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use super::super::*;
        use std::time::Duration;

        struct Slow;

        impl AsyncEnhancer for Slow {
            async fn enhance(
                &self,
                _request: &EnhancementRequest,
            ) -> Result<Option<Enhancement>, EnhancementError> {
                tokio::time::sleep(Duration::from_millis(250)).await;
                Ok(parse_enhancement(r#"{"story": "late"}"#))
            }
        }

        struct Quick;

        impl AsyncEnhancer for Quick {
            async fn enhance(
                &self,
                _request: &EnhancementRequest,
            ) -> Result<Option<Enhancement>, EnhancementError> {
                Ok(parse_enhancement(r#"{"story": "on time"}"#))
            }
        }

        #[tokio::test]
        async fn timeout_degrades_to_none() {
            let request =
                EnhancementRequest::new(TileKind::Food, "Food", &ReferenceLists::empty());
            let slow = enhance_with_timeout(&Slow, &request, Duration::from_millis(10)).await;
            assert!(slow.is_none());
            let quick = enhance_with_timeout(&Quick, &request, Duration::from_secs(1)).await;
            assert_eq!(quick.and_then(|e| e.story).as_deref(), Some("on time"));
        }
    }
}
