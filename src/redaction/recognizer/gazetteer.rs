//! Lexicon-based statistical entity recognizer
//!
//! Candidates are maximal runs of capitalized words on one line, excluding
//! stop words and title cues. Each run is scored per kind as a weighted sum of
//! features (lexicon hit ratio, cue words before or after, sentence position,
//! run length) and the best kind is emitted when its logistic confidence
//! exceeds 0.5. Weights and lexicons come from a TOML model file; the default
//! model is embedded in the binary.

use super::EntityRecognizer;
use crate::domain::{RedactorError, Result};
use crate::redaction::models::{DetectionSource, EntityKind, Span};
use crate::redaction::text::OffsetMap;
use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;

const BUNDLED_MODEL: &str = include_str!("../../../models/default_gazetteer.toml");

/// Word tokens: letters with optional internal apostrophes or hyphens
const TOKEN_PATTERN: &str = r"\p{L}[\p{L}\p{M}]*(?:['’-]\p{L}[\p{L}\p{M}]*)*";

/// Minimum confidence for a candidate to be reported at all
const DECISION_THRESHOLD: f32 = 0.5;

#[derive(Debug, Deserialize)]
struct ModelFile {
    model: ModelInfo,
    #[serde(default)]
    weights: Weights,
    lexicon: LexiconFile,
    #[serde(default)]
    cues: CueFile,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

/// Feature weights of the scoring function
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Constant term
    pub bias: f32,
    /// Added for every candidate (all candidates are capitalized)
    pub capitalized: f32,
    /// Added per token beyond the first
    pub multi_token: f32,
    /// Added when the run opens a sentence and no lexicon knows any token
    pub sentence_initial: f32,
    /// Multiplied by the fraction of tokens found in the kind's lexicon
    pub gazetteer: f32,
    /// Added when the preceding word is a cue for the kind
    pub prefix_cue: f32,
    /// Added when the run ends with an organization suffix
    pub suffix_cue: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            bias: -2.0,
            capitalized: 1.5,
            multi_token: 0.5,
            sentence_initial: -1.0,
            gazetteer: 3.0,
            prefix_cue: 1.5,
            suffix_cue: 2.5,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    person: Vec<String>,
    #[serde(default)]
    location: Vec<String>,
    #[serde(default)]
    org: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CueFile {
    #[serde(default)]
    person_prefix: Vec<String>,
    #[serde(default)]
    location_prefix: Vec<String>,
    #[serde(default)]
    org_suffix: Vec<String>,
    #[serde(default)]
    stopwords: Vec<String>,
}

fn word_set(words: Vec<String>) -> HashSet<String> {
    words.into_iter().map(|w| w.trim().to_lowercase()).collect()
}

#[derive(Debug)]
struct Token {
    start: usize,
    end: usize,
    key: String,
    capitalized: bool,
}

/// Lexicon model recognizer
#[derive(Debug)]
pub struct GazetteerRecognizer {
    name: String,
    fingerprint: String,
    weights: Weights,
    persons: HashSet<String>,
    locations: HashSet<String>,
    orgs: HashSet<String>,
    person_prefix: HashSet<String>,
    location_prefix: HashSet<String>,
    org_suffix: HashSet<String>,
    stopwords: HashSet<String>,
    tokenizer: Regex,
}

impl GazetteerRecognizer {
    /// Load the model embedded in the crate
    pub fn bundled() -> Result<Self> {
        Self::from_toml(BUNDLED_MODEL)
    }

    /// Load a model from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RedactorError::Io(format!("Failed to read model file {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Load a model from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ModelFile = toml::from_str(content)
            .map_err(|e| RedactorError::Configuration(format!("Invalid model file: {e}")))?;

        if file.model.name.trim().is_empty() {
            return Err(RedactorError::Configuration(
                "Model name must not be empty".to_string(),
            ));
        }
        if file.lexicon.person.is_empty()
            && file.lexicon.location.is_empty()
            && file.lexicon.org.is_empty()
        {
            return Err(RedactorError::Configuration(format!(
                "Model '{}' has no lexicon entries",
                file.model.name
            )));
        }

        let tokenizer = Regex::new(TOKEN_PATTERN)
            .map_err(|e| RedactorError::Configuration(format!("Invalid token pattern: {e}")))?;

        let digest = Sha256::digest(content.as_bytes());
        let name = match &file.model.version {
            Some(version) => format!("{}@{}", file.model.name, version),
            None => file.model.name.clone(),
        };

        Ok(Self {
            name,
            fingerprint: format!("{digest:x}"),
            weights: file.weights,
            persons: word_set(file.lexicon.person),
            locations: word_set(file.lexicon.location),
            orgs: word_set(file.lexicon.org),
            person_prefix: word_set(file.cues.person_prefix),
            location_prefix: word_set(file.cues.location_prefix),
            org_suffix: word_set(file.cues.org_suffix),
            stopwords: word_set(file.cues.stopwords),
            tokenizer,
        })
    }

    /// Scoring weights in use
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenizer
            .find_iter(text)
            .map(|m| {
                let word = m.as_str();
                let lower = word.to_lowercase();
                let key = lower
                    .strip_suffix("'s")
                    .or_else(|| lower.strip_suffix("’s"))
                    .map(str::to_string)
                    .unwrap_or(lower);
                Token {
                    start: m.start(),
                    end: m.end(),
                    key,
                    capitalized: word.chars().next().is_some_and(char::is_uppercase),
                }
            })
            .collect()
    }

    fn is_candidate(&self, token: &Token) -> bool {
        token.capitalized
            && !self.stopwords.contains(&token.key)
            && !self.person_prefix.contains(&token.key)
    }

    fn opens_sentence(&self, text: &str, first: &Token, prev: Option<&Token>) -> bool {
        if prev.is_some_and(|p| self.person_prefix.contains(&p.key)) {
            return false;
        }
        let before = text[..first.start].trim_end_matches(|c: char| c == ' ' || c == '\t');
        match before.chars().last() {
            None => true,
            Some(c) => matches!(c, '.' | '!' | '?' | '\n' | '\r'),
        }
    }

    fn score_run(&self, text: &str, run: &[Token], prev: Option<&Token>) -> (EntityKind, f32) {
        let w = &self.weights;
        let n = run.len() as f32;
        let ratio = |lexicon: &HashSet<String>| {
            run.iter().filter(|t| lexicon.contains(&t.key)).count() as f32 / n
        };
        let person_hits = ratio(&self.persons);
        let location_hits = ratio(&self.locations);
        let org_hits = ratio(&self.orgs);
        let known = person_hits + location_hits + org_hits > 0.0;

        let mut base = w.bias + w.capitalized + w.multi_token * (n - 1.0);
        if !known && self.opens_sentence(text, &run[0], prev) {
            base += w.sentence_initial;
        }

        let prev_key = prev.map(|t| t.key.as_str());
        let cue = |set: &HashSet<String>, key: Option<&str>| match key {
            Some(k) if set.contains(k) => 1.0,
            _ => 0.0,
        };
        let last_key = run.last().map(|t| t.key.as_str());

        let candidates = [
            (
                EntityKind::Person,
                base + w.gazetteer * person_hits + w.prefix_cue * cue(&self.person_prefix, prev_key),
            ),
            (
                EntityKind::Location,
                base + w.gazetteer * location_hits
                    + w.prefix_cue * cue(&self.location_prefix, prev_key),
            ),
            (
                EntityKind::Org,
                base + w.gazetteer * org_hits + w.suffix_cue * cue(&self.org_suffix, last_key),
            ),
            (EntityKind::Misc, base),
        ];

        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }
        (best.0, sigmoid(best.1))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Check that only spaces or tabs separate two tokens
fn inline_gap(text: &str, end: usize, next_start: usize) -> bool {
    text[end..next_start].chars().all(|c| c == ' ' || c == '\t')
}

impl EntityRecognizer for GazetteerRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }

    fn recognize(&self, text: &str) -> Result<Vec<Span>> {
        let map = OffsetMap::new(text);
        let tokens = self.tokenize(text);
        let mut spans = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            if !self.is_candidate(&tokens[i]) {
                i += 1;
                continue;
            }
            let mut j = i + 1;
            while j < tokens.len()
                && self.is_candidate(&tokens[j])
                && inline_gap(text, tokens[j - 1].end, tokens[j].start)
            {
                j += 1;
            }

            let run = &tokens[i..j];
            let prev = i.checked_sub(1).map(|p| &tokens[p]);
            let (kind, confidence) = self.score_run(text, run, prev);
            if confidence > DECISION_THRESHOLD {
                let (start, end) = map
                    .char_range(run[0].start, run[j - i - 1].end)
                    .ok_or_else(|| {
                        RedactorError::RecognizerFault(
                            "token is not on char boundaries".to_string(),
                        )
                    })?;
                spans.push(
                    Span::new(start, end, kind, DetectionSource::Nlp).with_confidence(confidence),
                );
            }
            i = j;
        }

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(text: &str) -> Vec<(String, EntityKind)> {
        let model = GazetteerRecognizer::bundled().unwrap();
        let chars: Vec<char> = text.chars().collect();
        model
            .recognize(text)
            .unwrap()
            .iter()
            .map(|s| (chars[s.start..s.end].iter().collect(), s.kind))
            .collect()
    }

    #[test]
    fn test_bundled_model_loads() {
        let model = GazetteerRecognizer::bundled().unwrap();
        assert!(model.name().starts_with("clinical-gazetteer"));
        assert_eq!(model.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn test_person_and_location() {
        assert_eq!(
            entities("John lives in Boston"),
            vec![
                ("John".to_string(), EntityKind::Person),
                ("Boston".to_string(), EntityKind::Location),
            ]
        );
    }

    #[test]
    fn test_title_cue_marks_unknown_surname() {
        assert_eq!(
            entities("Please ask Dr. Okonkwo about the dosage."),
            vec![("Okonkwo".to_string(), EntityKind::Person)]
        );
    }

    #[test]
    fn test_multi_token_person() {
        assert_eq!(
            entities("The referral came from Sarah Johnson yesterday."),
            vec![("Sarah Johnson".to_string(), EntityKind::Person)]
        );
    }

    #[test]
    fn test_org_suffix() {
        assert_eq!(
            entities("She was admitted to Mercy Hospital overnight."),
            vec![("Mercy Hospital".to_string(), EntityKind::Org)]
        );
    }

    #[test]
    fn test_sentence_initial_common_word_ignored() {
        assert!(entities("Contact me tomorrow. Results look fine.").is_empty());
    }

    #[test]
    fn test_lowercase_text_has_no_entities() {
        assert!(entities("the patient reports mild pain after surgery").is_empty());
    }

    #[test]
    fn test_possessive_is_looked_up_without_suffix() {
        assert_eq!(
            entities("We reviewed Maria's chart"),
            vec![("Maria's".to_string(), EntityKind::Person)]
        );
    }

    #[test]
    fn test_runs_do_not_cross_lines() {
        let found = entities("Seen by John\nBoston office closed");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "John");
        assert_eq!(found[1].0, "Boston");
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let model = GazetteerRecognizer::bundled().unwrap();
        let spans = model.recognize("Café visit with Zoe").unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (16, 19));
        assert!(spans[0].confidence > 0.5);
    }

    #[test]
    fn test_custom_model_from_toml() {
        let model = GazetteerRecognizer::from_toml(
            r#"
            [model]
            name = "tiny"

            [lexicon]
            location = ["springfield"]
            "#,
        )
        .unwrap();
        assert_eq!(model.name(), "tiny");
        let spans = model.recognize("Moved to Springfield").unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, EntityKind::Location);
    }

    #[test]
    fn test_model_without_lexicon_is_rejected() {
        let err = GazetteerRecognizer::from_toml("[model]\nname = \"empty\"\n[lexicon]\n")
            .unwrap_err();
        assert!(matches!(err, RedactorError::Configuration(_)));
    }

    #[test]
    fn test_missing_model_file() {
        let err = GazetteerRecognizer::from_file("/nonexistent/model.toml").unwrap_err();
        assert!(matches!(err, RedactorError::Io(_)));
    }
}
