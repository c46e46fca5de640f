//! Mock external collaborators for testing

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use quillia_journal_core::{
    CipherError, GeneratedOutput, GenerationError, JudgeError, RawJudgement, StatJudge,
    StoryGenerator, StoryPrompt, TextCipher,
};
use quillia_types::{CharacterStats, OutputKind, Theme};

/// Generator returning a fixed narrative, or failing on demand
pub struct ScriptedGenerator {
    narrative: String,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn returning(narrative: &str) -> Self {
        Self {
            narrative: narrative.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            narrative: String::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times the provider was invoked
    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoryGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _prompt: &StoryPrompt,
        kind: OutputKind,
    ) -> Result<GeneratedOutput, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError("provider timed out".to_string()));
        }
        Ok(match kind {
            OutputKind::Text => GeneratedOutput::Text(self.narrative.clone()),
            OutputKind::Image => GeneratedOutput::Image {
                url: "https://images.example.com/scene.png".to_string(),
            },
        })
    }
}

/// Judge returning a scripted raw judgement, or failing on demand
pub struct ScriptedJudge {
    judgement: Mutex<RawJudgement>,
    fail: bool,
}

impl ScriptedJudge {
    pub fn returning(judgement: RawJudgement) -> Self {
        Self {
            judgement: Mutex::new(judgement),
            fail: false,
        }
    }

    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            judgement: Mutex::new(RawJudgement::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl StatJudge for ScriptedJudge {
    async fn judge_entry(
        &self,
        _original_text: &str,
        _reimagined_text: &str,
        _theme: &Theme,
        _current_stats: &CharacterStats,
    ) -> Result<RawJudgement, JudgeError> {
        if self.fail {
            return Err(JudgeError("judge unavailable".to_string()));
        }
        Ok(self.judgement.lock().unwrap().clone())
    }
}

/// Cipher that reversibly tags text, so tests can tell cipher output
/// from plaintext
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggingCipher;

impl TextCipher for TaggingCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        Ok(format!("enc:{plaintext}"))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        ciphertext
            .strip_prefix("enc:")
            .map(str::to_string)
            .ok_or_else(|| CipherError("not ciphertext".to_string()))
    }
}

/// Convenience: an `Arc`'d tagging cipher
#[allow(dead_code)]
pub fn tagging_cipher() -> Arc<dyn TextCipher> {
    Arc::new(TaggingCipher)
}
