//! AI coach - persona-flavoured advice built from the latest session

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::TrainingRecord;
use crate::llm::{LlmError, TextGenerator};
use crate::ml::Analytics;
use crate::ml::predictor::predict_next_weight;
use crate::tips;

/// Below this many records the auto mode treats the user as a beginner
const BEGINNER_RECORDS: usize = 30;

/// Coaching voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    DrillInstructor,
    Cheerleader,
    SystemVoice,
    /// No provider calls
    Off,
}

struct PersonaProfile {
    label: &'static str,
    emoji: &'static str,
    system_prompt: Option<&'static str>,
}

/// Indexed by `Persona as usize`
const PERSONAS: [PersonaProfile; 4] = [
    PersonaProfile {
        label: "Drill instructor",
        emoji: "🪖",
        system_prompt: Some(
            "You are a strict, loud drill instructor coaching a lifter.\n\
             Rules:\n\
             1. Short, commanding sentences.\n\
             2. No praise for merely showing up; demand the next rep.\n\
             3. Give one concrete target for today's working weight.\n\
             4. Never encourage unsafe form.",
        ),
    },
    PersonaProfile {
        label: "Cheerleader",
        emoji: "📣",
        system_prompt: Some(
            "You are an overprotective training manager who adores the user.\n\
             Rules:\n\
             1. Use no technical jargon at all.\n\
             2. Praise them generously for coming to the gym and logging their sets.\n\
             3. Tell them exactly what to do today so they never have to decide.\n\
             4. Be bright and cheerful, emoji welcome.",
        ),
    },
    PersonaProfile {
        label: "System voice",
        emoji: "🤖",
        system_prompt: Some(
            "You are a cold, data-driven training analysis system.\n\
             Rules:\n\
             1. Reason in terms of progressive overload and training volume.\n\
             2. No praise; state the facts in the data and what to improve.\n\
             3. Propose a specific weight that beats the previous session.\n\
             4. Polite but clinical and brief.",
        ),
    },
    PersonaProfile {
        label: "Off",
        emoji: "💤",
        system_prompt: None,
    },
];

impl Persona {
    fn profile(self) -> &'static PersonaProfile {
        &PERSONAS[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.profile().label
    }

    pub fn emoji(self) -> &'static str {
        self.profile().emoji
    }

    /// `None` for [`Persona::Off`]
    pub fn system_prompt(self) -> Option<&'static str> {
        self.profile().system_prompt
    }
}

/// Persona selection: fixed, or picked from the user's experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersonaMode {
    #[default]
    Auto,
    Fixed(Persona),
}

impl PersonaMode {
    /// Auto: cheerleader for beginners, system voice afterwards
    pub fn resolve(self, record_count: usize) -> Persona {
        match self {
            PersonaMode::Fixed(persona) => persona,
            PersonaMode::Auto if record_count < BEGINNER_RECORDS => Persona::Cheerleader,
            PersonaMode::Auto => Persona::SystemVoice,
        }
    }
}

impl FromStr for PersonaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "drill" | "drill-instructor" => Ok(Self::Fixed(Persona::DrillInstructor)),
            "cheer" | "cheerleader" => Ok(Self::Fixed(Persona::Cheerleader)),
            "system" | "system-voice" => Ok(Self::Fixed(Persona::SystemVoice)),
            "off" => Ok(Self::Fixed(Persona::Off)),
            other => Err(format!("Unknown persona: {} (auto, drill, cheer, system, off)", other)),
        }
    }
}

/// Prompt pair ready for the provider
#[derive(Debug, Clone, PartialEq)]
pub struct CoachingPrompt {
    pub persona: Persona,
    pub exercise: String,
    pub system: String,
    pub user: String,
}

/// Build the prompt around the most recent record; `None` without records or with the coach off
pub fn build_prompt(records: &[TrainingRecord], persona: Persona, today: NaiveDate) -> Option<CoachingPrompt> {
    let system = persona.system_prompt()?;
    let analytics = Analytics::new(records.to_vec());
    let last = analytics.latest()?;
    let days_since = (today - last.date).num_days();

    let prediction_text = match predict_next_weight(records, &last.exercise, today) {
        Some(kg) => format!("Based on the growth trend so far, today's working weight is {} kg.", kg),
        None => "Not enough data for a prediction yet; keep logging sessions.".to_string(),
    };

    let user = format!(
        "[User data]\n\
         - Last training date: {} ({} days ago)\n\
         - Last exercise: {}\n\
         - Last weight: {} kg\n\
         - Last reps: {}\n\
         \n\
         [Trend model recommendation]\n\
         {}\n\
         \n\
         Use this recommendation to tell the user today's goal.\n\
         If it looks too hard, say it is fine to lower it a little.\n\
         Answer in 150 characters or fewer.",
        last.date.format("%Y-%m-%d"),
        days_since,
        last.exercise,
        last.weight(),
        last.rep_count(),
        prediction_text,
    );

    Some(CoachingPrompt {
        persona,
        exercise: last.exercise.clone(),
        system: system.to_string(),
        user,
    })
}

/// Why advice came from the static fallback instead of the provider
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    NoData,
    Disabled,
    NotConfigured,
    ProviderFailed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "no data yet, log your first session"),
            Self::Disabled => write!(f, "AI coach is off"),
            Self::NotConfigured => write!(f, "AI coach not configured (set OPENAI_API_KEY)"),
            Self::ProviderFailed(reason) => write!(f, "AI coach unavailable: {}", reason),
        }
    }
}

/// Advice shown on the dashboard
#[derive(Debug, Clone, PartialEq)]
pub enum Advice {
    Generated { persona: Persona, text: String },
    Fallback { reason: FallbackReason, line: &'static str },
}

impl Advice {
    pub fn is_generated(&self) -> bool {
        matches!(self, Advice::Generated { .. })
    }

    pub fn text(&self) -> String {
        match self {
            Advice::Generated { persona, text } => format!("{} {}", persona.emoji(), text),
            Advice::Fallback { reason, line } => format!("{}\n({})", line, reason),
        }
    }
}

/// Builds prompts and asks the provider, degrading to static lines on any failure
pub struct Coach<G: TextGenerator> {
    generator: Option<G>,
    mode: PersonaMode,
}

impl<G: TextGenerator> Coach<G> {
    /// `generator` is `None` when no provider credential is configured
    pub fn new(generator: Option<G>, mode: PersonaMode) -> Self {
        Self { generator, mode }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn advise(&self, records: &[TrainingRecord], today: NaiveDate) -> Advice {
        let persona = self.mode.resolve(records.len());
        let fallback = |reason: FallbackReason| Advice::Fallback {
            reason,
            line: tips::fallback_line(persona),
        };

        if persona == Persona::Off {
            return fallback(FallbackReason::Disabled);
        }
        let Some(prompt) = build_prompt(records, persona, today) else {
            return fallback(FallbackReason::NoData);
        };
        let Some(generator) = &self.generator else {
            return fallback(FallbackReason::NotConfigured);
        };

        info!("Asking AI coach ({}) about {}", persona.label(), prompt.exercise);
        match generator.complete(&prompt.system, &prompt.user).await {
            Ok(text) => Advice::Generated { persona, text },
            Err(LlmError::NotConfigured) => fallback(FallbackReason::NotConfigured),
            Err(e) => {
                warn!("AI coach failed: {}", e);
                fallback(FallbackReason::ProviderFailed(e.to_string()))
            }
        }
    }
}
