//! Tips module - static coaching lines, shown when the AI coach is unavailable

use rand::seq::SliceRandom;

use crate::coach::Persona;

pub struct Tip {
    pub voice: Persona,
    pub text: &'static str,
}

pub const TIPS: &[Tip] = &[
    // === DRILL INSTRUCTOR ===
    Tip {
        voice: Persona::DrillInstructor,
        text: "Nobody is coming to lift that bar for you. Load it and move.",
    },
    Tip {
        voice: Persona::DrillInstructor,
        text: "Last session is the floor, not the ceiling. Beat it by one rep.",
    },
    Tip {
        voice: Persona::DrillInstructor,
        text: "Rest 90 seconds, not 9 minutes. The clock is running.",
    },
    Tip {
        voice: Persona::DrillInstructor,
        text: "Bad form is not heavy weight. Strip it down and do it right.",
    },
    // === CHEERLEADER ===
    Tip {
        voice: Persona::Cheerleader,
        text: "You showed up today, and that is already a win!",
    },
    Tip {
        voice: Persona::Cheerleader,
        text: "Every set you log is proof you are getting stronger. Keep going!",
    },
    Tip {
        voice: Persona::Cheerleader,
        text: "Same weight as last time is totally fine. Smooth reps first!",
    },
    Tip {
        voice: Persona::Cheerleader,
        text: "Drink some water, breathe, and have fun with the next set!",
    },
    // === SYSTEM VOICE ===
    Tip {
        voice: Persona::SystemVoice,
        text: "Progressive overload requires a measurable increase: add 2.5 kg or 1 rep versus the previous session.",
    },
    Tip {
        voice: Persona::SystemVoice,
        text: "Rest intervals: 90-120 s for hypertrophy, 2.5-5 min for maximal strength.",
    },
    Tip {
        voice: Persona::SystemVoice,
        text: "If reps dropped for two consecutive sessions, reduce load by 5-10% and rebuild.",
    },
    Tip {
        voice: Persona::SystemVoice,
        text: "Body parts untrained for more than 7 days should be prioritised in the next session.",
    },
];

/// Random tip from any voice
pub fn get_random_tip() -> &'static Tip {
    TIPS.choose(&mut rand::thread_rng()).unwrap_or(&TIPS[0])
}

/// Random tip in the given voice
pub fn get_random_tip_for(voice: Persona) -> Option<&'static Tip> {
    let filtered: Vec<_> = TIPS.iter().filter(|t| t.voice == voice).collect();
    filtered.choose(&mut rand::thread_rng()).copied()
}

/// Tip in `voice`, or any tip when that voice has none
pub fn fallback_line(voice: Persona) -> &'static str {
    get_random_tip_for(voice).unwrap_or_else(get_random_tip).text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tips_not_empty() {
        assert!(!TIPS.is_empty());
        assert!(TIPS.iter().all(|t| !t.text.is_empty()));
    }

    #[test]
    fn test_off_persona_has_no_tips() {
        assert!(get_random_tip_for(Persona::Off).is_none());
        assert!(!fallback_line(Persona::Off).is_empty());
    }

    #[test]
    fn test_every_speaking_persona_has_tips() {
        for voice in [Persona::DrillInstructor, Persona::Cheerleader, Persona::SystemVoice] {
            let tip = get_random_tip_for(voice);
            assert!(tip.is_some(), "{:?} should have tips", voice);
            assert_eq!(tip.unwrap().voice, voice);
        }
    }

    #[test]
    fn test_fallback_line_matches_voice() {
        for _ in 0..10 {
            let line = fallback_line(Persona::Cheerleader);
            assert!(TIPS.iter().any(|t| t.text == line && t.voice == Persona::Cheerleader));
        }
    }
}
