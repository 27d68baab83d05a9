// keyword checks on user messages
// plain substring matching, so paraphrases slip through and unrelated words can hit

pub struct Keywords {
    phrases: &'static [&'static str],
}

// phrases that suggest self-harm or suicidal intent
pub const CRISIS: Keywords = Keywords::new(&[
    "suicide",
    "kill myself",
    "end it all",
    "want to die",
    "better off dead",
    "hurt myself",
    "self harm",
    "no reason to live",
]);

// phrases that open the breathing exercise in the chat client
pub const BREATHING: Keywords = Keywords::new(&[
    "breathing exercise",
    "calm down",
    "relax",
    "anxiety",
    "stressed",
    "panic",
    "overwhelmed",
    "breathing",
    "calm me",
]);

impl Keywords {
    pub const fn new(phrases: &'static [&'static str]) -> Self {
        Self { phrases }
    }

    /// First phrase contained in `text`, ignoring case.
    pub fn matched(&self, text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        self.phrases
            .iter()
            .copied()
            .find(|phrase| lower.contains(phrase))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matched(text).is_some()
    }
}

pub fn is_crisis(text: &str) -> bool {
    CRISIS.matches(text)
}

pub fn wants_breathing(text: &str) -> bool {
    BREATHING.matches(text)
}
