//! Built-in sound table.
//!
//! Patterns are plain data: [`SoundCatalog::builtin`](super::SoundCatalog::builtin)
//! compiles them once at startup.  All patterns are matched
//! case-insensitively.  Exclusions are checked against the sentence around
//! the match, not the whole message, so `^` anchors at the sentence start
//! (imperatives such as "Stop laughing").

use super::definition::{Category, PatternKind, Polarity};

/// Declarative description of one built-in sound.
pub(crate) struct SoundEntry {
    pub key: &'static str,
    pub category: Category,
    pub polarity: Polarity,
    pub description: &'static str,
    pub variations: &'static [&'static str],
    pub triggers: &'static [(&'static str, PatternKind)],
    pub exclusions: &'static [&'static str],
}

use PatternKind::{Action, Ambient, Dialogue, Direct};

pub(crate) const BUILTIN_SOUNDS: &[SoundEntry] = &[
    // ── Emotions ────────────────────────────────────────────────────────
    SoundEntry {
        key: "laugh",
        category: Category::Emotions,
        polarity: Polarity::Positive,
        description: "a person laughing out loud",
        variations: &[
            "emotions/laugh_1.ogg",
            "emotions/laugh_2.ogg",
            "emotions/laugh_3.ogg",
        ],
        triggers: &[
            (
                r"\b(?:laughed|laughing|chuckled|chuckling|giggled|giggling|cackled)\b",
                Action,
            ),
            (r"\blaughs?\s+(?:at|with|about|out)\b", Action),
            (r"\b(?:laughter|haha(?:ha)*)\b", Direct),
        ],
        exclusions: &[
            r"\b(?:don['’]?t|do\s+not|didn['’]?t|never|can['’]?t|won['’]?t)\s+(?:(?:even|really|ever|just)\s+)?laugh",
            r#"^["“']?(?:please,?\s+)?stop\s+laugh"#,
            r"\bwithout\s+(?:a\s+)?laugh",
            r"\bno\s+laughing\s+matter\b",
        ],
    },
    SoundEntry {
        key: "cry",
        category: Category::Emotions,
        polarity: Polarity::Negative,
        description: "a person crying or sobbing",
        variations: &["emotions/cry_1.ogg", "emotions/cry_2.ogg"],
        triggers: &[
            (
                r"\b(?:cried|crying|sobbed|sobbing|wept|weeping)\b",
                Action,
            ),
            (r"\b(?:sobs|tears\s+streamed)\b", Direct),
        ],
        exclusions: &[
            r"\b(?:don['’]?t|do\s+not|didn['’]?t|never)\s+(?:(?:even|really|ever|just)\s+)?cry",
            r#"^["“']?(?:please,?\s+)?stop\s+cry"#,
            r"\bcried\s+out\b",
            r"\bcry(?:ing)?\s+for\s+help\b",
        ],
    },
    SoundEntry {
        key: "gasp",
        category: Category::Emotions,
        polarity: Polarity::Neutral,
        description: "a sharp surprised intake of breath",
        variations: &["emotions/gasp_1.ogg", "emotions/gasp_2.ogg"],
        triggers: &[(r"\b(?:gasped|gasping|gasps)\b", Action)],
        exclusions: &[r"\blast\s+gasp\b"],
    },
    SoundEntry {
        key: "sigh",
        category: Category::Emotions,
        polarity: Polarity::Negative,
        description: "a long tired sigh",
        variations: &["emotions/sigh_1.ogg", "emotions/sigh_2.ogg"],
        triggers: &[(r"\b(?:sighed|sighing|sighs)\b", Action)],
        exclusions: &[
            r"\bdon['’]?t\s+sigh",
            r#"^["“']?(?:please,?\s+)?stop\s+sighing\b"#,
        ],
    },
    // ── Actions ─────────────────────────────────────────────────────────
    SoundEntry {
        key: "footsteps",
        category: Category::Actions,
        polarity: Polarity::Neutral,
        description: "footsteps walking across a floor",
        variations: &[
            "actions/footsteps_1.ogg",
            "actions/footsteps_2.ogg",
            "actions/footsteps_3.ogg",
        ],
        triggers: &[
            (
                r"\b(?:walked|walking|stepped|stepping|strode|paced|pacing|tiptoed)\b",
                Action,
            ),
            (r"\bfootsteps?\b", Direct),
        ],
        exclusions: &[
            r"\bwalked\s+(?:\w+\s+)?through\s+(?:the\s+)?(?:plan|idea|steps|details|process)\b",
            r"\bstepp(?:ed|ing)\s+(?:down|up|in)\s+(?:as|to)\b",
        ],
    },
    SoundEntry {
        key: "door",
        category: Category::Actions,
        polarity: Polarity::Neutral,
        description: "a door opening or closing",
        variations: &["actions/door_1.ogg", "actions/door_2.ogg"],
        triggers: &[
            (
                r"\b(?:opened|closed|slammed|shut|unlocked)\s+(?:the\s+|a\s+|her\s+|his\s+|their\s+)?door\b",
                Action,
            ),
            (r"\bdoor\s+(?:creaked|creaks|slammed|swung|clicked)\b", Direct),
        ],
        exclusions: &[
            r"\bdoor\s+to\s+(?:success|opportunity|the\s+future)\b",
            r"\b(?:opened|closed)\s+(?:the\s+)?door\s+(?:to|for|on)\s+(?:new|an?|any)\s+\w+",
        ],
    },
    SoundEntry {
        key: "knock",
        category: Category::Actions,
        polarity: Polarity::Neutral,
        description: "knuckles knocking on wood",
        variations: &["actions/knock_1.ogg", "actions/knock_2.ogg"],
        triggers: &[
            (r"\b(?:knocked|knocking|knocks)\s+(?:on|at)\b", Action),
            (r"\bknock,?\s+knock\b", Direct),
        ],
        exclusions: &[r"\bknock(?:ing|ed)?\s+on\s+wood\b"],
    },
    SoundEntry {
        key: "sword",
        category: Category::Actions,
        polarity: Polarity::Neutral,
        description: "a blade drawn from its sheath",
        variations: &["actions/sword_1.ogg", "actions/sword_2.ogg"],
        triggers: &[
            (
                r"\b(?:drew|unsheathed|sheathed)\s+(?:\w+\s+)?(?:sword|blade)\b",
                Action,
            ),
            (r"\bclash(?:ed|ing)?\s+of\s+(?:steel|swords)\b", Direct),
        ],
        exclusions: &[r"\bdouble[- ]edged\s+sword\b"],
    },
    // ── Ambient ─────────────────────────────────────────────────────────
    SoundEntry {
        key: "rain",
        category: Category::Ambient,
        polarity: Polarity::Neutral,
        description: "steady rainfall",
        variations: &["ambient/rain_1.ogg", "ambient/rain_2.ogg"],
        triggers: &[(r"\b(?:rain|raining|rained|drizzle|downpour)\b", Ambient)],
        exclusions: &[
            r"\brain\s+check\b",
            r"\brain(?:ed|ing)?\s+(?:money|praise|insults|blows)\b",
            r"\b(?:make\s+it\s+rain|right\s+as\s+rain)\b",
        ],
    },
    SoundEntry {
        key: "thunder",
        category: Category::Ambient,
        polarity: Polarity::Neutral,
        description: "a distant roll of thunder",
        variations: &["ambient/thunder_1.ogg", "ambient/thunder_2.ogg"],
        triggers: &[(
            r"\b(?:thunder|thundered|thunderstorm|lightning)\b",
            Ambient,
        )],
        exclusions: &[
            r"\bsteal\s+(?:\w+\s+)?thunder\b",
            r"\bthunderous\s+applause\b",
            r"\blightning\s+(?:fast|quick|round)\b",
        ],
    },
    SoundEntry {
        key: "wind",
        category: Category::Ambient,
        polarity: Polarity::Neutral,
        description: "wind howling through trees",
        variations: &["ambient/wind_1.ogg", "ambient/wind_2.ogg"],
        triggers: &[(r"\b(?:wind|winds|breeze|gust|gusts)\b", Ambient)],
        exclusions: &[
            r"\bwind\s+(?:down|up)\b",
            r"\bsecond\s+wind\b",
            r"\bgot\s+wind\s+of\b",
        ],
    },
    SoundEntry {
        key: "birds",
        category: Category::Ambient,
        polarity: Polarity::Positive,
        description: "birds chirping in the morning",
        variations: &["ambient/birds_1.ogg"],
        triggers: &[
            (
                r"\bbirds?\s+(?:sang|singing|chirped|chirping|tweeting)\b",
                Ambient,
            ),
            (r"\bbirdsong\b", Direct),
        ],
        exclusions: &[r"\btwo\s+birds\b", r"\bearly\s+bird\b"],
    },
    // ── Dialogue ────────────────────────────────────────────────────────
    SoundEntry {
        key: "whisper",
        category: Category::Dialogue,
        polarity: Polarity::Neutral,
        description: "a hushed whisper",
        variations: &["dialogue/whisper_1.ogg", "dialogue/whisper_2.ogg"],
        triggers: &[(r"\b(?:whispered|whispering|murmured)\b", Dialogue)],
        exclusions: &[r"\bwhisper(?:s|ed)?\s+of\s+(?:a|an|the)\b"],
    },
    SoundEntry {
        key: "shout",
        category: Category::Dialogue,
        polarity: Polarity::Neutral,
        description: "a loud shout",
        variations: &["dialogue/shout_1.ogg", "dialogue/shout_2.ogg"],
        triggers: &[(
            r"\b(?:shouted|yelled|screamed|bellowed|shouting|yelling)\b",
            Dialogue,
        )],
        exclusions: &[r"\bshout(?:ed)?\s+out\s+to\b"],
    },
];
