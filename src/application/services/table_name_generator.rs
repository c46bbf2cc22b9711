//! Evocative table name suggestions in a dark fantasy register

use crate::application::ports::outbound::SecureRandomPort;

const ADJECTIVES: &[&str] = &[
    "Cursed", "Forgotten", "Burning", "Frozen", "Bleeding", "Twisted", "Haunted", "Shattered",
    "Whispering", "Dread", "Endless", "Rotting", "Vengeful", "Sunken", "Screaming", "Blighted",
    "Wretched", "Nameless", "Hungry", "Creeping",
];

const NOUNS: &[&str] = &[
    "Crypts", "Vale", "Depths", "Halls", "Tombs", "Wastes", "Ruins", "Shadows", "Cairns",
    "Barrows", "Spire", "Chambers", "Labyrinth", "Chasm", "Maw", "Ossuary", "Catacombs",
    "Sanctum", "Threshold", "Abyss",
];

const PREFIXES: &[&str] = &[
    "Beyond the", "Beneath the", "Within the", "Through the", "Into the", "From the",
    "Above the", "Of the", "Across the", "Among the", "Below the", "Inside the", "Toward the",
    "At the", "Near the",
];

const INTENSIFIERS: &[&str] = &[
    "of Darkness", "of Blood", "of Bone", "of Sorrow", "of Death", "of Despair", "of Ruin",
    "of Silence", "of Flame", "of Shadow",
];

const PATTERN_COUNT: u32 = 6;

fn pick(rng: &dyn SecureRandomPort, words: &'static [&'static str]) -> &'static str {
    words[rng.random_range(0, (words.len() - 1) as u32) as usize]
}

/// A random name such as "The Cursed Crypts" or "Beneath the Halls of Bone"
pub fn suggest_table_name(rng: &dyn SecureRandomPort) -> String {
    match rng.random_range(0, PATTERN_COUNT - 1) {
        0 => format!("The {} {}", pick(rng, ADJECTIVES), pick(rng, NOUNS)),
        1 => format!("{} {}", pick(rng, ADJECTIVES), pick(rng, NOUNS)),
        2 => format!("{} {}", pick(rng, NOUNS), pick(rng, INTENSIFIERS)),
        3 => format!(
            "The {} {} {}",
            pick(rng, ADJECTIVES),
            pick(rng, NOUNS),
            pick(rng, INTENSIFIERS)
        ),
        4 => format!(
            "{} {} {}",
            pick(rng, PREFIXES),
            pick(rng, ADJECTIVES),
            pick(rng, NOUNS)
        ),
        _ => format!(
            "{} {} {}",
            pick(rng, PREFIXES),
            pick(rng, NOUNS),
            pick(rng, INTENSIFIERS)
        ),
    }
}
