//! Level definitions and per-level progress

use super::{SceneType, Scenario};
use serde::{Deserialize, Serialize};

/// A themed unit of the campaign
///
/// The content fields never change at runtime; `is_unlocked`,
/// `is_completed` and `best_score` are the player's progress on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub scene: SceneType,
    pub intro_dialogue: Vec<String>,
    pub completion_dialogue: Vec<String>,

    #[serde(default)]
    pub scenarios: Vec<Scenario>,

    // Progress
    pub is_unlocked: bool,
    pub is_completed: bool,
    pub best_score: u32,
}

impl Level {
    #[allow(clippy::too_many_arguments)]
    fn define(
        id: u32,
        title: &str,
        description: &str,
        icon: &str,
        color: &str,
        scene: SceneType,
        intro: &[&str],
        completion: &[&str],
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            scene,
            intro_dialogue: intro.iter().map(|s| s.to_string()).collect(),
            completion_dialogue: completion.iter().map(|s| s.to_string()).collect(),
            scenarios: Vec::new(),
            is_unlocked: id == 1,
            is_completed: false,
            best_score: 0,
        }
    }

    /// Maximum score reachable in one attempt
    pub fn max_score(&self) -> u32 {
        self.scenarios.iter().map(|s| s.points).sum()
    }

    /// Difficulty pips shown on the level card (1-5)
    pub fn difficulty(&self) -> u8 {
        self.id.clamp(1, 5) as u8
    }
}

/// Reference level definitions, progress reset, without scenario pools
pub fn reference_levels() -> Vec<Level> {
    vec![
        Level::define(
            1,
            "Phishing Detection",
            "Learn to identify malicious emails and links",
            "Mail",
            "#FF4444",
            SceneType::Office,
            &[
                "Welcome to your first day at CyberCorp! I'm here to help you learn about cybersecurity.",
                "Today we'll start with phishing detection - one of the most common cyber threats.",
                "Phishing emails try to trick you into giving away personal information or clicking malicious links.",
                "Let's practice identifying these threats together!",
            ],
            &[
                "Excellent work! You've successfully identified the phishing attempts.",
                "Remember: always check sender addresses carefully and be suspicious of urgent requests.",
                "You're well on your way to becoming a cybersecurity expert!",
            ],
        ),
        Level::define(
            2,
            "Password Security",
            "Master strong password creation and management",
            "Lock",
            "#44FF44",
            SceneType::Terminal,
            &[
                "Time to learn about password security - your first line of defense!",
                "Weak passwords are like leaving your front door wide open.",
                "We'll practice creating strong passwords and recognizing weak ones.",
                "Ready to secure your digital life?",
            ],
            &[
                "Great job! You now understand what makes a password strong.",
                "Remember: use unique passwords for every account and enable 2FA when possible.",
                "Your accounts are now much safer!",
            ],
        ),
        Level::define(
            3,
            "Social Engineering",
            "Recognize manipulation tactics and scams",
            "Users",
            "#FF8844",
            SceneType::Home,
            &[
                "Social engineering is when criminals manipulate people to reveal information.",
                "They might pretend to be from your bank, a tech company, or even a friend.",
                "The key is to always verify requests through official channels.",
                "Let's practice spotting these manipulation tactics!",
            ],
            &[
                "Excellent! You've learned to spot social engineering attempts.",
                "Trust your instincts - if something feels wrong, it probably is.",
                "Always verify suspicious requests independently!",
            ],
        ),
        Level::define(
            4,
            "Network Security",
            "Navigate public WiFi and secure connections",
            "Wifi",
            "#4488FF",
            SceneType::Cafe,
            &[
                "Public WiFi can be convenient, but it's also dangerous if not used carefully.",
                "Hackers can intercept your data on unsecured networks.",
                "We'll learn how to stay safe when connecting to public networks.",
                "Let's explore network security together!",
            ],
            &[
                "Well done! You now know how to use public WiFi safely.",
                "Remember: avoid sensitive activities on public networks and use VPNs when possible.",
                "Your data is now much more secure!",
            ],
        ),
        Level::define(
            5,
            "Safe Downloads",
            "Identify trusted software and avoid malware",
            "Download",
            "#FF44FF",
            SceneType::Lab,
            &[
                "Downloading files from the internet can be risky if you're not careful.",
                "Malware often disguises itself as legitimate software or media files.",
                "We'll learn how to identify safe download sources and avoid malicious files.",
                "Ready to become a download detective?",
            ],
            &[
                "Fantastic! You can now identify safe and unsafe downloads.",
                "Always download from official sources and scan files with antivirus software.",
                "Your computer is now much safer from malware!",
            ],
        ),
        Level::define(
            6,
            "Privacy Settings",
            "Control your digital footprint on social media",
            "Settings",
            "#44FFFF",
            SceneType::Home,
            &[
                "Your privacy settings control who can see your personal information online.",
                "Many people share too much information without realizing the risks.",
                "We'll learn how to protect your privacy on social media and other platforms.",
                "Let's take control of your digital footprint!",
            ],
            &[
                "Excellent work! You now know how to protect your privacy online.",
                "Remember: regularly review your privacy settings and think before you post.",
                "Your personal information is now much more secure!",
            ],
        ),
        Level::define(
            7,
            "Advanced Security",
            "Master 2FA, VPNs, and security updates",
            "Shield",
            "#8B5FFF",
            SceneType::ControlCenter,
            &[
                "Welcome to advanced cybersecurity! You've come so far.",
                "Now we'll master the most powerful security tools: 2FA, VPNs, and security updates.",
                "These tools will make you nearly invulnerable to most cyber attacks.",
                "Ready to become a true CyberGuardian?",
            ],
            &[
                "Incredible! You've mastered advanced cybersecurity techniques.",
                "You're now equipped with the knowledge to protect yourself and others.",
                "Congratulations on becoming a true CyberGuardian!",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_level_starts_unlocked() {
        let levels = reference_levels();
        assert_eq!(levels.len(), 7);
        for level in &levels {
            assert_eq!(level.is_unlocked, level.id == 1);
            assert!(!level.is_completed);
            assert_eq!(level.best_score, 0);
        }
    }

    #[test]
    fn ids_are_strictly_ascending_from_one() {
        let ids: Vec<u32> = reference_levels().iter().map(|l| l.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }
}
