//! Security tip reference text

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipCategory {
    pub category: String,
    pub tips: Vec<String>,
}

impl TipCategory {
    fn define(category: &str, tips: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            tips: tips.iter().map(|t| t.to_string()).collect(),
        }
    }
}

pub fn reference_tips() -> Vec<TipCategory> {
    vec![
        TipCategory::define(
            "Phishing",
            &[
                "Always check the sender's email address carefully",
                "Hover over links to see the actual destination",
                "Be suspicious of urgent or threatening language",
                "Never enter credentials on pages accessed via email links",
            ],
        ),
        TipCategory::define(
            "Passwords",
            &[
                "Use unique passwords for every account",
                "Enable two-factor authentication when available",
                "Consider using a password manager",
                "Make passwords at least 12 characters long",
            ],
        ),
        TipCategory::define(
            "Social Engineering",
            &[
                "Verify requests through official channels",
                "Never give personal information over the phone",
                "Be skeptical of unexpected prizes or offers",
                "Trust your instincts if something feels wrong",
            ],
        ),
        TipCategory::define(
            "Network Security",
            &[
                "Avoid sensitive activities on public WiFi",
                "Use a VPN when connecting to untrusted networks",
                "Look for HTTPS on websites handling sensitive data",
                "Keep your devices' software updated",
            ],
        ),
    ]
}
