//! Scenario definitions
//!
//! Each scenario is one simulated threat the player must respond to,
//! with a fixed set of options and exactly one correct response.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Channel the threat arrives through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Email,
    Website,
    Message,
    Download,
    Social,
    Network,
}

impl ScenarioKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::Email => "Suspicious Email",
            ScenarioKind::Website => "Suspicious Website",
            ScenarioKind::Message => "Incoming Message",
            ScenarioKind::Download => "Download Prompt",
            ScenarioKind::Social => "Social Media",
            ScenarioKind::Network => "Network Alert",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ScenarioKind::Email => "✉",
            ScenarioKind::Website => "🌐",
            ScenarioKind::Message => "💬",
            ScenarioKind::Download => "⬇",
            ScenarioKind::Social => "👥",
            ScenarioKind::Network => "📶",
        }
    }
}

/// Payload shown to the player; which fields are set depends on the kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl ScenarioContent {
    pub fn email(subject: &str, sender: &str, body: &str) -> Self {
        Self {
            subject: Some(subject.to_string()),
            sender: Some(sender.to_string()),
            body: Some(body.to_string()),
            ..Self::default()
        }
    }

    pub fn website(url: &str, site_name: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            site_name: Some(site_name.to_string()),
            ..Self::default()
        }
    }

    pub fn message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn download(filename: &str, message: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn social(platform: &str, message: &str) -> Self {
        Self {
            platform: Some(platform.to_string()),
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Labelled lines for display, in a stable order
    pub fn lines(&self) -> Vec<(&'static str, &str)> {
        let fields: [(&'static str, &Option<String>); 8] = [
            ("From", &self.sender),
            ("Subject", &self.subject),
            ("Site", &self.site_name),
            ("URL", &self.url),
            ("Platform", &self.platform),
            ("File", &self.filename),
            ("", &self.body),
            ("", &self.message),
        ];
        fields
            .into_iter()
            .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
            .collect()
    }
}

/// A selectable response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

/// One multiple-choice challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub kind: ScenarioKind,
    pub content: ScenarioContent,
    pub options: Vec<ScenarioOption>,
    pub correct_answer: String,
    pub explanation: String,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_thought: Option<String>,
}

impl Scenario {
    /// Build a scenario; `is_correct` on each option is derived from `correct_answer`
    pub fn new(
        id: &str,
        kind: ScenarioKind,
        content: ScenarioContent,
        options: &[(&str, &str)],
        correct_answer: &str,
        explanation: &str,
        points: u32,
    ) -> Self {
        let options = options
            .iter()
            .map(|(option_id, text)| ScenarioOption {
                id: option_id.to_string(),
                text: text.to_string(),
                is_correct: *option_id == correct_answer,
            })
            .collect();

        Self {
            id: id.to_string(),
            kind,
            content,
            options,
            correct_answer: correct_answer.to_string(),
            explanation: explanation.to_string(),
            points,
            character_thought: None,
        }
    }

    pub fn with_thought(mut self, thought: &str) -> Self {
        self.character_thought = Some(thought.to_string());
        self
    }

    pub fn option(&self, option_id: &str) -> Option<&ScenarioOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn is_correct(&self, option_id: &str) -> bool {
        option_id == self.correct_answer
    }

    /// Check the option invariants, returning a description of the first violation
    pub fn check(&self) -> Result<(), String> {
        if self.options.len() < 2 {
            return Err(format!("scenario {} has fewer than 2 options", self.id));
        }

        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|o| o.id == option.id) {
                return Err(format!(
                    "scenario {} repeats option id {}",
                    self.id, option.id
                ));
            }
            if option.is_correct != (option.id == self.correct_answer) {
                return Err(format!(
                    "scenario {} option {} disagrees with correct answer {}",
                    self.id, option.id, self.correct_answer
                ));
            }
        }

        let matching = self
            .options
            .iter()
            .filter(|o| o.id == self.correct_answer)
            .count();
        if matching != 1 {
            return Err(format!(
                "scenario {} has {} options matching correct answer {}",
                self.id, matching, self.correct_answer
            ));
        }

        Ok(())
    }
}

/// Reference scenario pools keyed by level id
pub fn reference_pools() -> BTreeMap<u32, Vec<Scenario>> {
    let mut pools = BTreeMap::new();

    // Phishing Detection
    pools.insert(1, vec![
        Scenario::new(
            "phish-1a",
            ScenarioKind::Email,
            ScenarioContent::email(
                "URGENT: Your account will be suspended!",
                "security@amaz0n.com",
                "Your Amazon account has suspicious activity. Click here immediately to verify your account or it will be permanently suspended within 24 hours!",
            ),
            &[
                ("click", "Click the link to verify"),
                ("ignore", "Ignore the email"),
                ("report", "Report as phishing and delete"),
                ("forward", "Forward to friends as warning"),
            ],
            "report",
            "This is a phishing email! Notice the misspelled domain (amaz0n.com) and urgent language. Always report and delete suspicious emails.",
            100,
        )
        .with_thought("Hmm... this email looks suspicious. The domain name doesn't look right..."),
        Scenario::new(
            "phish-1b",
            ScenarioKind::Email,
            ScenarioContent::email(
                "You've won $1,000,000!",
                "lottery@officiallottery.net",
                "Congratulations! You've been selected in our international lottery. To claim your prize, please provide your bank details and pay the processing fee of $500.",
            ),
            &[
                ("pay", "Pay the processing fee"),
                ("ignore", "Delete without opening attachments"),
                ("reply", "Reply asking for more information"),
                ("click", "Click links to verify legitimacy"),
            ],
            "ignore",
            "Classic lottery scam! You cannot win a lottery you never entered. Delete immediately and never pay upfront fees.",
            100,
        )
        .with_thought("A million dollars? I never entered any lottery... this seems too good to be true."),
        Scenario::new(
            "phish-1c",
            ScenarioKind::Website,
            ScenarioContent::website("payp4l.com/login", "PayPal Login"),
            &[
                ("login", "Enter your PayPal credentials"),
                ("check", "Check the URL carefully first"),
                ("bookmark", "Bookmark this convenient link"),
                ("trust", "Trust it since it looks official"),
            ],
            "check",
            "Always check URLs carefully! This is \"payp4l.com\" not \"paypal.com\". The \"4\" replaces the \"a\", a common phishing technique.",
            100,
        )
        .with_thought("Wait a minute... let me double-check this URL. Something doesn't look right."),
        Scenario::new(
            "phish-1d",
            ScenarioKind::Email,
            ScenarioContent::email(
                "Security Alert: Unusual Activity",
                "noreply@bankofamerica-security.com",
                "We detected unusual activity on your account. Please verify your identity by clicking the link below and entering your login credentials.",
            ),
            &[
                ("click", "Click the link immediately"),
                ("call", "Call the bank directly to verify"),
                ("reply", "Reply with account information"),
                ("ignore", "Ignore completely"),
            ],
            "call",
            "When in doubt, contact the organization directly using official contact information. Banks will never ask for credentials via email.",
            100,
        )
        .with_thought("This looks urgent, but I should verify this through official channels first."),
    ]);

    // Password Security
    pools.insert(2, vec![
        Scenario::new(
            "pass-2a",
            ScenarioKind::Message,
            ScenarioContent::message("Which password is strongest for your banking account?"),
            &[
                ("simple", "password123"),
                ("personal", "MyName1990!"),
                ("complex", "R@nd0m$tr0ng#Pa$$w0rd2024!"),
                ("memorable", "ilovemydog"),
            ],
            "complex",
            "Strong passwords use a mix of uppercase, lowercase, numbers, and symbols. Avoid personal information and common patterns.",
            100,
        )
        .with_thought("I need to choose a password that's both secure and follows best practices."),
        Scenario::new(
            "pass-2b",
            ScenarioKind::Message,
            ScenarioContent::message("Your friend asks to borrow your Netflix password. What do you do?"),
            &[
                ("share", "Share it - they're trustworthy"),
                ("refuse", "Politely decline and explain password security"),
                ("change", "Give it but change it later"),
                ("write", "Write it down for them"),
            ],
            "refuse",
            "Never share passwords, even with trusted friends. Each person should have their own accounts for security and accountability.",
            100,
        )
        .with_thought("Even though I trust my friend, sharing passwords is never a good idea."),
        Scenario::new(
            "pass-2c",
            ScenarioKind::Message,
            ScenarioContent::message("You need to create a password for a new work account. What's the best approach?"),
            &[
                ("reuse", "Use the same password as your personal email"),
                ("unique", "Create a unique, complex password"),
                ("simple", "Use something simple you won't forget"),
                ("birthday", "Use your birthday with some symbols"),
            ],
            "unique",
            "Always use unique passwords for different accounts. If one account is compromised, others remain safe.",
            100,
        )
        .with_thought("Each account should have its own unique password to prevent credential stuffing attacks."),
    ]);

    // Social Engineering
    pools.insert(3, vec![
        Scenario::new(
            "social-3a",
            ScenarioKind::Message,
            ScenarioContent::message("A caller claiming to be from your bank asks for your account number to \"verify your identity\" after a data breach."),
            &[
                ("provide", "Provide the information to help"),
                ("hangup", "Hang up and call your bank directly"),
                ("partial", "Give only partial information"),
                ("verify", "Ask them to verify who they are first"),
            ],
            "hangup",
            "Banks never ask for account details over the phone. Hang up and call your bank using the official number to verify any issues.",
            100,
        )
        .with_thought("This doesn't sound right. Banks don't usually call asking for account information."),
        Scenario::new(
            "social-3b",
            ScenarioKind::Message,
            ScenarioContent::message("You receive a text saying \"Your package delivery failed. Click here to reschedule\" but you haven't ordered anything."),
            &[
                ("click", "Click to see what package it is"),
                ("ignore", "Ignore and delete the message"),
                ("reply", "Reply asking for more details"),
                ("forward", "Forward to family to ask if they ordered something"),
            ],
            "ignore",
            "This is a common scam text. If you haven't ordered anything, delete it. Legitimate delivery services don't send random texts.",
            100,
        )
        .with_thought("I haven't ordered anything recently. This must be a scam trying to get me to click a malicious link."),
    ]);

    // Network Security
    pools.insert(4, vec![
        Scenario::new(
            "network-4a",
            ScenarioKind::Message,
            ScenarioContent::message("You're at a coffee shop and see these WiFi networks. Which is safest?"),
            &[
                ("free", "Free_WiFi_Here"),
                ("coffee", "CoffeeShop_Official"),
                ("unlocked", "Unlocked network with strong signal"),
                ("hidden", "Hidden network that requires password"),
            ],
            "coffee",
            "Always connect to official business networks. Ask staff for the correct network name and password. Avoid generic or unlocked networks.",
            100,
        )
        .with_thought("I should ask the staff which network is theirs and get the official password."),
    ]);

    // Safe Downloads
    pools.insert(5, vec![
        Scenario::new(
            "download-5a",
            ScenarioKind::Download,
            ScenarioContent::download(
                "Free_Movie_Download.exe",
                "You want to download a popular movie for free from a website offering \"instant downloads\".",
            ),
            &[
                ("download", "Download the .exe file"),
                ("scan", "Download but scan with antivirus first"),
                ("avoid", "Avoid illegal downloads entirely"),
                ("research", "Research the website first"),
            ],
            "avoid",
            "Illegal download sites often contain malware. Use legitimate streaming services instead. Movie files should never be .exe files!",
            100,
        )
        .with_thought("A movie file with a .exe extension? That's definitely malware. I should stick to legitimate streaming services."),
    ]);

    // Privacy Settings
    pools.insert(6, vec![
        Scenario::new(
            "privacy-6a",
            ScenarioKind::Social,
            ScenarioContent::social("Instagram", "You're posting vacation photos. What's the safest approach?"),
            &[
                ("live", "Post in real-time with location tags"),
                ("after", "Post after returning home"),
                ("private", "Post to close friends only while traveling"),
                ("details", "Post with detailed itinerary"),
            ],
            "after",
            "Never advertise that you're away from home in real-time. This tells criminals your house is empty. Post memories after you return.",
            100,
        )
        .with_thought("I shouldn't advertise that I'm away from home. Better to share these memories after I return."),
    ]);

    // Advanced Security
    pools.insert(7, vec![
        Scenario::new(
            "advanced-7a",
            ScenarioKind::Message,
            ScenarioContent::message("Your phone prompts you to install a software update. What do you do?"),
            &[
                ("ignore", "Ignore it - updates cause problems"),
                ("delay", "Install it but delay for a few weeks"),
                ("install", "Install it promptly"),
                ("research", "Research online if it's necessary"),
            ],
            "install",
            "Install security updates promptly! They patch vulnerabilities that criminals exploit. Delaying updates leaves you vulnerable.",
            100,
        )
        .with_thought("Security updates are important for protecting against new threats. I should install this right away."),
    ]);

    pools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_is_correct_from_correct_answer() {
        let scenario = Scenario::new(
            "s",
            ScenarioKind::Email,
            ScenarioContent::default(),
            &[("a", "A"), ("b", "B"), ("c", "C")],
            "b",
            "because",
            50,
        );
        let flags: Vec<bool> = scenario.options.iter().map(|o| o.is_correct).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert!(scenario.check().is_ok());
    }

    #[test]
    fn check_rejects_missing_or_inconsistent_answers() {
        let mut scenario = Scenario::new(
            "s",
            ScenarioKind::Message,
            ScenarioContent::default(),
            &[("a", "A"), ("b", "B")],
            "z",
            "",
            10,
        );
        assert!(scenario.check().is_err());

        scenario.correct_answer = "a".to_string();
        // is_correct flags still point nowhere
        assert!(scenario.check().is_err());

        scenario.options[0].is_correct = true;
        assert!(scenario.check().is_ok());

        scenario.options.truncate(1);
        assert!(scenario.check().is_err());
    }

    #[test]
    fn reference_pools_are_consistent() {
        let pools = reference_pools();
        assert_eq!(pools.len(), 7);
        assert_eq!(pools[&1].len(), 4);
        for scenario in pools.values().flatten() {
            assert!(scenario.check().is_ok(), "{:?}", scenario.check());
            assert_eq!(scenario.points, 100);
        }
    }

    #[test]
    fn content_lines_skip_absent_fields() {
        let content = ScenarioContent::website("payp4l.com/login", "PayPal Login");
        let lines = content.lines();
        assert_eq!(lines, vec![("Site", "PayPal Login"), ("URL", "payp4l.com/login")]);
    }
}
