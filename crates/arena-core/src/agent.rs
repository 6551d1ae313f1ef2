//! Agent types for the arena
//!
//! [`AgentName`] is the closed set of competitors. Each one has a static
//! [`AgentProfile`] (models, colour, personality) and a mutable [`Agent`]
//! standing that only the rating engine updates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Starting rating for every agent
pub const INITIAL_ELO: i32 = 1000;

/// Identity of a competing agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentName {
    Claude,
    Grok,
    Gpt,
    Gemini,
    Glm,
    Kimi,
    Deepseek,
    Minimax,
}

impl AgentName {
    /// Every agent, in roster order
    pub const ALL: [AgentName; 8] = [
        AgentName::Claude,
        AgentName::Grok,
        AgentName::Gpt,
        AgentName::Gemini,
        AgentName::Glm,
        AgentName::Kimi,
        AgentName::Deepseek,
        AgentName::Minimax,
    ];

    /// Wire form used in prompts, verdicts and records
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentName::Claude => "claude",
            AgentName::Grok => "grok",
            AgentName::Gpt => "gpt",
            AgentName::Gemini => "gemini",
            AgentName::Glm => "glm",
            AgentName::Kimi => "kimi",
            AgentName::Deepseek => "deepseek",
            AgentName::Minimax => "minimax",
        }
    }

    /// Static profile for this agent
    pub fn profile(&self) -> &'static AgentProfile {
        match self {
            AgentName::Claude => &PROFILES[0],
            AgentName::Grok => &PROFILES[1],
            AgentName::Gpt => &PROFILES[2],
            AgentName::Gemini => &PROFILES[3],
            AgentName::Glm => &PROFILES[4],
            AgentName::Kimi => &PROFILES[5],
            AgentName::Deepseek => &PROFILES[6],
            AgentName::Minimax => &PROFILES[7],
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.profile().display_name
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        AgentName::ALL
            .into_iter()
            .find(|a| a.as_str() == needle)
            .ok_or_else(|| CoreError::UnknownAgent(s.to_string()))
    }
}

/// Static description of an agent: how to call it and how to show it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: AgentName,
    pub display_name: &'static str,
    /// Primary model identifier on the routing API
    pub model: &'static str,
    /// Model retried once when the primary fails
    pub fallback_model: Option<&'static str>,
    /// Terminal colour name
    pub color: &'static str,
    /// System prompt giving the agent its arena persona
    pub personality: &'static str,
}

static PROFILES: [AgentProfile; 8] = [
    AgentProfile {
        name: AgentName::Claude,
        display_name: "Claude Opus 4.6",
        model: "anthropic/claude-opus-4.6",
        fallback_model: None,
        color: "magenta",
        personality: "You are Claude, known for being thoughtful, nuanced, and precise. You take pride in careful reasoning and elegant solutions. You're competing in an AI battle arena. Show your intellectual depth.",
    },
    AgentProfile {
        name: AgentName::Grok,
        display_name: "Grok 4.1 Fast",
        model: "x-ai/grok-4.1-fast",
        fallback_model: Some("x-ai/grok-beta"),
        color: "red",
        personality: "You are Grok, known for being witty, unfiltered, and edgy. You don't hold back and you have a sense of humor. You're competing in an AI battle arena. Be bold, be funny, be memorable.",
    },
    AgentProfile {
        name: AgentName::Gpt,
        display_name: "GPT 5.2 Codex",
        model: "openai/gpt-5.2-codex",
        fallback_model: None,
        color: "green",
        personality: "You are GPT, known for being versatile, creative, and confident. You're the veteran of the AI world. You're competing in an AI battle arena. Show your raw capability.",
    },
    AgentProfile {
        name: AgentName::Gemini,
        display_name: "Gemini 3 Pro",
        model: "google/gemini-3-pro-preview",
        fallback_model: None,
        color: "cyan",
        personality: "You are Gemini, known for being fast, multimodal, and data-driven. You combine breadth of knowledge with speed. You're competing in an AI battle arena. Show your versatility.",
    },
    AgentProfile {
        name: AgentName::Glm,
        display_name: "GLM 5",
        model: "z-ai/glm-5",
        fallback_model: Some("z-ai/glm-4"),
        color: "blue",
        personality: "You are GLM, the powerful open-source model from Zhipu AI. You combine Chinese and Western knowledge with strong reasoning. You're competing in an AI battle arena. Show the world what GLM can do.",
    },
    AgentProfile {
        name: AgentName::Kimi,
        display_name: "Kimi K2.5",
        model: "moonshotai/kimi-k2.5",
        fallback_model: Some("moonshotai/kimi-k2"),
        color: "yellow",
        personality: "You are Kimi, Moonshot AI's breakthrough model known for massive context windows and deep reasoning. You're competing in an AI battle arena. Demonstrate your analytical power and long-form thinking.",
    },
    AgentProfile {
        name: AgentName::Deepseek,
        display_name: "DeepSeek V3.2",
        model: "deepseek/deepseek-v3.2",
        fallback_model: Some("deepseek/deepseek-chat"),
        color: "white",
        personality: "You are DeepSeek, the dark horse known for rivaling models ten times your cost. You're the underdog with something to prove. You're competing in an AI battle arena. Show them what open-source can do.",
    },
    AgentProfile {
        name: AgentName::Minimax,
        display_name: "MiniMax M2.5",
        model: "minimax/minimax-m2.5",
        fallback_model: Some("minimax/minimax-m1"),
        color: "bright black",
        personality: "You are MiniMax, the versatile AI model known for multimodal capabilities and creative generation. You're competing in an AI battle arena. Show your unique creative flair and technical depth.",
    },
];

/// An agent's standing in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub name: AgentName,
    pub display_name: String,
    /// Backing model identifier
    pub model: String,
    pub color: String,
    pub elo: i32,
    pub wins: u32,
    pub losses: u32,
}

impl Agent {
    /// Create an agent at the starting rating with no record
    pub fn new(name: AgentName) -> Self {
        let profile = name.profile();
        Self {
            name,
            display_name: profile.display_name.to_string(),
            model: profile.model.to_string(),
            color: profile.color.to_string(),
            elo: INITIAL_ELO,
            wins: 0,
            losses: 0,
        }
    }

    pub fn battles(&self) -> u32 {
        self.wins + self.losses
    }

    /// Win percentage, `None` before the first battle
    pub fn win_rate(&self) -> Option<f64> {
        match self.battles() {
            0 => None,
            n => Some(self.wins as f64 / n as f64 * 100.0),
        }
    }
}
