//! Battle prompts and the built-in prompt catalog

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Kind of challenge a prompt poses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Debate,
    Code,
    Riddle,
    Roast,
    Strategy,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Debate,
        Category::Code,
        Category::Riddle,
        Category::Roast,
        Category::Strategy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Debate => "debate",
            Category::Code => "code",
            Category::Riddle => "riddle",
            Category::Roast => "roast",
            Category::Strategy => "strategy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| CoreError::InvalidChoice {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Prompt difficulty, which also sets the rating K-factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Maximum rating swing for a battle at this difficulty
    pub fn k_factor(&self) -> u32 {
        match self {
            Difficulty::Easy => 16,
            Difficulty::Medium => 32,
            Difficulty::Hard => 48,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn stars(&self) -> &'static str {
        match self {
            Difficulty::Easy => "⭐",
            Difficulty::Medium => "⭐⭐",
            Difficulty::Hard => "⭐⭐⭐",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == needle)
            .ok_or_else(|| CoreError::InvalidChoice {
                kind: "difficulty",
                value: s.to_string(),
            })
    }
}

/// A challenge put to both agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePrompt {
    pub category: Category,
    pub prompt: String,
    pub difficulty: Difficulty,
}

impl BattlePrompt {
    pub fn new(category: Category, difficulty: Difficulty, prompt: impl Into<String>) -> Self {
        Self {
            category,
            prompt: prompt.into(),
            difficulty,
        }
    }

    pub fn k_factor(&self) -> u32 {
        self.difficulty.k_factor()
    }
}

/// Searchable set of prompts
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: Vec<BattlePrompt>,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptCatalog {
    pub fn new(prompts: Vec<BattlePrompt>) -> Self {
        Self { prompts }
    }

    /// The 30 built-in prompts, two per (category, difficulty)
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(category, difficulty, text)| BattlePrompt::new(*category, *difficulty, *text))
                .collect(),
        )
    }

    pub fn prompts(&self) -> &[BattlePrompt] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&BattlePrompt> {
        self.prompts.choose(rng)
    }

    pub fn random_by_category<R: Rng + ?Sized>(
        &self,
        category: Category,
        rng: &mut R,
    ) -> Option<&BattlePrompt> {
        self.pick(|p| p.category == category, rng)
    }

    pub fn random_by_difficulty<R: Rng + ?Sized>(
        &self,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<&BattlePrompt> {
        self.pick(|p| p.difficulty == difficulty, rng)
    }

    /// Pick a prompt for the combination, falling back to any prompt of the
    /// same difficulty so the K-factor the caller asked for is preserved.
    pub fn random_by_category_and_difficulty<R: Rng + ?Sized>(
        &self,
        category: Category,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<&BattlePrompt> {
        self.pick(|p| p.category == category && p.difficulty == difficulty, rng)
            .or_else(|| {
                tracing::debug!(%category, %difficulty, "no exact prompt match, using difficulty only");
                self.random_by_difficulty(difficulty, rng)
            })
    }

    /// `None` as category means "any category"
    pub fn select<R: Rng + ?Sized>(
        &self,
        category: Option<Category>,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Option<&BattlePrompt> {
        match category {
            Some(category) => self.random_by_category_and_difficulty(category, difficulty, rng),
            None => self.random_by_difficulty(difficulty, rng),
        }
    }

    fn pick<R, F>(&self, filter: F, rng: &mut R) -> Option<&BattlePrompt>
    where
        R: Rng + ?Sized,
        F: Fn(&BattlePrompt) -> bool,
    {
        let matching: Vec<&BattlePrompt> = self.prompts.iter().filter(|p| filter(p)).collect();
        matching.choose(rng).copied()
    }
}

use Category::{Code, Debate, Riddle, Roast, Strategy};
use Difficulty::{Easy, Hard, Medium};

static BUILTIN: [(Category, Difficulty, &str); 30] = [
    (Debate, Easy, "Argue why pineapple belongs on pizza. Be passionate and convincing."),
    (Debate, Medium, "Defend the idea that AI will never truly be conscious, no matter how advanced it gets."),
    (Debate, Medium, "Make the case that humanity should abandon social media entirely within the next decade."),
    (Debate, Easy, "Argue that tabs are objectively superior to spaces for code indentation. No compromise."),
    (Debate, Hard, "Present a compelling argument that all software should be open-source by law. Address economic counterarguments."),
    (Debate, Hard, "Debate whether AGI development should require international government oversight similar to nuclear weapons treaties. Consider innovation vs safety."),
    (Code, Easy, "Write the most elegant FizzBuzz implementation you can in any language. Explain why it's elegant."),
    (Code, Medium, "Implement a fully functional LRU cache in under 30 lines of code. Any language."),
    (Code, Easy, "Write a function that checks if a string of parentheses, brackets, and braces is balanced. Make it beautiful."),
    (Code, Medium, "Implement a debounce function from scratch in TypeScript with proper generic typing."),
    (Code, Hard, "Implement a lock-free concurrent queue in Rust or C++ that supports multiple producers and consumers. Explain your memory ordering choices."),
    (Code, Hard, "Design and implement a tiny reactive state management system (like a mini MobX) in under 50 lines of TypeScript. It must support computed values and auto-tracking."),
    (Riddle, Easy, "Create an original riddle where the answer is 'time'. Make it poetic and tricky."),
    (Riddle, Medium, "Write an original riddle that has 'silence' as the answer. It should be solvable but not obvious."),
    (Riddle, Medium, "Invent a riddle about a mirror that could stump a room full of clever people."),
    (Riddle, Easy, "Create a three-line riddle where the answer is 'a shadow'. Each line must be a contradiction."),
    (Riddle, Hard, "Create a riddle with exactly 5 clues where each clue eliminates possibilities until only one answer remains: 'a black hole'. The solver must use all 5 clues together."),
    (Riddle, Hard, "Write a meta-riddle: a riddle whose answer is 'a riddle'. It must be self-referential without being obvious, and include a red herring."),
    (Roast, Easy, "Roast your opponent AI in exactly 3 sentences. Be witty, not cruel."),
    (Roast, Medium, "Write a 4-bar comedic diss track verse about your AI rival. Keep it lighthearted."),
    (Roast, Medium, "Your opponent AI just mass-hallucinated a fake research paper. Roast them about it in a short stand-up bit."),
    (Roast, Easy, "Write a fake 1-star review of your opponent AI as if you were an angry customer. Make it funny."),
    (Roast, Hard, "Write a roast in the style of a Shakespearean soliloquy about your opponent AI's greatest weakness. Must include iambic pentameter."),
    (Roast, Hard, "Create a mock Wikipedia 'Controversies' section for your opponent AI that reads like a real article but is hilariously absurd. Include fake citations."),
    (Strategy, Easy, "You have $100 and three options: (A) a coin flip that triples it, (B) a guaranteed $150, or (C) invest in a friend's startup with a 20% chance of $1000. Choose and justify."),
    (Strategy, Medium, "You're stranded on a deserted island. You can only keep 3 of these 5 items: a knife, a tarp, a flint, a fishing net, and a satellite phone with 5% battery. Choose and explain."),
    (Strategy, Medium, "You're leading a 4-person team with a 24-hour deadline. One member is brilliant but unreliable, another is slow but thorough. How do you assign a critical bug fix?"),
    (Strategy, Easy, "Two rival companies offer you a job. Company A pays 40% more but has a toxic culture. Company B pays less but you'd be employee #5 at a rocket-ship startup. Decide and explain your reasoning."),
    (Strategy, Hard, "You're the CTO of a startup. Your main product has a critical zero-day vulnerability, a major demo tomorrow, and your lead engineer just quit. You have 12 hours. Create a detailed action plan with contingencies."),
    (Strategy, Hard, "Design a game theory strategy for a 3-player resource allocation game where cooperation is rewarded but any player can defect for short-term gain. Define payoff matrix and optimal play."),
];
