//! Line-based prompts for the interactive menu

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Numbered-choice prompts over any reader/writer pair
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// One trimmed line; `None` at end of input
    pub fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{} {} ", "?".green().bold(), question.bold())?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Pick one of `options` by number; `None` at end of input
    pub fn choose(&mut self, question: &str, options: &[String]) -> Result<Option<usize>> {
        writeln!(self.output)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {} {}", format!("{:>2})", i + 1).cyan(), option)?;
        }
        loop {
            let Some(answer) = self.ask(question)? else {
                return Ok(None);
            };
            match parse_choice(&answer, options.len()) {
                Some(index) => return Ok(Some(index)),
                None => writeln!(
                    self.output,
                    "  {}",
                    format!("Enter a number from 1 to {}", options.len()).yellow()
                )?,
            }
        }
    }

    /// Pick two different options, entered as two numbers
    pub fn choose_pair(&mut self, question: &str, options: &[String]) -> Result<Option<[usize; 2]>> {
        writeln!(self.output)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {} {}", format!("{:>2})", i + 1).cyan(), option)?;
        }
        loop {
            let Some(answer) = self.ask(question)? else {
                return Ok(None);
            };
            let picks: Vec<usize> = answer
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .filter_map(|s| parse_choice(s, options.len()))
                .collect();
            match picks.as_slice() {
                [a, b] if a != b => return Ok(Some([*a, *b])),
                _ => writeln!(
                    self.output,
                    "  {}",
                    "You must pick exactly 2 different agents.".yellow()
                )?,
            }
        }
    }

    /// Yes/no with a default for an empty answer; end of input means no
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let Some(answer) = self.ask(&format!("{} {}", question, hint))? else {
                return Ok(false);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "  {}", "Answer y or n".yellow())?,
            }
        }
    }
}

/// 1-based answer to a 0-based index
fn parse_choice(answer: &str, len: usize) -> Option<usize> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}
