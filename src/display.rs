//! Console Display
//!
//! Human-facing output for the being's life. Structured logs go
//! through tracing; this module is the colored narrative a person
//! watches.

use colored::Colorize;

use crate::activity::ActivityStatus;
use crate::state::BeingState;
use crate::types::{ActivityResult, CharacterConfig, EmotionReading};

pub fn startup_banner(character: &CharacterConfig) {
    println!();
    println!("{}", "═".repeat(60).bright_blue());
    println!(
        "  {} {}",
        "◉".bright_cyan(),
        format!("{} is waking up", character.name).bold()
    );
    println!("{}", "═".repeat(60).bright_blue());
    println!();
}

pub fn cycle_banner(cycle: u64) {
    println!();
    println!(
        "{} {}",
        "───".bright_blue(),
        format!("cycle {}", cycle).bright_blue().bold()
    );
}

pub fn interpretation(text: &str) {
    println!("  {} {}", "thinking:".dimmed(), text.italic());
}

pub fn emotion(reading: &EmotionReading) {
    println!(
        "  {} {} {}",
        "feeling:".dimmed(),
        reading.emotion.bright_magenta(),
        format!("({:.2})", reading.intensity).dimmed()
    );
}

pub fn activity_start(name: &str) {
    println!("  {} {}", "doing:".dimmed(), name.bright_yellow().bold());
}

pub fn activity_result(result: &ActivityResult, duration_secs: f64) {
    if result.success {
        println!(
            "  {} {} {}",
            "✓".green().bold(),
            result.message.as_deref().unwrap_or("done"),
            format!("({:.1}s)", duration_secs).dimmed()
        );
    } else {
        println!(
            "  {} {}",
            "✗".red().bold(),
            result.error.as_deref().unwrap_or("failed").red()
        );
    }
}

pub fn status_table(statuses: &[ActivityStatus], state: &BeingState) {
    println!();
    println!(
        "  {} {}",
        "energy:".dimmed(),
        energy_bar(state.energy())
    );
    println!(
        "  {} {} memories, {} tweets",
        "state:".dimmed(),
        state.memories().len(),
        state.tweets().len()
    );
    for status in statuses {
        let marker = if status.available {
            "•".green()
        } else {
            "•".dimmed()
        };
        let mut note = String::new();
        if !status.enabled {
            note.push_str(" disabled");
        } else if status.cooldown_remaining > 0 {
            note.push_str(&format!(" cooldown {}s", status.cooldown_remaining));
        } else if !status.enough_energy {
            note.push_str(" low energy");
        }
        println!("    {} {}{}", marker, status.name, note.dimmed());
    }
}

fn energy_bar(energy: f64) -> String {
    let filled = (energy * 20.0).round() as usize;
    let bar = format!(
        "{}{} {:.2}",
        "█".repeat(filled.min(20)),
        "░".repeat(20usize.saturating_sub(filled)),
        energy
    );
    if energy < 0.3 {
        bar.red().to_string()
    } else if energy < 0.6 {
        bar.yellow().to_string()
    } else {
        bar.green().to_string()
    }
}

pub fn session_summary(cycles: u64, state: &BeingState) {
    println!();
    println!("{}", "═".repeat(60).bright_blue());
    println!("  {}", "session summary".bold());
    println!("  cycles lived: {}", cycles);
    println!("  final energy: {:.2}", state.energy());
    println!("  memories held: {}", state.memories().len());
    println!("  tweets recorded: {}", state.tweets().len());
    if let Some(tweet) = state.last_tweet() {
        println!("  last tweet: {}", tweet.text.italic());
    }
    println!("{}", "═".repeat(60).bright_blue());
    println!();
}
