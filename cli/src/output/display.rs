//! Coloured terminal rendering of a finished run

use colored::Colorize;
use scout_core::output::render_sections;
use scout_core::{AgentRun, StopReason};

/// Print the answer sections, the tools used and any stop notice
pub fn print_run(run: &AgentRun) {
    let answer = &run.answer;

    println!();
    println!("{}", "=".repeat(70).cyan());
    println!(
        "{}",
        format!("RESULTS FOR {}", answer.city.to_uppercase()).bold()
    );
    println!("{}", "=".repeat(70).cyan());

    if !answer.summary.trim().is_empty() {
        println!();
        for line in answer.summary.lines() {
            println!("  {}", line);
        }
    }

    for section in render_sections(answer) {
        if section.items.is_empty() {
            continue;
        }
        println!();
        let header = format!("{} ({})", section.label, section.items.len());
        let header = if section.label == "NOTES" {
            header.yellow().bold()
        } else {
            header.green().bold()
        };
        println!("{}", header);
        for (index, item) in section.items.iter().enumerate() {
            println!("  {}. {}", index + 1, item);
        }
    }

    println!();
    let tools = if answer.tools_used.is_empty() {
        "none".to_string()
    } else {
        answer.tools_used.join(", ")
    };
    println!("{} {}", "Tools used:".dimmed(), tools);

    match &run.stop_reason {
        StopReason::Completed => {}
        StopReason::TurnLimitExceeded { max_turns } => println!(
            "{}",
            format!("Partial answer: the assistant did not finish within {} turns.", max_turns)
                .yellow()
        ),
        StopReason::ModelUnavailable { .. } => println!(
            "{}",
            "The assistant could not be reached; showing what was found before it stopped.".yellow()
        ),
    }
}
