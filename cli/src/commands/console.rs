//! Line-mode console shell

use crate::config::{CliConfigLoader, LoadedConfig};
use crate::output::{print_run, CliOutputConfig, CliOutputHandler};
use crate::session::{run_query, save_run};
use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use scout_core::query::parse_budget;
use scout_core::{SearchCategory, SearchQuery};
use tracing::{info, warn};

/// Start the interactive console
pub async fn console_command(config_loader: CliConfigLoader) -> Result<()> {
    // Credentials are checked before the first prompt
    let config = config_loader.load().await?;
    info!("Using {} model {}", config.llm.protocol.as_str(), config.llm.model);

    print_banner(&config);

    loop {
        let query = prompt_query(&config)?;
        println!("\n{} {}", "Searching:".bold(), query.to_prompt(&config.locale));

        let output = CliOutputHandler::new(CliOutputConfig::default());
        match run_query(&config, &query, Box::new(output)).await {
            Ok(run) => {
                print_run(&run);
                match save_run(&config, &run).await {
                    Ok(path) => println!("\n{} {}", "Results saved to".green(), path.display()),
                    Err(e) => {
                        warn!("Saving results failed: {:#}", e);
                        println!("\n{} {:#}", "Could not save results:".red(), e);
                    }
                }
            }
            Err(e) => println!("{} {:#}", "Search failed:".red(), e),
        }

        let again = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Search again?")
            .default(false)
            .interact()?;
        if !again {
            break;
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn print_banner(config: &LoadedConfig) {
    let rule = "=".repeat(70);
    println!("{}", rule.cyan());
    println!(
        "{}",
        format!(
            "{:^70}",
            format!(
                "{} LOCAL EVENT AND NEWS DISCOVERY",
                config.locale.city.to_uppercase()
            )
        )
        .bold()
    );
    println!("{}", rule.cyan());
}

/// Ask for search type, interests, topic and budget
fn prompt_query(config: &LoadedConfig) -> Result<SearchQuery> {
    let theme = ColorfulTheme::default();
    let labels: Vec<&str> = SearchCategory::ALL.iter().map(|c| c.label()).collect();
    let choice = Select::with_theme(&theme)
        .with_prompt("What would you like to search for?")
        .items(&labels)
        .default(0)
        .interact()?;
    let category = SearchCategory::ALL[choice];

    let interests: Option<String> = if category.wants_events() {
        Some(
            Input::with_theme(&theme)
                .with_prompt("What type of events? (e.g. tech meetups, concerts, food festivals)")
                .validate_with(|input: &String| -> Result<(), &str> {
                    if input.trim().is_empty() {
                        Err("please enter an event type")
                    } else {
                        Ok(())
                    }
                })
                .interact_text()?,
        )
    } else {
        None
    };

    let topic: Option<String> = if category.wants_news() {
        Some(
            Input::with_theme(&theme)
                .with_prompt("What news topic? (e.g. transport, sport, weather)")
                .validate_with(|input: &String| -> Result<(), &str> {
                    if input.trim().is_empty() {
                        Err("please enter a news topic")
                    } else {
                        Ok(())
                    }
                })
                .interact_text()?,
        )
    } else {
        None
    };

    let budget = if category.wants_events() {
        let raw: String = Input::with_theme(&theme)
            .with_prompt(format!(
                "Maximum budget in {} (leave blank for any)",
                config.locale.currency
            ))
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), String> {
                parse_budget(input).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?;
        parse_budget(&raw)?
    } else {
        None
    };

    Ok(SearchQuery::new(
        category,
        interests.as_deref(),
        topic.as_deref(),
        budget,
    )?)
}
