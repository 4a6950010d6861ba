use std::fmt;

use inquire::{InquireError, Select, Text};

use crate::cli::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    SingleCity,
    MultipleCities,
    ViewLogs,
    Statistics,
    ClearLogs,
    Exit,
}

impl MenuChoice {
    const ALL: [MenuChoice; 6] = [
        MenuChoice::SingleCity,
        MenuChoice::MultipleCities,
        MenuChoice::ViewLogs,
        MenuChoice::Statistics,
        MenuChoice::ClearLogs,
        MenuChoice::Exit,
    ];
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuChoice::SingleCity => "1. Get weather for a single city",
            MenuChoice::MultipleCities => "2. Get weather for multiple cities",
            MenuChoice::ViewLogs => "3. View all weather logs",
            MenuChoice::Statistics => "4. View statistics",
            MenuChoice::ClearLogs => "5. Clear all logs",
            MenuChoice::Exit => "6. Exit",
        })
    }
}

/// Outcome of a free-text prompt.
enum Answer {
    Text(String),
    /// Esc: back to the menu.
    Cancelled,
    /// Ctrl-C: leave the menu loop.
    Interrupted,
}

fn ask(prompt: Text<'_>) -> anyhow::Result<Answer> {
    match prompt.prompt() {
        Ok(text) => Ok(Answer::Text(text)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Cancelled),
        Err(InquireError::OperationInterrupted) => Ok(Answer::Interrupted),
        Err(err) => Err(err.into()),
    }
}

/// Warn about the deletion and ask for an explicit yes.
///
/// `None` when the prompt was dismissed.
pub fn confirm_clear() -> anyhow::Result<Option<String>> {
    println!();
    println!("CLEAR ALL LOGS");
    println!("{}", "=".repeat(50));
    println!("This will permanently delete all weather logs from the database.");

    match ask(Text::new("Are you sure you want to continue? (yes/NO):"))? {
        Answer::Text(answer) => Ok(Some(answer)),
        Answer::Cancelled | Answer::Interrupted => Ok(None),
    }
}

pub async fn run(session: &mut Session) -> anyhow::Result<()> {
    println!();
    println!("     WEATHER INFORMATION & DATA LOGGER");
    println!("Look up current weather and keep a local log of every result.");

    loop {
        println!();
        let choice = match Select::new("MAIN MENU", MenuChoice::ALL.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled) => continue,
            Err(InquireError::OperationInterrupted) => {
                println!("\nApplication interrupted by user.");
                break;
            }
            Err(err) => return Err(err.into()),
        };

        match choice {
            MenuChoice::SingleCity => match ask(Text::new("Enter city name:"))? {
                Answer::Text(city) => {
                    session.process_city(&city).await?;
                }
                Answer::Cancelled => {}
                Answer::Interrupted => break,
            },
            MenuChoice::MultipleCities => {
                let prompt = Text::new("Enter city names separated by commas:")
                    .with_help_message("e.g. London, Paris, Tokyo");
                match ask(prompt)? {
                    Answer::Text(cities) => {
                        session.process_multiple(&cities).await?;
                    }
                    Answer::Cancelled => {}
                    Answer::Interrupted => break,
                }
            }
            MenuChoice::ViewLogs => {
                session.view_recent()?;
            }
            MenuChoice::Statistics => {
                session.show_statistics()?;
            }
            MenuChoice::ClearLogs => {
                let answer = confirm_clear()?;
                session.clear_all(answer.as_deref().unwrap_or_default())?;
            }
            MenuChoice::Exit => break,
        }
    }

    farewell(session);
    Ok(())
}

fn farewell(session: &Session) {
    println!();
    println!("{}", "=".repeat(50));
    println!("Thank you for using Weather Logger!");
    match session.total_logged() {
        Ok(total) => println!("Total weather entries in database: {total}"),
        Err(err) => tracing::warn!(error = %err, "could not count weather entries"),
    }
    println!("Goodbye!");
    println!("{}", "=".repeat(50));
}
