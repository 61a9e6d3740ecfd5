//! Menu-driven interactive session.

use super::{convert, currencies, ui};
use crate::core::{ConversionResult, Converter};
use anyhow::{Context, Result};
use chrono::Local;
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Convert,
    ListCurrencies,
    History,
    RefreshRates,
    Exit,
}

impl FromStr for MenuCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(MenuCommand::Convert),
            "2" => Ok(MenuCommand::ListCurrencies),
            "3" => Ok(MenuCommand::History),
            "4" => Ok(MenuCommand::RefreshRates),
            "5" => Ok(MenuCommand::Exit),
            other => Err(anyhow::anyhow!("Invalid menu option: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub converted_amount: f64,
    pub rate: f64,
    pub timestamp: String,
}

pub struct Shell<'a, R, W> {
    converter: &'a Converter,
    input: R,
    output: W,
    history: Vec<HistoryEntry>,
}

impl<'a, R, W> Shell<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(converter: &'a Converter, input: R, output: W) -> Self {
        Self {
            converter,
            input,
            output,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Runs the read loop until the user exits or input ends. A failing
    /// command is reported and the loop carries on.
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner()?;

        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt("\nSelect an option (1-5): ").await? else {
                debug!("Input closed, leaving shell");
                break;
            };

            let command = match choice.parse::<MenuCommand>() {
                Ok(command) => command,
                Err(_) => {
                    writeln!(
                        self.output,
                        "\n{}",
                        ui::style_text(
                            "Invalid option. Please choose a number from 1 to 5.",
                            ui::StyleType::Error
                        )
                    )?;
                    continue;
                }
            };

            if command == MenuCommand::Exit {
                writeln!(self.output, "\nThanks for using fxconv!")?;
                break;
            }

            if let Err(e) = self.dispatch(command).await {
                error!(error = %e, ?command, "Shell command failed");
                writeln!(
                    self.output,
                    "{}",
                    ui::style_text(&format!("Unexpected error: {e}"), ui::StyleType::Error)
                )?;
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, command: MenuCommand) -> Result<()> {
        match command {
            MenuCommand::Convert => self.perform_conversion().await,
            MenuCommand::ListCurrencies => self.show_currencies(),
            MenuCommand::History => self.show_history(),
            MenuCommand::RefreshRates => self.refresh_rates().await,
            MenuCommand::Exit => Ok(()),
        }
    }

    fn print_banner(&mut self) -> Result<()> {
        writeln!(self.output, "\n{}", ui::separator(60))?;
        writeln!(
            self.output,
            "{}",
            ui::style_text("fxconv - live currency converter", ui::StyleType::Title)
        )?;
        writeln!(self.output, "{}", ui::separator(60))?;
        writeln!(
            self.output,
            "{}",
            ui::style_text("Powered by ExchangeRate-API", ui::StyleType::Subtle)
        )?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "\n{}",
            ui::style_text("MAIN MENU", ui::StyleType::Label)
        )?;
        writeln!(self.output, "1. Convert currencies")?;
        writeln!(self.output, "2. List available currencies")?;
        writeln!(self.output, "3. Show conversion history")?;
        writeln!(self.output, "4. Refresh exchange rates")?;
        writeln!(self.output, "5. Exit")?;
        Ok(())
    }

    /// Prints `question` and reads one line. `None` means end of input.
    async fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .context("Failed to read from input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    async fn perform_conversion(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "\n{}\n{}",
            ui::style_text("CURRENCY CONVERSION", ui::StyleType::Label),
            ui::separator(30)
        )?;

        let Some(from) = self.prompt("Source currency (e.g. USD): ").await? else {
            return Ok(());
        };
        let Some(to) = self.prompt("Target currency (e.g. EUR): ").await? else {
            return Ok(());
        };
        let Some(amount) = self.prompt("Amount to convert: ").await? else {
            return Ok(());
        };
        // Unparseable input becomes NaN and is rejected by the converter
        let amount = amount.parse::<f64>().unwrap_or(f64::NAN);

        let spinner = ui::new_spinner("Fetching exchange rate...");
        let result = self.converter.convert(&from, &to, amount).await;
        spinner.finish_and_clear();

        writeln!(self.output, "\n{}", convert::render_result(&result))?;

        if let ConversionResult::Success(c) = result {
            self.history.push(HistoryEntry {
                from: c.from,
                to: c.to,
                amount: c.amount,
                converted_amount: c.converted_amount,
                rate: c.rate,
                timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            });
        }
        Ok(())
    }

    fn show_currencies(&mut self) -> Result<()> {
        let currencies = self.converter.supported_currencies();
        writeln!(self.output, "\n{}", currencies::render_table(&currencies))?;
        Ok(())
    }

    fn show_history(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "\n{}\n{}",
            ui::style_text("CONVERSION HISTORY", ui::StyleType::Label),
            ui::separator(50)
        )?;

        if self.history.is_empty() {
            writeln!(self.output, "No conversions yet.")?;
            return Ok(());
        }

        for (index, entry) in self.history.iter().enumerate() {
            writeln!(
                self.output,
                "{}. {} {} → {:.4} {}",
                index + 1,
                entry.amount,
                entry.from,
                entry.converted_amount,
                entry.to
            )?;
            writeln!(
                self.output,
                "   Rate: {:.6} | {}\n",
                entry.rate, entry.timestamp
            )?;
        }
        Ok(())
    }

    async fn refresh_rates(&mut self) -> Result<()> {
        let before = self.converter.cache_stats().await;
        self.converter.clear_cache().await;
        writeln!(
            self.output,
            "\n{}",
            ui::style_text(
                &format!(
                    "Exchange rates refreshed ({} cached pair(s) dropped, TTL {}s).",
                    before.size,
                    before.ttl.as_secs()
                ),
                ui::StyleType::Success
            )
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::StubRateProvider;
    use std::sync::Arc;

    async fn run_session(converter: &Converter, input: &str) -> (String, Vec<HistoryEntry>) {
        let mut output = Vec::new();
        let history = {
            let mut shell = Shell::new(converter, input.as_bytes(), &mut output);
            shell.run().await.unwrap();
            shell.history().to_vec()
        };
        let text = String::from_utf8(output).unwrap();
        (console::strip_ansi_codes(&text).to_string(), history)
    }

    #[test]
    fn test_menu_command_parsing() {
        assert_eq!("1".parse::<MenuCommand>().unwrap(), MenuCommand::Convert);
        assert_eq!(" 4 ".parse::<MenuCommand>().unwrap(), MenuCommand::RefreshRates);
        assert_eq!("5".parse::<MenuCommand>().unwrap(), MenuCommand::Exit);
        assert!("6".parse::<MenuCommand>().is_err());
        assert!("".parse::<MenuCommand>().is_err());
    }

    #[tokio::test]
    async fn test_conversion_is_recorded_in_history() {
        let provider = Arc::new(StubRateProvider::with_rate(0.9));
        let converter = Converter::new(provider.clone());

        let (text, history) = run_session(&converter, "1\nusd\neur\n100\n3\n5\n").await;

        assert!(text.contains("100 USD = 90.0000 EUR"));
        assert!(text.contains("1. 100 USD → 90.0000 EUR"));
        assert!(text.contains("Thanks for using fxconv!"));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from, "USD");
        assert_eq!(history[0].converted_amount, 90.0);
        assert_eq!(provider.rate_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_conversion_keeps_loop_running() {
        let provider = Arc::new(StubRateProvider::with_rate(0.9));
        let converter = Converter::new(provider.clone());

        let (text, history) =
            run_session(&converter, "1\nUSD\nEUR\nabc\n1\nXYZ\nEUR\n10\n3\n5\n").await;

        assert!(text.contains("Conversion failed: amount must be a positive number"));
        assert!(text.contains("Conversion failed: unsupported currency: XYZ"));
        assert!(text.contains("No conversions yet."));
        assert!(history.is_empty());
        assert_eq!(provider.rate_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_option_and_end_of_input() {
        let converter = Converter::new(Arc::new(StubRateProvider::with_rate(1.0)));

        let (text, _) = run_session(&converter, "9\n").await;
        assert!(text.contains("Invalid option"));
        assert!(!text.contains("Thanks for using fxconv!"));
    }

    #[tokio::test]
    async fn test_refresh_clears_cache() {
        let provider = Arc::new(StubRateProvider::with_rate(0.9));
        let converter = Converter::new(provider.clone());
        converter.convert("USD", "EUR", 1.0).await;

        let (text, _) = run_session(&converter, "4\n5\n").await;

        assert!(text.contains("1 cached pair(s) dropped"));
        assert_eq!(converter.cache_stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_list_currencies() {
        let converter = Converter::new(Arc::new(StubRateProvider::with_rate(1.0)));
        let (text, _) = run_session(&converter, "2\n5\n").await;
        assert!(text.contains("UYU"));
        assert!(text.contains("Total: 20 currencies available"));
    }
}
