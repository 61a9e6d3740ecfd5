use super::ui;
use crate::core::{ConversionResult, Converter};
use anyhow::{Result, bail};

/// Renders a conversion outcome for the terminal.
pub fn render_result(result: &ConversionResult) -> String {
    match result {
        ConversionResult::Success(c) => format!(
            "{}\n{} {} {} = {} {}\nRate: 1 {} = {:.6} {}\n{}",
            ui::style_text("Conversion successful", ui::StyleType::Success),
            ui::style_text("💰", ui::StyleType::Label),
            c.amount,
            c.from,
            ui::style_text(&format!("{:.4}", c.converted_amount), ui::StyleType::Label),
            c.to,
            c.from,
            c.rate,
            c.to,
            ui::style_text(
                &format!("Last update: {}", c.last_update),
                ui::StyleType::Subtle
            ),
        ),
        ConversionResult::Failure(f) => ui::style_text(
            &format!("Conversion failed: {}", f.message()),
            ui::StyleType::Error,
        ),
    }
}

pub async fn run(converter: &Converter, from: &str, to: &str, amount: f64) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rate...");
    let result = converter.convert(from, to, amount).await;
    spinner.finish_and_clear();

    println!("{}", render_result(&result));
    if let ConversionResult::Failure(failure) = result {
        bail!(failure.error);
    }
    Ok(())
}
