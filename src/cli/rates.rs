use super::ui;
use crate::core::{Converter, RateTable};
use anyhow::Result;
use comfy_table::Cell;

pub fn render_table(table_data: &RateTable) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {})", table_data.base_code)),
    ]);

    for (code, rate) in &table_data.rates {
        table.add_row(vec![Cell::new(code), ui::number_cell(format!("{rate:.6}"))]);
    }

    format!(
        "Rates for {}\n\n{}\n\n{}",
        ui::style_text(&table_data.base_code, ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("Last update: {}", table_data.last_update),
            ui::StyleType::Subtle
        )
    )
}

pub async fn run(converter: &Converter, base: &str) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching rates for {}...", base.to_uppercase()));
    let result = converter.all_rates(base).await;
    spinner.finish_and_clear();

    let table = result?;
    println!("{}", render_table(&table));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_rates_sorted_by_code() {
        let data = RateTable {
            base_code: "USD".to_string(),
            rates: BTreeMap::from([
                ("JPY".to_string(), 150.25),
                ("EUR".to_string(), 0.9),
            ]),
            last_update: "2024-01-01 00:00:00".to_string(),
        };

        let text = console::strip_ansi_codes(&render_table(&data)).to_string();
        assert!(text.contains("Rate (1 USD)"));
        assert!(text.contains("150.250000"));
        let eur = text.find("EUR").unwrap();
        let jpy = text.find("JPY").unwrap();
        assert!(eur < jpy);
    }
}
