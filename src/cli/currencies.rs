use super::ui;
use crate::core::currency::Currency;
use comfy_table::Cell;

pub fn render_table(currencies: &[Currency]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell(""),
    ]);

    for currency in currencies {
        table.add_row(vec![
            Cell::new(currency.code),
            Cell::new(currency.name),
            Cell::new(currency.symbol),
        ]);
    }

    format!(
        "{}\n\n{}\n\nTotal: {} currencies available",
        ui::style_text("Supported currencies", ui::StyleType::Title),
        table,
        currencies.len()
    )
}
