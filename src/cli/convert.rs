use super::ui;
use crate::core::{ConversionView, CurrencyCode, RateFetcher, ViewEvent};
use anyhow::Result;

pub const TITLE: &str = "💱 美元汇率转换工具";
pub const PENDING_TEXT: &str = "正在获取实时汇率，请稍候...";

/// Runs one conversion from the terminal and prints the rendered view.
pub async fn run_convert(
    fetcher: &RateFetcher,
    currency: CurrencyCode,
    amount: f64,
) -> Result<ConversionView> {
    let mut view = ConversionView::default();
    view.dispatch(ViewEvent::SelectCurrency(currency));
    view.dispatch(ViewEvent::EnterAmount(amount));

    if let Ok(currency) = view.begin() {
        let spinner = ui::new_spinner(PENDING_TEXT)?;
        let quote = fetcher.fetch(currency).await;
        spinner.finish_and_clear();
        view.finish(quote);
    }

    println!("{}", render_view(&view));
    Ok(view)
}

pub fn render_view(view: &ConversionView) -> String {
    let mut output = format!("{}\n", ui::style_text(TITLE, ui::StyleType::Title));
    output.push_str(&ui::style_text(
        &format!("目标货币：{}", view.currency().label()),
        ui::StyleType::Subtle,
    ));
    output.push('\n');

    for message in view.messages() {
        output.push('\n');
        output.push_str(&ui::style_message(&message));
    }

    if let Some(conversion) = view.conversion() {
        let mut table = ui::new_styled_table();
        for (label, value) in conversion.lines() {
            table.add_row(vec![ui::label_cell(&label), ui::value_cell(&value)]);
        }
        output.push_str("\n\n");
        output.push_str(&table.to_string());
    }

    output
}
