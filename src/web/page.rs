//! Server-side rendering of the conversion form

use crate::core::conversion::{AMOUNT_STEP, ConversionView};
use crate::core::{CurrencyCode, MessageKind};

pub const TITLE: &str = "美元汇率转换工具";
const PENDING_TEXT: &str = "正在获取实时汇率，请稍候...";

const STYLE: &str = "body{font-family:sans-serif;max-width:36rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:1rem}\
.message{padding:.6rem .8rem;margin:.6rem 0;border-radius:4px}\
.success{background:#e6f4ea;color:#1e4620}\
.warning{background:#fff4e5;color:#663c00}\
.error{background:#fdecea;color:#611a15}\
#pending{display:none;color:#555}\
dt{font-weight:bold;margin-top:.4rem}";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn kind_class(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Success => "success",
        MessageKind::Warning => "warning",
        MessageKind::Error => "error",
    }
}

fn render_options(selected: CurrencyCode) -> String {
    CurrencyCode::ALL
        .iter()
        .map(|code| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                code.code(),
                if *code == selected { " selected" } else { "" },
                escape_html(&code.label())
            )
        })
        .collect()
}

fn render_amount(amount: f64) -> String {
    if amount.is_finite() {
        format!("{amount:.2}")
    } else {
        String::new()
    }
}

/// Renders the full page for the current state of `view`.
pub fn render(view: &ConversionView) -> String {
    let messages: String = view
        .messages()
        .iter()
        .map(|message| {
            format!(
                r#"<div class="message {}">{}</div>"#,
                kind_class(message.kind),
                escape_html(&message.text)
            )
        })
        .collect();

    let result = view
        .conversion()
        .map(|conversion| {
            let rows: String = conversion
                .lines()
                .iter()
                .map(|(label, value)| {
                    format!(
                        "<dt>{}：</dt><dd>{}</dd>",
                        escape_html(label),
                        escape_html(value)
                    )
                })
                .collect();
            format!(r#"<dl id="result">{rows}</dl>"#)
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{TITLE}</title>
<style>{STYLE}</style>
</head>
<body>
<h1>💱 {TITLE}</h1>
<p>请输入美元金额，选择目标货币，程序会获取实时汇率并转换。</p>
<form method="post" action="/convert" onsubmit="this.querySelector('button').disabled=true;document.getElementById('pending').style.display='block';">
<label for="currency">选择目标货币：</label>
<select id="currency" name="currency">{options}</select>
<label for="amount">请输入美元金额：</label>
<input id="amount" name="amount" type="number" step="{step:.1}" value="{amount}">
<p><button type="submit">开始转换</button></p>
<p id="pending">{PENDING_TEXT}</p>
</form>
{messages}
{result}
</body>
</html>
"#,
        options = render_options(view.currency()),
        step = AMOUNT_STEP,
        amount = render_amount(view.amount()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateQuote;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_initial_form() {
        let html = render(&ConversionView::default());

        assert!(html.contains(r#"<option value="CNY" selected>人民币 (CNY)</option>"#));
        assert!(html.contains(r#"<option value="JPY">日元 (JPY)</option>"#));
        assert!(html.contains(r#"step="1.0" value="100.00""#));
        assert!(!html.contains(r#"class="message"#));
        assert!(!html.contains(r#"id="result""#));
    }

    #[test]
    fn test_result_and_warning_are_rendered() {
        let mut view = ConversionView::new(CurrencyCode::Jpy, 100.0);
        view.begin().unwrap();
        view.finish(RateQuote {
            rate: 150.0,
            warning: Some("获取实时汇率失败：<timeout>".to_string()),
        });

        let html = render(&view);
        assert!(html.contains(r#"<option value="JPY" selected>"#));
        assert!(html.contains(r#"<div class="message warning">获取实时汇率失败：&lt;timeout&gt;</div>"#));
        assert!(html.contains(r#"<div class="message success">转换完成！</div>"#));
        assert!(html.contains("<dd>1 USD = 150.0000 JPY</dd>"));
        assert!(html.contains("<dt>日元金额：</dt><dd>¥15,000.00</dd>"));
    }

    #[test]
    fn test_invalid_amount_renders_empty_field() {
        let view = ConversionView::new(CurrencyCode::Cny, f64::NAN);
        let html = render(&view);
        assert!(html.contains(r#"value="""#));
        assert!(html.contains(r#"<div class="message error">"#));
    }
}
