use anyhow::Result;

use livecount::ScrapeResult;

use crate::OutputFormat;

/// Print one scrape result in full.
pub fn print_result(result: &ScrapeResult, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if !result.is_success() {
        println!("❌ {}", result.url);
        if let Some(message) = &result.message {
            println!("   {message}");
        }
        return Ok(());
    }

    let title = if result.title.is_empty() {
        "(untitled)"
    } else {
        &result.title
    };
    println!("📺 {title}");
    if let Some(channel) = &result.channel_name {
        println!("   Channel: {channel}");
    }
    if result.is_live {
        println!("   🔴 LIVE: {} watching", group_thousands(result.viewers));
    } else {
        println!("   ⏹  Not live: {} views", group_thousands(result.viewers));
    }
    if let Some(resolved) = &result.redirected_url {
        println!("   ↪  {resolved}");
    }
    if let Some(message) = &result.message {
        println!("   {message}");
    }
    println!("   🕐 {}", result.timestamp.to_rfc3339());

    Ok(())
}

/// One line per sample, for `watch`.
pub fn print_sample(result: &ScrapeResult, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    let time = result.timestamp.format("%H:%M:%S");
    if result.is_success() {
        let state = if result.is_live { "LIVE" } else { "off " };
        println!("{time}  {state}  {:>12}", group_thousands(result.viewers));
    } else {
        println!(
            "{time}  error  {}",
            result.message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// `1234567` → `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
