//! Terminal rendering of the dashboard

use super::{DashboardState, DashboardView, VideoCard};
use crate::metrics::{Metric, Mode};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Group digits in thousands: 1234567 -> "1,234,567"
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Sparkline of the last `width` values, scaled between their min and max
pub fn sparkline(values: &[u64], width: usize) -> String {
    let tail = &values[values.len().saturating_sub(width)..];
    let (Some(&lo), Some(&hi)) = (tail.iter().min(), tail.iter().max()) else {
        return String::new();
    };
    let span = (hi - lo) as f64;
    tail.iter()
        .map(|&v| {
            if span == 0.0 {
                SPARK_LEVELS[0]
            } else {
                let level = ((v - lo) as f64 / span * 7.0).round() as usize;
                SPARK_LEVELS[level.min(7)]
            }
        })
        .collect()
}

fn series_label(metric: Metric, mode: Mode) -> String {
    match mode {
        Mode::Cumulative => format!("{} (cumulative)", metric),
        Mode::Incremental => format!("{} (daily increase)", metric),
    }
}

/// Print the dashboard to stdout
pub fn print_dashboard(state: &DashboardState, sparkline_width: usize) {
    match state {
        DashboardState::Empty { skipped_rows } => {
            println!("\n📈 YouTube Tracker\n");
            println!("No data yet. Run 'yt-tracker collect' to record the first snapshot.");
            if *skipped_rows > 0 {
                println!("({} unusable row(s) were skipped)", skipped_rows);
            }
        }
        DashboardState::Error { message } => {
            println!("\n📈 YouTube Tracker\n");
            println!("✗ Could not read the history table: {}", message);
        }
        DashboardState::Ready(view) => print_view(view, sparkline_width),
    }
}

fn print_view(view: &DashboardView, sparkline_width: usize) {
    println!("\n📈 YouTube Tracker\n");

    let latest = view
        .freshness
        .latest_day
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    match &view.freshness.file_modified {
        Some(modified) => println!("Latest snapshot: {} | file updated: {}", latest, modified),
        None => println!("Latest snapshot: {}", latest),
    }
    println!(
        "Range: {} → {} | series: {} | channels: {}",
        view.range.start,
        view.range.end,
        series_label(view.metric, view.mode),
        if view.channels.is_empty() {
            "-".to_string()
        } else {
            view.channels.join(", ")
        }
    );
    if view.skipped_rows > 0 {
        println!("⚠ {} unusable row(s) skipped", view.skipped_rows);
    }

    println!("\nIncrease in range:");
    println!("  Views:    {}", format_count(view.kpis.views));
    println!("  Likes:    {}", format_count(view.kpis.likes));
    println!("  Comments: {}", format_count(view.kpis.comments));

    if view.cards.is_empty() {
        println!("\nNo videos match the current filters.");
        return;
    }

    for card in &view.cards {
        print_card(card, view, sparkline_width);
    }
}

fn print_card(card: &VideoCard, view: &DashboardView, sparkline_width: usize) {
    println!("\n• {}", card.title);
    println!("  Channel: {}", card.channel_title);
    match (card.published_day, card.days_since_published) {
        (Some(day), Some(days)) => println!("  Published: {} ({} days ago)", day, days),
        _ => println!("  Published: unknown"),
    }
    println!(
        "  Totals: {} views, {} likes, {} comments",
        format_count(card.views),
        format_count(card.likes),
        format_count(card.comments)
    );
    println!("  URL: {}", card.video_url);
    if !card.thumbnail_url.is_empty() {
        println!("  Thumbnail: {}", card.thumbnail_url);
    }

    if card.points.is_empty() {
        println!("  No data in the selected range");
        return;
    }

    let values: Vec<u64> = card.points.iter().map(|p| p.value).collect();
    println!(
        "  {}: {}",
        series_label(view.metric, view.mode),
        sparkline(&values, sparkline_width)
    );
    for point in &card.points {
        println!("    {}  {:>14}", point.day, format_count(point.value));
    }
}
