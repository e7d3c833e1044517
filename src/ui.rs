use crate::config::TrackerConfig;
use crate::models::{Dataset, DayClass, Intensity, StatsResponse};
use crate::sync::{SyncState, SyncStatus};
use crate::tasks::TASKS;
use std::fmt::Write;

pub fn render_index(
    config: &TrackerConfig,
    data: &Dataset,
    stats: &StatsResponse,
    status: &SyncStatus,
) -> String {
    let last_day = config.date_of(config.total_days.saturating_sub(1));
    INDEX_HTML
        .replace("{{TOTAL}}", &config.total_days.to_string())
        .replace("{{RANGE}}", &format!("{} → {}", config.start_date, last_day))
        .replace("{{STATUS_CLASS}}", status_class(status.state))
        .replace("{{STATUS}}", &escape(&status.message))
        .replace("{{LEGEND}}", &render_legend())
        .replace("{{STATS}}", &render_stats(stats))
        .replace(
            "{{PROGRESS}}",
            &format!("{} / {} days complete", stats.full_days, stats.total_days),
        )
        .replace("{{BARS}}", &render_bars(stats))
        .replace("{{GRID}}", &render_grid(data, stats))
}

fn status_class(state: SyncState) -> &'static str {
    match state {
        SyncState::Idle => "sync-idle",
        SyncState::Loading => "sync-loading",
        SyncState::Saving => "sync-saving",
        SyncState::Ok => "sync-ok",
        SyncState::Error => "sync-error",
    }
}

fn render_legend() -> String {
    let mut out = String::new();
    for task in TASKS {
        let _ = write!(
            out,
            r#"<span class="legend-item"><i style="background:{}"></i>{} {}</span>"#,
            task.color,
            task.icon,
            escape(task.name)
        );
    }
    out
}

fn render_stats(stats: &StatsResponse) -> String {
    let mut out = String::new();
    for total in stats.task_totals.iter().filter(|total| total.volume.is_some()) {
        let _ = write!(
            out,
            r#"<div class="stat"><span class="label">{}</span><span class="value">{}</span></div>"#,
            escape(total.name),
            total.volume.unwrap_or_default()
        );
    }
    let _ = write!(
        out,
        r#"<div class="stat"><span class="label">Current streak</span><span class="value">{} 🔥</span></div>
<div class="stat"><span class="label">Best streak</span><span class="value">{}</span></div>
<div class="stat"><span class="label">Completion</span><span class="value">{}%</span></div>"#,
        stats.current_streak, stats.best_streak, stats.completion_percent
    );
    for total in &stats.task_totals {
        let _ = write!(
            out,
            r#"<div class="stat small"><span class="label" style="color:{}">{}</span><span class="value">{} d</span></div>"#,
            total.color,
            escape(total.name),
            total.days
        );
    }
    out
}

fn render_grid(data: &Dataset, stats: &StatsResponse) -> String {
    let mut out = String::new();
    for point in &stats.daily {
        let index = point.day - 1;
        let record = data.record(index);
        let class = match point.class {
            DayClass::Full => "full",
            DayClass::Partial => "partial",
            DayClass::Empty => "empty",
        };
        let today = if point.is_today { " today" } else { "" };
        let note_dot = if point.has_note { r#"<b class="note-dot"></b>"# } else { "" };

        let _ = write!(
            out,
            r#"<details class="day {class}{today}"><summary>{note_dot}<span class="num">{}</span><span class="date">{}</span><span class="dots">"#,
            point.day, point.date
        );
        for task in TASKS {
            let style = if record.contains(task.id) {
                format!("background:{}", task.color)
            } else {
                String::new()
            };
            let _ = write!(out, r#"<i style="{style}"></i>"#);
        }
        out.push_str("</span></summary><div class=\"day-body\">");
        for task in TASKS {
            let done = record.contains(task.id);
            let _ = write!(
                out,
                r#"<form method="post" action="/days/{}/toggle/{}"><button class="task{}" style="{}">{} {}<small>{}</small></button></form>"#,
                point.day,
                task.id,
                if done { " done" } else { "" },
                if done {
                    format!("border-color:{}", task.color)
                } else {
                    String::new()
                },
                task.icon,
                escape(task.name),
                escape(task.subtitle)
            );
        }
        let _ = write!(
            out,
            r#"<form method="post" action="/days/{day}/note"><textarea name="note" rows="3">{note}</textarea><button class="save">💾 Save Note</button></form>
<form method="post" action="/days/{day}/clear"><button class="clear">Clear tasks (note is kept)</button></form></div></details>"#,
            day = point.day,
            note = escape(record.note())
        );
    }
    out
}

fn render_bars(stats: &StatsResponse) -> String {
    let max = TASKS.len().max(1);
    let mut out = String::new();
    for point in &stats.daily {
        let height = ((point.completed * 80) / max).max(2);
        let tone = match point.intensity {
            Intensity::Full => "full",
            Intensity::High => "high",
            Intensity::Low => "low",
            Intensity::None => "none",
        };
        let _ = write!(
            out,
            r#"<div class="sbar {tone}" style="height:{height}px" title="Day {}: {}/{max}"></div>"#,
            point.day, point.completed
        );
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TOTAL}}-Day Tracker</title>
  <style>
    :root {
      --bg: #0c0c14;
      --card: #13131e;
      --border: #24243a;
      --ink: #e8e8f0;
      --muted: #9090aa;
      --accent: #00ff88;
      --accent2: #ff6b35;
      --accent5: #ffd166;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "IBM Plex Mono", monospace;
      padding: 28px 18px 48px;
    }

    .app {
      width: min(1000px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: baseline;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    .range,
    .progress {
      color: var(--muted);
    }

    .sync-status {
      padding: 6px 12px;
      border-radius: 999px;
      border: 1px solid var(--border);
    }

    .sync-ok { color: var(--accent); }
    .sync-error { color: #ff4d6d; }
    .sync-saving,
    .sync-loading { color: var(--accent5); }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      font-size: 0.85rem;
    }

    .legend i,
    .dots i {
      display: inline-block;
      width: 8px;
      height: 8px;
      border-radius: 50%;
      background: var(--border);
      margin-right: 4px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 12px;
    }

    .stat {
      background: var(--card);
      border: 1px solid var(--border);
      border-radius: 14px;
      padding: 14px;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.4rem;
      font-weight: 600;
    }

    .stat.small .value {
      font-size: 1rem;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 8px;
    }

    .day {
      background: var(--card);
      border: 1px solid var(--border);
      border-radius: 10px;
      padding: 8px;
      position: relative;
    }

    .day.full { border-color: var(--accent); }
    .day.partial { border-color: var(--accent2); }
    .day.today { box-shadow: 0 0 0 2px var(--accent5); }

    .day[open] {
      grid-column: span 7;
    }

    summary {
      cursor: pointer;
      list-style: none;
      display: grid;
      gap: 4px;
    }

    .num { font-weight: 600; }
    .date { font-size: 0.75rem; color: var(--muted); }

    .note-dot {
      position: absolute;
      top: 6px;
      right: 6px;
      width: 6px;
      height: 6px;
      border-radius: 50%;
      background: var(--accent5);
    }

    .day-body {
      display: grid;
      gap: 8px;
      margin-top: 10px;
    }

    button {
      appearance: none;
      width: 100%;
      text-align: left;
      background: transparent;
      color: var(--ink);
      border: 1px solid var(--border);
      border-radius: 8px;
      padding: 8px 10px;
      font: inherit;
      cursor: pointer;
    }

    button small {
      display: block;
      color: var(--muted);
    }

    button.done {
      background: rgba(255, 255, 255, 0.06);
    }

    textarea {
      width: 100%;
      background: var(--bg);
      color: var(--ink);
      border: 1px solid var(--border);
      border-radius: 8px;
      font: inherit;
      padding: 8px;
    }

    .streak-bars {
      display: flex;
      align-items: flex-end;
      gap: 3px;
      height: 84px;
    }

    .sbar {
      flex: 1;
      border-radius: 3px 3px 0 0;
      background: var(--border);
    }

    .sbar.full { background: var(--accent); }
    .sbar.high { background: var(--accent5); }
    .sbar.low { background: var(--accent2); }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>{{TOTAL}}-Day Tracker</h1>
        <span class="range">{{RANGE}}</span>
      </div>
      <span class="sync-status {{STATUS_CLASS}}">{{STATUS}}</span>
    </header>

    <section class="legend">{{LEGEND}}</section>

    <section class="panel">{{STATS}}</section>

    <section>
      <p class="progress">{{PROGRESS}}</p>
      <div class="grid">{{GRID}}</div>
    </section>

    <section>
      <h2>Daily intensity</h2>
      <div class="streak-bars">{{BARS}}</div>
    </section>
  </main>
</body>
</html>
"#;
