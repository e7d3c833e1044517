use crate::config::TrackerConfig;
use crate::models::{
    DailyPoint, Dataset, DayClass, DayRecord, HeatmapRow, Intensity, StatsResponse, TaskTotal,
};
use crate::tasks::TASKS;
use chrono::{Local, NaiveDate};

pub fn build_stats(config: &TrackerConfig, data: &Dataset) -> StatsResponse {
    build_stats_at(config, Local::now().date_naive(), data)
}

pub fn build_stats_at(config: &TrackerConfig, today: NaiveDate, data: &Dataset) -> StatsResponse {
    StatsResponse {
        total_days: config.total_days,
        full_days: full_days(config, data),
        completion_percent: completion_percent(config, data),
        current_streak: current_streak(config, today, data),
        best_streak: best_streak(config, data),
        daily: daily_series(config, today, data),
        task_totals: task_totals(config, data),
        heatmap: heatmap(config, data),
    }
}

fn task_count() -> usize {
    TASKS.len().max(1)
}

pub fn completion_fraction(record: &DayRecord) -> f64 {
    record.completed_count() as f64 / task_count() as f64
}

pub fn classify(record: &DayRecord) -> DayClass {
    match record.completed_count() {
        0 => DayClass::Empty,
        n if n >= task_count() => DayClass::Full,
        _ => DayClass::Partial,
    }
}

pub fn intensity(record: &DayRecord) -> Intensity {
    let done = record.completed_count();
    if done >= task_count() {
        Intensity::Full
    } else if done * 2 > task_count() {
        Intensity::High
    } else if done > 0 {
        Intensity::Low
    } else {
        Intensity::None
    }
}

fn is_full(data: &Dataset, index: usize) -> bool {
    classify(data.record(index)) == DayClass::Full
}

/// Completed-task count per day, in window order.
pub fn daily_counts(config: &TrackerConfig, data: &Dataset) -> Vec<usize> {
    (0..config.total_days)
        .map(|index| data.record(index).completed_count())
        .collect()
}

pub fn full_days(config: &TrackerConfig, data: &Dataset) -> usize {
    (0..config.total_days)
        .filter(|&index| is_full(data, index))
        .count()
}

/// Full days ending at the latest day that is not after `today`.
pub fn current_streak(config: &TrackerConfig, today: NaiveDate, data: &Dataset) -> usize {
    let mut streak = 0;
    for index in (0..config.total_days).rev() {
        if config.date_of(index) > today {
            continue;
        }
        if !is_full(data, index) {
            break;
        }
        streak += 1;
    }
    streak
}

/// Longest run of full days anywhere in the window.
pub fn best_streak(config: &TrackerConfig, data: &Dataset) -> usize {
    let mut best = 0;
    let mut run = 0;
    for index in 0..config.total_days {
        if is_full(data, index) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// Whole-window completion, rounded half up. Only a fully complete window reads 100.
pub fn completion_percent(config: &TrackerConfig, data: &Dataset) -> u32 {
    let possible = config.total_days * TASKS.len();
    if possible == 0 {
        return 0;
    }
    let done: usize = daily_counts(config, data).into_iter().sum();
    let rounded = ((done * 200 + possible) / (possible * 2)) as u32;
    if rounded == 100 && done < possible {
        99
    } else {
        rounded
    }
}

pub fn task_totals(config: &TrackerConfig, data: &Dataset) -> Vec<TaskTotal> {
    TASKS
        .iter()
        .map(|task| {
            let days = (0..config.total_days)
                .filter(|&index| data.record(index).contains(task.id))
                .count();
            TaskTotal {
                id: task.id,
                name: task.name,
                color: task.color,
                days,
                volume: task.reps.map(|reps| reps * days as u64),
            }
        })
        .collect()
}

pub fn daily_series(config: &TrackerConfig, today: NaiveDate, data: &Dataset) -> Vec<DailyPoint> {
    (0..config.total_days)
        .map(|index| {
            let record = data.record(index);
            let date = config.date_of(index);
            DailyPoint {
                day: index + 1,
                date: date.to_string(),
                completed: record.completed_count(),
                fraction: completion_fraction(record),
                class: classify(record),
                intensity: intensity(record),
                has_note: record.has_note(),
                is_today: date == today,
            }
        })
        .collect()
}

pub fn heatmap(config: &TrackerConfig, data: &Dataset) -> Vec<HeatmapRow> {
    TASKS
        .iter()
        .map(|task| HeatmapRow {
            task: task.id,
            done: (0..config.total_days)
                .map(|index| data.record(index).contains(task.id))
                .collect(),
        })
        .collect()
}
