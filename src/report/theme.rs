use std::path::Path;

use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::{write_json, TIMESTAMP_FORMAT};

pub const THEME_FILE: &str = "theme_info.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// Fixed-date holidays; lunar ones are approximated by a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Holiday {
    ChineseNewYear,
    Valentines,
    AprilFools,
    LaborDay,
    ChildrensDay,
    MidAutumn,
    NationalDay,
    Halloween,
    Christmas,
}

impl Holiday {
    pub fn on(date: NaiveDate) -> Vec<Holiday> {
        let (month, day) = (date.month(), date.day());
        let rules = [
            (Holiday::ChineseNewYear, month == 2 && day <= 15),
            (Holiday::Valentines, month == 2 && day == 14),
            (Holiday::AprilFools, month == 4 && day == 1),
            (Holiday::LaborDay, month == 5 && day == 1),
            (Holiday::ChildrensDay, month == 6 && day == 1),
            (Holiday::MidAutumn, month == 9 && (10..=20).contains(&day)),
            (Holiday::NationalDay, month == 10 && day <= 7),
            (Holiday::Halloween, month == 10 && day == 31),
            (Holiday::Christmas, month == 12 && day >= 20),
        ];
        rules
            .into_iter()
            .filter_map(|(holiday, active)| active.then_some(holiday))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Spring,
    Summer,
    Autumn,
    Winter,
    ChineseNewYear,
    Christmas,
    Halloween,
}

impl From<Season> for Theme {
    fn from(season: Season) -> Self {
        match season {
            Season::Spring => Theme::Spring,
            Season::Summer => Theme::Summer,
            Season::Autumn => Theme::Autumn,
            Season::Winter => Theme::Winter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub text: &'static str,
}

const fn palette(
    primary: &'static str,
    secondary: &'static str,
    accent: &'static str,
    background: &'static str,
    text: &'static str,
) -> Palette {
    Palette {
        primary,
        secondary,
        accent,
        background,
        text,
    }
}

impl Theme {
    /// Holidays outrank the season: christmas, halloween, then new year.
    pub fn recommended(date: NaiveDate) -> Self {
        let holidays = Holiday::on(date);
        [
            (Holiday::Christmas, Theme::Christmas),
            (Holiday::Halloween, Theme::Halloween),
            (Holiday::ChineseNewYear, Theme::ChineseNewYear),
        ]
        .into_iter()
        .find(|(holiday, _)| holidays.contains(holiday))
        .map(|(_, theme)| theme)
        .unwrap_or_else(|| Season::of(date).into())
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Spring => palette("#2ecc71", "#27ae60", "#f39c12", "#ecf0f1", "#2c3e50"),
            Theme::Summer => palette("#3498db", "#2980b9", "#e74c3c", "#ecf0f1", "#2c3e50"),
            Theme::Autumn => palette("#e67e22", "#d35400", "#f39c12", "#fdf2e9", "#2c3e50"),
            Theme::Winter => palette("#34495e", "#2c3e50", "#3498db", "#ecf0f1", "#2c3e50"),
            Theme::ChineseNewYear => palette("#e74c3c", "#c0392b", "#f1c40f", "#fdf2e9", "#2c3e50"),
            Theme::Christmas => palette("#27ae60", "#229954", "#e74c3c", "#f8f9fa", "#2c3e50"),
            Theme::Halloween => palette("#e67e22", "#d35400", "#8e44ad", "#2c3e50", "#ecf0f1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeInfo {
    pub recommended_theme: Theme,
    pub current_season: Season,
    pub current_holidays: Vec<Holiday>,
    pub theme_colors: Palette,
    pub detection_date: String,
}

impl ThemeInfo {
    pub fn detect(now: NaiveDateTime) -> Self {
        let date = now.date();
        let theme = Theme::recommended(date);
        Self {
            recommended_theme: theme,
            current_season: Season::of(date),
            current_holidays: Holiday::on(date),
            theme_colors: theme.palette(),
            detection_date: now.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

pub fn write(dir: &Path, now: NaiveDateTime) -> Result<ThemeInfo> {
    let info = ThemeInfo::detect(now);
    write_json(dir, THEME_FILE, &info)?;
    Ok(info)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn seasons_by_month() {
        assert_eq!(Season::of(day(3, 1)), Season::Spring);
        assert_eq!(Season::of(day(8, 31)), Season::Summer);
        assert_eq!(Season::of(day(11, 30)), Season::Autumn);
        assert_eq!(Season::of(day(12, 1)), Season::Winter);
        assert_eq!(Season::of(day(2, 29)), Season::Winter);
    }

    #[test]
    fn overlapping_holidays() {
        assert_eq!(
            Holiday::on(day(2, 14)),
            vec![Holiday::ChineseNewYear, Holiday::Valentines]
        );
        assert_eq!(Holiday::on(day(10, 31)), vec![Holiday::Halloween]);
        assert_eq!(Holiday::on(day(10, 7)), vec![Holiday::NationalDay]);
        assert!(Holiday::on(day(7, 15)).is_empty());
    }

    #[test]
    fn holiday_themes_outrank_seasons() {
        assert_eq!(Theme::recommended(day(12, 25)), Theme::Christmas);
        assert_eq!(Theme::recommended(day(12, 19)), Theme::Winter);
        assert_eq!(Theme::recommended(day(10, 31)), Theme::Halloween);
        assert_eq!(Theme::recommended(day(2, 3)), Theme::ChineseNewYear);
        // national day has no theme of its own
        assert_eq!(Theme::recommended(day(10, 1)), Theme::Autumn);
        assert_eq!(Theme::recommended(day(6, 1)), Theme::Summer);
    }

    #[test]
    fn info_serializes_snake_case() {
        let now = day(2, 14).and_hms_opt(8, 30, 0).unwrap();
        let json = serde_json::to_value(ThemeInfo::detect(now)).unwrap();
        assert_eq!(json["recommended_theme"], "chinese_new_year");
        assert_eq!(json["current_season"], "winter");
        assert_eq!(
            json["current_holidays"],
            serde_json::json!(["chinese_new_year", "valentines"])
        );
        assert_eq!(json["theme_colors"]["primary"], "#e74c3c");
        assert_eq!(json["detection_date"], "2024-02-14 08:30:00");
    }

    #[test]
    fn halloween_palette_is_dark() {
        let colors = Theme::Halloween.palette();
        assert_eq!(colors.background, "#2c3e50");
        assert_eq!(colors.text, "#ecf0f1");
    }
}
