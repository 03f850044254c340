use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background_color: &'static str,
    pub font_color: &'static str,
}

pub const LIGHT: Theme = Theme {
    background_color: "white",
    font_color: "black",
};

pub const DARK: Theme = Theme {
    background_color: "black",
    font_color: "white",
};

// (hour, minute, second, nanosecond)
const DAY_START: (u32, u32, u32, u32) = (8, 0, 0, 0);
const DAY_END: (u32, u32, u32, u32) = (20, 0, 0, 0);

/// Whether the local wall-clock time falls in the inclusive 08:00 - 20:00 window.
pub fn is_day(now: &DateTime<Tz>) -> bool {
    let time = (now.hour(), now.minute(), now.second(), now.nanosecond());
    DAY_START <= time && time <= DAY_END
}

pub fn select_theme(now: &DateTime<Tz>) -> Theme {
    if is_day(now) {
        LIGHT
    } else {
        DARK
    }
}
