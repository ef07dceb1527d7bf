//! Zodiac sign lookup from a date of birth.
//!
//! Labels are `"<symbol> <Name>"` (e.g. `"♈ Aries"`); they are what the card
//! stores in `zodiacSign` and what the registry compares against.

use chrono::{Datelike, NaiveDate};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

// First (month, day) of each sign, in calendar order starting at Capricorn's
// January tail.
const BOUNDARIES: [((u32, u32), ZodiacSign); 12] = [
    ((1, 20), ZodiacSign::Aquarius),
    ((2, 19), ZodiacSign::Pisces),
    ((3, 21), ZodiacSign::Aries),
    ((4, 20), ZodiacSign::Taurus),
    ((5, 21), ZodiacSign::Gemini),
    ((6, 21), ZodiacSign::Cancer),
    ((7, 23), ZodiacSign::Leo),
    ((8, 23), ZodiacSign::Virgo),
    ((9, 23), ZodiacSign::Libra),
    ((10, 23), ZodiacSign::Scorpio),
    ((11, 22), ZodiacSign::Sagittarius),
    ((12, 22), ZodiacSign::Capricorn),
];

impl ZodiacSign {
    /// Sign for a calendar day. Days before January 20 are Capricorn.
    pub fn from_month_day(month: u32, day: u32) -> Self {
        BOUNDARIES
            .iter()
            .rev()
            .find(|((m, d), _)| (month, day) >= (*m, *d))
            .map(|(_, sign)| *sign)
            .unwrap_or(ZodiacSign::Capricorn)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_month_day(date.month(), date.day())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            ZodiacSign::Aries => '♈',
            ZodiacSign::Taurus => '♉',
            ZodiacSign::Gemini => '♊',
            ZodiacSign::Cancer => '♋',
            ZodiacSign::Leo => '♌',
            ZodiacSign::Virgo => '♍',
            ZodiacSign::Libra => '♎',
            ZodiacSign::Scorpio => '♏',
            ZodiacSign::Sagittarius => '♐',
            ZodiacSign::Capricorn => '♑',
            ZodiacSign::Aquarius => '♒',
            ZodiacSign::Pisces => '♓',
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol(), self.name())
    }
}

/// Label for a `YYYY-MM-DD` date of birth; `None` when empty or unparseable.
pub fn zodiac_label(dob: &str) -> Option<String> {
    let dob = dob.trim();
    if dob.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .ok()
        .map(|date| ZodiacSign::from_date(date).label())
}
