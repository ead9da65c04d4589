//! Label to numeric code tables behind the analysis form selects.
//!
//! The form shows the label; the backend and the discrete-choice model only
//! ever see the code.

use std::ops::RangeInclusive;

/// Years the power analysis can forecast.
pub const FORECAST_YEARS: RangeInclusive<u16> = 2023..=2035;

/// Whether `year` is one of [`FORECAST_YEARS`].
pub fn is_forecast_year(year: u16) -> bool {
    FORECAST_YEARS.contains(&year)
}

/// Fixed, ordered list of `(label, code)` options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelMapping {
    pub name: &'static str,
    pub entries: &'static [(&'static str, f64)],
}

impl LabelMapping {
    /// Code for a displayed label.
    pub fn code(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
    }

    /// First label carrying `code`.
    pub fn label(&self, code: f64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(l, _)| *l)
    }

    pub fn contains_code(&self, code: f64) -> bool {
        self.entries.iter().any(|(_, c)| *c == code)
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(l, _)| *l)
    }
}

pub const DIFFUSION: LabelMapping = LabelMapping {
    name: "diffusion",
    entries: &[
        ("None (only home/private charging)", 0.0),
        ("1 out of 4 (25%)", 2.5),
        ("1 out of 2 (50%)", 5.0),
        ("3 out of 4 (75%)", 7.5),
        ("All (100%)", 10.0),
    ],
};

pub const EV_PRICE: LabelMapping = LabelMapping {
    name: "ev_price",
    entries: &[
        ("Costs half of ICE (-50%)", 0.5),
        ("Costs 20% less than ice (-20%)", 0.8),
        ("Costs same as ICE (100%)", 1.0),
        ("Costs 20% more than ICE (120%)", 1.2),
        ("Costs 50% more than an ICE (150%)", 1.5),
        ("Costs double of ICE (200%)", 2.0),
        ("Costs three times ICE (300%)", 3.0),
    ],
};

pub const EV_RANGE: LabelMapping = LabelMapping {
    name: "ev_range",
    entries: &[
        ("Range is half of ICE (-50%)", 0.5),
        ("Range is 20% less than ice (-20%)", 0.8),
        ("Range is same as ICE (100%)", 1.0),
        ("Range is 20% more than ICE (120%)", 1.2),
        ("Range is 50% more than an ICE (150%)", 1.5),
        ("Range is double of ICE (200%)", 2.0),
        ("Range is three times ICE (300%)", 3.0),
    ],
};

pub const ENERGY_COST: LabelMapping = LabelMapping {
    name: "energy_cost",
    entries: &[
        ("25 % cheaper", -2.5),
        ("Same price", 0.0),
        ("25 % more expensive", 2.5),
    ],
};

pub const PURCHASE_INCENTIVE: LabelMapping = LabelMapping {
    name: "purchase_incentive",
    entries: &[
        (
            "Disincentive (taxes based on CO2 emissions and engine power)",
            -1.0,
        ),
        ("No incentives", 0.0),
        ("Limited (3k€ with scrapping)", 1.0),
        ("Medium (6k€ with scrapping)", 2.0),
        ("High (10k€ with scrapping)", 3.0),
    ],
};

pub const UTILIZATION_INCENTIVES: LabelMapping = LabelMapping {
    name: "utilization_incentives",
    entries: &[
        ("No incentives", 0.0),
        ("Limited (access and free parking in LTZ)", 1.0),
        ("High (access to bus lane, LTZ, free parking)", 2.0),
    ],
};

pub const CHARGING_PRICE: LabelMapping = LabelMapping {
    name: "charging_price",
    entries: &[
        ("Periodic subscription", 0.5),
        ("-50% EU home price", 1.0),
        ("EU home price", 2.0),
        ("3 times EU home price", 6.0),
    ],
};

pub const WAITING_TIME: LabelMapping = LabelMapping {
    name: "waiting_time",
    entries: &[
        ("<10 minutes", 1.0),
        ("10-30 minutes", 3.0),
        (">30 minutes", 5.0),
    ],
};

pub const CHARGING_TIME: LabelMapping = LabelMapping {
    name: "charging_time",
    entries: &[
        ("2 hours", 0.5),
        ("1 hour", 1.0),
        ("30 minutes", 2.0),
        ("15 minutes", 4.0),
    ],
};
