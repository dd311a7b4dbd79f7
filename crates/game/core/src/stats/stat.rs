//! Stat identifiers and their numeric transforms.

use strum::EnumIter;

/// Power-weighting category of a stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    /// Primary combat stats (HP, STR, DEF, SPD).
    Main,
    /// Probability stats mapped through a saturating curve.
    Chance,
    /// Supporting pools (AP).
    Secondary,
}

impl StatKind {
    /// Relative weight of one raw point when rating an entity's power.
    pub const fn power_weight(self) -> f64 {
        match self {
            StatKind::Main => 1.0,
            StatKind::Chance => 0.5,
            StatKind::Secondary => 2.0,
        }
    }
}

/// How a raw (integer) stat value becomes an effective value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatTransform {
    /// `raw * multiplier`
    Linear(f64),
    /// `raw / (raw + weight)`, always in `[0, 1)` for non-negative raw values.
    Saturating(f64),
    /// `raw * 0.05`; displayed with a +1 offset.
    Speed,
}

impl StatTransform {
    pub const SPEED_SCALE: f64 = 0.05;
    pub const DEFAULT_CHANCE_WEIGHT: f64 = 30.0;

    pub fn apply(self, raw: i64) -> f64 {
        let raw = raw.max(0) as f64;
        match self {
            StatTransform::Linear(multiplier) => raw * multiplier,
            StatTransform::Saturating(weight) => raw / (raw + weight),
            StatTransform::Speed => raw * Self::SPEED_SCALE,
        }
    }
}

/// Stat identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stat {
    /// Health. Persistent: the live value is stored, the stat is its maximum.
    Hp,
    /// Ability points. Persistent like HP.
    Ap,
    /// Strength, drives outgoing damage.
    Str,
    /// Defense, reduces incoming damage.
    Def,
    /// Speed, drives turn order and extra actions.
    Spd,
    /// Evasion chance.
    Eva,
    /// Counter-attack chance.
    Cont,
    /// Critical hit chance.
    Crit,
    /// Life-steal chance.
    Vamp,
}

impl Stat {
    pub const fn kind(self) -> StatKind {
        match self {
            Stat::Hp | Stat::Str | Stat::Def | Stat::Spd => StatKind::Main,
            Stat::Ap => StatKind::Secondary,
            Stat::Eva | Stat::Cont | Stat::Crit | Stat::Vamp => StatKind::Chance,
        }
    }

    pub const fn transform(self) -> StatTransform {
        match self {
            Stat::Spd => StatTransform::Speed,
            Stat::Eva | Stat::Cont | Stat::Crit | Stat::Vamp => {
                StatTransform::Saturating(StatTransform::DEFAULT_CHANCE_WEIGHT)
            }
            Stat::Hp | Stat::Ap | Stat::Str | Stat::Def => StatTransform::Linear(1.0),
        }
    }

    /// HP and AP keep a live value that is tracked separately from their maximum.
    pub const fn is_persistent(self) -> bool {
        matches!(self, Stat::Hp | Stat::Ap)
    }

    /// Largest bonus a single item may grant for this stat.
    pub const fn item_limit(self) -> i64 {
        match self {
            Stat::Hp => 50,
            Stat::Ap => 5,
            Stat::Str | Stat::Def => 15,
            Stat::Spd => 10,
            Stat::Eva | Stat::Cont | Stat::Crit | Stat::Vamp => 20,
        }
    }

    pub const fn abbreviation(self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Ap => "AP",
            Stat::Str => "STR",
            Stat::Def => "DEF",
            Stat::Spd => "SPD",
            Stat::Eva => "EVA",
            Stat::Cont => "CONT",
            Stat::Crit => "CRIT",
            Stat::Vamp => "VAMP",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Stat::Hp => "❤️",
            Stat::Ap => "✨",
            Stat::Str => "⚔️",
            Stat::Def => "🛡️",
            Stat::Spd => "💨",
            Stat::Eva => "👻",
            Stat::Cont => "🔁",
            Stat::Crit => "💥",
            Stat::Vamp => "🩸",
        }
    }

    /// Effective value used by the simulation.
    pub fn get_value(self, raw: i64) -> f64 {
        self.transform().apply(raw)
    }

    /// Player-facing rendering of a raw value. Never used by simulation math.
    pub fn display_value(self, raw: i64) -> String {
        let effective = self.get_value(raw);
        match self.transform() {
            StatTransform::Speed => format_number(effective + 1.0),
            StatTransform::Saturating(_) => format!("{}%", format_number(effective * 100.0)),
            StatTransform::Linear(_) => format_number(effective),
        }
    }
}

impl core::fmt::Display for Stat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Formats with at most two decimals and no trailing zeros.
fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn chance_stats_saturate_below_one() {
        for stat in Stat::iter().filter(|s| s.kind() == StatKind::Chance) {
            assert_eq!(stat.get_value(0), 0.0);
            assert!((stat.get_value(30) - 0.5).abs() < f64::EPSILON);
            assert!(stat.get_value(1_000_000) < 1.0);
            assert_eq!(stat.get_value(-5), 0.0);
        }
    }

    #[test]
    fn speed_is_scaled_and_displayed_with_offset() {
        assert_eq!(Stat::Spd.get_value(0), 0.0);
        assert!((Stat::Spd.get_value(10) - 0.5).abs() < 1e-12);
        assert_eq!(Stat::Spd.display_value(0), "1");
        assert_eq!(Stat::Spd.display_value(10), "1.5");
    }

    #[test]
    fn main_stats_are_linear() {
        assert_eq!(Stat::Str.get_value(12), 12.0);
        assert_eq!(Stat::Hp.display_value(50), "50");
        assert_eq!(Stat::Crit.display_value(30), "50%");
    }

    #[test]
    fn only_hp_and_ap_are_persistent() {
        let persistent: Vec<Stat> = Stat::iter().filter(|s| s.is_persistent()).collect();
        assert_eq!(persistent, vec![Stat::Hp, Stat::Ap]);
    }
}
