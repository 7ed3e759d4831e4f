//! Activity-type classification.
//!
//! The health store reports an activity kind per workout as a numeric raw
//! code. This module maps those codes to [`ActivityType`] and each type to
//! the stable label written into exports (`running`,
//! `highIntensityIntervalTraining`, ...). Both mappings are driven by a
//! single static table; anything not in it is [`ActivityType::Other`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Label emitted for unrecognized activity kinds.
pub const OTHER_LABEL: &str = "other";

/// Raw code the health store uses for "other".
pub const OTHER_CODE: u32 = 3000;

/// Workout activity kind as reported by the health store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivityType {
    AmericanFootball,
    Archery,
    AustralianFootball,
    Badminton,
    Baseball,
    Basketball,
    Bowling,
    Boxing,
    Climbing,
    Cricket,
    CrossTraining,
    Curling,
    Cycling,
    Dance,
    DanceInspiredTraining,
    Elliptical,
    EquestrianSports,
    Fencing,
    Fishing,
    FunctionalStrengthTraining,
    Golf,
    Gymnastics,
    Handball,
    Hiking,
    Hockey,
    Hunting,
    Lacrosse,
    MartialArts,
    MindAndBody,
    MixedMetabolicCardioTraining,
    PaddleSports,
    Play,
    PreparationAndRecovery,
    Racquetball,
    Rowing,
    Rugby,
    Running,
    Sailing,
    SkatingSports,
    SnowSports,
    Soccer,
    Softball,
    Squash,
    StairClimbing,
    SurfingSports,
    Swimming,
    TableTennis,
    Tennis,
    TrackAndField,
    TraditionalStrengthTraining,
    Volleyball,
    Walking,
    WaterFitness,
    WaterPolo,
    WaterSports,
    Wrestling,
    Yoga,
    Barre,
    CoreTraining,
    CrossCountrySkiing,
    DownhillSkiing,
    Flexibility,
    HighIntensityIntervalTraining,
    JumpRope,
    Kickboxing,
    Pilates,
    Snowboarding,
    Stairs,
    StepTraining,
    WheelchairWalkPace,
    WheelchairRunPace,
    TaiChi,
    MixedCardio,
    HandCycling,
    DiscSports,
    FitnessGaming,
    CardioDance,
    SocialDance,
    Pickleball,
    Cooldown,
    SwimBikeRun,
    Transition,
    UnderwaterDiving,
    Other,
}

/// `(type, raw code, label)` for every known activity kind.
pub const ACTIVITY_TABLE: &[(ActivityType, u32, &str)] = &[
    (ActivityType::AmericanFootball, 1, "americanFootball"),
    (ActivityType::Archery, 2, "archery"),
    (ActivityType::AustralianFootball, 3, "australianFootball"),
    (ActivityType::Badminton, 4, "badminton"),
    (ActivityType::Baseball, 5, "baseball"),
    (ActivityType::Basketball, 6, "basketball"),
    (ActivityType::Bowling, 7, "bowling"),
    (ActivityType::Boxing, 8, "boxing"),
    (ActivityType::Climbing, 9, "climbing"),
    (ActivityType::Cricket, 10, "cricket"),
    (ActivityType::CrossTraining, 11, "crossTraining"),
    (ActivityType::Curling, 12, "curling"),
    (ActivityType::Cycling, 13, "cycling"),
    (ActivityType::Dance, 14, "dance"),
    (ActivityType::DanceInspiredTraining, 15, "danceInspiredTraining"),
    (ActivityType::Elliptical, 16, "elliptical"),
    (ActivityType::EquestrianSports, 17, "equestrianSports"),
    (ActivityType::Fencing, 18, "fencing"),
    (ActivityType::Fishing, 19, "fishing"),
    (ActivityType::FunctionalStrengthTraining, 20, "functionalStrengthTraining"),
    (ActivityType::Golf, 21, "golf"),
    (ActivityType::Gymnastics, 22, "gymnastics"),
    (ActivityType::Handball, 23, "handball"),
    (ActivityType::Hiking, 24, "hiking"),
    (ActivityType::Hockey, 25, "hockey"),
    (ActivityType::Hunting, 26, "hunting"),
    (ActivityType::Lacrosse, 27, "lacrosse"),
    (ActivityType::MartialArts, 28, "martialArts"),
    (ActivityType::MindAndBody, 29, "mindAndBody"),
    (ActivityType::MixedMetabolicCardioTraining, 30, "mixedMetabolicCardioTraining"),
    (ActivityType::PaddleSports, 31, "paddleSports"),
    (ActivityType::Play, 32, "play"),
    (ActivityType::PreparationAndRecovery, 33, "preparationAndRecovery"),
    (ActivityType::Racquetball, 34, "racquetball"),
    (ActivityType::Rowing, 35, "rowing"),
    (ActivityType::Rugby, 36, "rugby"),
    (ActivityType::Running, 37, "running"),
    (ActivityType::Sailing, 38, "sailing"),
    (ActivityType::SkatingSports, 39, "skatingSports"),
    (ActivityType::SnowSports, 40, "snowSports"),
    (ActivityType::Soccer, 41, "soccer"),
    (ActivityType::Softball, 42, "softball"),
    (ActivityType::Squash, 43, "squash"),
    (ActivityType::StairClimbing, 44, "stairClimbing"),
    (ActivityType::SurfingSports, 45, "surfingSports"),
    (ActivityType::Swimming, 46, "swimming"),
    (ActivityType::TableTennis, 47, "tableTennis"),
    (ActivityType::Tennis, 48, "tennis"),
    (ActivityType::TrackAndField, 49, "trackAndField"),
    (ActivityType::TraditionalStrengthTraining, 50, "traditionalStrengthTraining"),
    (ActivityType::Volleyball, 51, "volleyball"),
    (ActivityType::Walking, 52, "walking"),
    (ActivityType::WaterFitness, 53, "waterFitness"),
    (ActivityType::WaterPolo, 54, "waterPolo"),
    (ActivityType::WaterSports, 55, "waterSports"),
    (ActivityType::Wrestling, 56, "wrestling"),
    (ActivityType::Yoga, 57, "yoga"),
    (ActivityType::Barre, 58, "barre"),
    (ActivityType::CoreTraining, 59, "coreTraining"),
    (ActivityType::CrossCountrySkiing, 60, "crossCountrySkiing"),
    (ActivityType::DownhillSkiing, 61, "downhillSkiing"),
    (ActivityType::Flexibility, 62, "flexibility"),
    (ActivityType::HighIntensityIntervalTraining, 63, "highIntensityIntervalTraining"),
    (ActivityType::JumpRope, 64, "jumpRope"),
    (ActivityType::Kickboxing, 65, "kickboxing"),
    (ActivityType::Pilates, 66, "pilates"),
    (ActivityType::Snowboarding, 67, "snowboarding"),
    (ActivityType::Stairs, 68, "stairs"),
    (ActivityType::StepTraining, 69, "stepTraining"),
    (ActivityType::WheelchairWalkPace, 70, "wheelchairWalkPace"),
    (ActivityType::WheelchairRunPace, 71, "wheelchairRunPace"),
    (ActivityType::TaiChi, 72, "taiChi"),
    (ActivityType::MixedCardio, 73, "mixedCardio"),
    (ActivityType::HandCycling, 74, "handCycling"),
    (ActivityType::DiscSports, 75, "discSports"),
    (ActivityType::FitnessGaming, 76, "fitnessGaming"),
    (ActivityType::CardioDance, 77, "cardioDance"),
    (ActivityType::SocialDance, 78, "socialDance"),
    (ActivityType::Pickleball, 79, "pickleball"),
    (ActivityType::Cooldown, 80, "cooldown"),
    (ActivityType::SwimBikeRun, 82, "swimBikeRun"),
    (ActivityType::Transition, 83, "transition"),
    (ActivityType::UnderwaterDiving, 84, "underwaterDiving"),
];

/// Explicit fallback entry for anything missing from [`ACTIVITY_TABLE`].
const FALLBACK: (ActivityType, u32, &str) = (ActivityType::Other, OTHER_CODE, OTHER_LABEL);

impl ActivityType {
    fn entry(self) -> &'static (ActivityType, u32, &'static str) {
        ACTIVITY_TABLE
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .unwrap_or(&FALLBACK)
    }

    /// Stable export label.
    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// Raw health-store code.
    pub fn code(self) -> u32 {
        self.entry().1
    }

    /// Look up a raw health-store code. Unknown codes map to `Other`.
    pub fn from_code(code: u32) -> Self {
        ACTIVITY_TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map_or(FALLBACK.0, |(kind, _, _)| *kind)
    }

    /// Look up an export label (ASCII case-insensitive). Unknown labels map
    /// to `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        ACTIVITY_TABLE
            .iter()
            .find(|(_, _, l)| l.eq_ignore_ascii_case(label))
            .map_or(FALLBACK.0, |(kind, _, _)| *kind)
    }

    /// Every known type, in table order, excluding `Other`.
    pub fn known() -> impl Iterator<Item = ActivityType> {
        ACTIVITY_TABLE.iter().map(|(kind, _, _)| *kind)
    }
}

/// Classify a raw health-store value into its export label.
pub fn classify(code: u32) -> &'static str {
    ActivityType::from_code(code).label()
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Record files carry either the raw code or the label.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawActivityType {
    Code(u64),
    Label(String),
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawActivityType::deserialize(deserializer)? {
            RawActivityType::Code(code) => u32::try_from(code)
                .map(ActivityType::from_code)
                .unwrap_or(ActivityType::Other),
            RawActivityType::Label(label) => ActivityType::from_label(&label),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_known_type_round_trips() {
        for kind in ActivityType::known() {
            assert_eq!(ActivityType::from_code(kind.code()), kind);
            assert_eq!(ActivityType::from_label(kind.label()), kind);
            assert_ne!(kind.label(), OTHER_LABEL);
        }
    }

    #[test]
    fn test_table_codes_and_labels_are_unique() {
        let codes: HashSet<u32> = ACTIVITY_TABLE.iter().map(|(_, c, _)| *c).collect();
        let labels: HashSet<&str> = ACTIVITY_TABLE.iter().map(|(_, _, l)| *l).collect();
        assert_eq!(codes.len(), ACTIVITY_TABLE.len());
        assert_eq!(labels.len(), ACTIVITY_TABLE.len());
        assert!(!codes.contains(&OTHER_CODE));
    }

    #[test]
    fn test_unknown_values_classify_as_other() {
        assert_eq!(classify(81), "other");
        assert_eq!(classify(9999), "other");
        assert_eq!(classify(OTHER_CODE), "other");
        assert_eq!(ActivityType::from_label("underwater basket weaving"), ActivityType::Other);
        assert_eq!(ActivityType::Other.label(), "other");
        assert_eq!(ActivityType::Other.code(), OTHER_CODE);
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(classify(37), "running");
        assert_eq!(classify(46), "swimming");
        assert_eq!(classify(13), "cycling");
        assert_eq!(classify(63), "highIntensityIntervalTraining");
        assert_eq!(ActivityType::from_label("RUNNING"), ActivityType::Running);
    }

    #[test]
    fn test_deserialize_code_or_label() {
        let kinds: Vec<ActivityType> =
            serde_json::from_str(r#"[37, "swimming", "nope", 4294967296]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                ActivityType::Running,
                ActivityType::Swimming,
                ActivityType::Other,
                ActivityType::Other
            ]
        );
        assert_eq!(serde_json::to_string(&ActivityType::Cycling).unwrap(), "\"cycling\"");
    }
}
