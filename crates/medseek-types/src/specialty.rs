//! Medical specialties offered at session setup and their display copy.

use serde::{Deserialize, Serialize};

/// Medical department selected when a session is created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    #[default]
    Obstetrics,
    Pediatrics,
    Gynecology,
    InternalMedicine,
    Dermatology,
    Psychiatry,
    Nutrition,
}

impl Specialty {
    /// Every specialty in selector order
    pub const ALL: [Specialty; 7] = [
        Specialty::Obstetrics,
        Specialty::Pediatrics,
        Specialty::Gynecology,
        Specialty::InternalMedicine,
        Specialty::Dermatology,
        Specialty::Psychiatry,
        Specialty::Nutrition,
    ];

    /// Wire key, as sent to `/session/create`
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Obstetrics => "obstetrics",
            Specialty::Pediatrics => "pediatrics",
            Specialty::Gynecology => "gynecology",
            Specialty::InternalMedicine => "internal_medicine",
            Specialty::Dermatology => "dermatology",
            Specialty::Psychiatry => "psychiatry",
            Specialty::Nutrition => "nutrition",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase().replace('-', "_");
        Specialty::ALL.into_iter().find(|s| s.as_str() == key)
    }

    pub fn info(&self) -> &'static SpecialtyInfo {
        match self {
            Specialty::Obstetrics => &OBSTETRICS,
            Specialty::Pediatrics => &PEDIATRICS,
            Specialty::Gynecology => &GYNECOLOGY,
            Specialty::InternalMedicine => &INTERNAL_MEDICINE,
            Specialty::Dermatology => &DERMATOLOGY,
            Specialty::Psychiatry => &PSYCHIATRY,
            Specialty::Nutrition => &NUTRITION,
        }
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display record for one specialty
#[derive(Debug, PartialEq, Eq)]
pub struct SpecialtyInfo {
    pub emoji: &'static str,
    pub title: &'static str,
    pub welcome: &'static str,
    pub description: &'static str,
    pub guidelines: &'static [&'static str],
    pub doctor_role: &'static str,
}

impl SpecialtyInfo {
    /// Record used when no known specialty applies
    pub fn general() -> &'static SpecialtyInfo {
        &GENERAL
    }
}

/// Look up display copy by wire key, falling back to the general record
pub fn specialty_info(key: &str) -> &'static SpecialtyInfo {
    match Specialty::from_key(key) {
        Some(specialty) => specialty.info(),
        None => {
            log::warn!("Unknown specialty '{}', using general record", key);
            SpecialtyInfo::general()
        }
    }
}

const SAFETY_NOTE: &str =
    "Remember: This is an AI assistant, not a substitute for professional medical advice";

static GENERAL: SpecialtyInfo = SpecialtyInfo {
    emoji: "🏥",
    title: "General Consultation",
    welcome: "Welcome to MedSeek",
    description: "Start your consultation by describing your health concerns below.",
    guidelines: &[
        "Describe your symptoms in detail",
        "Mention any relevant medical history",
        "Be honest about your health concerns",
        SAFETY_NOTE,
    ],
    doctor_role: "Doctor",
};

static OBSTETRICS: SpecialtyInfo = SpecialtyInfo {
    emoji: "🤰",
    title: "Obstetrics",
    welcome: "Welcome to your prenatal consultation",
    description: "Pregnancy care, prenatal checkups and postpartum recovery.",
    guidelines: &[
        "Tell us how many weeks pregnant you are",
        "Describe any symptoms and when they started",
        "List current medications and supplements",
        SAFETY_NOTE,
    ],
    doctor_role: "Obstetrician",
};

static PEDIATRICS: SpecialtyInfo = SpecialtyInfo {
    emoji: "👶",
    title: "Pediatrics",
    welcome: "Welcome to your pediatric consultation",
    description: "Health care for infants, children and adolescents.",
    guidelines: &[
        "Tell us your child's age and weight",
        "Describe the symptoms and how long they have lasted",
        "Mention vaccinations and known allergies",
        SAFETY_NOTE,
    ],
    doctor_role: "Pediatrician",
};

static GYNECOLOGY: SpecialtyInfo = SpecialtyInfo {
    emoji: "🌸",
    title: "Gynecology",
    welcome: "Welcome to your gynecology consultation",
    description: "Reproductive and menstrual health for women.",
    guidelines: &[
        "Describe your cycle and any recent changes",
        "Mention contraception or hormone treatment",
        "Describe pain, bleeding or discharge in detail",
        SAFETY_NOTE,
    ],
    doctor_role: "Gynecologist",
};

static INTERNAL_MEDICINE: SpecialtyInfo = SpecialtyInfo {
    emoji: "🩺",
    title: "Internal Medicine",
    welcome: "Welcome to your internal medicine consultation",
    description: "Diagnosis and management of adult diseases.",
    guidelines: &[
        "Describe your symptoms in detail",
        "Mention chronic conditions and past surgeries",
        "List current medications and doses",
        SAFETY_NOTE,
    ],
    doctor_role: "Internist",
};

static DERMATOLOGY: SpecialtyInfo = SpecialtyInfo {
    emoji: "🧴",
    title: "Dermatology",
    welcome: "Welcome to your dermatology consultation",
    description: "Skin, hair and nail conditions.",
    guidelines: &[
        "Describe the affected area, color and size",
        "Tell us whether it itches, hurts or spreads",
        "Mention new products, foods or medications",
        SAFETY_NOTE,
    ],
    doctor_role: "Dermatologist",
};

static PSYCHIATRY: SpecialtyInfo = SpecialtyInfo {
    emoji: "🧠",
    title: "Psychiatry",
    welcome: "Welcome to your mental health consultation",
    description: "Mood, anxiety, sleep and other mental health concerns.",
    guidelines: &[
        "Share how you have been feeling lately",
        "Mention sleep, appetite and energy changes",
        "If you are in crisis, contact local emergency services now",
        SAFETY_NOTE,
    ],
    doctor_role: "Psychiatrist",
};

static NUTRITION: SpecialtyInfo = SpecialtyInfo {
    emoji: "🥗",
    title: "Nutrition",
    welcome: "Welcome to your nutrition consultation",
    description: "Diet planning, weight management and nutritional deficiencies.",
    guidelines: &[
        "Describe a typical day of eating",
        "Mention your height, weight and goals",
        "List food allergies and intolerances",
        SAFETY_NOTE,
    ],
    doctor_role: "Nutritionist",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_roundtrip_through_from_key() {
        for specialty in Specialty::ALL {
            assert_eq!(Specialty::from_key(specialty.as_str()), Some(specialty));
        }
        assert_eq!(Specialty::from_key("Internal-Medicine"), Some(Specialty::InternalMedicine));
        assert_eq!(Specialty::from_key("cardiology"), None);
    }

    #[test]
    fn test_default_is_obstetrics() {
        assert_eq!(Specialty::default(), Specialty::Obstetrics);
    }

    #[test]
    fn test_unknown_key_fails_closed() {
        let info = specialty_info("not-a-specialty");
        assert_eq!(info, SpecialtyInfo::general());
        assert_eq!(info.doctor_role, "Doctor");
        assert_eq!(specialty_info("pediatrics").title, "Pediatrics");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Specialty::InternalMedicine).unwrap();
        assert_eq!(json, r#""internal_medicine""#);
        let parsed: Specialty = serde_json::from_str(r#""nutrition""#).unwrap();
        assert_eq!(parsed, Specialty::Nutrition);
    }

    #[test]
    fn test_every_record_has_guidelines() {
        for specialty in Specialty::ALL {
            assert!(!specialty.info().guidelines.is_empty());
            assert!(!specialty.info().emoji.is_empty());
        }
    }
}
